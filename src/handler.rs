use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;

use crate::app::{App, InputMode, Screen, MAX_INPUT_LEN};
use crate::surface::DisplaySurface;
use crate::tui::AppEvent;

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

/// Check if a point is within a rectangle
fn point_in_rect(x: u16, y: u16, rect: Rect) -> bool {
    x >= rect.x && x < rect.x + rect.width && y >= rect.y && y < rect.y + rect.height
}

pub async fn handle_event<S: DisplaySurface>(app: &mut App<S>, event: AppEvent) -> Result<()> {
    match event {
        AppEvent::Key(key) => handle_key(app, key)?,
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse)?,
        AppEvent::Resize(_, _) => {
            // Expanded width is a fraction of the display; recompute it.
            if app.overlay.is_expanded() {
                app.overlay.expand()?;
            }
        }
        AppEvent::Tick => {
            app.tick_animation();
        }
    }
    Ok(())
}

fn handle_key<S: DisplaySurface>(app: &mut App<S>, key: KeyEvent) -> Result<()> {
    // Global keys that work in any mode
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return Ok(());
    }

    if !app.overlay.is_expanded() {
        // Collapsed surface is non-focusable: keys pass through, except the
        // process-owner quit key.
        if key.code == KeyCode::Char('q') {
            app.should_quit = true;
        }
        return Ok(());
    }

    match app.screen {
        Screen::Settings => handle_settings_key(app, key),
        Screen::Chat => match app.input_mode {
            InputMode::Normal => handle_chat_normal(app, key),
            InputMode::Editing => handle_chat_editing(app, key),
        },
    }
}

fn handle_chat_normal<S: DisplaySurface>(app: &mut App<S>, key: KeyEvent) -> Result<()> {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,

        // Close action collapses the widget.
        KeyCode::Esc => app.close_chat()?,

        // Focus the input field.
        KeyCode::Char('i') | KeyCode::Char('/') => {
            app.input_mode = InputMode::Editing;
            app.input_cursor = app.input.chars().count();
            app.overlay.set_text_entry_focus(true)?;
        }

        // Chat scrolling
        KeyCode::Char('j') | KeyCode::Down => app.scroll_down(),
        KeyCode::Char('k') | KeyCode::Up => app.scroll_up(),
        KeyCode::Char('G') => app.scroll_chat_to_bottom(),

        // Settings screen
        KeyCode::Char('s') => app.screen = Screen::Settings,

        _ => {}
    }
    Ok(())
}

fn handle_chat_editing<S: DisplaySurface>(app: &mut App<S>, key: KeyEvent) -> Result<()> {
    match key.code {
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
            app.overlay.set_text_entry_focus(false)?;
        }
        KeyCode::Enter => {
            app.send()?;
        }
        KeyCode::Backspace => {
            if app.input_cursor > 0 {
                app.input_cursor -= 1;
                let byte_pos = char_to_byte_index(&app.input, app.input_cursor);
                app.input.remove(byte_pos);
            }
        }
        KeyCode::Delete => {
            let char_count = app.input.chars().count();
            if app.input_cursor < char_count {
                let byte_pos = char_to_byte_index(&app.input, app.input_cursor);
                app.input.remove(byte_pos);
            }
        }
        KeyCode::Left => {
            app.input_cursor = app.input_cursor.saturating_sub(1);
        }
        KeyCode::Right => {
            let char_count = app.input.chars().count();
            app.input_cursor = (app.input_cursor + 1).min(char_count);
        }
        KeyCode::Home => {
            app.input_cursor = 0;
        }
        KeyCode::End => {
            app.input_cursor = app.input.chars().count();
        }
        KeyCode::Char(c) => {
            if app.input.chars().count() < MAX_INPUT_LEN {
                let byte_pos = char_to_byte_index(&app.input, app.input_cursor);
                app.input.insert(byte_pos, c);
                app.input_cursor += 1;
            }
        }
        _ => {}
    }
    Ok(())
}

fn handle_settings_key<S: DisplaySurface>(app: &mut App<S>, key: KeyEvent) -> Result<()> {
    match key.code {
        KeyCode::Esc => app.screen = Screen::Chat,
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Char('j') | KeyCode::Down => app.preset_nav_down(),
        KeyCode::Char('k') | KeyCode::Up => app.preset_nav_up(),
        KeyCode::Enter => app.select_preset(),
        KeyCode::Char('a') => app.toggle_auto_expand(),
        KeyCode::Char('r') => app.reset_settings(),
        _ => {}
    }
    Ok(())
}

fn handle_mouse<S: DisplaySurface>(app: &mut App<S>, mouse: MouseEvent) -> Result<()> {
    let x = mouse.column;
    let y = mouse.row;
    let in_window = app.window_area.map(|r| point_in_rect(x, y, r)).unwrap_or(false);
    let in_input = app.input_area.map(|r| point_in_rect(x, y, r)).unwrap_or(false);
    let in_close = app.close_area.map(|r| point_in_rect(x, y, r)).unwrap_or(false);

    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            if app.overlay.is_expanded() {
                if in_close {
                    app.close_chat()?;
                } else if in_input {
                    // Touching the text field escalates focus so text entry
                    // (and an on-screen keyboard, where there is one) works.
                    app.input_mode = InputMode::Editing;
                    app.input_cursor = app.input.chars().count();
                    app.overlay.set_text_entry_focus(true)?;
                } else if in_window {
                    app.overlay.touch_down(x as i32, y as i32);
                } else if app.input_mode == InputMode::Editing {
                    // Outside touch is observed, not blocked: dismiss the
                    // text-entry focus and let it fall through.
                    app.input_mode = InputMode::Normal;
                    app.overlay.set_text_entry_focus(false)?;
                }
            } else if in_window {
                app.overlay.touch_down(x as i32, y as i32);
            }
            // Collapsed + outside the badge: pass-through, nothing to do.
        }
        MouseEventKind::Drag(MouseButton::Left) => {
            app.overlay.touch_move(x as i32, y as i32)?;
        }
        MouseEventKind::Up(MouseButton::Left) => {
            app.overlay.touch_up(x as i32, y as i32)?;
        }
        MouseEventKind::ScrollDown => {
            if app.overlay.is_expanded() && in_window {
                app.scroll_down();
            }
        }
        MouseEventKind::ScrollUp => {
            if app.overlay.is_expanded() && in_window {
                app.scroll_up();
            }
        }
        _ => {}
    }
    Ok(())
}
