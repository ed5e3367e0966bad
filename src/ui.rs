use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
};

use crate::app::{App, InputMode, Screen};
use crate::settings::BACKGROUND_PRESETS;
use crate::surface::{Dimension, DisplaySurface, SurfaceConfig};

/// Natural (content-sized) dimensions of the collapsed badge.
pub const BADGE_WIDTH: u16 = 11;
pub const BADGE_HEIGHT: u16 = 3;

pub fn render<S: DisplaySurface>(app: &mut App<S>, frame: &mut Frame) {
    let area = frame.area();

    render_wallpaper(app, frame, area);

    let config = app.overlay.config();
    if app.overlay.is_expanded() {
        render_window(app, frame, area, &config);
    } else {
        render_badge(app, frame, area, &config);
    }
}

/// Dim glyph pattern standing in for the configured background image. The
/// URI itself is opaque; only the preset name drives the look.
fn render_wallpaper<S: DisplaySurface>(app: &App<S>, frame: &mut Frame, area: Rect) {
    let name = app.store.settings().background_name.as_str();
    let (glyph, color, density) = match name {
        "Portal" => ('~', Color::Green, 5),
        "Matrix Code" => ('|', Color::Green, 3),
        "Cyberpunk City" => ('▮', Color::Magenta, 7),
        "Deep Space" => ('·', Color::Blue, 11),
        "Circuit Board" => ('┼', Color::Cyan, 6),
        _ => (' ', Color::Black, 1),
    };

    let mut lines: Vec<Line> = Vec::with_capacity(area.height as usize);
    for row in 0..area.height {
        let mut text = String::with_capacity(area.width as usize);
        for col in 0..area.width {
            // Fixed pseudo-pattern so the wallpaper is stable across frames.
            if (col as usize * 7 + row as usize * 13) % density == 0 {
                text.push(glyph);
            } else {
                text.push(' ');
            }
        }
        lines.push(Line::from(Span::styled(
            text,
            Style::default().fg(color).add_modifier(Modifier::DIM),
        )));
    }

    frame.render_widget(Paragraph::new(Text::from(lines)), area);
}

/// Clamp the configured surface geometry into the visible display.
fn surface_rect(config: &SurfaceConfig, area: Rect) -> Rect {
    let width = match config.width {
        Dimension::Natural => BADGE_WIDTH,
        Dimension::Cells(w) => w,
    }
    .min(area.width);
    let height = match config.height {
        Dimension::Natural => BADGE_HEIGHT,
        Dimension::Cells(h) => h,
    }
    .min(area.height);

    let max_x = area.width.saturating_sub(width);
    let max_y = area.height.saturating_sub(height);
    let x = config.x.clamp(0, max_x as i32) as u16;
    let y = config.y.clamp(0, max_y as i32) as u16;

    Rect { x, y, width, height }
}

fn render_badge<S: DisplaySurface>(
    app: &mut App<S>,
    frame: &mut Frame,
    area: Rect,
    config: &SurfaceConfig,
) {
    let badge_area = surface_rect(config, area);
    app.window_area = Some(badge_area);
    app.input_area = None;
    app.close_area = None;

    let badge = Paragraph::new(Line::from(vec![
        Span::styled("◉ ", Style::default().fg(Color::Green)),
        Span::styled("doc", Style::default().fg(Color::White).bold()),
    ]))
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Green)),
    );

    frame.render_widget(Clear, badge_area);
    frame.render_widget(badge, badge_area);

    // Instruction hint near the bottom of the display.
    if area.height > 4 {
        let hint_area = Rect { x: 0, y: area.height - 3, width: area.width, height: 2 };
        let hint = Paragraph::new(vec![
            Line::from(Span::styled("Tap the badge to start coding", Style::default().fg(Color::Green))),
            Line::from(Span::styled("AI code assistant", Style::default().fg(Color::DarkGray))),
        ])
        .alignment(Alignment::Center);
        frame.render_widget(hint, hint_area);
    }
}

fn render_window<S: DisplaySurface>(
    app: &mut App<S>,
    frame: &mut Frame,
    area: Rect,
    config: &SurfaceConfig,
) {
    let window_area = surface_rect(config, area);
    app.window_area = Some(window_area);

    frame.render_widget(Clear, window_area);

    match app.screen {
        Screen::Chat => render_chat(app, frame, window_area),
        Screen::Settings => render_settings(app, frame, window_area),
    }
}

fn render_chat<S: DisplaySurface>(app: &mut App<S>, frame: &mut Frame, window_area: Rect) {
    let [header_area, history_area, input_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(3),
    ])
    .areas(window_area);

    // Header with close button on the right.
    let close_label = "[x]";
    let header = Line::from(vec![
        Span::styled(" doc // terminal ", Style::default().fg(Color::Green).bold()),
    ]);
    frame.render_widget(
        Paragraph::new(header).style(Style::default().bg(Color::Black)),
        header_area,
    );
    let close_area = Rect {
        x: header_area.right().saturating_sub(close_label.len() as u16),
        y: header_area.y,
        width: close_label.len() as u16,
        height: 1,
    };
    frame.render_widget(
        Paragraph::new(Span::styled(close_label, Style::default().fg(Color::Red).bold())),
        close_area,
    );
    app.close_area = Some(close_area);

    // Chat history.
    let history_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Green));

    // Store chat area dimensions for scroll calculations (inner size minus
    // borders).
    app.chat_height = history_area.height.saturating_sub(2);
    app.chat_width = history_area.width.saturating_sub(2);

    let mut lines: Vec<Line> = Vec::new();
    for msg in &app.messages {
        if msg.is_user {
            lines.push(Line::from(vec![
                Span::styled(
                    format!("{} ", msg.timestamp.format("%H:%M")),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::styled(format!("> {}", msg.text), Style::default().fg(Color::White)),
            ]));
        } else {
            for line in msg.text.lines() {
                lines.push(Line::from(Span::styled(
                    line.to_string(),
                    Style::default().fg(Color::Green),
                )));
            }
        }
        lines.push(Line::default());
    }

    if app.typing {
        // Animated ellipsis: cycles through ".", "..", "..."
        let dots = ".".repeat((app.animation_frame as usize) + 1);
        let label = match app.typing_hint {
            Some(lang) => format!("Analyzing {}{}", lang, dots),
            None => format!("Analyzing{}", dots),
        };
        lines.push(Line::from(Span::styled(
            label,
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )));
    }

    let history = Paragraph::new(Text::from(lines))
        .block(history_block)
        .wrap(Wrap { trim: true })
        .scroll((app.chat_scroll, 0));
    frame.render_widget(history, history_area);

    // Input box.
    let input_border_color = if app.input_mode == InputMode::Editing {
        Color::Yellow
    } else {
        Color::DarkGray
    };
    let input_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(input_border_color))
        .title(" ask ");

    // Horizontal scroll keeps the cursor visible in a narrow field.
    let inner_width = input_area.width.saturating_sub(2) as usize;
    let cursor_pos = app.input_cursor;
    let scroll_offset = if inner_width == 0 {
        0
    } else if cursor_pos >= inner_width {
        cursor_pos - inner_width + 1
    } else {
        0
    };
    let visible_text: String = app.input.chars().skip(scroll_offset).take(inner_width).collect();

    let input = Paragraph::new(visible_text)
        .style(Style::default().fg(Color::White))
        .block(input_block);
    frame.render_widget(input, input_area);
    app.input_area = Some(input_area);

    if app.input_mode == InputMode::Editing {
        let cursor_x = (cursor_pos - scroll_offset) as u16;
        frame.set_cursor_position((input_area.x + cursor_x + 1, input_area.y + 1));
    }
}

fn render_settings<S: DisplaySurface>(app: &mut App<S>, frame: &mut Frame, window_area: Rect) {
    app.input_area = None;
    app.close_area = None;

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Green))
        .title(" settings // configuration ");
    let inner = block.inner(window_area);
    frame.render_widget(block, window_area);

    let [presets_area, behavior_area, footer_area] = Layout::vertical([
        Constraint::Min(3),
        Constraint::Length(2),
        Constraint::Length(1),
    ])
    .areas(inner);

    let settings = app.store.settings();
    let items: Vec<ListItem> = BACKGROUND_PRESETS
        .iter()
        .map(|preset| {
            let marker = if preset.name == settings.background_name { "✓ " } else { "  " };
            ListItem::new(format!("{}{}", marker, preset.name))
        })
        .collect();

    let presets = List::new(items)
        .block(Block::default().title("Background").borders(Borders::NONE))
        .highlight_style(
            Style::default()
                .bg(Color::Green)
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");
    frame.render_stateful_widget(presets, presets_area, &mut app.preset_state);

    let auto = if settings.auto_expand { "[on] " } else { "[off]" };
    let behavior = Paragraph::new(vec![
        Line::from(vec![
            Span::styled(auto, Style::default().fg(Color::Yellow)),
            Span::raw(" auto-expand on launch"),
        ]),
        Line::from(Span::styled(
            format!("current: {} · v{}", settings.background_name, env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::DarkGray),
        )),
    ]);
    frame.render_widget(behavior, behavior_area);

    let footer = Paragraph::new(Line::from(Span::styled(
        "enter select · a auto-expand · r reset · esc back",
        Style::default().fg(Color::DarkGray),
    )));
    frame.render_widget(footer, footer_area);
}
