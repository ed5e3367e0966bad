use anyhow::Result;

mod app;
mod handler;
mod overlay;
mod persona;
mod settings;
mod surface;
mod tui;
mod ui;

use app::App;
use overlay::OverlayController;
use settings::SettingsStore;
use surface::TerminalSurface;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let store = SettingsStore::load()?;
    let mut overlay = OverlayController::new(TerminalSurface::new());

    // Attaching to the display layer is privileged. Denial is fatal to the
    // attach and surfaced to the user; there is no retry loop.
    if let Err(e) = overlay.attach() {
        eprintln!("floatchat: {e}");
        eprintln!("run floatchat from an interactive terminal, then start it again");
        std::process::exit(1);
    }

    tui::install_panic_hook();
    let mut terminal = tui::terminal()?;
    let mut events = tui::EventHandler::new();

    let mut app = App::new(overlay, store);

    // Auto-expand is consumed once at startup.
    if app.store.settings().auto_expand {
        app.overlay.expand()?;
    }

    let result = run(&mut terminal, &mut events, &mut app).await;

    app.overlay.detach()?;
    result
}

async fn run(
    terminal: &mut tui::Tui,
    events: &mut tui::EventHandler,
    app: &mut App<TerminalSurface>,
) -> Result<()> {
    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        if let Some(event) = events.next().await {
            handler::handle_event(app, event).await?;
        }

        app.poll_reply().await;
    }
    Ok(())
}
