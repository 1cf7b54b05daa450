use anyhow::Result;
use tracing_subscriber::EnvFilter;

mod app;
mod handler;
mod tui;
mod ui;

use app::App;
use fitscope_core::Config;

/// Log to a file; stderr belongs to the terminal UI.
fn init_logging() -> Result<()> {
    let dir = dirs::data_local_dir()
        .unwrap_or_else(|| std::path::PathBuf::from("."))
        .join("fitscope");
    std::fs::create_dir_all(&dir)?;
    let file = std::fs::File::create(dir.join("fitscope.log"))?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(file)
        .with_ansi(false)
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    if let Err(e) = init_logging() {
        eprintln!("logging disabled: {}", e);
    }

    let config = Config::load().unwrap_or_else(|_| Config::new());
    tracing::info!(backend = config.backend_url(), "starting fitscope");

    let mut app = App::new(&config);
    app.check_backend();
    app.refresh_dashboard();

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = tui::EventHandler::new();

    while !app.should_quit {
        terminal.draw(|frame| ui::render(&mut app, frame))?;

        if let Some(event) = events.next().await {
            handler::handle_event(&mut app, event).await?;
        }

        // Ticks arrive every 300ms, so finished backend calls land promptly
        // even when the keyboard is idle
        app.poll_tasks().await;
    }

    tui::restore()?;
    Ok(())
}
