use anyhow::Result;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use microlend::{AppConfig, AppState};
use ratatui::prelude::*;
use std::io;
use std::sync::Arc;

mod app;
mod event;
mod input;
mod screens;
mod theme;
mod ui;
mod widgets;

use app::App;
use event::{EventHandler, EventNotifier};

/// Run the TUI application
pub async fn run_tui(config: AppConfig) -> Result<()> {
    let mut event_handler = EventHandler::new();
    let notifier = Arc::new(EventNotifier::new(event_handler.sender()));
    let state = Arc::new(AppState::from_config(&config, notifier)?);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(state);
    app.set_sender(event_handler.sender());
    let res = run_app(&mut terminal, &mut app, &mut event_handler).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("{:?}", err)
    }

    Ok(())
}

async fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    events: &mut EventHandler,
) -> Result<()> {
    loop {
        terminal.draw(|f| ui::render(f, app))?;

        if let Some(event) = events.next().await {
            if !app.handle_event(event) {
                break;
            }
        }
    }

    Ok(())
}
