//! Terminal user interface for the library admin console
//!
//! One [`App`] owns a menu screen plus one pane per resource; panes stay
//! alive across navigation so fetched records and drafts survive a trip
//! through the menu.

pub mod app;
pub mod menu;
pub mod pane;
pub mod picker;
pub mod ui;

pub use app::{App, AppEvent};

use std::io;

use anyhow::Result;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{error, info};

use crate::config::Config;

/// Set up the terminal, run the application, and restore the terminal
/// whether or not the app came back with an error.
pub async fn run_tui(config: &Config) -> Result<()> {
    info!("Starting terminal interface");

    // built before raw mode so a failure here leaves the terminal sane
    let mut app = App::new(config)?;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = app.run(&mut terminal).await;

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    match &result {
        Ok(_) => info!("Terminal interface exited"),
        Err(e) => error!("Terminal interface failed: {}", e),
    }

    result
}
