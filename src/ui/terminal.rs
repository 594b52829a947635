use std::io::{self, Stdout};
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use super::app::App;

type Backend = CrosstermBackend<Stdout>;

const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Take over the terminal, run the UI until the user quits, then hand the
/// terminal back. The terminal is restored even when the loop fails.
pub fn run_app(app: &mut App) -> Result<()> {
    let mut terminal = setup_terminal()?;
    log::debug!("Terminal UI started");

    let result = event_loop(&mut terminal, app);
    let restored = restore_terminal(&mut terminal);

    log::debug!("Terminal UI stopped");
    result.and(restored)
}

fn setup_terminal() -> Result<Terminal<Backend>> {
    let mut stdout = io::stdout();
    enable_raw_mode().context("failed to enable raw mode")?;
    execute!(stdout, EnterAlternateScreen).context("failed to enter alternate screen")?;
    Terminal::new(CrosstermBackend::new(stdout)).context("failed to create terminal backend")
}

fn event_loop(terminal: &mut Terminal<Backend>, app: &mut App) -> Result<()> {
    loop {
        terminal
            .draw(|frame| app.draw(frame))
            .context("failed to draw frame")?;

        if !event::poll(POLL_INTERVAL).context("event polling failed")? {
            continue;
        }
        if let Event::Key(key) = event::read().context("failed to read event")? {
            if key.kind == KeyEventKind::Press && dispatch_key(app, key)? {
                return Ok(());
            }
        }
    }
}

/// Route a key press to the app. Returns true when the app should exit.
fn dispatch_key(app: &mut App, key: KeyEvent) -> Result<bool> {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        match key.code {
            KeyCode::Char('c') => return Ok(true),
            KeyCode::Char('s') => {
                app.handle_ctrl_s()?;
                return Ok(false);
            }
            _ => {}
        }
    }
    app.handle_key(key.code)
}

fn restore_terminal(terminal: &mut Terminal<Backend>) -> Result<()> {
    disable_raw_mode().context("failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("failed to leave alternate screen")?;
    terminal
        .show_cursor()
        .context("failed to restore cursor visibility")
}
