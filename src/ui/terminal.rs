use std::io::{self, Stdout};
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use log::warn;
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use super::app::App;

/// How long to wait for input before polling again.
const INPUT_POLL: Duration = Duration::from_millis(250);

type Backend = CrosstermBackend<Stdout>;

/// Raw mode and the alternate screen, held for as long as the board is open.
/// Dropping a session that was not closed restores the terminal anyway, so an
/// error out of the event loop still hands back a usable shell.
struct Session {
    terminal: Terminal<Backend>,
    restored: bool,
}

impl Session {
    fn start() -> Result<Self> {
        let terminal = Terminal::new(CrosstermBackend::new(io::stdout()))
            .context("failed to create terminal backend")?;
        let mut session = Self {
            terminal,
            restored: false,
        };
        enable_raw_mode().context("failed to enable raw mode")?;
        execute!(session.terminal.backend_mut(), EnterAlternateScreen)
            .context("failed to enter alternate screen")?;
        Ok(session)
    }

    fn close(mut self) -> Result<()> {
        self.restored = true;
        restore(&mut self.terminal)
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if !self.restored {
            if let Err(err) = restore(&mut self.terminal) {
                warn!("failed to restore terminal: {err:#}");
            }
        }
    }
}

/// Open the board in the terminal and process input until the user quits.
pub fn run_app(app: &mut App) -> Result<()> {
    let mut session = Session::start()?;
    let result = event_loop(&mut session.terminal, app);
    session.close()?;
    result
}

/// Draw only after something changed: a handled key press or a resize.
fn event_loop(terminal: &mut Terminal<Backend>, app: &mut App) -> Result<()> {
    let mut dirty = true;
    loop {
        if dirty {
            terminal
                .draw(|frame| app.draw(frame))
                .context("failed to draw frame")?;
            dirty = false;
        }

        if !event::poll(INPUT_POLL).context("event polling failed")? {
            continue;
        }
        match event::read().context("failed to read event")? {
            Event::Key(key_event) if key_event.kind == KeyEventKind::Press => {
                if app.handle_key(key_event.code)? {
                    return Ok(());
                }
                dirty = true;
            }
            Event::Resize(..) => dirty = true,
            _ => {}
        }
    }
}

fn restore(terminal: &mut Terminal<Backend>) -> Result<()> {
    disable_raw_mode().context("failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("failed to leave alternate screen")?;
    terminal
        .show_cursor()
        .context("failed to restore cursor visibility")
}
