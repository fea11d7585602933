use std::io::{self, IsTerminal};

use anyhow::{Result, bail};
use crossterm::ExecutableCommand;
use crossterm::terminal::{
    EnterAlternateScreen,
    LeaveAlternateScreen,
    disable_raw_mode,
    enable_raw_mode,
};
use tracing::{debug, warn};

/// Raw mode on the alternate screen, restored when dropped.
#[derive(Debug)]
pub struct TerminalSession {
    _private: (),
}

impl TerminalSession {
    pub fn enter() -> Result<Self> {
        if !io::stdout().is_terminal() {
            bail!("the interactive browser needs a terminal, use 'recipes list' or 'recipes search' instead");
        }

        enable_raw_mode()?;
        let session = Self { _private: () };
        io::stdout().execute(EnterAlternateScreen)?;
        debug!("entered alternate screen");
        Ok(session)
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        if let Err(err) = io::stdout().execute(LeaveAlternateScreen) {
            warn!(%err, "could not leave alternate screen");
        }
        if let Err(err) = disable_raw_mode() {
            warn!(%err, "could not disable raw mode");
        }
    }
}
