//! Terminal input: command lines, confirmations, and hidden secrets.

use std::io::{self, BufRead, Write};

use crate::error::{ShellError, ShellResult};

/// Source of interactive input.
pub(crate) trait Console {
    /// Show `prompt` and read one line without its terminator.
    /// Returns `None` at end of input.
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>>;

    /// Show `prompt` and read a line without echoing it.
    fn read_secret(&mut self, prompt: &str) -> io::Result<String>;
}

/// Console backed by the process's stdin and stdout.
#[derive(Debug, Default)]
pub(crate) struct StdConsole;

impl Console for StdConsole {
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        let mut stdout = io::stdout();
        stdout.write_all(prompt.as_bytes())?;
        stdout.flush()?;

        let mut line = String::new();
        if io::stdin().lock().read_line(&mut line)? == 0 {
            return Ok(None);
        }
        let trimmed = line.trim_end_matches(['\n', '\r']).len();
        line.truncate(trimmed);
        Ok(Some(line))
    }

    fn read_secret(&mut self, prompt: &str) -> io::Result<String> {
        rpassword::prompt_password(prompt)
    }
}

/// Ask a yes/no question; only `y` and `yes` count as agreement.
pub(crate) fn confirm(console: &mut dyn Console, prompt: &str) -> ShellResult<bool> {
    let answer = console.read_line(prompt).map_err(ShellError::Console)?;
    Ok(matches!(answer.as_deref(), Some("y" | "yes")))
}
