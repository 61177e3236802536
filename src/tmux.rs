//! Terminal session backend: liveness checks and keystroke delivery.

use std::{
    borrow::Cow,
    process::{Command, Stdio},
    sync::Arc,
};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("{0} is not installed or not on PATH")]
    NotAvailable(&'static str),

    #[error("{command} failed: {stderr}")]
    CommandFailed { command: String, stderr: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Named terminal sessions that can receive keystrokes.
pub trait TerminalBackend {
    fn session_exists(&self, name: &str) -> bool;

    /// Type `text` into the session, then submit it.
    fn send_text(&self, name: &str, text: &str) -> Result<(), BackendError>;

    /// Send a single cancel keystroke with no submit.
    fn send_cancel(&self, name: &str) -> Result<(), BackendError>;
}

impl<T: TerminalBackend + ?Sized> TerminalBackend for &T {
    fn session_exists(&self, name: &str) -> bool {
        (**self).session_exists(name)
    }

    fn send_text(&self, name: &str, text: &str) -> Result<(), BackendError> {
        (**self).send_text(name, text)
    }

    fn send_cancel(&self, name: &str) -> Result<(), BackendError> {
        (**self).send_cancel(name)
    }
}

impl<T: TerminalBackend + ?Sized> TerminalBackend for Arc<T> {
    fn session_exists(&self, name: &str) -> bool {
        (**self).session_exists(name)
    }

    fn send_text(&self, name: &str, text: &str) -> Result<(), BackendError> {
        (**self).send_text(name, text)
    }

    fn send_cancel(&self, name: &str) -> Result<(), BackendError> {
        (**self).send_cancel(name)
    }
}

#[derive(Debug, Clone)]
pub struct TmuxBackend {
    program: String,
}

impl Default for TmuxBackend {
    fn default() -> Self {
        Self {
            program: "tmux".to_string(),
        }
    }
}

impl TmuxBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a different tmux binary (wrapper scripts, alternate sockets).
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn run(&self, args: &[&str]) -> Result<String, BackendError> {
        let output = Command::new(&self.program)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    BackendError::NotAvailable("tmux")
                } else {
                    BackendError::Io(e)
                }
            })?;

        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
        } else {
            Err(BackendError::CommandFailed {
                command: format!("{} {}", self.program, args.first().unwrap_or(&"")),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            })
        }
    }
}

/// tmux splits commands on an argument ending in `;` unless it is written `\;`.
fn escape_trailing_separator(text: &str) -> Cow<'_, str> {
    match text.strip_suffix(';') {
        Some(head) => Cow::Owned(format!("{head}\\;")),
        None => Cow::Borrowed(text),
    }
}

impl TerminalBackend for TmuxBackend {
    fn session_exists(&self, name: &str) -> bool {
        self.run(&["has-session", "-t", name]).is_ok()
    }

    fn send_text(&self, name: &str, text: &str) -> Result<(), BackendError> {
        // `-l` keeps words like "Enter" or "C-c" in the payload literal and
        // `--` stops a leading `-` from being read as a flag.
        let literal = escape_trailing_separator(text);
        self.run(&["send-keys", "-t", name, "-l", "--", &literal])?;
        self.run(&["send-keys", "-t", name, "Enter"])?;
        Ok(())
    }

    fn send_cancel(&self, name: &str) -> Result<(), BackendError> {
        self.run(&["send-keys", "-t", name, "Escape"])?;
        Ok(())
    }
}
