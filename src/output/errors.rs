// Error taxonomy for hashictl

use std::io::IsTerminal;

use colored::*;
use thiserror::Error;

/// All error types in hashictl
#[derive(Debug, Error)]
pub enum HashictlError {
    /// A required parameter or environment variable is missing
    #[error("configuration error: {0}")]
    Config(String),

    /// The remote service answered with a non-success status
    #[error("remote error: HTTP {status}: {message}")]
    Remote { status: u16, message: String },

    /// Transport-level failure (connect, TLS, timeout)
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// A named resource, item or field was required but does not exist
    #[error("not found: {0}")]
    NotFound(String),
}

impl HashictlError {
    /// HTTP status carried by a Remote error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            HashictlError::Remote { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Initialize color output based on TTY detection and NO_COLOR environment variable
fn should_use_colors() -> bool {
    // Check NO_COLOR environment variable first (https://no-color.org/)
    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }

    // Errors are written to stderr
    std::io::stderr().is_terminal()
}

/// Render an error for the terminal, with a hint where one is known
pub fn render_error(err: &HashictlError) -> String {
    if !should_use_colors() {
        colored::control::set_override(false);
    }

    let mut out = format!("{}: {}", "ERROR".red().bold(), err);

    if let Some(hint) = suggest_fix(err) {
        out.push('\n');
        out.push_str(&format!("{}: {}", "Hint".yellow().bold(), hint));
    }

    out
}

/// Suggest common fixes for errors
pub fn suggest_fix(error: &HashictlError) -> Option<String> {
    match error {
        HashictlError::Config(message) => {
            if message.contains("environment variable") {
                Some("Pass the value explicitly or export the named variable".to_string())
            } else {
                None
            }
        }

        HashictlError::Remote { status, .. } => match status {
            401 | 403 => {
                Some("Check that the management token has sufficient privileges".to_string())
            }
            _ => None,
        },

        HashictlError::Transport(e) => {
            if e.is_timeout() {
                Some("Increase --timeout or check network connectivity".to_string())
            } else if e.is_connect() {
                Some("Check that the endpoint URL is reachable".to_string())
            } else {
                None
            }
        }

        HashictlError::NotFound(_) => None,
    }
}
