//! Error category classification.
//!
//! Categories drive how the controller and the CLI react to a failure:
//! which ones are worth retrying by hand, and what hint to show.

use std::fmt;

/// High-level categorization of errors for handling decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Connection, DNS, timeout, interrupted stream.
    Network,

    /// The agent backend answered with a 5xx status.
    Server,

    /// Malformed data or a bug on our side.
    Client,

    /// Something the user must fix first (no app selected, empty message).
    User,

    /// Filesystem errors while reading or writing preferences.
    System,

    /// Invalid configuration values.
    Configuration,
}

impl ErrorCategory {
    /// True for transient failures where repeating the action may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorCategory::Network | ErrorCategory::Server)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::Network => "network",
            ErrorCategory::Server => "server",
            ErrorCategory::Client => "client",
            ErrorCategory::User => "user",
            ErrorCategory::System => "system",
            ErrorCategory::Configuration => "configuration",
        }
    }

    /// Returns suggested recovery actions for this category.
    pub fn recovery_hint(&self) -> &'static str {
        match self {
            ErrorCategory::Network => "Check that the agent server is running and reachable",
            ErrorCategory::Server => {
                "The agent server reported a failure. Check its logs and try again"
            }
            ErrorCategory::Client => "This may be a bug. Please report it if it persists",
            ErrorCategory::User => "Select an app and a session, then try again",
            ErrorCategory::System => "Check file permissions in your home directory",
            ErrorCategory::Configuration => "Check your ADK_CHAT_* environment variables and flags",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
