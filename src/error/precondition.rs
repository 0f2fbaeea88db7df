//! Guard failures: the operation was refused before any request was made.

use std::fmt;

/// A required selection or input is missing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreconditionError {
    NoAppSelected,
    NoUserId,
    NoSession,
    EmptyMessage,
}

impl PreconditionError {
    pub fn user_message(&self) -> String {
        match self {
            PreconditionError::NoAppSelected => "No app selected. Pick an app first.".to_string(),
            PreconditionError::NoUserId => "No user id set.".to_string(),
            PreconditionError::NoSession => {
                "No session selected. Create or open a session first.".to_string()
            }
            PreconditionError::EmptyMessage => "Message is empty.".to_string(),
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            PreconditionError::NoAppSelected => "E_PRE_APP",
            PreconditionError::NoUserId => "E_PRE_USER",
            PreconditionError::NoSession => "E_PRE_SESSION",
            PreconditionError::EmptyMessage => "E_PRE_EMPTY",
        }
    }
}

impl fmt::Display for PreconditionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PreconditionError::NoAppSelected => write!(f, "no app selected"),
            PreconditionError::NoUserId => write!(f, "no user id"),
            PreconditionError::NoSession => write!(f, "no current session"),
            PreconditionError::EmptyMessage => write!(f, "empty message"),
        }
    }
}

impl std::error::Error for PreconditionError {}
