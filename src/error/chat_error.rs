//! Unified error type for adk-chat.

use std::fmt;

use super::category::ErrorCategory;
use super::context::ErrorContext;
use super::precondition::PreconditionError;
use super::transport::TransportError;
use crate::preferences::PreferencesError;
use crate::sse::ParseError;

/// Every failure a controller or client operation can report.
#[derive(Debug)]
pub enum ChatError {
    /// HTTP exchange failed or the stream broke off.
    Transport(TransportError),

    /// A record could not be decoded. Only surfaces outside the stream loop,
    /// which logs and skips these instead.
    Parse(ParseError),

    /// The operation was refused before any request was made.
    Precondition(PreconditionError),

    /// Local preferences could not be read or written.
    Preferences(PreferencesError),

    /// Wrapped error with additional context.
    WithContext {
        error: Box<ChatError>,
        context: ErrorContext,
    },
}

impl ChatError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ChatError::Transport(err) => {
                if err.is_server_side() {
                    ErrorCategory::Server
                } else {
                    match err {
                        TransportError::InvalidResponse { .. } => ErrorCategory::Client,
                        TransportError::InvalidRequest { .. } => ErrorCategory::Configuration,
                        _ => ErrorCategory::Network,
                    }
                }
            }
            ChatError::Parse(_) => ErrorCategory::Client,
            ChatError::Precondition(_) => ErrorCategory::User,
            ChatError::Preferences(_) => ErrorCategory::System,
            ChatError::WithContext { error, .. } => error.category(),
        }
    }

    pub fn is_retryable(&self) -> bool {
        match self {
            ChatError::Transport(err) => err.is_retryable(),
            ChatError::WithContext { error, .. } => error.is_retryable(),
            _ => false,
        }
    }

    /// Get a user-friendly error message.
    pub fn user_message(&self) -> String {
        match self {
            ChatError::Transport(err) => err.user_message(),
            ChatError::Parse(err) => format!("Received an unreadable event: {}", err.preview),
            ChatError::Precondition(err) => err.user_message(),
            ChatError::Preferences(err) => format!("Could not access preferences: {}", err),
            ChatError::WithContext { error, .. } => error.user_message(),
        }
    }

    /// Get a short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            ChatError::Transport(err) => err.error_code(),
            ChatError::Parse(_) => "E_PARSE",
            ChatError::Precondition(err) => err.error_code(),
            ChatError::Preferences(_) => "E_SYS_PREFS",
            ChatError::WithContext { error, .. } => error.error_code(),
        }
    }

    pub fn with_context(self, ctx: ErrorContext) -> Self {
        ChatError::WithContext {
            error: Box::new(self),
            context: ctx,
        }
    }

    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            ChatError::WithContext { context, .. } => Some(context),
            _ => None,
        }
    }

    /// Get the inner error without context.
    pub fn inner(&self) -> &ChatError {
        match self {
            ChatError::WithContext { error, .. } => error.inner(),
            _ => self,
        }
    }

    pub fn is_precondition(&self) -> bool {
        matches!(self.inner(), ChatError::Precondition(_))
    }

    pub fn recovery_hint(&self) -> &'static str {
        self.category().recovery_hint()
    }
}

impl fmt::Display for ChatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChatError::Transport(err) => write!(f, "{}", err),
            ChatError::Parse(err) => write!(f, "{}", err),
            ChatError::Precondition(err) => write!(f, "{}", err),
            ChatError::Preferences(err) => write!(f, "{}", err),
            ChatError::WithContext { error, context } => write!(f, "{} ({})", error, context),
        }
    }
}

impl std::error::Error for ChatError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ChatError::Transport(err) => Some(err),
            ChatError::Parse(err) => Some(err),
            ChatError::Precondition(err) => Some(err),
            ChatError::Preferences(err) => Some(err),
            ChatError::WithContext { error, .. } => error.source(),
        }
    }
}

impl From<TransportError> for ChatError {
    fn from(err: TransportError) -> Self {
        ChatError::Transport(err)
    }
}

impl From<ParseError> for ChatError {
    fn from(err: ParseError) -> Self {
        ChatError::Parse(err)
    }
}

impl From<PreconditionError> for ChatError {
    fn from(err: PreconditionError) -> Self {
        ChatError::Precondition(err)
    }
}

impl From<PreferencesError> for ChatError {
    fn from(err: PreferencesError) -> Self {
        ChatError::Preferences(err)
    }
}
