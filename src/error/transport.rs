//! Transport-level failures talking to the agent backend.

use std::fmt;

use crate::traits::HttpError;

/// Failures of an HTTP exchange, including a streamed response that breaks
/// off midway. None of these are retried automatically.
#[derive(Debug, Clone)]
pub enum TransportError {
    /// The server could not be reached.
    ConnectionFailed { url: String, message: String },

    /// The request did not complete in time.
    Timeout { url: String },

    /// The server answered with a non-2xx status.
    HttpStatus { status: u16, message: String },

    /// The response stream failed after it had started.
    StreamInterrupted { message: String },

    /// A non-streamed body could not be decoded.
    InvalidResponse { message: String },

    /// Request construction failed (bad base URL, client setup).
    InvalidRequest { message: String },
}

impl TransportError {
    pub fn is_retryable(&self) -> bool {
        match self {
            TransportError::ConnectionFailed { .. }
            | TransportError::Timeout { .. }
            | TransportError::StreamInterrupted { .. } => true,
            TransportError::HttpStatus { status, .. } => *status >= 500 || *status == 429,
            TransportError::InvalidResponse { .. } | TransportError::InvalidRequest { .. } => false,
        }
    }

    /// True when the server itself reported the failure.
    pub fn is_server_side(&self) -> bool {
        matches!(self, TransportError::HttpStatus { status, .. } if *status >= 500)
    }

    /// Get a user-friendly error message.
    pub fn user_message(&self) -> String {
        match self {
            TransportError::ConnectionFailed { url, .. } => {
                format!("Unable to connect to the agent server at {}.", url)
            }
            TransportError::Timeout { .. } => {
                "The agent server did not respond in time.".to_string()
            }
            TransportError::HttpStatus { status, message } => match *status {
                404 => "The requested app or session was not found.".to_string(),
                500..=599 => format!("The agent server failed (HTTP {}): {}", status, message),
                _ => format!("The agent server rejected the request (HTTP {}): {}", status, message),
            },
            TransportError::StreamInterrupted { message } => {
                format!("The response stream was interrupted: {}", message)
            }
            TransportError::InvalidResponse { message } => {
                format!("Received an invalid response from the agent server: {}", message)
            }
            TransportError::InvalidRequest { message } => {
                format!("Could not build the request: {}", message)
            }
        }
    }

    /// Get a short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            TransportError::ConnectionFailed { .. } => "E_NET_CONN",
            TransportError::Timeout { .. } => "E_NET_TIMEOUT",
            TransportError::HttpStatus { .. } => "E_NET_HTTP",
            TransportError::StreamInterrupted { .. } => "E_NET_STREAM",
            TransportError::InvalidResponse { .. } => "E_NET_INVALID",
            TransportError::InvalidRequest { .. } => "E_NET_REQUEST",
        }
    }

    /// Map an [`HttpError`] raised while requesting `url`.
    pub fn from_http(err: HttpError, url: &str) -> Self {
        match err {
            HttpError::ConnectionFailed(message) => TransportError::ConnectionFailed {
                url: url.to_string(),
                message,
            },
            HttpError::Timeout(_) => TransportError::Timeout {
                url: url.to_string(),
            },
            HttpError::ServerError { status, message } => {
                TransportError::HttpStatus { status, message }
            }
            HttpError::InvalidUrl(message) => TransportError::InvalidRequest { message },
            HttpError::Cancelled => TransportError::StreamInterrupted {
                message: "request cancelled".to_string(),
            },
            HttpError::Io(message) | HttpError::Other(message) => {
                TransportError::ConnectionFailed {
                    url: url.to_string(),
                    message,
                }
            }
        }
    }

    /// Map an [`HttpError`] yielded by an already-open response stream.
    pub fn interrupted(err: HttpError) -> Self {
        TransportError::StreamInterrupted {
            message: err.to_string(),
        }
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::ConnectionFailed { url, message } => {
                write!(f, "Connection failed to '{}': {}", url, message)
            }
            TransportError::Timeout { url } => write!(f, "Request to '{}' timed out", url),
            TransportError::HttpStatus { status, message } => {
                write!(f, "HTTP {} error: {}", status, message)
            }
            TransportError::StreamInterrupted { message } => {
                write!(f, "Stream interrupted: {}", message)
            }
            TransportError::InvalidResponse { message } => {
                write!(f, "Invalid response: {}", message)
            }
            TransportError::InvalidRequest { message } => {
                write!(f, "Invalid request: {}", message)
            }
        }
    }
}

impl std::error::Error for TransportError {}
