//! Context attached to errors for logging.

use chrono::{DateTime, Utc};

/// Where and when an error occurred.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorContext {
    /// Name of the operation that failed, e.g. `send_message`.
    pub operation: String,

    /// Session the operation targeted, if any.
    pub session_id: Option<String>,

    /// App the operation targeted, if any.
    pub app_name: Option<String>,

    pub timestamp: DateTime<Utc>,
}

impl ErrorContext {
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            session_id: None,
            app_name: None,
            timestamp: Utc::now(),
        }
    }

    pub fn with_session_id(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    pub fn with_app_name(mut self, app_name: impl Into<String>) -> Self {
        self.app_name = Some(app_name.into());
        self
    }

    /// Get a formatted context string suitable for logging.
    pub fn to_log_string(&self) -> String {
        let mut parts = vec![format!("operation={}", self.operation)];

        if let Some(ref app_name) = self.app_name {
            parts.push(format!("app={}", app_name));
        }

        if let Some(ref session_id) = self.session_id {
            parts.push(format!("session_id={}", session_id));
        }

        parts.push(format!("timestamp={}", self.timestamp.to_rfc3339()));

        parts.join(" ")
    }
}

impl std::fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.operation)?;

        if let Some(ref session_id) = self.session_id {
            write!(f, " session={}", session_id)?;
        }

        Ok(())
    }
}
