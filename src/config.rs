//! Client configuration.
//!
//! Defaults, overridden by `ADK_CHAT_*` environment variables, overridden by
//! command-line flags.

use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

pub const ENV_BASE_URL: &str = "ADK_CHAT_BASE_URL";
pub const ENV_TIMEOUT_MS: &str = "ADK_CHAT_TIMEOUT_MS";
pub const ENV_USER_ID: &str = "ADK_CHAT_USER_ID";
pub const ENV_APP: &str = "ADK_CHAT_APP";

/// Configuration for talking to the agent server.
///
/// # Example
///
/// ```ignore
/// use adk_chat::config::ClientConfig;
///
/// let config = ClientConfig::from_env()
///     .with_base_url("http://localhost:9000")
///     .with_app("weather");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Server root, without a trailing slash.
    pub base_url: String,
    /// Connect timeout, and total timeout for non-streaming requests.
    pub timeout: Duration,
    /// User id to start with instead of the stored one.
    pub user_id: Option<String>,
    /// App to start with instead of the stored one.
    pub app: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            user_id: None,
            app: None,
        }
    }
}

impl ClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = normalize_base_url(&url.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn with_app(mut self, app: impl Into<String>) -> Self {
        self.app = Some(app.into());
        self
    }

    /// Defaults overridden by the `ADK_CHAT_*` environment variables.
    ///
    /// Empty values are ignored; an unparseable timeout is logged and the
    /// default kept.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(url) = env_value(ENV_BASE_URL) {
            config = config.with_base_url(url);
        }

        if let Some(raw) = env_value(ENV_TIMEOUT_MS) {
            match raw.parse::<u64>() {
                Ok(ms) if ms > 0 => config.timeout = Duration::from_millis(ms),
                _ => tracing::warn!(value = %raw, "ignoring invalid {}", ENV_TIMEOUT_MS),
            }
        }

        if let Some(user_id) = env_value(ENV_USER_ID) {
            config.user_id = Some(user_id);
        }

        if let Some(app) = env_value(ENV_APP) {
            config.app = Some(app);
        }

        config
    }

    /// Absolute URL for an API path such as `/list-apps`.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

fn env_value(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn normalize_base_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}
