//! Stored sessions as returned by the session endpoints.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::event::Event;

/// A full session, including its recorded events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: String,
    pub app_name: String,
    pub user_id: String,
    #[serde(default)]
    pub state: Map<String, Value>,
    #[serde(default)]
    pub events: Vec<Event>,
    #[serde(default)]
    pub last_update_time: f64,
}

/// List form of a session. The server sends `events` empty here, and entries
/// are not decoded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub id: String,
    #[serde(default)]
    pub app_name: String,
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub state: Map<String, Value>,
    #[serde(default)]
    pub events: Vec<Value>,
    #[serde(default)]
    pub last_update_time: f64,
}

impl SessionSummary {
    /// Last update as a UTC datetime, when the timestamp is representable.
    pub fn last_updated(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        let secs = self.last_update_time.trunc() as i64;
        let nanos = (self.last_update_time.fract() * 1e9) as u32;
        chrono::DateTime::from_timestamp(secs, nanos)
    }
}

impl From<&Session> for SessionSummary {
    fn from(session: &Session) -> Self {
        Self {
            id: session.id.clone(),
            app_name: session.app_name.clone(),
            user_id: session.user_id.clone(),
            state: session.state.clone(),
            events: Vec::new(),
            last_update_time: session.last_update_time,
        }
    }
}
