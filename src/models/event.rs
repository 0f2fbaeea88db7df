//! Conversation events as emitted by the agent server.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::content::Content;

/// Side effects attached to an event.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventActions {
    #[serde(default)]
    pub state_delta: Map<String, Value>,
    #[serde(default)]
    pub artifact_delta: Map<String, Value>,
    #[serde(default)]
    pub requested_auth_configs: Map<String, Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One conversational unit: a user message, or one fragment or the whole of
/// an agent turn.
///
/// `partial` is tri-state on the wire; an absent field means "not partial".
/// Fields this crate does not model are kept in `extra` and written back
/// unchanged on serialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: String,
    pub invocation_id: String,
    pub author: String,
    pub timestamp: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partial: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Content>,
    #[serde(default)]
    pub actions: EventActions,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub turn_complete: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Event {
    /// Build a locally-originated user message.
    ///
    /// The server never echoes the user's message on the stream, so the
    /// client adds it to the transcript itself under a `manual-` invocation id.
    pub fn user_message(text: impl Into<String>) -> Self {
        let now = chrono::Utc::now();
        let millis = now.timestamp_millis();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            invocation_id: format!("manual-{}", millis),
            author: "user".to_string(),
            timestamp: millis as f64 / 1000.0,
            partial: None,
            content: Some(Content::text("user", text)),
            actions: EventActions::default(),
            turn_complete: None,
            error_code: None,
            error_message: None,
            extra: Map::new(),
        }
    }

    /// True only when the server explicitly flagged the event as partial.
    pub fn is_partial(&self) -> bool {
        self.partial == Some(true)
    }

    /// True when authored by the human side of the conversation.
    pub fn is_user(&self) -> bool {
        self.author == "user"
    }

    /// Text parts joined in order, empty when the event has no content.
    pub fn text(&self) -> String {
        self.content
            .as_ref()
            .map(Content::joined_text)
            .unwrap_or_default()
    }
}
