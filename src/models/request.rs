use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::content::Content;

/// Body of `POST /run_sse`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RunAgentRequest {
    pub app_name: String,
    pub user_id: String,
    pub session_id: String,
    pub new_message: Content,
    pub streaming: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_delta: Option<Map<String, Value>>,
}

impl RunAgentRequest {
    /// Create a streaming request carrying a single user text message.
    pub fn new(
        app_name: impl Into<String>,
        user_id: impl Into<String>,
        session_id: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            app_name: app_name.into(),
            user_id: user_id.into(),
            session_id: session_id.into(),
            new_message: Content::text("user", text),
            streaming: true,
            state_delta: None,
        }
    }

    /// Attach a state delta to apply before the turn runs.
    pub fn with_state_delta(mut self, delta: Map<String, Value>) -> Self {
        self.state_delta = Some(delta);
        self
    }
}
