//! Common test utilities for integration tests.
//!
//! Event fixtures in wire form, SSE body builders, and a builder for a
//! controller wired to a [`MockHttpClient`].
//!
//! # Example
//!
//! ```ignore
//! use common::{TestControllerBuilder, sse_body};
//!
//! let (controller, http) = TestControllerBuilder::new()
//!     .with_app("weather")
//!     .with_session("s1")
//!     .build();
//! ```

#![allow(dead_code)]

pub mod mocks;

pub use mocks::*;

use std::sync::Arc;

use adk_chat::client::AgentClient;
use adk_chat::controller::ChatController;
use adk_chat::models::{Event, Session};
use adk_chat::state::{ChatAction, ChatStore};
use serde_json::{json, Value};

pub const BASE_URL: &str = "http://agent.test";

/// Wire JSON for an agent event carrying a single text part.
pub fn text_event(invocation_id: &str, text: &str, partial: bool) -> Value {
    json!({
        "id": format!("{}-{}", invocation_id, text.len()),
        "invocationId": invocation_id,
        "author": "weather_agent",
        "timestamp": 1718000000.5,
        "partial": partial,
        "content": {"role": "model", "parts": [{"text": text}]}
    })
}

/// The same event as a decoded [`Event`].
pub fn agent_event(invocation_id: &str, text: &str, partial: bool) -> Event {
    serde_json::from_value(text_event(invocation_id, text, partial))
        .expect("fixture must decode")
}

/// One SSE record: `data: <json>` plus the blank separator line.
pub fn sse_record(value: &Value) -> String {
    format!("data: {}\n\n", value)
}

/// A complete SSE body from event payloads, terminated by `[DONE]`.
pub fn sse_body(values: &[Value]) -> String {
    let mut body: String = values.iter().map(sse_record).collect();
    body.push_str("data: [DONE]\n\n");
    body
}

/// Text of every transcript entry, in order.
pub fn transcript_texts(events: &[Event]) -> Vec<String> {
    events.iter().map(Event::text).collect()
}

/// A stored session as the server returns it.
pub fn session_json(id: &str, events: &[Value]) -> Value {
    json!({
        "id": id,
        "appName": "weather",
        "userId": "user",
        "state": {},
        "events": events,
        "lastUpdateTime": 1718000000.0
    })
}

pub fn session(id: &str) -> Session {
    serde_json::from_value(session_json(id, &[])).expect("fixture must decode")
}

/// Builder for a controller over a mock transport.
#[derive(Default)]
pub struct TestControllerBuilder {
    app: Option<String>,
    user_id: Option<String>,
    session_id: Option<String>,
    http: Option<MockHttpClient>,
}

impl TestControllerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_app(mut self, app: &str) -> Self {
        self.app = Some(app.to_string());
        self
    }

    pub fn with_user(mut self, user_id: &str) -> Self {
        self.user_id = Some(user_id.to_string());
        self
    }

    /// Make `session_id` current, with an empty transcript.
    pub fn with_session(mut self, session_id: &str) -> Self {
        self.session_id = Some(session_id.to_string());
        self
    }

    pub fn with_http(mut self, http: MockHttpClient) -> Self {
        self.http = Some(http);
        self
    }

    pub fn build(self) -> (ChatController, MockHttpClient) {
        let http = self.http.unwrap_or_default();
        let store = Arc::new(ChatStore::default());
        if let Some(app) = self.app {
            store.dispatch(ChatAction::SetSelectedApp(Some(app)));
        }
        if let Some(user_id) = self.user_id {
            store.dispatch(ChatAction::SetUserId(user_id));
        }
        if let Some(id) = self.session_id {
            store.dispatch(ChatAction::SetCurrentSession(Some(session(&id))));
        }
        let client = AgentClient::new(Arc::new(http.clone()), BASE_URL);
        (ChatController::new(client, store), http)
    }
}
