//! Application state and its reducer.
//!
//! - `ChatState`: everything the render layer shows (apps, sessions, the
//!   transcript, loading flag, last error)
//! - `ChatAction`: the only way state changes
//! - `ChatStore`: owns the state plus the partial-event tracker and publishes
//!   a snapshot after every transition

mod store;

pub use store::ChatStore;

use serde::Serialize;

use crate::models::{Event, Session, SessionSummary};
use crate::transcript::{Transcript, TranscriptOp};

/// User id used until one is chosen.
pub const DEFAULT_USER_ID: &str = "user";

/// Snapshot of the chat application state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatState {
    pub apps: Vec<String>,
    pub selected_app: Option<String>,
    pub user_id: String,
    pub sessions: Vec<SessionSummary>,
    pub current_session: Option<Session>,
    pub transcript: Transcript,
    pub is_loading: bool,
    /// Last user-facing error, already prefixed with the failing action.
    pub error: Option<String>,
}

impl Default for ChatState {
    fn default() -> Self {
        Self {
            apps: Vec::new(),
            selected_app: None,
            user_id: DEFAULT_USER_ID.to_string(),
            sessions: Vec::new(),
            current_session: None,
            transcript: Transcript::new(),
            is_loading: false,
            error: None,
        }
    }
}

impl ChatState {
    pub fn current_session_id(&self) -> Option<&str> {
        self.current_session.as_ref().map(|s| s.id.as_str())
    }

    pub fn events(&self) -> &[Event] {
        self.transcript.events()
    }

    /// Apply one action in place.
    pub fn apply(&mut self, action: ChatAction) {
        match action {
            ChatAction::SetApps(apps) => self.apps = apps,
            ChatAction::SetSelectedApp(app) => self.selected_app = app,
            ChatAction::SetUserId(user_id) => self.user_id = user_id,
            ChatAction::SetSessions(sessions) => self.sessions = sessions,
            ChatAction::SetCurrentSession(session) => self.current_session = session,
            ChatAction::SetMessages(events) => self.transcript = Transcript::from_events(events),
            ChatAction::Transcript(op) => self.transcript.apply_mut(op),
            ChatAction::SetLoading(loading) => self.is_loading = loading,
            ChatAction::SetError(message) => self.error = Some(message),
            ChatAction::ClearError => self.error = None,
            ChatAction::Reset => *self = ChatState::default(),
        }
    }
}

/// Every state transition the application performs.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatAction {
    SetApps(Vec<String>),
    SetSelectedApp(Option<String>),
    SetUserId(String),
    SetSessions(Vec<SessionSummary>),
    SetCurrentSession(Option<Session>),
    /// Replace the whole transcript, e.g. with a loaded session's events.
    SetMessages(Vec<Event>),
    /// One reconciliation step from the tracker.
    Transcript(TranscriptOp),
    SetLoading(bool),
    SetError(String),
    ClearError,
    /// Back to the initial state.
    Reset,
}

impl ChatAction {
    /// True for actions after which no turn may still be in flight.
    pub fn resets_transcript(&self) -> bool {
        matches!(self, ChatAction::SetMessages(_) | ChatAction::Reset)
    }

    pub fn name(&self) -> &'static str {
        match self {
            ChatAction::SetApps(_) => "set_apps",
            ChatAction::SetSelectedApp(_) => "set_selected_app",
            ChatAction::SetUserId(_) => "set_user_id",
            ChatAction::SetSessions(_) => "set_sessions",
            ChatAction::SetCurrentSession(_) => "set_current_session",
            ChatAction::SetMessages(_) => "set_messages",
            ChatAction::Transcript(op) => op.name(),
            ChatAction::SetLoading(_) => "set_loading",
            ChatAction::SetError(_) => "set_error",
            ChatAction::ClearError => "clear_error",
            ChatAction::Reset => "reset",
        }
    }
}

/// Pure form of [`ChatState::apply`].
pub fn reduce(state: &ChatState, action: ChatAction) -> ChatState {
    let mut next = state.clone();
    next.apply(action);
    next
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Content;

    fn agent_event(invocation: &str, partial: Option<bool>, text: &str) -> Event {
        let mut e = Event::user_message(text);
        e.invocation_id = invocation.to_string();
        e.author = "agent".to_string();
        e.partial = partial;
        e.content = Some(Content::text("model", text));
        e
    }

    #[test]
    fn test_default_state() {
        let state = ChatState::default();
        assert_eq!(state.user_id, "user");
        assert!(state.apps.is_empty());
        assert!(state.selected_app.is_none());
        assert!(state.transcript.is_empty());
        assert!(!state.is_loading);
        assert!(state.error.is_none());
    }

    #[test]
    fn test_reduce_is_pure() {
        let state = ChatState::default();
        let next = reduce(&state, ChatAction::SetApps(vec!["weather".to_string()]));
        assert!(state.apps.is_empty());
        assert_eq!(next.apps, vec!["weather"]);
    }

    #[test]
    fn test_transcript_ops_flow_through() {
        let state = reduce(
            &ChatState::default(),
            ChatAction::Transcript(TranscriptOp::Append(agent_event("t", Some(true), "He"))),
        );
        let state = reduce(
            &state,
            ChatAction::Transcript(TranscriptOp::Replace(agent_event("t", None, "Hello"))),
        );
        assert_eq!(state.events().len(), 1);
        assert_eq!(state.events()[0].text(), "Hello");
    }

    #[test]
    fn test_set_messages_seeds_transcript() {
        let state = reduce(
            &ChatState::default(),
            ChatAction::SetMessages(vec![agent_event("a", None, "x"), agent_event("b", None, "y")]),
        );
        assert_eq!(state.transcript.len(), 2);
    }

    #[test]
    fn test_error_set_and_clear() {
        let state = reduce(&ChatState::default(), ChatAction::SetError("boom".to_string()));
        assert_eq!(state.error.as_deref(), Some("boom"));
        let state = reduce(&state, ChatAction::ClearError);
        assert!(state.error.is_none());
    }

    #[test]
    fn test_reset_restores_initial_state() {
        let mut state = ChatState::default();
        state.apply(ChatAction::SetApps(vec!["a".to_string()]));
        state.apply(ChatAction::SetUserId("alice".to_string()));
        state.apply(ChatAction::SetLoading(true));
        state.apply(ChatAction::Transcript(TranscriptOp::Append(agent_event("t", None, "x"))));
        state.apply(ChatAction::Reset);
        assert_eq!(state, ChatState::default());
    }

    #[test]
    fn test_resets_transcript() {
        assert!(ChatAction::Reset.resets_transcript());
        assert!(ChatAction::SetMessages(vec![]).resets_transcript());
        assert!(!ChatAction::ClearError.resets_transcript());
    }
}
