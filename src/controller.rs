//! User-triggered actions.
//!
//! Each operation checks its preconditions, performs at most one request
//! through [`AgentClient`], and records the outcome in the [`ChatStore`].
//! Failures are stored in `ChatState::error` with a prefix naming the action
//! and returned to the caller. `is_loading` is cleared on every exit path.
//!
//! At most one turn streams at a time. Starting a turn, opening or creating
//! a session, starting a new chat, and resetting cancel the active turn.

use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::client::AgentClient;
use crate::error::{ChatError, ChatResult, ErrorContext, PreconditionError, TransportError};
use crate::models::{Event, RunAgentRequest, SessionSummary};
use crate::preferences::{Preferences, PreferencesStore};
use crate::state::{ChatAction, ChatState, ChatStore};
use crate::stream::{consume_stream, StreamSummary};
use crate::transcript::TranscriptOp;

/// The streaming turn, if any. The token is cancelled whenever no turn is
/// streaming.
#[derive(Debug)]
struct ActiveTurn {
    generation: u64,
    token: CancellationToken,
}

impl Default for ActiveTurn {
    fn default() -> Self {
        let token = CancellationToken::new();
        token.cancel();
        Self {
            generation: 0,
            token,
        }
    }
}

/// Cancels whichever turn is streaming when [`CancelHandle::cancel`] runs.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    active: Arc<Mutex<ActiveTurn>>,
}

impl CancelHandle {
    /// Cancel the streaming turn. Returns false when none was streaming.
    pub fn cancel(&self) -> bool {
        let active = lock(&self.active);
        let live = !active.token.is_cancelled();
        active.token.cancel();
        live
    }

    pub fn is_streaming(&self) -> bool {
        !lock(&self.active).token.is_cancelled()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Drives the chat: apps, sessions, and streamed turns.
#[derive(Debug)]
pub struct ChatController {
    client: AgentClient,
    store: Arc<ChatStore>,
    preferences: Option<PreferencesStore>,
    active: Arc<Mutex<ActiveTurn>>,
}

impl ChatController {
    pub fn new(client: AgentClient, store: Arc<ChatStore>) -> Self {
        Self {
            client,
            store,
            preferences: None,
            active: Arc::new(Mutex::new(ActiveTurn::default())),
        }
    }

    /// Persist app and user selections to `preferences`.
    pub fn with_preferences(mut self, preferences: PreferencesStore) -> Self {
        self.preferences = Some(preferences);
        self
    }

    pub fn store(&self) -> &Arc<ChatStore> {
        &self.store
    }

    pub fn subscribe(&self) -> watch::Receiver<ChatState> {
        self.store.subscribe()
    }

    pub fn snapshot(&self) -> ChatState {
        self.store.snapshot()
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle {
            active: Arc::clone(&self.active),
        }
    }

    /// Apply the stored app and user id, if any.
    pub fn restore_preferences(&self) {
        let Some(store) = &self.preferences else {
            return;
        };
        match store.load() {
            Ok(prefs) => {
                if let Some(app) = prefs.selected_app_name.filter(|a| !a.is_empty()) {
                    self.store.dispatch(ChatAction::SetSelectedApp(Some(app)));
                }
                if let Some(user_id) = prefs.user_id.filter(|u| !u.is_empty()) {
                    self.store.dispatch(ChatAction::SetUserId(user_id));
                }
            }
            Err(err) => warn!(error = %err, "ignoring unreadable preferences"),
        }
    }

    /// Fetch the app list; select the first app when none is selected.
    pub async fn load_apps(&self) -> ChatResult<Vec<String>> {
        self.store.dispatch(ChatAction::SetLoading(true));
        let result = self.client.list_apps().await;
        let outcome = match result {
            Ok(apps) => {
                debug!(count = apps.len(), "apps loaded");
                self.store.dispatch(ChatAction::SetApps(apps.clone()));
                let has_selection = self
                    .store
                    .with_state(|s| s.selected_app.as_deref().is_some_and(|a| !a.is_empty()));
                if !has_selection {
                    if let Some(first) = apps.first() {
                        self.set_selected_app(first);
                    }
                }
                Ok(apps)
            }
            Err(err) => Err(self.fail("Failed to load apps", err, ErrorContext::new("list_apps"))),
        };
        self.store.dispatch(ChatAction::SetLoading(false));
        outcome
    }

    /// Select an app and remember it. Switching apps leaves the current
    /// session, which belongs to the previous app.
    pub fn set_selected_app(&self, app_name: &str) {
        let changed = self
            .store
            .with_state(|s| s.selected_app.as_deref() != Some(app_name));
        if changed {
            info!(app = app_name, "app selected");
            self.leave_session();
            self.store.dispatch(ChatAction::SetSessions(Vec::new()));
        }
        self.store
            .dispatch(ChatAction::SetSelectedApp(Some(app_name.to_string())));
        self.persist(|p| p.selected_app_name = Some(app_name.to_string()));
    }

    /// Set the user id and remember it. Sessions are per user, so the
    /// current one is left when the id changes.
    pub fn set_user_id(&self, user_id: &str) {
        let changed = self.store.with_state(|s| s.user_id != user_id);
        if changed {
            info!(user_id, "user changed");
            self.leave_session();
            self.store.dispatch(ChatAction::SetSessions(Vec::new()));
        }
        self.store.dispatch(ChatAction::SetUserId(user_id.to_string()));
        self.persist(|p| p.user_id = Some(user_id.to_string()));
    }

    /// Fetch the session list for the selected app and user, newest first.
    pub async fn load_sessions(&self) -> ChatResult<Vec<SessionSummary>> {
        let (app, user) = self.selection()?;
        self.store.dispatch(ChatAction::SetLoading(true));
        let outcome = match self.client.list_sessions(&app, &user).await {
            Ok(mut sessions) => {
                sessions.sort_by(|a, b| b.last_update_time.total_cmp(&a.last_update_time));
                debug!(count = sessions.len(), app = %app, "sessions loaded");
                self.store.dispatch(ChatAction::SetSessions(sessions.clone()));
                Ok(sessions)
            }
            Err(err) => Err(self.fail(
                "Failed to load sessions",
                err,
                ErrorContext::new("list_sessions").with_app_name(&app),
            )),
        };
        self.store.dispatch(ChatAction::SetLoading(false));
        outcome
    }

    /// Open a stored session and seed the transcript with its events.
    pub async fn select_session(&self, session_id: &str) -> ChatResult<()> {
        let (app, user) = self.selection()?;
        self.cancel_active_turn();
        self.store.dispatch(ChatAction::SetLoading(true));
        let outcome = match self.client.get_session(&app, &user, session_id).await {
            Ok(session) => {
                info!(session_id, events = session.events.len(), "session opened");
                let events = session.events.clone();
                self.store.dispatch(ChatAction::SetCurrentSession(Some(session)));
                self.store.dispatch(ChatAction::SetMessages(events));
                Ok(())
            }
            Err(err) => Err(self.fail(
                "Failed to load session",
                err,
                ErrorContext::new("get_session")
                    .with_app_name(&app)
                    .with_session_id(session_id),
            )),
        };
        self.store.dispatch(ChatAction::SetLoading(false));
        outcome
    }

    /// Create a session, make it current and put it at the top of the list.
    pub async fn create_session(&self) -> ChatResult<String> {
        let (app, user) = self.selection()?;
        self.cancel_active_turn();
        self.store.dispatch(ChatAction::SetLoading(true));
        let outcome = match self.client.create_session(&app, &user).await {
            Ok(session) => {
                info!(session_id = %session.id, app = %app, "session created");
                let id = session.id.clone();
                let mut sessions = vec![SessionSummary::from(&session)];
                sessions.extend(self.store.with_state(|s| s.sessions.clone()));
                self.store.dispatch(ChatAction::SetCurrentSession(Some(session)));
                self.store.dispatch(ChatAction::SetSessions(sessions));
                self.store.dispatch(ChatAction::SetMessages(Vec::new()));
                Ok(id)
            }
            Err(err) => Err(self.fail(
                "Failed to create session",
                err,
                ErrorContext::new("create_session").with_app_name(&app),
            )),
        };
        self.store.dispatch(ChatAction::SetLoading(false));
        outcome
    }

    /// Delete a session. Deleting the current one leaves it.
    pub async fn delete_session(&self, session_id: &str) -> ChatResult<()> {
        let (app, user) = self.selection()?;
        self.store.dispatch(ChatAction::SetLoading(true));
        let outcome = match self.client.delete_session(&app, &user, session_id).await {
            Ok(()) => {
                info!(session_id, "session deleted");
                let remaining: Vec<SessionSummary> = self.store.with_state(|s| {
                    s.sessions
                        .iter()
                        .filter(|summary| summary.id != session_id)
                        .cloned()
                        .collect()
                });
                self.store.dispatch(ChatAction::SetSessions(remaining));
                let was_current = self
                    .store
                    .with_state(|s| s.current_session_id() == Some(session_id));
                if was_current {
                    self.leave_session();
                }
                Ok(())
            }
            Err(err) => Err(self.fail(
                "Failed to delete session",
                err,
                ErrorContext::new("delete_session")
                    .with_app_name(&app)
                    .with_session_id(session_id),
            )),
        };
        self.store.dispatch(ChatAction::SetLoading(false));
        outcome
    }

    /// Leave the current session and clear the transcript.
    pub fn new_chat(&self) {
        self.leave_session();
    }

    /// Send a user message on the current session and stream the reply into
    /// the transcript.
    ///
    /// The user's message is appended before the request is made. A
    /// cancelled turn returns `Ok` with `cancelled` set.
    pub async fn send_message(&self, text: &str) -> ChatResult<StreamSummary> {
        let (app, user) = self.selection()?;
        if text.trim().is_empty() {
            return Err(PreconditionError::EmptyMessage.into());
        }
        let session_id = self
            .store
            .with_state(|s| s.current_session_id().map(str::to_string))
            .ok_or(PreconditionError::NoSession)?;

        let (generation, token) = self.begin_turn();
        self.store.dispatch(ChatAction::SetLoading(true));
        self.store
            .dispatch(ChatAction::Transcript(TranscriptOp::Append(Event::user_message(text))));

        let request = RunAgentRequest::new(&app, &user, &session_id, text);
        let context = || {
            ErrorContext::new("send_message")
                .with_app_name(&app)
                .with_session_id(&session_id)
        };

        let outcome = match self.client.run_sse(&request).await {
            Ok(body) => match consume_stream(body, &self.store, &token).await {
                Ok(summary) => {
                    info!(
                        session_id = %session_id,
                        events = summary.events_applied,
                        cancelled = summary.cancelled,
                        "turn finished"
                    );
                    Ok(summary)
                }
                Err(err) => Err(self.fail("Failed to send message", err, context())),
            },
            Err(err) => Err(self.fail("Failed to send message", err, context())),
        };

        self.finish_turn(generation);
        outcome
    }

    /// Stop consuming the active turn's stream, if any. The stopped turn no
    /// longer owns `is_loading`; the caller does. Returns true when a turn
    /// was streaming.
    pub fn cancel_active_turn(&self) -> bool {
        let mut active = lock(&self.active);
        let live = !active.token.is_cancelled();
        active.token.cancel();
        active.generation += 1;
        live
    }

    pub fn clear_error(&self) {
        self.store.dispatch(ChatAction::ClearError);
    }

    /// Cancel any turn and return to the initial state.
    pub fn reset(&self) {
        self.cancel_active_turn();
        self.store.dispatch(ChatAction::Reset);
    }

    fn selection(&self) -> Result<(String, String), PreconditionError> {
        self.store.with_state(|s| {
            let app = s
                .selected_app
                .clone()
                .filter(|a| !a.is_empty())
                .ok_or(PreconditionError::NoAppSelected)?;
            if s.user_id.is_empty() {
                return Err(PreconditionError::NoUserId);
            }
            Ok((app, s.user_id.clone()))
        })
    }

    fn leave_session(&self) {
        if self.cancel_active_turn() {
            self.store.dispatch(ChatAction::SetLoading(false));
        }
        self.store.dispatch(ChatAction::SetCurrentSession(None));
        self.store.dispatch(ChatAction::SetMessages(Vec::new()));
    }

    /// Cancel the previous turn and install a fresh token.
    fn begin_turn(&self) -> (u64, CancellationToken) {
        let mut active = lock(&self.active);
        active.token.cancel();
        active.generation += 1;
        active.token = CancellationToken::new();
        (active.generation, active.token.clone())
    }

    /// Clear the loading flag unless the turn was superseded, either by a
    /// newer turn or by a session change.
    fn finish_turn(&self, generation: u64) {
        let current = {
            let active = lock(&self.active);
            if active.generation == generation {
                active.token.cancel();
                true
            } else {
                false
            }
        };
        if current {
            self.store.dispatch(ChatAction::SetLoading(false));
        }
    }

    fn fail(&self, prefix: &str, err: TransportError, context: ErrorContext) -> ChatError {
        let err = ChatError::from(err).with_context(context);
        warn!(
            code = err.error_code(),
            category = %err.category(),
            context = %err.context().map(ErrorContext::to_log_string).unwrap_or_default(),
            "{}: {}",
            prefix,
            err
        );
        self.store
            .dispatch(ChatAction::SetError(format!("{}: {}", prefix, err.user_message())));
        err
    }

    fn persist(&self, f: impl FnOnce(&mut Preferences)) {
        if let Some(store) = &self.preferences {
            if let Err(err) = store.update(f) {
                warn!(error = %err, "failed to save preferences");
            }
        }
    }
}
