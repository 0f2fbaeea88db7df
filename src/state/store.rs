//! Owner of the chat state and the partial-event tracker.
//!
//! Writers go through [`ChatStore::dispatch`] or [`ChatStore::ingest`];
//! readers hold a `watch::Receiver` and only ever see whole snapshots.

use std::sync::Mutex;

use tokio::sync::watch;

use super::{ChatAction, ChatState};
use crate::models::Event;
use crate::tracker::{FinalMergePolicy, PartialTracker};
use crate::transcript::TranscriptOp;

/// Single writer of [`ChatState`].
///
/// Tracker and transcript are updated under one lock so that an op is never
/// published without the tracker state that produced it.
#[derive(Debug)]
pub struct ChatStore {
    state_tx: watch::Sender<ChatState>,
    tracker: Mutex<PartialTracker>,
}

impl Default for ChatStore {
    fn default() -> Self {
        Self::new(ChatState::default())
    }
}

impl ChatStore {
    pub fn new(initial: ChatState) -> Self {
        Self::with_policy(initial, FinalMergePolicy::default())
    }

    pub fn with_policy(initial: ChatState, policy: FinalMergePolicy) -> Self {
        let (state_tx, _) = watch::channel(initial);
        Self {
            state_tx,
            tracker: Mutex::new(PartialTracker::with_policy(policy)),
        }
    }

    /// Subscribe to state snapshots. The receiver starts at the current state.
    pub fn subscribe(&self) -> watch::Receiver<ChatState> {
        self.state_tx.subscribe()
    }

    /// Clone of the current state.
    pub fn snapshot(&self) -> ChatState {
        self.state_tx.borrow().clone()
    }

    /// Read the current state without cloning it.
    pub fn with_state<R>(&self, f: impl FnOnce(&ChatState) -> R) -> R {
        f(&self.state_tx.borrow())
    }

    /// Apply an action and notify subscribers.
    pub fn dispatch(&self, action: ChatAction) {
        tracing::trace!(action = action.name(), "dispatch");
        let mut tracker = self.lock_tracker();
        if action.resets_transcript() {
            tracker.clear();
        }
        self.state_tx.send_modify(|state| state.apply(action));
    }

    /// Run a streamed event through the tracker and apply the resulting op.
    pub fn ingest(&self, event: Event) -> TranscriptOp {
        let mut tracker = self.lock_tracker();
        let op = tracker.observe(event);
        tracing::trace!(
            op = op.name(),
            invocation_id = %op.event().invocation_id,
            "transcript op"
        );
        let applied = op.clone();
        self.state_tx
            .send_modify(|state| state.apply(ChatAction::Transcript(applied)));
        op
    }

    /// Forget the accumulators of turns that will receive no more fragments.
    pub fn abandon_turns<'a>(&self, invocation_ids: impl IntoIterator<Item = &'a str>) {
        let mut tracker = self.lock_tracker();
        for invocation_id in invocation_ids {
            if tracker.abandon(invocation_id) {
                tracing::debug!(invocation_id, "abandoned pending turn");
            }
        }
    }

    /// Number of turns whose final event has not arrived yet.
    pub fn pending_turns(&self) -> usize {
        self.lock_tracker().pending_count()
    }

    pub fn is_pending(&self, invocation_id: &str) -> bool {
        self.lock_tracker().is_pending(invocation_id)
    }

    fn lock_tracker(&self) -> std::sync::MutexGuard<'_, PartialTracker> {
        self.tracker
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
