//! The ordered conversation transcript and its transition operations.
//!
//! Transitions are synchronous and side-effect free: [`Transcript::apply`]
//! maps `(transcript, op)` to the next transcript, so a recorded op log can
//! be replayed deterministically.

use serde::{Deserialize, Serialize};

use crate::models::Event;

/// A mutation produced by the partial-event tracker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", content = "event", rename_all = "snake_case")]
pub enum TranscriptOp {
    /// Insert at the end. Fixes the turn's display position.
    Append(Event),
    /// Overwrite the in-flight entry for the event's invocation id.
    /// No-op when there is none.
    UpdateInPlace(Event),
    /// Finalize the in-flight entry for the event's invocation id,
    /// appending when there is none.
    Replace(Event),
}

impl TranscriptOp {
    pub fn event(&self) -> &Event {
        match self {
            TranscriptOp::Append(e) | TranscriptOp::UpdateInPlace(e) | TranscriptOp::Replace(e) => e,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            TranscriptOp::Append(_) => "append",
            TranscriptOp::UpdateInPlace(_) => "update_in_place",
            TranscriptOp::Replace(_) => "replace",
        }
    }
}

/// Ordered sequence of events forming the visible conversation.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Transcript {
    events: Vec<Event>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed from previously stored events, e.g. when a session is opened.
    pub fn from_events(events: Vec<Event>) -> Self {
        Self { events }
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn last(&self) -> Option<&Event> {
        self.events.last()
    }

    /// Index of the unfinalized entry for `invocation_id`, if any.
    pub fn pending_index(&self, invocation_id: &str) -> Option<usize> {
        self.events
            .iter()
            .position(|e| e.invocation_id == invocation_id && e.is_partial())
    }

    /// Pure transition: the transcript that results from applying `op`.
    pub fn apply(&self, op: &TranscriptOp) -> Transcript {
        let mut next = self.clone();
        next.apply_mut(op.clone());
        next
    }

    /// In-place form of [`Transcript::apply`].
    pub fn apply_mut(&mut self, op: TranscriptOp) {
        match op {
            TranscriptOp::Append(event) => self.events.push(event),
            TranscriptOp::UpdateInPlace(event) => {
                if let Some(idx) = self.pending_index(&event.invocation_id) {
                    self.events[idx] = event;
                }
            }
            TranscriptOp::Replace(event) => match self.pending_index(&event.invocation_id) {
                Some(idx) => self.events[idx] = event,
                None => self.events.push(event),
            },
        }
    }

    /// Replay a sequence of operations from an empty transcript.
    pub fn replay<'a, I>(ops: I) -> Transcript
    where
        I: IntoIterator<Item = &'a TranscriptOp>,
    {
        ops.into_iter()
            .fold(Transcript::new(), |transcript, op| transcript.apply(op))
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}
