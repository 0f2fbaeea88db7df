//! Per-turn accumulation of partial events.
//!
//! Each invocation id is either ABSENT (no accumulator) or PENDING (an
//! unfinalized fragment has been seen). For every incoming event the tracker
//! decides which [`TranscriptOp`] to emit:
//!
//! | incoming | state   | op              | next state |
//! |----------|---------|-----------------|------------|
//! | partial  | ABSENT  | `Append`        | PENDING    |
//! | partial  | PENDING | `UpdateInPlace` | PENDING    |
//! | final    | PENDING | `Replace`       | ABSENT     |
//! | final    | ABSENT  | `Append`        | ABSENT     |
//!
//! Ordering is enforced only within one invocation id; distinct ids
//! interleave freely.

use std::collections::HashMap;

use crate::models::{Content, Event, Part};
use crate::transcript::TranscriptOp;

/// What to do with accumulated text when the final event arrives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FinalMergePolicy {
    /// The final event's content is authoritative; accumulated text is dropped.
    #[default]
    FinalWins,
    /// The final event's text is appended to the accumulated text.
    Concatenate,
}

/// Tracks in-flight turns keyed by invocation id.
#[derive(Debug, Default)]
pub struct PartialTracker {
    pending: HashMap<String, Event>,
    policy: FinalMergePolicy,
}

impl PartialTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: FinalMergePolicy) -> Self {
        Self {
            pending: HashMap::new(),
            policy,
        }
    }

    pub fn policy(&self) -> FinalMergePolicy {
        self.policy
    }

    /// Run one event through the state machine and return the op to apply.
    pub fn observe(&mut self, event: Event) -> TranscriptOp {
        if event.is_partial() {
            match self.pending.remove(&event.invocation_id) {
                Some(accumulated) => {
                    let merged = merge_fragment(accumulated, &event);
                    self.pending
                        .insert(merged.invocation_id.clone(), merged.clone());
                    TranscriptOp::UpdateInPlace(merged)
                }
                None => {
                    tracing::trace!(invocation_id = %event.invocation_id, "turn started");
                    self.pending
                        .insert(event.invocation_id.clone(), event.clone());
                    TranscriptOp::Append(event)
                }
            }
        } else {
            match self.pending.remove(&event.invocation_id) {
                Some(accumulated) => {
                    tracing::trace!(invocation_id = %event.invocation_id, "turn finalized");
                    let finalized = match self.policy {
                        FinalMergePolicy::FinalWins => event,
                        FinalMergePolicy::Concatenate => concatenate_final(accumulated, event),
                    };
                    TranscriptOp::Replace(finalized)
                }
                None => TranscriptOp::Append(event),
            }
        }
    }

    /// The accumulator for `invocation_id`, if the turn is still in flight.
    pub fn accumulated(&self, invocation_id: &str) -> Option<&Event> {
        self.pending.get(invocation_id)
    }

    pub fn is_pending(&self, invocation_id: &str) -> bool {
        self.pending.contains_key(invocation_id)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Drop the accumulator for one turn. Its transcript entry stays as last
    /// shown; a later fragment for the same id starts a new entry.
    pub fn abandon(&mut self, invocation_id: &str) -> bool {
        self.pending.remove(invocation_id).is_some()
    }

    /// Drop every accumulator. Called whenever the transcript is reset.
    pub fn clear(&mut self) {
        self.pending.clear();
    }
}

/// Fold a partial fragment into the accumulator.
///
/// Non-text parts already accumulated are kept, non-text parts of the
/// fragment follow them, and a single text part holding the accumulated text
/// plus the fragment's text goes last, carrying the extra keys of the first
/// text part seen. Identity fields stay those of the first fragment.
fn merge_fragment(mut accumulated: Event, fragment: &Event) -> Event {
    let Some(incoming) = fragment.content.as_ref() else {
        return accumulated;
    };

    let existing = accumulated.content.take().unwrap_or_else(|| Content {
        role: incoming.role.clone(),
        parts: Vec::new(),
    });

    let text = format!("{}{}", existing.joined_text(), incoming.joined_text());
    let text_extra = existing
        .parts
        .iter()
        .chain(incoming.parts.iter())
        .find_map(|p| match p {
            Part::Text { extra, .. } => Some(extra.clone()),
            _ => None,
        });

    let mut parts: Vec<Part> = existing
        .parts
        .into_iter()
        .filter(|p| !p.is_text())
        .collect();
    parts.extend(incoming.parts.iter().filter(|p| !p.is_text()).cloned());
    if let Some(extra) = text_extra {
        parts.push(Part::Text { text, extra });
    }

    accumulated.content = Some(Content {
        role: existing.role,
        parts,
    });
    accumulated
}

/// Final event whose text is the accumulated text followed by its own.
fn concatenate_final(accumulated: Event, final_event: Event) -> Event {
    let mut merged = merge_fragment(accumulated, &final_event);
    merged.id = final_event.id;
    merged.timestamp = final_event.timestamp;
    merged.partial = final_event.partial;
    merged.turn_complete = final_event.turn_complete;
    merged.error_code = final_event.error_code;
    merged.error_message = final_event.error_message;
    merged.actions = final_event.actions;
    merged
}
