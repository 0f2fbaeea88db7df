//! Sequential consumption of one `/run_sse` response.
//!
//! Chunk by chunk: bytes go through the [`RecordReader`], each record through
//! [`parse_record`], each event through the store's tracker into the
//! transcript. The next chunk is only polled after every record of the
//! previous one has been applied.

use std::collections::HashSet;

use futures::StreamExt;
use tokio_util::sync::CancellationToken;

use crate::error::TransportError;
use crate::sse::{parse_record, Record, RecordReader};
use crate::state::ChatStore;
use crate::traits::ByteStream;

/// Counters describing how a stream was consumed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreamSummary {
    /// Non-blank records seen.
    pub records: usize,
    /// Events handed to the tracker.
    pub events_applied: usize,
    /// Records skipped because they failed to decode.
    pub parse_failures: usize,
    /// Whether the `[DONE]` marker was seen.
    pub done_received: bool,
    /// Whether consumption stopped because the turn was cancelled.
    pub cancelled: bool,
}

/// Drain `body` into `store` until it ends, fails, or `cancel` fires.
///
/// Malformed records are logged and skipped. A transport failure mid-stream
/// is returned after every record that arrived before it has been applied.
/// Cancellation is not an error. When the stream is cancelled or fails, the
/// tracker forgets the turns it started; their entries stay in the
/// transcript as last shown.
pub async fn consume_stream(
    mut body: ByteStream,
    store: &ChatStore,
    cancel: &CancellationToken,
) -> Result<StreamSummary, TransportError> {
    let mut reader = RecordReader::new();
    let mut summary = StreamSummary::default();
    let mut turns: HashSet<String> = HashSet::new();

    loop {
        let chunk = tokio::select! {
            biased;
            () = cancel.cancelled() => {
                tracing::debug!(
                    records = summary.records,
                    buffered = !reader.is_empty(),
                    "stream cancelled"
                );
                summary.cancelled = true;
                store.abandon_turns(turns.iter().map(String::as_str));
                return Ok(summary);
            }
            chunk = body.next() => chunk,
        };

        match chunk {
            Some(Ok(bytes)) => {
                for record in reader.feed(&bytes) {
                    handle_record(&record, store, &mut summary, &mut turns);
                }
            }
            Some(Err(err)) => {
                tracing::warn!(error = %err, records = summary.records, "stream read failed");
                store.abandon_turns(turns.iter().map(String::as_str));
                return Err(TransportError::interrupted(err));
            }
            None => break,
        }
    }

    if let Some(record) = reader.finish() {
        handle_record(&record, store, &mut summary, &mut turns);
    }

    tracing::debug!(
        records = summary.records,
        events = summary.events_applied,
        parse_failures = summary.parse_failures,
        done = summary.done_received,
        "stream finished"
    );
    Ok(summary)
}

fn handle_record(
    record: &str,
    store: &ChatStore,
    summary: &mut StreamSummary,
    turns: &mut HashSet<String>,
) {
    summary.records += 1;
    match parse_record(record) {
        Ok(Record::Event(event)) => {
            if !turns.contains(&event.invocation_id) {
                turns.insert(event.invocation_id.clone());
            }
            store.ingest(*event);
            summary.events_applied += 1;
        }
        Ok(Record::Done) => summary.done_received = true,
        Ok(Record::Ignored) => {}
        Err(err) => {
            summary.parse_failures += 1;
            tracing::warn!(error = %err, "skipping malformed event record");
        }
    }
}
