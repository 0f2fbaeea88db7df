//! Record-level parsing of the event stream.
//!
//! Each record is one line, optionally framed with an SSE `data:` prefix.
//! Decoding never aborts the stream: a bad record becomes a [`ParseError`]
//! that the caller logs and skips.

use thiserror::Error;

use crate::models::Event;

/// Sentinel payload marking the end of the stream.
pub const DONE_SENTINEL: &str = "[DONE]";

/// How many characters of an offending record to keep for diagnostics.
const PREVIEW_LEN: usize = 120;

/// The result of parsing one record.
#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    /// A decoded conversation event.
    Event(Box<Event>),
    /// The `[DONE]` end marker. Produces no transcript operation.
    Done,
    /// SSE comments, non-data fields and empty payloads.
    Ignored,
}

/// A record that could not be decoded into an [`Event`].
#[derive(Debug, Error)]
#[error("invalid event record `{preview}`: {source}")]
pub struct ParseError {
    /// Leading part of the offending payload.
    pub preview: String,
    #[source]
    pub source: serde_json::Error,
}

/// Strip the optional `data:` framing and surrounding whitespace.
pub fn strip_framing(record: &str) -> &str {
    let trimmed = record.trim();
    match trimmed.strip_prefix("data:") {
        Some(rest) => rest.trim(),
        None => trimmed,
    }
}

/// Parse a single raw record.
pub fn parse_record(record: &str) -> Result<Record, ParseError> {
    let trimmed = record.trim();

    // `:` starts an SSE comment (keep-alives); other SSE fields carry no event.
    if trimmed.starts_with(':')
        || trimmed.starts_with("event:")
        || trimmed.starts_with("id:")
        || trimmed.starts_with("retry:")
    {
        return Ok(Record::Ignored);
    }

    let payload = strip_framing(trimmed);
    if payload.is_empty() {
        return Ok(Record::Ignored);
    }
    if payload == DONE_SENTINEL {
        return Ok(Record::Done);
    }

    serde_json::from_str::<Event>(payload)
        .map(|event| Record::Event(Box::new(event)))
        .map_err(|source| ParseError {
            preview: preview(payload),
            source,
        })
}

fn preview(payload: &str) -> String {
    if payload.chars().count() <= PREVIEW_LEN {
        payload.to_string()
    } else {
        let head: String = payload.chars().take(PREVIEW_LEN).collect();
        format!("{}...", head)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EVENT: &str = r#"{"id":"e1","invocationId":"t1","author":"agent","timestamp":1.0,"partial":true,"content":{"role":"model","parts":[{"text":"Hel"}]}}"#;

    #[test]
    fn test_parse_prefixed_event() {
        let record = format!("data: {}", EVENT);
        match parse_record(&record).unwrap() {
            Record::Event(event) => {
                assert_eq!(event.invocation_id, "t1");
                assert_eq!(event.partial, Some(true));
                assert_eq!(event.text(), "Hel");
            }
            other => panic!("Expected Event, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_unprefixed_event() {
        assert!(matches!(parse_record(EVENT).unwrap(), Record::Event(_)));
    }

    #[test]
    fn test_prefix_without_space() {
        let record = format!("data:{}", EVENT);
        assert!(matches!(parse_record(&record).unwrap(), Record::Event(_)));
    }

    #[test]
    fn test_done_sentinel() {
        assert_eq!(parse_record("data: [DONE]").unwrap(), Record::Done);
        assert_eq!(parse_record("[DONE]").unwrap(), Record::Done);
        assert_eq!(parse_record("  data:   [DONE]  ").unwrap(), Record::Done);
    }

    #[test]
    fn test_sse_fields_are_ignored() {
        assert_eq!(parse_record(": keep-alive").unwrap(), Record::Ignored);
        assert_eq!(parse_record("event: message").unwrap(), Record::Ignored);
        assert_eq!(parse_record("id: 7").unwrap(), Record::Ignored);
        assert_eq!(parse_record("retry: 1000").unwrap(), Record::Ignored);
        assert_eq!(parse_record("data:").unwrap(), Record::Ignored);
    }

    #[test]
    fn test_malformed_record_is_an_error() {
        let err = parse_record("data: {not json").unwrap_err();
        assert_eq!(err.preview, "{not json");
        assert!(err.to_string().contains("{not json"));
    }

    #[test]
    fn test_event_missing_required_field_is_an_error() {
        let err = parse_record(r#"data: {"id":"x"}"#).unwrap_err();
        assert!(err.to_string().contains("invocationId"));
    }

    #[test]
    fn test_long_preview_is_truncated() {
        let long = format!("data: {{\"junk\": \"{}\"", "x".repeat(500));
        let err = parse_record(&long).unwrap_err();
        assert!(err.preview.ends_with("..."));
        assert_eq!(err.preview.chars().count(), PREVIEW_LEN + 3);
    }

    #[test]
    fn test_strip_framing() {
        assert_eq!(strip_framing("data:  abc "), "abc");
        assert_eq!(strip_framing(" abc "), "abc");
    }
}
