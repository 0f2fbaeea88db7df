//! Event stream decoding for the `/run_sse` endpoint.
//!
//! The wire format is line based:
//! - `data: <json>` - one event per record (the prefix is optional)
//! - `data: [DONE]` - end marker, produces no event
//! - blank lines separate records and are skipped
//! - lines starting with `:` are comments (ignored)
//!
//! # Module structure
//! - `reader` - bytes to records, buffering partial records across chunks
//! - `parser` - record to [`Record`]

mod parser;
mod reader;

pub use parser::{parse_record, strip_framing, ParseError, Record, DONE_SENTINEL};
pub use reader::RecordReader;
