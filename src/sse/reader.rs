//! Incremental line splitter for streamed response bodies.
//!
//! Network chunks do not line up with record boundaries, and a chunk may end
//! in the middle of a multi-byte UTF-8 sequence. The reader keeps both kinds
//! of leftovers until the next chunk arrives.

/// Accumulates raw bytes and yields complete, non-blank line records.
#[derive(Debug, Default)]
pub struct RecordReader {
    /// Decoded text not yet terminated by a newline.
    buffer: String,
    /// Trailing bytes of an incomplete UTF-8 sequence.
    pending_bytes: Vec<u8>,
}

impl RecordReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one chunk and drain every record it completes.
    ///
    /// Records are returned without their line terminator (`\n` or `\r\n`);
    /// blank records are dropped.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<String> {
        self.decode(chunk);

        let mut records = Vec::new();
        while let Some(newline) = self.buffer.find('\n') {
            let line: String = self.buffer.drain(..=newline).collect();
            let line = line.trim_end_matches('\n').trim_end_matches('\r');
            if !line.trim().is_empty() {
                records.push(line.to_string());
            }
        }
        records
    }

    /// Flush whatever remains once the stream has ended.
    ///
    /// An unterminated final record is still a record; leftover invalid bytes
    /// are decoded lossily.
    pub fn finish(&mut self) -> Option<String> {
        if !self.pending_bytes.is_empty() {
            let tail = std::mem::take(&mut self.pending_bytes);
            self.buffer.push_str(&String::from_utf8_lossy(&tail));
        }
        let rest = std::mem::take(&mut self.buffer);
        let rest = rest.trim_end_matches('\r');
        if rest.trim().is_empty() {
            None
        } else {
            Some(rest.to_string())
        }
    }

    /// True when no partial record or partial character is buffered.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty() && self.pending_bytes.is_empty()
    }

    fn decode(&mut self, chunk: &[u8]) {
        let owned;
        let mut bytes: &[u8] = if self.pending_bytes.is_empty() {
            chunk
        } else {
            let mut joined = std::mem::take(&mut self.pending_bytes);
            joined.extend_from_slice(chunk);
            owned = joined;
            &owned
        };

        loop {
            match std::str::from_utf8(bytes) {
                Ok(text) => {
                    self.buffer.push_str(text);
                    return;
                }
                Err(err) => {
                    let valid = err.valid_up_to();
                    // valid_up_to guarantees this prefix is UTF-8
                    self.buffer
                        .push_str(&String::from_utf8_lossy(&bytes[..valid]));
                    match err.error_len() {
                        // Incomplete sequence at the end: wait for more bytes.
                        None => {
                            self.pending_bytes = bytes[valid..].to_vec();
                            return;
                        }
                        Some(len) => {
                            self.buffer.push(char::REPLACEMENT_CHARACTER);
                            bytes = &bytes[valid + len..];
                        }
                    }
                }
            }
        }
    }
}
