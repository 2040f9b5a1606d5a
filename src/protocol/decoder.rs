//! Client side of the protocol

use super::DATA_PREFIX;
use crate::types::ProgressEvent;
use tracing::{trace, warn};

/// One decoded line
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded {
    /// A well-formed event
    Event(ProgressEvent),
    /// A `data:` line whose JSON did not parse; the line is dropped
    Malformed {
        /// The payload after the prefix
        line: String,
        /// Parser explanation
        reason: String,
    },
}

/// Incremental decoder for the event stream
///
/// Bytes are buffered until a full line is available, so an event split at
/// any byte boundary (including inside a multi-byte UTF-8 sequence) is
/// decoded exactly once. Lines without the `data: ` prefix are ignored.
#[derive(Debug, Default)]
pub struct EventDecoder {
    pending: Vec<u8>,
}

impl EventDecoder {
    /// Create an empty decoder
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the next chunk, returning every line it completed
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<Decoded> {
        self.pending.extend_from_slice(chunk);

        let mut decoded = Vec::new();
        let mut consumed = 0;
        while let Some(offset) = self.pending[consumed..].iter().position(|b| *b == b'\n') {
            let end = consumed + offset;
            if let Some(item) = decode_line(&self.pending[consumed..end]) {
                decoded.push(item);
            }
            consumed = end + 1;
        }
        self.pending.drain(..consumed);

        decoded
    }

    /// Flush a final line that was not newline-terminated
    pub fn finish(&mut self) -> Vec<Decoded> {
        let rest = std::mem::take(&mut self.pending);
        decode_line(&rest).into_iter().collect()
    }

    /// Bytes held back waiting for the end of their line
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
}

fn decode_line(raw: &[u8]) -> Option<Decoded> {
    let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
    let line = String::from_utf8_lossy(raw);
    let payload = line.strip_prefix(DATA_PREFIX)?;

    match serde_json::from_str::<ProgressEvent>(payload) {
        Ok(event) => {
            trace!(?event, "decoded event");
            Some(Decoded::Event(event))
        }
        Err(e) => {
            warn!(line = %payload, error = %e, "dropping malformed event line");
            Some(Decoded::Malformed {
                line: payload.to_string(),
                reason: e.to_string(),
            })
        }
    }
}
