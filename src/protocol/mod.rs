//! Streaming progress protocol
//!
//! A run's events travel over one long-lived `text/plain` response. Each event
//! is one JSON object framed as
//!
//! ```text
//! data: {"type":"progress","step":"ping","message":"Sending pings..."}
//!
//! ```
//!
//! i.e. the literal prefix `data: `, the JSON, and a blank line. The server
//! never sets `Content-Length`; closing the connection after the terminal
//! event ends the stream.

mod decoder;
mod encoder;

pub use decoder::{Decoded, EventDecoder};
pub use encoder::{CONTENT_TYPE, encode, event_body};

/// Prefix marking a line that carries an event
pub const DATA_PREFIX: &str = "data: ";
