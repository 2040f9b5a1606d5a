//! Server side of the protocol

use super::DATA_PREFIX;
use crate::types::ProgressEvent;
use axum::body::Body;
use bytes::Bytes;
use futures::StreamExt;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::error;

/// Content type of the event stream
pub const CONTENT_TYPE: &str = "text/plain; charset=utf-8";

/// Frame one event as `data: <json>\n\n`
pub fn encode(event: &ProgressEvent) -> Bytes {
    let json = match serde_json::to_string(event) {
        Ok(json) => json,
        Err(e) => {
            // only reachable if a report ever contains a non-string map key
            error!(error = %e, "failed to serialize progress event");
            r#"{"type":"error","message":"failed to serialize progress event"}"#.to_string()
        }
    };

    let mut frame = String::with_capacity(DATA_PREFIX.len() + json.len() + 2);
    frame.push_str(DATA_PREFIX);
    frame.push_str(&json);
    frame.push_str("\n\n");
    Bytes::from(frame)
}

/// Response body that writes each event as soon as it is received
///
/// The body ends when every sender of `events` has been dropped.
pub fn event_body(events: mpsc::Receiver<ProgressEvent>) -> Body {
    let frames = ReceiverStream::new(events)
        .map(|event| Ok::<_, std::convert::Infallible>(encode(&event)));
    Body::from_stream(frames)
}
