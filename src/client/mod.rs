//! Client for the processing panel
//!
//! The panel is an explicit state value driven by the pure [`update`]
//! function, in the message/effect style: user actions and decoded stream
//! events are [`Msg`]s, and anything touching the outside world comes back
//! as an [`Effect`]. [`ApiClient`] executes those effects over HTTP.
//!
//! Run lifecycle: `Idle → Running → Finished | Failed`. A `start` event only
//! logs; `progress` events move the progress bar and log; `complete` stores
//! the report and builds summary cards; `error`, a transport failure, or a
//! stream that closes without a terminal event fails the run. Both terminal
//! states re-enable the controls and refresh the file listing.

mod http;
mod state;
mod summary;
mod update;

pub use http::ApiClient;
pub use state::{FileRow, Log, LogEntry, LogKind, Panel, Progress, ResultCard, RunState};
pub use summary::{file_rows, format_size, result_cards};
pub use update::{Effect, Msg, update};

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;
