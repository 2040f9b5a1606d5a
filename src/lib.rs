//! # linkindex
//!
//! Staged link promotion pipeline with a streaming progress protocol.
//!
//! A batch of URLs is driven through a fixed sequence of stages: ping
//! services, an RSS feed, publishing targets, URL shorteners, a backlinks
//! page, simulated traffic and an indexing check. Every stage entry, finished
//! item and stage exit is reported as a [`ProgressEvent`] while the run is in
//! flight, and the run ends with exactly one `complete` or `error` event.
//!
//! - [`pipeline`] sequences the stages and isolates per-item failures
//! - [`stages`] holds the external integrations behind pluggable traits
//! - [`protocol`] frames events as `data: <json>` lines and decodes them
//!   incrementally on the other side
//! - [`client`] is the panel state machine that consumes the stream
//! - [`api`] serves runs and the generated artifacts over HTTP
//!
//! ## Quick Start
//!
//! ```no_run
//! use linkindex::{Config, Pipeline, ProcessOptions, Run, validate_urls};
//! use tokio::sync::mpsc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load(None)?;
//!     let pipeline = Pipeline::from_config(&config)?;
//!
//!     let urls = validate_urls(&["https://example.com/post"])?;
//!     let run = Run::new(urls, ProcessOptions::default())?;
//!
//!     let (tx, mut rx) = mpsc::channel(64);
//!     let handle = tokio::spawn(async move { pipeline.run(run, tx).await });
//!     while let Some(event) = rx.recv().await {
//!         println!("{event:?}");
//!     }
//!
//!     let report = handle.await??;
//!     println!("processed {} URLs", report.urls);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// REST API module
pub mod api;
/// Generated artifact storage
pub mod artifacts;
/// Panel state machine and HTTP driver
pub mod client;
/// Configuration types
pub mod config;
/// Error types
pub mod error;
/// Run orchestration
pub mod pipeline;
/// Progress stream codec
pub mod protocol;
/// Stage executors and their external collaborators
pub mod stages;
/// Core types and events
pub mod types;

// Re-export commonly used types
pub use artifacts::ArtifactStore;
pub use config::Config;
pub use error::{ApiError, ArtifactError, Error, Result, ToHttpStatus};
pub use pipeline::{Pipeline, Run, validate_urls};
pub use stages::StageSet;
pub use types::{
    ArtifactFile, ProcessOptions, ProcessRequest, ProgressEvent, RunId, RunReport, Stage,
    StageResults,
};
