//! Route handlers for the REST API
//!
//! Handlers are organized by domain:
//! - [`process`]: Run submission and the progress stream
//! - [`files`]: Artifact listing and download
//! - [`system`]: Health and OpenAPI

mod files;
mod process;
mod system;

pub use files::*;
pub use process::*;
pub use system::*;
