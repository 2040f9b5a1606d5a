//! Application state for the API server

use crate::artifacts::ArtifactStore;
use crate::pipeline::Pipeline;

/// Shared application state accessible to all route handlers
///
/// Cloned for each request. Server-level settings (CORS, static files,
/// Swagger UI) are applied when the router is built and are not needed here.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Executes accepted runs
    pub pipeline: Pipeline,
}

impl AppState {
    /// Create a new AppState
    pub fn new(pipeline: Pipeline) -> Self {
        Self { pipeline }
    }

    /// The artifact store the pipeline writes into
    pub fn store(&self) -> &ArtifactStore {
        self.pipeline.stages().store()
    }
}
