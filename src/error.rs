//! Error types for linkindex
//!
//! This module provides error handling for the library, including:
//! - Domain-specific error types (validation, artifacts, external services)
//! - HTTP status code mapping for API integration
//! - Flat JSON error bodies (`{"error": "...", "code": "..."}`)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use utoipa::ToSchema;

/// Result type alias for linkindex operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for linkindex
///
/// Per-item failures inside a stage never surface as this type to the caller of
/// the pipeline; they are folded into the stage outcome. An `Error` escaping a
/// stage aborts the run.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "output_dir")
        key: Option<String>,
    },

    /// Request body failed validation
    #[error("validation error: {0}")]
    Validation(String),

    /// A submitted URL could not be parsed or is not an absolute http(s) URL
    #[error("invalid URL {url:?}: {reason}")]
    InvalidUrl {
        /// The offending input, as submitted
        url: String,
        /// Why it was rejected
        reason: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Network error
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Feed document could not be rendered
    #[error("feed error: {0}")]
    Feed(String),

    /// Artifact storage error
    #[error("artifact error: {0}")]
    Artifact(#[from] ArtifactError),

    /// An external service answered, but not with success
    #[error("{service} failed: {message}")]
    ExternalService {
        /// Name of the service (e.g. "tinyurl")
        service: String,
        /// What went wrong
        message: String,
    },

    /// An external call exceeded its time budget
    #[error("{service} timed out after {after:?}")]
    Timeout {
        /// Name of the service that was called
        service: String,
        /// The budget that was exceeded
        after: Duration,
    },

    /// API server error
    #[error("API server error: {0}")]
    ApiServerError(String),

    /// Other error
    #[error("{0}")]
    Other(String),
}

/// Errors raised by the artifact store
#[derive(Debug, Error)]
pub enum ArtifactError {
    /// No artifact with this name exists in the output directory
    #[error("artifact {name} not found")]
    NotFound {
        /// Requested artifact name
        name: String,
    },

    /// The name would resolve outside the output directory or is otherwise unusable
    #[error("invalid artifact name {name:?}")]
    InvalidName {
        /// Requested artifact name
        name: String,
    },

    /// Persisting an artifact failed
    #[error("failed to write {path}: {reason}")]
    WriteFailed {
        /// Destination path
        path: PathBuf,
        /// Underlying cause
        reason: String,
    },
}

/// API error response format
///
/// The body is flat so that clients can always read a string from `error`.
///
/// # Example JSON Response
///
/// ```json
/// {
///   "error": "validation error: at least one URL is required",
///   "code": "validation_error"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiError {
    /// Human-readable error message
    pub error: String,

    /// Machine-readable error code (e.g., "not_found", "validation_error")
    pub code: String,

    /// Optional additional context about the error
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    /// Create a new API error with code and message
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
            code: code.into(),
            details: None,
        }
    }
}

/// Convert errors to HTTP status codes for API responses
pub trait ToHttpStatus {
    /// Get the HTTP status code for this error
    fn status_code(&self) -> u16;

    /// Get the machine-readable error code
    fn error_code(&self) -> &str;
}

impl ToHttpStatus for Error {
    fn status_code(&self) -> u16 {
        match self {
            // 400 Bad Request - Client error (invalid input)
            Error::Validation(_) => 400,
            Error::InvalidUrl { .. } => 400,
            Error::Artifact(ArtifactError::InvalidName { .. }) => 400,

            // 404 Not Found
            Error::Artifact(ArtifactError::NotFound { .. }) => 404,

            // 500 Internal Server Error - Server-side issues
            Error::Config { .. } => 500,
            Error::Io(_) => 500,
            Error::Serialization(_) => 500,
            Error::Feed(_) => 500,
            Error::Artifact(ArtifactError::WriteFailed { .. }) => 500,
            Error::ApiServerError(_) => 500,
            Error::Other(_) => 500,

            // 502 Bad Gateway - External service errors, including timeouts
            Error::Network(_) => 502,
            Error::ExternalService { .. } => 502,
            Error::Timeout { .. } => 502,
        }
    }

    fn error_code(&self) -> &str {
        match self {
            Error::Config { .. } => "config_error",
            Error::Validation(_) => "validation_error",
            Error::InvalidUrl { .. } => "invalid_url",
            Error::Io(_) => "io_error",
            Error::Network(_) => "network_error",
            Error::Serialization(_) => "serialization_error",
            Error::Feed(_) => "feed_error",
            Error::Artifact(e) => match e {
                ArtifactError::NotFound { .. } => "not_found",
                ArtifactError::InvalidName { .. } => "invalid_artifact_name",
                ArtifactError::WriteFailed { .. } => "artifact_write_failed",
            },
            Error::ExternalService { .. } => "external_service_error",
            Error::Timeout { .. } => "timeout",
            Error::ApiServerError(_) => "api_server_error",
            Error::Other(_) => "internal_error",
        }
    }
}

impl From<Error> for ApiError {
    fn from(error: Error) -> Self {
        let code = error.error_code().to_string();
        let message = error.to_string();

        let details = match &error {
            Error::InvalidUrl { url, .. } => Some(serde_json::json!({ "url": url })),
            Error::Config { key: Some(key), .. } => Some(serde_json::json!({ "key": key })),
            Error::Artifact(ArtifactError::NotFound { name })
            | Error::Artifact(ArtifactError::InvalidName { name }) => {
                Some(serde_json::json!({ "name": name }))
            }
            _ => None,
        };

        ApiError {
            details,
            ..ApiError::new(code, message)
        }
    }
}
