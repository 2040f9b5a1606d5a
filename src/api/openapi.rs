//! OpenAPI documentation and schema generation
//!
//! The document is generated at compile time with utoipa and served at
//! `/openapi.json`; Swagger UI (when enabled) lives at `/swagger-ui`.

use utoipa::OpenApi;

/// OpenAPI documentation for the linkindex REST API
#[derive(OpenApi)]
#[openapi(
    info(
        title = "linkindex REST API",
        version = "0.1.0",
        description = "Submit URLs to the promotion pipeline, follow its progress stream, and fetch the generated artifacts",
        license(
            name = "MIT OR Apache-2.0"
        )
    ),
    servers(
        (url = "http://localhost:3000", description = "Local development server")
    ),
    paths(
        crate::api::routes::process,
        crate::api::routes::list_files,
        crate::api::routes::download_file,
        crate::api::routes::health_check,
        crate::api::routes::openapi_spec,
    ),
    components(
        schemas(
            crate::types::ProcessRequest,
            crate::types::ProcessOptions,
            crate::types::ArtifactFile,
            crate::types::RunReport,
            crate::types::RunId,
            crate::types::Stage,
            crate::types::StageResults,
            crate::types::PingOutcome,
            crate::types::CallOutcome,
            crate::types::TrafficOutcome,
            crate::types::IndexingOutcome,
            crate::types::PublishOutcome,
            crate::types::ShortenResult,
            crate::types::ArtifactDescriptor,
            crate::types::ArtifactStatus,
            crate::types::OutcomeStatus,
            crate::types::ProgressStatus,
            crate::error::ApiError,
        )
    ),
    tags(
        (name = "pipeline", description = "Run submission and progress stream"),
        (name = "files", description = "Generated artifacts"),
        (name = "system", description = "Health and API documentation")
    )
)]
pub struct ApiDoc;
