//! REST API server module
//!
//! Accepts runs, streams their progress, and exposes the generated artifacts
//! for listing and download. A static front end can be served from the same
//! origin.

use crate::pipeline::Pipeline;
use crate::{Config, Result};
use axum::{
    Router,
    http::HeaderValue,
    routing::{get, post},
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub mod error_response;
pub mod openapi;
pub mod routes;
pub mod state;

pub use openapi::ApiDoc;
pub use state::AppState;

/// Create the API router with all route definitions
///
/// # Routes
///
/// ## Pipeline
/// - `POST /process` - Start a run; the response body is its progress stream
///
/// ## Files
/// - `GET /files` - List generated artifacts
/// - `GET /download/:name` - Download one artifact
///
/// ## System
/// - `GET /health` - Health check
/// - `GET /openapi.json` - OpenAPI specification
/// - `GET /swagger-ui` - Interactive Swagger UI documentation (if enabled)
///
/// Any other path falls through to `static_dir` when one is configured.
pub fn create_router(pipeline: Pipeline, config: Arc<Config>) -> Router {
    let state = AppState::new(pipeline);

    let router = Router::new()
        // Pipeline
        .route("/process", post(routes::process))
        // Files
        .route("/files", get(routes::list_files))
        .route("/download/:name", get(routes::download_file))
        // System
        .route("/health", get(routes::health_check))
        .route("/openapi.json", get(routes::openapi_spec));

    // SwaggerUi registers its own copy of the document under a separate path
    // so it does not collide with /openapi.json
    let router = if config.server.swagger_ui {
        router.merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
    } else {
        router
    };

    let router = router.with_state(state);

    let router = match &config.server.static_dir {
        Some(dir) => router.fallback_service(ServeDir::new(dir)),
        None => router,
    };

    let router = router.layer(TraceLayer::new_for_http());

    if config.server.cors_enabled {
        let cors = build_cors_layer(&config.server.cors_origins);
        router.layer(cors)
    } else {
        router
    }
}

/// Build a CORS layer based on configured origins
///
/// `"*"` anywhere in the list (or an empty list) allows any origin.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    let allow_any = origins.iter().any(|o| o == "*");

    if allow_any || origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let allowed: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|o| match o.parse() {
                Ok(value) => Some(value),
                Err(_) => {
                    tracing::warn!(origin = %o, "ignoring unparseable CORS origin");
                    None
                }
            })
            .collect();

        CorsLayer::new()
            .allow_origin(AllowOrigin::list(allowed))
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

/// Start the API server on the configured bind address.
///
/// Builds the production pipeline from `config`, binds the listener and
/// serves until SIGINT or SIGTERM. In-flight responses (including open
/// progress streams) are allowed to finish before the function returns.
///
/// # Example
///
/// ```no_run
/// use linkindex::Config;
/// use std::sync::Arc;
///
/// # async fn example() -> linkindex::Result<()> {
/// let config = Arc::new(Config::load(None)?);
/// linkindex::api::start_api_server(config).await?;
/// # Ok(())
/// # }
/// ```
pub async fn start_api_server(config: Arc<Config>) -> Result<()> {
    let pipeline = Pipeline::from_config(&config)?;
    let bind_address = config.server.bind_address;

    tracing::info!(
        address = %bind_address,
        output_dir = %config.output.output_dir.display(),
        "Starting API server"
    );

    let app = create_router(pipeline, config);

    let listener = TcpListener::bind(bind_address)
        .await
        .map_err(crate::error::Error::Io)?;

    tracing::info!(
        address = %bind_address,
        "API server listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| crate::error::Error::ApiServerError(e.to_string()))?;

    tracing::info!("API server stopped");
    Ok(())
}

/// Resolves on SIGTERM or SIGINT
///
/// A signal that cannot be registered is skipped; with neither available the
/// server waits for Ctrl+C instead.
#[cfg(unix)]
async fn shutdown_signal() {
    use tokio::signal::unix::{Signal, SignalKind, signal};

    async fn next(registered: std::io::Result<Signal>, name: &str) -> Option<()> {
        match registered {
            Ok(mut stream) => stream.recv().await,
            Err(e) => {
                tracing::warn!(signal = name, error = %e, "cannot listen for signal");
                std::future::pending().await
            }
        }
    }

    let terminate = signal(SignalKind::terminate());
    let interrupt = signal(SignalKind::interrupt());
    if terminate.is_err() && interrupt.is_err() {
        tracing::error!("no signal handlers available, falling back to Ctrl+C");
        tokio::signal::ctrl_c().await.ok();
        return;
    }

    let received = tokio::select! {
        Some(()) = next(terminate, "SIGTERM") => "SIGTERM",
        Some(()) = next(interrupt, "SIGINT") => "SIGINT",
        else => "closed signal stream",
    };
    tracing::info!(signal = received, "shutting down");
}

#[cfg(not(unix))]
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;
