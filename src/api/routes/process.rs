//! Run submission handler.

use crate::api::AppState;
use crate::error::{Error, Result};
use crate::pipeline::{Run, validate_urls};
use crate::protocol::{CONTENT_TYPE, event_body};
use crate::types::ProcessRequest;
use axum::{
    body::Bytes,
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};
use tokio::sync::mpsc;

/// Events buffered between the pipeline and a slow reader
const EVENT_BUFFER: usize = 64;

/// POST /process - Start a run and stream its progress
///
/// The body is read raw so that malformed JSON is answered with the same flat
/// error body as any other rejected input. Once the stream is open every
/// further failure is reported inside it.
#[utoipa::path(
    post,
    path = "/process",
    tag = "pipeline",
    request_body = ProcessRequest,
    responses(
        (status = 200, description = "Progress events, one `data: <json>` frame per event", content_type = "text/plain"),
        (status = 400, description = "Malformed body, empty or invalid URL list", body = crate::error::ApiError),
        (status = 500, description = "Output location unavailable", body = crate::error::ApiError)
    )
)]
pub async fn process(State(state): State<AppState>, body: Bytes) -> Result<Response> {
    let request: ProcessRequest = serde_json::from_slice(&body)
        .map_err(|e| Error::Validation(format!("invalid request body: {e}")))?;

    let urls = validate_urls(&request.urls)?;
    let run = Run::new(urls, request.options.unwrap_or_default())?;

    state.store().ensure_ready().await?;

    let (tx, rx) = mpsc::channel(EVENT_BUFFER);
    let pipeline = state.pipeline.clone();
    let run_id = run.id;
    tokio::spawn(async move {
        if let Err(e) = pipeline.run(run, tx).await {
            tracing::debug!(run_id = %run_id, error = %e, "run ended with an error event");
        }
    });

    Ok((
        [
            (header::CONTENT_TYPE, CONTENT_TYPE),
            (header::CACHE_CONTROL, "no-cache"),
            (header::X_CONTENT_TYPE_OPTIONS, "nosniff"),
        ],
        event_body(rx),
    )
        .into_response())
}
