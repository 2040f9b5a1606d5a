//! Artifact listing and download handlers.

use crate::api::AppState;
use crate::error::{Error, Result};
use crate::types::ArtifactFile;
use axum::{
    Json,
    body::Body,
    extract::{Path, State},
    http::{HeaderValue, header},
    response::Response,
};
use std::path::Path as FsPath;
use tokio_util::io::ReaderStream;

/// GET /files - List generated artifacts
#[utoipa::path(
    get,
    path = "/files",
    tag = "files",
    responses(
        (status = 200, description = "Artifacts in the output directory (unsorted)", body = Vec<ArtifactFile>),
        (status = 500, description = "Output directory unreadable", body = crate::error::ApiError)
    )
)]
pub async fn list_files(State(state): State<AppState>) -> Result<Json<Vec<ArtifactFile>>> {
    let files = state.store().list().await?;
    Ok(Json(files))
}

/// GET /download/:name - Download one artifact as an attachment
#[utoipa::path(
    get,
    path = "/download/{name}",
    tag = "files",
    params(
        ("name" = String, Path, description = "Artifact file name as returned by /files")
    ),
    responses(
        (status = 200, description = "File contents", content_type = "application/octet-stream"),
        (status = 400, description = "Name would leave the output directory", body = crate::error::ApiError),
        (status = 404, description = "No such artifact", body = crate::error::ApiError)
    )
)]
pub async fn download_file(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Response> {
    let path = state.store().resolve(&name).await?;
    let file = tokio::fs::File::open(&path).await?;
    let length = file.metadata().await?.len();

    let disposition = HeaderValue::from_str(&format!(
        "attachment; filename=\"{}\"",
        name.replace(['"', '\\'], "_")
    ))
    .unwrap_or_else(|_| HeaderValue::from_static("attachment"));

    Response::builder()
        .header(header::CONTENT_TYPE, content_type_for(&path))
        .header(header::CONTENT_LENGTH, length)
        .header(header::CONTENT_DISPOSITION, disposition)
        .body(Body::from_stream(ReaderStream::new(file)))
        .map_err(|e| Error::ApiServerError(e.to_string()))
}

fn content_type_for(path: &FsPath) -> &'static str {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("xml") => "application/rss+xml",
        Some("html") | Some("htm") => "text/html; charset=utf-8",
        Some("txt") => "text/plain; charset=utf-8",
        Some("json") => "application/json",
        _ => "application/octet-stream",
    }
}
