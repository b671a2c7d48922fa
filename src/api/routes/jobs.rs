//! Job handlers: submit, poll, retrieve artifact.

use super::SubmitResponse;
use crate::api::AppState;
use crate::error::Error;
use crate::types::{JobId, SubmitRequest};
use crate::utils::content_disposition;
use axum::{
    Json,
    body::Body,
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use tokio_util::io::ReaderStream;

/// POST /jobs - Submit a download job
///
/// Validates the request and returns the job identity immediately; the
/// download runs in the background and is observed via `GET /jobs/:id`.
#[utoipa::path(
    post,
    path = "/jobs",
    tag = "jobs",
    request_body = SubmitRequest,
    responses(
        (status = 201, description = "Job accepted", body = SubmitResponse),
        (status = 400, description = "Invalid URL or unsupported quality", body = crate::error::ApiError)
    )
)]
pub async fn submit_job(
    State(state): State<AppState>,
    Json(request): Json<SubmitRequest>,
) -> Result<impl IntoResponse, Error> {
    let id = state.broker.submit(request).await?;
    Ok((StatusCode::CREATED, Json(SubmitResponse { id })))
}

/// GET /jobs/:id - Poll a job's status and progress
#[utoipa::path(
    get,
    path = "/jobs/{id}",
    tag = "jobs",
    params(
        ("id" = JobId, Path, description = "Job identifier returned by submission")
    ),
    responses(
        (status = 200, description = "Current job snapshot", body = crate::types::JobInfo),
        (status = 404, description = "Unknown job", body = crate::error::ApiError)
    )
)]
pub async fn get_job(
    State(state): State<AppState>,
    Path(id): Path<JobId>,
) -> Result<impl IntoResponse, Error> {
    let info = state.broker.progress(id).await?;
    Ok(Json(info))
}

/// GET /jobs/:id/file - Stream a finished job's artifact
///
/// The artifact is streamed rather than buffered; media files are routinely
/// far larger than anything we want held in memory per request.
#[utoipa::path(
    get,
    path = "/jobs/{id}/file",
    tag = "jobs",
    params(
        ("id" = JobId, Path, description = "Job identifier returned by submission")
    ),
    responses(
        (status = 200, description = "Artifact bytes as an attachment", content_type = "application/octet-stream"),
        (status = 404, description = "Unknown job", body = crate::error::ApiError),
        (status = 409, description = "Job has not finished", body = crate::error::ApiError),
        (status = 500, description = "Artifact missing on disk", body = crate::error::ApiError)
    )
)]
pub async fn download_artifact(
    State(state): State<AppState>,
    Path(id): Path<JobId>,
) -> Result<Response, Error> {
    let (path, filename) = state.broker.result_path(id).await?;

    let file = tokio::fs::File::open(&path)
        .await
        .map_err(|_| Error::MissingArtifact {
            id,
            path: path.clone(),
        })?;
    let size = file
        .metadata()
        .await
        .map_err(|_| Error::MissingArtifact {
            id,
            path: path.clone(),
        })?
        .len();

    let content_type = match path.extension().and_then(|e| e.to_str()) {
        Some("mp4") => "video/mp4",
        Some("mp3") => "audio/mpeg",
        _ => "application/octet-stream",
    };

    let body = Body::from_stream(ReaderStream::new(file));

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CONTENT_LENGTH, size)
        .header(header::CONTENT_DISPOSITION, content_disposition(&filename))
        .body(body)
        .map_err(|e| Error::ApiServer(e.to_string()))?;

    Ok(response)
}
