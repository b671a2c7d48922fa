//! Metadata handlers: probe a URL without downloading.

use super::MetadataQuery;
use crate::api::AppState;
use crate::error::Error;
use axum::{
    Json,
    extract::{Query, State},
    response::IntoResponse,
};

/// GET /metadata - Probe media metadata without downloading
#[utoipa::path(
    get,
    path = "/metadata",
    tag = "metadata",
    params(
        ("url" = String, Query, description = "Media URL to probe")
    ),
    responses(
        (status = 200, description = "Probed metadata with available renditions", body = crate::types::MediaInfo),
        (status = 400, description = "Invalid URL", body = crate::error::ApiError),
        (status = 502, description = "Extraction engine failed", body = crate::error::ApiError)
    )
)]
pub async fn get_metadata(
    State(state): State<AppState>,
    Query(query): Query<MetadataQuery>,
) -> Result<impl IntoResponse, Error> {
    let info = state.broker.probe(&query.url).await?;
    Ok(Json(info))
}
