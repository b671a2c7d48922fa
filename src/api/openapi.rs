//! OpenAPI documentation and schema generation
//!
//! Defines the OpenAPI specification for the media-dl REST API using utoipa
//! for compile-time spec generation.

use utoipa::OpenApi;

/// OpenAPI documentation for the media-dl REST API
///
/// The spec can be accessed via:
/// - `/openapi.json` - JSON format OpenAPI specification
/// - `/swagger-ui` - Interactive Swagger UI documentation (if enabled)
#[derive(OpenApi)]
#[openapi(
    info(
        title = "media-dl REST API",
        version = "0.1.0",
        description = "REST API for submitting media download jobs, polling their progress, and retrieving finished artifacts",
        license(
            name = "MIT OR Apache-2.0"
        )
    ),
    servers(
        (url = "http://localhost:5000", description = "Local development server")
    ),
    paths(
        // Jobs
        crate::api::routes::submit_job,
        crate::api::routes::get_job,
        crate::api::routes::download_artifact,

        // Metadata
        crate::api::routes::get_metadata,

        // System
        crate::api::routes::health_check,
        crate::api::routes::event_stream,
        crate::api::routes::openapi_spec,
    ),
    components(schemas(
        // Core types from types.rs
        crate::types::JobId,
        crate::types::Status,
        crate::types::Progress,
        crate::types::SubmitRequest,
        crate::types::JobInfo,
        crate::types::Rendition,
        crate::types::MediaInfo,
        crate::types::Event,
        crate::types::BrokerStats,

        // API request/response types from routes
        crate::api::routes::SubmitResponse,
        crate::api::routes::HealthResponse,

        // Error types from error.rs
        crate::error::ApiError,
        crate::error::ErrorDetail,
    )),
    tags(
        (name = "jobs", description = "Download jobs - Submit, poll, and retrieve finished artifacts"),
        (name = "metadata", description = "Metadata probing - Inspect a media URL without downloading"),
        (name = "system", description = "System endpoints - Health checks, events, OpenAPI spec"),
    )
)]
pub struct ApiDoc;
