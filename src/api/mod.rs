//! REST API server module
//!
//! Exposes the broker over an OpenAPI-documented REST surface: submission,
//! polling, artifact retrieval, metadata probing and monitoring.

use crate::{Config, MediaBroker, Result};
use axum::{
    Router,
    http::HeaderValue,
    routing::{get, post},
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
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
/// ## Jobs
/// - `POST /jobs` - Submit a download job
/// - `GET /jobs/:id` - Poll a job's status and progress
/// - `GET /jobs/:id/file` - Stream a finished job's artifact
///
/// ## Metadata
/// - `GET /metadata?url=...` - Probe media metadata without downloading
///
/// ## System
/// - `GET /health` - Health check with job counts
/// - `GET /events` - Server-sent lifecycle event stream
/// - `GET /openapi.json` - OpenAPI specification
/// - `GET /swagger-ui` - Interactive Swagger UI documentation (if enabled)
pub fn create_router(broker: Arc<MediaBroker>, config: Arc<Config>) -> Router {
    let state = AppState::new(broker, config.clone());

    let router = Router::new()
        // Jobs
        .route("/jobs", post(routes::submit_job))
        .route("/jobs/:id", get(routes::get_job))
        .route("/jobs/:id/file", get(routes::download_artifact))
        // Metadata
        .route("/metadata", get(routes::get_metadata))
        // System
        .route("/health", get(routes::health_check))
        .route("/events", get(routes::event_stream))
        .route("/openapi.json", get(routes::openapi_spec));

    // Merge Swagger UI routes if enabled in config (before applying state)
    let router = if config.api.swagger_ui {
        router.merge(SwaggerUi::new("/swagger-ui").url("/openapi.json", ApiDoc::openapi()))
    } else {
        router
    };

    let router = router
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    // Apply CORS middleware if enabled in config
    if config.api.cors_enabled {
        let cors = build_cors_layer(&config.api.cors_origins);
        router.layer(cors)
    } else {
        router
    }
}

/// Build a CORS layer based on configured origins
///
/// Supports "*" for any origin; otherwise only the listed origins are
/// allowed, with all methods and headers.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    let allow_any = origins.iter().any(|o| o == "*");

    if allow_any || origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let allowed: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();

        CorsLayer::new()
            .allow_origin(AllowOrigin::list(allowed))
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

/// Start the API server on the configured bind address.
///
/// Binds a TCP listener to `config.api.bind_address` and serves the router
/// until the server stops.
///
/// # Example
///
/// ```no_run
/// use media_dl::{Config, MediaBroker};
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = Arc::new(Config::default());
/// let broker = Arc::new(MediaBroker::new((*config).clone()).await?);
///
/// // Start API server (blocks until shutdown)
/// media_dl::api::start_api_server(broker, config).await?;
/// # Ok(())
/// # }
/// ```
pub async fn start_api_server(broker: Arc<MediaBroker>, config: Arc<Config>) -> Result<()> {
    let bind_address = config.api.bind_address;

    tracing::info!(address = %bind_address, "starting API server");

    let app = create_router(broker, config);

    let listener = TcpListener::bind(bind_address)
        .await
        .map_err(crate::error::Error::Io)?;

    tracing::info!(address = %bind_address, "API server listening");

    axum::serve(listener, app)
        .await
        .map_err(|e| crate::error::Error::ApiServer(e.to_string()))?;

    tracing::info!("API server stopped");
    Ok(())
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;
