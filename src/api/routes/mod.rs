//! Route handlers for the REST API
//!
//! Handlers are organized by domain:
//! - [`jobs`] — Job submission, polling, artifact retrieval
//! - [`metadata`] — Metadata probing
//! - [`system`] — Health, events, OpenAPI

use crate::types::{BrokerStats, JobId};
use serde::{Deserialize, Serialize};

mod jobs;
mod metadata;
mod system;

// Re-export all handlers so `routes::function_name` continues to work
pub use jobs::*;
pub use metadata::*;
pub use system::*;

// ============================================================================
// Query/Request Types (shared across handlers)
// ============================================================================

/// Response for POST /jobs - identity of the accepted job
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct SubmitResponse {
    /// Job identifier to poll for progress and retrieve the artifact
    pub id: JobId,
}

/// Query parameters for GET /metadata
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct MetadataQuery {
    /// Media URL to probe
    pub url: String,
}

/// Response for GET /health
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct HealthResponse {
    /// Always "ok" when the service is reachable
    pub status: String,
    /// Crate version
    pub version: String,
    /// Current job counts per status
    pub jobs: BrokerStats,
}
