//! Error types for media-dl
//!
//! This module provides error handling for the library, including:
//! - Domain-specific error types (validation, extraction, job lookup)
//! - HTTP status code mapping for API integration
//! - Structured error responses with machine-readable error codes

use crate::types::{JobId, Status};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;
use utoipa::ToSchema;

/// Result type alias for media-dl operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for media-dl
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed or unsupported submission input; no job is created
    #[error("validation error: {0}")]
    Validation(String),

    /// The external extraction engine could not probe or fetch the resource
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// Unknown job identity
    #[error("job {0} not found")]
    NotFound(JobId),

    /// Artifact requested before the job reached `finished`
    #[error("job {id} is not ready: status is {status:?}")]
    NotReady {
        /// The job whose artifact was requested
        id: JobId,
        /// The job's current status
        status: Status,
    },

    /// Job reports finished but the recorded file is absent on disk
    ///
    /// Distinct from `NotFound` because it indicates a store/runner
    /// inconsistency rather than a bad client request.
    #[error("artifact for job {id} missing at {path}")]
    MissingArtifact {
        /// The finished job whose artifact disappeared
        id: JobId,
        /// The recorded path that no longer exists
        path: PathBuf,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// API server error
    #[error("API server error: {0}")]
    ApiServer(String),
}

/// Extraction-engine errors (probe or fetch against yt-dlp)
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// The engine binary could not be found
    #[error("extraction engine not found: {0}")]
    BinaryNotFound(String),

    /// The engine process could not be spawned
    #[error("failed to spawn extraction engine: {0}")]
    SpawnFailed(String),

    /// The engine ran but exited with a failure
    #[error("extraction engine failed: {reason}")]
    EngineFailed {
        /// Trailing stderr output from the engine
        reason: String,
    },

    /// The engine produced output this library could not interpret
    #[error("unexpected engine output: {0}")]
    InvalidOutput(String),
}

/// API error response format
///
/// Returned by API endpoints when an error occurs: a machine-readable code,
/// a human-readable message, and optional contextual details.
///
/// # Example JSON Response
///
/// ```json
/// {
///   "error": {
///     "code": "not_ready",
///     "message": "job 4f2a... is not ready: status is Downloading",
///     "details": {
///       "status": "downloading"
///     }
///   }
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiError {
    /// The error details
    pub error: ErrorDetail,
}

/// Detailed error information for API responses
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g. "not_found", "validation_error")
    pub code: String,

    /// Human-readable error message
    pub message: String,

    /// Optional additional context about the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    /// Create a new API error with code and message
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: ErrorDetail {
                code: code.into(),
                message: message.into(),
                details: None,
            },
        }
    }

    /// Create a "validation error" error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new("validation_error", message)
    }

    /// Create a "not found" error
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::new("not_found", format!("{} not found", resource.into()))
    }

    /// Create an "internal server error"
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new("internal_error", message)
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
            // 400 Bad Request - client error (invalid input)
            Error::Validation(_) => 400,

            // 404 Not Found
            Error::NotFound(_) => 404,

            // 409 Conflict - artifact requested before the terminal state
            Error::NotReady { .. } => 409,

            // 502 Bad Gateway - external engine errors
            Error::Extraction(_) => 502,

            // 500 Internal Server Error - server-side issues
            Error::MissingArtifact { .. } => 500,
            Error::Io(_) => 500,
            Error::Serialization(_) => 500,
            Error::ApiServer(_) => 500,
        }
    }

    fn error_code(&self) -> &str {
        match self {
            Error::Validation(_) => "validation_error",
            Error::Extraction(e) => match e {
                ExtractionError::BinaryNotFound(_) => "engine_not_found",
                ExtractionError::SpawnFailed(_) => "engine_spawn_failed",
                ExtractionError::EngineFailed { .. } => "extraction_failed",
                ExtractionError::InvalidOutput(_) => "invalid_engine_output",
            },
            Error::NotFound(_) => "not_found",
            Error::NotReady { .. } => "not_ready",
            Error::MissingArtifact { .. } => "missing_artifact",
            Error::Io(_) => "io_error",
            Error::Serialization(_) => "serialization_error",
            Error::ApiServer(_) => "api_server_error",
        }
    }
}

impl From<Error> for ApiError {
    fn from(error: Error) -> Self {
        let code = error.error_code().to_string();
        let message = error.to_string();

        let details = match &error {
            Error::NotFound(id) => Some(serde_json::json!({
                "job_id": id,
            })),
            Error::NotReady { id, status } => Some(serde_json::json!({
                "job_id": id,
                "status": status,
            })),
            Error::MissingArtifact { id, path } => Some(serde_json::json!({
                "job_id": id,
                "path": path,
            })),
            _ => None,
        };

        ApiError {
            error: ErrorDetail {
                code,
                message,
                details,
            },
        }
    }
}
