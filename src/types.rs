//! Core types for media-dl

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use utoipa::ToSchema;
use uuid::Uuid;

/// Unique identifier for a download job
///
/// Wraps a v4 UUID so concurrent submissions can never collide and
/// identifiers are not guessable from one another.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct JobId(pub Uuid);

impl JobId {
    /// Generate a fresh random job identifier
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Get the inner UUID value
    pub fn get(&self) -> Uuid {
        self.0
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for JobId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for JobId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

/// Job status
///
/// Transitions are monotonic: `Queued -> Downloading -> {Finished | Failed}`.
/// Both terminal states are absorbing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// Accepted and waiting for the first progress report
    Queued,
    /// Currently downloading
    Downloading,
    /// Successfully completed, artifact available
    Finished,
    /// Failed with error
    #[serde(rename = "error")]
    Failed,
}

impl Status {
    /// Whether this status is terminal (no further transitions occur)
    pub fn is_terminal(&self) -> bool {
        matches!(self, Status::Finished | Status::Failed)
    }

    /// Position along the state machine, used to reject backward transitions
    pub(crate) fn rank(&self) -> u8 {
        match self {
            Status::Queued => 0,
            Status::Downloading => 1,
            Status::Finished | Status::Failed => 2,
        }
    }
}

/// Normalized in-flight transfer progress
///
/// Percent is omitted rather than computed when the engine does not know the
/// total size, so consumers never see a value derived from a zero denominator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Progress {
    /// Progress percentage (0.0 to 100.0), absent when total size is unknown
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percent: Option<f32>,

    /// Current transfer speed in bytes per second
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed_bps: Option<u64>,

    /// Estimated seconds to completion
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eta_seconds: Option<u64>,

    /// Bytes transferred so far
    pub downloaded_bytes: u64,

    /// Total bytes (exact or engine estimate), absent when unknown
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_bytes: Option<u64>,
}

/// Parameters of a download submission
///
/// Immutable once the job is created.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct SubmitRequest {
    /// Source media URL
    pub url: String,

    /// Requested quality token ("best", "1080p", "720p", ...)
    #[serde(default = "default_quality")]
    pub quality: String,

    /// Extract audio only (forces an audio output container)
    #[serde(default)]
    pub audio_only: bool,
}

fn default_quality() -> String {
    "best".to_string()
}

/// A tracked download job and its evolving state
///
/// Only `status`, `progress`, `output` and `error` mutate after creation;
/// exactly one of the latter three is meaningful for a given status.
#[derive(Clone, Debug)]
pub struct Job {
    /// Unique job identifier
    pub id: JobId,

    /// The request parameters this job was created with
    pub request: SubmitRequest,

    /// Current lifecycle status
    pub status: Status,

    /// Latest progress snapshot (only while `Downloading`)
    pub progress: Option<Progress>,

    /// Artifact location (only once `Finished`)
    pub output: Option<PathBuf>,

    /// Failure description (only once `Failed`)
    pub error: Option<String>,

    /// When the job was accepted
    pub created_at: DateTime<Utc>,

    /// When the first progress report arrived (None until `Downloading`)
    pub started_at: Option<DateTime<Utc>>,

    /// When the job reached a terminal state
    pub completed_at: Option<DateTime<Utc>>,
}

impl Job {
    /// Create a fresh `Queued` job for a request
    pub fn new(id: JobId, request: SubmitRequest) -> Self {
        Self {
            id,
            request,
            status: Status::Queued,
            progress: None,
            output: None,
            error: None,
            created_at: Utc::now(),
            started_at: None,
            completed_at: None,
        }
    }
}

/// API-facing snapshot of a job
///
/// Stale payload fields from a prior status are stripped: a finished job
/// reports no progress, a failed job reports no output.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct JobInfo {
    /// Unique job identifier
    pub id: JobId,

    /// Source media URL
    pub url: String,

    /// Requested quality token
    pub quality: String,

    /// Whether audio-only extraction was requested
    pub audio_only: bool,

    /// Current lifecycle status
    pub status: Status,

    /// Progress snapshot, present only while downloading
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<Progress>,

    /// Suggested artifact filename, present only once finished
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,

    /// Failure description, present only once failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// When the job was accepted
    pub created_at: DateTime<Utc>,

    /// When the first progress report arrived
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,

    /// When the job reached a terminal state
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl From<Job> for JobInfo {
    fn from(job: Job) -> Self {
        let filename = match job.status {
            Status::Finished => job
                .output
                .as_deref()
                .and_then(|p| p.file_name())
                .and_then(|n| n.to_str())
                .map(ToString::to_string),
            _ => None,
        };
        Self {
            id: job.id,
            url: job.request.url,
            quality: job.request.quality,
            audio_only: job.request.audio_only,
            status: job.status,
            progress: match job.status {
                Status::Downloading => job.progress,
                _ => None,
            },
            filename,
            error: match job.status {
                Status::Failed => job.error,
                _ => None,
            },
            created_at: job.created_at,
            started_at: job.started_at,
            completed_at: job.completed_at,
        }
    }
}

/// One available quality/format variant of a source media item
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Rendition {
    /// Engine-native format identifier
    pub id: String,

    /// Human quality label (e.g. "1080p")
    pub quality_label: String,

    /// Container format (e.g. "mp4", "webm")
    pub container_format: String,

    /// Size estimate in bytes, absent when the engine does not report one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<u64>,
}

/// Metadata probed from a source URL without downloading
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct MediaInfo {
    /// Media title
    pub title: String,

    /// Duration in seconds
    pub duration_seconds: u64,

    /// Channel/uploader name
    pub uploader: String,

    /// View count as reported by the source
    pub view_count: u64,

    /// Thumbnail URL
    pub thumbnail_url: String,

    /// Available renditions, deduplicated by quality label, sorted by
    /// descending quality and truncated to a configured top-N
    pub renditions: Vec<Rendition>,
}

/// Normalized progress event emitted by the extraction engine
///
/// A single canonical shape regardless of which underlying engine operation
/// produced it.
#[derive(Clone, Debug, PartialEq)]
pub enum ProgressEvent {
    /// Transfer in flight
    Downloading(Progress),
    /// Engine finished writing an output file (post-processing may follow)
    Finished {
        /// Path the engine reported for the written file
        output: PathBuf,
    },
}

/// Event emitted during the job lifecycle, for broadcast subscribers
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// Job accepted into the store
    Queued {
        /// Job ID
        id: JobId,
        /// Source URL
        url: String,
    },

    /// Job completed successfully
    Finished {
        /// Job ID
        id: JobId,
        /// Artifact location
        #[schema(value_type = String)]
        output: PathBuf,
    },

    /// Job failed
    Failed {
        /// Job ID
        id: JobId,
        /// Error message
        error: String,
    },
}

/// Job counts per status, for the health/summary endpoint
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct BrokerStats {
    /// Total number of tracked jobs
    pub total: usize,

    /// Jobs waiting for their first progress report
    pub queued: usize,

    /// Jobs actively downloading
    pub downloading: usize,

    /// Successfully completed jobs
    pub finished: usize,

    /// Failed jobs
    pub failed: usize,
}
