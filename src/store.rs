//! Concurrency-safe job state store
//!
//! The store holds the mapping from job identity to job record. All mutation
//! goes through [`JobStore::update`], which applies the whole transition under
//! one write lock so pollers never observe a half-applied update (e.g. a
//! status flipped to downloading without its progress snapshot).

use crate::error::{Error, Result};
use crate::types::{BrokerStats, Job, JobId, Progress, Status, SubmitRequest};
use chrono::Utc;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A state transition applied to a job
#[derive(Clone, Debug)]
pub enum JobUpdate {
    /// Progress report; flips `Queued -> Downloading` on first arrival
    Progress(Progress),
    /// Terminal success with the artifact location
    Finished(PathBuf),
    /// Terminal failure with a human-readable message
    Failed(String),
}

/// Concurrency-safe mapping from job identity to job record
///
/// Cheap to clone; all clones share the same underlying map. Safe to call
/// from any task without external locking. No I/O.
#[derive(Clone, Default)]
pub struct JobStore {
    jobs: Arc<RwLock<HashMap<JobId, Job>>>,
}

impl JobStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a fresh identity and insert a `Queued` record for `request`
    ///
    /// The job is visible to [`get`](Self::get) before this returns.
    pub async fn create(&self, request: SubmitRequest) -> JobId {
        let id = JobId::new();
        let job = Job::new(id, request);
        self.jobs.write().await.insert(id, job);
        id
    }

    /// Return a consistent snapshot of the job, or None for unknown identities
    pub async fn get(&self, id: JobId) -> Option<Job> {
        self.jobs.read().await.get(&id).cloned()
    }

    /// Apply a state transition atomically
    ///
    /// Transitions are monotonic: once a job is terminal, further progress
    /// reports are dropped and a second terminal update is rejected with a
    /// warning. Returns `NotFound` for unknown identities.
    pub async fn update(&self, id: JobId, update: JobUpdate) -> Result<()> {
        let mut jobs = self.jobs.write().await;
        let job = jobs.get_mut(&id).ok_or(Error::NotFound(id))?;

        match update {
            JobUpdate::Progress(progress) => {
                if job.status.is_terminal() {
                    tracing::trace!(job_id = %id, "dropping progress report after terminal state");
                    return Ok(());
                }
                if job.status == Status::Queued {
                    job.status = Status::Downloading;
                    job.started_at = Some(Utc::now());
                }
                // Multi-stream fetches (video then audio) restart the engine's
                // byte counters; keep the observed percent non-decreasing.
                let percent = match (progress.percent, job.progress.as_ref()) {
                    (Some(new), Some(prev)) => Some(prev.percent.unwrap_or(0.0).max(new)),
                    (new, prev) => new.or(prev.and_then(|p| p.percent)),
                };
                job.progress = Some(Progress { percent, ..progress });
            }
            JobUpdate::Finished(output) => {
                if job.status.is_terminal() {
                    tracing::warn!(job_id = %id, "ignoring duplicate terminal update (finished)");
                    return Ok(());
                }
                job.status = Status::Finished;
                job.output = Some(output);
                job.progress = None;
                job.completed_at = Some(Utc::now());
            }
            JobUpdate::Failed(error) => {
                if job.status.is_terminal() {
                    tracing::warn!(job_id = %id, "ignoring duplicate terminal update (failed)");
                    return Ok(());
                }
                job.status = Status::Failed;
                job.error = Some(error);
                job.progress = None;
                job.completed_at = Some(Utc::now());
            }
        }

        Ok(())
    }

    /// Number of tracked jobs
    pub async fn len(&self) -> usize {
        self.jobs.read().await.len()
    }

    /// Whether the store is empty
    pub async fn is_empty(&self) -> bool {
        self.jobs.read().await.is_empty()
    }

    /// Job counts per status
    pub async fn stats(&self) -> BrokerStats {
        let jobs = self.jobs.read().await;
        let mut stats = BrokerStats {
            total: jobs.len(),
            ..Default::default()
        };
        for job in jobs.values() {
            match job.status {
                Status::Queued => stats.queued += 1,
                Status::Downloading => stats.downloading += 1,
                Status::Finished => stats.finished += 1,
                Status::Failed => stats.failed += 1,
            }
        }
        stats
    }
}
