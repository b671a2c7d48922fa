//! Job lifecycle broker
//!
//! [`MediaBroker`] is the operation surface the API layer talks to: validated
//! submission, metadata probing, progress polling, artifact lookup, and a
//! broadcast event channel for subscribers. Each accepted submission runs on
//! its own task (see [`runner`]); the submit path never blocks on a fetch.

mod runner;


use crate::config::Config;
use crate::error::{Error, Result};
use crate::extractor::{FetchOptions, MediaExtractor, YtDlpExtractor};
use crate::store::JobStore;
use crate::types::{BrokerStats, Event, JobId, JobInfo, MediaInfo, Status, SubmitRequest};
use crate::utils::sanitize_filename;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::broadcast;
use url::Url;

/// Capacity of the lifecycle event broadcast channel
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Main broker instance (cloneable - all fields are cheaply shared)
#[derive(Clone)]
pub struct MediaBroker {
    /// Job state store
    store: JobStore,
    /// Extraction engine boundary (trait object for pluggable implementations)
    extractor: Arc<dyn MediaExtractor>,
    /// Configuration
    config: Arc<Config>,
    /// Event broadcast channel sender (multiple subscribers supported)
    event_tx: broadcast::Sender<Event>,
}

impl MediaBroker {
    /// Create a broker backed by the yt-dlp engine
    ///
    /// Ensures the download directory exists and discovers the engine
    /// binaries per config.
    pub async fn new(config: Config) -> Result<Self> {
        let extractor = Arc::new(YtDlpExtractor::from_config(&config)?);
        Self::with_extractor(config, extractor).await
    }

    /// Create a broker with a custom extraction engine
    ///
    /// Used by embedders and tests that substitute the engine boundary.
    pub async fn with_extractor(
        config: Config,
        extractor: Arc<dyn MediaExtractor>,
    ) -> Result<Self> {
        tokio::fs::create_dir_all(config.download_dir())
            .await
            .map_err(|e| {
                Error::Io(std::io::Error::new(
                    e.kind(),
                    format!(
                        "failed to create download directory '{}': {e}",
                        config.download_dir().display()
                    ),
                ))
            })?;

        let (event_tx, _rx) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        Ok(Self {
            store: JobStore::new(),
            extractor,
            config: Arc::new(config),
            event_tx,
        })
    }

    /// Subscribe to job lifecycle events
    ///
    /// Multiple subscribers are supported; each receives all events
    /// independently. Slow subscribers that fall behind the channel capacity
    /// observe a `Lagged` error rather than blocking job execution.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.event_tx.subscribe()
    }

    /// Validate and accept a download submission
    ///
    /// Creates the job record, spawns its runner task, and returns the job
    /// identity immediately. Rejected submissions create no job. The fetch
    /// itself runs in the background; failures there surface through the
    /// job's status, never through this call.
    pub async fn submit(&self, request: SubmitRequest) -> Result<JobId> {
        let url = validate_url(&request.url)?;
        if !self.config.is_quality_allowed(&request.quality) {
            return Err(Error::Validation(format!(
                "unsupported quality '{}'",
                request.quality
            )));
        }

        let request = SubmitRequest { url, ..request };
        let id = self.store.create(request.clone()).await;

        let options = FetchOptions {
            quality: request.quality.clone(),
            audio_only: request.audio_only,
            output_stem: self.config.download_dir().join(id.to_string()),
        };

        let _ = self.event_tx.send(Event::Queued {
            id,
            url: request.url.clone(),
        });
        tracing::info!(job_id = %id, url = %request.url, audio_only = request.audio_only, "job accepted");

        runner::spawn_job(
            self.store.clone(),
            self.extractor.clone(),
            self.event_tx.clone(),
            id,
            request,
            options,
        );

        Ok(id)
    }

    /// Probe metadata for a URL without creating a job
    pub async fn probe(&self, url: &str) -> Result<MediaInfo> {
        let url = validate_url(url)?;
        self.extractor.probe(&url).await
    }

    /// Current status snapshot for a job
    pub async fn progress(&self, id: JobId) -> Result<JobInfo> {
        self.store
            .get(id)
            .await
            .map(JobInfo::from)
            .ok_or(Error::NotFound(id))
    }

    /// Artifact location and suggested filename for a finished job
    ///
    /// Fails with `NotReady` before the job finishes and with
    /// `MissingArtifact` if the recorded file has since disappeared.
    pub async fn result_path(&self, id: JobId) -> Result<(PathBuf, String)> {
        let job = self.store.get(id).await.ok_or(Error::NotFound(id))?;

        if job.status != Status::Finished {
            return Err(Error::NotReady {
                id,
                status: job.status,
            });
        }
        let path = job.output.ok_or_else(|| Error::MissingArtifact {
            id,
            path: PathBuf::new(),
        })?;
        if tokio::fs::metadata(&path).await.is_err() {
            return Err(Error::MissingArtifact { id, path });
        }

        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .map(sanitize_filename)
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| format!("{id}.bin"));

        Ok((path, filename))
    }

    /// Job counts per status
    pub async fn stats(&self) -> BrokerStats {
        self.store.stats().await
    }

    /// Configuration this broker was created with
    pub fn config(&self) -> &Config {
        &self.config
    }
}

/// Validate a submitted URL and return its trimmed form
fn validate_url(url: &str) -> Result<String> {
    let trimmed = url.trim();
    if trimmed.is_empty() {
        return Err(Error::Validation("URL is required".to_string()));
    }
    let parsed =
        Url::parse(trimmed).map_err(|e| Error::Validation(format!("invalid URL: {e}")))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(Error::Validation(format!(
            "unsupported URL scheme '{}'",
            parsed.scheme()
        )));
    }
    Ok(trimmed.to_string())
}
