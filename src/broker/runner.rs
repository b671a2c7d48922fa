//! Per-job runner task
//!
//! One task owns each job from submission to its terminal state. The task
//! drives the extraction engine, forwards normalized progress into the store,
//! and applies exactly one terminal update. Failures are recorded on the job
//! and never propagated: by the time the engine fails, the submitter has
//! already received the job identity and moved on.

use crate::error::Error;
use crate::extractor::{FetchOptions, MediaExtractor};
use crate::store::{JobStore, JobUpdate};
use crate::types::{Event, JobId, ProgressEvent, SubmitRequest};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;

/// Buffer for in-flight progress events between engine and runner
const PROGRESS_CHANNEL_CAPACITY: usize = 64;

/// Spawn the runner task for an accepted job
pub(crate) fn spawn_job(
    store: JobStore,
    extractor: Arc<dyn MediaExtractor>,
    event_tx: broadcast::Sender<Event>,
    id: JobId,
    request: SubmitRequest,
    options: FetchOptions,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let (progress_tx, mut progress_rx) = mpsc::channel(PROGRESS_CHANNEL_CAPACITY);

        // The fetch runs on its own task so a panic inside the engine
        // boundary is contained and still produces a terminal update.
        let fetch_handle = tokio::spawn({
            let extractor = extractor.clone();
            let url = request.url.clone();
            let options = options.clone();
            async move { extractor.fetch(&url, &options, progress_tx).await }
        });

        // Forward progress until the engine drops its sender. The engine's
        // own Finished event carries no extra information; the terminal
        // transition is driven by the fetch result below.
        while let Some(event) = progress_rx.recv().await {
            if let ProgressEvent::Downloading(snapshot) = event {
                if let Err(e) = store.update(id, JobUpdate::Progress(snapshot)).await {
                    tracing::error!(job_id = %id, error = %e, "failed to record progress");
                }
            }
        }

        // The progress channel is fully drained at this point, so the
        // terminal update below is guaranteed to be the job's last update.
        let result = match fetch_handle.await {
            Ok(result) => result,
            Err(join_error) => Err(Error::ApiServer(format!(
                "download task aborted: {join_error}"
            ))),
        };

        match result {
            Ok(output) => {
                tracing::info!(job_id = %id, output = %output.display(), "job finished");
                if let Err(e) = store.update(id, JobUpdate::Finished(output.clone())).await {
                    tracing::error!(job_id = %id, error = %e, "failed to record completion");
                }
                let _ = event_tx.send(Event::Finished { id, output });
            }
            Err(error) => {
                let message = error.to_string();
                tracing::warn!(job_id = %id, error = %message, "job failed");
                if let Err(e) = store.update(id, JobUpdate::Failed(message.clone())).await {
                    tracing::error!(job_id = %id, error = %e, "failed to record failure");
                }
                let _ = event_tx.send(Event::Failed { id, error: message });
            }
        }
    })
}
