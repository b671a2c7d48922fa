//! # media-dl
//!
//! Backend library for web-facing media download services: accepts download
//! submissions, delegates the actual extraction to yt-dlp, and tracks each
//! job's lifecycle for polling and artifact retrieval.
//!
//! ## Design Philosophy
//!
//! media-dl is designed to be:
//! - **Non-blocking** - Submission returns a job identity immediately; the
//!   download runs on its own task
//! - **Sensible defaults** - Works out of the box with zero configuration
//! - **Library-first** - The REST server is a thin layer over [`MediaBroker`],
//!   which embeds directly into other applications
//! - **Event-driven** - Consumers can subscribe to lifecycle events instead
//!   of polling
//!
//! ## Quick Start
//!
//! ```no_run
//! use media_dl::{Config, MediaBroker, SubmitRequest};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let broker = MediaBroker::new(Config::default()).await?;
//!
//!     let id = broker
//!         .submit(SubmitRequest {
//!             url: "https://example.com/watch?v=abc".to_string(),
//!             quality: "720p".to_string(),
//!             audio_only: false,
//!         })
//!         .await?;
//!
//!     let info = broker.progress(id).await?;
//!     println!("job {id} is {:?}", info.status);
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// REST API module
pub mod api;
/// Job lifecycle broker
pub mod broker;
/// Configuration types
pub mod config;
/// Error types
pub mod error;
/// Extraction engine adapter (yt-dlp)
pub mod extractor;
/// In-memory job store
pub mod store;
/// Core types and events
pub mod types;
/// Utility functions
pub mod utils;

// Re-export commonly used types
pub use broker::MediaBroker;
pub use config::{ApiConfig, Config, DownloadConfig, NetworkConfig, ToolsConfig};
pub use error::{ApiError, Error, ErrorDetail, ExtractionError, Result, ToHttpStatus};
pub use extractor::{FetchOptions, MediaExtractor, YtDlpExtractor};
pub use types::{
    BrokerStats, Event, Job, JobId, JobInfo, MediaInfo, Progress, Rendition, Status, SubmitRequest,
};

use std::sync::Arc;

/// Run the API server with graceful signal handling.
///
/// Serves the REST API for the given broker until a termination signal
/// arrives or the server itself stops.
///
/// - **Unix:** listens for SIGTERM and SIGINT, with fallbacks if signal registration fails.
/// - **Windows/other:** listens for Ctrl+C via `tokio::signal::ctrl_c()`.
///
/// # Example
///
/// ```no_run
/// use media_dl::{Config, MediaBroker, run_with_shutdown};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = Config::default();
///     let broker = MediaBroker::new(config.clone()).await?;
///
///     run_with_shutdown(broker, config).await?;
///
///     Ok(())
/// }
/// ```
pub async fn run_with_shutdown(broker: MediaBroker, config: Config) -> Result<()> {
    let broker = Arc::new(broker);
    let config = Arc::new(config);

    tokio::select! {
        result = api::start_api_server(broker, config) => result,
        () = wait_for_signal() => {
            tracing::info!("shutting down");
            Ok(())
        }
    }
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    // Signal registration may fail in restricted environments (containers, tests)
    let sigterm_result = signal(SignalKind::terminate());
    let sigint_result = signal(SignalKind::interrupt());

    match (sigterm_result, sigint_result) {
        (Ok(mut sigterm), Ok(mut sigint)) => {
            tokio::select! {
                _ = sigterm.recv() => {
                    tracing::info!("received SIGTERM signal");
                }
                _ = sigint.recv() => {
                    tracing::info!("received SIGINT signal (Ctrl+C)");
                }
            }
        }
        (Err(e), _) => {
            tracing::warn!(error = %e, "could not register SIGTERM handler, waiting for SIGINT only");
            if let Ok(mut sigint) = signal(SignalKind::interrupt()) {
                sigint.recv().await;
                tracing::info!("received SIGINT signal (Ctrl+C)");
            } else {
                tracing::error!("could not register any signal handlers, using ctrl_c fallback");
                tokio::signal::ctrl_c().await.ok();
            }
        }
        (_, Err(e)) => {
            tracing::warn!(error = %e, "could not register SIGINT handler, waiting for SIGTERM only");
            if let Ok(mut sigterm) = signal(SignalKind::terminate()) {
                sigterm.recv().await;
                tracing::info!("received SIGTERM signal");
            } else {
                tracing::error!("could not register any signal handlers, using ctrl_c fallback");
                tokio::signal::ctrl_c().await.ok();
            }
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            tracing::info!("received Ctrl+C signal");
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to listen for Ctrl+C signal");
        }
    }
}
