//! Extraction adapter
//!
//! Isolates all interaction with the external media engine (yt-dlp) behind
//! the [`MediaExtractor`] trait: `probe` retrieves metadata without writing a
//! file, `fetch` performs the download/transcode and streams normalized
//! progress events to the caller. The trait seam also lets tests substitute
//! the engine entirely.

mod probe;
mod progress;

use crate::config::Config;
use crate::error::{ExtractionError, Result};
use crate::types::{MediaInfo, ProgressEvent};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::ffi::OsString;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tokio::sync::mpsc;

/// Number of trailing stderr lines preserved for failure messages
const STDERR_TAIL_LINES: usize = 15;

/// Options for a single fetch operation
#[derive(Clone, Debug)]
pub struct FetchOptions {
    /// Requested quality token ("best", "1080p", ...)
    pub quality: String,

    /// Extract best audio and transcode to an audio-only container
    pub audio_only: bool,

    /// Output path without extension; the final container extension is
    /// appended based on `audio_only`
    pub output_stem: PathBuf,
}

impl FetchOptions {
    /// Container extension of the artifact this fetch will produce
    ///
    /// Audio-only fetches always yield mp3 regardless of the quality token;
    /// video fetches are merged into mp4.
    pub fn container_extension(&self) -> &'static str {
        if self.audio_only { "mp3" } else { "mp4" }
    }

    /// Full path of the artifact this fetch will produce
    pub fn output_path(&self) -> PathBuf {
        self.output_stem.with_extension(self.container_extension())
    }
}

/// Map a quality token to an engine format-selection expression
///
/// A height token clamps by maximum height with a plain `best` fallback when
/// the exact height is unavailable. The bare `best` token (and any token that
/// does not parse as a height) clamps at 1080p.
pub fn format_selector(quality: &str) -> String {
    let quality = quality.trim().to_ascii_lowercase();
    if let Some(height) = quality
        .strip_suffix('p')
        .and_then(|h| h.parse::<u32>().ok())
        .filter(|h| *h > 0)
    {
        return format!("best[height<={height}]/best");
    }
    "best[height<=1080]/best".to_string()
}

/// Boundary wrapper around the external media engine
#[async_trait]
pub trait MediaExtractor: Send + Sync {
    /// Retrieve metadata for a URL without downloading anything
    async fn probe(&self, url: &str) -> Result<MediaInfo>;

    /// Download the media to `options.output_path()`
    ///
    /// Emits zero or more normalized [`ProgressEvent`]s on `progress` while
    /// the transfer runs and returns the artifact path once it is fully
    /// written, including any post-processing such as audio extraction.
    async fn fetch(
        &self,
        url: &str,
        options: &FetchOptions,
        progress: mpsc::Sender<ProgressEvent>,
    ) -> Result<PathBuf>;
}

/// [`MediaExtractor`] implementation driving the yt-dlp binary as a subprocess
pub struct YtDlpExtractor {
    ytdlp: PathBuf,
    ffmpeg: Option<PathBuf>,
    check_certificates: bool,
    max_renditions: usize,
}

impl YtDlpExtractor {
    /// Build an extractor from config, discovering binaries on PATH when no
    /// explicit paths are set and `tools.search_path` is enabled
    pub fn from_config(config: &Config) -> Result<Self> {
        let ytdlp = match &config.tools.ytdlp_path {
            Some(path) => path.clone(),
            None if config.tools.search_path => which::which("yt-dlp")
                .map_err(|e| ExtractionError::BinaryNotFound(format!("yt-dlp: {e}")))?,
            None => {
                return Err(ExtractionError::BinaryNotFound(
                    "ytdlp_path not configured and PATH search disabled".to_string(),
                )
                .into());
            }
        };

        // ffmpeg is only required for merges and audio extraction; a missing
        // binary surfaces as an engine failure on the jobs that need it.
        let ffmpeg = config.tools.ffmpeg_path.clone().or_else(|| {
            if config.tools.search_path {
                which::which("ffmpeg").ok()
            } else {
                None
            }
        });

        if ffmpeg.is_none() {
            tracing::warn!("ffmpeg not found; merged video and audio-only downloads may fail");
        }

        Ok(Self {
            ytdlp,
            ffmpeg,
            check_certificates: config.network.check_certificates,
            max_renditions: config.download.max_renditions,
        })
    }

    fn probe_args(&self, url: &str) -> Vec<OsString> {
        let mut args: Vec<OsString> = [
            "--dump-single-json",
            "--skip-download",
            "--no-playlist",
            "--no-warnings",
            "--no-progress",
        ]
        .into_iter()
        .map(OsString::from)
        .collect();
        if !self.check_certificates {
            args.push("--no-check-certificates".into());
        }
        args.push(url.into());
        args
    }

    fn fetch_args(&self, url: &str, options: &FetchOptions) -> Vec<OsString> {
        let mut args: Vec<OsString> = [
            "--newline",
            "--no-playlist",
            "--no-warnings",
            "--progress-template",
            progress::PROGRESS_TEMPLATE,
        ]
        .into_iter()
        .map(OsString::from)
        .collect();

        args.push("-o".into());
        let mut template = options.output_stem.clone().into_os_string();
        template.push(".%(ext)s");
        args.push(template);

        if !self.check_certificates {
            args.push("--no-check-certificates".into());
        }
        if let Some(ffmpeg) = &self.ffmpeg {
            args.push("--ffmpeg-location".into());
            args.push(ffmpeg.clone().into());
        }

        if options.audio_only {
            args.extend(
                ["-f", "bestaudio/best", "-x", "--audio-format", "mp3", "--audio-quality", "192K"]
                    .into_iter()
                    .map(OsString::from),
            );
        } else {
            args.push("-f".into());
            args.push(format_selector(&options.quality).into());
            args.push("--merge-output-format".into());
            args.push("mp4".into());
        }

        args.push(url.into());
        args
    }
}

#[async_trait]
impl MediaExtractor for YtDlpExtractor {
    async fn probe(&self, url: &str) -> Result<MediaInfo> {
        tracing::debug!(url, "probing metadata");
        let output = Command::new(&self.ytdlp)
            .args(self.probe_args(url))
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| ExtractionError::SpawnFailed(e.to_string()))?;

        if !output.status.success() {
            return Err(ExtractionError::EngineFailed {
                reason: stderr_tail_from_bytes(&output.stderr, output.status.code()),
            }
            .into());
        }

        probe::parse_media_info(&output.stdout, self.max_renditions)
    }

    async fn fetch(
        &self,
        url: &str,
        options: &FetchOptions,
        progress: mpsc::Sender<ProgressEvent>,
    ) -> Result<PathBuf> {
        tracing::debug!(url, output = %options.output_path().display(), "starting fetch");

        let mut child = Command::new(&self.ytdlp)
            .args(self.fetch_args(url, options))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| ExtractionError::SpawnFailed(e.to_string()))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| ExtractionError::SpawnFailed("stdout not captured".to_string()))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| ExtractionError::SpawnFailed("stderr not captured".to_string()))?;

        // Drain stderr concurrently so a chatty engine cannot deadlock on a
        // full pipe while we read stdout.
        let stderr_task = tokio::spawn(collect_tail(stderr));

        let mut lines = BufReader::new(stdout).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            if let Some(snapshot) = progress::parse_progress_line(&line) {
                // The receiver may have stopped listening; that must not
                // abort the transfer.
                let _ = progress.send(ProgressEvent::Downloading(snapshot)).await;
            }
        }

        let status = child
            .wait()
            .await
            .map_err(|e| ExtractionError::SpawnFailed(e.to_string()))?;
        let stderr_tail = stderr_task.await.unwrap_or_default();

        if !status.success() {
            return Err(ExtractionError::EngineFailed {
                reason: if stderr_tail.is_empty() {
                    format!("engine exited with {status}")
                } else {
                    stderr_tail
                },
            }
            .into());
        }

        let output = options.output_path();
        if tokio::fs::metadata(&output).await.is_err() {
            return Err(ExtractionError::InvalidOutput(format!(
                "engine reported success but produced no file at {}",
                output.display()
            ))
            .into());
        }

        let _ = progress
            .send(ProgressEvent::Finished {
                output: output.clone(),
            })
            .await;
        Ok(output)
    }
}

/// Keep the last [`STDERR_TAIL_LINES`] lines of an async stream
async fn collect_tail<R: AsyncRead + Unpin>(reader: R) -> String {
    let mut tail: VecDeque<String> = VecDeque::with_capacity(STDERR_TAIL_LINES);
    let mut lines = BufReader::new(reader).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        if tail.len() == STDERR_TAIL_LINES {
            tail.pop_front();
        }
        tail.push_back(line);
    }
    tail.into_iter().collect::<Vec<_>>().join("\n")
}

fn stderr_tail_from_bytes(stderr: &[u8], exit_code: Option<i32>) -> String {
    let text = String::from_utf8_lossy(stderr);
    let lines: Vec<&str> = text.lines().collect();
    let start = lines.len().saturating_sub(STDERR_TAIL_LINES);
    let tail = lines[start..].join("\n");
    if tail.trim().is_empty() {
        match exit_code {
            Some(code) => format!("engine exited with code {code}"),
            None => "engine terminated by signal".to_string(),
        }
    } else {
        tail
    }
}
