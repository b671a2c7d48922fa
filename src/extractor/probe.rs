//! Metadata probe payload normalization
//!
//! Deserializes the engine's `--dump-single-json` output. Only the fields the
//! API surfaces are read; everything else in the (large) payload is ignored.

use crate::error::{ExtractionError, Result};
use crate::types::{MediaInfo, Rendition};
use serde::Deserialize;
use std::collections::HashSet;

/// Subset of the engine's single-video JSON payload
#[derive(Debug, Deserialize)]
struct RawMediaInfo {
    title: Option<String>,
    duration: Option<f64>,
    uploader: Option<String>,
    view_count: Option<u64>,
    thumbnail: Option<String>,
    #[serde(default)]
    formats: Vec<RawFormat>,
}

#[derive(Debug, Deserialize)]
struct RawFormat {
    format_id: Option<String>,
    vcodec: Option<String>,
    height: Option<u32>,
    ext: Option<String>,
    filesize: Option<u64>,
    filesize_approx: Option<u64>,
}

impl RawFormat {
    /// Video formats carry a codec other than "none" and a known height
    fn is_video(&self) -> bool {
        self.vcodec.as_deref().is_some_and(|v| v != "none") && self.height.unwrap_or(0) > 0
    }
}

/// Normalize a probe payload into [`MediaInfo`]
///
/// Renditions are deduplicated by quality label (first occurrence wins),
/// sorted by descending height, and truncated to `max_renditions`.
pub(crate) fn parse_media_info(payload: &[u8], max_renditions: usize) -> Result<MediaInfo> {
    let raw: RawMediaInfo = serde_json::from_slice(payload)
        .map_err(|e| ExtractionError::InvalidOutput(format!("metadata payload: {e}")))?;

    let mut seen_labels: HashSet<String> = HashSet::new();
    let mut with_height: Vec<(u32, Rendition)> = Vec::new();

    for format in &raw.formats {
        if !format.is_video() {
            continue;
        }
        let height = format.height.unwrap_or(0);
        let label = format!("{height}p");
        if !seen_labels.insert(label.clone()) {
            continue;
        }
        with_height.push((
            height,
            Rendition {
                id: format.format_id.clone().unwrap_or_default(),
                quality_label: label,
                container_format: format.ext.clone().unwrap_or_else(|| "mp4".to_string()),
                size_bytes: format.filesize.or(format.filesize_approx),
            },
        ));
    }

    with_height.sort_by(|a, b| b.0.cmp(&a.0));
    let renditions: Vec<Rendition> = with_height
        .into_iter()
        .take(max_renditions)
        .map(|(_, r)| r)
        .collect();

    Ok(MediaInfo {
        title: raw.title.unwrap_or_else(|| "Unknown Title".to_string()),
        duration_seconds: raw.duration.unwrap_or(0.0).max(0.0) as u64,
        uploader: raw.uploader.unwrap_or_else(|| "Unknown".to_string()),
        view_count: raw.view_count.unwrap_or(0),
        thumbnail_url: raw.thumbnail.unwrap_or_default(),
        renditions,
    })
}
