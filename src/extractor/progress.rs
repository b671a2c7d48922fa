//! Progress event normalization
//!
//! The engine is invoked with a machine-readable `--progress-template` so its
//! per-line progress output can be parsed without scraping the human display.
//! Each recognized line becomes one normalized [`Progress`] snapshot; fields
//! the engine does not know degrade to `None` instead of fabricated values.

use crate::types::Progress;

/// Tag prefixing every templated progress line on the engine's stdout
pub(crate) const PROGRESS_PREFIX: &str = "media-dl|";

/// Progress template handed to the engine
///
/// Produces lines of the form
/// `media-dl|<downloaded_bytes>|<total_bytes>|<total_bytes_estimate>|<speed>|<eta>`
/// with `NA` for fields the engine does not know.
pub(crate) const PROGRESS_TEMPLATE: &str = concat!(
    "download:media-dl|%(progress.downloaded_bytes)s|%(progress.total_bytes)s",
    "|%(progress.total_bytes_estimate)s|%(progress.speed)s|%(progress.eta)s"
);

/// Parse one stdout line into a progress snapshot
///
/// Returns None for lines that are not templated progress output (the engine
/// interleaves destination and post-processing notices on the same stream).
pub(crate) fn parse_progress_line(line: &str) -> Option<Progress> {
    let fields = line.trim().strip_prefix(PROGRESS_PREFIX)?;
    let mut parts = fields.split('|');

    let downloaded_bytes = parse_count(parts.next()?).unwrap_or(0);
    let total_bytes = parse_count(parts.next()?);
    let total_estimate = parse_count(parts.next()?);
    let speed_bps = parse_count(parts.next()?);
    let eta_seconds = parse_count(parts.next()?);

    // Exact total wins over the estimate; percent is only derived when a
    // positive denominator exists.
    let total = total_bytes.or(total_estimate).filter(|t| *t > 0);
    let percent = total.map(|t| round_percent(downloaded_bytes as f64 / t as f64 * 100.0));

    Some(Progress {
        percent,
        speed_bps,
        eta_seconds,
        downloaded_bytes,
        total_bytes: total,
    })
}

/// Parse a numeric template field; `NA`/`None`/empty mean unknown
///
/// The engine prints floats for byte rates, so values are parsed as f64 and
/// truncated.
fn parse_count(field: &str) -> Option<u64> {
    let field = field.trim();
    if field.is_empty() || field == "NA" || field == "None" || field == "null" {
        return None;
    }
    field.parse::<f64>().ok().filter(|v| *v >= 0.0).map(|v| v as u64)
}

fn round_percent(value: f64) -> f32 {
    ((value * 10.0).round() / 10.0).clamp(0.0, 100.0) as f32
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_progress_line_parses_with_percent() {
        let progress = parse_progress_line("media-dl|2500|10000|NA|52428.8|13").unwrap();
        assert_eq!(progress.percent, Some(25.0));
        assert_eq!(progress.downloaded_bytes, 2500);
        assert_eq!(progress.total_bytes, Some(10000));
        assert_eq!(progress.speed_bps, Some(52428));
        assert_eq!(progress.eta_seconds, Some(13));
    }

    #[test]
    fn unknown_total_omits_percent_instead_of_dividing_by_zero() {
        let progress = parse_progress_line("media-dl|4096|NA|NA|1024|NA").unwrap();
        assert!(
            progress.percent.is_none(),
            "percent must be omitted when no denominator is known"
        );
        assert_eq!(progress.downloaded_bytes, 4096);
        assert!(progress.total_bytes.is_none());
        assert!(progress.eta_seconds.is_none());
    }

    #[test]
    fn estimate_is_used_when_exact_total_is_unknown() {
        let progress = parse_progress_line("media-dl|500|NA|2000|NA|NA").unwrap();
        assert_eq!(progress.percent, Some(25.0));
        assert_eq!(progress.total_bytes, Some(2000));
    }

    #[test]
    fn zero_total_is_treated_as_unknown() {
        let progress = parse_progress_line("media-dl|500|0|0|NA|NA").unwrap();
        assert!(progress.percent.is_none());
        assert!(progress.total_bytes.is_none());
    }

    #[test]
    fn percent_is_rounded_to_one_decimal() {
        let progress = parse_progress_line("media-dl|333|1000|NA|NA|NA").unwrap();
        assert_eq!(progress.percent, Some(33.3));
    }

    #[test]
    fn non_progress_lines_are_ignored() {
        assert!(parse_progress_line("[download] Destination: clip.mp4").is_none());
        assert!(parse_progress_line("[Merger] Merging formats into \"clip.mp4\"").is_none());
        assert!(parse_progress_line("").is_none());
    }

    #[test]
    fn truncated_line_is_rejected() {
        assert!(
            parse_progress_line("media-dl|2500|10000").is_none(),
            "a line missing fields must not produce a partial snapshot"
        );
    }

    #[test]
    fn float_byte_counts_parse() {
        // total_bytes_estimate is frequently a float
        let progress = parse_progress_line("media-dl|1048576.0|NA|4194304.5|262144.0|12").unwrap();
        assert_eq!(progress.downloaded_bytes, 1_048_576);
        assert_eq!(progress.total_bytes, Some(4_194_304));
        assert_eq!(progress.percent, Some(25.0));
    }
}
