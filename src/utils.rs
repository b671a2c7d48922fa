//! Utility functions

/// Sanitize a filename for cross-platform safety
///
/// Strips characters invalid on common filesystems, collapses whitespace
/// runs, trims leading/trailing spaces and dots, and caps the length.
pub fn sanitize_filename(name: &str) -> String {
    const INVALID: [char; 9] = ['<', '>', ':', '"', '/', '\\', '|', '?', '*'];
    const MAX_LEN: usize = 200;

    let mut out = String::with_capacity(name.len());
    let mut last_was_space = false;
    for c in name.chars() {
        if INVALID.contains(&c) || c.is_control() {
            continue;
        }
        if c.is_whitespace() {
            if !last_was_space {
                out.push(' ');
            }
            last_was_space = true;
        } else {
            out.push(c);
            last_was_space = false;
        }
    }

    out.trim_matches([' ', '.']).chars().take(MAX_LEN).collect()
}

/// Build a Content-Disposition attachment header value
///
/// Provides an ASCII fallback filename plus an RFC 5987 `filename*` form so
/// non-ASCII titles survive in browsers that support it.
pub fn content_disposition(filename: &str) -> String {
    let safe_ascii: String = filename
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_' | ' ') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let safe_ascii = if safe_ascii.trim().is_empty() {
        "download.bin".to_string()
    } else {
        safe_ascii
    };

    format!(
        "attachment; filename=\"{safe_ascii}\"; filename*=UTF-8''{}",
        percent_encode(filename)
    )
}

/// Percent-encode a string for use in an RFC 5987 extended parameter value
fn percent_encode(value: &str) -> String {
    let mut encoded = String::with_capacity(value.len() * 3);
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'.' | b'-' | b'_' | b'~' => {
                encoded.push(byte as char);
            }
            _ => {
                encoded.push_str(&format!("%{byte:02X}"));
            }
        }
    }
    encoded
}
