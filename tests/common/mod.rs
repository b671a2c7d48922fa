//! Shared helpers for integration tests
//!
//! Provides a fake extraction engine: a shell script that mimics yt-dlp's
//! observable behavior (probe JSON on stdout, expanded progress-template
//! lines, output file written next to the `-o` template).

#![allow(dead_code)]

use media_dl::{Config, DownloadConfig, ToolsConfig};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const FAKE_ENGINE: &str = r#"#!/bin/sh
# Fake yt-dlp used by integration tests.
out=""
audio=0
probe=0
prev=""
for arg in "$@"; do
    if [ "$prev" = "-o" ]; then out="$arg"; fi
    if [ "$arg" = "-x" ]; then audio=1; fi
    if [ "$arg" = "--dump-single-json" ]; then probe=1; fi
    prev="$arg"
done

if [ "$probe" = "1" ]; then
    cat <<'EOF'
{
  "title": "Fake Video",
  "duration": 120.0,
  "uploader": "fake channel",
  "view_count": 99,
  "thumbnail": "https://example.com/thumb.jpg",
  "formats": [
    {"format_id": "18", "height": 360, "vcodec": "avc1", "ext": "mp4", "filesize": 1000},
    {"format_id": "22", "height": 720, "vcodec": "avc1", "ext": "mp4", "filesize": 4000},
    {"format_id": "ba", "vcodec": "none", "ext": "m4a"}
  ]
}
EOF
    exit 0
fi

if [ "$audio" = "1" ]; then ext=mp3; else ext=mp4; fi
path=$(printf '%s' "$out" | sed 's/\.%(ext)s$/.'"$ext"'/')

echo "media-dl|512|1024|NA|2048|5"
echo "media-dl|1024|1024|NA|2048|0"
printf 'fake engine payload' > "$path"
"#;

const FAILING_ENGINE: &str = r#"#!/bin/sh
if printf '%s\n' "$@" | grep -q -- --dump-single-json; then
    echo "ERROR: unsupported URL" >&2
    exit 1
fi
echo "WARNING: something noisy" >&2
echo "ERROR: unsupported URL" >&2
exit 1
"#;

/// Write an executable fake engine script into `dir`
pub fn install_engine(dir: &Path, script: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join("fake-yt-dlp");
    std::fs::write(&path, script).expect("write fake engine");
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))
        .expect("mark fake engine executable");
    path
}

/// Config pointing at a fake engine, with downloads in a temp dir
pub fn engine_config(script: &str) -> (Config, TempDir) {
    let dir = TempDir::new().expect("temp dir");
    let engine = install_engine(dir.path(), script);
    let config = Config {
        download: DownloadConfig {
            download_dir: dir.path().join("downloads"),
            ..DownloadConfig::default()
        },
        tools: ToolsConfig {
            ytdlp_path: Some(engine),
            ffmpeg_path: None,
            search_path: false,
        },
        ..Config::default()
    };
    (config, dir)
}

/// Config whose fake engine succeeds
pub fn working_config() -> (Config, TempDir) {
    engine_config(FAKE_ENGINE)
}

/// Config whose fake engine always fails
pub fn failing_config() -> (Config, TempDir) {
    engine_config(FAILING_ENGINE)
}
