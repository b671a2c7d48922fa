//! Configuration types for media-dl

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;
use utoipa::ToSchema;

/// Download behavior configuration (directories, probe limits, quality set)
///
/// Groups settings related to how downloads are stored and which quality
/// tokens submissions may use. Used as a nested sub-config within [`Config`].
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct DownloadConfig {
    /// Download directory (default: "./downloads")
    #[serde(default = "default_download_dir")]
    #[schema(value_type = String)]
    pub download_dir: PathBuf,

    /// Maximum number of renditions returned by a metadata probe (default: 10)
    #[serde(default = "default_max_renditions")]
    pub max_renditions: usize,

    /// Quality tokens accepted by submissions (default: best plus common heights)
    #[serde(default = "default_allowed_qualities")]
    pub allowed_qualities: Vec<String>,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            download_dir: default_download_dir(),
            max_renditions: default_max_renditions(),
            allowed_qualities: default_allowed_qualities(),
        }
    }
}

/// External tool paths (yt-dlp, ffmpeg)
///
/// Groups settings for the external binaries the extraction adapter invokes.
/// Used as a nested sub-config within [`Config`].
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ToolsConfig {
    /// Path to the yt-dlp executable (auto-detected if None)
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub ytdlp_path: Option<PathBuf>,

    /// Path to the ffmpeg executable (auto-detected if None)
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub ffmpeg_path: Option<PathBuf>,

    /// Whether to search PATH for external binaries if explicit paths not set (default: true)
    #[serde(default = "default_true")]
    pub search_path: bool,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            ytdlp_path: None,
            ffmpeg_path: None,
            search_path: true,
        }
    }
}

/// Network behavior passed through to the extraction engine
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct NetworkConfig {
    /// Verify TLS certificates when the engine fetches media (default: true)
    #[serde(default = "default_true")]
    pub check_certificates: bool,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            check_certificates: true,
        }
    }
}

/// REST API server configuration
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiConfig {
    /// Bind address for the API server (default: 0.0.0.0:5000)
    #[serde(default = "default_bind_address")]
    #[schema(value_type = String)]
    pub bind_address: SocketAddr,

    /// Enable CORS (default: true)
    #[serde(default = "default_true")]
    pub cors_enabled: bool,

    /// Allowed CORS origins ("*" allows any; default: any)
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,

    /// Serve the interactive Swagger UI at /swagger-ui (default: false)
    #[serde(default)]
    pub swagger_ui: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            cors_enabled: true,
            cors_origins: default_cors_origins(),
            swagger_ui: false,
        }
    }
}

/// Main configuration for the media broker
///
/// Fields are organized into logical sub-configs:
/// - [`download`](DownloadConfig) — directories, probe limits, quality set
/// - [`tools`](ToolsConfig) — external binary paths
/// - [`network`](NetworkConfig) — TLS verification toggle
/// - [`api`](ApiConfig) — REST server settings
///
/// All sub-config fields except `api` are flattened so the JSON/TOML format
/// stays flat for the common settings.
#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct Config {
    /// Download behavior settings
    #[serde(flatten)]
    pub download: DownloadConfig,

    /// External tool paths
    #[serde(flatten)]
    pub tools: ToolsConfig,

    /// Network behavior
    #[serde(flatten)]
    pub network: NetworkConfig,

    /// API server settings
    #[serde(default)]
    pub api: ApiConfig,
}

// Convenience accessors — allow call sites to use `config.download_dir()` etc.
impl Config {
    /// Download directory
    pub fn download_dir(&self) -> &PathBuf {
        &self.download.download_dir
    }

    /// Whether a quality token is in the supported set
    pub fn is_quality_allowed(&self, quality: &str) -> bool {
        self.download
            .allowed_qualities
            .iter()
            .any(|q| q.eq_ignore_ascii_case(quality))
    }
}

fn default_download_dir() -> PathBuf {
    PathBuf::from("./downloads")
}

fn default_max_renditions() -> usize {
    10
}

fn default_allowed_qualities() -> Vec<String> {
    ["best", "2160p", "1440p", "1080p", "720p", "480p", "360p"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_bind_address() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 5000))
}

fn default_cors_origins() -> Vec<String> {
    vec!["*".to_string()]
}

fn default_true() -> bool {
    true
}
