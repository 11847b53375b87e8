//! Configuration structures and loading logic.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub media: MediaConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

/// API client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Minimum delay between consecutive API calls, in seconds.
    #[serde(default = "default_rate_limit_delay")]
    pub rate_limit_delay_secs: f64,

    /// Retry budget per failure category.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Records requested per page (the API caps this at 50).
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

/// Media download configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaConfig {
    #[serde(default = "default_true")]
    pub download_images: bool,

    #[serde(default = "default_true")]
    pub download_videos: bool,

    #[serde(default = "default_true")]
    pub download_documents: bool,

    /// Videos with a declared size above this are skipped, not downloaded.
    #[serde(default = "default_max_video_size")]
    pub max_video_size_mb: u64,
}

/// Archive output configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Root of the archive tree.
    #[serde(default = "default_base_dir")]
    pub base_dir: PathBuf,

    /// strftime pattern for the per-post date bucket.
    #[serde(default = "default_date_format")]
    pub date_format: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            rate_limit_delay_secs: default_rate_limit_delay(),
            max_retries: default_max_retries(),
            timeout_secs: default_timeout(),
            page_size: default_page_size(),
        }
    }
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            download_images: true,
            download_videos: true,
            download_documents: true,
            max_video_size_mb: default_max_video_size(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            base_dir: default_base_dir(),
            date_format: default_date_format(),
        }
    }
}

fn default_rate_limit_delay() -> f64 {
    1.5
}

fn default_max_retries() -> u32 {
    3
}

fn default_timeout() -> u64 {
    30
}

fn default_page_size() -> u32 {
    50
}

fn default_true() -> bool {
    true
}

fn default_max_video_size() -> u64 {
    500
}

fn default_base_dir() -> PathBuf {
    PathBuf::from("archive")
}

fn default_date_format() -> String {
    "%Y/%m".to_string()
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::Config(format!(
                    "Configuration file not found: {}",
                    path.display()
                ))
            } else {
                Error::Io(e)
            }
        })?;

        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// The effective archive root directory.
    pub fn base_dir(&self) -> &Path {
        &self.output.base_dir
    }
}
