use crate::loader::{ScanOptions, DEFAULT_EXTENSIONS};
use crate::stream::{StreamOptions, DEFAULT_CHUNK_SIZE, DEFAULT_SHUTDOWN_GRACE};
use ffstream_av::ProfilePreset;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub tools: ToolsConfig,

    #[serde(default)]
    pub stream: StreamConfig,

    #[serde(default)]
    pub scan: ScanConfig,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ToolsConfig {
    /// Looked up on PATH when unset
    #[serde(default)]
    pub ffmpeg_path: Option<PathBuf>,

    #[serde(default)]
    pub ffprobe_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StreamConfig {
    /// Bytes relayed from decoder to encoder per read
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Built-in profiles used when a playlist defines none
    #[serde(default)]
    pub profile_preset: ProfilePreset,

    /// Seconds the encoder gets to exit once its input is closed
    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_timeout_secs: u64,
}

fn default_chunk_size() -> usize {
    DEFAULT_CHUNK_SIZE
}

fn default_shutdown_timeout() -> u64 {
    DEFAULT_SHUTDOWN_GRACE.as_secs()
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            profile_preset: ProfilePreset::default(),
            shutdown_timeout_secs: default_shutdown_timeout(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScanConfig {
    /// File extensions considered by `generate` and `fix-meta`
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    #[serde(default)]
    pub recursive: bool,
}

fn default_extensions() -> Vec<String> {
    DEFAULT_EXTENSIONS.iter().map(|s| s.to_string()).collect()
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            extensions: default_extensions(),
            recursive: false,
        }
    }
}

impl Config {
    /// Session options using the given ffmpeg executable.
    pub fn stream_options(&self, ffmpeg: impl Into<PathBuf>) -> StreamOptions {
        StreamOptions {
            ffmpeg: ffmpeg.into(),
            chunk_size: self.stream.chunk_size,
            preset: self.stream.profile_preset,
            shutdown_grace: Duration::from_secs(self.stream.shutdown_timeout_secs),
        }
    }

    /// Scan options, with CLI overrides applied on top.
    pub fn scan_options(&self, extensions: Option<Vec<String>>, recursive: bool) -> ScanOptions {
        ScanOptions {
            extensions: extensions.unwrap_or_else(|| self.scan.extensions.clone()),
            recursive: recursive || self.scan.recursive,
        }
    }
}
