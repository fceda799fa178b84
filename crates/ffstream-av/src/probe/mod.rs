//! Media probing.
//!
//! The [`Prober`] trait is the seam the playlist loaders use; [`FfprobeProber`]
//! is the implementation backed by the ffprobe CLI.

mod ffprobe;
mod types;

pub use ffprobe::{parse_ffprobe_json, probe_with_ffprobe};
pub use types::*;

use crate::tools::FFPROBE;
use crate::Result;
use std::path::PathBuf;

/// Something that can describe a media source.
pub trait Prober: Send + Sync {
    /// Backend name for logging.
    fn name(&self) -> &'static str;

    /// Probe `source`, which may be a path or any URI the backend accepts.
    fn probe(&self, source: &str) -> Result<MediaInfo>;
}

/// Prober running the ffprobe executable.
#[derive(Debug, Clone)]
pub struct FfprobeProber {
    binary: PathBuf,
}

impl FfprobeProber {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

impl Default for FfprobeProber {
    fn default() -> Self {
        Self::new(FFPROBE)
    }
}

impl Prober for FfprobeProber {
    fn name(&self) -> &'static str {
        "ffprobe"
    }

    fn probe(&self, source: &str) -> Result<MediaInfo> {
        tracing::debug!("Probing {} with {}", source, self.binary.display());
        probe_with_ffprobe(&self.binary, source)
    }
}
