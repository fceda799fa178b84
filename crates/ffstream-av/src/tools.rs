//! Locating ffmpeg and ffprobe.

use crate::{Error, Result};
use std::path::{Path, PathBuf};
use std::process::Command;

/// Name of the transcoder binary.
pub const FFMPEG: &str = "ffmpeg";
/// Name of the prober binary.
pub const FFPROBE: &str = "ffprobe";

/// What `<tool> -version` revealed about an installed tool.
#[derive(Debug, Clone)]
pub struct ToolInfo {
    pub name: String,
    pub available: bool,
    /// First line of the version banner.
    pub version: Option<String>,
    pub path: Option<PathBuf>,
}

/// Run `<tool> -version`, using `configured` instead of a PATH lookup when set.
///
/// # Example
///
/// ```no_run
/// use ffstream_av::check_tool;
///
/// let info = check_tool("ffprobe", None);
/// if info.available {
///     println!("ffprobe version: {:?}", info.version);
/// }
/// ```
pub fn check_tool(name: &str, configured: Option<&Path>) -> ToolInfo {
    let program = match configured {
        Some(path) => path.to_path_buf(),
        None => PathBuf::from(name),
    };

    let output = match Command::new(&program).arg("-version").output() {
        Ok(output) if output.status.success() => output,
        _ => {
            return ToolInfo {
                name: name.to_string(),
                available: false,
                version: None,
                path: None,
            }
        }
    };

    let version = String::from_utf8_lossy(&output.stdout)
        .lines()
        .next()
        .map(str::to_string);

    ToolInfo {
        name: name.to_string(),
        available: true,
        version,
        path: which::which(&program).ok(),
    }
}

/// Find `name` on PATH.
///
/// # Errors
///
/// [`Error::ToolNotFound`] when it is not there.
pub fn require_tool(name: &str) -> Result<PathBuf> {
    which::which(name).map_err(|_| Error::tool_not_found(name))
}

/// Configured path when it exists, otherwise a PATH lookup.
pub fn get_tool_path(name: &str, config_path: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = config_path {
        if path.exists() {
            return Ok(path.to_path_buf());
        }
        tracing::warn!(
            "Configured path for {} does not exist: {}; falling back to PATH",
            name,
            path.display()
        );
    }

    require_tool(name)
}

/// Resolved executable paths for ffmpeg and ffprobe.
#[derive(Debug, Clone)]
pub struct ToolPaths {
    pub ffmpeg: PathBuf,
    pub ffprobe: PathBuf,
}

impl ToolPaths {
    /// Resolve both tools, preferring configured paths.
    pub fn resolve(ffmpeg: Option<&Path>, ffprobe: Option<&Path>) -> Result<Self> {
        Ok(Self {
            ffmpeg: get_tool_path(FFMPEG, ffmpeg)?,
            ffprobe: get_tool_path(FFPROBE, ffprobe)?,
        })
    }
}
