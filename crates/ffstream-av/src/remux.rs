//! Stream-copy remuxing.

use crate::{Error, Result, Workspace};
use std::path::Path;
use std::process::Command;

/// Rewrite a file in place by stream-copying it through ffmpeg.
///
/// Used to repair containers (typically webm) whose header lacks a duration;
/// the muxer writes a fresh one on the way through.
pub fn remux_in_place(ffmpeg: &Path, input: &Path) -> Result<()> {
    let workspace = Workspace::new(input)?;
    remux_copy(ffmpeg, workspace.input(), workspace.output())?;
    workspace.finalize()?;

    tracing::info!("Remuxed {}", input.display());
    Ok(())
}

/// Copy all streams of `input` into `output` without re-encoding.
pub fn remux_copy(ffmpeg: &Path, input: &Path, output: &Path) -> Result<()> {
    tracing::debug!(
        "Remuxing with ffmpeg: {} -> {}",
        input.display(),
        output.display()
    );

    let result = Command::new(ffmpeg)
        .args(["-v", "error", "-y", "-i"])
        .arg(input)
        .args(["-map", "0", "-c", "copy"])
        .arg(output)
        .output()
        .map_err(|e| Error::from_spawn("ffmpeg", e))?;

    if !result.status.success() {
        let stderr = String::from_utf8_lossy(&result.stderr);
        return Err(Error::tool_failed("ffmpeg", stderr.trim().to_string()));
    }

    Ok(())
}
