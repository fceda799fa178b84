//! Scratch space for rewriting a media file in place.

use crate::{Error, Result};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Temporary directory holding the rewritten copy of one file.
///
/// The rewritten file only replaces the original on [`finalize`](Self::finalize);
/// dropping the workspace discards it.
///
/// # Example
///
/// ```no_run
/// use ffstream_av::Workspace;
///
/// let workspace = Workspace::new("/media/clip.webm")?;
/// // write the new file to workspace.output()
/// workspace.finalize()?;
/// # Ok::<(), ffstream_av::Error>(())
/// ```
pub struct Workspace {
    temp_dir: TempDir,
    input_path: PathBuf,
    output_path: PathBuf,
}

impl Workspace {
    /// Create a workspace for `input`. The output keeps the input's file name.
    pub fn new<P: AsRef<Path>>(input: P) -> Result<Self> {
        let input = input.as_ref();
        if !input.is_file() {
            return Err(Error::file_not_found(input));
        }

        let file_name = input
            .file_name()
            .ok_or_else(|| Error::InvalidInput(format!("not a file path: {}", input.display())))?;

        let temp_dir = TempDir::new().map_err(|e| Error::Workspace(e.to_string()))?;
        let output_path = temp_dir.path().join(file_name);

        Ok(Self {
            temp_dir,
            input_path: input.to_path_buf(),
            output_path,
        })
    }

    pub fn input(&self) -> &Path {
        &self.input_path
    }

    /// Where the rewritten file must be written.
    pub fn output(&self) -> &Path {
        &self.output_path
    }

    pub fn temp_dir(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Replace the input with the rewritten file.
    ///
    /// The original is renamed to `.bak` first and restored if the move fails.
    pub fn finalize(self) -> Result<PathBuf> {
        let dest = self.input_path.as_path();

        if !self.output_path.exists() {
            return Err(Error::Workspace(format!(
                "output file does not exist: {}",
                self.output_path.display()
            )));
        }

        let backup = dest.with_extension("bak");
        std::fs::rename(dest, &backup)
            .map_err(|e| Error::Workspace(format!("failed to back up {}: {}", dest.display(), e)))?;

        if let Err(e) = move_file(&self.output_path, dest) {
            let _ = std::fs::rename(&backup, dest);
            return Err(Error::Workspace(format!(
                "failed to move output to {}: {}",
                dest.display(),
                e
            )));
        }

        let _ = std::fs::remove_file(&backup);
        Ok(dest.to_path_buf())
    }
}

/// Rename, falling back to copy + remove when crossing filesystems.
fn move_file(from: &Path, to: &Path) -> std::io::Result<()> {
    match std::fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(_) => {
            std::fs::copy(from, to)?;
            std::fs::remove_file(from)
        }
    }
}
