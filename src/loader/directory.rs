//! Playlists generated from a directory of media files.

use super::PlaylistLoader;
use crate::playlist::{MediaEntry, Playlist};
use crate::{Error, Result};
use ffstream_av::Prober;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Extensions picked up when none are configured.
pub const DEFAULT_EXTENSIONS: &[&str] = &["mp4", "webm", "mkv"];

/// Which files a directory scan considers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanOptions {
    /// Extensions without the leading dot, matched case-insensitively.
    pub extensions: Vec<String>,
    /// Descend into subdirectories.
    pub recursive: bool,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            extensions: DEFAULT_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
            recursive: false,
        }
    }
}

impl ScanOptions {
    fn matches(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| self.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
            .unwrap_or(false)
    }
}

/// Builds a playlist with one entry per probeable media file in a directory.
///
/// Files are visited in file name order. Files that fail to probe are
/// skipped with a warning.
pub struct DirectoryPlaylistLoader<'a> {
    prober: &'a dyn Prober,
    options: ScanOptions,
}

impl<'a> DirectoryPlaylistLoader<'a> {
    pub fn new(prober: &'a dyn Prober, options: ScanOptions) -> Self {
        Self { prober, options }
    }

    /// Matching files under `dir`, without probing them.
    pub fn find_files(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        if !dir.is_dir() {
            return Err(Error::playlist_at(
                dir,
                format!("{} is not a directory", dir.display()),
            ));
        }

        let max_depth = if self.options.recursive { usize::MAX } else { 1 };

        let files = WalkDir::new(dir)
            .max_depth(max_depth)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| e.into_path())
            .filter(|path| self.options.matches(path))
            .collect();

        Ok(files)
    }
}

impl PlaylistLoader for DirectoryPlaylistLoader<'_> {
    fn load(&self, dir: &Path) -> Result<Playlist> {
        info!("Scanning directory: {}", dir.display());

        let mut playlist = Playlist::default();
        for path in self.find_files(dir)? {
            let source = path.to_string_lossy();
            match self.prober.probe(&source) {
                Ok(info) => {
                    debug!("Adding {}", source);
                    playlist.entries.push(MediaEntry::from_media_info(info));
                }
                Err(e) => warn!("Skipping {}: {}", source, e),
            }
        }

        info!(
            "Scan complete: {} entries from {}",
            playlist.entry_count(),
            dir.display()
        );
        Ok(playlist)
    }
}
