//! Turning files on disk into playlists.
//!
//! - [`JsonPlaylistLoader`] reads a persisted playlist document and probes
//!   each entry's source.
//! - [`DirectoryPlaylistLoader`] scans a directory for media files.
//!
//! Both validate everything up front; a playlist they return is ready to play.

mod directory;
mod json;

pub use directory::{DirectoryPlaylistLoader, ScanOptions, DEFAULT_EXTENSIONS};
pub use json::{to_json, write_playlist, JsonPlaylistLoader};

use crate::playlist::Playlist;
use crate::Result;
use std::path::Path;

/// Something that can build a playlist from a path.
pub trait PlaylistLoader {
    fn load(&self, path: &Path) -> Result<Playlist>;
}
