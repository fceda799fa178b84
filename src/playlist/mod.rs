//! Playlist model.

mod entry;
mod output;
mod queue;

pub use entry::MediaEntry;
pub use output::{Output, Resolution};
pub use queue::PlaylistQueue;

use crate::filter::FilterInvocation;
use ffstream_av::ArgumentProfile;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Playlist-level argument profiles.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaylistProfile {
    pub encoder: ArgumentProfile,
    pub decoder: ArgumentProfile,
}

/// Default playlist name used when a document does not set one.
pub const DEFAULT_NAME: &str = "My Playlist";

/// An ordered set of entries plus session-wide settings.
#[derive(Debug, Clone)]
pub struct Playlist {
    pub name: String,
    /// File the playlist was loaded from, if any.
    pub path: Option<PathBuf>,
    pub entries: Vec<MediaEntry>,
    /// Applied to every entry, before the entry's own filters.
    pub filters: Vec<FilterInvocation>,
    pub output: Output,
    pub profile: PlaylistProfile,
    /// Shuffle entries once before playback.
    pub shuffle: bool,
    /// Start over when every entry has played.
    pub looping: bool,
    /// Reshuffle on every restart. Only has an effect with `looping`.
    pub loop_shuffle: bool,
}

impl Default for Playlist {
    fn default() -> Self {
        Self {
            name: DEFAULT_NAME.to_string(),
            path: None,
            entries: Vec::new(),
            filters: Vec::new(),
            output: Output::default(),
            profile: PlaylistProfile::default(),
            shuffle: false,
            looping: false,
            loop_shuffle: false,
        }
    }
}

impl Playlist {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    pub fn has_filters(&self) -> bool {
        !self.filters.is_empty()
    }

    /// Shuffle the entry order in place.
    pub fn shuffle_entries<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.entries.shuffle(rng);
    }

    /// Queue over a copy of the entries, using the playlist's loop flags.
    pub fn queue(&self) -> PlaylistQueue<MediaEntry> {
        PlaylistQueue::new(self.entries.iter().cloned(), self.looping, self.loop_shuffle)
    }
}
