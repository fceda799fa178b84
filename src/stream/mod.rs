//! Streaming orchestration.
//!
//! A [`StreamSession`] starts one long-lived encoder, then for every entry the
//! queue hands out spawns a decoder bound to that entry's filter graph and
//! relays its output into the encoder's stdin. Entries are played strictly one
//! after another.
//!
//! State flow:
//!
//! ```text
//! Idle -> EncoderStarting -> Streaming <-> EntryDecoding
//!                                |
//!                                v
//!                            Draining -> Terminated
//! ```

mod decode;
mod session;

pub use decode::DecodePlan;
pub use session::StreamSession;

use ffstream_av::tools::FFMPEG;
use ffstream_av::ProfilePreset;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Default relay chunk size in bytes.
pub const DEFAULT_CHUNK_SIZE: usize = 16 * 1024;

/// Default time the encoder gets to exit after its input closes.
pub const DEFAULT_SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// Where a session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    EncoderStarting,
    /// Encoder running, between entries.
    Streaming,
    /// A decoder is running and its output is being relayed.
    EntryDecoding,
    Draining,
    Terminated,
}

/// Why a session ended without error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOutcome {
    /// The queue ran out of entries.
    Completed,
    /// Stop was requested through the cancellation token.
    Stopped,
}

impl fmt::Display for SessionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionOutcome::Completed => f.write_str("completed"),
            SessionOutcome::Stopped => f.write_str("stopped"),
        }
    }
}

/// Result of trying to play one entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryOutcome {
    /// Decoded and relayed to the end.
    Played,
    /// Not playable (e.g. missing audio); nothing was spawned.
    Skipped,
    /// The decoder could not be started or exited unsuccessfully.
    Failed,
    /// Cut short by a stop request.
    Interrupted,
}

/// Summary returned by a session that ended without error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionReport {
    pub outcome: SessionOutcome,
    pub played: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl SessionReport {
    pub fn new(outcome: SessionOutcome) -> Self {
        Self {
            outcome,
            played: 0,
            skipped: 0,
            failed: 0,
        }
    }
}

/// Session settings taken from the application config.
#[derive(Debug, Clone)]
pub struct StreamOptions {
    /// ffmpeg executable used for both stages.
    pub ffmpeg: PathBuf,
    /// Bytes relayed per read.
    pub chunk_size: usize,
    /// Built-in profiles used when the playlist sets none.
    pub preset: ProfilePreset,
    /// How long the encoder may take to exit once its input is closed.
    pub shutdown_grace: Duration,
}

impl Default for StreamOptions {
    fn default() -> Self {
        Self {
            ffmpeg: PathBuf::from(FFMPEG),
            chunk_size: DEFAULT_CHUNK_SIZE,
            preset: ProfilePreset::default(),
            shutdown_grace: DEFAULT_SHUTDOWN_GRACE,
        }
    }
}
