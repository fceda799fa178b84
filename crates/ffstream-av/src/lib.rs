//! # ffstream-av
//!
//! External tool layer for ffstream.
//!
//! This crate provides functionality for:
//! - Locating ffmpeg/ffprobe and probing media sources
//! - Argument profiles for the decode and encode stages
//! - Building filter graphs and ffmpeg command lines
//! - Supervising running ffmpeg processes and collecting their diagnostics
//! - Stream-copy remuxing of files in place
//!
//! ## Example
//!
//! ```no_run
//! use ffstream_av::{FfprobeProber, Prober};
//!
//! let info = FfprobeProber::default().probe("/path/to/video.mkv")?;
//! if let Some(video) = info.video_stream() {
//!     println!("{}x{}", video.width, video.height);
//! }
//! # Ok::<(), ffstream_av::Error>(())
//! ```

mod error;
pub mod args;
pub mod command;
pub mod graph;
pub mod probe;
pub mod process;
pub mod remux;
pub mod tools;
pub mod workspace;

// Re-exports
pub use args::{ArgMap, ArgumentProfile, ProfilePreset};
pub use command::FfmpegCommand;
pub use error::{Error, Result};
pub use graph::{FilterArgs, FilterGraph, StreamHandle, StreamKind};
pub use probe::{AudioStream, FfprobeProber, MediaInfo, Prober, VideoStream};
pub use process::{DiagnosticBuffer, ExitWatch, ProcessRole, TranscoderProcess};
pub use tools::{check_tool, require_tool, ToolInfo, ToolPaths};
pub use workspace::Workspace;
