//! Shared fixtures for integration tests.
//!
//! Provides [`FakeProber`], which answers probes from a fixed table instead
//! of running ffprobe, and on unix a stand-in `ffmpeg` script that copies
//! bytes the way a real decoder/encoder pair would.

#![allow(dead_code)]

use ffstream::playlist::{MediaEntry, Output, Playlist, Resolution};
use ffstream_av::{AudioStream, MediaInfo, Prober, VideoStream};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Media description used by [`FakeProber`] and [`media`].
#[derive(Debug, Clone, Copy)]
pub struct Shape {
    pub width: u32,
    pub height: u32,
    pub duration: f64,
    pub audio: bool,
}

impl Default for Shape {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            duration: 60.0,
            audio: true,
        }
    }
}

/// Probe result for `source` with the given shape.
pub fn media(source: &str, shape: Shape) -> MediaInfo {
    let mut info = MediaInfo::new(source);
    info.duration = Some(shape.duration);
    info.video_streams.push(VideoStream {
        codec: "h264".into(),
        width: shape.width,
        height: shape.height,
        duration: Some(shape.duration),
        ..Default::default()
    });
    if shape.audio {
        info.audio_streams.push(AudioStream {
            index: 1,
            codec: "aac".into(),
            channels: 2,
            duration: Some(shape.duration),
            ..Default::default()
        });
    }
    info
}

/// Prober answering from a table; unknown sources get the default shape,
/// sources containing "corrupt" fail.
#[derive(Debug, Default)]
pub struct FakeProber {
    shapes: HashMap<String, Shape>,
}

impl FakeProber {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, source: impl Into<String>, shape: Shape) -> Self {
        self.shapes.insert(source.into(), shape);
        self
    }
}

impl Prober for FakeProber {
    fn name(&self) -> &'static str {
        "fake"
    }

    fn probe(&self, source: &str) -> ffstream_av::Result<MediaInfo> {
        if source.contains("corrupt") {
            return Err(ffstream_av::Error::probe(source, "invalid data found"));
        }
        let shape = self.shapes.get(source).copied().unwrap_or_default();
        Ok(media(source, shape))
    }
}

/// Playlist writing to `destination` at 1280x720 with the given entries.
pub fn playlist(destination: &str, entries: Vec<MediaEntry>) -> Playlist {
    let mut playlist = Playlist::new("Test Channel");
    playlist.output = Output::new(destination, Resolution::new(1280, 720));
    playlist.entries = entries;
    playlist
}

/// Entry for a file on disk with the default shape.
pub fn entry_for(path: &Path) -> MediaEntry {
    MediaEntry::from_media_info(media(&path.to_string_lossy(), Shape::default()))
}

/// Stand-in for ffmpeg.
///
/// Looks at the first `-i` argument: `pipe:` makes it an encoder that
/// writes stdin to the last argument, anything else a decoder that writes
/// the named file to stdout. An encoder whose destination ends in
/// `.fail` exits immediately with status 3, one ending in `.dies` after a
/// second. A decoder whose input ends in `.stall` never writes anything.
#[cfg(unix)]
pub const FAKE_FFMPEG: &str = r#"#!/bin/sh
src=""
prev=""
last=""
for arg in "$@"; do
    if [ -z "$src" ] && [ "$prev" = "-i" ]; then
        src="$arg"
    fi
    prev="$arg"
    last="$arg"
done

if [ "$src" = "pipe:" ]; then
    case "$last" in
        *.fail) echo "Connection refused" >&2; exit 3 ;;
        *.dies) sleep 1; echo "Connection reset by peer" >&2; exit 3 ;;
    esac
    exec cat > "$last"
fi

case "$src" in
    *.stall) exec sleep 30 ;;
esac
exec cat "$src"
"#;

/// Write [`FAKE_FFMPEG`] into `dir` and return its path.
#[cfg(unix)]
pub fn install_fake_ffmpeg(dir: &Path) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join("ffmpeg");
    std::fs::write(&path, FAKE_FFMPEG).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}
