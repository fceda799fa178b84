//! Media information types.

use serde::{Deserialize, Serialize};

/// Probe result for one media source.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MediaInfo {
    /// Source identifier the probe was run against.
    pub source: String,
    /// Container format name as reported by the prober (e.g., "matroska,webm").
    pub container: Option<String>,
    /// Container-level duration in seconds.
    pub duration: Option<f64>,
    /// Video streams in source order.
    pub video_streams: Vec<VideoStream>,
    /// Audio streams in source order.
    pub audio_streams: Vec<AudioStream>,
}

/// Information about a video stream.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct VideoStream {
    /// Stream index within the container.
    pub index: u32,
    /// Video codec (e.g., "h264", "vp9").
    pub codec: String,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Start time in seconds.
    pub start: f64,
    /// Duration in seconds, when known.
    pub duration: Option<f64>,
}

/// Information about an audio stream.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AudioStream {
    /// Stream index within the container.
    pub index: u32,
    /// Audio codec (e.g., "aac", "opus").
    pub codec: String,
    /// Number of channels.
    pub channels: u32,
    /// Sample rate in Hz.
    pub sample_rate: Option<u32>,
    /// Start time in seconds.
    pub start: f64,
    /// Duration in seconds, when known.
    pub duration: Option<f64>,
}

impl MediaInfo {
    /// Create an empty description for a source.
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            ..Default::default()
        }
    }

    /// Get the primary (first) video stream.
    pub fn video_stream(&self) -> Option<&VideoStream> {
        self.video_streams.first()
    }

    /// Get the primary (first) audio stream.
    pub fn audio_stream(&self) -> Option<&AudioStream> {
        self.audio_streams.first()
    }

    /// Total number of video and audio streams.
    pub fn stream_count(&self) -> usize {
        self.video_streams.len() + self.audio_streams.len()
    }

    /// Whether the source carries both a video and an audio stream.
    pub fn has_video_and_audio(&self) -> bool {
        self.video_stream().is_some() && self.audio_stream().is_some()
    }
}

/// Parse a `H:MM:SS.fff` timecode (as found in Matroska `DURATION` tags) to seconds.
pub fn parse_timecode(value: &str) -> Option<f64> {
    let mut parts = value.trim().split(':');
    let hours: u64 = parts.next()?.parse().ok()?;
    let minutes: u64 = parts.next()?.parse().ok()?;
    let seconds: f64 = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }

    Some((hours * 3600 + minutes * 60) as f64 + seconds)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_timecode() {
        assert_eq!(parse_timecode("0:00:10.500000000"), Some(10.5));
        assert_eq!(parse_timecode("01:30:00.000"), Some(5400.0));
        assert_eq!(parse_timecode("1:02:03"), Some(3723.0));
        assert_eq!(parse_timecode("10.5"), None);
        assert_eq!(parse_timecode("1:2:3:4"), None);
        assert_eq!(parse_timecode("garbage"), None);
    }

    #[test]
    fn test_primary_streams() {
        let mut info = MediaInfo::new("a.mkv");
        assert!(info.video_stream().is_none());
        assert!(!info.has_video_and_audio());

        info.video_streams.push(VideoStream {
            width: 1280,
            height: 720,
            ..Default::default()
        });
        assert!(!info.has_video_and_audio());

        info.audio_streams.push(AudioStream::default());
        assert!(info.has_video_and_audio());
        assert_eq!(info.stream_count(), 2);
    }
}
