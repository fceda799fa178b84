//! FFprobe-based media probing.

use super::types::*;
use crate::{Error, Result};
use serde::Deserialize;
use std::path::Path;
use std::process::Command;

#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    #[serde(default)]
    format: Option<FfprobeFormat>,
    #[serde(default)]
    streams: Vec<FfprobeStream>,
}

#[derive(Debug, Deserialize)]
struct FfprobeFormat {
    format_name: Option<String>,
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    index: u32,
    codec_type: Option<String>,
    codec_name: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    channels: Option<u32>,
    sample_rate: Option<String>,
    start_time: Option<String>,
    duration: Option<String>,
    #[serde(default)]
    tags: FfprobeTags,
}

#[derive(Debug, Default, Deserialize)]
struct FfprobeTags {
    #[serde(rename = "DURATION")]
    duration: Option<String>,
}

impl FfprobeStream {
    fn start(&self) -> f64 {
        self.start_time
            .as_deref()
            .and_then(|s| s.parse().ok())
            .unwrap_or(0.0)
    }

    /// Explicit duration first, then the container tag timecode.
    fn duration(&self) -> Option<f64> {
        if let Some(d) = self.duration.as_deref().and_then(|s| s.parse().ok()) {
            return Some(d);
        }
        self.tags.duration.as_deref().and_then(parse_timecode)
    }
}

/// Probe a media source using the ffprobe binary at `ffprobe`.
pub fn probe_with_ffprobe(ffprobe: &Path, source: &str) -> Result<MediaInfo> {
    let output = Command::new(ffprobe)
        .args([
            "-v",
            "quiet",
            "-print_format",
            "json",
            "-show_format",
            "-show_streams",
        ])
        .arg(source)
        .output()
        .map_err(|e| Error::from_spawn("ffprobe", e))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(Error::probe(
            source,
            format!("ffprobe exited with {}: {}", output.status, stderr.trim()),
        ));
    }

    let json_str = String::from_utf8(output.stdout)
        .map_err(|e| Error::parse_error("ffprobe", format!("Invalid UTF-8: {}", e)))?;

    parse_ffprobe_json(source, &json_str)
}

/// Parse raw ffprobe JSON into a [`MediaInfo`].
///
/// Fails with [`Error::Probe`] when the source has no video or audio streams.
pub fn parse_ffprobe_json(source: &str, json: &str) -> Result<MediaInfo> {
    let output: FfprobeOutput = serde_json::from_str(json)?;
    parse_ffprobe_output(source, output)
}

fn parse_ffprobe_output(source: &str, output: FfprobeOutput) -> Result<MediaInfo> {
    let (container, duration) = match output.format {
        Some(format) => (
            format.format_name,
            format.duration.and_then(|s| s.parse::<f64>().ok()),
        ),
        None => (None, None),
    };

    let mut info = MediaInfo {
        source: source.to_string(),
        container,
        duration,
        video_streams: Vec::new(),
        audio_streams: Vec::new(),
    };

    for stream in output.streams {
        match stream.codec_type.as_deref() {
            Some("video") => {
                info.video_streams.push(VideoStream {
                    index: stream.index,
                    codec: stream.codec_name.clone().unwrap_or_default(),
                    width: stream.width.unwrap_or(0),
                    height: stream.height.unwrap_or(0),
                    start: stream.start(),
                    duration: stream.duration(),
                });
            }
            Some("audio") => {
                info.audio_streams.push(AudioStream {
                    index: stream.index,
                    codec: stream.codec_name.clone().unwrap_or_default(),
                    channels: stream.channels.unwrap_or(2),
                    sample_rate: stream.sample_rate.as_deref().and_then(|s| s.parse().ok()),
                    start: stream.start(),
                    duration: stream.duration(),
                });
            }
            _ => {}
        }
    }

    if info.stream_count() == 0 {
        return Err(Error::probe(source, "no video or audio streams"));
    }

    Ok(info)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MKV_JSON: &str = r#"{
        "streams": [
            {
                "index": 0,
                "codec_name": "vp9",
                "codec_type": "video",
                "width": 640,
                "height": 360,
                "start_time": "0.000000",
                "tags": { "DURATION": "0:01:05.250000000" }
            },
            {
                "index": 1,
                "codec_name": "opus",
                "codec_type": "audio",
                "channels": 2,
                "sample_rate": "48000",
                "start_time": "0.007000",
                "tags": { "DURATION": "0:01:05.241000000" }
            },
            {
                "index": 2,
                "codec_name": "subrip",
                "codec_type": "subtitle"
            }
        ],
        "format": {
            "format_name": "matroska,webm",
            "duration": "65.250000"
        }
    }"#;

    #[test]
    fn test_parse_tag_durations() {
        let info = parse_ffprobe_json("clip.webm", MKV_JSON).unwrap();

        assert_eq!(info.source, "clip.webm");
        assert_eq!(info.container.as_deref(), Some("matroska,webm"));
        assert_eq!(info.duration, Some(65.25));
        assert_eq!(info.video_streams.len(), 1);
        assert_eq!(info.audio_streams.len(), 1);

        let video = info.video_stream().unwrap();
        assert_eq!((video.width, video.height), (640, 360));
        assert_eq!(video.duration, Some(65.25));

        let audio = info.audio_stream().unwrap();
        assert_eq!(audio.start, 0.007);
        assert_eq!(audio.sample_rate, Some(48000));
    }

    #[test]
    fn test_explicit_duration_wins_over_tag() {
        let json = r#"{
            "streams": [{
                "index": 0,
                "codec_type": "video",
                "width": 1920,
                "height": 1080,
                "duration": "12.5",
                "tags": { "DURATION": "0:00:99.000" }
            }]
        }"#;
        let info = parse_ffprobe_json("a.mp4", json).unwrap();
        assert_eq!(info.video_stream().unwrap().duration, Some(12.5));
        assert!(info.audio_stream().is_none());
    }

    #[test]
    fn test_zero_streams_is_probe_error() {
        let json = r#"{ "streams": [], "format": { "format_name": "mp4" } }"#;
        let err = parse_ffprobe_json("empty.mp4", json).unwrap_err();
        assert!(matches!(err, Error::Probe { .. }));
    }

    #[test]
    fn test_missing_ffprobe_binary() {
        let err = probe_with_ffprobe(Path::new("nonexistent_ffprobe_12345"), "a.mp4").unwrap_err();
        assert!(matches!(err, Error::ToolNotFound { .. }));
    }
}
