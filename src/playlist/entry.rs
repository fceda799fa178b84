//! Playlist entries.

use crate::filter::FilterInvocation;
use ffstream_av::{ArgumentProfile, MediaInfo};

/// One playable unit bound to one media source.
///
/// Built by a loader from a probe result and not modified afterwards; the
/// `with_*` methods are for construction only.
#[derive(Debug, Clone)]
pub struct MediaEntry {
    source: String,
    start: f64,
    end: f64,
    duration: f64,
    title: Option<String>,
    author: Option<String>,
    filters: Vec<FilterInvocation>,
    decoder_profile: ArgumentProfile,
    media_info: MediaInfo,
}

impl MediaEntry {
    /// Build an entry from a probe result.
    ///
    /// `start` defaults to the first video stream's start; `end` and
    /// `duration` to its duration (0 when unknown).
    pub fn from_media_info(media_info: MediaInfo) -> Self {
        let (start, duration) = media_info
            .video_stream()
            .map(|v| (v.start, v.duration.unwrap_or(0.0)))
            .unwrap_or((0.0, 0.0));

        Self {
            source: media_info.source.clone(),
            start,
            end: duration,
            duration,
            title: None,
            author: None,
            filters: Vec::new(),
            decoder_profile: ArgumentProfile::default(),
            media_info,
        }
    }

    pub fn with_start(mut self, start: f64) -> Self {
        self.start = start;
        self
    }

    pub fn with_end(mut self, end: f64) -> Self {
        self.end = end;
        self
    }

    pub fn with_duration(mut self, duration: f64) -> Self {
        self.duration = duration;
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    pub fn with_filter(mut self, filter: FilterInvocation) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn with_decoder_profile(mut self, profile: ArgumentProfile) -> Self {
        self.decoder_profile = profile;
        self
    }

    /// Opaque source identifier handed to ffmpeg.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn start(&self) -> f64 {
        self.start
    }

    pub fn end(&self) -> f64 {
        self.end
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn author(&self) -> Option<&str> {
        self.author.as_deref()
    }

    pub fn filters(&self) -> &[FilterInvocation] {
        &self.filters
    }

    pub fn has_filters(&self) -> bool {
        !self.filters.is_empty()
    }

    /// Entry-level decoder profile; empty when the playlist or default applies.
    pub fn decoder_profile(&self) -> &ArgumentProfile {
        &self.decoder_profile
    }

    pub fn media_info(&self) -> &MediaInfo {
        &self.media_info
    }

    /// Seconds of output this entry produces.
    ///
    /// `end` when playback starts at 0, otherwise `end - start`.
    pub fn output_duration(&self) -> f64 {
        if self.start == 0.0 {
            self.end
        } else {
            self.end - self.start
        }
    }

    /// Whether the decoder must cut the source to `[start, end]`.
    pub fn needs_trim(&self) -> bool {
        self.start > 0.0 || self.end < self.duration
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ffstream_av::VideoStream;

    fn probed(duration: Option<f64>) -> MediaInfo {
        let mut info = MediaInfo::new("clip.mp4");
        info.video_streams.push(VideoStream {
            start: 0.0,
            duration,
            width: 1280,
            height: 720,
            ..Default::default()
        });
        info
    }

    #[test]
    fn test_defaults_from_probe() {
        let entry = MediaEntry::from_media_info(probed(Some(42.5)));
        assert_eq!(entry.source(), "clip.mp4");
        assert_eq!(entry.start(), 0.0);
        assert_eq!(entry.end(), 42.5);
        assert_eq!(entry.duration(), 42.5);
        assert!(!entry.needs_trim());

        let entry = MediaEntry::from_media_info(probed(None));
        assert_eq!(entry.duration(), 0.0);
    }

    #[test]
    fn test_output_duration() {
        let entry = MediaEntry::from_media_info(probed(Some(20.0)))
            .with_start(5.0)
            .with_end(15.0);
        assert_eq!(entry.output_duration(), 10.0);
        assert!(entry.needs_trim());

        let entry = MediaEntry::from_media_info(probed(Some(20.0))).with_end(20.0);
        assert_eq!(entry.output_duration(), 20.0);
    }

    #[test]
    fn test_trim_when_end_before_duration() {
        let entry = MediaEntry::from_media_info(probed(Some(20.0))).with_end(12.0);
        assert!(entry.needs_trim());
    }
}
