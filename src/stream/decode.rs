//! Per-entry decode graph and command.

use crate::filter::{apply_chain, FilterContext};
use crate::playlist::{MediaEntry, Playlist};
use crate::Result;
use ffstream_av::{ArgumentProfile, FfmpegCommand, FilterArgs, FilterGraph, StreamHandle};
use std::path::Path;

/// Filter graph for one entry plus the handles to map out of it.
#[derive(Debug, Clone)]
pub struct DecodePlan {
    pub graph: FilterGraph,
    pub video: StreamHandle,
    pub audio: StreamHandle,
}

impl DecodePlan {
    /// Build the graph: optional trim, scaling to the output resolution,
    /// padding of narrower sources, then the playlist and entry filters.
    pub fn build(playlist: &Playlist, entry: &MediaEntry) -> Result<Self> {
        let mut graph = FilterGraph::new();
        let mut video = graph.input_video(0);
        let mut audio = graph.input_audio(0);

        if entry.needs_trim() {
            let (start, end) = (entry.start(), entry.end());

            video = graph.filter(&video, "trim", FilterArgs::new().kw("start", start).kw("end", end));
            video = graph.filter(&video, "setpts", FilterArgs::new().arg("PTS-STARTPTS"));
            audio = graph.filter(&audio, "atrim", FilterArgs::new().kw("start", start).kw("end", end));
            audio = graph.filter(&audio, "asetpts", FilterArgs::new().arg("PTS-STARTPTS"));

            (video, audio) = graph.concat(&video, &audio);
        }

        let target = playlist.output.resolution;
        video = graph.filter(
            &video,
            "scale",
            FilterArgs::new()
                .arg(target.width)
                .arg(target.height)
                .kw("force_original_aspect_ratio", 1),
        );

        let source_width = entry.media_info().video_stream().map(|v| v.width).unwrap_or(0);
        if source_width < target.width {
            video = graph.filter(
                &video,
                "pad",
                FilterArgs::new()
                    .arg(target.width)
                    .arg(target.height)
                    .arg("(ow-iw)/2")
                    .arg("(oh-ih)/2"),
            );
        }

        let ctx = FilterContext { playlist, entry };
        let (video, audio) = apply_chain(&ctx, &mut graph, video, audio)?;

        Ok(Self { graph, video, audio })
    }

    /// Decoder command reading `entry` and writing to stdout.
    pub fn command(&self, ffmpeg: &Path, profile: &ArgumentProfile, entry: &MediaEntry) -> FfmpegCommand {
        FfmpegCommand::decoder(ffmpeg, profile, entry.source(), &self.graph, &self.video, &self.audio)
    }
}
