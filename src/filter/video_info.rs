//! "Now playing" overlay built from entry metadata.

use super::options::{kwargs_to_filter_args, OptionReader};
use super::text::DEFAULT_FALLBACK_DIVISOR;
use super::{mismatched_options, Filter, FilterContext, FilterOptions, OverlayWindow, Position, VideoInfoOptions};
use crate::Result;
use ffstream_av::{FilterGraph, StreamHandle};

/// Shows the entry's title and author on a timed window.
///
/// Each line is skipped when the entry has no text for it.
#[derive(Debug, Clone, Copy, Default)]
pub struct VideoInfoFilter;

impl Filter for VideoInfoFilter {
    fn name(&self) -> &'static str {
        "video_info"
    }

    fn validate(&self, options: &serde_json::Value) -> Result<FilterOptions> {
        let reader = OptionReader::new(self.name(), options)?;
        Ok(FilterOptions::VideoInfo(VideoInfoOptions {
            duration: reader.required_seconds("duration")?,
            interval: reader.required_seconds("interval")?,
            fallback_divisor: reader.int_or("fallback_divisor", DEFAULT_FALLBACK_DIVISOR)?,
            title_position: reader.position_or("title_position", Position::new(0, 0))?,
            author_position: reader.position_or("author_position", Position::new(0, 80))?,
            kwargs: reader.kwargs()?,
        }))
    }

    fn apply(
        &self,
        ctx: &FilterContext<'_>,
        graph: &mut FilterGraph,
        mut video: StreamHandle,
        audio: StreamHandle,
        options: &FilterOptions,
    ) -> Result<(StreamHandle, StreamHandle)> {
        let FilterOptions::VideoInfo(options) = options else {
            return Err(mismatched_options(self.name()));
        };

        let window = OverlayWindow::new(
            options.duration,
            options.interval,
            ctx.entry.output_duration(),
            options.fallback_divisor,
        );

        let lines = [
            (
                non_empty(ctx.entry.title()).map(|t| format!("Currently Watching: {}", t)),
                &options.title_position,
            ),
            (
                non_empty(ctx.entry.author()).map(|a| format!("By: {}", a)),
                &options.author_position,
            ),
        ];

        for (text, position) in lines {
            let Some(text) = text else {
                continue;
            };

            let mut args = kwargs_to_filter_args(&options.kwargs);
            args.set("enable", window.enable_expression());
            args.set("x", &position.x);
            args.set("y", &position.y);

            video = graph.drawtext(&video, &text, args);
        }

        Ok((video, audio))
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
