//! Text overlays.

use super::options::{kwargs_to_filter_args, OptionReader};
use super::{mismatched_options, Filter, FilterContext, FilterOptions, IntervalTextOptions, OverlayWindow, TextOptions};
use crate::Result;
use ffstream_av::{FilterGraph, StreamHandle};

/// Default divisor applied when an interval exceeds the entry length.
pub(crate) const DEFAULT_FALLBACK_DIVISOR: i64 = 2;

/// Draws `text` over the whole entry.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContinuousTextFilter;

impl Filter for ContinuousTextFilter {
    fn name(&self) -> &'static str {
        "continuous_text"
    }

    fn validate(&self, options: &serde_json::Value) -> Result<FilterOptions> {
        let reader = OptionReader::new(self.name(), options)?;
        Ok(FilterOptions::ContinuousText(TextOptions {
            text: reader.required_str("text")?,
            kwargs: reader.kwargs()?,
        }))
    }

    fn apply(
        &self,
        _ctx: &FilterContext<'_>,
        graph: &mut FilterGraph,
        video: StreamHandle,
        audio: StreamHandle,
        options: &FilterOptions,
    ) -> Result<(StreamHandle, StreamHandle)> {
        let FilterOptions::ContinuousText(options) = options else {
            return Err(mismatched_options(self.name()));
        };

        let video = graph.drawtext(&video, &options.text, kwargs_to_filter_args(&options.kwargs));
        Ok((video, audio))
    }
}

/// Draws `text` for `duration` seconds at the start and then once every `interval`.
#[derive(Debug, Clone, Copy, Default)]
pub struct IntervalTextFilter;

impl Filter for IntervalTextFilter {
    fn name(&self) -> &'static str {
        "interval_text"
    }

    fn validate(&self, options: &serde_json::Value) -> Result<FilterOptions> {
        let reader = OptionReader::new(self.name(), options)?;
        Ok(FilterOptions::IntervalText(IntervalTextOptions {
            text: reader.required_str("text")?,
            duration: reader.required_seconds("duration")?,
            interval: reader.required_seconds("interval")?,
            fallback_divisor: reader.int_or("fallback_divisor", DEFAULT_FALLBACK_DIVISOR)?,
            kwargs: reader.kwargs()?,
        }))
    }

    fn apply(
        &self,
        ctx: &FilterContext<'_>,
        graph: &mut FilterGraph,
        video: StreamHandle,
        audio: StreamHandle,
        options: &FilterOptions,
    ) -> Result<(StreamHandle, StreamHandle)> {
        let FilterOptions::IntervalText(options) = options else {
            return Err(mismatched_options(self.name()));
        };

        let window = OverlayWindow::new(
            options.duration,
            options.interval,
            ctx.entry.output_duration(),
            options.fallback_divisor,
        );

        let mut args = kwargs_to_filter_args(&options.kwargs);
        args.set("enable", window.enable_expression());

        let video = graph.drawtext(&video, &options.text, args);
        Ok((video, audio))
    }
}
