//! Passthrough for arbitrary ffmpeg filters.

use super::options::{kwargs_to_filter_args, OptionReader};
use super::{mismatched_options, CustomFilterOptions, Filter, FilterContext, FilterOptions, TargetStream};
use crate::{Error, Result};
use ffstream_av::{FilterGraph, StreamHandle};

/// Applies any single-input ffmpeg filter by name, e.g.
/// `{ "filter": "volume", "stream": "audio", "args": { "volume": 0.5 } }`.
#[derive(Debug, Clone, Copy, Default)]
pub struct FfmpegFilter;

impl Filter for FfmpegFilter {
    fn name(&self) -> &'static str {
        "ffmpeg"
    }

    fn validate(&self, options: &serde_json::Value) -> Result<FilterOptions> {
        let reader = OptionReader::new(self.name(), options)?;

        let filter = reader.required_str("filter")?;
        let valid_name = !filter.is_empty()
            && filter
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_');
        if !valid_name {
            return Err(Error::validation(
                self.name(),
                "filter",
                format!("not a filter name: {:?}", filter),
            ));
        }

        Ok(FilterOptions::Custom(CustomFilterOptions {
            filter,
            stream: reader.target_stream("stream")?,
            args: reader.arg_map("args")?,
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
        let FilterOptions::Custom(options) = options else {
            return Err(mismatched_options(self.name()));
        };

        let args = kwargs_to_filter_args(&options.args);
        Ok(match options.stream {
            TargetStream::Video => (graph.filter(&video, &options.filter, args), audio),
            TargetStream::Audio => (video, graph.filter(&audio, &options.filter, args)),
        })
    }
}
