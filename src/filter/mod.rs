//! Filters that transform an entry's decode graph.
//!
//! A [`Filter`] validates its raw options once when a playlist is loaded and
//! later adds nodes to the entry's [`FilterGraph`]. Filters are looked up by
//! name in a [`FilterRegistry`]; a validated request to run one is a
//! [`FilterInvocation`].

mod custom;
mod options;
mod overlay;
mod registry;
mod text;
mod video_info;
mod window;

pub use custom::FfmpegFilter;
pub use options::{
    Coordinate, CustomFilterOptions, FilterOptions, ImageOverlayOptions, IntervalTextOptions,
    Position, TargetStream, TextOptions, VideoInfoOptions,
};
pub use overlay::ImageOverlayFilter;
pub use registry::FilterRegistry;
pub use text::{ContinuousTextFilter, IntervalTextFilter};
pub use video_info::VideoInfoFilter;
pub use window::OverlayWindow;

use crate::playlist::{MediaEntry, Playlist};
use crate::{Error, Result};
use ffstream_av::{FilterGraph, StreamHandle};
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use std::fmt;
use std::sync::Arc;

/// What a filter may look at while building an entry's graph.
#[derive(Debug, Clone, Copy)]
pub struct FilterContext<'a> {
    pub playlist: &'a Playlist,
    pub entry: &'a MediaEntry,
}

/// A named transformation of the decode graph.
pub trait Filter: Send + Sync {
    /// Name used as the `type` of a persisted filter invocation.
    fn name(&self) -> &'static str;

    /// Check raw options and turn them into typed options, filling defaults.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] naming the offending field.
    fn validate(&self, options: &serde_json::Value) -> Result<FilterOptions>;

    /// Add this filter's nodes to `graph` and return the new stream handles.
    ///
    /// Only ever called with options produced by this filter's
    /// [`validate`](Filter::validate).
    fn apply(
        &self,
        ctx: &FilterContext<'_>,
        graph: &mut FilterGraph,
        video: StreamHandle,
        audio: StreamHandle,
        options: &FilterOptions,
    ) -> Result<(StreamHandle, StreamHandle)>;
}

/// A validated request to run one filter.
#[derive(Clone)]
pub struct FilterInvocation {
    filter: Arc<dyn Filter>,
    options: FilterOptions,
}

impl FilterInvocation {
    /// Validate `options` against `filter`.
    pub fn new(filter: Arc<dyn Filter>, options: &serde_json::Value) -> Result<Self> {
        let options = filter.validate(options)?;
        Ok(Self { filter, options })
    }

    pub fn name(&self) -> &'static str {
        self.filter.name()
    }

    pub fn options(&self) -> &FilterOptions {
        &self.options
    }

    pub fn apply(
        &self,
        ctx: &FilterContext<'_>,
        graph: &mut FilterGraph,
        video: StreamHandle,
        audio: StreamHandle,
    ) -> Result<(StreamHandle, StreamHandle)> {
        self.filter.apply(ctx, graph, video, audio, &self.options)
    }
}

impl fmt::Debug for FilterInvocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterInvocation")
            .field("name", &self.name())
            .field("options", &self.options)
            .finish()
    }
}

impl Serialize for FilterInvocation {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("FilterInvocation", 2)?;
        state.serialize_field("type", self.name())?;
        state.serialize_field("options", &self.options)?;
        state.end()
    }
}

/// Run the playlist's filters, then the entry's, each seeing the previous output.
pub fn apply_chain(
    ctx: &FilterContext<'_>,
    graph: &mut FilterGraph,
    mut video: StreamHandle,
    mut audio: StreamHandle,
) -> Result<(StreamHandle, StreamHandle)> {
    for invocation in ctx.playlist.filters.iter().chain(ctx.entry.filters()) {
        tracing::trace!("Applying filter {} to {}", invocation.name(), ctx.entry.source());
        (video, audio) = invocation.apply(ctx, graph, video, audio)?;
    }
    Ok((video, audio))
}

/// Error for options of the wrong variant reaching a filter.
pub(crate) fn mismatched_options(filter: &str) -> Error {
    Error::validation(filter, "options", "options were not produced by this filter")
}
