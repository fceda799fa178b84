//! Name to filter lookup.

use super::{
    ContinuousTextFilter, FfmpegFilter, Filter, FilterInvocation, ImageOverlayFilter,
    IntervalTextFilter, VideoInfoFilter,
};
use crate::{Error, Result};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Filters known to the loader, by name.
#[derive(Clone, Default)]
pub struct FilterRegistry {
    filters: BTreeMap<&'static str, Arc<dyn Filter>>,
}

impl FilterRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every built-in filter.
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        registry.register(ContinuousTextFilter);
        registry.register(IntervalTextFilter);
        registry.register(ImageOverlayFilter);
        registry.register(VideoInfoFilter);
        registry.register(FfmpegFilter);
        registry
    }

    /// Add a filter, replacing any filter registered under the same name.
    pub fn register(&mut self, filter: impl Filter + 'static) {
        self.filters.insert(filter.name(), Arc::new(filter));
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Filter>> {
        self.filters.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.filters.contains_key(name)
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.filters.keys().copied()
    }

    /// Look up `name` and validate `options` against it.
    ///
    /// # Errors
    ///
    /// [`Error::Playlist`] for an unknown name, [`Error::Validation`] for
    /// invalid options.
    pub fn invocation(&self, name: &str, options: &serde_json::Value) -> Result<FilterInvocation> {
        let filter = self
            .get(name)
            .ok_or_else(|| Error::playlist(format!("unknown filter type: {}", name)))?;
        FilterInvocation::new(filter, options)
    }
}

impl std::fmt::Debug for FilterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.filters.keys()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_builtin_names() {
        let registry = FilterRegistry::with_builtin();
        let names: Vec<_> = registry.names().collect();
        assert_eq!(
            names,
            vec!["continuous_text", "ffmpeg", "image_overlay", "interval_text", "video_info"]
        );
    }

    #[test]
    fn test_unknown_filter() {
        let registry = FilterRegistry::with_builtin();
        let err = registry.invocation("sparkles", &json!({})).unwrap_err();
        assert!(matches!(err, Error::Playlist { .. }));
        assert!(!registry.contains("sparkles"));
    }

    #[test]
    fn test_invalid_options_surface_validation_error() {
        let registry = FilterRegistry::with_builtin();
        let err = registry.invocation("continuous_text", &json!({})).unwrap_err();
        assert!(matches!(err, Error::Validation { ref field, .. } if field == "text"));
    }

    #[test]
    fn test_empty_registry() {
        let registry = FilterRegistry::new();
        assert!(registry.get("continuous_text").is_none());
    }
}
