//! Image overlays.

use super::options::{kwargs_to_filter_args, OptionReader};
use super::{mismatched_options, Filter, FilterContext, FilterOptions, ImageOverlayOptions};
use crate::Result;
use ffstream_av::{FilterGraph, StreamHandle};

/// Overlays an image (or an animated image) on the video.
///
/// The image becomes an extra decoder input.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageOverlayFilter;

impl Filter for ImageOverlayFilter {
    fn name(&self) -> &'static str {
        "image_overlay"
    }

    fn validate(&self, options: &serde_json::Value) -> Result<FilterOptions> {
        let reader = OptionReader::new(self.name(), options)?;
        Ok(FilterOptions::ImageOverlay(ImageOverlayOptions {
            image: reader.required_str("image")?,
            animated: reader.bool_or("animated", false)?,
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
        let FilterOptions::ImageOverlay(options) = options else {
            return Err(mismatched_options(self.name()));
        };

        let index = graph.add_input(options.image.clone());
        let image = graph.input_video(index);

        let mut args = kwargs_to_filter_args(&options.kwargs);
        if options.animated {
            // end with the shorter of the two instead of freezing the last frame
            args.set("shortest", 1);
        }

        let video = graph.overlay(&video, &image, args);
        Ok((video, audio))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::playlist::{MediaEntry, Playlist};
    use crate::Error;
    use ffstream_av::MediaInfo;
    use serde_json::json;

    fn apply(options: &FilterOptions) -> FilterGraph {
        let playlist = Playlist::default();
        let entry = MediaEntry::from_media_info(MediaInfo::new("a.mp4"));
        let ctx = FilterContext {
            playlist: &playlist,
            entry: &entry,
        };
        let mut graph = FilterGraph::new();
        let v = graph.input_video(0);
        let a = graph.input_audio(0);
        ImageOverlayFilter.apply(&ctx, &mut graph, v, a, options).unwrap();
        graph
    }

    #[test]
    fn test_static_overlay() {
        let options = ImageOverlayFilter
            .validate(&json!({ "image": "logo.png", "kwargs": { "x": "W-w-10", "y": 10 } }))
            .unwrap();
        let graph = apply(&options);

        assert_eq!(graph.extra_inputs(), &["logo.png".to_string()]);
        assert_eq!(
            graph.render(),
            "[0:v][1:v]overlay=x=W-w-10:y=10:eof_action=repeat[s0]"
        );
    }

    #[test]
    fn test_animated_overlay_is_shortest() {
        let options = ImageOverlayFilter
            .validate(&json!({ "image": "spin.gif", "animated": true }))
            .unwrap();
        let graph = apply(&options);
        assert_eq!(
            graph.render(),
            "[0:v][1:v]overlay=shortest=1:eof_action=repeat[s0]"
        );
    }

    #[test]
    fn test_image_required() {
        let err = ImageOverlayFilter.validate(&json!({ "animated": true })).unwrap_err();
        assert!(matches!(err, Error::Validation { ref field, .. } if field == "image"));

        let err = ImageOverlayFilter
            .validate(&json!({ "image": "a.png", "animated": "yes" }))
            .unwrap_err();
        assert!(matches!(err, Error::Validation { ref field, .. } if field == "animated"));
    }
}
