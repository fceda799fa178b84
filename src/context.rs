//! Shared application state handed to every command.

use crate::config::Config;
use crate::filter::FilterRegistry;
use anyhow::{Context, Result};
use ffstream_av::tools::FFPROBE;
use ffstream_av::{FfprobeProber, Prober, ToolPaths};

/// Configuration, filter registry and prober, built once in `main`.
pub struct AppContext {
    pub config: Config,
    pub filters: FilterRegistry,
    prober: Box<dyn Prober>,
}

impl AppContext {
    /// Context with every built-in filter and an ffprobe-backed prober.
    pub fn new(config: Config) -> Self {
        let ffprobe = config
            .tools
            .ffprobe_path
            .clone()
            .unwrap_or_else(|| FFPROBE.into());

        Self {
            filters: FilterRegistry::with_builtin(),
            prober: Box::new(FfprobeProber::new(ffprobe)),
            config,
        }
    }

    pub fn prober(&self) -> &dyn Prober {
        self.prober.as_ref()
    }

    /// Locate ffmpeg and ffprobe, failing if either is missing.
    pub fn tools(&self) -> Result<ToolPaths> {
        ToolPaths::resolve(
            self.config.tools.ffmpeg_path.as_deref(),
            self.config.tools.ffprobe_path.as_deref(),
        )
        .context("Required tools are missing (run `ffstream check-tools`)")
    }
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext")
            .field("config", &self.config)
            .field("filters", &self.filters)
            .field("prober", &self.prober.name())
            .finish()
    }
}
