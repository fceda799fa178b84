use super::Command;
use crate::context::AppContext;
use crate::loader::{DirectoryPlaylistLoader, PlaylistLoader};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Repair media files whose container reports no duration.
///
/// Only webm files are rewritten (stream copy, in place); other containers
/// are reported.
#[derive(Debug, Clone)]
pub struct FixMetaCommand {
    pub directory: PathBuf,
    pub recursive: bool,
    pub types: Option<Vec<String>>,
}

impl Command for FixMetaCommand {
    fn name(&self) -> &'static str {
        "fix-meta"
    }

    fn run(&self, ctx: &AppContext) -> Result<()> {
        if !self.directory.is_dir() {
            anyhow::bail!("Not a directory: {:?}", self.directory);
        }

        let options = ctx.config.scan_options(self.types.clone(), self.recursive);
        let playlist = DirectoryPlaylistLoader::new(ctx.prober(), options)
            .load(&self.directory)
            .with_context(|| format!("Failed to scan {:?}", self.directory))?;

        let broken: Vec<_> = playlist
            .entries
            .iter()
            .filter(|e| e.media_info().video_stream().is_some() && e.duration() == 0.0)
            .collect();

        if broken.is_empty() {
            println!("No files with missing duration found");
            return Ok(());
        }

        let tools = ctx.tools()?;
        let mut fixed = 0;
        let mut failed = 0;

        for entry in broken {
            let path = Path::new(entry.source());
            let is_webm = path
                .extension()
                .map(|ext| ext.eq_ignore_ascii_case("webm"))
                .unwrap_or(false);

            if !is_webm {
                tracing::error!("No copy routine implemented for {}", entry.source());
                failed += 1;
                continue;
            }

            tracing::info!("Processing {}", entry.source());
            match ffstream_av::remux::remux_in_place(&tools.ffmpeg, path) {
                Ok(()) => {
                    println!("✓ {}", entry.source());
                    fixed += 1;
                }
                Err(e) => {
                    println!("✗ {}: {}", entry.source(), e);
                    failed += 1;
                }
            }
        }

        println!("\nFixed {} file(s), {} failed", fixed, failed);
        if failed > 0 {
            anyhow::bail!("{} file(s) could not be fixed", failed);
        }
        Ok(())
    }
}
