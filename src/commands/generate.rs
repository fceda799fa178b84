use super::Command;
use crate::context::AppContext;
use crate::loader::{write_playlist, DirectoryPlaylistLoader, PlaylistLoader};
use anyhow::{Context, Result};
use std::path::PathBuf;

/// Scan a directory and write a playlist with one entry per media file.
#[derive(Debug, Clone)]
pub struct GenerateCommand {
    pub directory: PathBuf,
    pub output: PathBuf,
    pub recursive: bool,
    /// Overwrite an existing output file.
    pub force: bool,
    pub shuffle: bool,
    /// Extensions to consider; the configured list when `None`.
    pub types: Option<Vec<String>>,
}

impl Command for GenerateCommand {
    fn name(&self) -> &'static str {
        "generate"
    }

    fn run(&self, ctx: &AppContext) -> Result<()> {
        if !self.directory.is_dir() {
            anyhow::bail!("Not a directory: {:?}", self.directory);
        }

        let options = ctx.config.scan_options(self.types.clone(), self.recursive);
        let loader = DirectoryPlaylistLoader::new(ctx.prober(), options);
        let mut playlist = loader
            .load(&self.directory)
            .with_context(|| format!("Failed to scan {:?}", self.directory))?;

        if self.shuffle {
            tracing::info!("Shuffling playlist entries");
            playlist.shuffle_entries(&mut rand::thread_rng());
        }
        playlist.shuffle = self.shuffle;

        write_playlist(&playlist, &self.output, self.force)
            .with_context(|| format!("Failed to write playlist {:?}", self.output))?;

        println!(
            "Wrote playlist with {} entries to {}",
            playlist.entry_count(),
            self.output.display()
        );
        Ok(())
    }
}
