use super::Command;
use crate::context::AppContext;
use crate::loader::{JsonPlaylistLoader, PlaylistLoader};
use crate::stream::{SessionOutcome, StreamSession};
use anyhow::{Context, Result};
use std::path::PathBuf;

/// Load a JSON playlist and stream it.
#[derive(Debug, Clone)]
pub struct StreamCommand {
    pub playlist: PathBuf,
    /// Only load and validate the playlist.
    pub check_playlist: bool,
}

impl Command for StreamCommand {
    fn name(&self) -> &'static str {
        "stream"
    }

    fn run(&self, ctx: &AppContext) -> Result<()> {
        let loader = JsonPlaylistLoader::new(ctx.prober(), &ctx.filters);
        let mut playlist = loader
            .load(&self.playlist)
            .with_context(|| format!("Failed to load playlist {:?}", self.playlist))?;

        if playlist.entries.is_empty() {
            anyhow::bail!("Nothing in playlist {:?}", self.playlist);
        }

        tracing::info!(
            "Loaded playlist {:?}: {} [{} entries]",
            self.playlist,
            playlist.name,
            playlist.entry_count()
        );

        if playlist.shuffle {
            tracing::info!("Shuffling playlist");
            playlist.shuffle_entries(&mut rand::thread_rng());
        }

        for (i, entry) in playlist.entries.iter().enumerate() {
            tracing::debug!(
                "\t{}) {} [{} - {} | {}]",
                i + 1,
                entry.source(),
                entry.start(),
                entry.end(),
                entry.duration()
            );
        }

        if self.check_playlist {
            println!("✓ Playlist is valid");
            println!("  Name: {}", playlist.name);
            println!("  Entries: {}", playlist.entry_count());
            println!("  Filters: {}", playlist.filters.len());
            println!("  Output: {} ({})", playlist.output.destination, playlist.output.resolution);
            return Ok(());
        }

        let tools = ctx.tools()?;
        let options = ctx.config.stream_options(tools.ffmpeg);

        let rt = tokio::runtime::Runtime::new()?;
        let report = rt.block_on(async {
            let mut session = StreamSession::new(&playlist, options);
            let stop = session.cancellation_token();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    tracing::info!("Interrupted, stopping session");
                    stop.cancel();
                }
            });
            session.run().await
        })?;

        match report.outcome {
            SessionOutcome::Completed => println!("Playlist finished"),
            SessionOutcome::Stopped => println!("Stopped"),
        }
        println!(
            "  Played: {}, skipped: {}, failed: {}",
            report.played, report.skipped, report.failed
        );

        Ok(())
    }
}
