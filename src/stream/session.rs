//! The decoder/encoder relay loop.

use super::decode::DecodePlan;
use super::{EntryOutcome, SessionOutcome, SessionReport, SessionState, StreamOptions};
use crate::playlist::{MediaEntry, Playlist, PlaylistQueue};
use crate::{profile, Error, Result};
use ffstream_av::{FfmpegCommand, TranscoderProcess};
use std::process::ExitStatus;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// How a relay ended.
enum RelayEnd {
    /// Decoder closed its stdout after `bytes` bytes.
    Eof { bytes: u64 },
    /// Stop was requested mid-entry.
    Cancelled,
    /// Writing to the encoder failed.
    EncoderGone(std::io::Error),
    /// The encoder exited while the relay was waiting on either side.
    EncoderExited(ExitStatus),
    /// Reading from the decoder failed.
    ReadFailed(std::io::Error),
}

/// One streaming session: a single encoder fed by one decoder per entry.
///
/// ```no_run
/// # async fn run(playlist: ffstream::playlist::Playlist) -> ffstream::Result<()> {
/// use ffstream::stream::{StreamOptions, StreamSession};
///
/// let mut session = StreamSession::new(&playlist, StreamOptions::default());
/// let stop = session.cancellation_token();
/// tokio::spawn(async move {
///     let _ = tokio::signal::ctrl_c().await;
///     stop.cancel();
/// });
/// let report = session.run().await?;
/// println!("played {} entries", report.played);
/// # Ok(())
/// # }
/// ```
pub struct StreamSession<'a> {
    playlist: &'a Playlist,
    options: StreamOptions,
    cancel: CancellationToken,
    state: watch::Sender<SessionState>,
}

impl<'a> StreamSession<'a> {
    pub fn new(playlist: &'a Playlist, options: StreamOptions) -> Self {
        let (state, _) = watch::channel(SessionState::Idle);
        Self {
            playlist,
            options,
            cancel: CancellationToken::new(),
            state,
        }
    }

    /// Use an externally owned stop token.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Token that stops the session when cancelled.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn state(&self) -> SessionState {
        *self.state.borrow()
    }

    /// Receiver observing every state change.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    fn transition(&self, next: SessionState) {
        let previous = self.state.send_replace(next);
        if previous != next {
            debug!("Session state {:?} -> {:?}", previous, next);
        }
    }

    /// Play the playlist's entries through a fresh queue.
    pub async fn run(&mut self) -> Result<SessionReport> {
        let mut queue = self.playlist.queue();
        self.run_queue(&mut queue).await
    }

    /// Play entries pulled from `queue` until it runs dry, the session is
    /// stopped, or the encoder dies.
    ///
    /// # Errors
    ///
    /// [`Error::EncoderFailure`] when the encoder exits or stops accepting
    /// data; spawn errors when the encoder cannot be started.
    pub async fn run_queue(&mut self, queue: &mut PlaylistQueue<MediaEntry>) -> Result<SessionReport> {
        self.transition(SessionState::EncoderStarting);
        let mut encoder = match self.start_encoder() {
            Ok(encoder) => encoder,
            Err(e) => {
                self.transition(SessionState::Terminated);
                return Err(e);
            }
        };

        self.transition(SessionState::Streaming);
        let result = self.stream_entries(queue, &mut encoder).await;

        self.transition(SessionState::Draining);
        match encoder.finish(self.options.shutdown_grace).await {
            Ok(status) => debug!("Encoder exited with {}", status),
            Err(e) => warn!("Failed to reap encoder: {}", e),
        }
        if let Some(text) = encoder.take_diagnostics() {
            debug!("Encoder: {}", text);
        }
        self.transition(SessionState::Terminated);

        if let Ok(report) = &result {
            info!(
                "Session {}: {} played, {} skipped, {} failed",
                report.outcome, report.played, report.skipped, report.failed
            );
        }
        result
    }

    fn start_encoder(&self) -> Result<TranscoderProcess> {
        let resolved = profile::resolve_encoder(self.playlist, self.options.preset);
        let profile = profile::inject_metadata(resolved, &self.playlist.name);

        debug!("Encoder global args: {:?}", profile.global);
        debug!("Encoder input args: {:?}", profile.input);
        debug!("Encoder output args: {:?}", profile.output);

        let command = FfmpegCommand::encoder(
            &self.options.ffmpeg,
            &profile,
            &self.playlist.output.destination,
        );
        let encoder = TranscoderProcess::spawn_encoder(&command)?;
        info!(
            "Encoder started for {} ({})",
            self.playlist.output.destination, self.playlist.output.resolution
        );
        Ok(encoder)
    }

    async fn stream_entries(
        &self,
        queue: &mut PlaylistQueue<MediaEntry>,
        encoder: &mut TranscoderProcess,
    ) -> Result<SessionReport> {
        let mut report = SessionReport::new(SessionOutcome::Completed);
        // entries in a row that produced nothing; stops a looping playlist
        // of unplayable entries from spinning forever
        let mut unplayable = 0usize;

        loop {
            log_encoder_diagnostics(encoder);

            if self.cancel.is_cancelled() {
                report.outcome = SessionOutcome::Stopped;
                break;
            }

            if let Some(status) = encoder.try_status()? {
                return Err(encoder_failure(encoder, Some(status), None).await);
            }

            let Some(entry) = queue.next().cloned() else {
                break;
            };

            match self.play_entry(&entry, encoder).await? {
                EntryOutcome::Played => {
                    report.played += 1;
                    unplayable = 0;
                }
                EntryOutcome::Skipped => {
                    report.skipped += 1;
                    unplayable += 1;
                }
                EntryOutcome::Failed => {
                    report.failed += 1;
                    unplayable += 1;
                }
                EntryOutcome::Interrupted => {
                    report.outcome = SessionOutcome::Stopped;
                    break;
                }
            }

            if queue.is_looping() && unplayable >= queue.len() {
                error!("No entry in the playlist could be played, stopping");
                break;
            }
        }

        Ok(report)
    }

    async fn play_entry(&self, entry: &MediaEntry, encoder: &mut TranscoderProcess) -> Result<EntryOutcome> {
        info!(
            "Playing {} [{} - {} | {}]",
            entry.source(),
            entry.start(),
            entry.end(),
            entry.duration()
        );

        if !entry.media_info().has_video_and_audio() {
            warn!("Skipping {}: needs both a video and an audio stream", entry.source());
            return Ok(EntryOutcome::Skipped);
        }

        let profile = profile::resolve_decoder(entry, self.playlist, self.options.preset);
        debug!("Decoder global args: {:?}", profile.global);
        debug!("Decoder input args: {:?}", profile.input);
        debug!("Decoder output args: {:?}", profile.output);

        let plan = match DecodePlan::build(self.playlist, entry) {
            Ok(plan) => plan,
            Err(e) => {
                warn!("Skipping {}: {}", entry.source(), e);
                return Ok(EntryOutcome::Failed);
            }
        };

        let command = plan.command(&self.options.ffmpeg, &profile, entry);
        let mut decoder = match TranscoderProcess::spawn_decoder(&command) {
            Ok(decoder) => decoder,
            Err(e) => {
                warn!("{}", Error::decoder_failure(entry.source(), e.to_string()));
                return Ok(EntryOutcome::Failed);
            }
        };

        self.transition(SessionState::EntryDecoding);
        let relay = self.relay(&mut decoder, encoder).await;
        self.transition(SessionState::Streaming);

        match relay {
            Ok(RelayEnd::Eof { bytes }) => {
                debug!("Relayed {} bytes from {}", bytes, entry.source());
            }
            Ok(RelayEnd::Cancelled) => {
                info!("Stop requested while playing {}", entry.source());
                stop_decoder(&mut decoder).await;
                return Ok(EntryOutcome::Interrupted);
            }
            Ok(RelayEnd::EncoderGone(e)) => {
                stop_decoder(&mut decoder).await;
                return Err(encoder_failure(encoder, None, Some(e)).await);
            }
            Ok(RelayEnd::EncoderExited(status)) => {
                stop_decoder(&mut decoder).await;
                return Err(encoder_failure(encoder, Some(status), None).await);
            }
            Ok(RelayEnd::ReadFailed(e)) => {
                stop_decoder(&mut decoder).await;
                warn!("{}", Error::decoder_failure(entry.source(), format!("read failed: {}", e)));
                return Ok(EntryOutcome::Failed);
            }
            Err(e) => {
                stop_decoder(&mut decoder).await;
                return Err(e);
            }
        }

        let status = decoder.wait().await?;
        if status.success() {
            if let Some(text) = decoder.take_diagnostics() {
                debug!("Decoder: {}", text);
            }
            Ok(EntryOutcome::Played)
        } else {
            let mut message = format!("decoder exited with {}", status);
            if let Some(text) = decoder.take_diagnostics() {
                message.push_str(": ");
                message.push_str(&text);
            }
            warn!("{}", Error::decoder_failure(entry.source(), message));
            Ok(EntryOutcome::Failed)
        }
    }

    /// Copy decoder stdout into encoder stdin in `chunk_size` pieces until EOF.
    ///
    /// Every wait on either pipe also watches for a stop request and for the
    /// encoder exiting, so a silent decoder cannot hide a dead encoder.
    async fn relay(&self, decoder: &mut TranscoderProcess, encoder: &mut TranscoderProcess) -> Result<RelayEnd> {
        let decoder_diagnostics = decoder.diagnostics().clone();
        let encoder_diagnostics = encoder.diagnostics().clone();
        let stdout = decoder
            .stdout()
            .ok_or_else(|| ffstream_av::Error::missing_pipe("ffmpeg", "stdout"))?;
        let Some((stdin, mut encoder_exit)) = encoder.stdin_with_exit() else {
            return Err(Error::encoder_failure("encoder stdin is closed"));
        };

        let mut buf = vec![0u8; self.options.chunk_size];
        let mut bytes = 0u64;

        loop {
            if let Some(text) = decoder_diagnostics.take() {
                warn!("Decoder: {}", text);
            }
            if let Some(text) = encoder_diagnostics.take() {
                debug!("Encoder: {}", text);
            }

            let read = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return Ok(RelayEnd::Cancelled),
                status = encoder_exit.exited() => return Ok(RelayEnd::EncoderExited(status?)),
                read = stdout.read(&mut buf) => read,
            };
            let n = match read {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) => return Ok(RelayEnd::ReadFailed(e)),
            };

            let written = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return Ok(RelayEnd::Cancelled),
                status = encoder_exit.exited() => return Ok(RelayEnd::EncoderExited(status?)),
                written = stdin.write_all(&buf[..n]) => written,
            };
            if let Err(e) = written {
                return Ok(RelayEnd::EncoderGone(e));
            }
            bytes += n as u64;
        }

        if let Err(e) = stdin.flush().await {
            return Ok(RelayEnd::EncoderGone(e));
        }
        Ok(RelayEnd::Eof { bytes })
    }
}

/// Log and clear whatever the encoder wrote to stderr since the last call.
fn log_encoder_diagnostics(encoder: &TranscoderProcess) {
    if let Some(text) = encoder.take_diagnostics() {
        debug!("Encoder: {}", text);
    }
}

async fn stop_decoder(decoder: &mut TranscoderProcess) {
    if let Err(e) = decoder.kill().await {
        debug!("Failed to reap decoder: {}", e);
    }
}

/// Reap a dead or unwritable encoder and describe why it went away.
async fn encoder_failure(
    encoder: &mut TranscoderProcess,
    status: Option<ExitStatus>,
    write_error: Option<std::io::Error>,
) -> Error {
    // kill also waits for the stderr reader, so the diagnostics are complete
    let status = match encoder.kill().await {
        Ok(reaped) => status.unwrap_or(reaped),
        Err(e) => {
            debug!("Failed to reap encoder: {}", e);
            return Error::encoder_failure(format!("encoder could not be reaped: {}", e));
        }
    };

    let mut message = match write_error {
        Some(e) => format!("write to encoder failed ({}), encoder exited with {}", e, status),
        None => format!("encoder exited with {}", status),
    };
    if let Some(text) = encoder.take_diagnostics() {
        message.push_str(": ");
        message.push_str(&text);
    }

    let err = Error::encoder_failure(message);
    error!("{}", err);
    err
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use ffstream_av::MediaInfo;
    use std::os::unix::fs::PermissionsExt;

    #[tokio::test]
    async fn test_encoder_diagnostics_drained_between_entries() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("fake-ffmpeg");
        std::fs::write(&script, "#!/bin/sh\nexec cat > /dev/null\n").unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let mut encoder = TranscoderProcess::spawn_encoder(&FfmpegCommand::new(&script)).unwrap();
        for i in 0..10 {
            encoder.diagnostics().push(format!("frame={}", i));
        }

        // no streams at all, so the entry is skipped without spawning a decoder
        let playlist = Playlist::new("drain");
        let mut queue = PlaylistQueue::new(
            vec![MediaEntry::from_media_info(MediaInfo::new("silent.mp4"))],
            false,
            false,
        );
        let session = StreamSession::new(&playlist, StreamOptions::default());
        let report = session.stream_entries(&mut queue, &mut encoder).await.unwrap();

        assert_eq!(report.skipped, 1);
        assert!(encoder.diagnostics().is_empty());
        encoder.kill().await.unwrap();
    }
}
