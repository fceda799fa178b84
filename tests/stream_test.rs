//! End-to-end streaming sessions against a stand-in ffmpeg.
//!
//! The script copies decoder input files to stdout and encoder stdin to the
//! destination, so the destination ends up holding exactly the bytes the
//! session relayed.

#![cfg(unix)]

mod common;

use assert_matches::assert_matches;
use common::{entry_for, install_fake_ffmpeg, media, playlist, Shape};
use ffstream::playlist::MediaEntry;
use ffstream::stream::{SessionOutcome, SessionState, StreamOptions, StreamSession};
use ffstream::Error;
use std::path::Path;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

fn options(ffmpeg: &Path) -> StreamOptions {
    StreamOptions {
        ffmpeg: ffmpeg.to_path_buf(),
        chunk_size: 4,
        shutdown_grace: Duration::from_secs(5),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_entries_relayed_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let ffmpeg = install_fake_ffmpeg(dir.path());
    let first = dir.path().join("first.mp4");
    let second = dir.path().join("second.mp4");
    std::fs::write(&first, "first entry\n").unwrap();
    std::fs::write(&second, "second entry\n").unwrap();
    let destination = dir.path().join("out.ts");

    let playlist = playlist(
        &destination.to_string_lossy(),
        vec![entry_for(&first), entry_for(&second)],
    );
    let mut session = StreamSession::new(&playlist, options(&ffmpeg));
    assert_eq!(session.state(), SessionState::Idle);

    let report = session.run().await.unwrap();

    assert_eq!(report.outcome, SessionOutcome::Completed);
    assert_eq!(report.played, 2);
    assert_eq!(report.skipped, 0);
    assert_eq!(report.failed, 0);
    assert_eq!(session.state(), SessionState::Terminated);
    assert_eq!(
        std::fs::read_to_string(&destination).unwrap(),
        "first entry\nsecond entry\n"
    );
}

#[tokio::test]
async fn test_unplayable_entries_do_not_stop_the_session() {
    let dir = tempfile::tempdir().unwrap();
    let ffmpeg = install_fake_ffmpeg(dir.path());
    let good = dir.path().join("good.mp4");
    std::fs::write(&good, "good\n").unwrap();
    let silent = dir.path().join("silent.mp4");
    std::fs::write(&silent, "never played\n").unwrap();
    let destination = dir.path().join("out.ts");

    let no_audio = MediaEntry::from_media_info(media(
        &silent.to_string_lossy(),
        Shape {
            audio: false,
            ..Default::default()
        },
    ));
    let missing = entry_for(&dir.path().join("missing.mp4"));

    let playlist = playlist(
        &destination.to_string_lossy(),
        vec![no_audio, missing, entry_for(&good)],
    );
    let report = StreamSession::new(&playlist, options(&ffmpeg))
        .run()
        .await
        .unwrap();

    assert_eq!(report.outcome, SessionOutcome::Completed);
    assert_eq!(report.played, 1);
    assert_eq!(report.skipped, 1);
    assert_eq!(report.failed, 1);
    assert_eq!(std::fs::read_to_string(&destination).unwrap(), "good\n");
}

#[tokio::test]
async fn test_stop_request_ends_looping_session() {
    let dir = tempfile::tempdir().unwrap();
    let ffmpeg = install_fake_ffmpeg(dir.path());
    let clip = dir.path().join("clip.mp4");
    std::fs::write(&clip, "loop\n").unwrap();
    let destination = dir.path().join("out.ts");

    let mut playlist = playlist(&destination.to_string_lossy(), vec![entry_for(&clip)]);
    playlist.looping = true;

    let mut session = StreamSession::new(&playlist, options(&ffmpeg));
    let token = session.cancellation_token();
    let mut states = session.subscribe();
    tokio::spawn(async move {
        let _ = states
            .wait_for(|state| *state == SessionState::EntryDecoding)
            .await;
        token.cancel();
    });

    let report = tokio::time::timeout(Duration::from_secs(30), session.run())
        .await
        .expect("looping session did not stop")
        .unwrap();

    assert_eq!(report.outcome, SessionOutcome::Stopped);
    assert_eq!(session.state(), SessionState::Terminated);
}

#[tokio::test]
async fn test_stop_before_start_plays_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let ffmpeg = install_fake_ffmpeg(dir.path());
    let clip = dir.path().join("clip.mp4");
    std::fs::write(&clip, "unused\n").unwrap();
    let destination = dir.path().join("out.ts");

    let playlist = playlist(&destination.to_string_lossy(), vec![entry_for(&clip)]);
    let stop = CancellationToken::new();
    stop.cancel();
    let mut session = StreamSession::new(&playlist, options(&ffmpeg)).with_cancellation(stop);

    let report = session.run().await.unwrap();
    assert_eq!(report.outcome, SessionOutcome::Stopped);
    assert_eq!(report.played, 0);
    assert_eq!(std::fs::read_to_string(&destination).unwrap(), "");
}

#[tokio::test]
async fn test_encoder_exit_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let ffmpeg = install_fake_ffmpeg(dir.path());
    let clip = dir.path().join("clip.mp4");
    std::fs::write(&clip, "data\n").unwrap();
    let destination = dir.path().join("out.fail");

    let mut playlist = playlist(&destination.to_string_lossy(), vec![entry_for(&clip)]);
    playlist.looping = true;

    let mut session = StreamSession::new(&playlist, options(&ffmpeg));
    let err = tokio::time::timeout(Duration::from_secs(30), session.run())
        .await
        .expect("session did not notice the encoder exit")
        .unwrap_err();

    assert_matches!(err, Error::EncoderFailure { ref message } if message.contains("exit"));
    assert_eq!(session.state(), SessionState::Terminated);
}

#[tokio::test]
async fn test_encoder_exit_noticed_while_decoder_stalls() {
    let dir = tempfile::tempdir().unwrap();
    let ffmpeg = install_fake_ffmpeg(dir.path());
    let clip = dir.path().join("clip.stall");
    std::fs::write(&clip, "never read\n").unwrap();
    let destination = dir.path().join("out.dies");

    let playlist = playlist(&destination.to_string_lossy(), vec![entry_for(&clip)]);
    let mut session = StreamSession::new(&playlist, options(&ffmpeg));

    let started = Instant::now();
    let err = tokio::time::timeout(Duration::from_secs(30), session.run())
        .await
        .expect("session waited on the stalled decoder")
        .unwrap_err();

    assert_matches!(err, Error::EncoderFailure { ref message } if message.contains("exit"));
    assert!(started.elapsed() < Duration::from_secs(10), "{:?}", started.elapsed());
    assert_eq!(session.state(), SessionState::Terminated);
}

#[test]
fn test_missing_ffmpeg_fails_to_start() {
    let dir = tempfile::tempdir().unwrap();
    let clip = dir.path().join("clip.mp4");
    std::fs::write(&clip, "data\n").unwrap();

    let playlist = playlist("out.ts", vec![entry_for(&clip)]);
    let mut session = StreamSession::new(&playlist, options(&dir.path().join("no-such-ffmpeg")));

    assert!(tokio_test::block_on(session.run()).is_err());
    assert_eq!(session.state(), SessionState::Terminated);
}
