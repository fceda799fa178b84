//! CLI end-to-end tests
//!
//! Tests for the ffstream command-line interface. None of these need
//! ffmpeg to be installed.

use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::process::Command;
use tempfile::tempdir;

/// Get a command for the ffstream binary
#[allow(deprecated)]
fn ffstream_cmd() -> Command {
    Command::cargo_bin("ffstream").unwrap()
}

#[test]
fn test_cli_no_args_shows_help() {
    let mut cmd = ffstream_cmd();
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn test_cli_help_flag() {
    let mut cmd = ffstream_cmd();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("ffstream"))
        .stdout(predicate::str::contains("stream"))
        .stdout(predicate::str::contains("generate"));
}

#[test]
fn test_cli_version_flag() {
    let mut cmd = ffstream_cmd();
    cmd.arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("ffstream"));
}

#[test]
fn test_cli_version_command() {
    let mut cmd = ffstream_cmd();
    cmd.arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_cli_check_tools_command() {
    let mut cmd = ffstream_cmd();
    cmd.arg("check-tools").assert().success().stdout(
        predicate::str::contains("ffmpeg").and(predicate::str::contains("ffprobe")),
    );
}

#[test]
fn test_cli_stream_requires_playlist() {
    let mut cmd = ffstream_cmd();
    cmd.arg("stream")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--playlist"));
}

#[test]
fn test_cli_stream_missing_playlist() {
    let dir = tempdir().unwrap();
    let mut cmd = ffstream_cmd();
    cmd.args(["stream", "--check-playlist", "-p"])
        .arg(dir.path().join("missing.json"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load playlist"));
}

#[test]
fn test_cli_stream_empty_playlist() {
    let dir = tempdir().unwrap();
    let playlist = dir.path().join("empty.json");
    fs::write(
        &playlist,
        r#"{ "output": { "destination": "out.flv", "resolution": "1280x720" } }"#,
    )
    .unwrap();

    let mut cmd = ffstream_cmd();
    cmd.args(["stream", "-c", "-p"])
        .arg(&playlist)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Nothing in playlist"));
}

#[test]
fn test_cli_generate_empty_directory() {
    let dir = tempdir().unwrap();
    let media = dir.path().join("media");
    fs::create_dir(&media).unwrap();
    let output = dir.path().join("playlist.json");

    let mut cmd = ffstream_cmd();
    cmd.arg("generate")
        .arg("-d")
        .arg(&media)
        .arg("-o")
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains("0 entries"));

    let written: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(written["entries"], serde_json::json!([]));

    // a second run must not clobber the file without --force
    let mut cmd = ffstream_cmd();
    cmd.arg("generate")
        .arg("-d")
        .arg(&media)
        .arg("-o")
        .arg(&output)
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    let mut cmd = ffstream_cmd();
    cmd.arg("generate")
        .arg("-d")
        .arg(&media)
        .arg("-o")
        .arg(&output)
        .arg("--force")
        .assert()
        .success();
}

#[test]
fn test_cli_generate_not_a_directory() {
    let dir = tempdir().unwrap();
    let mut cmd = ffstream_cmd();
    cmd.arg("generate")
        .arg("-d")
        .arg(dir.path().join("nope"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Not a directory"));
}

#[test]
fn test_cli_invalid_config_rejected() {
    let dir = tempdir().unwrap();
    let config = dir.path().join("config.toml");
    fs::write(&config, "[stream]\nchunk_size = 0\n").unwrap();

    let mut cmd = ffstream_cmd();
    cmd.arg("--config")
        .arg(&config)
        .arg("version")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid config file"));
}
