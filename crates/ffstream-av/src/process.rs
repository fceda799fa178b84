//! Running ffmpeg processes.
//!
//! A [`TranscoderProcess`] owns a spawned ffmpeg child. Its stderr is drained
//! by a background task into a [`DiagnosticBuffer`] so the child never blocks
//! on a full stderr pipe, and the owner reads the collected text whenever it
//! polls.

use crate::command::FfmpegCommand;
use crate::{Error, Result};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::process::{ExitStatus, Stdio};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncReadExt;
use tokio::process::{Child, ChildStderr, ChildStdin, ChildStdout, Command};
use tokio::task::JoinHandle;

/// Lines a [`DiagnosticBuffer`] keeps before dropping the oldest.
pub const DIAGNOSTIC_LINE_LIMIT: usize = 256;

/// Longest stderr line kept whole; longer runs are split.
const MAX_LINE_BYTES: usize = 4096;

/// Bounded text buffer shared between a stderr reader and its owner.
///
/// Holds at most [`DIAGNOSTIC_LINE_LIMIT`] lines; pushing past the limit
/// drops the oldest line.
#[derive(Debug, Clone, Default)]
pub struct DiagnosticBuffer {
    lines: Arc<Mutex<VecDeque<String>>>,
}

impl DiagnosticBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, line: impl Into<String>) {
        let mut lines = self.lines.lock();
        if lines.len() >= DIAGNOSTIC_LINE_LIMIT {
            lines.pop_front();
        }
        lines.push_back(line.into());
    }

    /// Remove and return everything collected so far, joined by newlines.
    ///
    /// Returns `None` when nothing is pending.
    pub fn take(&self) -> Option<String> {
        let lines = std::mem::take(&mut *self.lines.lock());
        if lines.is_empty() {
            None
        } else {
            Some(Vec::from(lines).join("\n"))
        }
    }

    pub fn is_empty(&self) -> bool {
        self.lines.lock().is_empty()
    }

    pub fn len(&self) -> usize {
        self.lines.lock().len()
    }
}

/// Which side of the relay a process sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessRole {
    /// Session-long process fed through stdin.
    Encoder,
    /// Per-entry process read through stdout.
    Decoder,
}

impl ProcessRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessRole::Encoder => "encoder",
            ProcessRole::Decoder => "decoder",
        }
    }
}

/// Handle to a running ffmpeg process.
pub struct TranscoderProcess {
    role: ProcessRole,
    child: Child,
    stdin: Option<ChildStdin>,
    stdout: Option<ChildStdout>,
    diagnostics: DiagnosticBuffer,
    stderr_task: Option<JoinHandle<()>>,
}

impl TranscoderProcess {
    /// Spawn an encoder: stdin piped, stdout discarded.
    pub fn spawn_encoder(command: &FfmpegCommand) -> Result<Self> {
        Self::spawn(command, ProcessRole::Encoder)
    }

    /// Spawn a decoder: stdout piped, stdin closed.
    pub fn spawn_decoder(command: &FfmpegCommand) -> Result<Self> {
        Self::spawn(command, ProcessRole::Decoder)
    }

    /// Spawn `command` with pipes wired for `role`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ToolNotFound`] if the executable does not exist and
    /// [`Error::MissingPipe`] if the child lacks an expected pipe.
    pub fn spawn(command: &FfmpegCommand, role: ProcessRole) -> Result<Self> {
        let mut cmd = Command::new(command.program());
        cmd.args(command.args())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        match role {
            ProcessRole::Encoder => {
                cmd.stdin(Stdio::piped()).stdout(Stdio::null());
            }
            ProcessRole::Decoder => {
                cmd.stdin(Stdio::null()).stdout(Stdio::piped());
            }
        }

        tracing::debug!("Spawning {}: {}", role.as_str(), command.display());

        let tool = command.program().to_string_lossy().to_string();
        let mut child = cmd.spawn().map_err(|e| Error::from_spawn(&tool, e))?;

        let stdin = child.stdin.take();
        let stdout = child.stdout.take();
        match role {
            ProcessRole::Encoder if stdin.is_none() => return Err(Error::missing_pipe(tool, "stdin")),
            ProcessRole::Decoder if stdout.is_none() => return Err(Error::missing_pipe(tool, "stdout")),
            _ => {}
        }

        let diagnostics = DiagnosticBuffer::new();
        let stderr_task = child
            .stderr
            .take()
            .map(|stderr| tokio::spawn(drain_stderr(stderr, diagnostics.clone())));

        Ok(Self {
            role,
            child,
            stdin,
            stdout,
            diagnostics,
            stderr_task,
        })
    }

    pub fn role(&self) -> ProcessRole {
        self.role
    }

    /// OS process id, if the process has not been reaped yet.
    pub fn id(&self) -> Option<u32> {
        self.child.id()
    }

    /// Writable stdin of an encoder, until [`close_stdin`](Self::close_stdin).
    pub fn stdin(&mut self) -> Option<&mut ChildStdin> {
        self.stdin.as_mut()
    }

    /// Encoder stdin together with a watch on the process's exit.
    ///
    /// Both borrow disjoint parts of the handle, so a relay can write and
    /// notice the process going away at the same time.
    pub fn stdin_with_exit(&mut self) -> Option<(&mut ChildStdin, ExitWatch<'_>)> {
        let stdin = self.stdin.as_mut()?;
        Some((stdin, ExitWatch { child: &mut self.child }))
    }

    /// Readable stdout of a decoder.
    pub fn stdout(&mut self) -> Option<&mut ChildStdout> {
        self.stdout.as_mut()
    }

    /// Close stdin so the child sees end of input.
    pub fn close_stdin(&mut self) {
        self.stdin = None;
    }

    pub fn diagnostics(&self) -> &DiagnosticBuffer {
        &self.diagnostics
    }

    /// Drain pending stderr output.
    pub fn take_diagnostics(&self) -> Option<String> {
        self.diagnostics.take()
    }

    /// Non-blocking exit check.
    pub fn try_status(&mut self) -> Result<Option<ExitStatus>> {
        Ok(self.child.try_wait()?)
    }

    /// Whether the process is still running.
    pub fn is_alive(&mut self) -> bool {
        matches!(self.child.try_wait(), Ok(None))
    }

    /// Wait for exit, then for the stderr reader so diagnostics are complete.
    pub async fn wait(&mut self) -> Result<ExitStatus> {
        let status = self.child.wait().await?;
        self.join_stderr().await;
        Ok(status)
    }

    /// Ask the process to stop now and reap it.
    pub async fn kill(&mut self) -> Result<ExitStatus> {
        self.close_stdin();
        self.stdout = None;
        if let Err(e) = self.child.start_kill() {
            // already exited
            tracing::trace!("{} kill: {}", self.role.as_str(), e);
        }
        self.wait().await
    }

    /// Close stdin and give the process `grace` to exit on its own before
    /// killing it.
    pub async fn finish(&mut self, grace: Duration) -> Result<ExitStatus> {
        self.close_stdin();
        match tokio::time::timeout(grace, self.child.wait()).await {
            Ok(status) => {
                let status = status?;
                self.join_stderr().await;
                Ok(status)
            }
            Err(_) => {
                tracing::debug!(
                    "{} still running after {:?}, killing",
                    self.role.as_str(),
                    grace
                );
                self.kill().await
            }
        }
    }

    async fn join_stderr(&mut self) {
        if let Some(task) = self.stderr_task.take() {
            if let Err(e) = task.await {
                tracing::warn!("{} stderr reader failed: {}", self.role.as_str(), e);
            }
        }
    }
}

/// Borrowed handle that resolves when the process exits.
pub struct ExitWatch<'a> {
    child: &'a mut Child,
}

impl ExitWatch<'_> {
    /// Wait for the process to exit. Safe to drop before it completes.
    pub async fn exited(&mut self) -> Result<ExitStatus> {
        Ok(self.child.wait().await?)
    }
}

impl std::fmt::Debug for TranscoderProcess {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TranscoderProcess")
            .field("role", &self.role)
            .field("pid", &self.child.id())
            .finish()
    }
}

/// Copy stderr into `buffer` line by line.
///
/// Lines end at `\n` or `\r` (ffmpeg's progress output only uses `\r`).
async fn drain_stderr(mut stderr: ChildStderr, buffer: DiagnosticBuffer) {
    let mut chunk = [0u8; 1024];
    let mut line = Vec::new();
    loop {
        let n = match stderr.read(&mut chunk).await {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) => {
                tracing::debug!("stderr read failed: {}", e);
                break;
            }
        };
        for &byte in &chunk[..n] {
            if byte == b'\n' || byte == b'\r' {
                flush_line(&mut line, &buffer);
            } else {
                line.push(byte);
                if line.len() >= MAX_LINE_BYTES {
                    flush_line(&mut line, &buffer);
                }
            }
        }
    }
    flush_line(&mut line, &buffer);
}

fn flush_line(line: &mut Vec<u8>, buffer: &DiagnosticBuffer) {
    let text = String::from_utf8_lossy(line);
    let text = text.trim_end();
    if !text.is_empty() {
        buffer.push(text);
    }
    line.clear();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_buffer_take_drains() {
        let buffer = DiagnosticBuffer::new();
        assert_eq!(buffer.take(), None);

        buffer.push("first");
        buffer.clone().push("second");
        assert!(!buffer.is_empty());
        assert_eq!(buffer.take().as_deref(), Some("first\nsecond"));
        assert_eq!(buffer.take(), None);
    }

    #[test]
    fn test_diagnostic_buffer_drops_oldest() {
        let buffer = DiagnosticBuffer::new();
        for i in 0..DIAGNOSTIC_LINE_LIMIT + 10 {
            buffer.push(format!("line {}", i));
        }
        assert_eq!(buffer.len(), DIAGNOSTIC_LINE_LIMIT);

        let text = buffer.take().unwrap();
        assert!(text.starts_with("line 10\n"));
        assert!(text.ends_with(&format!("line {}", DIAGNOSTIC_LINE_LIMIT + 9)));
    }

    #[tokio::test]
    async fn test_spawn_missing_program() {
        let cmd = FfmpegCommand::new("nonexistent_ffmpeg_12345");
        let err = TranscoderProcess::spawn_decoder(&cmd).unwrap_err();
        assert!(matches!(err, Error::ToolNotFound { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_stderr_is_collected() {
        use std::io::Write;
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("fake-ffmpeg");
        let mut file = std::fs::File::create(&script).unwrap();
        writeln!(file, "#!/bin/sh\necho 'bad input' >&2\nexit 3").unwrap();
        drop(file);
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let cmd = FfmpegCommand::new(&script);
        let mut process = TranscoderProcess::spawn_decoder(&cmd).unwrap();
        let status = process.wait().await.unwrap();

        assert_eq!(status.code(), Some(3));
        assert!(!process.is_alive());
        assert_eq!(process.take_diagnostics().as_deref(), Some("bad input"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_progress_lines_split_on_carriage_return() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("fake-ffmpeg");
        std::fs::write(
            &script,
            "#!/bin/sh\nprintf 'frame=1\\rframe=2\\rdone\\n' >&2\n",
        )
        .unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let cmd = FfmpegCommand::new(&script);
        let mut process = TranscoderProcess::spawn_decoder(&cmd).unwrap();
        process.wait().await.unwrap();

        assert_eq!(
            process.take_diagnostics().as_deref(),
            Some("frame=1\nframe=2\ndone")
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_exit_watch_sees_encoder_exit() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("fake-ffmpeg");
        std::fs::write(&script, "#!/bin/sh\nexit 4\n").unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let cmd = FfmpegCommand::new(&script);
        let mut process = TranscoderProcess::spawn_encoder(&cmd).unwrap();
        let (_stdin, mut exit) = process.stdin_with_exit().unwrap();
        let status = tokio::time::timeout(Duration::from_secs(10), exit.exited())
            .await
            .unwrap()
            .unwrap();

        assert_eq!(status.code(), Some(4));
        assert!(!process.is_alive());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_kill_running_encoder() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("fake-ffmpeg");
        std::fs::write(&script, "#!/bin/sh\nexec sleep 30\n").unwrap();
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();
        }

        let cmd = FfmpegCommand::new(&script);
        let mut process = TranscoderProcess::spawn_encoder(&cmd).unwrap();
        assert!(process.is_alive());
        assert!(process.stdin().is_some());

        let status = process.kill().await.unwrap();
        assert!(!status.success());
        assert!(process.stdin().is_none());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_finish_waits_for_clean_exit() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out");
        let script = dir.path().join("fake-ffmpeg");
        std::fs::write(&script, format!("#!/bin/sh\ncat > '{}'\n", out.display())).unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let cmd = FfmpegCommand::new(&script);
        let mut process = TranscoderProcess::spawn_encoder(&cmd).unwrap();
        {
            use tokio::io::AsyncWriteExt;
            let stdin = process.stdin().unwrap();
            stdin.write_all(b"payload").await.unwrap();
            stdin.flush().await.unwrap();
        }

        let status = process.finish(Duration::from_secs(10)).await.unwrap();
        assert!(status.success());
        assert_eq!(std::fs::read(&out).unwrap(), b"payload");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_finish_kills_after_grace() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("fake-ffmpeg");
        std::fs::write(&script, "#!/bin/sh\nexec sleep 30\n").unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let cmd = FfmpegCommand::new(&script);
        let mut process = TranscoderProcess::spawn_encoder(&cmd).unwrap();
        let status = process.finish(Duration::from_millis(50)).await.unwrap();
        assert!(!status.success());
    }
}
