// armada: Multi-Repository Git Operation Orchestrator
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! I/O streaming and output capture for processes.
//!
//! ```text
//! run_child()
//!   stdin task (optional)
//!   stdout/stderr reader tasks
//!   one tagged mpsc channel buffers lines
//!   select loop: deliver lines to listeners WHILE the child runs,
//!                watch child.wait(), cancellation, deadline
//!   --> ProcessOutput { stdout, stderr, exit_code, interrupted }
//! ```
//!
//! Lines reach [`LineListener`]s as they arrive, before the process
//! exits. Detectors that trigger mid-stream rely on this.

use crate::error::Result;
use anyhow::Context;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Child;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{trace, warn};

use super::builder::{ProcessBuilder, ProcessOutput, StreamFlags};
use super::{LineListener, StreamSource};

/// Deadline used when no timeout is configured.
const NO_TIMEOUT: Duration = Duration::from_secs(365 * 24 * 60 * 60);

/// Spawns a reader task for one output stream if its flags need it.
fn spawn_reader<R>(
    stream: Option<R>,
    source: StreamSource,
    flags: StreamFlags,
    tx: mpsc::Sender<(StreamSource, String)>,
) -> Option<JoinHandle<()>>
where
    R: tokio::io::AsyncRead + Unpin + Send + 'static,
{
    if !flags.intersects(StreamFlags::FORWARD_TO_LOG | StreamFlags::KEEP_IN_STRING) {
        return None;
    }
    stream.map(|stream| {
        tokio::spawn(async move {
            let mut lines = BufReader::new(stream).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                if tx.send((source, line)).await.is_err() {
                    break;
                }
            }
        })
    })
}

/// Waits for reader tasks to complete.
async fn await_readers(handles: [Option<JoinHandle<()>>; 2]) {
    for handle in handles.into_iter().flatten() {
        let _ = handle.await;
    }
}

/// Accumulates captured output for one stream.
#[derive(Default)]
struct Captured {
    buffer: String,
}

impl Captured {
    fn push(&mut self, line: &str) {
        if !self.buffer.is_empty() {
            self.buffer.push('\n');
        }
        self.buffer.push_str(line);
    }
}

impl ProcessBuilder {
    /// Runs the child process, streaming lines to `listeners` as they
    /// arrive and waiting for completion.
    ///
    /// The select loop below keeps three concerns in flight at once: line
    /// delivery, child exit, and cancellation/deadline. The line channel
    /// closes when both reader tasks finish, which is also the signal
    /// that no output remains to deliver.
    pub(super) async fn run_child(
        &self,
        name: &str,
        child: &mut Child,
        listeners: &mut [&mut dyn LineListener],
        token: &CancellationToken,
    ) -> Result<ProcessOutput> {
        let (tx, mut rx) = mpsc::channel::<(StreamSource, String)>(100);

        let stdout_flags = self.stdout_config().flags();
        let stderr_flags = self.stderr_config().flags();

        let handles = [
            spawn_reader(
                child.stdout.take(),
                StreamSource::Stdout,
                stdout_flags,
                tx.clone(),
            ),
            spawn_reader(child.stderr.take(), StreamSource::Stderr, stderr_flags, tx),
        ];

        self.write_stdin(name, child).await?;

        let deadline =
            tokio::time::Instant::now() + self.timeout_duration().unwrap_or(NO_TIMEOUT);

        let mut exit = None;
        let mut drained = false;
        let mut interrupted = false;
        let mut timed_out = false;
        let mut stdout = Captured::default();
        let mut stderr = Captured::default();

        // the loop ends only once the child exited AND the line channel
        // drained; either may happen first
        while exit.is_none() || !drained {
            tokio::select! {
                maybe_line = rx.recv(), if !drained => match maybe_line {
                    Some((source, line)) => {
                        let flags = match source {
                            StreamSource::Stdout => stdout_flags,
                            StreamSource::Stderr => stderr_flags,
                        };
                        if flags.contains(StreamFlags::FORWARD_TO_LOG) {
                            trace!(process = %name, stream = %source, line = %line, "output");
                        }
                        for listener in listeners.iter_mut() {
                            listener.on_line(&line, source);
                        }
                        if flags.contains(StreamFlags::KEEP_IN_STRING) {
                            match source {
                                StreamSource::Stdout => stdout.push(&line),
                                StreamSource::Stderr => stderr.push(&line),
                            }
                        }
                    }
                    None => drained = true,
                },
                status = child.wait(), if exit.is_none() => {
                    exit = Some(status?);
                }
                () = token.cancelled(), if exit.is_none() && !interrupted => {
                    warn!(process = %name, "Cancellation requested, terminating process");
                    child.kill().await.ok();
                    interrupted = true;
                }
                () = tokio::time::sleep_until(deadline), if exit.is_none() && !timed_out => {
                    warn!(process = %name, timeout = ?self.timeout_duration(), "Process timed out");
                    child.kill().await
                        .with_context(|| format!("failed to kill process {name}"))?;
                    timed_out = true;
                }
            }
        }

        let exit_status = match exit {
            Some(status) => status,
            None => child
                .wait()
                .await
                .with_context(|| format!("failed waiting for process {name} to exit"))?,
        };

        await_readers(handles).await;

        Ok(ProcessOutput::new(
            exit_status.code().unwrap_or(-1),
            stdout.buffer,
            stderr.buffer,
            interrupted,
        ))
    }

    /// Writes stdin content to the child process if configured.
    async fn write_stdin(&self, name: &str, child: &mut Child) -> Result<()> {
        if let Some(stdin_content) = self.stdin_content()
            && let Some(mut stdin) = child.stdin.take()
        {
            use tokio::io::AsyncWriteExt;
            stdin
                .write_all(stdin_content.as_bytes())
                .await
                .with_context(|| format!("failed to write to stdin for process {name}"))?;
        }
        Ok(())
    }
}
