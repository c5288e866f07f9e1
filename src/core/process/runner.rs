// armada: Multi-Repository Git Operation Orchestrator
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Process execution and lifecycle management.
//!
//! ```text
//! run() / run_streaming(listeners, token)
//!              |
//!              v
//!     build_command()
//!     args, cwd, env, stdio
//!              |
//!              v
//!          spawn()
//!              |
//!              v
//!          run_child
//!              |
//!              v
//!    validate exit_code
//!    (skip if ALLOW_FAILURE or interrupted)
//!              |
//!              v
//!       ProcessOutput
//!    { exit_code, stdout, stderr }
//! ```

use crate::error::Result;
use anyhow::Context;
use std::process::Stdio;
use tokio::process::Command;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, trace};

use super::builder::{ProcessBuilder, ProcessFlags, ProcessOutput, StreamFlags};
use super::LineListener;

impl ProcessBuilder {
    /// Returns the display name for this process.
    fn display_name(&self) -> String {
        self.name_override().map_or_else(
            || {
                self.program().file_stem().map_or_else(
                    || "process".to_string(),
                    |s| s.to_string_lossy().into_owned(),
                )
            },
            String::from,
        )
    }

    /// Returns the full command line as a string (for logging).
    fn command_line(&self) -> String {
        let mut cmd = format!("{}", self.program().display());
        for arg in self.args_slice() {
            use std::fmt::Write as _;
            if arg.contains(' ') {
                let _ = write!(cmd, " \"{arg}\"");
            } else {
                let _ = write!(cmd, " {arg}");
            }
        }
        cmd
    }

    /// Spawns and runs the process, waiting for completion.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Spawning the child process fails.
    /// - The process exits with a non-zero status (and `ALLOW_FAILURE` flag is not set).
    /// - IO error occurs during output streaming.
    pub async fn run(self) -> Result<ProcessOutput> {
        self.run_streaming(&mut [], &CancellationToken::new())
            .await
    }

    /// Spawns and runs the process with cancellation support and output
    /// streaming.
    ///
    /// Each complete output line is delivered to every listener as it
    /// arrives, before the process exits. When the token is cancelled the
    /// process is killed and the output is returned with
    /// `interrupted = true`; an interrupted run never fails the exit-code
    /// check.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Spawning the child process fails.
    /// - The process exits with a non-zero status (and `ALLOW_FAILURE` flag
    ///   is not set, and the process was not interrupted).
    /// - IO error occurs during output streaming.
    pub async fn run_streaming(
        self,
        listeners: &mut [&mut dyn LineListener],
        token: &CancellationToken,
    ) -> Result<ProcessOutput> {
        let name = self.display_name();
        let cmd_line = self.command_line();

        // Check if already cancelled before spawning
        if token.is_cancelled() {
            return Ok(ProcessOutput::new(-1, String::new(), String::new(), true));
        }

        if let Some(cwd) = self.working_dir() {
            debug!(cwd = %cwd.display(), "cd");
        }
        debug!(cmd = %cmd_line, "exec");

        let mut command = self.build_command();

        let mut child = command
            .spawn()
            .with_context(|| format!("Failed to spawn: {cmd_line}"))?;

        let pid = child.id();
        trace!(process = %name, pid = ?pid, "spawned");

        let output = self.run_child(&name, &mut child, listeners, token).await?;

        // Check exit code (unless interrupted or ALLOW_FAILURE)
        if !output.is_interrupted()
            && !self.process_flags().contains(ProcessFlags::ALLOW_FAILURE)
            && !self.success_code_set().contains(&output.exit_code())
        {
            if !output.stderr().is_empty() {
                error!(process = %name, stderr = %output.stderr(), "process error output");
            }
            anyhow::bail!(
                "{} exited with code {} (expected one of {:?})",
                name,
                output.exit_code(),
                self.success_code_set()
            );
        }

        trace!(
            process = %name,
            exit_code = output.exit_code(),
            interrupted = output.is_interrupted(),
            "completed"
        );
        Ok(output)
    }

    /// Builds the tokio Command from this builder's configuration.
    fn build_command(&self) -> Command {
        let mut command = Command::new(self.program());

        // Arguments
        command.args(self.args_slice());

        // Working directory
        if let Some(cwd) = self.working_dir() {
            command.current_dir(cwd);
        }

        // Environment overlays on top of the inherited environment
        for (key, value) in self.environment() {
            command.env(key, value);
        }

        // Stdin
        if self.stdin_content().is_some() {
            command.stdin(Stdio::piped());
        } else {
            command.stdin(Stdio::null());
        }

        // Stdout
        command.stdout(Self::stdio_from_flags(self.stdout_config().flags()));

        // Stderr
        command.stderr(Self::stdio_from_flags(self.stderr_config().flags()));

        // Kill on drop for safety
        command.kill_on_drop(true);

        command
    }

    /// Converts `StreamFlags` to Stdio configuration.
    fn stdio_from_flags(flags: StreamFlags) -> Stdio {
        if flags.contains(StreamFlags::INHERIT) {
            Stdio::inherit()
        } else if flags.contains(StreamFlags::BIT_BUCKET) {
            Stdio::null()
        } else {
            Stdio::piped()
        }
    }
}
