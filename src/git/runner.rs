// armada: Multi-Repository Git Operation Orchestrator
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Git command execution with streamed output.
//!
//! ```text
//! GitRunner::run(root, args, listeners, token)
//!        |
//!        v
//! ShellGitRunner --> ProcessBuilder --> git <args>
//!        |               lines stream to listeners live
//!        v
//! GitCommandResult { success, exit_code, stdout[], stderr[] }
//! ```
//!
//! A non-zero exit is a *result*, not an error: callers inspect the
//! output and decide. Errors are reserved for spawn-level problems.
//! ALWAYS sets `GCM_INTERACTIVE=never` and `GIT_TERMINAL_PROMPT=0`.

use futures_util::future::BoxFuture;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::core::process::builder::{ProcessBuilder, ProcessFlags};
use crate::core::process::LineListener;
use crate::error::Result;

/// Captured outcome of one git command against one working tree.
#[derive(Debug, Clone, Default)]
pub struct GitCommandResult {
    success: bool,
    exit_code: i32,
    stdout: Vec<String>,
    stderr: Vec<String>,
    interrupted: bool,
}

impl GitCommandResult {
    /// Creates a result (also used by test doubles).
    #[must_use]
    pub const fn new(
        success: bool,
        exit_code: i32,
        stdout: Vec<String>,
        stderr: Vec<String>,
        interrupted: bool,
    ) -> Self {
        Self {
            success,
            exit_code,
            stdout,
            stderr,
            interrupted,
        }
    }

    /// Whether git exited with a success code.
    #[must_use]
    pub const fn success(&self) -> bool {
        self.success
    }

    /// The raw exit code.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        self.exit_code
    }

    /// Ordered stdout lines.
    #[must_use]
    pub fn stdout(&self) -> &[String] {
        &self.stdout
    }

    /// Ordered stderr lines.
    #[must_use]
    pub fn stderr(&self) -> &[String] {
        &self.stderr
    }

    /// Whether the command was cut short by cancellation.
    #[must_use]
    pub const fn is_interrupted(&self) -> bool {
        self.interrupted
    }

    /// The error text used for reporting and grouping: stderr joined,
    /// falling back to stdout when git wrote its diagnostics there.
    #[must_use]
    pub fn error_text(&self) -> String {
        if self.stderr.is_empty() {
            self.stdout.join("\n")
        } else {
            self.stderr.join("\n")
        }
    }

    /// Whether any output line contains the given needle.
    #[must_use]
    pub fn output_contains(&self, needle: &str) -> bool {
        self.stdout
            .iter()
            .chain(self.stderr.iter())
            .any(|line| line.contains(needle))
    }
}

/// Executes git subcommands against a working tree.
///
/// The contract the whole operation core is written against: implementors
/// must deliver output lines to `listeners` *as they arrive* so that
/// detectors can observe partial output before the process exits, and
/// must report non-zero exits through the result rather than an error.
pub trait GitRunner: Send + Sync {
    /// Runs `git <args>` in `root`.
    ///
    /// # Errors
    ///
    /// Only spawn-level failures (missing executable, unspawnable
    /// process) are errors.
    fn run<'a>(
        &'a self,
        root: &'a Path,
        args: &'a [String],
        listeners: &'a mut [&'a mut dyn LineListener],
        token: &'a CancellationToken,
    ) -> BoxFuture<'a, Result<GitCommandResult>>;
}

/// Convenience wrapper: run a git command without listeners.
///
/// # Errors
///
/// Propagates spawn-level failures from the runner.
pub async fn run_git(
    runner: &dyn GitRunner,
    root: &Path,
    args: &[&str],
    token: &CancellationToken,
) -> Result<GitCommandResult> {
    let args: Vec<String> = args.iter().map(ToString::to_string).collect();
    runner.run(root, &args, &mut [], token).await
}

/// Production [`GitRunner`] shelling out to the git CLI.
#[derive(Debug, Clone)]
pub struct ShellGitRunner {
    program: PathBuf,
    timeout: Option<Duration>,
}

impl ShellGitRunner {
    /// Resolves `git` from PATH.
    ///
    /// # Errors
    ///
    /// Returns `ProcessError::ExecutableNotFound` when git is not installed.
    pub fn discover() -> Result<Self> {
        let builder = ProcessBuilder::which("git")?;
        Ok(Self {
            program: builder.program().clone(),
            timeout: None,
        })
    }

    /// Uses an explicit git executable.
    #[must_use]
    pub fn with_executable(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            timeout: None,
        }
    }

    /// Sets a per-command timeout (0 disables it).
    #[must_use]
    pub const fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout = if secs == 0 {
            None
        } else {
            Some(Duration::from_secs(secs))
        };
        self
    }

    /// The resolved git executable.
    #[must_use]
    pub fn program(&self) -> &Path {
        &self.program
    }
}

impl GitRunner for ShellGitRunner {
    fn run<'a>(
        &'a self,
        root: &'a Path,
        args: &'a [String],
        listeners: &'a mut [&'a mut dyn LineListener],
        token: &'a CancellationToken,
    ) -> BoxFuture<'a, Result<GitCommandResult>> {
        Box::pin(async move {
            let name = args
                .first()
                .map_or_else(|| "git".to_string(), |sub| format!("git {sub}"));

            let mut builder = ProcessBuilder::new(&self.program)
                .args(args)
                .cwd(root)
                .env("GCM_INTERACTIVE", "never")
                .env("GIT_TERMINAL_PROMPT", "0")
                .name(name)
                .capture_output()
                .flag(ProcessFlags::ALLOW_FAILURE);
            if let Some(timeout) = self.timeout {
                builder = builder.timeout(timeout);
            }

            let output = builder.run_streaming(listeners, token).await?;

            let split = |s: &str| -> Vec<String> {
                if s.is_empty() {
                    Vec::new()
                } else {
                    s.lines().map(ToString::to_string).collect()
                }
            };

            Ok(GitCommandResult::new(
                output.success() && !output.is_interrupted(),
                output.exit_code(),
                split(output.stdout()),
                split(output.stderr()),
                output.is_interrupted(),
            ))
        })
    }
}
