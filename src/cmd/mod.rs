// armada: Multi-Repository Git Operation Orchestrator
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Command implementations.
//!
//! ```text
//! CLI args --> cmd::run_* handlers
//!   reset, rebase, repos
//!
//! Shared wiring:
//!   build_runner       git executable + timeout from config
//!   resolve_repos      explicit paths or workspace discovery
//!   preflight_git      minimum version check
//!   CliHost            non-interactive OperationHost bound to flags
//!   CliNotifier        notifications through tracing
//! ```

pub mod rebase;
pub mod repos;
pub mod reset;

use anyhow::Context;
use std::path::PathBuf;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::error::Result;
use crate::git::discovery::discover_repositories;
use crate::git::runner::{GitRunner, ShellGitRunner};
use crate::git::{query, version};
use crate::op::{LocalChangesDecision, Notifier, OperationHost, Repo};

/// Builds the production git runner from config.
pub(crate) fn build_runner(config: &Config) -> Result<Arc<dyn GitRunner>> {
    let runner = match &config.git.executable {
        Some(path) => ShellGitRunner::with_executable(path),
        None => ShellGitRunner::discover()?,
    }
    .with_timeout_secs(config.git.timeout_secs);
    Ok(Arc::new(runner))
}

/// Resolves the repositories an operation runs against: explicit paths
/// when given, workspace discovery otherwise.
pub(crate) fn resolve_repos(explicit: &[PathBuf], config: &Config) -> Result<Vec<Repo>> {
    if explicit.is_empty() {
        let workspace = match &config.paths.workspace {
            Some(dir) => dir.clone(),
            None => std::env::current_dir().context("cannot determine current directory")?,
        };
        let paths = discover_repositories(&workspace)?;
        anyhow::ensure!(
            !paths.is_empty(),
            "no git repositories found under {}",
            workspace.display()
        );
        return Ok(paths.into_iter().map(Repo::at).collect());
    }

    let mut repos = Vec::new();
    for path in explicit {
        anyhow::ensure!(
            query::is_git_repo(path),
            "{} is not a git repository",
            path.display()
        );
        let canonical = std::fs::canonicalize(path)
            .with_context(|| format!("cannot resolve {}", path.display()))?;
        repos.push(Repo::at(canonical));
    }
    repos.sort();
    Ok(repos)
}

/// Fails fast when the installed git is too old for the commands the
/// executors issue.
pub(crate) async fn preflight_git(
    runner: &dyn GitRunner,
    token: &CancellationToken,
) -> Result<()> {
    let detected = version::detect(runner, std::path::Path::new("."), token).await?;
    detected.ensure_supported()?;
    Ok(())
}

/// Creates the operation token and wires Ctrl+C into it.
pub(crate) fn cancellation_token() -> CancellationToken {
    let token = CancellationToken::new();
    let cancel = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Received Ctrl+C, stopping after the current repository...");
            cancel.cancel();
        }
    });
    token
}

/// Notification sink rendering through tracing.
pub(crate) struct CliNotifier;

impl Notifier for CliNotifier {
    fn notify_success(&self, title: &str, body: &str) {
        if body.is_empty() {
            info!("{title}");
        } else {
            info!("{title}: {body}");
        }
    }

    fn notify_warning(&self, title: &str, body: &str) {
        warn!("{title}");
        for line in body.lines() {
            warn!("  {line}");
        }
    }

    fn notify_error(&self, title: &str, body: &str) {
        error!("{title}");
        for line in body.lines() {
            error!("  {line}");
        }
    }
}

/// Non-interactive host: the Smart/Force/Cancel decision comes from the
/// command line instead of a dialog.
pub(crate) struct CliHost {
    pub decision: LocalChangesDecision,
}

impl OperationHost for CliHost {
    fn select_local_changes_action(
        &self,
        repo: &Repo,
        paths: &[String],
        operation: &str,
        force_label: &str,
    ) -> LocalChangesDecision {
        warn!(
            repo = %repo,
            files = paths.len(),
            "local changes would be overwritten by the {operation}"
        );
        for path in paths {
            warn!("  {path}");
        }
        match self.decision {
            LocalChangesDecision::Smart => {
                info!(repo = %repo, "saving local changes and retrying");
            }
            LocalChangesDecision::Force => {
                warn!(repo = %repo, "discarding local changes ({force_label})");
            }
            LocalChangesDecision::Cancel => {
                info!(
                    repo = %repo,
                    "leaving the repository untouched; rerun with --on-conflict smart|force to override"
                );
            }
        }
        self.decision
    }

    fn resolve_restore_conflicts(
        &self,
        repo: &Repo,
        ours_title: &str,
        theirs_title: &str,
    ) -> bool {
        warn!(
            repo = %repo,
            "conflicts while restoring saved changes ({ours_title} vs {theirs_title}); \
             resolve them in the working tree manually"
        );
        false
    }
}
