// armada: Multi-Repository Git Operation Orchestrator
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Multi-repository reset execution.
//!
//! ```text
//! per repository:  PENDING -> RUNNING -> SUCCESS | BLOCKED | FAILED
//!                  BLOCKED -> Smart | Force | Cancel
//!   Smart:  save -> reset -> restore   (restore runs even on failure)
//!   Force:  reset --hard <target>
//!   Cancel: original failure stands
//!
//! One pass over every repository, then ONE consolidated notification.
//! ```

use std::collections::BTreeMap;

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::config::types::ResetMode;
use crate::error::Result;
use crate::git::runner::GitRunner;
use crate::git::GitCommandResult;

use super::detector::OverwriteDetector;
use super::report;
use super::saver::ChangesSaver;
use super::{
    LocalChangesDecision, Notifier, OperationHost, OperationKind, OperationResult, Outcome, Repo,
    WorkingTreeScope,
};

/// Factory for the saver used by smart retries; the policy decision
/// (stash vs shelve) stays with the caller.
pub type SaverFactory<'a> = &'a (dyn Fn() -> Box<dyn ChangesSaver> + Send + Sync);

/// A reset of several repositories to one target.
#[derive(Debug, Clone)]
pub struct ResetRequest {
    pub mode: ResetMode,
    pub target: String,
    pub repos: Vec<Repo>,
}

/// Everything a finished reset pass reports back.
#[derive(Debug)]
pub struct ResetRun {
    pub outcome: Outcome,
    pub results: BTreeMap<String, OperationResult>,
}

/// Drives `git reset` across repositories sequentially, with the
/// smart-retry fallback when local changes block a repository.
pub struct ResetExecutor<'a> {
    runner: &'a dyn GitRunner,
    host: &'a dyn OperationHost,
    notifier: &'a dyn Notifier,
    new_saver: SaverFactory<'a>,
    token: CancellationToken,
}

impl<'a> ResetExecutor<'a> {
    pub fn new(
        runner: &'a dyn GitRunner,
        host: &'a dyn OperationHost,
        notifier: &'a dyn Notifier,
        new_saver: SaverFactory<'a>,
        token: CancellationToken,
    ) -> Self {
        Self {
            runner,
            host,
            notifier,
            new_saver,
            token,
        }
    }

    /// Runs the whole pass. Per-repository failures never abort the loop
    /// over the remaining repositories; cancellation does, leaving
    /// partial results intact without a verdict notification.
    ///
    /// # Errors
    ///
    /// Only infrastructure failures (unspawnable git) are errors.
    pub async fn execute(&self, request: &ResetRequest) -> Result<ResetRun> {
        self.host.save_all_documents();
        let _scope = WorkingTreeScope::enter(self.host);

        let mut results = BTreeMap::new();
        let mut cancelled = false;

        for repo in &request.repos {
            if self.token.is_cancelled() {
                cancelled = true;
                break;
            }

            info!(repo = %repo, mode = %request.mode, target = %request.target, "resetting");
            let result = self.reset_repo(repo, request.mode, &request.target).await?;
            let interrupted = result.command.is_interrupted();

            // even a failed reset may have touched the tree
            self.host.refresh_repository(repo);
            results.insert(repo.name().to_string(), result);

            if interrupted {
                cancelled = true;
                break;
            }
        }

        if cancelled {
            info!("reset cancelled; partial results stand");
            return Ok(ResetRun {
                outcome: Outcome::Cancelled,
                results,
            });
        }

        let notification = report::consolidated("Reset", &results);
        report::emit(self.notifier, &notification);

        let outcome = if results.values().all(|r| r.command.success()) {
            Outcome::Succeeded
        } else {
            Outcome::Failed
        };
        Ok(ResetRun { outcome, results })
    }

    /// One repository step, including the Smart/Force/Cancel fallback.
    async fn reset_repo(
        &self,
        repo: &Repo,
        mode: ResetMode,
        target: &str,
    ) -> Result<OperationResult> {
        let result = self.run_reset(repo, mode, target).await?;
        let (command, detector) = result;

        if command.success() || command.is_interrupted() {
            return Ok(OperationResult::plain(command));
        }

        if !detector.was_message_detected() {
            return Ok(OperationResult::plain(command));
        }

        let paths = detector.relative_file_paths().to_vec();
        warn!(repo = %repo, blocked_files = paths.len(), "local changes block the reset");

        let decision =
            self.host
                .select_local_changes_action(repo, &paths, "reset", "Hard Reset");

        let command = match decision {
            LocalChangesDecision::Smart => self.smart_retry(repo, mode, target).await?,
            LocalChangesDecision::Force => {
                info!(repo = %repo, "force reset, discarding local changes");
                self.run_reset(repo, ResetMode::Hard, target).await?.0
            }
            LocalChangesDecision::Cancel => command,
        };

        Ok(OperationResult {
            command,
            blocking_paths: paths,
        })
    }

    /// Save, retry, restore. The restore runs unconditionally, even
    /// when the retry itself errors out.
    async fn smart_retry(
        &self,
        repo: &Repo,
        mode: ResetMode,
        target: &str,
    ) -> Result<GitCommandResult> {
        let mut saver = (self.new_saver)();

        if let Err(e) = saver
            .save_local_changes(std::slice::from_ref(repo))
            .await
        {
            // distinct from a command failure: the reset was never run
            self.notifier
                .notify_error("Couldn't save uncommitted changes", &e.to_string());
            return Ok(GitCommandResult::new(
                false,
                -1,
                Vec::new(),
                vec![e.to_string()],
                false,
            ));
        }

        let retry = self.run_reset(repo, mode, target).await;

        if let Err(e) = saver.load(self.host).await {
            self.notifier
                .notify_warning("Local changes were not restored", &e.to_string());
        }

        retry.map(|(command, _)| command)
    }

    async fn run_reset(
        &self,
        repo: &Repo,
        mode: ResetMode,
        target: &str,
    ) -> Result<(GitCommandResult, OverwriteDetector)> {
        let mut detector = OverwriteDetector::new(repo.root(), OperationKind::Reset);
        let args: Vec<String> = vec![
            "reset".to_string(),
            mode.as_flag().to_string(),
            target.to_string(),
        ];
        let command = self
            .runner
            .run(repo.root(), &args, &mut [&mut detector], &self.token)
            .await?;
        Ok((command, detector))
    }
}
