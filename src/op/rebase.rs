// armada: Multi-Repository Git Operation Orchestrator
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Multi-repository rebase execution.
//!
//! ```text
//! execute(spec)                 validate -> save dirty roots -> drive
//! resume(spec, Continue|Skip)   validate -> drive (suspended repo first)
//! abort(spec, rollback)         rebase --abort, opt-in reset --hard to
//!                               the snapshotted initial heads
//!
//! drive: one repository at a time
//!   success                          -> Success, next repo
//!   blocked by local changes         -> save + retry once
//!   failed, rebase left in progress  -> Suspended, STOP (conflicts
//!                                       must be resolved before any
//!                                       other repository is attempted)
//!   failed otherwise                 -> Error, next repo
//! ```

use std::collections::BTreeMap;

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::error::{OpError, Result};
use crate::git::runner::GitRunner;
use crate::git::GitCommandResult;

use super::detector::OverwriteDetector;
use super::report;
use super::saver::ChangesSaver;
use super::spec::{RebaseSpec, RepoStatus};
use super::{
    Notifier, OperationHost, OperationKind, OperationResult, Outcome, RebaseStateProbe, Repo,
    WorkingTreeScope,
};

/// How to move a suspended rebase forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResumeAction {
    /// `git rebase --continue` after resolving conflicts.
    Continue,
    /// `git rebase --skip` the conflicting commit.
    Skip,
}

impl ResumeAction {
    const fn as_flag(self) -> &'static str {
        match self {
            Self::Continue => "--continue",
            Self::Skip => "--skip",
        }
    }
}

/// Everything a finished (or suspended) rebase pass reports back.
#[derive(Debug)]
pub struct RebaseRun {
    pub outcome: Outcome,
    /// The final copy-on-write snapshot, statuses included.
    pub spec: RebaseSpec,
    pub results: BTreeMap<String, OperationResult>,
}

/// Drives a [`RebaseSpec`] across its repositories sequentially.
pub struct RebaseExecutor<'a> {
    runner: &'a dyn GitRunner,
    host: &'a dyn OperationHost,
    notifier: &'a dyn Notifier,
    probe: &'a dyn RebaseStateProbe,
    token: CancellationToken,
}

impl<'a> RebaseExecutor<'a> {
    pub fn new(
        runner: &'a dyn GitRunner,
        host: &'a dyn OperationHost,
        notifier: &'a dyn Notifier,
        probe: &'a dyn RebaseStateProbe,
        token: CancellationToken,
    ) -> Self {
        Self {
            runner,
            host,
            notifier,
            probe,
            token,
        }
    }

    /// Starts (or restarts) the rebase described by `spec`.
    ///
    /// # Errors
    ///
    /// An invalid spec is fatal and never silently patched. Otherwise
    /// only infrastructure failures are errors; per-repository outcomes
    /// land in the returned [`RebaseRun`].
    pub async fn execute(
        &self,
        spec: RebaseSpec,
        saver: &mut dyn ChangesSaver,
    ) -> Result<RebaseRun> {
        spec.validate(self.probe)?;
        self.host.save_all_documents();
        let _scope = WorkingTreeScope::enter(self.host);

        if spec.should_be_saved() {
            let dirty = Self::dirty_roots(&spec);
            if !dirty.is_empty()
                && let Err(e) = saver.save_local_changes(&dirty).await
            {
                // distinct from a command failure: nothing was rebased
                self.notifier
                    .notify_error("Couldn't save uncommitted changes", &e.to_string());
                return Ok(RebaseRun {
                    outcome: Outcome::Failed,
                    spec,
                    results: BTreeMap::new(),
                });
            }
        }

        self.drive(spec, saver, None).await
    }

    /// Moves a suspended rebase forward, then proceeds with the
    /// remaining repositories.
    ///
    /// # Errors
    ///
    /// Fails on an invalid spec, or when the spec has nothing suspended.
    pub async fn resume(
        &self,
        spec: RebaseSpec,
        saver: &mut dyn ChangesSaver,
        action: ResumeAction,
    ) -> Result<RebaseRun> {
        spec.validate(self.probe)?;
        if spec.suspended_repository().is_none() {
            return Err(OpError::InvalidSpec {
                reason: "no suspended rebase to resume".to_string(),
            }
            .into());
        }
        self.host.save_all_documents();
        let _scope = WorkingTreeScope::enter(self.host);

        self.drive(spec, saver, Some(action)).await
    }

    /// Aborts a suspended rebase. With `rollback`, every already
    /// rebased repository is also hard-reset to its snapshotted initial
    /// head. Explicit opt-in, never automatic.
    ///
    /// # Errors
    ///
    /// Only infrastructure failures are errors.
    pub async fn abort(&self, spec: &RebaseSpec, rollback: bool) -> Result<Outcome> {
        let _scope = WorkingTreeScope::enter(self.host);

        if let Some(repo) = spec.suspended_repository() {
            info!(repo = %repo, "aborting rebase");
            let result = self.run_step(repo, &["rebase", "--abort"]).await?.0;
            self.host.refresh_repository(repo);
            if !result.command.success() {
                self.notifier
                    .notify_error("Rebase abort failed", &result.error_text());
                return Ok(Outcome::Failed);
            }
        }

        let mut failures = Vec::new();
        if rollback {
            for (name, head) in spec.head_positions_to_rollback() {
                let Some(repo) = spec.repos().find(|r| r.name() == name) else {
                    continue;
                };
                info!(repo = %repo, head = %head, "rolling back to pre-rebase position");
                let result = self
                    .run_step(repo, &["reset", "--hard", head.as_str()])
                    .await?
                    .0;
                self.host.refresh_repository(repo);
                if !result.command.success() {
                    failures.push(format!("{name}: {}", result.error_text()));
                }
            }
        }

        if failures.is_empty() {
            self.notifier.notify_success("Rebase aborted", "");
            Ok(Outcome::Succeeded)
        } else {
            self.notifier
                .notify_error("Rollback failed", &failures.join("\n"));
            Ok(Outcome::Failed)
        }
    }

    /// The sequential repository loop shared by execute and resume.
    async fn drive(
        &self,
        mut spec: RebaseSpec,
        saver: &mut dyn ChangesSaver,
        resume: Option<ResumeAction>,
    ) -> Result<RebaseRun> {
        let mut results: BTreeMap<String, OperationResult> = BTreeMap::new();
        let mut cancelled = false;
        let mut suspended_in: Option<String> = None;

        for repo in spec.incomplete_repositories() {
            if self.token.is_cancelled() {
                cancelled = true;
                break;
            }

            let was_suspended = spec.status_of(repo.name()) == Some(RepoStatus::Suspended);
            let args: Vec<String> = if was_suspended {
                let action = resume.unwrap_or(ResumeAction::Continue);
                vec!["rebase".to_string(), action.as_flag().to_string()]
            } else if let Some(params) = spec.params() {
                params.to_args()
            } else {
                return Err(OpError::InvalidSpec {
                    reason: format!(
                        "repository '{}' has not started but the spec has no parameters",
                        repo.name()
                    ),
                }
                .into());
            };

            info!(repo = %repo, args = ?args, "rebasing");
            let args_refs: Vec<&str> = args.iter().map(String::as_str).collect();
            let (mut result, mut detector) = self.run_step(&repo, &args_refs).await?;

            // blocked by local changes: save this root and retry once
            if !result.command.success()
                && !result.command.is_interrupted()
                && detector.was_message_detected()
                && spec.should_be_saved()
                && !was_suspended
            {
                warn!(repo = %repo, "local changes block the rebase, saving and retrying");
                if let Err(e) = saver.save_local_changes(std::slice::from_ref(&repo)).await {
                    self.notifier
                        .notify_error("Couldn't save uncommitted changes", &e.to_string());
                    result = OperationResult::plain(GitCommandResult::new(
                        false,
                        -1,
                        Vec::new(),
                        vec![e.to_string()],
                        false,
                    ));
                } else {
                    let retried = self.run_step(&repo, &args_refs).await?;
                    result = retried.0;
                    detector = retried.1;
                }
            }

            let paths = detector.relative_file_paths().to_vec();
            let interrupted = result.command.is_interrupted();
            let success = result.command.success();
            self.host.refresh_repository(&repo);
            results.insert(
                repo.name().to_string(),
                OperationResult {
                    command: result.command,
                    blocking_paths: paths,
                },
            );

            if interrupted {
                cancelled = true;
                break;
            }

            if success {
                spec = spec.with_status(repo.name(), RepoStatus::Success);
            } else if self.probe.is_rebase_in_progress(&repo) {
                // conflicts left the repository mid-rebase: nothing else
                // may be attempted until this one is resolved
                spec = spec.with_status(repo.name(), RepoStatus::Suspended);
                suspended_in = Some(repo.name().to_string());
                break;
            } else {
                spec = spec.with_status(repo.name(), RepoStatus::Error);
            }
        }

        self.conclude(spec, saver, results, cancelled, suspended_in)
            .await
    }

    /// Final verdict, restore, and the one consolidated notification.
    async fn conclude(
        &self,
        spec: RebaseSpec,
        saver: &mut dyn ChangesSaver,
        results: BTreeMap<String, OperationResult>,
        cancelled: bool,
        suspended_in: Option<String>,
    ) -> Result<RebaseRun> {
        if cancelled {
            info!("rebase cancelled; partial results stand");
            // restore only when no tree was left mid-rebase
            if saver.were_changes_saved() {
                if spec.repos().any(|r| self.probe.is_rebase_in_progress(r)) {
                    saver.notify_local_changes_not_restored(self.notifier);
                } else if let Err(e) = saver.load(self.host).await {
                    self.notifier
                        .notify_warning("Local changes were not restored", &e.to_string());
                }
            }
            return Ok(RebaseRun {
                outcome: Outcome::Cancelled,
                spec,
                results,
            });
        }

        if let Some(repo_name) = suspended_in {
            let remaining = spec
                .incomplete_repositories()
                .iter()
                .filter(|r| r.name() != repo_name)
                .count();
            report::emit(self.notifier, &report::suspended(&repo_name, remaining));
            if saver.were_changes_saved() {
                saver.notify_local_changes_not_restored(self.notifier);
            }
            return Ok(RebaseRun {
                outcome: Outcome::Suspended,
                spec,
                results,
            });
        }

        if saver.were_changes_saved()
            && let Err(e) = saver.load(self.host).await
        {
            self.notifier
                .notify_warning("Local changes were not restored", &e.to_string());
        }

        let notification = report::consolidated("Rebase", &results);
        report::emit(self.notifier, &notification);

        let outcome = if results.values().all(|r| r.command.success()) {
            Outcome::Succeeded
        } else {
            Outcome::Failed
        };
        Ok(RebaseRun {
            outcome,
            spec,
            results,
        })
    }

    async fn run_step(
        &self,
        repo: &Repo,
        args: &[&str],
    ) -> Result<(OperationResult, OverwriteDetector)> {
        let mut detector = OverwriteDetector::new(repo.root(), OperationKind::Rebase);
        let args: Vec<String> = args.iter().map(ToString::to_string).collect();
        let command = self
            .runner
            .run(repo.root(), &args, &mut [&mut detector], &self.token)
            .await?;
        Ok((OperationResult::plain(command), detector))
    }

    /// Roots among the incomplete repositories with uncommitted changes.
    fn dirty_roots(spec: &RebaseSpec) -> Vec<Repo> {
        spec.incomplete_repositories()
            .into_iter()
            .filter(|repo| {
                crate::git::query::has_uncommitted_changes(repo.root()).unwrap_or(false)
            })
            .collect()
    }
}
