// armada: Multi-Repository Git Operation Orchestrator
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Setting aside and restoring uncommitted changes around an operation.
//!
//! ```text
//! ChangesSaver            EMPTY -> SAVED -> RESTORING -> RESTORED
//!   StashSaver            git stash push -m <msg> / git stash pop
//!   ShelveSaver           git diff --binary HEAD > .git/armada-shelf-*.patch
//!                         git reset --hard  /  git apply --3way
//! ```
//!
//! `load()` is idempotent: a second call is a warn-logged no-op, enforced
//! by a single atomic flag. Restore conflicts block on the host's
//! resolver and are never discarded silently; a declined resolution
//! leaves the saved entry in place for manual recovery.

use chrono::Local;
use futures_util::future::BoxFuture;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::types::SavePolicy;
use crate::error::{OpError, Result};
use crate::git::query;
use crate::git::runner::{GitRunner, run_git};

use super::{Notifier, OperationHost, Repo};

/// Lifecycle of a saver's single saved entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SaverState {
    #[default]
    Empty,
    Saved,
    Restoring,
    Restored,
}

/// Sets local modifications aside before an operation and restores them
/// afterwards. Owns at most one saved entry.
pub trait ChangesSaver: Send {
    /// Which strategy this saver implements.
    fn policy(&self) -> SavePolicy;

    /// Current lifecycle state.
    fn state(&self) -> SaverState;

    /// Whether anything was actually saved.
    fn were_changes_saved(&self) -> bool;

    /// Saves local modifications in the given roots.
    ///
    /// Roots with nothing to save are skipped. A failing save aborts the
    /// whole attempt with `OpError::SaveFailed`; the operation must not
    /// run against a tree the saver couldn't prepare.
    fn save_local_changes<'a>(&'a mut self, roots: &'a [Repo]) -> BoxFuture<'a, Result<()>>;

    /// Restores previously saved changes across all saved roots.
    ///
    /// Conflicts go through `host.resolve_restore_conflicts`, blocking
    /// until the operator finishes or declines. Idempotent: a repeated
    /// call is a no-op.
    fn load<'a>(&'a mut self, host: &'a dyn OperationHost) -> BoxFuture<'a, Result<()>>;

    /// Explicit escape hatch when the caller decides not to restore; the
    /// saved entry stays discoverable for manual recovery.
    fn notify_local_changes_not_restored(&self, notifier: &dyn Notifier);
}

/// Builds the saver matching the configured policy.
#[must_use]
pub fn saver_for_policy(
    policy: SavePolicy,
    runner: Arc<dyn GitRunner>,
    operation: &str,
    destination: &str,
    token: CancellationToken,
) -> Box<dyn ChangesSaver> {
    match policy {
        SavePolicy::Stash => Box::new(StashSaver::new(runner, operation, destination, token)),
        SavePolicy::Shelve => Box::new(ShelveSaver::new(runner, operation, destination, token)),
    }
}

// --- StashSaver ---

/// Saver backed by the repository stash.
pub struct StashSaver {
    runner: Arc<dyn GitRunner>,
    token: CancellationToken,
    message: String,
    destination: String,
    stashed_roots: Vec<Repo>,
    state: SaverState,
    loaded: AtomicBool,
}

impl StashSaver {
    #[must_use]
    pub fn new(
        runner: Arc<dyn GitRunner>,
        operation: &str,
        destination: &str,
        token: CancellationToken,
    ) -> Self {
        let stamp = Local::now().format("%d/%m/%Y, %H:%M");
        Self {
            runner,
            token,
            message: format!("Uncommitted changes before {operation} at {stamp}"),
            destination: destination.to_string(),
            stashed_roots: Vec::new(),
            state: SaverState::Empty,
            loaded: AtomicBool::new(false),
        }
    }

    /// The stash message identifying this saver's entries.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl ChangesSaver for StashSaver {
    fn policy(&self) -> SavePolicy {
        SavePolicy::Stash
    }

    fn state(&self) -> SaverState {
        self.state
    }

    fn were_changes_saved(&self) -> bool {
        !self.stashed_roots.is_empty()
    }

    fn save_local_changes<'a>(&'a mut self, roots: &'a [Repo]) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            for repo in roots {
                info!(repo = %repo, "stashing local changes");
                let result = run_git(
                    self.runner.as_ref(),
                    repo.root(),
                    &["stash", "push", "-m", &self.message],
                    &self.token,
                )
                .await?;

                if !result.success() {
                    return Err(OpError::SaveFailed {
                        root: repo.name().to_string(),
                        message: result.error_text(),
                    }
                    .into());
                }
                if result.output_contains("No local changes to save") {
                    debug!(repo = %repo, "nothing to stash");
                    continue;
                }
                self.stashed_roots.push(repo.clone());
            }
            if self.were_changes_saved() {
                self.state = SaverState::Saved;
            }
            Ok(())
        })
    }

    fn load<'a>(&'a mut self, host: &'a dyn OperationHost) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            if self.loaded.swap(true, Ordering::SeqCst) {
                warn!("local changes have already been restored, skipping");
                return Ok(());
            }
            self.state = SaverState::Restoring;

            for repo in &self.stashed_roots {
                info!(repo = %repo, "restoring stashed changes");
                let result =
                    run_git(self.runner.as_ref(), repo.root(), &["stash", "pop"], &self.token)
                        .await?;

                if result.success() {
                    continue;
                }

                if result.output_contains("CONFLICT") || result.output_contains("conflict") {
                    let resolved = host.resolve_restore_conflicts(
                        repo,
                        "Uncommitted changes from stash",
                        &format!("Changes from {}", self.destination),
                    );
                    if resolved {
                        // pop keeps the entry on conflict; drop it now
                        // that the operator finished merging
                        let _ = run_git(
                            self.runner.as_ref(),
                            repo.root(),
                            &["stash", "drop"],
                            &self.token,
                        )
                        .await;
                        continue;
                    }
                    return Err(OpError::NotRestored {
                        root: repo.name().to_string(),
                        message: "restore conflicts were not resolved; the stash entry is kept"
                            .to_string(),
                    }
                    .into());
                }

                return Err(OpError::NotRestored {
                    root: repo.name().to_string(),
                    message: result.error_text(),
                }
                .into());
            }

            self.state = SaverState::Restored;
            Ok(())
        })
    }

    fn notify_local_changes_not_restored(&self, notifier: &dyn Notifier) {
        if !self.were_changes_saved() {
            return;
        }
        let roots: Vec<&str> = self.stashed_roots.iter().map(Repo::name).collect();
        notifier.notify_warning(
            "Local changes were not restored",
            &format!(
                "Uncommitted changes were saved to the stash as \"{}\" in: {}. \
                 Restore them with `git stash pop` when ready.",
                self.message,
                roots.join(", ")
            ),
        );
    }
}

// --- ShelveSaver ---

/// Saver backed by binary patch files kept under each repository's git
/// directory.
pub struct ShelveSaver {
    runner: Arc<dyn GitRunner>,
    token: CancellationToken,
    operation: String,
    destination: String,
    file_stamp: String,
    patches: Vec<(Repo, PathBuf)>,
    state: SaverState,
    loaded: AtomicBool,
}

impl ShelveSaver {
    #[must_use]
    pub fn new(
        runner: Arc<dyn GitRunner>,
        operation: &str,
        destination: &str,
        token: CancellationToken,
    ) -> Self {
        Self {
            runner,
            token,
            operation: operation.to_string(),
            destination: destination.to_string(),
            file_stamp: Local::now().format("%Y%m%d-%H%M%S").to_string(),
            patches: Vec::new(),
            state: SaverState::Empty,
            loaded: AtomicBool::new(false),
        }
    }

    /// Patch files created by this saver.
    #[must_use]
    pub fn patch_files(&self) -> Vec<&PathBuf> {
        self.patches.iter().map(|(_, path)| path).collect()
    }
}

impl ChangesSaver for ShelveSaver {
    fn policy(&self) -> SavePolicy {
        SavePolicy::Shelve
    }

    fn state(&self) -> SaverState {
        self.state
    }

    fn were_changes_saved(&self) -> bool {
        !self.patches.is_empty()
    }

    fn save_local_changes<'a>(&'a mut self, roots: &'a [Repo]) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            for repo in roots {
                let save_failed = |message: String| OpError::SaveFailed {
                    root: repo.name().to_string(),
                    message,
                };

                let diff = run_git(
                    self.runner.as_ref(),
                    repo.root(),
                    &["diff", "--binary", "HEAD"],
                    &self.token,
                )
                .await?;
                if !diff.success() {
                    return Err(save_failed(diff.error_text()).into());
                }
                if diff.stdout().is_empty() {
                    debug!(repo = %repo, "nothing to shelve");
                    continue;
                }

                let git_dir = query::git_dir(repo.root())
                    .map_err(|e| save_failed(e.to_string()))?;
                let patch_path = git_dir.join(format!(
                    "armada-shelf-{}-{}.patch",
                    self.operation, self.file_stamp
                ));
                let mut content = diff.stdout().join("\n");
                content.push('\n');
                std::fs::write(&patch_path, content)
                    .map_err(|e| save_failed(format!("couldn't write patch: {e}")))?;

                info!(repo = %repo, patch = %patch_path.display(), "shelved local changes");

                let reset = run_git(
                    self.runner.as_ref(),
                    repo.root(),
                    &["reset", "--hard"],
                    &self.token,
                )
                .await?;
                if !reset.success() {
                    return Err(save_failed(reset.error_text()).into());
                }

                self.patches.push((repo.clone(), patch_path));
            }
            if self.were_changes_saved() {
                self.state = SaverState::Saved;
            }
            Ok(())
        })
    }

    fn load<'a>(&'a mut self, host: &'a dyn OperationHost) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            if self.loaded.swap(true, Ordering::SeqCst) {
                warn!("local changes have already been restored, skipping");
                return Ok(());
            }
            self.state = SaverState::Restoring;

            for (repo, patch) in &self.patches {
                info!(repo = %repo, patch = %patch.display(), "restoring shelved changes");
                let patch_arg = patch.display().to_string();
                let result = run_git(
                    self.runner.as_ref(),
                    repo.root(),
                    &["apply", "--3way", &patch_arg],
                    &self.token,
                )
                .await?;

                if result.success() {
                    let _ = std::fs::remove_file(patch);
                    continue;
                }

                if result.output_contains("conflict") {
                    let resolved = host.resolve_restore_conflicts(
                        repo,
                        "Uncommitted changes from shelf",
                        &format!("Changes from {}", self.destination),
                    );
                    if resolved {
                        let _ = std::fs::remove_file(patch);
                        continue;
                    }
                    return Err(OpError::NotRestored {
                        root: repo.name().to_string(),
                        message: format!(
                            "restore conflicts were not resolved; the patch is kept at {}",
                            patch.display()
                        ),
                    }
                    .into());
                }

                return Err(OpError::NotRestored {
                    root: repo.name().to_string(),
                    message: result.error_text(),
                }
                .into());
            }

            self.state = SaverState::Restored;
            Ok(())
        })
    }

    fn notify_local_changes_not_restored(&self, notifier: &dyn Notifier) {
        if !self.were_changes_saved() {
            return;
        }
        let files: Vec<String> = self
            .patches
            .iter()
            .map(|(repo, patch)| format!("{}: {}", repo.name(), patch.display()))
            .collect();
        notifier.notify_warning(
            "Local changes were not restored",
            &format!(
                "Uncommitted changes were shelved before the {}. \
                 Apply them with `git apply --3way <patch>`:\n{}",
                self.operation,
                files.join("\n")
            ),
        );
    }
}
