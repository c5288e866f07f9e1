// armada: Multi-Repository Git Operation Orchestrator
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Multi-repository operation core.
//!
//! # Architecture
//!
//! ```text
//! ResetExecutor / RebaseExecutor
//!      |
//!      +--> RebaseSpec (copy-on-write statuses, initial positions)
//!      +--> GitRunner  (one git command per repository step)
//!      |       '--> OverwriteDetector (line listener)
//!      +--> ChangesSaver (stash / shelve fallback)
//!      +--> OperationHost (Smart/Force/Cancel decision, rescan pause)
//!      +--> Notifier (ONE consolidated notification per operation)
//!
//! Repositories are processed strictly sequentially; a failure in one
//! never prevents attempting the rest. Cancellation is checked before
//! every repository step and surfaces as Outcome::Cancelled, never as
//! an error.
//! ```

pub mod detector;
pub mod rebase;
pub mod report;
pub mod reset;
pub mod saver;
pub mod spec;


use std::path::{Path, PathBuf};

use crate::git::GitCommandResult;

/// Handle to one managed working tree.
///
/// Deliberately small: everything stateful (current branch, head, rebase
/// markers) is queried live when needed, never cached here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repo {
    root: PathBuf,
    name: String,
}

impl Repo {
    /// Creates a handle for the working tree at `root`. The display name
    /// is the final path component.
    pub fn at(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let name = root
            .file_name()
            .map_or_else(|| root.display().to_string(), |n| n.to_string_lossy().into_owned());
        Self { root, name }
    }

    /// The working-tree root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The display name (stable sort key across the whole core).
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl std::fmt::Display for Repo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

impl PartialOrd for Repo {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Repo {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.name
            .cmp(&other.name)
            .then_with(|| self.root.cmp(&other.root))
    }
}

/// Live probe for on-disk rebase state.
///
/// A seam so executors and specs can be exercised without real
/// repositories; production code uses [`LiveStateProbe`].
pub trait RebaseStateProbe: Send + Sync {
    /// Whether a rebase is physically in progress in the working tree.
    fn is_rebase_in_progress(&self, repo: &Repo) -> bool;
}

/// Probe backed by the repository's on-disk rebase markers.
#[derive(Debug, Clone, Copy, Default)]
pub struct LiveStateProbe;

impl RebaseStateProbe for LiveStateProbe {
    fn is_rebase_in_progress(&self, repo: &Repo) -> bool {
        crate::git::query::is_rebase_in_progress(repo.root())
    }
}

/// Terminal verdict of a whole multi-repository operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Every repository finished successfully.
    Succeeded,
    /// The operation is paused mid-way in one repository (rebase
    /// conflicts); resolve and resume.
    Suspended,
    /// At least one repository failed; the rest were still attempted.
    Failed,
    /// The operator cancelled; partial results stand, nothing is rolled
    /// back automatically.
    Cancelled,
}

/// Git operation family a detector is scanning for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    Reset,
    Rebase,
    Merge,
    Checkout,
}

impl OperationKind {
    /// Lower-case name used in messages.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Reset => "reset",
            Self::Rebase => "rebase",
            Self::Merge => "merge",
            Self::Checkout => "checkout",
        }
    }
}

/// What the operator chose to do about blocking local changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocalChangesDecision {
    /// Save the changes, retry the operation, restore afterwards.
    Smart,
    /// Discard the changes (`reset --hard`) and retry.
    Force,
    /// Leave the repository alone; the original failure stands.
    Cancel,
}

/// Host seam: the handful of callbacks the core delegates to whatever
/// frontend binds it (CLI here, anything richer elsewhere). All methods
/// except the decision points have do-nothing defaults.
pub trait OperationHost: Send + Sync {
    /// Flush pending in-memory edits to disk before the first git
    /// command runs.
    fn save_all_documents(&self) {}

    /// Stop reactive working-tree rescanning for the duration of the
    /// operation.
    fn pause_auto_rescan(&self) {}

    /// Resume reactive rescanning; always paired with
    /// [`Self::pause_auto_rescan`].
    fn resume_auto_rescan(&self) {}

    /// A repository step finished (successfully or not); its working
    /// tree may have changed.
    fn refresh_repository(&self, repo: &Repo) {
        let _ = repo;
    }

    /// The single human decision point: what to do when `paths` in
    /// `repo` block the operation.
    fn select_local_changes_action(
        &self,
        repo: &Repo,
        paths: &[String],
        operation: &str,
        force_label: &str,
    ) -> LocalChangesDecision;

    /// Restoring saved changes produced conflicts. Blocks until they are
    /// resolved (true) or abandoned (false). Titles name the two sides;
    /// hosts may reword them.
    fn resolve_restore_conflicts(&self, repo: &Repo, ours_title: &str, theirs_title: &str)
    -> bool;
}

/// Fire-and-forget notification sink.
pub trait Notifier: Send + Sync {
    fn notify_success(&self, title: &str, body: &str);
    fn notify_warning(&self, title: &str, body: &str);
    fn notify_error(&self, title: &str, body: &str);
}

/// Per-repository outcome of one operation step.
#[derive(Debug, Clone, Default)]
pub struct OperationResult {
    /// The final git command result for this repository.
    pub command: GitCommandResult,
    /// Relative paths of local changes that blocked the operation, when
    /// the detector recognized that failure mode.
    pub blocking_paths: Vec<String>,
}

impl OperationResult {
    /// Result without a detection payload.
    #[must_use]
    pub const fn plain(command: GitCommandResult) -> Self {
        Self {
            command,
            blocking_paths: Vec::new(),
        }
    }

    /// The error text used for grouping in reports.
    #[must_use]
    pub fn error_text(&self) -> String {
        self.command.error_text()
    }
}

/// RAII scope signalling the host to pause reactive rescanning while the
/// multi-repository loop runs. Release is unconditional.
pub struct WorkingTreeScope<'a> {
    host: &'a dyn OperationHost,
}

impl<'a> WorkingTreeScope<'a> {
    pub fn enter(host: &'a dyn OperationHost) -> Self {
        host.pause_auto_rescan();
        Self { host }
    }
}

impl Drop for WorkingTreeScope<'_> {
    fn drop(&mut self) {
        self.host.resume_auto_rescan();
    }
}
