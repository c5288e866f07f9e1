// armada: Multi-Repository Git Operation Orchestrator
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Git query operations using gix.
//!
//! ```text
//! query.rs --> gix --> .git/ (no subprocess)
//! ```
//!
//! Read-only operations only; every mutation goes through
//! [`crate::git::runner::GitRunner`].

use crate::error::{ArmadaResult, GitError, GixError};
use std::path::{Path, PathBuf};

#[must_use]
pub fn is_git_repo(path: &Path) -> bool {
    gix::discover(path).is_ok()
}

/// Locate the git directory for the working tree at `path`.
///
/// # Errors
///
/// Returns a `GitError` if repository discovery fails.
pub fn git_dir(path: &Path) -> ArmadaResult<PathBuf> {
    let repo = gix::discover(path).map_err(|e| GitError::Gix(GixError::Discover(Box::new(e))))?;
    Ok(repo.git_dir().to_path_buf())
}

/// Check whether a rebase is physically in progress in the working tree.
///
/// Queried live from the same on-disk markers git itself maintains:
/// `rebase-merge/` (interactive and merge-backed rebases) and
/// `rebase-apply/` (am-backed rebases). A repository that cannot even be
/// discovered is reported as not rebasing.
#[must_use]
pub fn is_rebase_in_progress(path: &Path) -> bool {
    git_dir(path).is_ok_and(|dir| {
        dir.join("rebase-merge").exists() || dir.join("rebase-apply").exists()
    })
}

/// Get current branch name (None if HEAD is detached).
///
/// # Errors
///
/// Returns a `GitError` if repository discovery or head resolution fails.
pub fn current_branch(path: &Path) -> ArmadaResult<Option<String>> {
    let repo = gix::discover(path).map_err(|e| GitError::Gix(GixError::Discover(Box::new(e))))?;
    let head = repo
        .head_name()
        .map_err(|e| GitError::Gix(GixError::Head(e)))?;
    Ok(head.map(|name| name.shorten().to_string()))
}

/// Check for uncommitted changes (staged, unstaged, or untracked files).
///
/// # Errors
///
/// Returns a `GitError` if repository discovery or status check fails.
pub fn has_uncommitted_changes(path: &Path) -> ArmadaResult<bool> {
    use gix::status::UntrackedFiles;

    let repo = gix::discover(path).map_err(|e| GitError::Gix(GixError::Discover(Box::new(e))))?;

    let has_changes = repo
        .status(gix::progress::Discard)
        .map_err(|_| GitError::CommandFailed {
            command: "status".to_string(),
            message: "failed to prepare status check".to_string(),
        })?
        .untracked_files(UntrackedFiles::Files)
        .into_iter(None)
        .map_err(|_| GitError::CommandFailed {
            command: "status".to_string(),
            message: "failed to check repository status".to_string(),
        })?
        .next()
        .is_some();

    Ok(has_changes)
}

/// Check for stashed changes.
///
/// # Errors
///
/// Returns a `GitError` if repository discovery or reference lookup fails.
pub fn has_stashed_changes(path: &Path) -> ArmadaResult<bool> {
    let repo = gix::discover(path).map_err(|e| GitError::Gix(GixError::Discover(Box::new(e))))?;

    // refs/stash exists iff there are stashed changes
    match repo.find_reference("refs/stash") {
        Ok(_) => Ok(true),
        Err(gix::reference::find::existing::Error::NotFound { name: _ }) => Ok(false),
        Err(e) => Err(GitError::Gix(GixError::Head(e)).into()),
    }
}
