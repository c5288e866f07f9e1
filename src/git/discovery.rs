// armada: Multi-Repository Git Operation Orchestrator
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Git repository discovery.
//!
//! ```text
//! workspace/
//!   backend/     (included if git repo)
//!   frontend/    (included)
//!   docs/        (skipped, not a repo)
//!   .cache/      (skipped, hidden)
//! ```
//!
//! Returns sorted list of repo paths for deterministic ordering.

use crate::error::Result;
use anyhow::Context;
use std::path::{Path, PathBuf};

use super::query::is_git_repo;

/// Discover the git working trees directly beneath `workspace`.
///
/// The workspace itself is included when it is a repository and none of
/// its children are (single-repo layout). Hidden directories are skipped.
///
/// # Errors
///
/// Returns an error if the workspace directory cannot be read.
pub fn discover_repositories(workspace: &Path) -> Result<Vec<PathBuf>> {
    let mut repos = Vec::new();

    for entry in std::fs::read_dir(workspace)
        .with_context(|| format!("failed to read {}", workspace.display()))?
    {
        let entry =
            entry.with_context(|| format!("failed to read entry in {}", workspace.display()))?;
        let path = entry.path();

        // Skip non-directories
        if !path.is_dir() {
            continue;
        }

        // Skip hidden directories (starting with '.')
        if let Some(name) = path.file_name().and_then(|n| n.to_str())
            && name.starts_with('.')
        {
            continue;
        }

        // A `.git` entry distinguishes a working-tree root from a plain
        // subdirectory of the workspace repo (discovery walks upward).
        if path.join(".git").exists() && is_git_repo(&path) {
            repos.push(path);
        }
    }

    if repos.is_empty() && workspace.join(".git").exists() && is_git_repo(workspace) {
        repos.push(workspace.to_path_buf());
    }

    // Sort for determinism (BTreeMap ordering)
    repos.sort();
    Ok(repos)
}
