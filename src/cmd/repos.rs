// armada: Multi-Repository Git Operation Orchestrator
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Repos command implementation: list the managed repositories.

use crate::config::Config;
use crate::error::Result;
use crate::git::query;

use super::resolve_repos;

/// Prints every managed repository with its current branch and an
/// in-progress marker.
///
/// # Errors
///
/// Returns an error when the workspace cannot be read or holds no
/// repositories.
pub fn run_repos_command(config: &Config) -> Result<()> {
    let repos = resolve_repos(&[], config)?;

    for repo in repos {
        let branch = query::current_branch(repo.root())
            .ok()
            .flatten()
            .unwrap_or_else(|| "(detached)".to_string());
        let marker = if query::is_rebase_in_progress(repo.root()) {
            "  [rebasing]"
        } else {
            ""
        };
        println!("{:<24} {branch}{marker}", repo.name());
    }

    Ok(())
}
