// armada: Multi-Repository Git Operation Orchestrator
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Snapshot of an in-flight (or about-to-start) multi-repository rebase.
//!
//! ```text
//! RebaseSpec
//!   params            None = resuming a rebase found on disk
//!   statuses          repo name -> NotStarted|Suspended|Success|Error
//!   initial heads     repo name -> commit before anything ran
//!   initial branches  repo name -> branch before anything ran
//!
//! Invariants
//!   at most ONE repository is Suspended
//!   stored Suspended == live rebase-in-progress, for every repository
//!
//! Status changes are copy-on-write: with_status() returns a NEW spec,
//! so progress observers never see a half-updated snapshot.
//! ```

use std::collections::BTreeMap;

use tokio_util::sync::CancellationToken;

use crate::error::{ArmadaResult, GitError, OpError, Result};
use crate::git::query;
use crate::git::runner::{GitRunner, run_git};

use super::{Repo, RebaseStateProbe};

/// Per-repository progress of a multi-repository rebase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepoStatus {
    /// Nothing attempted yet.
    NotStarted,
    /// A rebase is physically in progress in this working tree
    /// (conflicts to resolve before anything else happens).
    Suspended,
    /// Rebase finished in this repository.
    Success,
    /// Rebase failed in this repository without leaving it mid-rebase.
    Error,
}

/// What to rebase. `branch` is checked out first when given; otherwise
/// the current branch is rebased.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RebaseParams {
    pub upstream: String,
    pub onto: Option<String>,
    pub branch: Option<String>,
}

impl RebaseParams {
    #[must_use]
    pub fn new(upstream: impl Into<String>) -> Self {
        Self {
            upstream: upstream.into(),
            onto: None,
            branch: None,
        }
    }

    #[must_use]
    pub fn with_onto(mut self, onto: Option<String>) -> Self {
        self.onto = onto;
        self
    }

    #[must_use]
    pub fn with_branch(mut self, branch: Option<String>) -> Self {
        self.branch = branch;
        self
    }

    /// The `git rebase` invocation these parameters describe.
    #[must_use]
    pub fn to_args(&self) -> Vec<String> {
        let mut args = vec!["rebase".to_string()];
        if let Some(onto) = &self.onto {
            args.push("--onto".to_string());
            args.push(onto.clone());
        }
        args.push(self.upstream.clone());
        if let Some(branch) = &self.branch {
            args.push(branch.clone());
        }
        args
    }

    /// Human-readable destination for messages ("onto X" wins).
    #[must_use]
    pub fn destination(&self) -> &str {
        self.onto.as_deref().unwrap_or(&self.upstream)
    }
}

/// Immutable snapshot of a multi-repository rebase. See the module docs
/// for the invariants.
#[derive(Debug, Clone)]
pub struct RebaseSpec {
    params: Option<RebaseParams>,
    repos: BTreeMap<String, Repo>,
    statuses: BTreeMap<String, RepoStatus>,
    initial_heads: BTreeMap<String, String>,
    initial_branches: BTreeMap<String, String>,
    should_be_saved: bool,
}

impl RebaseSpec {
    /// Builds the spec for a fresh rebase across `repos`: snapshots every
    /// repository's head revision (resolved against the branch to check
    /// out when given, else HEAD) and current branch *before* any
    /// mutation; all statuses start at `NotStarted`.
    ///
    /// # Errors
    ///
    /// Fails when a head revision cannot be resolved.
    pub async fn for_new_rebase(
        params: RebaseParams,
        repos: Vec<Repo>,
        runner: &dyn GitRunner,
        token: &CancellationToken,
    ) -> Result<Self> {
        let mut map = BTreeMap::new();
        let mut statuses = BTreeMap::new();
        let mut initial_heads = BTreeMap::new();
        let mut initial_branches = BTreeMap::new();

        for repo in repos {
            let rev_source = params.branch.as_deref().unwrap_or("HEAD");
            let resolved =
                run_git(runner, repo.root(), &["rev-parse", rev_source], token).await?;
            if !resolved.success() {
                return Err(GitError::CommandFailed {
                    command: format!("rev-parse {rev_source}"),
                    message: resolved.error_text(),
                }
                .into());
            }
            let head = resolved
                .stdout()
                .first()
                .cloned()
                .ok_or_else(|| GitError::CommandFailed {
                    command: format!("rev-parse {rev_source}"),
                    message: "no output".to_string(),
                })?;

            initial_heads.insert(repo.name().to_string(), head);
            if let Ok(Some(branch)) = query::current_branch(repo.root()) {
                initial_branches.insert(repo.name().to_string(), branch);
            }
            statuses.insert(repo.name().to_string(), RepoStatus::NotStarted);
            map.insert(repo.name().to_string(), repo);
        }

        Ok(Self {
            params: Some(params),
            repos: map,
            statuses,
            initial_heads,
            initial_branches,
            should_be_saved: true,
        })
    }

    /// Builds the spec for resuming a rebase found on disk in a single
    /// repository: that repository is `Suspended`, the position maps stay
    /// empty, and nothing new gets stashed (any stash predates this
    /// resume).
    ///
    /// Returns `None` when no rebase is actually in progress there.
    #[must_use]
    pub fn for_resume_in_single_repository(
        repo: Repo,
        probe: &dyn RebaseStateProbe,
    ) -> Option<Self> {
        if !probe.is_rebase_in_progress(&repo) {
            return None;
        }

        let name = repo.name().to_string();
        let mut repos = BTreeMap::new();
        let mut statuses = BTreeMap::new();
        statuses.insert(name.clone(), RepoStatus::Suspended);
        repos.insert(name, repo);

        Some(Self {
            params: None,
            repos,
            statuses,
            initial_heads: BTreeMap::new(),
            initial_branches: BTreeMap::new(),
            should_be_saved: false,
        })
    }

    /// Checks the spec invariants against live repository state.
    ///
    /// # Errors
    ///
    /// `OpError::InvalidSpec` when more than one repository is suspended,
    /// or when any repository's live rebase-in-progress flag disagrees
    /// with its stored status. Fatal for the operation using this spec.
    pub fn validate(&self, probe: &dyn RebaseStateProbe) -> ArmadaResult<()> {
        let suspended: Vec<&str> = self
            .statuses
            .iter()
            .filter(|(_, status)| **status == RepoStatus::Suspended)
            .map(|(name, _)| name.as_str())
            .collect();
        if suspended.len() > 1 {
            return Err(OpError::InvalidSpec {
                reason: format!(
                    "{} repositories have a suspended rebase: {}",
                    suspended.len(),
                    suspended.join(", ")
                ),
            }
            .into());
        }

        for (name, repo) in &self.repos {
            let live = probe.is_rebase_in_progress(repo);
            let stored = self.statuses.get(name) == Some(&RepoStatus::Suspended);
            if live != stored {
                return Err(OpError::InvalidSpec {
                    reason: format!(
                        "repository '{name}' is {}rebasing on disk but its status is {:?}",
                        if live { "" } else { "not " },
                        self.statuses.get(name)
                    ),
                }
                .into());
            }
        }

        Ok(())
    }

    /// Convenience wrapper over [`Self::validate`].
    #[must_use]
    pub fn is_valid(&self, probe: &dyn RebaseStateProbe) -> bool {
        self.validate(probe).is_ok()
    }

    /// Copy-on-write status change: returns a new spec, the rest of the
    /// snapshot untouched.
    #[must_use]
    pub fn with_status(&self, repo_name: &str, status: RepoStatus) -> Self {
        let mut next = self.clone();
        next.statuses.insert(repo_name.to_string(), status);
        next
    }

    /// Repositories still needing action: the suspended one (if any)
    /// first, then every not-yet-successful repository in name order.
    #[must_use]
    pub fn incomplete_repositories(&self) -> Vec<Repo> {
        let mut incomplete = Vec::new();
        for (name, repo) in &self.repos {
            if self.statuses.get(name) == Some(&RepoStatus::Suspended) {
                incomplete.insert(0, repo.clone());
            } else if self.statuses.get(name) != Some(&RepoStatus::Success) {
                incomplete.push(repo.clone());
            }
        }
        incomplete
    }

    /// For every successfully rebased repository, the head position
    /// recorded *before* the operation started: what a rollback resets
    /// to when the multi-repo operation is aborted after partial success.
    #[must_use]
    pub fn head_positions_to_rollback(&self) -> BTreeMap<String, String> {
        self.statuses
            .iter()
            .filter(|(_, status)| **status == RepoStatus::Success)
            .filter_map(|(name, _)| {
                self.initial_heads
                    .get(name)
                    .map(|head| (name.clone(), head.clone()))
            })
            .collect()
    }

    /// The rebase parameters; `None` means "resuming an existing
    /// suspended operation".
    #[must_use]
    pub const fn params(&self) -> Option<&RebaseParams> {
        self.params.as_ref()
    }

    /// Whether local changes should be stashed before driving the spec.
    #[must_use]
    pub const fn should_be_saved(&self) -> bool {
        self.should_be_saved
    }

    /// Status of one repository.
    #[must_use]
    pub fn status_of(&self, repo_name: &str) -> Option<RepoStatus> {
        self.statuses.get(repo_name).copied()
    }

    /// All repositories in name order.
    pub fn repos(&self) -> impl Iterator<Item = &Repo> {
        self.repos.values()
    }

    /// The repository currently suspended, if any.
    #[must_use]
    pub fn suspended_repository(&self) -> Option<&Repo> {
        self.statuses
            .iter()
            .find(|(_, status)| **status == RepoStatus::Suspended)
            .and_then(|(name, _)| self.repos.get(name))
    }

    /// Branch a repository was on before the operation, if recorded.
    #[must_use]
    pub fn initial_branch_of(&self, repo_name: &str) -> Option<&str> {
        self.initial_branches.get(repo_name).map(String::as_str)
    }
}
