// armada: Multi-Repository Git Operation Orchestrator
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Integration tests for the reset executor.
//!
//! Drives real git repositories in temp directories through
//! `ResetExecutor`, including the blocked-by-local-changes fallbacks.

use std::path::Path;
use std::sync::{Arc, Mutex};

use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

use armada::config::types::{ResetMode, SavePolicy};
use armada::git::runner::ShellGitRunner;
use armada::op::reset::{ResetExecutor, ResetRequest};
use armada::op::saver::{ChangesSaver, saver_for_policy};
use armada::op::{LocalChangesDecision, Notifier, OperationHost, Outcome, Repo};

fn temp_dir() -> TempDir {
    tempfile::tempdir().expect("failed to create temp dir")
}

/// Helper to run git commands in a directory
fn git(args: &[&str], cwd: &Path) -> String {
    let output = std::process::Command::new("git")
        .args(args)
        .current_dir(cwd)
        .env("GIT_AUTHOR_NAME", "Test")
        .env("GIT_AUTHOR_EMAIL", "test@test.com")
        .env("GIT_COMMITTER_NAME", "Test")
        .env("GIT_COMMITTER_EMAIL", "test@test.com")
        .output()
        .expect("failed to run git");
    assert!(
        output.status.success(),
        "git {args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

/// Repo with two commits touching file.txt ("one", then "two").
fn init_two_commit_repo(dir: &Path) {
    git(&["init", "-q"], dir);
    git(&["config", "user.email", "test@test.com"], dir);
    git(&["config", "user.name", "Test"], dir);
    std::fs::write(dir.join("file.txt"), "one\n").expect("write file");
    git(&["add", "."], dir);
    git(&["commit", "-q", "-m", "first"], dir);
    std::fs::write(dir.join("file.txt"), "two\n").expect("write file");
    git(&["add", "."], dir);
    git(&["commit", "-q", "-m", "second"], dir);
}

fn head_of(dir: &Path) -> String {
    git(&["rev-parse", "HEAD"], dir)
}

struct FixedHost {
    decision: LocalChangesDecision,
}

impl OperationHost for FixedHost {
    fn select_local_changes_action(
        &self,
        _repo: &Repo,
        _paths: &[String],
        _operation: &str,
        _force_label: &str,
    ) -> LocalChangesDecision {
        self.decision
    }

    fn resolve_restore_conflicts(
        &self,
        _repo: &Repo,
        _ours_title: &str,
        _theirs_title: &str,
    ) -> bool {
        false
    }
}

#[derive(Default)]
struct Recorder {
    notes: Mutex<Vec<(String, String)>>,
}

impl Recorder {
    fn titles(&self) -> Vec<String> {
        self.notes
            .lock()
            .expect("notes lock")
            .iter()
            .map(|(_, title)| title.clone())
            .collect()
    }
}

impl Notifier for Recorder {
    fn notify_success(&self, title: &str, _body: &str) {
        self.notes
            .lock()
            .expect("notes lock")
            .push(("success".to_string(), title.to_string()));
    }

    fn notify_warning(&self, title: &str, _body: &str) {
        self.notes
            .lock()
            .expect("notes lock")
            .push(("warning".to_string(), title.to_string()));
    }

    fn notify_error(&self, title: &str, _body: &str) {
        self.notes
            .lock()
            .expect("notes lock")
            .push(("error".to_string(), title.to_string()));
    }
}

fn stash_factory(
    runner: Arc<ShellGitRunner>,
    target: &str,
) -> impl Fn() -> Box<dyn ChangesSaver> + Send + Sync {
    let target = target.to_string();
    move || {
        saver_for_policy(
            SavePolicy::Stash,
            runner.clone(),
            "reset",
            &target,
            CancellationToken::new(),
        )
    }
}

#[tokio::test]
async fn mixed_reset_moves_head_in_every_repository() {
    let alpha = temp_dir();
    let beta = temp_dir();
    init_two_commit_repo(alpha.path());
    init_two_commit_repo(beta.path());
    let alpha_first = git(&["rev-parse", "HEAD~1"], alpha.path());

    let runner = Arc::new(ShellGitRunner::discover().expect("git should be installed"));
    let host = FixedHost {
        decision: LocalChangesDecision::Cancel,
    };
    let notifier = Recorder::default();
    let factory = stash_factory(runner.clone(), "HEAD~1");
    let executor = ResetExecutor::new(
        runner.as_ref(),
        &host,
        &notifier,
        &factory,
        CancellationToken::new(),
    );

    let run = executor
        .execute(&ResetRequest {
            mode: ResetMode::Mixed,
            target: "HEAD~1".to_string(),
            repos: vec![Repo::at(alpha.path()), Repo::at(beta.path())],
        })
        .await
        .expect("execute should succeed");

    assert_eq!(run.outcome, Outcome::Succeeded);
    assert_eq!(head_of(alpha.path()), alpha_first);
    assert_eq!(notifier.titles(), vec!["Reset successful".to_string()]);
    // mixed reset leaves the second commit's content as a local change
    let status = git(&["status", "--porcelain"], alpha.path());
    assert!(status.contains("file.txt"));
}

#[tokio::test]
async fn blocked_keep_reset_with_force_discards_local_changes() {
    let repo_dir = temp_dir();
    init_two_commit_repo(repo_dir.path());
    let target_head = git(&["rev-parse", "HEAD~1"], repo_dir.path());
    // local edit to the file that differs between HEAD and HEAD~1:
    // `reset --keep` refuses to run over it
    std::fs::write(repo_dir.path().join("file.txt"), "local edit\n").expect("write file");

    let runner = Arc::new(ShellGitRunner::discover().expect("git should be installed"));
    let host = FixedHost {
        decision: LocalChangesDecision::Force,
    };
    let notifier = Recorder::default();
    let factory = stash_factory(runner.clone(), "HEAD~1");
    let executor = ResetExecutor::new(
        runner.as_ref(),
        &host,
        &notifier,
        &factory,
        CancellationToken::new(),
    );

    let run = executor
        .execute(&ResetRequest {
            mode: ResetMode::Keep,
            target: "HEAD~1".to_string(),
            repos: vec![Repo::at(repo_dir.path())],
        })
        .await
        .expect("execute should succeed");

    assert_eq!(run.outcome, Outcome::Succeeded);
    assert_eq!(head_of(repo_dir.path()), target_head);
    let content = std::fs::read_to_string(repo_dir.path().join("file.txt")).expect("read file");
    assert_eq!(content, "one\n", "hard reset must discard the local edit");
}

#[tokio::test]
async fn blocked_keep_reset_with_smart_preserves_local_changes() {
    let repo_dir = temp_dir();
    init_two_commit_repo(repo_dir.path());
    let target_head = git(&["rev-parse", "HEAD~1"], repo_dir.path());
    std::fs::write(repo_dir.path().join("file.txt"), "local edit\n").expect("write file");

    let runner = Arc::new(ShellGitRunner::discover().expect("git should be installed"));
    let host = FixedHost {
        decision: LocalChangesDecision::Smart,
    };
    let notifier = Recorder::default();
    let factory = stash_factory(runner.clone(), "HEAD~1");
    let executor = ResetExecutor::new(
        runner.as_ref(),
        &host,
        &notifier,
        &factory,
        CancellationToken::new(),
    );

    let run = executor
        .execute(&ResetRequest {
            mode: ResetMode::Keep,
            target: "HEAD~1".to_string(),
            repos: vec![Repo::at(repo_dir.path())],
        })
        .await
        .expect("execute should succeed");

    // the reset itself went through after stashing
    assert_eq!(run.outcome, Outcome::Succeeded);
    assert_eq!(head_of(repo_dir.path()), target_head);
    // the local edit is back in the tree: either restored cleanly or as
    // a conflict the operator must finish (never silently dropped)
    let status = git(&["status", "--porcelain"], repo_dir.path());
    let stash_list = git(&["stash", "list"], repo_dir.path());
    assert!(
        !status.is_empty() || !stash_list.is_empty(),
        "local changes must survive a smart reset"
    );
}

#[tokio::test]
async fn blocked_keep_reset_with_cancel_leaves_repository_untouched() {
    let repo_dir = temp_dir();
    init_two_commit_repo(repo_dir.path());
    let original_head = head_of(repo_dir.path());
    std::fs::write(repo_dir.path().join("file.txt"), "local edit\n").expect("write file");

    let runner = Arc::new(ShellGitRunner::discover().expect("git should be installed"));
    let host = FixedHost {
        decision: LocalChangesDecision::Cancel,
    };
    let notifier = Recorder::default();
    let factory = stash_factory(runner.clone(), "HEAD~1");
    let executor = ResetExecutor::new(
        runner.as_ref(),
        &host,
        &notifier,
        &factory,
        CancellationToken::new(),
    );

    let run = executor
        .execute(&ResetRequest {
            mode: ResetMode::Keep,
            target: "HEAD~1".to_string(),
            repos: vec![Repo::at(repo_dir.path())],
        })
        .await
        .expect("execute should succeed");

    assert_eq!(run.outcome, Outcome::Failed);
    assert_eq!(head_of(repo_dir.path()), original_head);
    let content = std::fs::read_to_string(repo_dir.path().join("file.txt")).expect("read file");
    assert_eq!(content, "local edit\n");
    assert_eq!(notifier.titles(), vec!["Reset failed".to_string()]);

    let result = &run.results[Repo::at(repo_dir.path()).name()];
    assert!(
        !result.blocking_paths.is_empty(),
        "the detector should have captured the blocking file"
    );
}
