// armada: Multi-Repository Git Operation Orchestrator
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Integration tests for the rebase executor.
//!
//! Real repositories, real conflicts: fresh multi-repo rebase, dirty-tree
//! autostash, suspension on conflicts, skip-resume, and abort.

use std::path::Path;
use std::sync::{Arc, Mutex};

use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

use armada::config::types::SavePolicy;
use armada::git::query;
use armada::git::runner::ShellGitRunner;
use armada::op::rebase::{RebaseExecutor, ResumeAction};
use armada::op::saver::saver_for_policy;
use armada::op::spec::{RebaseParams, RebaseSpec, RepoStatus};
use armada::op::{
    LiveStateProbe, LocalChangesDecision, Notifier, OperationHost, Outcome, Repo,
};

fn temp_dir() -> TempDir {
    tempfile::tempdir().expect("failed to create temp dir")
}

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

/// master: base commit + extra.txt commit; feature (checked out): its own
/// commit on top of base. When `conflicting` is set, both branches edit
/// shared.txt so the rebase stops on a conflict.
fn init_branched_repo(dir: &Path, conflicting: bool) {
    git(&["init", "-q"], dir);
    git(&["config", "user.email", "test@test.com"], dir);
    git(&["config", "user.name", "Test"], dir);
    git(&["checkout", "-q", "-b", "master"], dir);
    std::fs::write(dir.join("shared.txt"), "base\n").expect("write shared");
    git(&["add", "."], dir);
    git(&["commit", "-q", "-m", "base"], dir);

    git(&["checkout", "-q", "-b", "feature"], dir);
    if conflicting {
        std::fs::write(dir.join("shared.txt"), "feature change\n").expect("write shared");
    } else {
        std::fs::write(dir.join("feature.txt"), "feature\n").expect("write feature");
    }
    git(&["add", "."], dir);
    git(&["commit", "-q", "-m", "feature work"], dir);

    git(&["checkout", "-q", "master"], dir);
    if conflicting {
        std::fs::write(dir.join("shared.txt"), "master change\n").expect("write shared");
    } else {
        std::fs::write(dir.join("extra.txt"), "extra\n").expect("write extra");
    }
    git(&["add", "."], dir);
    git(&["commit", "-q", "-m", "master work"], dir);

    git(&["checkout", "-q", "feature"], dir);
}

struct SilentHost;

impl OperationHost for SilentHost {
    fn select_local_changes_action(
        &self,
        _repo: &Repo,
        _paths: &[String],
        _operation: &str,
        _force_label: &str,
    ) -> LocalChangesDecision {
        LocalChangesDecision::Cancel
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
    titles: Mutex<Vec<String>>,
}

impl Recorder {
    fn titles(&self) -> Vec<String> {
        self.titles.lock().expect("titles lock").clone()
    }
}

impl Notifier for Recorder {
    fn notify_success(&self, title: &str, _body: &str) {
        self.titles.lock().expect("titles lock").push(title.to_string());
    }

    fn notify_warning(&self, title: &str, _body: &str) {
        self.titles.lock().expect("titles lock").push(title.to_string());
    }

    fn notify_error(&self, title: &str, _body: &str) {
        self.titles.lock().expect("titles lock").push(title.to_string());
    }
}

async fn fresh_spec(
    runner: &ShellGitRunner,
    repos: Vec<Repo>,
) -> RebaseSpec {
    RebaseSpec::for_new_rebase(
        RebaseParams::new("master"),
        repos,
        runner,
        &CancellationToken::new(),
    )
    .await
    .expect("spec should build")
}

#[tokio::test]
async fn fresh_rebase_across_two_repositories() {
    let alpha = temp_dir();
    let beta = temp_dir();
    init_branched_repo(alpha.path(), false);
    init_branched_repo(beta.path(), false);
    let alpha_feature_head = git(&["rev-parse", "HEAD"], alpha.path());

    let runner = Arc::new(ShellGitRunner::discover().expect("git should be installed"));
    let host = SilentHost;
    let notifier = Recorder::default();
    let probe = LiveStateProbe;
    let executor = RebaseExecutor::new(
        runner.as_ref(),
        &host,
        &notifier,
        &probe,
        CancellationToken::new(),
    );

    let repos = vec![Repo::at(alpha.path()), Repo::at(beta.path())];
    let spec = fresh_spec(runner.as_ref(), repos).await;
    let mut saver = saver_for_policy(
        SavePolicy::Stash,
        runner.clone(),
        "rebase",
        "master",
        CancellationToken::new(),
    );

    let run = executor
        .execute(spec, saver.as_mut())
        .await
        .expect("execute should succeed");

    assert_eq!(run.outcome, Outcome::Succeeded);
    assert_eq!(notifier.titles(), vec!["Rebase successful".to_string()]);
    // feature now contains master's commit
    assert!(alpha.path().join("extra.txt").exists());
    assert!(beta.path().join("extra.txt").exists());
    // the rollback snapshot still points at the pre-rebase head
    let alpha_name = Repo::at(alpha.path()).name().to_string();
    assert_eq!(
        run.spec.head_positions_to_rollback().get(&alpha_name),
        Some(&alpha_feature_head)
    );
}

#[tokio::test]
async fn dirty_tree_is_stashed_and_restored_around_the_rebase() {
    let repo_dir = temp_dir();
    init_branched_repo(repo_dir.path(), false);
    // uncommitted edit that would make `git rebase` refuse to start
    std::fs::write(repo_dir.path().join("local.txt"), "uncommitted\n").expect("write");
    git(&["add", "local.txt"], repo_dir.path());

    let runner = Arc::new(ShellGitRunner::discover().expect("git should be installed"));
    let host = SilentHost;
    let notifier = Recorder::default();
    let probe = LiveStateProbe;
    let executor = RebaseExecutor::new(
        runner.as_ref(),
        &host,
        &notifier,
        &probe,
        CancellationToken::new(),
    );

    let spec = fresh_spec(runner.as_ref(), vec![Repo::at(repo_dir.path())]).await;
    let mut saver = saver_for_policy(
        SavePolicy::Stash,
        runner.clone(),
        "rebase",
        "master",
        CancellationToken::new(),
    );

    let run = executor
        .execute(spec, saver.as_mut())
        .await
        .expect("execute should succeed");

    assert_eq!(run.outcome, Outcome::Succeeded);
    assert!(repo_dir.path().join("extra.txt").exists(), "rebase ran");
    let local = std::fs::read_to_string(repo_dir.path().join("local.txt")).expect("read");
    assert_eq!(local, "uncommitted\n", "local changes must be restored");
    assert_eq!(
        git(&["stash", "list"], repo_dir.path()),
        "",
        "the stash entry must be consumed by the restore"
    );
}

#[tokio::test]
async fn conflicting_rebase_suspends_then_skip_finishes() {
    let repo_dir = temp_dir();
    init_branched_repo(repo_dir.path(), true);

    let runner = Arc::new(ShellGitRunner::discover().expect("git should be installed"));
    let host = SilentHost;
    let notifier = Recorder::default();
    let probe = LiveStateProbe;
    let executor = RebaseExecutor::new(
        runner.as_ref(),
        &host,
        &notifier,
        &probe,
        CancellationToken::new(),
    );

    let spec = fresh_spec(runner.as_ref(), vec![Repo::at(repo_dir.path())]).await;
    let mut saver = saver_for_policy(
        SavePolicy::Stash,
        runner.clone(),
        "rebase",
        "master",
        CancellationToken::new(),
    );

    let run = executor
        .execute(spec, saver.as_mut())
        .await
        .expect("execute should succeed");

    let repo_name = Repo::at(repo_dir.path()).name().to_string();
    assert_eq!(run.outcome, Outcome::Suspended);
    assert_eq!(run.spec.status_of(&repo_name), Some(RepoStatus::Suspended));
    assert!(query::is_rebase_in_progress(repo_dir.path()));
    assert_eq!(notifier.titles(), vec!["Rebase suspended".to_string()]);

    // skipping the conflicting commit completes the rebase
    let mut resume_saver = saver_for_policy(
        SavePolicy::Stash,
        runner.clone(),
        "rebase",
        "master",
        CancellationToken::new(),
    );
    let resumed = executor
        .resume(run.spec, resume_saver.as_mut(), ResumeAction::Skip)
        .await
        .expect("resume should succeed");

    assert_eq!(resumed.outcome, Outcome::Succeeded);
    assert!(!query::is_rebase_in_progress(repo_dir.path()));
    let shared = std::fs::read_to_string(repo_dir.path().join("shared.txt")).expect("read");
    assert_eq!(shared, "master change\n", "the feature commit was skipped");
}

#[tokio::test]
async fn conflicting_rebase_can_be_aborted() {
    let repo_dir = temp_dir();
    init_branched_repo(repo_dir.path(), true);
    let feature_head = git(&["rev-parse", "HEAD"], repo_dir.path());

    let runner = Arc::new(ShellGitRunner::discover().expect("git should be installed"));
    let host = SilentHost;
    let notifier = Recorder::default();
    let probe = LiveStateProbe;
    let executor = RebaseExecutor::new(
        runner.as_ref(),
        &host,
        &notifier,
        &probe,
        CancellationToken::new(),
    );

    let spec = fresh_spec(runner.as_ref(), vec![Repo::at(repo_dir.path())]).await;
    let mut saver = saver_for_policy(
        SavePolicy::Stash,
        runner.clone(),
        "rebase",
        "master",
        CancellationToken::new(),
    );
    let run = executor
        .execute(spec, saver.as_mut())
        .await
        .expect("execute should succeed");
    assert_eq!(run.outcome, Outcome::Suspended);

    let outcome = executor
        .abort(&run.spec, false)
        .await
        .expect("abort should succeed");

    assert_eq!(outcome, Outcome::Succeeded);
    assert!(!query::is_rebase_in_progress(repo_dir.path()));
    assert_eq!(
        git(&["rev-parse", "HEAD"], repo_dir.path()),
        feature_head,
        "abort must return the branch to its pre-rebase position"
    );
}

#[tokio::test]
async fn resume_spec_is_built_from_the_on_disk_rebase() {
    let repo_dir = temp_dir();
    init_branched_repo(repo_dir.path(), true);

    // no rebase in progress yet
    let probe = LiveStateProbe;
    assert!(
        RebaseSpec::for_resume_in_single_repository(Repo::at(repo_dir.path()), &probe).is_none()
    );

    // start a conflicting rebase directly through git
    let status = std::process::Command::new("git")
        .args(["rebase", "master"])
        .current_dir(repo_dir.path())
        .output()
        .expect("failed to run git");
    assert!(!status.status.success(), "the rebase should stop on conflicts");

    let spec = RebaseSpec::for_resume_in_single_repository(Repo::at(repo_dir.path()), &probe)
        .expect("a suspended rebase must be detected");
    assert!(!spec.should_be_saved());
    assert!(spec.is_valid(&probe));

    git(&["rebase", "--abort"], repo_dir.path());
}
