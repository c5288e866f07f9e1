// armada: Multi-Repository Git Operation Orchestrator
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

use crate::git::discovery::discover_repositories;
use crate::git::query::{
    current_branch, has_uncommitted_changes, is_git_repo, is_rebase_in_progress,
};
use crate::git::runner::{GitRunner, ShellGitRunner, run_git};
use crate::git::version::{GitVersion, MINIMUM_SUPPORTED, VersionKind};
use std::path::Path;
use std::process::Command;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

fn temp_dir() -> TempDir {
    tempfile::tempdir().expect("failed to create temp dir")
}

/// Initialize a git repository with an initial commit.
/// Uses shell git for simplicity and to avoid coupling tests to gix internals.
/// Returns the name of the default branch (master or main depending on git config).
fn init_test_repo_with_commit(path: &Path) -> std::io::Result<String> {
    let run = |args: &[&str]| -> std::io::Result<()> {
        let output = Command::new("git").args(args).current_dir(path).output()?;
        if !output.status.success() {
            return Err(std::io::Error::other(
                String::from_utf8_lossy(&output.stderr).to_string(),
            ));
        }
        Ok(())
    };

    run(&["init", "--quiet"])?;
    run(&["config", "user.email", "test@example.com"])?;
    run(&["config", "user.name", "Test"])?;
    run(&["commit", "--allow-empty", "-m", "Initial commit", "--quiet"])?;

    let output = Command::new("git")
        .args(["branch", "--show-current"])
        .current_dir(path)
        .output()?;
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

// --- version parsing ---

#[test]
fn test_version_parse_plain() {
    let version = GitVersion::parse("git version 2.39.2").expect("should parse");
    assert_eq!(version.major, 2);
    assert_eq!(version.minor, 39);
    assert_eq!(version.revision, 2);
    assert_eq!(version.patch_level, 0);
    assert_eq!(version.kind, VersionKind::Unix);
}

#[test]
fn test_version_parse_windows() {
    let version = GitVersion::parse("git version 2.30.1.windows.1").expect("should parse");
    assert_eq!(version.major, 2);
    assert_eq!(version.minor, 30);
    assert_eq!(version.revision, 1);
    assert_eq!(version.patch_level, 1);
    assert_eq!(version.kind, VersionKind::Windows);
}

#[test]
fn test_version_parse_msys() {
    let version = GitVersion::parse("git version 1.8.3.msysgit.0").expect("should parse");
    assert_eq!(version.kind, VersionKind::Msys);
    assert_eq!(version.patch_level, 0);
}

#[test]
fn test_version_parse_empty_fails() {
    assert!(GitVersion::parse("").is_err());
    assert!(GitVersion::parse("not a version at all").is_err());
}

#[test]
fn test_version_ordering() {
    let old = GitVersion::parse("git version 2.16.9").expect("should parse");
    let new = GitVersion::parse("git version 2.17.0").expect("should parse");
    assert!(!old.is_at_least(&MINIMUM_SUPPORTED));
    assert!(new.is_at_least(&MINIMUM_SUPPORTED));
    assert!(new.is_at_least(&old));
    assert!(old.ensure_supported().is_err());
    assert!(new.ensure_supported().is_ok());
}

#[tokio::test]
async fn test_version_detect_against_installed_git() {
    let runner = ShellGitRunner::discover().expect("git should be installed");
    let version = super::version::detect(&runner, Path::new("."), &CancellationToken::new())
        .await
        .expect("detect should succeed");
    assert!(version.major >= 2);
}

// --- queries ---

#[test]
fn test_is_git_repo() {
    let temp = temp_dir();
    assert!(!is_git_repo(temp.path()));
    init_test_repo_with_commit(temp.path()).expect("failed to init repo");
    assert!(is_git_repo(temp.path()));
}

#[test]
fn test_current_branch() {
    let temp = temp_dir();
    let branch = init_test_repo_with_commit(temp.path()).expect("failed to init repo");
    let queried = current_branch(temp.path())
        .expect("current_branch should succeed")
        .expect("branch should exist");
    assert_eq!(queried, branch);
}

#[test]
fn test_has_uncommitted_changes() {
    let temp = temp_dir();
    init_test_repo_with_commit(temp.path()).expect("failed to init repo");
    assert!(!has_uncommitted_changes(temp.path()).expect("status should succeed"));

    std::fs::write(temp.path().join("dirty.txt"), "content").expect("failed to write");
    assert!(has_uncommitted_changes(temp.path()).expect("status should succeed"));
}

#[test]
fn test_is_rebase_in_progress_via_markers() {
    let temp = temp_dir();
    init_test_repo_with_commit(temp.path()).expect("failed to init repo");
    assert!(!is_rebase_in_progress(temp.path()));

    // the exact marker git creates for merge-backed rebases
    std::fs::create_dir_all(temp.path().join(".git/rebase-merge"))
        .expect("failed to create marker");
    assert!(is_rebase_in_progress(temp.path()));
}

// --- discovery ---

#[test]
fn test_discover_repositories_finds_children() {
    let temp = temp_dir();
    let a = temp.path().join("alpha");
    let b = temp.path().join("beta");
    let plain = temp.path().join("docs");
    std::fs::create_dir_all(&a).expect("mkdir alpha");
    std::fs::create_dir_all(&b).expect("mkdir beta");
    std::fs::create_dir_all(&plain).expect("mkdir docs");
    init_test_repo_with_commit(&a).expect("init alpha");
    init_test_repo_with_commit(&b).expect("init beta");

    let repos = discover_repositories(temp.path()).expect("discovery should succeed");
    let names: Vec<_> = repos
        .iter()
        .filter_map(|p| p.file_name())
        .filter_map(|n| n.to_str())
        .collect();
    assert_eq!(names, vec!["alpha", "beta"]);
}

#[test]
fn test_discover_repositories_falls_back_to_workspace() {
    let temp = temp_dir();
    init_test_repo_with_commit(temp.path()).expect("init repo");

    let repos = discover_repositories(temp.path()).expect("discovery should succeed");
    assert_eq!(repos, vec![temp.path().to_path_buf()]);
}

// --- runner ---

#[tokio::test]
async fn test_runner_success_and_output() {
    let temp = temp_dir();
    init_test_repo_with_commit(temp.path()).expect("failed to init repo");

    let runner = ShellGitRunner::discover().expect("git should be installed");
    let token = CancellationToken::new();
    let result = run_git(&runner, temp.path(), &["status", "--porcelain"], &token)
        .await
        .expect("run should succeed");

    assert!(result.success());
    assert_eq!(result.exit_code(), 0);
    assert!(result.stdout().is_empty(), "clean tree has empty status");
}

#[tokio::test]
async fn test_runner_failure_is_a_result_not_an_error() {
    let temp = temp_dir();
    init_test_repo_with_commit(temp.path()).expect("failed to init repo");

    let runner = ShellGitRunner::discover().expect("git should be installed");
    let token = CancellationToken::new();
    let result = run_git(
        &runner,
        temp.path(),
        &["rev-parse", "--verify", "no-such-ref"],
        &token,
    )
    .await
    .expect("spawn should succeed even when git fails");

    assert!(!result.success());
    assert_ne!(result.exit_code(), 0);
    assert!(!result.error_text().is_empty());
}

#[tokio::test]
async fn test_runner_streams_lines_to_listeners() {
    use crate::core::process::{LineListener, StreamSource};

    #[derive(Default)]
    struct Collect(Vec<String>);
    impl LineListener for Collect {
        fn on_line(&mut self, line: &str, _source: StreamSource) {
            self.0.push(line.to_string());
        }
    }

    let temp = temp_dir();
    init_test_repo_with_commit(temp.path()).expect("failed to init repo");
    std::fs::write(temp.path().join("new.txt"), "x").expect("failed to write");

    let runner = ShellGitRunner::discover().expect("git should be installed");
    let token = CancellationToken::new();
    let mut collect = Collect::default();
    let args: Vec<String> = ["status", "--porcelain"]
        .iter()
        .map(ToString::to_string)
        .collect();
    let result = runner
        .run(temp.path(), &args, &mut [&mut collect], &token)
        .await
        .expect("run should succeed");

    assert!(result.success());
    assert!(
        collect.0.iter().any(|l| l.contains("new.txt")),
        "listener should have seen the status line: {:?}",
        collect.0
    );
}
