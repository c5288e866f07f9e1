// armada: Multi-Repository Git Operation Orchestrator
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

use crate::cli::reset::ConflictChoice;
use crate::cli::{Cli, Command};
use crate::config::types::ResetMode;
use clap::Parser;
use std::path::PathBuf;

#[test]
fn test_parse_version() {
    let cli = Cli::try_parse_from(["armada", "version"]).unwrap();
    assert!(matches!(cli.command, Some(Command::Version)));
}

#[test]
fn test_parse_global_options() {
    let cli = Cli::try_parse_from(["armada", "-l", "5", "-w", "/srv/repos", "repos"]).unwrap();
    assert_eq!(cli.global.log_level, Some(5));
    assert_eq!(cli.global.workspace, Some(PathBuf::from("/srv/repos")));
    assert!(matches!(cli.command, Some(Command::Repos)));
}

#[test]
fn test_log_level_out_of_range_is_rejected() {
    assert!(Cli::try_parse_from(["armada", "-l", "9", "repos"]).is_err());
}

#[test]
fn test_parse_reset() {
    let cli = Cli::try_parse_from([
        "armada",
        "reset",
        "HEAD~1",
        "--mode",
        "keep",
        "--on-conflict",
        "smart",
        "backend",
        "frontend",
    ])
    .unwrap();

    let Some(Command::Reset(args)) = cli.command else {
        panic!("expected reset command");
    };
    assert_eq!(args.target, "HEAD~1");
    assert_eq!(args.mode, Some(ResetMode::Keep));
    assert_eq!(args.on_conflict, ConflictChoice::Smart);
    assert_eq!(
        args.repos,
        vec![PathBuf::from("backend"), PathBuf::from("frontend")]
    );
}

#[test]
fn test_reset_on_conflict_defaults_to_cancel() {
    let cli = Cli::try_parse_from(["armada", "reset", "HEAD"]).unwrap();
    let Some(Command::Reset(args)) = cli.command else {
        panic!("expected reset command");
    };
    assert_eq!(args.on_conflict, ConflictChoice::Cancel);
    assert_eq!(args.mode, None);
}

#[test]
fn test_parse_rebase_fresh() {
    let cli = Cli::try_parse_from([
        "armada",
        "rebase",
        "origin/main",
        "--onto",
        "origin/release",
        "-b",
        "feature/x",
    ])
    .unwrap();

    let Some(Command::Rebase(args)) = cli.command else {
        panic!("expected rebase command");
    };
    assert_eq!(args.upstream.as_deref(), Some("origin/main"));
    assert_eq!(args.onto.as_deref(), Some("origin/release"));
    assert_eq!(args.branch.as_deref(), Some("feature/x"));
    assert!(!args.continue_rebase && !args.skip && !args.abort);
}

#[test]
fn test_parse_rebase_continue() {
    let cli = Cli::try_parse_from(["armada", "rebase", "--continue"]).unwrap();
    let Some(Command::Rebase(args)) = cli.command else {
        panic!("expected rebase command");
    };
    assert!(args.continue_rebase);
}

#[test]
fn test_rebase_continue_conflicts_with_upstream() {
    assert!(Cli::try_parse_from(["armada", "rebase", "origin/main", "--continue"]).is_err());
    assert!(Cli::try_parse_from(["armada", "rebase", "--continue", "--abort"]).is_err());
}

#[test]
fn test_rebase_rollback_requires_abort() {
    assert!(Cli::try_parse_from(["armada", "rebase", "--rollback"]).is_err());
    let cli = Cli::try_parse_from(["armada", "rebase", "--abort", "--rollback"]).unwrap();
    let Some(Command::Rebase(args)) = cli.command else {
        panic!("expected rebase command");
    };
    assert!(args.abort && args.rollback);
}

#[test]
fn test_config_overrides_from_globals() {
    let cli = Cli::try_parse_from([
        "armada",
        "-s",
        "reset.default_mode=hard",
        "-l",
        "4",
        "repos",
    ])
    .unwrap();

    let overrides = cli.global.to_config_overrides();
    assert!(overrides.contains(&("reset.default_mode".to_string(), "hard".to_string())));
    assert!(overrides.contains(&("global.output_log_level".to_string(), "4".to_string())));
}
