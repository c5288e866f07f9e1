// armada: Multi-Repository Git Operation Orchestrator
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

use super::Config;
use crate::config::types::{ResetMode, SavePolicy};
use crate::logging::LogLevel;
use std::path::PathBuf;

#[test]
fn test_default_config() {
    let config = Config::default();
    assert_eq!(config.global.output_log_level, LogLevel::INFO);
    assert_eq!(config.global.file_log_level, LogLevel::TRACE);
    assert_eq!(config.git.save_policy, SavePolicy::Stash);
    assert_eq!(config.reset.default_mode, ResetMode::Mixed);
    assert!(config.rebase.upstream.is_none());
    assert!(config.paths.workspace.is_none());
}

#[test]
fn test_reset_mode_display_and_flag() {
    assert_eq!(ResetMode::Soft.to_string(), "soft");
    assert_eq!(ResetMode::Keep.to_string(), "keep");
    assert_eq!(ResetMode::Mixed.as_flag(), "--mixed");
    assert_eq!(ResetMode::Hard.as_flag(), "--hard");
}

#[test]
fn test_reset_mode_parse() {
    assert_eq!("hard".parse::<ResetMode>().unwrap(), ResetMode::Hard);
    assert_eq!("KEEP".parse::<ResetMode>().unwrap(), ResetMode::Keep);
    assert!("merge".parse::<ResetMode>().is_err());
}

#[test]
fn test_save_policy_parse() {
    assert_eq!("stash".parse::<SavePolicy>().unwrap(), SavePolicy::Stash);
    assert_eq!("Shelve".parse::<SavePolicy>().unwrap(), SavePolicy::Shelve);
    assert!("patch".parse::<SavePolicy>().is_err());
}

#[test]
fn test_parse_toml() {
    let config = Config::parse(
        r#"
        [global]
        output_log_level = 4

        [git]
        save_policy = "shelve"
        timeout_secs = 120

        [reset]
        default_mode = "keep"

        [rebase]
        upstream = "origin/main"

        [paths]
        workspace = "/srv/repos"
        "#,
    )
    .expect("config should parse");

    assert_eq!(config.global.output_log_level, LogLevel::DEBUG);
    assert_eq!(config.git.save_policy, SavePolicy::Shelve);
    assert_eq!(config.git.timeout_secs, 120);
    assert_eq!(config.reset.default_mode, ResetMode::Keep);
    assert_eq!(config.rebase.upstream.as_deref(), Some("origin/main"));
    assert_eq!(config.paths.workspace, Some(PathBuf::from("/srv/repos")));
}

#[test]
fn test_parse_rejects_unknown_fields() {
    let result = Config::parse(
        r"
        [reset]
        default_mood = 'hard'
        ",
    );
    assert!(result.is_err(), "unknown keys should be rejected");
}

#[test]
fn test_set_override_wins_over_file() {
    let config = Config::builder()
        .add_toml_str("[reset]\ndefault_mode = 'soft'")
        .set("reset.default_mode", "hard")
        .expect("override should be accepted")
        .build()
        .expect("config should build");
    assert_eq!(config.reset.default_mode, ResetMode::Hard);
}

#[test]
fn test_format_options_is_sorted_and_aligned() {
    let options = Config::default().format_options();
    assert!(!options.is_empty());
    let keys: Vec<&str> = options
        .iter()
        .map(|line| line.split_whitespace().next().unwrap())
        .collect();
    let mut sorted = keys.clone();
    sorted.sort_unstable();
    assert_eq!(keys, sorted, "options should be sorted by key");
    assert!(
        options.iter().all(|line| line.contains(" = ")),
        "every line should be 'key = value'"
    );
}
