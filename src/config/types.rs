// armada: Multi-Repository Git Operation Orchestrator
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Configuration types for armada.
//!
//! ```text
//! Config: GlobalConfig, GitConfig, ResetConfig, RebaseConfig, PathsConfig
//! ResetMode:  soft | mixed (default) | hard | keep
//! SavePolicy: stash (default) | shelve
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::ConfigError;
use crate::logging::LogLevel;

/// Mode passed to `git reset`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResetMode {
    Soft,
    #[default]
    Mixed,
    Hard,
    Keep,
}

impl ResetMode {
    /// Returns the command-line flag for this mode.
    #[must_use]
    pub const fn as_flag(self) -> &'static str {
        match self {
            Self::Soft => "--soft",
            Self::Mixed => "--mixed",
            Self::Hard => "--hard",
            Self::Keep => "--keep",
        }
    }
}

impl std::fmt::Display for ResetMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Soft => write!(f, "soft"),
            Self::Mixed => write!(f, "mixed"),
            Self::Hard => write!(f, "hard"),
            Self::Keep => write!(f, "keep"),
        }
    }
}

impl std::str::FromStr for ResetMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "soft" => Ok(Self::Soft),
            "mixed" => Ok(Self::Mixed),
            "hard" => Ok(Self::Hard),
            "keep" => Ok(Self::Keep),
            _ => Err(ConfigError::InvalidValue {
                section: "reset".to_string(),
                key: "default_mode".to_string(),
                message: format!("expected 'soft', 'mixed', 'hard', or 'keep', got '{s}'"),
            }),
        }
    }
}

/// How uncommitted changes are set aside when an operation needs a clean
/// working tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SavePolicy {
    /// Use the repository stash.
    #[default]
    Stash,
    /// Use a binary patch file outside the repository.
    Shelve,
}

impl std::fmt::Display for SavePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stash => write!(f, "stash"),
            Self::Shelve => write!(f, "shelve"),
        }
    }
}

impl std::str::FromStr for SavePolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "stash" => Ok(Self::Stash),
            "shelve" => Ok(Self::Shelve),
            _ => Err(ConfigError::InvalidValue {
                section: "git".to_string(),
                key: "save_policy".to_string(),
                message: format!("expected 'stash' or 'shelve', got '{s}'"),
            }),
        }
    }
}

/// Global configuration options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GlobalConfig {
    /// Log level for stdout output (0-5).
    pub output_log_level: LogLevel,
    /// Log level for file output (0-5).
    pub file_log_level: LogLevel,
    /// Path to log file (empty disables file logging).
    pub log_file: PathBuf,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            output_log_level: LogLevel::INFO,
            file_log_level: LogLevel::TRACE,
            log_file: PathBuf::new(),
        }
    }
}

/// Git invocation options.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GitConfig {
    /// Explicit git executable path; resolved via PATH when unset.
    pub executable: Option<PathBuf>,
    /// How local changes are set aside for smart operations.
    pub save_policy: SavePolicy,
    /// Per-command timeout in seconds (0 disables the timeout).
    pub timeout_secs: u64,
}

/// Defaults for the reset command.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResetConfig {
    /// Mode used when the command line does not name one.
    pub default_mode: ResetMode,
}

/// Last-used rebase options, consumed as defaults for the next run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RebaseConfig {
    /// Default upstream to rebase onto.
    pub upstream: Option<String>,
    /// Default --onto argument.
    pub onto: Option<String>,
}

/// Workspace paths.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PathsConfig {
    /// Directory whose immediate children are the managed repositories.
    /// Defaults to the current directory when unset.
    pub workspace: Option<PathBuf>,
}
