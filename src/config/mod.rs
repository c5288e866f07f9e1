// armada: Multi-Repository Git Operation Orchestrator
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Configuration management for armada.
//!
//! # Configuration Hierarchy
//!
//! ```text
//! Priority (low → high)
//! 1. defaults
//! 2. armada.toml (cwd)
//! 3. --config FILE
//! 4. ARMADA_* env vars
//! 5. CLI overrides (--set)
//! ```
//!
//! # Environment Variable Mapping
//!
//! ```text
//! ARMADA_GIT_SAVE_POLICY=shelve    → git.save_policy = "shelve"
//! ARMADA_RESET_DEFAULT_MODE=hard   → reset.default_mode = "hard"
//! ARMADA_PATHS_WORKSPACE=/repos    → paths.workspace = "/repos"
//! ```

pub mod loader;
pub mod types;

#[cfg(test)]
mod tests;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::Result;

use loader::ConfigLoader;
use types::{GitConfig, GlobalConfig, PathsConfig, RebaseConfig, ResetConfig};

/// Complete application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Global options.
    pub global: GlobalConfig,
    /// Git invocation options.
    pub git: GitConfig,
    /// Reset defaults.
    pub reset: ResetConfig,
    /// Last-used rebase options.
    pub rebase: RebaseConfig,
    /// Paths configuration.
    pub paths: PathsConfig,
}

impl Config {
    /// Create a new configuration builder.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use armada::config::Config;
    ///
    /// let config = Config::builder()
    ///     .add_toml_file_optional("armada.toml")
    ///     .with_env_prefix("ARMADA")
    ///     .build()?;
    /// # Ok::<(), anyhow::Error>(())
    /// ```
    #[must_use]
    pub fn builder() -> ConfigLoader {
        ConfigLoader::new()
    }

    /// Load configuration from a single TOML file (simple API).
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, contains invalid TOML, or
    /// does not match the `Config` structure.
    pub fn from_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        Self::builder().add_toml_file(path).build()
    }

    /// Load configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the content is not valid TOML or does not match the
    /// `Config` structure.
    pub fn parse(content: &str) -> Result<Self> {
        Self::builder().add_toml_str(content).build()
    }

    /// Format configuration options for display.
    ///
    /// Returns a vector of formatted strings representing all configuration
    /// options. Output is deterministically ordered using `BTreeMap`.
    #[must_use]
    pub fn format_options(&self) -> Vec<String> {
        let mut options = BTreeMap::new();

        options.insert(
            "global.output_log_level".to_string(),
            self.global.output_log_level.as_u8().to_string(),
        );
        options.insert(
            "global.file_log_level".to_string(),
            self.global.file_log_level.as_u8().to_string(),
        );
        options.insert(
            "global.log_file".to_string(),
            self.global.log_file.display().to_string(),
        );
        options.insert(
            "git.executable".to_string(),
            self.git
                .executable
                .as_ref()
                .map_or_else(String::new, |p| p.display().to_string()),
        );
        options.insert(
            "git.save_policy".to_string(),
            self.git.save_policy.to_string(),
        );
        options.insert(
            "git.timeout_secs".to_string(),
            self.git.timeout_secs.to_string(),
        );
        options.insert(
            "reset.default_mode".to_string(),
            self.reset.default_mode.to_string(),
        );
        options.insert(
            "rebase.upstream".to_string(),
            self.rebase.upstream.clone().unwrap_or_default(),
        );
        options.insert(
            "rebase.onto".to_string(),
            self.rebase.onto.clone().unwrap_or_default(),
        );
        options.insert(
            "paths.workspace".to_string(),
            self.paths
                .workspace
                .as_ref()
                .map_or_else(String::new, |p| p.display().to_string()),
        );

        let max_key_len = options.keys().map(String::len).max().unwrap_or(0);

        options
            .into_iter()
            .map(|(key, value)| format!("{key:<max_key_len$} = {value}"))
            .collect()
    }
}
