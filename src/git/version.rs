// armada: Multi-Repository Git Operation Orchestrator
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Parsing of `git version` output.
//!
//! ```text
//! "git version 2.30.1"           --> 2.30.1      (Unix)
//! "git version 2.30.1.windows.1" --> 2.30.1.1    (Windows)
//! "git version 1.8.3.msysgit.0"  --> 1.8.3.0     (Msys)
//! ```

use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;

use tokio_util::sync::CancellationToken;

use crate::error::{ArmadaResult, GitError, Result};

use super::runner::{GitRunner, run_git};

static VERSION_RE: OnceLock<Regex> = OnceLock::new();

fn version_re() -> &'static Regex {
    VERSION_RE.get_or_init(|| {
        Regex::new(r"git version ([0-9]+)\.([0-9]+)(?:\.([0-9]+))?(?:\.(\S+))?")
            .expect("hard-coded regex must compile")
    })
}

/// Flavor of the git build, detected from the version suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VersionKind {
    #[default]
    Unix,
    Windows,
    Msys,
}

/// A parsed git version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GitVersion {
    pub major: u32,
    pub minor: u32,
    pub revision: u32,
    pub patch_level: u32,
    pub kind: VersionKind,
}

/// Oldest git this tool is written against (`rebase --onto`, `stash push`).
pub const MINIMUM_SUPPORTED: GitVersion = GitVersion {
    major: 2,
    minor: 17,
    revision: 0,
    patch_level: 0,
    kind: VersionKind::Unix,
};

impl GitVersion {
    /// Parses the output of `git version`.
    ///
    /// # Errors
    ///
    /// Returns `GitError::VersionParse` when the output does not carry a
    /// recognizable version (including empty input).
    pub fn parse(output: &str) -> ArmadaResult<Self> {
        let parse_err = || GitError::VersionParse {
            output: output.to_string(),
        };

        let captures = version_re().captures(output.trim()).ok_or_else(parse_err)?;

        let number = |idx: usize| -> u32 {
            captures
                .get(idx)
                .and_then(|m| m.as_str().parse().ok())
                .unwrap_or(0)
        };

        let (kind, patch_level) = captures.get(4).map_or((VersionKind::Unix, 0), |suffix| {
            let suffix = suffix.as_str();
            let kind = if suffix.contains("windows") {
                VersionKind::Windows
            } else if suffix.contains("msysgit") || suffix.contains("msys") {
                VersionKind::Msys
            } else {
                VersionKind::Unix
            };
            let patch = suffix
                .split('.')
                .filter_map(|token| token.parse().ok())
                .next_back()
                .unwrap_or(0);
            (kind, patch)
        });

        Ok(Self {
            major: number(1),
            minor: number(2),
            revision: number(3),
            patch_level,
            kind,
        })
    }

    /// Numeric comparison ignoring the build flavor.
    #[must_use]
    pub const fn is_at_least(&self, other: &Self) -> bool {
        let lhs = (self.major, self.minor, self.revision, self.patch_level);
        let rhs = (other.major, other.minor, other.revision, other.patch_level);
        // tuple comparison spelled out to stay const
        lhs.0 > rhs.0
            || (lhs.0 == rhs.0
                && (lhs.1 > rhs.1
                    || (lhs.1 == rhs.1
                        && (lhs.2 > rhs.2 || (lhs.2 == rhs.2 && lhs.3 >= rhs.3)))))
    }

    /// Fails when the installed git predates [`MINIMUM_SUPPORTED`].
    ///
    /// # Errors
    ///
    /// Returns `GitError::UnsupportedVersion` for older versions.
    pub fn ensure_supported(&self) -> ArmadaResult<()> {
        if self.is_at_least(&MINIMUM_SUPPORTED) {
            Ok(())
        } else {
            Err(GitError::UnsupportedVersion {
                found: self.to_string(),
                required: MINIMUM_SUPPORTED.to_string(),
            }
            .into())
        }
    }
}

impl std::fmt::Display for GitVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.revision)?;
        if self.patch_level > 0 {
            write!(f, ".{}", self.patch_level)?;
        }
        Ok(())
    }
}

/// Asks the installed git for its version.
///
/// # Errors
///
/// Returns an error when git cannot be spawned or its output cannot be
/// parsed.
pub async fn detect(
    runner: &dyn GitRunner,
    cwd: &Path,
    token: &CancellationToken,
) -> Result<GitVersion> {
    let result = run_git(runner, cwd, &["version"], token).await?;
    let line = result
        .stdout()
        .first()
        .map(String::as_str)
        .unwrap_or_default();
    Ok(GitVersion::parse(line)?)
}
