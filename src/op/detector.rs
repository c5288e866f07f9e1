// armada: Multi-Repository Git Operation Orchestrator
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Detection of "local changes would be overwritten" diagnostics in
//! streamed git output.
//!
//! ```text
//! error: Your local changes to the following files would be overwritten by merge:
//! \tsrc/config.rs          <- collected
//! \tsrc/main.rs            <- collected
//! Please commit your changes or stash them before you merge.
//! ```
//!
//! The detector is a [`LineListener`]: it sees lines while the command
//! runs. Absence of a match is a normal outcome, and malformed output is
//! never an error.

use std::path::{Path, PathBuf};

use crate::core::process::{LineListener, StreamSource};

use super::OperationKind;

/// Marker lines shared by every operation: git asking for a clean tree.
const COMMON_MARKERS: &[&str] = &[
    "Your local changes to the following files would be overwritten",
    "The following untracked working tree files would be overwritten",
    // old git spells this with a comma, newer without
    "Please, commit your changes or stash them",
    "Please commit your changes or stash them",
];

/// Extra markers per operation family.
const fn operation_markers(kind: OperationKind) -> &'static [&'static str] {
    match kind {
        OperationKind::Rebase => &[
            "cannot rebase: You have unstaged changes",
            "cannot rebase: Your index contains uncommitted changes",
        ],
        OperationKind::Checkout => {
            &["Cannot merge with a dirty working tree"]
        }
        OperationKind::Reset | OperationKind::Merge => &[],
    }
}

/// Scans streamed command output for the known local-changes diagnostics
/// and collects the file paths git lists beneath them.
#[derive(Debug)]
pub struct OverwriteDetector {
    root: PathBuf,
    kind: OperationKind,
    detected: bool,
    collecting: bool,
    paths: Vec<String>,
}

impl OverwriteDetector {
    /// Creates a detector for one repository and operation family.
    pub fn new(root: impl Into<PathBuf>, kind: OperationKind) -> Self {
        Self {
            root: root.into(),
            kind,
            detected: false,
            collecting: false,
            paths: Vec::new(),
        }
    }

    /// Whether any known diagnostic was seen.
    #[must_use]
    pub const fn was_message_detected(&self) -> bool {
        self.detected
    }

    /// The paths git listed under the diagnostic, in output order,
    /// relative to the repository root.
    #[must_use]
    pub fn relative_file_paths(&self) -> &[String] {
        &self.paths
    }

    /// The collected paths resolved against the repository root.
    #[must_use]
    pub fn absolute_file_paths(&self) -> Vec<PathBuf> {
        self.paths.iter().map(|p| self.root.join(p)).collect()
    }

    /// The repository root this detector watches.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn is_marker(&self, line: &str) -> bool {
        COMMON_MARKERS
            .iter()
            .chain(operation_markers(self.kind))
            .any(|marker| line.contains(marker))
    }

    /// File lists are indented with a tab (or spaces from some wrappers).
    fn looks_like_path(line: &str) -> bool {
        (line.starts_with('\t') || line.starts_with("    ")) && !line.trim().is_empty()
    }
}

impl LineListener for OverwriteDetector {
    fn on_line(&mut self, line: &str, _source: StreamSource) {
        if self.is_marker(line) {
            self.detected = true;
            // only the overwrite markers are followed by a path list;
            // the commit-or-stash advice ends it
            self.collecting = line.contains("would be overwritten");
            return;
        }

        if self.collecting {
            if Self::looks_like_path(line) {
                self.paths.push(line.trim().to_string());
            } else {
                self.collecting = false;
            }
        }
    }
}
