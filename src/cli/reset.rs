// armada: Multi-Repository Git Operation Orchestrator
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Arguments for the reset command.

use clap::Args;
use std::path::PathBuf;

use crate::config::types::ResetMode;
use crate::op::LocalChangesDecision;

/// How to react when uncommitted changes block an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ConflictChoice {
    /// Stash, retry the operation, restore afterwards.
    Smart,
    /// Discard local changes (`reset --hard`) and retry.
    Force,
    /// Leave the repository alone; the failure stands.
    Cancel,
}

impl From<ConflictChoice> for LocalChangesDecision {
    fn from(choice: ConflictChoice) -> Self {
        match choice {
            ConflictChoice::Smart => Self::Smart,
            ConflictChoice::Force => Self::Force,
            ConflictChoice::Cancel => Self::Cancel,
        }
    }
}

/// Resets every managed repository to a target revision.
#[derive(Debug, Clone, Args)]
pub struct ResetArgs {
    /// Commit to reset to (e.g. HEAD~1, a tag, a hash).
    pub target: String,

    /// Reset mode; defaults to reset.default_mode from config.
    #[arg(short = 'm', long)]
    pub mode: Option<ResetMode>,

    /// Repositories to reset (paths). All discovered repositories in the
    /// workspace when omitted.
    #[arg(value_name = "REPO")]
    pub repos: Vec<PathBuf>,

    /// What to do when local changes would be overwritten.
    #[arg(long = "on-conflict", value_enum, default_value = "cancel")]
    pub on_conflict: ConflictChoice,
}
