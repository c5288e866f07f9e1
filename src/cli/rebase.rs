// armada: Multi-Repository Git Operation Orchestrator
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Arguments for the rebase command.

use clap::Args;
use std::path::PathBuf;

/// Rebases every managed repository onto an upstream, or drives a rebase
/// that is already in progress.
#[derive(Debug, Clone, Args)]
pub struct RebaseArgs {
    /// Upstream to rebase onto (e.g. origin/main); defaults to
    /// rebase.upstream from config.
    pub upstream: Option<String>,

    /// Rebase onto this ref instead of the upstream (git rebase --onto).
    #[arg(long)]
    pub onto: Option<String>,

    /// Branch to check out and rebase; the current branch when omitted.
    #[arg(short = 'b', long)]
    pub branch: Option<String>,

    /// Repositories to rebase (paths). All discovered repositories in the
    /// workspace when omitted.
    #[arg(value_name = "REPO")]
    pub repos: Vec<PathBuf>,

    /// Continue the rebase that is suspended on conflicts.
    #[arg(
        long = "continue",
        conflicts_with_all = ["skip", "abort", "upstream", "onto", "branch"]
    )]
    pub continue_rebase: bool,

    /// Skip the conflicting commit of the suspended rebase.
    #[arg(long, conflicts_with_all = ["abort", "upstream", "onto", "branch"])]
    pub skip: bool,

    /// Abort the suspended rebase.
    #[arg(long, conflicts_with_all = ["upstream", "onto", "branch"])]
    pub abort: bool,

    /// With --abort: also reset repositories that already rebased
    /// successfully back to their pre-rebase positions.
    #[arg(long, requires = "abort")]
    pub rollback: bool,
}
