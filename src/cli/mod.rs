// armada: Multi-Repository Git Operation Orchestrator
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! CLI module for armada using clap derive.
//!
//! # Command Structure
//!
//! ```text
//! armada [global options] <command>
//! reset <target> [repos...]
//! rebase [upstream] [repos...] | --continue | --skip | --abort
//! repos
//! options
//! configs
//! ```

pub mod global;
pub mod rebase;
pub mod reset;

#[cfg(test)]
mod tests;

use crate::cli::global::GlobalOptions;
use crate::cli::rebase::RebaseArgs;
use crate::cli::reset::ResetArgs;
use clap::{Parser, Subcommand};

/// Multi-Repository Git Operation Orchestrator
///
/// Runs one git operation across many working trees at once.
#[derive(Debug, Parser)]
#[command(
    name = "armada",
    author,
    version,
    about = "Multi-repository git operation orchestrator",
    long_about = "armada Copyright (C) 2026 Romeo Ahmed\n\
                  This program comes with ABSOLUTELY NO WARRANTY\n\
                  This is free software, and you are welcome to redistribute it\n\
                  under certain conditions; see LICENSE for details.\n\n\
                  armada coordinates a git operation (reset, rebase) across every\n\
                  repository in a workspace: it snapshots starting positions, works\n\
                  around blocking local changes by stashing and retrying, and reports\n\
                  one consolidated outcome. See `armada <command> --help` for more\n\
                  information about a command.",
    after_help = "CONFIG FILES:\n\n\
                  By default, armada loads `armada.toml` from the current directory\n\
                  when present. Additional files can be specified with --config and\n\
                  are loaded afterwards, overriding earlier values. Environment\n\
                  variables prefixed with ARMADA_ override files, and --set overrides\n\
                  everything. Use --no-default-config to disable auto detection."
)]
pub struct Cli {
    /// Global options shared by all commands
    #[command(flatten)]
    pub global: GlobalOptions,

    /// Command to execute
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Shows the version.
    #[command(visible_alias = "-v")]
    Version,

    /// Lists all options and their values from the config files.
    Options,

    /// Lists the config files used by armada.
    Configs,

    /// Lists the managed repositories with their current branch.
    Repos,

    /// Resets repositories to a target revision.
    Reset(ResetArgs),

    /// Rebases repositories onto an upstream.
    Rebase(RebaseArgs),
}

/// Parses command-line arguments.
#[must_use]
pub fn parse() -> Cli {
    Cli::parse()
}

/// Parses command-line arguments from an iterator.
pub fn parse_from<I, T>(iter: I) -> Cli
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    Cli::parse_from(iter)
}

/// Tries to parse command-line arguments, returning an error on failure.
///
/// # Errors
///
/// Returns a `clap::Error` if the arguments are invalid or if help/version
/// information was requested.
pub fn try_parse() -> Result<Cli, clap::Error> {
    Cli::try_parse()
}
