// armada: Multi-Repository Git Operation Orchestrator
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Reset command implementation.

use crate::cli::reset::ResetArgs;
use crate::config::Config;
use crate::error::Result;
use crate::op::reset::{ResetExecutor, ResetRequest};
use crate::op::saver::{ChangesSaver, saver_for_policy};
use crate::op::Outcome;

use super::{CliHost, CliNotifier, build_runner, cancellation_token, preflight_git, resolve_repos};

/// Main handler for the reset command.
///
/// # Errors
///
/// Returns an error when git is missing or too old, a named repository
/// does not exist, or the reset failed in at least one repository.
pub async fn run_reset_command(args: &ResetArgs, config: &Config) -> Result<()> {
    let repos = resolve_repos(&args.repos, config)?;
    let runner = build_runner(config)?;
    let token = cancellation_token();
    preflight_git(runner.as_ref(), &token).await?;

    let mode = args.mode.unwrap_or(config.reset.default_mode);
    let host = CliHost {
        decision: args.on_conflict.into(),
    };
    let notifier = CliNotifier;

    let policy = config.git.save_policy;
    let saver_runner = runner.clone();
    let saver_target = args.target.clone();
    let saver_token = token.clone();
    let new_saver = move || -> Box<dyn ChangesSaver> {
        saver_for_policy(
            policy,
            saver_runner.clone(),
            "reset",
            &saver_target,
            saver_token.clone(),
        )
    };

    let executor = ResetExecutor::new(
        runner.as_ref(),
        &host,
        &notifier,
        &new_saver,
        token.clone(),
    );

    let request = ResetRequest {
        mode,
        target: args.target.clone(),
        repos,
    };
    let run = executor.execute(&request).await?;

    match run.outcome {
        Outcome::Failed => anyhow::bail!("reset failed in at least one repository"),
        _ => Ok(()),
    }
}
