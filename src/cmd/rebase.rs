// armada: Multi-Repository Git Operation Orchestrator
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Rebase command implementation.
//!
//! ```text
//! armada rebase origin/main       fresh spec, snapshot, drive
//! armada rebase --continue|--skip resume the single suspended repo
//! armada rebase --abort [--rollback]
//! ```

use anyhow::Context;

use crate::cli::rebase::RebaseArgs;
use crate::config::Config;
use crate::error::Result;
use crate::op::rebase::{RebaseExecutor, ResumeAction};
use crate::op::saver::saver_for_policy;
use crate::op::spec::{RebaseParams, RebaseSpec};
use crate::op::{LiveStateProbe, LocalChangesDecision, Outcome, RebaseStateProbe, Repo};

use super::{CliHost, CliNotifier, build_runner, cancellation_token, preflight_git, resolve_repos};

/// Main handler for the rebase command.
///
/// # Errors
///
/// Returns an error when git is missing or too old, the spec is invalid,
/// no upstream is known, or the rebase failed in at least one repository.
pub async fn run_rebase_command(args: &RebaseArgs, config: &Config) -> Result<()> {
    let repos = resolve_repos(&args.repos, config)?;
    let runner = build_runner(config)?;
    let token = cancellation_token();
    preflight_git(runner.as_ref(), &token).await?;

    let host = CliHost {
        decision: LocalChangesDecision::Cancel,
    };
    let notifier = CliNotifier;
    let probe = LiveStateProbe;
    let executor = RebaseExecutor::new(
        runner.as_ref(),
        &host,
        &notifier,
        &probe,
        token.clone(),
    );

    if args.abort || args.continue_rebase || args.skip {
        let spec = resume_spec(&repos, &probe)?;

        if args.abort {
            let outcome = executor.abort(&spec, args.rollback).await?;
            return finish("rebase abort", outcome);
        }

        let destination = config
            .rebase
            .upstream
            .clone()
            .unwrap_or_else(|| "upstream".to_string());
        let mut saver = saver_for_policy(
            config.git.save_policy,
            runner.clone(),
            "rebase",
            &destination,
            token.clone(),
        );
        let action = if args.skip {
            ResumeAction::Skip
        } else {
            ResumeAction::Continue
        };
        let run = executor.resume(spec, saver.as_mut(), action).await?;
        return finish("rebase", run.outcome);
    }

    let upstream = args
        .upstream
        .clone()
        .or_else(|| config.rebase.upstream.clone())
        .context("no upstream given and rebase.upstream is not configured")?;
    let params = RebaseParams::new(upstream)
        .with_onto(args.onto.clone().or_else(|| config.rebase.onto.clone()))
        .with_branch(args.branch.clone());
    let destination = params.destination().to_string();

    let spec = RebaseSpec::for_new_rebase(params, repos, runner.as_ref(), &token).await?;
    let mut saver = saver_for_policy(
        config.git.save_policy,
        runner.clone(),
        "rebase",
        &destination,
        token.clone(),
    );

    let run = executor.execute(spec, saver.as_mut()).await?;
    finish("rebase", run.outcome)
}

/// Builds the resume spec for the single repository mid-rebase on disk.
fn resume_spec(repos: &[Repo], probe: &dyn RebaseStateProbe) -> Result<RebaseSpec> {
    let in_progress: Vec<&Repo> = repos
        .iter()
        .filter(|repo| probe.is_rebase_in_progress(repo))
        .collect();

    match in_progress.as_slice() {
        [] => anyhow::bail!("no rebase is in progress in any managed repository"),
        [repo] => RebaseSpec::for_resume_in_single_repository((*repo).clone(), probe)
            .context("the rebase finished while armada was starting"),
        several => {
            let names: Vec<&str> = several.iter().map(|repo| repo.name()).collect();
            anyhow::bail!(
                "a rebase is in progress in several repositories ({}); \
                 pass the one to operate on explicitly",
                names.join(", ")
            )
        }
    }
}

fn finish(operation: &str, outcome: Outcome) -> Result<()> {
    match outcome {
        Outcome::Failed => anyhow::bail!("{operation} failed in at least one repository"),
        _ => Ok(()),
    }
}
