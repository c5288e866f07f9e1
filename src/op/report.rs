// armada: Multi-Repository Git Operation Orchestrator
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Consolidation of per-repository results into one notification.
//!
//! ```text
//! {repo -> OperationResult}
//!        |
//!        v  group failures by exact (escaped) error text
//! Notification { severity, title, body }
//!   all ok   -> SUCCESS  "<op> successful"
//!   mixed    -> WARNING  "<op> partially failed"
//!   all fail -> ERROR    "<op> failed"
//!
//! 3 repos, same stderr  =>  ONE block "a, b, c: <error>"
//! ```
//!
//! Pure functions; the only side effect lives in [`emit`].

use std::collections::BTreeMap;

use super::{Notifier, OperationResult};

/// How loudly the notification is presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Warning,
    Error,
}

/// One consolidated, presentation-agnostic notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub severity: Severity,
    pub title: String,
    pub body: String,
}

/// Sends a notification through the sink matching its severity.
pub fn emit(notifier: &dyn Notifier, notification: &Notification) {
    match notification.severity {
        Severity::Success => notifier.notify_success(&notification.title, &notification.body),
        Severity::Warning => notifier.notify_warning(&notification.title, &notification.body),
        Severity::Error => notifier.notify_error(&notification.title, &notification.body),
    }
}

/// Escapes text for HTML-capable notification sinks.
#[must_use]
pub fn html_escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Builds the consolidated verdict for a finished multi-repository pass.
///
/// Repositories failing with byte-identical error text are grouped into
/// a single block listing all their names, never repeated per
/// repository.
#[must_use]
pub fn consolidated(
    op_title: &str,
    results: &BTreeMap<String, OperationResult>,
) -> Notification {
    let successes: Vec<&str> = results
        .iter()
        .filter(|(_, result)| result.command.success())
        .map(|(name, _)| name.as_str())
        .collect();

    // group key = exact error text; BTreeMap iteration keeps repo names
    // sorted within each group and groups sorted by text
    let mut failure_groups: BTreeMap<String, Vec<&str>> = BTreeMap::new();
    for (name, result) in results {
        if !result.command.success() {
            failure_groups
                .entry(html_escape(&result.error_text()))
                .or_default()
                .push(name.as_str());
        }
    }

    if failure_groups.is_empty() {
        return Notification {
            severity: Severity::Success,
            title: format!("{op_title} successful"),
            body: successes.join(", "),
        };
    }

    let mut lines = Vec::new();
    let partial = !successes.is_empty();
    if partial {
        lines.push(format!("Succeeded: {}", successes.join(", ")));
    }
    for (error, names) in &failure_groups {
        lines.push(format!("{}: {}", names.join(", "), error));
    }

    if partial {
        Notification {
            severity: Severity::Warning,
            title: format!("{op_title} partially failed"),
            body: lines.join("\n"),
        }
    } else {
        Notification {
            severity: Severity::Error,
            title: format!("{op_title} failed"),
            body: lines.join("\n"),
        }
    }
}

/// Builds the warning shown when a rebase pauses on conflicts.
#[must_use]
pub fn suspended(repo_name: &str, remaining: usize) -> Notification {
    let mut body = format!(
        "Conflicts must be resolved in '{repo_name}'. \
         Resolve them, then run `armada rebase --continue` \
         (or `--skip` / `--abort`)."
    );
    if remaining > 0 {
        use std::fmt::Write as _;
        let _ = write!(
            body,
            " {remaining} more {} not been rebased yet.",
            if remaining == 1 {
                "repository has"
            } else {
                "repositories have"
            }
        );
    }
    Notification {
        severity: Severity::Warning,
        title: "Rebase suspended".to_string(),
        body,
    }
}
