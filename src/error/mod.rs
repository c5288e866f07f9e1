// armada: Multi-Repository Git Operation Orchestrator
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Error handling module.
//!
//! ```text
//!             ArmadaError (~24 bytes)
//!                    |
//!   +--------+------+------+--------+
//!   |    |   |      |      |      | |
//!   v    v   v      v      v      v v
//! Bail  Git Cfg    Proc   Op   Io/Other
//!       Box Box    Box    Box  Box<str>
//!
//! Sub-errors (unboxed internally):
//!   Git     Gix, CommandFailed, RepoNotFound, VersionParse
//!   Config  ParseError, MissingKey, InvalidValue
//!   Process SpawnFailed, NonZeroExit, Timeout
//!   Op      InvalidSpec, SaveFailed, NotRestored
//!
//! All variants boxed => ArmadaError fits in 24 bytes.
//! ```

use thiserror::Error;

/// Convenience alias for `anyhow::Result`.
pub type Result<T> = anyhow::Result<T>;

/// Result type using [`ArmadaError`].
pub type ArmadaResult<T> = std::result::Result<T, ArmadaError>;

/// Top-level application error type.
///
/// All sub-errors are boxed to keep this enum at ~24 bytes on the stack.
#[derive(Debug, Error)]
pub enum ArmadaError {
    /// Fatal error that should terminate the application.
    #[error("fatal error: {0}")]
    Bailed(Box<str>),

    /// Git operation failed.
    #[error("git error: {0}")]
    Git(#[from] Box<GitError>),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(#[from] Box<ConfigError>),

    /// Process execution error.
    #[error("process error: {0}")]
    Process(#[from] Box<ProcessError>),

    /// Multi-repository operation error.
    #[error("operation error: {0}")]
    Op(#[from] Box<OpError>),

    /// I/O error.
    #[error("io error: {0}")]
    Io(Box<std::io::Error>),

    /// Generic error with message.
    #[error("{0}")]
    Other(Box<str>),
}

/// Create a fatal [`ArmadaError::Bailed`] that terminates the application.
pub fn bail_out(message: impl Into<String>) -> ArmadaError {
    ArmadaError::Bailed(message.into().into_boxed_str())
}

// --- From implementations for boxing ---

/// Macro to generate `From` implementations that box the source error.
macro_rules! impl_from_boxed {
    ($($error:ty => $variant:ident),+ $(,)?) => {
        $(
            impl From<$error> for ArmadaError {
                fn from(err: $error) -> Self {
                    ArmadaError::$variant(Box::new(err))
                }
            }
        )+
    };
}

impl_from_boxed! {
    GitError => Git,
    ConfigError => Config,
    ProcessError => Process,
    OpError => Op,
    std::io::Error => Io,
}

// --- Gix Errors ---

/// Wrapper for gix-specific errors.
///
/// gix has multiple error types that are converted through this enum.
/// Large error types are boxed to keep enum size manageable.
#[derive(Debug, Error)]
pub enum GixError {
    /// Failed to discover repository from path.
    #[error("failed to discover repository: {0}")]
    Discover(#[from] Box<gix::discover::Error>),

    /// Failed to open repository.
    #[error("failed to open repository: {0}")]
    Open(#[from] Box<gix::open::Error>),

    /// Failed to get HEAD reference.
    #[error("failed to get head reference: {0}")]
    Head(#[from] gix::reference::find::existing::Error),

    /// Repository has no worktree (bare repository).
    #[error("repository has no worktree (bare repository)")]
    BareRepository,
}

// --- Git Errors ---

/// Git operation errors.
#[derive(Debug, Error)]
pub enum GitError {
    /// Repository not found at the specified path.
    #[error("repository not found: {path}")]
    RepoNotFound { path: String },

    /// Git command execution failed.
    #[error("git command failed: {command} - {message}")]
    CommandFailed { command: String, message: String },

    /// Error from gix library.
    #[error("gix error: {0}")]
    Gix(#[from] GixError),

    /// `git version` output could not be parsed.
    #[error("unsupported format of git version output: {output:?}")]
    VersionParse { output: String },

    /// Installed git is older than the minimum supported version.
    #[error("git {found} is not supported, at least {required} is required")]
    UnsupportedVersion { found: String, required: String },
}

// --- Config Errors ---

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse configuration file.
    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: String, message: String },

    /// Missing required configuration key.
    #[error("missing required config key '{key}' in section '[{section}]'")]
    MissingKey { section: String, key: String },

    /// Invalid configuration value.
    #[error("invalid value for '{key}' in section '[{section}]': {message}")]
    InvalidValue {
        section: String,
        key: String,
        message: String,
    },

    /// Configuration file not found.
    #[error("config file not found: {0}")]
    NotFound(String),
}

// --- Process Errors ---

/// Process execution errors.
#[derive(Debug, Error)]
pub enum ProcessError {
    /// Executable not found in PATH.
    #[error("executable not found: '{name}' (not in PATH)")]
    ExecutableNotFound { name: String },

    /// Failed to spawn process.
    #[error("failed to spawn process '{command}': {source}")]
    SpawnFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// Process exited with non-zero status.
    #[error("process '{command}' exited with code {code}")]
    NonZeroExit { command: String, code: i32 },

    /// Process timed out.
    #[error("process '{command}' timed out after {timeout_secs} seconds")]
    Timeout { command: String, timeout_secs: u64 },

    /// Failed to read process output.
    #[error("failed to read output from process '{command}': {message}")]
    OutputError { command: String, message: String },
}

// --- Operation Errors ---

/// Multi-repository operation errors.
///
/// Cancellation is deliberately absent from this enum: it is an outcome,
/// not an error (`crate::op::Outcome::Cancelled`).
#[derive(Debug, Error)]
pub enum OpError {
    /// A rebase spec violates its invariants (more than one suspended
    /// repository, or stored statuses disagreeing with on-disk state).
    /// Fatal for the operation that tried to use the spec.
    #[error("invalid operation spec: {reason}")]
    InvalidSpec { reason: String },

    /// The change saver could not stash or shelve local modifications.
    /// The operation for the affected repositories aborts before the
    /// underlying git command is attempted.
    #[error("couldn't save uncommitted changes in {root}: {message}")]
    SaveFailed { root: String, message: String },

    /// Saved local changes could not be restored and remain set aside.
    #[error("local changes were not restored in {root}: {message}")]
    NotRestored { root: String, message: String },
}

#[cfg(test)]
mod tests;
