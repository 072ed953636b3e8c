//! Error types for scrollsearch.
//!
//! This module defines a hierarchical error taxonomy using `thiserror` for structured error
//! handling. Errors compose via `?` and `From` conversions.
//!
//! # Error Hierarchy
//!
//! - [`AppError`] - Top-level error returned from the shell
//!   - [`InputError`] - Catalog file reading failures (not found, IO, malformed line)
//!   - [`CommandError`] - Shell command lines that cannot be parsed
//!   - [`ConfigError`](crate::config::ConfigError) - Config file failures
//!   - [`LoggingError`](crate::logging::LoggingError) - Tracing setup failures
//! - [`FetchError`] - A single page request failed (never escapes the controller)
//!
//! # Error Recovery Strategy
//!
//! Fetch errors are **non-fatal** and terminal only to the one page request that failed:
//! the session records the failure, clears its in-flight flag and waits for the user to
//! scroll or change criteria. Stale deliveries and empty result sets are not errors at all.
//! Input, config and logging errors are fatal and propagate to `main`.

use crate::config::ConfigError;
use crate::logging::LoggingError;
use std::path::PathBuf;
use thiserror::Error;

/// Top-level application error encompassing all fatal failure modes.
#[derive(Debug, Error)]
pub enum AppError {
    /// Failed to load the catalog backing the data source.
    #[error("Failed to read input: {0}")]
    Input(#[from] InputError),

    /// Configuration could not be loaded or is invalid.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Tracing could not be initialized.
    #[error("Logging error: {0}")]
    Logging(#[from] LoggingError),

    /// Stdout/stdin failures in the shell.
    #[error("Terminal error: {0}")]
    Terminal(#[from] std::io::Error),
}

/// Errors encountered when loading a catalog from disk.
#[derive(Debug, Error)]
pub enum InputError {
    /// The specified catalog file does not exist.
    #[error("File not found: {path}")]
    FileNotFound {
        /// The filesystem path that was not found.
        path: PathBuf,
    },

    /// A catalog line is not a valid entry.
    #[error("Invalid catalog entry at line {line}: {message}")]
    MalformedLine {
        /// 1-based line number.
        line: usize,
        /// Parser message.
        message: String,
    },

    /// Generic I/O failure while reading.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A page request failed.
///
/// Transient by assumption: nothing retries automatically, but a later page
/// request for the same cursor is allowed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The source could not be reached or refused the request.
    #[error("data source unavailable: {0}")]
    Unavailable(String),

    /// The request did not finish in time.
    #[error("request timed out after {elapsed_ms}ms")]
    TimedOut {
        /// Time waited before giving up.
        elapsed_ms: u64,
    },

    /// The source answered with something that is not a page.
    #[error("malformed response: {0}")]
    Malformed(String),

    /// The worker executing the request went away before answering.
    #[error("fetch worker stopped before completing the request")]
    WorkerGone,
}

/// A shell command line could not be understood.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    /// First word is not a known command.
    #[error("unknown command: {0}")]
    Unknown(String),

    /// The command needs an argument that was not given.
    #[error("missing argument for `{command}`")]
    MissingArgument {
        /// Command name.
        command: &'static str,
    },

    /// The argument could not be parsed.
    #[error("invalid argument for `{command}`: {reason}")]
    InvalidArgument {
        /// Command name.
        command: &'static str,
        /// What was wrong with it.
        reason: String,
    },
}
