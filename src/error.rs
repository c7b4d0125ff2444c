//! Error kinds from spec.md §7.
//!
//! `NoMatch` is deliberately absent from this enum: detectors signal
//! non-match with a plain `bool`/`Option`, never by returning an error —
//! only the four *rejecting* kinds need a typed variant here.

use thiserror::Error;

/// Why an `install` call failed after its detector had already claimed the
/// archive. Each variant carries the user-facing message the host should
/// show (spec.md §7's "install functions return a rejected result carrying
/// a user-facing message").
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InstallError {
    /// The archive's structure could not be resolved into a valid layout
    /// (e.g. an Archive-only mod where the chosen layout covers fewer files
    /// than the archive contains).
    #[error("unresolvable archive structure: {0}")]
    Structure(String),

    /// A recognized layout failed schema or whitelist validation (e.g. a
    /// misplaced `options.json`, an invalid `info.json`).
    #[error("validation failed: {0}")]
    Validation(String),

    /// More than one mutually-exclusive layout of the same kind was
    /// present and the user did not choose to fall back.
    #[error("conflicting layouts detected: {0}")]
    Conflict(String),

    /// Reading a staging file (almost always `info.json`) failed.
    #[error("failed to read {path}: {source}")]
    Io { path: String, source: String },
}

impl InstallError {
    pub fn io(path: impl Into<String>, source: impl std::fmt::Display) -> Self {
        InstallError::Io { path: path.into(), source: source.to_string() }
    }
}

pub type InstallResult<T> = Result<T, InstallError>;
