//! Error type shared by the loader, normalizer, and command plumbing.
//!
//! Validation problems are not errors: they are reported as
//! [`Diagnostic`](crate::models::Diagnostic) values. This enum only covers
//! conditions that abort a run.

use std::path::PathBuf;
use thiserror::Error;

/// Fatal errors raised by `repolist` operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Reading or writing a file failed.
    #[error("cannot access '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The input is not well-formed XML.
    #[error("{file}:{line}: malformed XML: {message}")]
    Parse {
        file: String,
        line: usize,
        message: String,
    },

    /// The document is well-formed but lacks a structure the operation relies on.
    #[error("invalid repository list: {0}")]
    Structure(String),

    /// A configuration file could not be read or holds an invalid value.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The insecure-source pattern is not a valid regular expression.
    #[error("invalid insecure-source pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}
