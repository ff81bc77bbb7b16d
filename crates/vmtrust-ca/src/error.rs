//! Error types for CA resolution and credential signing.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors raised by CA providers and credential signers.
#[derive(Error, Debug)]
pub enum CaError {
    /// Keyset, CA directory or one of its PEM files does not exist
    #[error("not found: {0}")]
    NotFound(String),

    /// CA material exists but cannot be read
    #[error("cannot read {}: {source}", .path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// CA material or an issued certificate cannot be parsed
    #[error("malformed {}: {reason}", .path.display())]
    Malformed { path: PathBuf, reason: String },

    /// Template fields cannot be encoded into a certificate
    #[error("invalid certificate template: {0}")]
    Template(String),

    /// Key generation or signing failed inside rcgen
    #[error("certificate generation failed: {0}")]
    Rcgen(#[from] rcgen::Error),

    /// Writing credential material failed
    #[error("i/o error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Refused to overwrite an existing credential file
    #[error("{} already exists", .path.display())]
    AlreadyExists { path: PathBuf },
}

impl CaError {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn malformed(path: &Path, reason: impl ToString) -> Self {
        Self::Malformed {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        }
    }
}

/// Result type alias for CA operations
pub type Result<T> = std::result::Result<T, CaError>;
