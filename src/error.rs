//! Error handling utilities shared across the crate.

use std::path::PathBuf;

use thiserror::Error;

/// Convenient result type used throughout the crate.
pub type Result<T, E = EmlangError> = std::result::Result<T, E>;

/// Domain-specific error describing failures during configuration, IO, or codebook handling.
///
/// Decoding never produces an error: malformed fallback blocks and unknown symbols are
/// reported through [`crate::metrics::DecodeReport`] instead.
#[derive(Debug, Error)]
pub enum EmlangError {
    /// Training or encoding configuration failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// A persisted codebook is missing fields or violates codebook invariants.
    #[error("corrupt codebook: {0}")]
    CorruptCodebook(String),
    /// Filesystem IO error with optional context path.
    #[error("io error while processing {path:?}: {source}")]
    Io {
        /// Underlying IO error returned by the standard library.
        source: std::io::Error,
        /// Target path associated with the IO failure if available.
        path: Option<PathBuf>,
    },
    /// Serialization failure while writing a codebook.
    #[error("serialization error: {0}")]
    Serialization(String),
    /// Catch-all variant for invariants that should not occur.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<serde_json::Error> for EmlangError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl EmlangError {
    /// Helper constructor that attaches an optional path when wrapping IO errors.
    pub fn io(source: std::io::Error, path: Option<PathBuf>) -> Self {
        Self::Io { source, path }
    }

    /// Shorthand for [`EmlangError::CorruptCodebook`].
    pub fn corrupt(message: impl Into<String>) -> Self {
        Self::CorruptCodebook(message.into())
    }
}
