//! Error types for the `wayfarer-store` crate.
//!
//! All fallible store operations return [`StoreError`].

use std::path::PathBuf;

/// Errors that can occur while reading or writing documents.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A filesystem operation failed.
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        /// The file or directory being accessed.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// A stored document could not be decoded.
    #[error("corrupt document {location}: {source}")]
    Decode {
        /// Where the document lives (path or key).
        location: String,
        /// The underlying JSON error.
        source: serde_json::Error,
    },

    /// A document could not be encoded for writing.
    #[error("failed to encode document: {0}")]
    Encode(#[source] serde_json::Error),

    /// No storage unit exists under the key.
    #[error("no document stored under key {0:?}")]
    NotFound(String),

    /// A storage unit already exists under the key.
    #[error("key {0:?} is already taken")]
    Conflict(String),

    /// The key or asset name cannot be used as a path component.
    #[error("invalid storage key {0:?}")]
    InvalidKey(String),
}

impl StoreError {
    /// Build an [`StoreError::Io`] for the given path.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
