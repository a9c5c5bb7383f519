//! Error types for the `wayfarer-catalog` crate.

use wayfarer_store::StoreError;

/// Errors returned by catalog operations.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// The identifier does not resolve to a stored entity.
    #[error("{0} not found")]
    NotFound(String),

    /// The request is malformed: a required field is missing, the update
    /// body is empty, or too few attractions were given to plan a route.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The single document a read targeted is corrupt.
    #[error("corrupt document: {0}")]
    Decode(#[source] StoreError),

    /// Creating, writing or removing a storage unit failed.
    #[error("storage failure: {0}")]
    Storage(#[source] StoreError),
}

impl From<StoreError> for CatalogError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Decode { .. } => Self::Decode(err),
            StoreError::NotFound(key) => Self::NotFound(format!("storage unit {key:?}")),
            StoreError::InvalidKey(key) => Self::InvalidInput(format!("invalid name {key:?}")),
            other => Self::Storage(other),
        }
    }
}
