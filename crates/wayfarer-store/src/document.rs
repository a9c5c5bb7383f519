//! The storage contract shared by every backend.
//!
//! A store holds one document per key. How a key maps to bytes on disk (a
//! directory, an array slot, a map entry) is the backend's business; the
//! catalog only sees [`DocumentStore`] and [`AssetStore`].

use serde::Serialize;
use serde::de::DeserializeOwned;
use wayfarer_types::{Attraction, Route};

use crate::error::StoreError;

/// A document type that knows its own storage key.
pub trait StoredDocument: Serialize + DeserializeOwned + Clone + Send + Sync {
    /// The key this document is stored under.
    fn storage_key(&self) -> String;

    /// Record the key the document was loaded from. Backends call this
    /// after decoding so the location on disk wins over whatever the
    /// document body claims.
    fn bind_storage_key(&mut self, _key: &str) {}
}

impl StoredDocument for Attraction {
    fn storage_key(&self) -> String {
        self.dir_name.clone()
    }

    fn bind_storage_key(&mut self, key: &str) {
        key.clone_into(&mut self.dir_name);
    }
}

impl StoredDocument for Route {
    fn storage_key(&self) -> String {
        self.id.to_string()
    }
}

/// Keyed document storage.
///
/// `list` is a full scan that never fails because of a single bad document:
/// units that vanish mid-scan or cannot be decoded are logged and skipped.
/// `get` on the other hand reports a corrupt document as
/// [`StoreError::Decode`], since the caller asked for that one document.
pub trait DocumentStore<T: StoredDocument>: Send + Sync {
    /// Every readable document in the backend's natural order: key order
    /// for directories and maps, element order for an array file.
    ///
    /// # Errors
    ///
    /// Returns an error only if the collection itself cannot be read.
    fn list(&self) -> Result<Vec<T>, StoreError>;

    /// The document stored under `key`, or `None` if there is none.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Decode`] if the document is corrupt, or
    /// [`StoreError::Io`] if it cannot be read.
    fn get(&self, key: &str) -> Result<Option<T>, StoreError>;

    /// Create a new storage unit for `doc` under its own key.
    ///
    /// Either the whole unit is created or nothing is left behind.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Conflict`] if the key is already taken.
    fn insert(&self, doc: &T) -> Result<(), StoreError>;

    /// Overwrite the document of an existing unit.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if no unit exists under the key.
    fn put(&self, doc: &T) -> Result<(), StoreError>;

    /// Remove the unit stored under `key`, including its assets.
    ///
    /// Returns `false` if there was nothing to remove.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the unit exists but cannot be removed.
    fn delete(&self, key: &str) -> Result<bool, StoreError>;

    /// The highest id ever issued for this collection, including ids whose
    /// documents have since been deleted. `0` if none was recorded.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the mark exists but cannot be read.
    fn last_issued_id(&self) -> Result<u64, StoreError>;

    /// Record that `id` has been issued. Never lowers the mark.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the mark cannot be written.
    fn record_issued_id(&self, id: u64) -> Result<(), StoreError>;
}

/// Binary assets stored next to a document.
pub trait AssetStore: Send + Sync {
    /// Store `bytes` as `name` inside the unit for `key`, replacing any
    /// existing asset of the same name.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if the unit does not exist and
    /// [`StoreError::InvalidKey`] if `name` is not a plain file name.
    fn write_asset(&self, key: &str, name: &str, bytes: &[u8]) -> Result<(), StoreError>;
}

/// Check that `key` can be used as a single path component.
///
/// # Errors
///
/// Returns [`StoreError::InvalidKey`] for empty keys, `.`/`..`, and keys
/// containing path separators or NUL.
pub fn validate_key(key: &str) -> Result<(), StoreError> {
    let bad = key.is_empty()
        || key == "."
        || key == ".."
        || key.contains(['/', '\\', '\0']);
    if bad {
        return Err(StoreError::InvalidKey(key.to_owned()));
    }
    Ok(())
}
