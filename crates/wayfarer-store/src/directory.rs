//! Directory-per-entity storage.
//!
//! ## Layout
//!
//! ```text
//! {root}/
//! ├── .sequence.json       # highest id ever issued
//! ├── yu-garden/
//! │   ├── data.json        # the document
//! │   ├── cover.jpg        # assets referenced by the document
//! │   └── gate.png
//! └── the-bund/
//!     └── data.json
//! ```
//!
//! The directory name is the storage key. It is bound back into every
//! document read from disk, so the layout stays authoritative even if a
//! document body was edited by hand. Plain files in the root, such as the
//! id sequence, are not units and never show up in scans.

use std::fs;
use std::io::ErrorKind;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::document::{AssetStore, DocumentStore, StoredDocument, validate_key};
use crate::error::StoreError;
use crate::fs_util::{read_optional, write_atomic};
use crate::sequence::{raise_mark, read_mark};

/// Name of the document file inside each unit directory.
pub const DOCUMENT_FILE: &str = "data.json";

/// Name of the id sequence file in the store root.
pub const SEQUENCE_FILE: &str = ".sequence.json";

/// Stores each document in its own directory under a common root.
#[derive(Debug, Clone)]
pub struct DirectoryStore<T> {
    root: PathBuf,
    _doc: PhantomData<fn() -> T>,
}

impl<T> DirectoryStore<T> {
    /// Create a store rooted at `root`. The directory is created lazily on
    /// the first insert.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            _doc: PhantomData,
        }
    }

    /// The root directory holding all units.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The directory of the unit stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidKey`] if `key` is not a plain path
    /// component.
    pub fn unit_dir(&self, key: &str) -> Result<PathBuf, StoreError> {
        validate_key(key)?;
        Ok(self.root.join(key))
    }

    fn document_path(&self, key: &str) -> Result<PathBuf, StoreError> {
        Ok(self.unit_dir(key)?.join(DOCUMENT_FILE))
    }
}

impl<T: StoredDocument> DirectoryStore<T> {
    /// Decode one unit during a scan. Returns `None` for anything that
    /// should be skipped.
    fn scan_unit(&self, key: &str) -> Option<T> {
        let path = self.root.join(key).join(DOCUMENT_FILE);
        let bytes = match read_optional(&path) {
            Ok(Some(bytes)) => bytes,
            Ok(None) => {
                debug!(key, "skipping unit without a document");
                return None;
            }
            Err(e) => {
                warn!(key, error = %e, "skipping unreadable document");
                return None;
            }
        };
        match serde_json::from_slice::<T>(&bytes) {
            Ok(mut doc) => {
                doc.bind_storage_key(key);
                Some(doc)
            }
            Err(e) => {
                warn!(key, error = %e, "skipping corrupt document");
                None
            }
        }
    }
}

impl<T: StoredDocument> DocumentStore<T> for DirectoryStore<T> {
    fn list(&self) -> Result<Vec<T>, StoreError> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StoreError::io(&self.root, e)),
        };

        let mut keys = Vec::new();
        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!(root = %self.root.display(), error = %e, "skipping unreadable entry");
                    continue;
                }
            };
            // Follows symlinks, so a linked unit directory still counts.
            if !entry.path().is_dir() {
                continue;
            }
            match entry.file_name().into_string() {
                Ok(key) => keys.push(key),
                Err(name) => warn!(?name, "skipping unit with a non UTF-8 name"),
            }
        }
        keys.sort();

        Ok(keys.iter().filter_map(|key| self.scan_unit(key)).collect())
    }

    fn get(&self, key: &str) -> Result<Option<T>, StoreError> {
        let path = self.document_path(key)?;
        let Some(bytes) = read_optional(&path)? else {
            return Ok(None);
        };
        let mut doc: T = serde_json::from_slice(&bytes).map_err(|source| StoreError::Decode {
            location: path.display().to_string(),
            source,
        })?;
        doc.bind_storage_key(key);
        Ok(Some(doc))
    }

    fn insert(&self, doc: &T) -> Result<(), StoreError> {
        let key = doc.storage_key();
        let dir = self.unit_dir(&key)?;
        let bytes = serde_json::to_vec_pretty(doc).map_err(StoreError::Encode)?;

        fs::create_dir_all(&self.root).map_err(|e| StoreError::io(&self.root, e))?;
        match fs::create_dir(&dir) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                return Err(StoreError::Conflict(key));
            }
            Err(e) => return Err(StoreError::io(&dir, e)),
        }

        if let Err(e) = write_atomic(&dir.join(DOCUMENT_FILE), &bytes) {
            // Roll back so no half-created unit shows up in later scans.
            if let Err(cleanup) = fs::remove_dir_all(&dir) {
                warn!(key = %key, error = %cleanup, "failed to remove partially created unit");
            }
            return Err(e);
        }

        debug!(key = %key, "unit created");
        Ok(())
    }

    fn put(&self, doc: &T) -> Result<(), StoreError> {
        let key = doc.storage_key();
        let path = self.document_path(&key)?;
        if !path.is_file() {
            return Err(StoreError::NotFound(key));
        }
        let bytes = serde_json::to_vec_pretty(doc).map_err(StoreError::Encode)?;
        write_atomic(&path, &bytes)?;
        debug!(key = %key, "document updated");
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<bool, StoreError> {
        let dir = self.unit_dir(key)?;
        match fs::remove_dir_all(&dir) {
            Ok(()) => {
                debug!(key, "unit removed");
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StoreError::io(&dir, e)),
        }
    }

    fn last_issued_id(&self) -> Result<u64, StoreError> {
        read_mark(&self.root.join(SEQUENCE_FILE))
    }

    fn record_issued_id(&self, id: u64) -> Result<(), StoreError> {
        raise_mark(&self.root.join(SEQUENCE_FILE), id)
    }
}

impl<T: StoredDocument> AssetStore for DirectoryStore<T> {
    fn write_asset(&self, key: &str, name: &str, bytes: &[u8]) -> Result<(), StoreError> {
        validate_key(name)?;
        if name == DOCUMENT_FILE {
            return Err(StoreError::InvalidKey(name.to_owned()));
        }
        let dir = self.unit_dir(key)?;
        if !dir.is_dir() {
            return Err(StoreError::NotFound(key.to_owned()));
        }
        write_atomic(&dir.join(name), bytes)?;
        debug!(key, name, size = bytes.len(), "asset stored");
        Ok(())
    }
}
