//! Single-file storage: every document is one element of a JSON array.
//!
//! Elements are kept as raw [`serde_json::Value`]s between read and write,
//! so an element that fails to decode is skipped by reads but written back
//! untouched by any later mutation. Reads return documents in element
//! order, so a hand-curated file keeps its order.
//!
//! The id high-water mark lives in a sibling file: `routes.json` keeps it
//! in `routes.sequence.json`.

use std::fs;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, warn};

use crate::document::{DocumentStore, StoredDocument};
use crate::error::StoreError;
use crate::fs_util::{read_optional, write_atomic};
use crate::sequence::{raise_mark, read_mark};

/// Stores all documents as a JSON array in one file.
#[derive(Debug, Clone)]
pub struct ArrayFileStore<T> {
    path: PathBuf,
    _doc: PhantomData<fn() -> T>,
}

impl<T> ArrayFileStore<T> {
    /// Create a store backed by the file at `path`. A missing file is an
    /// empty collection.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            _doc: PhantomData,
        }
    }

    /// The backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The sibling file holding the id high-water mark.
    pub fn sequence_path(&self) -> PathBuf {
        let stem = self.path.file_stem().unwrap_or_default().to_string_lossy();
        self.path.with_file_name(format!("{stem}.sequence.json"))
    }

    fn load_raw(&self) -> Result<Vec<Value>, StoreError> {
        let Some(bytes) = read_optional(&self.path)? else {
            return Ok(Vec::new());
        };
        serde_json::from_slice(&bytes).map_err(|source| StoreError::Decode {
            location: self.path.display().to_string(),
            source,
        })
    }

    fn save_raw(&self, elements: &[Value]) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;
        }
        let bytes = serde_json::to_vec_pretty(elements).map_err(StoreError::Encode)?;
        write_atomic(&self.path, &bytes)
    }
}

impl<T: StoredDocument> ArrayFileStore<T> {
    /// Decode one element, logging and skipping it on failure.
    fn decode(&self, index: usize, element: &Value) -> Option<T> {
        match serde_json::from_value::<T>(element.clone()) {
            Ok(doc) => Some(doc),
            Err(e) => {
                warn!(file = %self.path.display(), index, error = %e, "skipping corrupt element");
                None
            }
        }
    }

    /// Position of the element stored under `key`.
    fn position(&self, elements: &[Value], key: &str) -> Option<usize> {
        elements.iter().enumerate().position(|(index, element)| {
            self.decode(index, element)
                .is_some_and(|doc| doc.storage_key() == key)
        })
    }
}

impl<T: StoredDocument> DocumentStore<T> for ArrayFileStore<T> {
    fn list(&self) -> Result<Vec<T>, StoreError> {
        let elements = self.load_raw()?;
        Ok(elements
            .iter()
            .enumerate()
            .filter_map(|(index, element)| self.decode(index, element))
            .collect())
    }

    fn get(&self, key: &str) -> Result<Option<T>, StoreError> {
        let elements = self.load_raw()?;
        Ok(elements
            .iter()
            .enumerate()
            .filter_map(|(index, element)| self.decode(index, element))
            .find(|doc| doc.storage_key() == key))
    }

    fn insert(&self, doc: &T) -> Result<(), StoreError> {
        let key = doc.storage_key();
        let mut elements = self.load_raw()?;
        if self.position(&elements, &key).is_some() {
            return Err(StoreError::Conflict(key));
        }
        elements.push(serde_json::to_value(doc).map_err(StoreError::Encode)?);
        self.save_raw(&elements)?;
        debug!(key = %key, file = %self.path.display(), "element appended");
        Ok(())
    }

    fn put(&self, doc: &T) -> Result<(), StoreError> {
        let key = doc.storage_key();
        let mut elements = self.load_raw()?;
        let index = self
            .position(&elements, &key)
            .ok_or_else(|| StoreError::NotFound(key.clone()))?;
        let encoded = serde_json::to_value(doc).map_err(StoreError::Encode)?;
        if let Some(slot) = elements.get_mut(index) {
            *slot = encoded;
        }
        self.save_raw(&elements)?;
        debug!(key = %key, file = %self.path.display(), "element replaced");
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<bool, StoreError> {
        let mut elements = self.load_raw()?;
        let Some(index) = self.position(&elements, key) else {
            return Ok(false);
        };
        elements.remove(index);
        self.save_raw(&elements)?;
        debug!(key, file = %self.path.display(), "element removed");
        Ok(true)
    }

    fn last_issued_id(&self) -> Result<u64, StoreError> {
        read_mark(&self.sequence_path())
    }

    fn record_issued_id(&self, id: u64) -> Result<(), StoreError> {
        raise_mark(&self.sequence_path(), id)
    }
}
