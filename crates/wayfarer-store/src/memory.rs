//! In-memory storage with the same contract as the file-backed stores.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock};

use crate::document::{AssetStore, DocumentStore, StoredDocument, validate_key};
use crate::error::StoreError;

/// A document map guarded by a lock. Assets are kept as raw bytes.
#[derive(Debug)]
pub struct MemoryStore<T> {
    docs: RwLock<BTreeMap<String, T>>,
    assets: RwLock<BTreeMap<(String, String), Vec<u8>>>,
    last_issued: AtomicU64,
}

impl<T> MemoryStore<T> {
    /// Create an empty store.
    pub const fn new() -> Self {
        Self {
            docs: RwLock::new(BTreeMap::new()),
            assets: RwLock::new(BTreeMap::new()),
            last_issued: AtomicU64::new(0),
        }
    }

    /// The bytes of an asset, if stored.
    pub fn asset(&self, key: &str, name: &str) -> Option<Vec<u8>> {
        self.assets
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&(key.to_owned(), name.to_owned()))
            .cloned()
    }
}

impl<T> Default for MemoryStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: StoredDocument> DocumentStore<T> for MemoryStore<T> {
    fn list(&self) -> Result<Vec<T>, StoreError> {
        let docs = self.docs.read().unwrap_or_else(PoisonError::into_inner);
        Ok(docs.values().cloned().collect())
    }

    fn get(&self, key: &str) -> Result<Option<T>, StoreError> {
        let docs = self.docs.read().unwrap_or_else(PoisonError::into_inner);
        Ok(docs.get(key).cloned())
    }

    fn insert(&self, doc: &T) -> Result<(), StoreError> {
        let key = doc.storage_key();
        validate_key(&key)?;
        let mut docs = self.docs.write().unwrap_or_else(PoisonError::into_inner);
        if docs.contains_key(&key) {
            return Err(StoreError::Conflict(key));
        }
        docs.insert(key, doc.clone());
        Ok(())
    }

    fn put(&self, doc: &T) -> Result<(), StoreError> {
        let key = doc.storage_key();
        let mut docs = self.docs.write().unwrap_or_else(PoisonError::into_inner);
        let Some(slot) = docs.get_mut(&key) else {
            return Err(StoreError::NotFound(key));
        };
        *slot = doc.clone();
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<bool, StoreError> {
        let removed = self
            .docs
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key)
            .is_some();
        if removed {
            self.assets
                .write()
                .unwrap_or_else(PoisonError::into_inner)
                .retain(|(unit, _), _| unit != key);
        }
        Ok(removed)
    }

    fn last_issued_id(&self) -> Result<u64, StoreError> {
        Ok(self.last_issued.load(Ordering::SeqCst))
    }

    fn record_issued_id(&self, id: u64) -> Result<(), StoreError> {
        self.last_issued.fetch_max(id, Ordering::SeqCst);
        Ok(())
    }
}

impl<T: StoredDocument> AssetStore for MemoryStore<T> {
    fn write_asset(&self, key: &str, name: &str, bytes: &[u8]) -> Result<(), StoreError> {
        validate_key(name)?;
        let exists = self
            .docs
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(key);
        if !exists {
            return Err(StoreError::NotFound(key.to_owned()));
        }
        self.assets
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert((key.to_owned(), name.to_owned()), bytes.to_vec());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use wayfarer_types::{ExtraFields, Route, RouteId};

    use super::*;

    fn route(id: u64) -> Route {
        Route {
            id: RouteId::new(id),
            name: format!("Route {id}"),
            description: None,
            attraction_ids: Vec::new(),
            extra: ExtraFields::new(),
        }
    }

    #[test]
    fn behaves_like_a_store() {
        let store = MemoryStore::new();
        store.insert(&route(1)).unwrap();
        assert!(matches!(store.insert(&route(1)), Err(StoreError::Conflict(_))));
        assert!(matches!(store.put(&route(2)), Err(StoreError::NotFound(_))));

        store.write_asset("1", "map.png", b"png").unwrap();
        assert_eq!(store.asset("1", "map.png"), Some(b"png".to_vec()));

        assert!(store.delete("1").unwrap());
        assert!(store.asset("1", "map.png").is_none());
        assert!(DocumentStore::<Route>::list(&store).unwrap().is_empty());
    }

    #[test]
    fn issued_id_mark_never_drops() {
        let store: MemoryStore<Route> = MemoryStore::new();
        store.record_issued_id(3).unwrap();
        store.record_issued_id(1).unwrap();
        assert_eq!(store.last_issued_id().unwrap(), 3);
    }
}
