//! Keyed byte storage backing the sync layer.
//!
//! A store maps string keys to opaque byte blobs. Reads and writes are
//! synchronous and whole-value; there is no locking across processes, so a
//! store must have a single writer at a time.

use crate::error::AppError;
use std::collections::HashMap;

mod file_store;

pub use file_store::{FileStore, default_app_dir, store_dir};

pub trait KeyValueStore {
    /// Returns `None` when nothing was ever written under `key`.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, AppError>;

    fn set(&mut self, key: &str, value: &[u8]) -> Result<(), AppError>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, AppError> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &[u8]) -> Result<(), AppError> {
        (**self).set(key, value)
    }
}

#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: HashMap<String, Vec<u8>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, AppError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &[u8]) -> Result<(), AppError> {
        self.entries.insert(key.to_string(), value.to_vec());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{KeyValueStore, MemoryStore};

    #[test]
    fn memory_store_returns_none_for_unknown_key() {
        let store = MemoryStore::new();
        assert_eq!(store.get("todos").unwrap(), None);
    }

    #[test]
    fn memory_store_overwrites_previous_value() {
        let mut store = MemoryStore::new();
        store.set("todos", b"[1]").unwrap();
        store.set("todos", b"[2]").unwrap();

        assert_eq!(store.get("todos").unwrap(), Some(b"[2]".to_vec()));
        assert!(store.contains("todos"));
    }
}
