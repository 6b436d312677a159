// SPDX-License-Identifier: MIT

//! In-memory storage adapter

use std::collections::HashMap;
use std::sync::RwLock;

use crate::error::StorageError;

use super::adapter::StorageAdapter;

/// Ephemeral adapter backed by a map.
///
/// Useful for tests and for running the engine without a durable medium;
/// nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.entries.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl StorageAdapter for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.read().unwrap().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries
            .write()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.entries.write().unwrap().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_get() {
        let storage = MemoryStorage::new();
        storage.set("__counter.lastCount", "5").unwrap();

        assert_eq!(
            storage.get("__counter.lastCount").unwrap(),
            Some("5".to_string())
        );
    }

    #[test]
    fn test_get_missing_key() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.get("__counter.lastCount").unwrap(), None);
    }

    #[test]
    fn test_set_overwrites() {
        let storage = MemoryStorage::new();
        storage.set("k", "1").unwrap();
        storage.set("k", "2").unwrap();

        assert_eq!(storage.get("k").unwrap(), Some("2".to_string()));
        assert_eq!(storage.len(), 1);
    }

    #[test]
    fn test_remove_is_tolerant() {
        let storage = MemoryStorage::new();
        storage.remove("absent").unwrap();

        storage.set("k", "1").unwrap();
        storage.remove("k").unwrap();
        assert_eq!(storage.get("k").unwrap(), None);
    }
}
