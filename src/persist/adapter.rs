// SPDX-License-Identifier: MIT

//! Storage adapter contract

use crate::error::StorageError;

/// Durable key for one persistent field of one module.
///
/// The layout is fixed for compatibility with existing stored state:
/// `__{reducer_key}.{prop_key}`. Key uniqueness across modules is the only
/// thing preventing two fields from sharing a durable slot.
pub fn storage_key(reducer_key: &str, prop_key: &str) -> String {
    format!("__{}.{}", reducer_key, prop_key)
}

/// Contract for the durable key-value medium.
///
/// Values are the JSON text form of the original field value. Adapters are
/// expected to tolerate missing keys (`Ok(None)`) rather than erroring;
/// the engine treats every error from this boundary as recoverable.
pub trait StorageAdapter: Send + Sync {
    /// Read the stored text for a key, `None` if the key was never written.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write the text value for a key, overwriting any previous value.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove a key. Removing an absent key is not an error.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}
