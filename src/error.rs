// SPDX-License-Identifier: MIT

//! Typed error handling for rootstore-rs
//!
//! Persistence failures are recovered close to where they happen and only
//! logged; the variants here cover the cases that are surfaced to callers.

use thiserror::Error;

/// Errors from the durable key-value medium.
#[derive(Debug, Error)]
pub enum StorageError {
    /// I/O errors from a file-backed adapter
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Stored text for a key could not be interpreted
    #[error("Malformed stored value for key '{key}': {message}")]
    Malformed { key: String, message: String },
}

impl StorageError {
    /// Create a malformed-value error
    pub fn malformed(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Malformed {
            key: key.into(),
            message: message.into(),
        }
    }
}

/// Top-level error type for store operations
#[derive(Debug, Error)]
pub enum StoreError {
    /// Dispatch or lookup addressed a module key that was never registered
    #[error("Unknown module '{0}'")]
    UnknownModule(String),

    /// A bound action name is not declared by the addressed module
    #[error("Unknown action '{action}' on module '{module}'")]
    UnknownAction { module: String, action: String },

    /// Storage adapter errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// JSON serialization/deserialization errors
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl StoreError {
    /// Create an unknown-module error
    pub fn unknown_module(module: impl Into<String>) -> Self {
        Self::UnknownModule(module.into())
    }

    /// Create an unknown-action error
    pub fn unknown_action(module: impl Into<String>, action: impl Into<String>) -> Self {
        Self::UnknownAction {
            module: module.into(),
            action: action.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = StoreError::unknown_module("counter");
        assert_eq!(err.to_string(), "Unknown module 'counter'");

        let err = StoreError::unknown_action("counter", "increment");
        assert_eq!(
            err.to_string(),
            "Unknown action 'increment' on module 'counter'"
        );
    }

    #[test]
    fn test_storage_error_conversion() {
        let storage = StorageError::malformed("__counter.lastCount", "not json");
        let err: StoreError = storage.into();
        assert!(err.to_string().contains("__counter.lastCount"));
    }
}
