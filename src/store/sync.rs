// SPDX-License-Identifier: MIT

//! Persistence synchronization
//!
//! A side-effecting observer over the merged store's persistent fields.
//! It diffs the current values against the previous snapshot and writes
//! the changed ones through the storage adapter - but only for modules
//! whose restoration marker is set, so transient defaults never overwrite
//! durable values while restoration is still pending.

use std::sync::RwLock;

use serde_json::Value;

use super::root::RootStore;

/// Snapshot-diffing observer. One lives inside each `RootStore`; the
/// store activates it exactly once per settled change-set.
pub(crate) struct PersistenceSync {
    /// Previous persistent-field values, in ref order. `None` until the
    /// first activation.
    previous: RwLock<Option<Vec<Value>>>,
}

impl PersistenceSync {
    pub fn new() -> Self {
        Self {
            previous: RwLock::new(None),
        }
    }

    /// Observe the store's current persistent-field values.
    ///
    /// The first activation only records the snapshot - there is nothing
    /// to compare against and restoration may not have happened yet.
    /// Later activations write each changed field of each restored
    /// module; write failures are logged and non-fatal, and unchanged
    /// fields are never rewritten.
    pub fn observe(&self, store: &RootStore) {
        let refs = store.persistent_field_refs();
        let current: Vec<Value> = refs
            .iter()
            .map(|r| {
                store
                    .module(&r.reducer_key)
                    .and_then(|cell| cell.field(&r.prop_key))
                    .unwrap_or(Value::Null)
            })
            .collect();

        let mut previous = self.previous.write().unwrap();

        if let Some(prev) = previous.as_ref() {
            for (i, r) in refs.iter().enumerate() {
                if prev[i] == current[i] {
                    continue;
                }
                let restored = store
                    .module(&r.reducer_key)
                    .map(|cell| cell.restored())
                    .unwrap_or(false);
                if !restored {
                    // Restoration pending: intentionally dropped, the
                    // durable value is still authoritative
                    continue;
                }
                self.persist(store, r.storage_key(), &current[i]);
            }
        }

        *previous = Some(current);
    }

    fn persist(&self, store: &RootStore, key: String, value: &Value) {
        let raw = match serde_json::to_string(value) {
            Ok(raw) => raw,
            Err(e) => {
                log::warn!("Error serializing value for {}: {}", key, e);
                return;
            }
        };
        if let Err(e) = store.storage().set(&key, &raw) {
            log::warn!("Error saving value for {}: {}", key, e);
        }
    }
}
