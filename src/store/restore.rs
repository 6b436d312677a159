// SPDX-License-Identifier: MIT

//! Restoration-aware reducer wrapping
//!
//! Every module's reducer is wrapped so the reserved control action
//! short-circuits normal reduction and rehydrates the module's persistent
//! fields from the storage adapter instead.

use std::sync::Arc;

use serde_json::Value;

use crate::persist::{storage_key, StorageAdapter};

use super::module::{Reducer, SliceState};

/// Marker field set on a slice once its persistent fields have been
/// rehydrated. The persistence synchronizer refuses to write a module's
/// fields until this is `true`, so transient defaults never clobber
/// durable values mid-restoration.
pub const RESTORED_MARKER: &str = "restoredPersistentProps";

/// Wrap a module's reducer with restoration handling.
///
/// The wrapped reducer has the same signature. On the control action it
/// returns a rehydrated shallow copy of the state without invoking
/// `inner`; with no persistent props the control action returns the state
/// unchanged. Every other action delegates to `inner`.
pub fn wrap_reducer(
    reducer_key: &str,
    persistent_props: &[String],
    inner: Reducer,
    storage: Arc<dyn StorageAdapter>,
) -> Reducer {
    let reducer_key = reducer_key.to_string();
    let props = persistent_props.to_vec();

    Arc::new(move |state, action| {
        if action.is_restore() {
            if props.is_empty() {
                return state.clone();
            }
            return restore_props(&reducer_key, &props, state, storage.as_ref());
        }
        inner(state, action)
    })
}

/// Rehydrate `props` from storage into a copy of `state`.
///
/// Read and parse failures are non-fatal: the field keeps its current
/// value and the failure goes to the log. The marker is set regardless of
/// how many individual fields restored.
fn restore_props(
    reducer_key: &str,
    props: &[String],
    state: &SliceState,
    storage: &dyn StorageAdapter,
) -> SliceState {
    let mut next = state.clone();

    for prop in props {
        let key = storage_key(reducer_key, prop);
        match storage.get(&key) {
            Ok(Some(raw)) => match serde_json::from_str::<Value>(&raw) {
                Ok(value) => {
                    next.insert(prop.clone(), value);
                }
                Err(e) => {
                    log::warn!("Error parsing stored value for {}.{}: {}", reducer_key, prop, e);
                }
            },
            Ok(None) => {}
            Err(e) => {
                log::warn!("Error fetching stored value for {}.{}: {}", reducer_key, prop, e);
            }
        }
    }

    next.insert(RESTORED_MARKER.to_string(), Value::Bool(true));
    next
}
