// SPDX-License-Identifier: MIT

//! Store construction
//!
//! Turns the supplied module descriptors into runtime state cells: wraps
//! each reducer with restoration handling, collects the persistent field
//! refs the synchronizer aligns its snapshots against, and injects the
//! restoration marker into defaults where needed.

use std::sync::Arc;

use serde_json::Value;

use crate::persist::{storage_key, StorageAdapter};

use super::module::StoreModule;
use super::restore::{wrap_reducer, RESTORED_MARKER};
use super::root::ModuleCell;

/// Identifies one persisted field of one module.
///
/// Built once at store construction, immutable for the store's lifetime.
/// The synchronizer's snapshots are value lists in the order these refs
/// were collected: module declaration order, then `persistent_props`
/// order within a module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistentFieldRef {
    pub reducer_key: String,
    pub prop_key: String,
}

impl PersistentFieldRef {
    /// The durable key this field is stored under.
    pub fn storage_key(&self) -> String {
        storage_key(&self.reducer_key, &self.prop_key)
    }
}

pub(crate) struct BuiltModules {
    pub cells: Vec<ModuleCell>,
    pub refs: Vec<PersistentFieldRef>,
}

/// Build one state cell per module and the flat persistent-field ref list.
pub(crate) fn build_modules(
    modules: Vec<StoreModule>,
    storage: &Arc<dyn StorageAdapter>,
) -> BuiltModules {
    let mut cells = Vec::with_capacity(modules.len());
    let mut refs = Vec::new();

    for module in modules {
        let StoreModule {
            key,
            mut default_state,
            persistent_props,
            reducer,
            actions,
        } = module;

        let mut found_persistent_props = false;
        for prop in &persistent_props {
            if default_state.contains_key(prop) {
                found_persistent_props = true;
                refs.push(PersistentFieldRef {
                    reducer_key: key.clone(),
                    prop_key: prop.clone(),
                });
            } else {
                log::warn!(
                    "Module '{}' declares persistent prop '{}' that is not in its default state; it will never be persisted",
                    key,
                    prop
                );
            }
        }

        // The marker is part of the default shape, not a later mutation:
        // it must be present (and false) before the cell's first use.
        if found_persistent_props {
            default_state.insert(RESTORED_MARKER.to_string(), Value::Bool(false));
        }

        let wrapped = wrap_reducer(&key, &persistent_props, reducer, Arc::clone(storage));
        cells.push(ModuleCell::new(key, default_state, wrapped, actions));
    }

    BuiltModules { cells, refs }
}
