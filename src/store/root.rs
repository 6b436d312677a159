// SPDX-License-Identifier: MIT

//! The merged store
//!
//! One `RootStore` owns a state cell per reducer module plus any injected
//! static data. Dispatch is synchronous: the next state is computed and
//! installed before the call returns. After each change-set settles, the
//! persistence synchronizer runs exactly once as the deferred effect
//! phase.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

use serde_json::Value;

use crate::error::StoreError;
use crate::persist::StorageAdapter;

use super::builder::{build_modules, PersistentFieldRef};
use super::module::{Action, ActionCreator, Command, Reducer, SliceState, StoreModule};
use super::restore::RESTORED_MARKER;
use super::sync::PersistenceSync;

/// Runtime cell for one module: the live slice state, its wrapped
/// reducer, and the bound action table.
///
/// The state is replaced wholesale on every dispatch, never mutated in
/// place; the cell's reduce path is the sole mutator.
pub struct ModuleCell {
    key: String,
    state: RwLock<SliceState>,
    reducer: Reducer,
    actions: HashMap<String, ActionCreator>,
}

impl ModuleCell {
    pub(crate) fn new(
        key: String,
        default_state: SliceState,
        reducer: Reducer,
        actions: HashMap<String, ActionCreator>,
    ) -> Self {
        Self {
            key,
            state: RwLock::new(default_state),
            reducer,
            actions,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Read-only snapshot of the slice state.
    pub fn state(&self) -> SliceState {
        self.state.read().unwrap().clone()
    }

    /// Current value of one field.
    pub fn field(&self, prop: &str) -> Option<Value> {
        self.state.read().unwrap().get(prop).cloned()
    }

    /// Whether this module's persistent fields have been rehydrated.
    ///
    /// Always `false` for modules without persistent fields (the marker
    /// is absent from their state).
    pub fn restored(&self) -> bool {
        self.field(RESTORED_MARKER) == Some(Value::Bool(true))
    }

    /// Names of the module's declared actions.
    pub fn action_names(&self) -> Vec<&str> {
        self.actions.keys().map(String::as_str).collect()
    }

    /// Compute and install the next state for `action`.
    fn reduce(&self, action: &Action) {
        let next = {
            let current = self.state.read().unwrap();
            (self.reducer)(&current, action)
        };
        *self.state.write().unwrap() = next;
    }
}

/// Raw dispatcher for one slice, handed to thunks.
pub struct Dispatch<'a> {
    cell: &'a ModuleCell,
}

impl<'a> Dispatch<'a> {
    fn new(cell: &'a ModuleCell) -> Self {
        Self { cell }
    }

    /// Key of the slice this dispatcher belongs to.
    pub fn module_key(&self) -> &str {
        self.cell.key()
    }

    /// Dispatch into the owning slice. The new state is installed before
    /// this returns; persistence runs once the enclosing change-set
    /// settles.
    pub fn dispatch(&self, action: Action) {
        self.cell.reduce(&action);
    }
}

/// One entry of the merged store: a reducer module or an injected value.
pub enum StoreEntry<'a> {
    Module(&'a ModuleCell),
    Data(&'a Value),
}

/// The merged store: every module's cell plus injected static data.
pub struct RootStore {
    name: String,
    cells: Vec<ModuleCell>,
    index: HashMap<String, usize>,
    other: HashMap<String, Value>,
    refs: Vec<PersistentFieldRef>,
    storage: Arc<dyn StorageAdapter>,
    sync: PersistenceSync,
    batch_depth: AtomicUsize,
}

impl RootStore {
    /// Build the merged store from module descriptors.
    ///
    /// Cells hold their raw defaults after this; restoration has not run
    /// yet. [`RootStore::start`] performs the mount sequence -
    /// [`StoreRegistry::create_store`](super::StoreRegistry::create_store)
    /// does both.
    pub fn build(
        name: impl Into<String>,
        modules: Vec<StoreModule>,
        other_data: HashMap<String, Value>,
        storage: Arc<dyn StorageAdapter>,
    ) -> Self {
        let built = build_modules(modules, &storage);
        let index = built
            .cells
            .iter()
            .enumerate()
            .map(|(i, cell)| (cell.key().to_string(), i))
            .collect();

        Self {
            name: name.into(),
            cells: built.cells,
            index,
            other: other_data,
            refs: built.refs,
            storage,
            sync: PersistenceSync::new(),
            batch_depth: AtomicUsize::new(0),
        }
    }

    /// Run the mount sequence, once, after [`RootStore::build`].
    ///
    /// Records the synchronizer's baseline snapshot of the raw defaults,
    /// then dispatches the restoration control action to every module as
    /// a single change-set. Until this has run, no persistent field is
    /// ever written back, so dispatching before `start` cannot clobber
    /// durable values.
    pub fn start(&self) {
        self.sync.observe(self);

        self.enter_batch();
        for cell in &self.cells {
            cell.reduce(&Action::restore());
        }
        self.leave_batch();
    }

    /// Store name this instance was registered under.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Look up a module's cell.
    pub fn module(&self, key: &str) -> Option<&ModuleCell> {
        self.index.get(key).map(|&i| &self.cells[i])
    }

    /// All module cells in declaration order.
    pub fn modules(&self) -> impl Iterator<Item = &ModuleCell> {
        self.cells.iter()
    }

    /// Read-only snapshot of one module's state.
    pub fn state(&self, key: &str) -> Option<SliceState> {
        self.module(key).map(ModuleCell::state)
    }

    /// Injected static data supplied at construction.
    pub fn data(&self, key: &str) -> Option<&Value> {
        self.other.get(key)
    }

    /// Look up any merged-store entry by key. Injected data wins over a
    /// module with the same key, matching the construction merge order.
    pub fn entry(&self, key: &str) -> Option<StoreEntry<'_>> {
        if let Some(value) = self.other.get(key) {
            return Some(StoreEntry::Data(value));
        }
        self.module(key).map(StoreEntry::Module)
    }

    /// The persistent field refs collected at construction, in snapshot
    /// order.
    pub fn persistent_field_refs(&self) -> &[PersistentFieldRef] {
        &self.refs
    }

    /// Raw low-level dispatch into one slice.
    pub fn dispatch(&self, module: &str, action: Action) -> Result<(), StoreError> {
        let cell = self
            .module(module)
            .ok_or_else(|| StoreError::unknown_module(module))?;

        self.enter_batch();
        cell.reduce(&action);
        self.leave_batch();
        Ok(())
    }

    /// Invoke a bound action: build the creator's command and execute it
    /// against the slice dispatcher and the whole store.
    ///
    /// Everything the command dispatches - including thunk dispatches into
    /// other slices - forms one change-set; the synchronizer runs once
    /// after it settles.
    pub fn call(&self, module: &str, action: &str, payload: Value) -> Result<(), StoreError> {
        let cell = self
            .module(module)
            .ok_or_else(|| StoreError::unknown_module(module))?;
        let creator = cell
            .actions
            .get(action)
            .ok_or_else(|| StoreError::unknown_action(module, action))?;

        let command = creator(payload);

        self.enter_batch();
        match command {
            Command::Dispatch(action) => cell.reduce(&action),
            Command::Run(thunk) => thunk(&Dispatch::new(cell), self),
        }
        self.leave_batch();
        Ok(())
    }

    pub(crate) fn storage(&self) -> &dyn StorageAdapter {
        self.storage.as_ref()
    }

    fn enter_batch(&self) {
        self.batch_depth.fetch_add(1, Ordering::SeqCst);
    }

    fn leave_batch(&self) {
        if self.batch_depth.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.sync.observe(self);
        }
    }
}
