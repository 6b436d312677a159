// SPDX-License-Identifier: MIT

//! The store engine
//!
//! This module provides:
//! - `StoreModule` / `Action` / `Command` - the descriptor contract a
//!   reducer module supplies
//! - `RootStore` - the merged store built from those descriptors
//! - `StoreRegistry` / `Channel` - named distribution of merged stores
//! - the restoration-aware reducer wrapper and the persistence
//!   synchronizer that keep persistent fields in step with the durable
//!   medium

mod builder;
mod module;
mod registry;
mod restore;
mod root;
mod sync;

pub use builder::PersistentFieldRef;
pub use module::{
    Action, ActionCreator, Command, Reducer, SliceState, StoreModule, Thunk,
    RESTORE_PERSISTENT_PROP_VALUES,
};
pub use registry::{Channel, StoreRegistry};
pub use restore::RESTORED_MARKER;
pub use root::{Dispatch, ModuleCell, RootStore, StoreEntry};
