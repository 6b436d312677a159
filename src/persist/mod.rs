// SPDX-License-Identifier: MIT

//! The durable-medium boundary
//!
//! This module provides:
//! - `StorageAdapter` - the key-value contract the store engine writes
//!   persistent fields through
//! - `MemoryStorage` - an ephemeral in-memory adapter
//! - `FileStorage` - a single-JSON-file adapter surviving process restarts

mod adapter;
mod file;
mod memory;

pub use adapter::{storage_key, StorageAdapter};
pub use file::FileStorage;
pub use memory::MemoryStorage;
