// SPDX-License-Identifier: MIT

//! Named-store registry
//!
//! Maps store names to distribution channels so multiple independent
//! stores can coexist in one process. The registry is an explicit value
//! owned by the application's composition root; channels are created
//! lazily and live for the registry's lifetime.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use serde_json::Value;

use crate::persist::StorageAdapter;

use super::module::StoreModule;
use super::root::RootStore;

/// Distribution slot for one store name. Consumers holding the channel
/// always see the most recently published store.
pub struct Channel {
    name: String,
    current: RwLock<Option<Arc<RootStore>>>,
}

impl Channel {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            current: RwLock::new(None),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Publish a store on this channel, replacing any previous one.
    /// Last-registered wins; replacing a live store is flagged on the log.
    pub fn publish(&self, store: Arc<RootStore>) {
        let mut current = self.current.write().unwrap();
        if current.is_some() {
            log::warn!("Store '{}' re-registered; replacing the published store", self.name);
        }
        *current = Some(store);
    }

    /// The currently published store, if any.
    pub fn current(&self) -> Option<Arc<RootStore>> {
        self.current.read().unwrap().clone()
    }
}

/// Registry of named channels.
#[derive(Clone, Default)]
pub struct StoreRegistry {
    channels: Arc<RwLock<HashMap<String, Arc<Channel>>>>,
}

impl StoreRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get or create the channel for `name`. Idempotent: the same channel
    /// is returned for the same name; channels are never removed.
    pub fn register(&self, name: &str) -> Arc<Channel> {
        let mut channels = self.channels.write().unwrap();
        channels
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(Channel::new(name)))
            .clone()
    }

    /// The channel for `name`, if one was ever registered.
    pub fn lookup(&self, name: &str) -> Option<Arc<Channel>> {
        self.channels.read().unwrap().get(name).cloned()
    }

    /// The currently published store for `name`, if any.
    pub fn store(&self, name: &str) -> Option<Arc<RootStore>> {
        self.lookup(name).and_then(|channel| channel.current())
    }

    /// Construction entrypoint: build the merged store, run the mount
    /// sequence (restoration plus the synchronizer baseline), and publish
    /// it under `name`.
    pub fn create_store(
        &self,
        name: &str,
        modules: Vec<StoreModule>,
        other_data: HashMap<String, Value>,
        storage: Arc<dyn StorageAdapter>,
    ) -> Arc<RootStore> {
        let store = Arc::new(RootStore::build(name, modules, other_data, storage));
        store.start();

        let channel = self.register(name);
        channel.publish(Arc::clone(&store));
        store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persist::MemoryStorage;
    use serde_json::json;

    fn storage() -> Arc<dyn StorageAdapter> {
        Arc::new(MemoryStorage::new())
    }

    #[test]
    fn test_register_is_idempotent() {
        let registry = StoreRegistry::new();

        let first = registry.register("root");
        let second = registry.register("root");

        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_lookup_unknown_name() {
        let registry = StoreRegistry::new();
        assert!(registry.lookup("nope").is_none());
        assert!(registry.store("nope").is_none());
    }

    #[test]
    fn test_registered_channel_starts_empty() {
        let registry = StoreRegistry::new();
        registry.register("root");

        assert!(registry.lookup("root").is_some());
        assert!(registry.store("root").is_none());
    }

    #[test]
    fn test_create_store_publishes() {
        let registry = StoreRegistry::new();
        let modules = vec![StoreModule::new("counter").default_state(json!({"count": 0}))];

        let store = registry.create_store("root", modules, HashMap::new(), storage());

        let published = registry.store("root").unwrap();
        assert!(Arc::ptr_eq(&store, &published));
        assert_eq!(published.name(), "root");
    }

    #[test]
    fn test_last_registered_wins() {
        let registry = StoreRegistry::new();

        let first = registry.create_store("root", Vec::new(), HashMap::new(), storage());
        let second = registry.create_store("root", Vec::new(), HashMap::new(), storage());

        let published = registry.store("root").unwrap();
        assert!(!Arc::ptr_eq(&first, &published));
        assert!(Arc::ptr_eq(&second, &published));
    }

    #[test]
    fn test_named_stores_do_not_interact() {
        let registry = StoreRegistry::new();

        let modules_a = vec![StoreModule::new("m").default_state(json!({"v": "a"}))];
        let modules_b = vec![StoreModule::new("m").default_state(json!({"v": "b"}))];
        registry.create_store("a", modules_a, HashMap::new(), storage());
        registry.create_store("b", modules_b, HashMap::new(), storage());

        let a = registry.store("a").unwrap();
        let b = registry.store("b").unwrap();
        assert_eq!(a.state("m").unwrap().get("v"), Some(&json!("a")));
        assert_eq!(b.state("m").unwrap().get("v"), Some(&json!("b")));
    }

    #[test]
    fn test_registry_is_clone_shared() {
        let registry = StoreRegistry::new();
        let cloned = registry.clone();

        registry.create_store("root", Vec::new(), HashMap::new(), storage());

        assert!(cloned.store("root").is_some());
    }
}
