// SPDX-License-Identifier: MIT

//! Reducer module descriptors
//!
//! A `StoreModule` is the static description of one state slice: its
//! default shape, which fields survive restarts, the pure reducer that
//! computes the next state, and the action creators consumers call
//! through the merged store.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::root::{Dispatch, RootStore};

/// Reserved control action: rehydrate persistent fields from storage.
///
/// Dispatched once per module when the store mounts; application reducers
/// never see it.
pub const RESTORE_PERSISTENT_PROP_VALUES: &str = "RESTORE_PERSISTENT_PROP_VALUES";

/// One module's state: a dynamic field map.
///
/// Slices are replaced wholesale on every dispatch; reducers receive the
/// current map by reference and return the next one.
pub type SliceState = HashMap<String, Value>;

/// A dispatched action: a kind tag plus an arbitrary JSON payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    /// Action kind, serialized as `type` for compatibility with stored
    /// and logged action shapes
    #[serde(rename = "type")]
    pub kind: String,
    /// Free-form payload; `null` when the action carries no data
    #[serde(default)]
    pub payload: Value,
}

impl Action {
    /// Create an action with no payload.
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            payload: Value::Null,
        }
    }

    /// Create an action carrying a payload.
    pub fn with_payload(kind: impl Into<String>, payload: Value) -> Self {
        Self {
            kind: kind.into(),
            payload,
        }
    }

    /// The restoration control action.
    pub fn restore() -> Self {
        Self::new(RESTORE_PERSISTENT_PROP_VALUES)
    }

    /// Whether this is the restoration control action.
    pub fn is_restore(&self) -> bool {
        self.kind == RESTORE_PERSISTENT_PROP_VALUES
    }
}

/// Pure state transition for one slice.
pub type Reducer = Arc<dyn Fn(&SliceState, &Action) -> SliceState + Send + Sync>;

/// Deferred routine executed against the slice dispatcher and the whole
/// merged store, enabling cross-slice reads and dispatches.
///
/// Thunks run during the synchronous phase of a bound-action call and must
/// not assume other modules have finished restoring.
pub type Thunk = Box<dyn FnOnce(&Dispatch<'_>, &RootStore) + Send>;

/// What a bound action does when invoked: a tagged command capturing the
/// intent.
pub enum Command {
    /// Dispatch a single action to the owning slice
    Dispatch(Action),
    /// Run a thunk with dispatcher and whole-store access
    Run(Thunk),
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Dispatch(action) => f.debug_tuple("Dispatch").field(action).finish(),
            Command::Run(_) => f.write_str("Run(<thunk>)"),
        }
    }
}

/// Builds a `Command` from the caller's payload.
pub type ActionCreator = Arc<dyn Fn(Value) -> Command + Send + Sync>;

/// Static descriptor of one reducer module.
pub struct StoreModule {
    pub key: String,
    pub default_state: SliceState,
    /// Fields that survive restarts; every entry must name a
    /// `default_state` field, unknown names are warned about and never
    /// persisted
    pub persistent_props: Vec<String>,
    pub reducer: Reducer,
    pub actions: HashMap<String, ActionCreator>,
}

impl StoreModule {
    /// Create a module with an empty default state and an identity reducer.
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            default_state: SliceState::new(),
            persistent_props: Vec::new(),
            reducer: Arc::new(|state, _action| state.clone()),
            actions: HashMap::new(),
        }
    }

    /// Set the default state from a JSON object.
    ///
    /// Non-object values carry no fields and leave the default empty.
    pub fn default_state(mut self, value: Value) -> Self {
        self.default_state = object_to_state(&self.key, value);
        self
    }

    /// Declare which fields survive restarts, in persistence order.
    pub fn persistent_props<I, S>(mut self, props: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.persistent_props = props.into_iter().map(Into::into).collect();
        self
    }

    /// Set the module's reducer.
    pub fn reducer<F>(mut self, reducer: F) -> Self
    where
        F: Fn(&SliceState, &Action) -> SliceState + Send + Sync + 'static,
    {
        self.reducer = Arc::new(reducer);
        self
    }

    /// Declare a named action creator.
    pub fn action<F>(mut self, name: impl Into<String>, creator: F) -> Self
    where
        F: Fn(Value) -> Command + Send + Sync + 'static,
    {
        self.actions.insert(name.into(), Arc::new(creator));
        self
    }
}

impl fmt::Debug for StoreModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreModule")
            .field("key", &self.key)
            .field("default_state", &self.default_state)
            .field("persistent_props", &self.persistent_props)
            .field("actions", &self.actions.keys().collect::<Vec<_>>())
            .finish()
    }
}

fn object_to_state(key: &str, value: Value) -> SliceState {
    match value {
        Value::Object(map) => map.into_iter().collect(),
        other => {
            log::warn!(
                "Default state for module '{}' must be a JSON object, got {}; using empty state",
                key,
                other
            );
            SliceState::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_action_wire_shape() {
        let action = Action::with_payload("INCREMENT", json!(5));
        let wire = serde_json::to_value(&action).unwrap();

        assert_eq!(wire, json!({"type": "INCREMENT", "payload": 5}));

        let parsed: Action = serde_json::from_value(wire).unwrap();
        assert_eq!(parsed, action);
    }

    #[test]
    fn test_action_payload_defaults_to_null() {
        let parsed: Action = serde_json::from_value(json!({"type": "RESET"})).unwrap();
        assert_eq!(parsed.payload, Value::Null);
    }

    #[test]
    fn test_restore_action_is_reserved() {
        assert!(Action::restore().is_restore());
        assert!(!Action::new("INCREMENT").is_restore());
    }

    #[test]
    fn test_module_builder() {
        let module = StoreModule::new("counter")
            .default_state(json!({"count": 0, "lastCount": 0}))
            .persistent_props(["lastCount"])
            .action("increment", |payload| {
                Command::Dispatch(Action::with_payload("INCREMENT", payload))
            });

        assert_eq!(module.key, "counter");
        assert_eq!(module.default_state.get("count"), Some(&json!(0)));
        assert_eq!(module.persistent_props, vec!["lastCount"]);
        assert!(module.actions.contains_key("increment"));
    }

    #[test]
    fn test_default_reducer_is_identity() {
        let module = StoreModule::new("noop").default_state(json!({"x": 1}));
        let next = (module.reducer)(&module.default_state, &Action::new("ANYTHING"));

        assert_eq!(next, module.default_state);
    }

    #[test]
    fn test_non_object_default_state_is_empty() {
        let module = StoreModule::new("bad").default_state(json!(42));
        assert!(module.default_state.is_empty());
    }
}
