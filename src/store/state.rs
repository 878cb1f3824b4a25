use std::rc::Rc;

use indexmap::{IndexMap, IndexSet};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{ChartError, ChartResult};

/// State subtrees keyed by state key, in registration order.
pub(crate) type StateTree = IndexMap<String, Rc<Value>>;

/// Memoized computed values keyed by field name, in evaluation order.
pub(crate) type ComputedValues = IndexMap<String, Rc<Value>>;

/// A state key or a computed field a computed field reads.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DepKey {
    State(String),
    Computed(String),
}

impl DepKey {
    #[must_use]
    pub fn state(key: impl Into<String>) -> Self {
        Self::State(key.into())
    }

    #[must_use]
    pub fn computed(name: impl Into<String>) -> Self {
        Self::Computed(name.into())
    }

    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::State(key) | Self::Computed(key) => key,
        }
    }
}

/// Keys whose value changed during one or more dispatch cycles.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ChangeSet {
    pub state: IndexSet<String>,
    pub computed: IndexSet<String>,
}

impl ChangeSet {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state.is_empty() && self.computed.is_empty()
    }

    #[must_use]
    pub fn contains(&self, key: &DepKey) -> bool {
        match key {
            DepKey::State(key) => self.state.contains(key),
            DepKey::Computed(name) => self.computed.contains(name),
        }
    }

    #[must_use]
    pub fn touches_state(&self, key: &str) -> bool {
        self.state.contains(key)
    }

    #[must_use]
    pub fn intersects(&self, keys: &[DepKey]) -> bool {
        keys.iter().any(|key| self.contains(key))
    }

    pub fn merge(&mut self, other: &ChangeSet) {
        self.state.extend(other.state.iter().cloned());
        self.computed.extend(other.computed.iter().cloned());
    }
}

pub(crate) fn same_value(left: &Rc<Value>, right: &Rc<Value>) -> bool {
    Rc::ptr_eq(left, right) || left == right
}

pub(crate) fn decode<T: DeserializeOwned>(key: &str, value: &Value) -> ChartResult<T> {
    T::deserialize(value).map_err(|err| {
        ChartError::InvalidData(format!("state `{key}` has unexpected shape: {err}"))
    })
}

/// Exclusive write access to the state tree for the duration of one action.
///
/// The first mutable access to a key keeps the pre-dispatch handle, which is
/// what the store compares against and restores on failure.
pub struct StateWriter<'a> {
    tree: &'a mut StateTree,
    before: &'a mut StateTree,
}

impl<'a> StateWriter<'a> {
    pub(crate) fn new(tree: &'a mut StateTree, before: &'a mut StateTree) -> Self {
        Self { tree, before }
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.tree.contains_key(key)
    }

    pub fn get(&self, key: &str) -> ChartResult<&Value> {
        self.tree
            .get(key)
            .map(|value| value.as_ref())
            .ok_or_else(|| unknown_state_key(key))
    }

    pub fn read<T: DeserializeOwned>(&self, key: &str) -> ChartResult<T> {
        decode(key, self.get(key)?)
    }

    pub fn get_mut(&mut self, key: &str) -> ChartResult<&mut Value> {
        let slot = self.tree.get_mut(key).ok_or_else(|| unknown_state_key(key))?;
        if !self.before.contains_key(key) {
            self.before.insert(key.to_owned(), Rc::clone(slot));
        }
        Ok(Rc::make_mut(slot))
    }

    pub fn replace(&mut self, key: &str, value: Value) -> ChartResult<()> {
        *self.get_mut(key)? = value;
        Ok(())
    }

    pub fn write<T: Serialize>(&mut self, key: &str, value: &T) -> ChartResult<()> {
        let encoded = serde_json::to_value(value)?;
        self.replace(key, encoded)
    }

    /// Decodes `key`, applies `mutate`, and writes the result back.
    pub fn update<T, F>(&mut self, key: &str, mutate: F) -> ChartResult<()>
    where
        T: DeserializeOwned + Serialize,
        F: FnOnce(&mut T) -> ChartResult<()>,
    {
        let mut value: T = self.read(key)?;
        mutate(&mut value)?;
        self.write(key, &value)
    }
}

fn unknown_state_key(key: &str) -> ChartError {
    ChartError::InvalidData(format!("state key `{key}` is not registered"))
}

/// Immutable view of the store handed to observers and render collaborators.
///
/// Holds shared handles; later dispatches copy-on-write instead of mutating
/// what a snapshot already references.
#[derive(Debug, Clone, Default)]
pub struct StoreSnapshot {
    version: u64,
    state: StateTree,
    computed: ComputedValues,
}

impl StoreSnapshot {
    pub(crate) fn new(version: u64, state: &StateTree, computed: &ComputedValues) -> Self {
        Self {
            version,
            state: state.clone(),
            computed: computed.clone(),
        }
    }

    #[must_use]
    pub fn version(&self) -> u64 {
        self.version
    }

    #[must_use]
    pub fn state(&self, key: &str) -> Option<&Value> {
        self.state.get(key).map(|value| value.as_ref())
    }

    #[must_use]
    pub fn computed(&self, name: &str) -> Option<&Value> {
        self.computed.get(name).map(|value| value.as_ref())
    }

    pub fn get<T: DeserializeOwned>(&self, key: &str) -> ChartResult<T> {
        let value = self.state(key).ok_or_else(|| unknown_state_key(key))?;
        decode(key, value)
    }

    pub fn get_computed<T: DeserializeOwned>(&self, name: &str) -> ChartResult<T> {
        let value = self.computed(name).ok_or_else(|| {
            ChartError::InvalidData(format!("computed field `{name}` is not registered"))
        })?;
        decode(name, value)
    }

    pub fn state_keys(&self) -> impl Iterator<Item = &str> {
        self.state.keys().map(String::as_str)
    }

    pub fn computed_keys(&self) -> impl Iterator<Item = &str> {
        self.computed.keys().map(String::as_str)
    }

    /// Change set naming every key, for components rendering for the first time.
    #[must_use]
    pub fn full_change_set(&self) -> ChangeSet {
        ChangeSet {
            state: self.state.keys().cloned().collect(),
            computed: self.computed.keys().cloned().collect(),
        }
    }

    /// Serializes state and computed values for diagnostics.
    #[must_use]
    pub fn to_json(&self) -> Value {
        let state = self
            .state
            .iter()
            .map(|(key, value)| (key.clone(), value.as_ref().clone()))
            .collect::<serde_json::Map<_, _>>();
        let computed = self
            .computed
            .iter()
            .map(|(key, value)| (key.clone(), value.as_ref().clone()))
            .collect::<serde_json::Map<_, _>>();
        serde_json::json!({
            "version": self.version,
            "state": state,
            "computed": computed,
        })
    }
}
