use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ChartResult;

use super::action::{Action, ActionTag};
use super::computed::ComputeContext;
use super::state::{DepKey, StateWriter};

/// Inputs every module initializer sees when the store is populated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct StoreInit {
    #[serde(default)]
    pub options: Value,
    #[serde(default)]
    pub series: IndexMap<String, Vec<Value>>,
    #[serde(default)]
    pub categories: Vec<Value>,
}

pub type StateInitializer = Rc<dyn Fn(&StoreInit) -> ChartResult<Map<String, Value>>>;
pub type ComputeFn = Rc<dyn Fn(&ComputeContext<'_>) -> ChartResult<Value>>;
pub type ActionHandler = Rc<dyn Fn(&mut StateWriter<'_>, &Action) -> ChartResult<()>>;

/// Memoized derivation with an explicit dependency list.
#[derive(Clone)]
pub struct ComputedDef {
    pub name: String,
    pub deps: Vec<DepKey>,
    pub compute: ComputeFn,
}

impl ComputedDef {
    pub fn new<F>(name: impl Into<String>, deps: Vec<DepKey>, compute: F) -> Self
    where
        F: Fn(&ComputeContext<'_>) -> ChartResult<Value> + 'static,
    {
        Self {
            name: name.into(),
            deps,
            compute: Rc::new(compute),
        }
    }
}

impl fmt::Debug for ComputedDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComputedDef")
            .field("name", &self.name)
            .field("deps", &self.deps)
            .finish_non_exhaustive()
    }
}

#[derive(Clone)]
pub struct ActionDef {
    pub tag: ActionTag,
    pub handler: ActionHandler,
}

impl fmt::Debug for ActionDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionDef")
            .field("tag", &self.tag)
            .finish_non_exhaustive()
    }
}

/// Named unit of chart state: initial subtrees, computed fields and actions.
#[derive(Clone)]
pub struct StoreModule {
    pub(crate) name: String,
    pub(crate) initializer: StateInitializer,
    pub(crate) computed: Vec<ComputedDef>,
    pub(crate) actions: Vec<ActionDef>,
}

impl StoreModule {
    /// Creates a module that contributes no state until `with_state` is called.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            initializer: Rc::new(|_| Ok(Map::new())),
            computed: Vec::new(),
            actions: Vec::new(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Sets the initializer; every entry of the returned map becomes a state key.
    #[must_use]
    pub fn with_state<F>(mut self, initializer: F) -> Self
    where
        F: Fn(&StoreInit) -> ChartResult<Map<String, Value>> + 'static,
    {
        self.initializer = Rc::new(initializer);
        self
    }

    #[must_use]
    pub fn with_computed<F>(mut self, name: impl Into<String>, deps: Vec<DepKey>, compute: F) -> Self
    where
        F: Fn(&ComputeContext<'_>) -> ChartResult<Value> + 'static,
    {
        self.computed.push(ComputedDef::new(name, deps, compute));
        self
    }

    #[must_use]
    pub fn with_action<F>(mut self, tag: ActionTag, handler: F) -> Self
    where
        F: Fn(&mut StateWriter<'_>, &Action) -> ChartResult<()> + 'static,
    {
        self.actions.push(ActionDef {
            tag,
            handler: Rc::new(handler),
        });
        self
    }

    pub fn computed_defs(&self) -> &[ComputedDef] {
        &self.computed
    }

    pub fn action_tags(&self) -> impl Iterator<Item = &ActionTag> {
        self.actions.iter().map(|action| &action.tag)
    }
}

impl fmt::Debug for StoreModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreModule")
            .field("name", &self.name)
            .field("computed", &self.computed)
            .field("actions", &self.actions)
            .finish_non_exhaustive()
    }
}
