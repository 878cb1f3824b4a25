use std::fmt;
use std::rc::Rc;

use indexmap::{IndexMap, IndexSet};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::error::{ChartError, ChartResult};

use super::action::{Action, ActionTag};
use super::computed::ComputedGraph;
use super::dispatcher::Dispatcher;
use super::module::{ActionHandler, StoreInit, StoreModule};
use super::state::{ChangeSet, DepKey, StateTree, StateWriter, StoreSnapshot, decode, same_value};

/// Upper bound on queued cycles drained by one dispatch before giving up.
const MAX_SETTLE_CYCLES: usize = 256;

pub type Observer = Rc<dyn Fn(&StoreSnapshot, &ChangeSet)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObserverId(u64);

struct ObserverEntry {
    id: ObserverId,
    keys: Option<Vec<DepKey>>,
    callback: Observer,
}

struct RegisteredAction {
    module: String,
    handler: ActionHandler,
}

/// Result of a dispatch, including queued follow-up cycles it drained.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DispatchOutcome {
    /// Store version after the last effective cycle.
    pub version: u64,
    pub changes: ChangeSet,
    /// Dispatch cycles run, effective or not.
    pub cycles: usize,
    pub effective_cycles: usize,
}

impl DispatchOutcome {
    #[must_use]
    pub fn is_effective(&self) -> bool {
        self.effective_cycles > 0
    }
}

/// Single-writer reactive state container.
pub struct Store {
    init: StoreInit,
    modules: Vec<String>,
    state: StateTree,
    computed: ComputedGraph,
    actions: IndexMap<ActionTag, RegisteredAction>,
    observers: Vec<ObserverEntry>,
    next_observer_id: u64,
    queue: Dispatcher,
    version: u64,
}

impl Store {
    #[must_use]
    pub fn new(init: StoreInit) -> Self {
        Self {
            init,
            modules: Vec::new(),
            state: StateTree::new(),
            computed: ComputedGraph::default(),
            actions: IndexMap::new(),
            observers: Vec::new(),
            next_observer_id: 0,
            queue: Dispatcher::default(),
            version: 0,
        }
    }

    /// Builds a store and registers `modules` in order.
    pub fn with_modules(
        init: StoreInit,
        modules: impl IntoIterator<Item = StoreModule>,
    ) -> ChartResult<Self> {
        let mut store = Self::new(init);
        for module in modules {
            store.register_module(module)?;
        }
        Ok(store)
    }

    #[must_use]
    pub fn init(&self) -> &StoreInit {
        &self.init
    }

    /// Adds a module's state, computed fields and actions.
    ///
    /// Registration is all-or-nothing: on error the store is unchanged.
    pub fn register_module(&mut self, module: StoreModule) -> ChartResult<()> {
        let StoreModule {
            name,
            initializer,
            computed,
            actions,
        } = module;

        if self.modules.contains(&name) || self.state.contains_key(&name) {
            return Err(ChartError::DuplicateModule {
                module: name.clone(),
                key: name,
            });
        }

        let initial = initializer(&self.init)?;
        if let Some(key) = initial
            .keys()
            .find(|key| self.state.contains_key(key.as_str()) || self.computed.contains(key))
        {
            return Err(ChartError::DuplicateModule {
                module: name,
                key: key.clone(),
            });
        }

        let mut local_tags = IndexSet::new();
        for action in &actions {
            if self.actions.contains_key(&action.tag) || !local_tags.insert(action.tag.clone()) {
                return Err(ChartError::DuplicateAction {
                    module: name,
                    action: action.tag.to_string(),
                });
            }
        }

        let ordered = self.computed.plan(&name, &computed, |key| {
            self.state.contains_key(key) || initial.contains_key(key)
        })?;

        let inserted: Vec<String> = initial.keys().cloned().collect();
        for (key, value) in initial {
            self.state.insert(key, Rc::new(value));
        }
        if let Err(err) = self.computed.install(ordered, &self.state) {
            for key in &inserted {
                self.state.shift_remove(key);
            }
            return Err(err);
        }

        for action in actions {
            self.actions.insert(
                action.tag,
                RegisteredAction {
                    module: name.clone(),
                    handler: action.handler,
                },
            );
        }
        debug!(module = %name, state_keys = inserted.len(), "store module registered");
        self.modules.push(name);
        Ok(())
    }

    #[must_use]
    pub fn module_names(&self) -> &[String] {
        &self.modules
    }

    #[must_use]
    pub fn has_action(&self, tag: &ActionTag) -> bool {
        self.actions.contains_key(tag)
    }

    /// Module that owns the handler for `tag`.
    #[must_use]
    pub fn action_owner(&self, tag: &ActionTag) -> Option<&str> {
        self.actions.get(tag).map(|entry| entry.module.as_str())
    }

    #[must_use]
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Handle for queuing dispatches from inside notifications.
    #[must_use]
    pub fn dispatcher(&self) -> Dispatcher {
        self.queue.clone()
    }

    #[must_use]
    pub fn snapshot(&self) -> StoreSnapshot {
        StoreSnapshot::new(self.version, &self.state, self.computed.values())
    }

    /// Decoded copy of one state subtree.
    pub fn read<T: DeserializeOwned>(&self, key: &str) -> ChartResult<T> {
        let value = self.state.get(key).ok_or_else(|| {
            ChartError::InvalidData(format!("state key `{key}` is not registered"))
        })?;
        decode(key, value)
    }

    /// How many times the evaluator of `name` has run, including registration.
    #[must_use]
    pub fn recompute_count(&self, name: &str) -> Option<u64> {
        self.computed.evaluations(name)
    }

    /// Registers an observer called after every effective dispatch.
    pub fn subscribe<F>(&mut self, observer: F) -> ObserverId
    where
        F: Fn(&StoreSnapshot, &ChangeSet) + 'static,
    {
        self.push_observer(None, Rc::new(observer))
    }

    /// Registers an observer called only when one of `keys` changed.
    pub fn observe<F>(&mut self, keys: Vec<DepKey>, observer: F) -> ObserverId
    where
        F: Fn(&StoreSnapshot, &ChangeSet) + 'static,
    {
        self.push_observer(Some(keys), Rc::new(observer))
    }

    pub fn unsubscribe(&mut self, id: ObserverId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|entry| entry.id != id);
        self.observers.len() != before
    }

    pub fn clear_observers(&mut self) {
        self.observers.clear();
    }

    #[must_use]
    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    /// Applies `action`, settles computed fields, notifies observers, then
    /// drains any actions queued meanwhile.
    pub fn dispatch(&mut self, action: Action) -> ChartResult<DispatchOutcome> {
        let mut outcome = DispatchOutcome {
            version: self.version,
            ..DispatchOutcome::default()
        };
        self.run_cycle(action, &mut outcome)?;
        self.drain_queue(&mut outcome)?;
        Ok(outcome)
    }

    /// Drains actions queued through a `Dispatcher` outside of a dispatch.
    pub fn flush_queued(&mut self) -> ChartResult<DispatchOutcome> {
        let mut outcome = DispatchOutcome {
            version: self.version,
            ..DispatchOutcome::default()
        };
        self.drain_queue(&mut outcome)?;
        Ok(outcome)
    }

    /// Drops queued actions without running them.
    pub fn discard_queued(&mut self) -> usize {
        self.queue.clear()
    }

    fn drain_queue(&mut self, outcome: &mut DispatchOutcome) -> ChartResult<()> {
        let mut drained = 0usize;
        while let Some(action) = self.queue.pop() {
            drained += 1;
            if drained > MAX_SETTLE_CYCLES {
                let dropped = self.queue.clear() + 1;
                return Err(ChartError::InvalidData(format!(
                    "queued dispatches did not settle after {MAX_SETTLE_CYCLES} cycles; dropped {dropped}"
                )));
            }
            if let Err(err) = self.run_cycle(action, outcome) {
                self.queue.clear();
                return Err(err);
            }
        }
        Ok(())
    }

    fn run_cycle(&mut self, action: Action, outcome: &mut DispatchOutcome) -> ChartResult<()> {
        let tag = action.tag();
        let handler = match self.actions.get(&tag) {
            Some(entry) => Rc::clone(&entry.handler),
            None => return Err(ChartError::UnknownAction(tag.to_string())),
        };
        outcome.cycles += 1;

        let mut before = StateTree::new();
        let applied = {
            let mut writer = StateWriter::new(&mut self.state, &mut before);
            handler(&mut writer, &action)
        };
        if let Err(err) = applied {
            warn!(action = %tag, error = %err, "action failed; state restored");
            self.restore(before);
            return Err(err);
        }

        let changed_state: IndexSet<String> = before
            .iter()
            .filter(|(key, previous)| {
                self.state
                    .get(key.as_str())
                    .is_some_and(|current| !same_value(previous, current))
            })
            .map(|(key, _)| key.clone())
            .collect();
        if changed_state.is_empty() {
            debug!(action = %tag, "dispatch produced no effective change");
            self.restore(before);
            return Ok(());
        }

        let changed_computed = match self.computed.recompute(&self.state, &changed_state) {
            Ok(changed) => changed,
            Err(err) => {
                warn!(action = %tag, error = %err, "computed evaluation failed; state restored");
                self.restore(before);
                return Err(err);
            }
        };

        self.version += 1;
        let changes = ChangeSet {
            state: changed_state,
            computed: changed_computed,
        };
        debug!(
            action = %tag,
            version = self.version,
            state = changes.state.len(),
            computed = changes.computed.len(),
            "dispatch settled"
        );
        self.notify(&changes);

        outcome.version = self.version;
        outcome.effective_cycles += 1;
        outcome.changes.merge(&changes);
        Ok(())
    }

    fn restore(&mut self, before: StateTree) {
        for (key, previous) in before {
            if let Some(slot) = self.state.get_mut(&key) {
                *slot = previous;
            }
        }
    }

    fn notify(&self, changes: &ChangeSet) {
        let targets: Vec<Observer> = self
            .observers
            .iter()
            .filter(|entry| {
                entry
                    .keys
                    .as_ref()
                    .is_none_or(|keys| changes.intersects(keys))
            })
            .map(|entry| Rc::clone(&entry.callback))
            .collect();
        if targets.is_empty() {
            return;
        }
        let snapshot = self.snapshot();
        for observer in targets {
            observer(&snapshot, changes);
        }
    }

    fn push_observer(&mut self, keys: Option<Vec<DepKey>>, callback: Observer) -> ObserverId {
        let id = ObserverId(self.next_observer_id);
        self.next_observer_id += 1;
        self.observers.push(ObserverEntry { id, keys, callback });
        id
    }
}

impl fmt::Debug for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("modules", &self.modules)
            .field("version", &self.version)
            .field("state_keys", &self.state.keys().collect::<Vec<_>>())
            .field("actions", &self.actions.keys().collect::<Vec<_>>())
            .field("observers", &self.observers.len())
            .finish()
    }
}
