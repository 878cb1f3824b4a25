use std::rc::Rc;

use indexmap::{IndexMap, IndexSet};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::trace;

use crate::error::{ChartError, ChartResult};

use super::module::ComputedDef;
use super::state::{ComputedValues, DepKey, StateTree, decode, same_value};

/// Read access for one computed evaluation, limited to its declared dependencies.
pub struct ComputeContext<'a> {
    field: &'a str,
    deps: &'a [DepKey],
    state: &'a StateTree,
    computed: &'a ComputedValues,
}

impl<'a> ComputeContext<'a> {
    #[must_use]
    pub fn field(&self) -> &str {
        self.field
    }

    pub fn state(&self, key: &str) -> ChartResult<&'a Value> {
        self.ensure_declared(|dep| matches!(dep, DepKey::State(name) if name == key), key)?;
        self.state
            .get(key)
            .map(|value| value.as_ref())
            .ok_or_else(|| self.unknown(key))
    }

    pub fn computed(&self, name: &str) -> ChartResult<&'a Value> {
        self.ensure_declared(
            |dep| matches!(dep, DepKey::Computed(dep_name) if dep_name == name),
            name,
        )?;
        self.computed
            .get(name)
            .map(|value| value.as_ref())
            .ok_or_else(|| self.unknown(name))
    }

    pub fn read_state<T: DeserializeOwned>(&self, key: &str) -> ChartResult<T> {
        decode(key, self.state(key)?)
    }

    pub fn read_computed<T: DeserializeOwned>(&self, name: &str) -> ChartResult<T> {
        decode(name, self.computed(name)?)
    }

    fn ensure_declared(&self, matches: impl Fn(&DepKey) -> bool, key: &str) -> ChartResult<()> {
        if self.deps.iter().any(matches) {
            Ok(())
        } else {
            Err(ChartError::UndeclaredDependency {
                field: self.field.to_owned(),
                dependency: key.to_owned(),
            })
        }
    }

    fn unknown(&self, key: &str) -> ChartError {
        ChartError::UnknownDependency {
            field: self.field.to_owned(),
            dependency: key.to_owned(),
        }
    }
}

/// Computed fields kept in topological order with their memoized values.
#[derive(Default)]
pub(crate) struct ComputedGraph {
    defs: IndexMap<String, ComputedDef>,
    values: ComputedValues,
    evaluations: IndexMap<String, u64>,
}

impl ComputedGraph {
    #[must_use]
    pub(crate) fn values(&self) -> &ComputedValues {
        &self.values
    }

    #[must_use]
    pub(crate) fn contains(&self, name: &str) -> bool {
        self.defs.contains_key(name)
    }

    #[must_use]
    pub(crate) fn evaluations(&self, name: &str) -> Option<u64> {
        self.evaluations.get(name).copied()
    }

    /// Validates a module's computed fields and returns them in evaluation order.
    ///
    /// Dependencies outside the module must already be registered; inside the
    /// module they may appear in any order as long as they form a DAG.
    pub(crate) fn plan(
        &self,
        module: &str,
        defs: &[ComputedDef],
        is_state_key: impl Fn(&str) -> bool,
    ) -> ChartResult<Vec<ComputedDef>> {
        let mut local: IndexMap<&str, &ComputedDef> = IndexMap::new();
        for def in defs {
            if self.defs.contains_key(&def.name)
                || is_state_key(&def.name)
                || local.insert(def.name.as_str(), def).is_some()
            {
                return Err(ChartError::DuplicateModule {
                    module: module.to_owned(),
                    key: def.name.clone(),
                });
            }
        }

        for def in defs {
            for dep in &def.deps {
                let known = match dep {
                    DepKey::State(key) => is_state_key(key),
                    DepKey::Computed(name) => {
                        self.defs.contains_key(name) || local.contains_key(name.as_str())
                    }
                };
                if !known {
                    return Err(ChartError::UnknownDependency {
                        field: def.name.clone(),
                        dependency: dep.name().to_owned(),
                    });
                }
            }
        }

        let mut remaining: IndexMap<&str, IndexSet<&str>> = defs
            .iter()
            .map(|def| {
                let local_deps = def
                    .deps
                    .iter()
                    .filter_map(|dep| match dep {
                        DepKey::Computed(name) if local.contains_key(name.as_str()) => {
                            Some(name.as_str())
                        }
                        _ => None,
                    })
                    .collect();
                (def.name.as_str(), local_deps)
            })
            .collect();

        let mut ordered = Vec::with_capacity(defs.len());
        loop {
            let ready: Vec<&str> = remaining
                .iter()
                .filter(|(_, deps)| deps.is_empty())
                .map(|(name, _)| *name)
                .collect();
            if ready.is_empty() {
                break;
            }
            for name in ready {
                remaining.shift_remove(name);
                for deps in remaining.values_mut() {
                    deps.shift_remove(name);
                }
                ordered.push(local[name].clone());
            }
        }

        if !remaining.is_empty() {
            return Err(ChartError::CyclicDependency {
                cycle: find_cycle(&remaining),
            });
        }
        Ok(ordered)
    }

    /// Evaluates planned fields against `state` and installs them.
    ///
    /// Nothing is installed if any evaluator fails.
    pub(crate) fn install(&mut self, ordered: Vec<ComputedDef>, state: &StateTree) -> ChartResult<()> {
        let mut staged = self.values.clone();
        for def in &ordered {
            let context = ComputeContext {
                field: &def.name,
                deps: &def.deps,
                state,
                computed: &staged,
            };
            let value = (def.compute)(&context)?;
            staged.insert(def.name.clone(), Rc::new(value));
        }

        self.values = staged;
        for def in ordered {
            self.evaluations.insert(def.name.clone(), 1);
            self.defs.insert(def.name.clone(), def);
        }
        Ok(())
    }

    /// Re-evaluates fields reachable from `changed_state` and returns the
    /// names whose value changed. Memos are left untouched on error.
    pub(crate) fn recompute(
        &mut self,
        state: &StateTree,
        changed_state: &IndexSet<String>,
    ) -> ChartResult<IndexSet<String>> {
        let mut staged = self.values.clone();
        let mut changed = IndexSet::new();
        let mut evaluated = Vec::new();

        for (name, def) in &self.defs {
            let dirty = def.deps.iter().any(|dep| match dep {
                DepKey::State(key) => changed_state.contains(key),
                DepKey::Computed(dep_name) => changed.contains(dep_name),
            });
            if !dirty {
                continue;
            }

            let context = ComputeContext {
                field: name,
                deps: &def.deps,
                state,
                computed: &staged,
            };
            let next = Rc::new((def.compute)(&context)?);
            evaluated.push(name.clone());

            let unchanged = staged
                .get(name)
                .is_some_and(|previous| same_value(previous, &next));
            if !unchanged {
                trace!(field = %name, "computed value changed");
                staged.insert(name.clone(), next);
                changed.insert(name.clone());
            }
        }

        self.values = staged;
        for name in evaluated {
            *self.evaluations.entry(name).or_default() += 1;
        }
        Ok(changed)
    }
}

fn find_cycle(remaining: &IndexMap<&str, IndexSet<&str>>) -> Vec<String> {
    let Some((start, _)) = remaining.first() else {
        return Vec::new();
    };
    let mut path: Vec<&str> = Vec::new();
    let mut current = *start;
    loop {
        if let Some(position) = path.iter().position(|name| *name == current) {
            let mut cycle: Vec<String> = path[position..].iter().map(|name| (*name).to_owned()).collect();
            cycle.push(current.to_owned());
            return cycle;
        }
        path.push(current);
        match remaining.get(current).and_then(|deps| deps.first()) {
            Some(next) => current = *next,
            None => return path.iter().map(|name| (*name).to_owned()).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use indexmap::IndexSet;
    use serde_json::{Value, json};

    use super::ComputedGraph;
    use crate::error::ChartError;
    use crate::store::module::ComputedDef;
    use crate::store::state::{DepKey, StateTree};

    fn constant(name: &str, deps: Vec<DepKey>) -> ComputedDef {
        ComputedDef::new(name, deps, |_| Ok(Value::Null))
    }

    #[test]
    fn plan_orders_fields_inside_module_topologically() {
        let graph = ComputedGraph::default();
        let defs = vec![
            constant("total", vec![DepKey::computed("visible")]),
            constant("visible", vec![DepKey::state("series")]),
        ];
        let ordered = graph
            .plan("series", &defs, |key| key == "series")
            .expect("plan");
        let names: Vec<&str> = ordered.iter().map(|def| def.name.as_str()).collect();
        assert_eq!(names, vec!["visible", "total"]);
    }

    #[test]
    fn plan_reports_cycle_path() {
        let graph = ComputedGraph::default();
        let defs = vec![
            constant("a", vec![DepKey::computed("b")]),
            constant("b", vec![DepKey::computed("c")]),
            constant("c", vec![DepKey::computed("a")]),
        ];
        let err = graph.plan("loop", &defs, |_| false).expect_err("cycle");
        match err {
            ChartError::CyclicDependency { cycle } => {
                assert_eq!(cycle, vec!["a", "b", "c", "a"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn self_dependency_is_a_cycle() {
        let graph = ComputedGraph::default();
        let defs = vec![constant("a", vec![DepKey::computed("a")])];
        assert!(matches!(
            graph.plan("self", &defs, |_| false),
            Err(ChartError::CyclicDependency { .. })
        ));
    }

    #[test]
    fn recompute_stops_at_unchanged_values() {
        let mut state = StateTree::new();
        state.insert("n".to_owned(), Rc::new(json!(3)));

        let mut graph = ComputedGraph::default();
        let defs = vec![
            ComputedDef::new("is_odd", vec![DepKey::state("n")], |ctx| {
                let n: i64 = ctx.read_state("n")?;
                Ok(json!(n % 2 == 1))
            }),
            ComputedDef::new("label", vec![DepKey::computed("is_odd")], |ctx| {
                let odd: bool = ctx.read_computed("is_odd")?;
                Ok(json!(if odd { "odd" } else { "even" }))
            }),
        ];
        let ordered = graph.plan("parity", &defs, |key| key == "n").expect("plan");
        graph.install(ordered, &state).expect("install");

        state.insert("n".to_owned(), Rc::new(json!(5)));
        let changed = graph
            .recompute(&state, &IndexSet::from(["n".to_owned()]))
            .expect("recompute");
        assert!(changed.is_empty());
        assert_eq!(graph.evaluations("is_odd"), Some(2));
        assert_eq!(graph.evaluations("label"), Some(1));
    }
}
