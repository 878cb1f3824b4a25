use std::cell::RefCell;
use std::rc::Rc;

use chart_runtime::error::ChartError;
use chart_runtime::store::{Action, ActionTag, DepKey, Store, StoreInit, StoreModule};
use serde_json::{Map, Value, json};

const COUNT: &str = "count";
const LABEL: &str = "label";

fn counter_module() -> StoreModule {
    StoreModule::new("counter")
        .with_state(|_| {
            let mut state = Map::new();
            state.insert(COUNT.to_owned(), json!(0));
            state.insert(LABEL.to_owned(), json!(""));
            Ok(state)
        })
        .with_action(ActionTag::custom("increment"), |state, action| {
            let Action::Custom { payload, .. } = action else {
                return Err(action.unexpected(ActionTag::custom("increment")));
            };
            let by = payload.as_i64().unwrap_or(1);
            state.update(COUNT, |count: &mut i64| {
                *count += by;
                Ok(())
            })
        })
        .with_action(ActionTag::custom("setLabel"), |state, action| {
            let Action::Custom { payload, .. } = action else {
                return Err(action.unexpected(ActionTag::custom("setLabel")));
            };
            state.replace(LABEL, payload.clone())
        })
        .with_action(ActionTag::custom("failHalfway"), |state, _| {
            state.replace(COUNT, json!(999))?;
            state.replace(LABEL, json!("broken"))?;
            Err(ChartError::InvalidData("rejected after partial write".to_owned()))
        })
}

fn counter_store() -> Store {
    Store::with_modules(StoreInit::default(), [counter_module()]).expect("store")
}

fn increment(by: i64) -> Action {
    Action::custom("increment", json!(by))
}

#[test]
fn unknown_action_fails_before_touching_state() {
    let mut store = counter_store();
    let err = store
        .dispatch(Action::custom("zoom", Value::Null))
        .expect_err("unregistered action");
    assert!(matches!(err, ChartError::UnknownAction(ref name) if name == "zoom"));
    assert_eq!(store.version(), 0);
    assert_eq!(store.read::<i64>(COUNT).expect("count"), 0);
}

#[test]
fn failing_handler_rolls_back_every_partial_write() {
    let mut store = counter_store();
    store.dispatch(increment(2)).expect("increment");

    let notified = Rc::new(RefCell::new(0usize));
    let sink = Rc::clone(&notified);
    store.subscribe(move |_, _| *sink.borrow_mut() += 1);

    let err = store
        .dispatch(Action::custom("failHalfway", Value::Null))
        .expect_err("handler error");
    assert!(matches!(err, ChartError::InvalidData(_)));
    assert_eq!(store.read::<i64>(COUNT).expect("count"), 2);
    assert_eq!(store.read::<String>(LABEL).expect("label"), "");
    assert_eq!(store.version(), 1);
    assert_eq!(*notified.borrow(), 0);
}

#[test]
fn observers_run_in_registration_order_with_increasing_versions() {
    let mut store = counter_store();
    let seen = Rc::new(RefCell::new(Vec::<(u8, u64)>::new()));
    for tag in [1u8, 2, 3] {
        let sink = Rc::clone(&seen);
        store.subscribe(move |snapshot, _| sink.borrow_mut().push((tag, snapshot.version())));
    }

    store.dispatch(increment(1)).expect("first");
    store.dispatch(increment(1)).expect("second");

    assert_eq!(
        *seen.borrow(),
        vec![(1, 1), (2, 1), (3, 1), (1, 2), (2, 2), (3, 2)]
    );
}

#[test]
fn ineffective_dispatch_neither_bumps_version_nor_notifies() {
    let mut store = counter_store();
    let notified = Rc::new(RefCell::new(0usize));
    let sink = Rc::clone(&notified);
    store.subscribe(move |_, _| *sink.borrow_mut() += 1);

    let outcome = store
        .dispatch(Action::custom("setLabel", json!("")))
        .expect("same label");
    assert!(!outcome.is_effective());
    assert_eq!(outcome.cycles, 1);
    assert_eq!(store.version(), 0);

    let outcome = store.dispatch(increment(0)).expect("zero increment");
    assert!(!outcome.is_effective());
    assert_eq!(*notified.borrow(), 0);
}

#[test]
fn keyed_observers_only_see_changes_to_their_keys() {
    let mut store = counter_store();
    let label_changes = Rc::new(RefCell::new(0usize));
    let sink = Rc::clone(&label_changes);
    store.observe(vec![DepKey::state(LABEL)], move |_, changes| {
        assert!(changes.touches_state(LABEL));
        *sink.borrow_mut() += 1;
    });

    store.dispatch(increment(1)).expect("count only");
    assert_eq!(*label_changes.borrow(), 0);
    store
        .dispatch(Action::custom("setLabel", json!("price")))
        .expect("label");
    assert_eq!(*label_changes.borrow(), 1);
}

#[test]
fn unsubscribed_observer_is_not_called() {
    let mut store = counter_store();
    let notified = Rc::new(RefCell::new(0usize));
    let sink = Rc::clone(&notified);
    let id = store.subscribe(move |_, _| *sink.borrow_mut() += 1);
    assert!(store.unsubscribe(id));
    assert!(!store.unsubscribe(id));

    store.dispatch(increment(1)).expect("increment");
    assert_eq!(*notified.borrow(), 0);
    assert_eq!(store.observer_count(), 0);
}

#[test]
fn dispatch_from_observer_is_queued_and_runs_after_current_notification() {
    let mut store = counter_store();
    let order = Rc::new(RefCell::new(Vec::<String>::new()));

    let dispatcher = store.dispatcher();
    let sink = Rc::clone(&order);
    store.subscribe(move |snapshot, changes| {
        let count: i64 = snapshot.get(COUNT).expect("count");
        sink.borrow_mut().push(format!("first:{count}"));
        if changes.touches_state(COUNT) && count == 1 {
            dispatcher.enqueue(Action::custom("setLabel", json!("one")));
        }
    });
    let sink = Rc::clone(&order);
    store.subscribe(move |snapshot, _| {
        let label: String = snapshot.get(LABEL).expect("label");
        sink.borrow_mut().push(format!("second:{label}"));
    });

    let outcome = store.dispatch(increment(1)).expect("increment");

    assert_eq!(
        *order.borrow(),
        vec!["first:1", "second:", "first:1", "second:one"]
    );
    assert_eq!(outcome.cycles, 2);
    assert_eq!(outcome.effective_cycles, 2);
    assert_eq!(outcome.version, 2);
    assert!(outcome.changes.touches_state(COUNT));
    assert!(outcome.changes.touches_state(LABEL));
    assert!(store.dispatcher().is_empty());
}

#[test]
fn runaway_queued_dispatches_are_cut_off() {
    let mut store = counter_store();
    let dispatcher = store.dispatcher();
    store.subscribe(move |_, _| dispatcher.enqueue(Action::custom("increment", json!(1))));

    let err = store.dispatch(increment(1)).expect_err("never settles");
    assert!(matches!(err, ChartError::InvalidData(_)));
    assert!(store.dispatcher().is_empty());
}

#[test]
fn failed_queued_dispatch_keeps_earlier_cycles_and_drops_the_rest() {
    let mut store = counter_store();
    let dispatcher = store.dispatcher();
    store.subscribe(move |snapshot, _| {
        if snapshot.version() == 1 {
            dispatcher.enqueue(Action::custom("failHalfway", Value::Null));
            dispatcher.enqueue(Action::custom("setLabel", json!("late")));
        }
    });

    let err = store.dispatch(increment(1)).expect_err("queued action fails");
    assert!(matches!(err, ChartError::InvalidData(_)));
    assert_eq!(store.version(), 1);
    assert_eq!(store.read::<i64>(COUNT).expect("count"), 1);
    assert_eq!(store.read::<String>(LABEL).expect("label"), "");
    assert!(store.dispatcher().is_empty());
}

#[test]
fn duplicate_module_name_and_action_are_rejected() {
    let mut store = counter_store();
    let err = store
        .register_module(StoreModule::new("counter"))
        .expect_err("same module name");
    assert!(matches!(err, ChartError::DuplicateModule { .. }));

    let clash = StoreModule::new("zoom").with_action(ActionTag::custom("increment"), |_, _| Ok(()));
    let err = store.register_module(clash).expect_err("same action tag");
    assert!(matches!(err, ChartError::DuplicateAction { .. }));
    assert!(!store.module_names().iter().any(|name| name == "zoom"));
    assert_eq!(store.action_owner(&ActionTag::custom("increment")), Some("counter"));
}

#[test]
fn duplicate_state_key_is_rejected_without_partial_registration() {
    let mut store = counter_store();
    let clash = StoreModule::new("other").with_state(|_| {
        let mut state = Map::new();
        state.insert("fresh".to_owned(), json!(1));
        state.insert(COUNT.to_owned(), json!(5));
        Ok(state)
    });
    let err = store.register_module(clash).expect_err("count already exists");
    assert!(matches!(err, ChartError::DuplicateModule { ref key, .. } if key == COUNT));
    assert!(store.snapshot().state("fresh").is_none());
    assert_eq!(store.read::<i64>(COUNT).expect("count"), 0);
}
