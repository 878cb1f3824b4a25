use std::cell::RefCell;
use std::rc::Rc;

use chart_runtime::core::{Debounced, Debouncer};
use proptest::prelude::*;

#[test]
fn burst_fires_once_with_the_last_arguments() {
    let calls = Rc::new(RefCell::new(Vec::<u32>::new()));
    let sink = Rc::clone(&calls);
    let mut debounced = Debounced::new(10.0, move |value: u32| {
        sink.borrow_mut().push(value);
    });

    debounced.call(0.0, 1);
    debounced.call(3.0, 2);
    debounced.call(6.0, 3);
    assert_eq!(debounced.deadline(), Some(16.0));

    for now in [7.0, 10.0, 15.9] {
        assert!(!debounced.fire_due(now));
    }
    assert!(debounced.fire_due(16.0));
    assert!(!debounced.fire_due(40.0));

    assert_eq!(*calls.borrow(), vec![3]);
}

#[test]
fn cancel_drops_the_pending_call() {
    let mut timer = Debouncer::new(10.0);
    timer.trigger(0.0, "resize");
    assert!(timer.cancel());
    assert!(!timer.cancel());
    assert_eq!(timer.poll(100.0), None);
    assert_eq!(timer.deadline(), None);
}

#[test]
fn trigger_after_delivery_starts_a_new_window() {
    let mut timer = Debouncer::new(10.0);
    timer.trigger(0.0, 1);
    assert_eq!(timer.poll(10.0), Some(1));
    timer.trigger(25.0, 2);
    assert!(!timer.is_due(30.0));
    assert_eq!(timer.poll(35.0), Some(2));
}

#[test]
fn negative_window_is_clamped_to_zero() {
    let mut timer = Debouncer::new(-5.0);
    assert_eq!(timer.window(), 0.0);
    timer.trigger(4.0, ());
    assert_eq!(timer.poll(4.0), Some(()));
}

proptest! {
    #[test]
    fn any_burst_inside_the_window_delivers_exactly_once(
        gaps in prop::collection::vec(0.0f64..9.9, 1..20),
        window in 10.0f64..50.0
    ) {
        let mut timer = Debouncer::new(window);
        let mut now = 0.0;
        let mut delivered = Vec::new();
        for (index, gap) in gaps.iter().enumerate() {
            now += gap;
            if let Some(value) = timer.poll(now) {
                delivered.push(value);
            }
            timer.trigger(now, index);
        }
        let last_trigger = now;
        if let Some(value) = timer.poll(last_trigger + window) {
            delivered.push(value);
        }

        prop_assert_eq!(delivered, vec![gaps.len() - 1]);
        prop_assert!(!timer.is_pending());
    }
}
