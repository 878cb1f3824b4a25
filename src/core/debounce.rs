//! Temporal coalescing of bursty triggers.
//!
//! A trigger cancels whatever call is pending and schedules a new one
//! `window` time units later carrying the latest arguments. Only the last
//! trigger of a burst is ever delivered.

use tracing::trace;

#[derive(Debug, Clone, PartialEq)]
struct PendingCall<A> {
    deadline: f64,
    args: A,
}

/// Polled debounce timer.
///
/// The owner decides when to poll; `poll` hands the arguments out exactly once
/// after the deadline is reached.
#[derive(Debug, Clone, PartialEq)]
pub struct Debouncer<A> {
    window: f64,
    pending: Option<PendingCall<A>>,
}

impl<A> Debouncer<A> {
    #[must_use]
    pub fn new(window: f64) -> Self {
        Self {
            window: window.max(0.0),
            pending: None,
        }
    }

    #[must_use]
    pub fn window(&self) -> f64 {
        self.window
    }

    /// Replaces any pending call with `args`, due at `now + window`.
    pub fn trigger(&mut self, now: f64, args: A) {
        let deadline = now + self.window;
        if self.pending.is_some() {
            trace!(deadline, "debounce trigger replaced pending call");
        }
        self.pending = Some(PendingCall { deadline, args });
    }

    #[must_use]
    pub fn deadline(&self) -> Option<f64> {
        self.pending.as_ref().map(|pending| pending.deadline)
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    #[must_use]
    pub fn is_due(&self, now: f64) -> bool {
        self.deadline().is_some_and(|deadline| now >= deadline)
    }

    /// Takes the pending arguments when the deadline has been reached.
    pub fn poll(&mut self, now: f64) -> Option<A> {
        if !self.is_due(now) {
            return None;
        }
        self.pending.take().map(|pending| pending.args)
    }

    /// Drops the pending call without delivering it.
    pub fn cancel(&mut self) -> bool {
        self.pending.take().is_some()
    }
}

/// Debouncer that owns its downstream callback.
pub struct Debounced<A, F>
where
    F: FnMut(A),
{
    timer: Debouncer<A>,
    callback: F,
}

impl<A, F> Debounced<A, F>
where
    F: FnMut(A),
{
    #[must_use]
    pub fn new(window: f64, callback: F) -> Self {
        Self {
            timer: Debouncer::new(window),
            callback,
        }
    }

    pub fn call(&mut self, now: f64, args: A) {
        self.timer.trigger(now, args);
    }

    #[must_use]
    pub fn deadline(&self) -> Option<f64> {
        self.timer.deadline()
    }

    /// Runs the callback if the pending call is due. Returns `true` when it ran.
    pub fn fire_due(&mut self, now: f64) -> bool {
        match self.timer.poll(now) {
            Some(args) => {
                (self.callback)(args);
                true
            }
            None => false,
        }
    }

    pub fn cancel(&mut self) -> bool {
        self.timer.cancel()
    }
}

#[cfg(test)]
mod tests {
    use super::{Debounced, Debouncer};

    #[test]
    fn burst_inside_window_delivers_only_latest_args() {
        let mut timer = Debouncer::new(10.0);
        timer.trigger(0.0, "first");
        timer.trigger(3.0, "second");
        timer.trigger(6.0, "third");

        assert_eq!(timer.poll(15.9), None);
        assert_eq!(timer.deadline(), Some(16.0));
        assert_eq!(timer.poll(16.0), Some("third"));
        assert_eq!(timer.poll(40.0), None);
    }

    #[test]
    fn cancel_discards_pending_call() {
        let mut timer = Debouncer::new(100.0);
        timer.trigger(0.0, (800.0, 400.0));
        assert!(timer.cancel());
        assert!(!timer.is_pending());
        assert_eq!(timer.poll(1_000.0), None);
    }

    #[test]
    fn wrapped_callback_runs_once_per_burst() {
        let mut seen = Vec::new();
        {
            let mut debounced = Debounced::new(10.0, |value: u32| seen.push(value));
            debounced.call(0.0, 1);
            debounced.call(4.0, 2);
            assert!(!debounced.fire_due(13.0));
            assert!(debounced.fire_due(14.0));
            assert!(!debounced.fire_due(30.0));
        }
        assert_eq!(seen, vec![2]);
    }
}
