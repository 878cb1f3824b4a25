use std::cell::Cell;
use std::rc::Rc;

use crate::error::{ChartError, ChartResult};

/// Shared host-driven clock in chart time units.
///
/// Cloning yields another handle to the same instant so bus handlers can stamp
/// coalescer triggers without borrowing the engine.
#[derive(Debug, Clone, Default)]
pub struct FrameClock {
    now: Rc<Cell<f64>>,
}

impl FrameClock {
    #[must_use]
    pub fn starting_at(now: f64) -> Self {
        Self {
            now: Rc::new(Cell::new(now)),
        }
    }

    #[must_use]
    pub fn now(&self) -> f64 {
        self.now.get()
    }

    /// Moves the clock forward. Time never runs backwards.
    pub fn advance_to(&self, now: f64) -> ChartResult<()> {
        if !now.is_finite() {
            return Err(ChartError::InvalidData(
                "clock instant must be finite".to_owned(),
            ));
        }
        if now < self.now.get() {
            return Err(ChartError::InvalidData(format!(
                "clock cannot move backwards from {} to {now}",
                self.now.get()
            )));
        }
        self.now.set(now);
        Ok(())
    }
}
