use serde::{Deserialize, Serialize};

/// Counters describing how much scheduling work the engine has done.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SchedulerStats {
    /// Coalesced `draw()` passes.
    pub draws: u64,
    /// Paints issued by render-bound animation steps.
    pub paints: u64,
    pub frames: u64,
    pub loops_started: u64,
    pub loops_completed: u64,
    /// Resize coalescer firings, effective or not.
    pub resize_calls: u64,
    pub effective_resizes: u64,
    pub failed_tasks: u64,
}
