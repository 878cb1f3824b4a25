//! Chart orchestrator: lifecycle, scheduling and the public chart API.

mod component_manager;
mod engine;
mod engine_config;
mod engine_init;
mod engine_options;
mod engine_resize;
mod engine_scheduler;
mod scheduler_stats;

pub use engine::{ChartEngine, EnginePhase, ResizeSource};
pub use engine_config::{ChartEngineConfig, MIN_TIMING_WINDOW};
pub use scheduler_stats::SchedulerStats;
