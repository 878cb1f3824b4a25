//! chart-runtime: reactive store and redraw/animation scheduler for
//! component-based charts.
//!
//! The crate owns chart state, decides when work happens and how often, and
//! coalesces bursts of input (resize, option updates, pointer interaction)
//! into ordered render passes. Drawing itself is left to a [`render::Renderer`]
//! and to the [`extensions::Component`]s registered with the engine.

pub mod animation;
pub mod api;
pub mod core;
pub mod error;
pub mod extensions;
pub mod render;
pub mod store;
pub mod telemetry;

pub use api::{ChartEngine, ChartEngineConfig, EnginePhase, SchedulerStats};
pub use error::{ChartError, ChartResult};
