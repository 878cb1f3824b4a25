//! Contracts for the visual components the chart drives.
//!
//! Concrete components (axes, series, legend, tooltip) live outside this
//! crate; they only see snapshots and the context handles.

mod component;

pub use component::{
    Component, ComponentContext, PointerEvent, PointerKind, RenderRequest,
};
