mod frame;
mod null_renderer;

pub use frame::{DrawCommand, FrameLayer, RenderFrame};
pub use null_renderer::NullRenderer;

use crate::error::ChartResult;

/// Contract implemented by any rendering backend.
///
/// Backends receive a fully materialized `RenderFrame` so brush code stays
/// isolated from scheduling and store logic.
pub trait Renderer {
    fn render(&mut self, frame: &RenderFrame) -> ChartResult<()>;
}
