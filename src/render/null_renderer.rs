use crate::core::Size;
use crate::error::ChartResult;
use crate::render::{RenderFrame, Renderer};

/// Headless renderer: validates and counts frames instead of drawing them.
///
/// Frames are still checked with [`RenderFrame::validate`], so geometry bugs in
/// components surface in headless runs.
#[derive(Debug, Default)]
pub struct NullRenderer {
    pub frames: usize,
    pub last_size: Option<Size>,
    pub last_layer_count: usize,
    pub last_command_count: usize,
    /// Component names of the last frame, bottom layer first.
    pub last_layers: Vec<String>,
}

impl Renderer for NullRenderer {
    fn render(&mut self, frame: &RenderFrame) -> ChartResult<()> {
        frame.validate()?;
        self.frames += 1;
        self.last_size = Some(frame.size);
        self.last_layer_count = frame.layers.len();
        self.last_command_count = frame.command_count();
        self.last_layers = frame
            .layers
            .iter()
            .map(|layer| layer.component.clone())
            .collect();
        Ok(())
    }
}
