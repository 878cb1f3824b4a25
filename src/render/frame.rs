use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::{Rect, Size};
use crate::error::{ChartError, ChartResult};

/// One brush invocation with the model it paints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawCommand {
    pub brush: String,
    pub model: Value,
}

impl DrawCommand {
    #[must_use]
    pub fn new(brush: impl Into<String>, model: Value) -> Self {
        Self {
            brush: brush.into(),
            model,
        }
    }
}

/// Draw commands of one component, positioned at the component origin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameLayer {
    pub component: String,
    pub rect: Rect,
    pub commands: Vec<DrawCommand>,
}

impl FrameLayer {
    #[must_use]
    pub fn new(component: impl Into<String>, rect: Rect) -> Self {
        Self {
            component: component.into(),
            rect,
            commands: Vec::new(),
        }
    }

    pub fn push(&mut self, command: DrawCommand) {
        self.commands.push(command);
    }

    pub fn draw(&mut self, brush: impl Into<String>, model: Value) {
        self.push(DrawCommand::new(brush, model));
    }
}

/// Backend-agnostic scene for one chart draw pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderFrame {
    pub size: Size,
    pub layers: Vec<FrameLayer>,
}

impl RenderFrame {
    #[must_use]
    pub fn new(size: Size) -> Self {
        Self {
            size,
            layers: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_layer(mut self, layer: FrameLayer) -> Self {
        self.layers.push(layer);
        self
    }

    pub fn validate(&self) -> ChartResult<()> {
        self.size.validate()?;
        for layer in &self.layers {
            if !layer.rect.is_finite() {
                return Err(ChartError::InvalidData(format!(
                    "component `{}` has a non-finite rect",
                    layer.component
                )));
            }
            if let Some(command) = layer.commands.iter().find(|command| command.brush.is_empty()) {
                return Err(ChartError::InvalidData(format!(
                    "component `{}` issued a draw command without brush (model: {})",
                    layer.component, command.model
                )));
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn command_count(&self) -> usize {
        self.layers.iter().map(|layer| layer.commands.len()).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.command_count() == 0
    }
}
