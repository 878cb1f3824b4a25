use tracing::debug;

use crate::animation::TaskStep;
use crate::core::Size;
use crate::error::{ChartError, ChartResult};
use crate::extensions::{Component, ComponentContext, PointerEvent, PointerKind, RenderRequest};
use crate::render::{FrameLayer, RenderFrame};
use crate::store::{ChangeSet, StoreSnapshot};

struct ComponentSlot {
    component: Box<dyn Component>,
    entered: bool,
}

/// Registered components in draw order, plus pointer enter/leave tracking.
#[derive(Default)]
pub(super) struct ComponentManager {
    slots: Vec<ComponentSlot>,
}

impl ComponentManager {
    pub(super) fn add(&mut self, component: Box<dyn Component>) -> ChartResult<()> {
        let name = component.name().to_owned();
        if name.is_empty() {
            return Err(ChartError::InvalidData(
                "component name must not be empty".to_owned(),
            ));
        }
        if self.contains(&name) {
            return Err(ChartError::InvalidData(format!(
                "component `{name}` is already registered"
            )));
        }
        debug!(component = %name, "component added");
        self.slots.push(ComponentSlot {
            component,
            entered: false,
        });
        Ok(())
    }

    #[must_use]
    pub(super) fn contains(&self, name: &str) -> bool {
        self.slots.iter().any(|slot| slot.component.name() == name)
    }

    #[must_use]
    pub(super) fn len(&self) -> usize {
        self.slots.len()
    }

    pub(super) fn names(&self) -> Vec<String> {
        self.slots
            .iter()
            .map(|slot| slot.component.name().to_owned())
            .collect()
    }

    pub(super) fn clear(&mut self) {
        self.slots.clear();
    }

    /// Lets every component re-derive its model; returns the strongest request.
    pub(super) fn render_all(
        &mut self,
        state: &StoreSnapshot,
        changes: &ChangeSet,
        ctx: &ComponentContext,
    ) -> ChartResult<RenderRequest> {
        let mut request = RenderRequest::None;
        for slot in &mut self.slots {
            request = request.merge(slot.component.render(state, changes, ctx)?);
        }
        Ok(request)
    }

    pub(super) fn render_last(
        &mut self,
        state: &StoreSnapshot,
        changes: &ChangeSet,
        ctx: &ComponentContext,
    ) -> ChartResult<RenderRequest> {
        match self.slots.last_mut() {
            Some(slot) => slot.component.render(state, changes, ctx),
            None => Ok(RenderRequest::None),
        }
    }

    pub(super) fn update_all(&mut self, step: TaskStep) -> ChartResult<()> {
        for slot in &mut self.slots {
            slot.component.update(step)?;
        }
        Ok(())
    }

    pub(super) fn init_update_all(&mut self, step: TaskStep) -> ChartResult<()> {
        for slot in &mut self.slots {
            slot.component.init_update(step)?;
        }
        Ok(())
    }

    /// Collects one layer per visible component.
    pub(super) fn build_frame(&self, size: Size) -> ChartResult<RenderFrame> {
        self.slots
            .iter()
            .filter(|slot| slot.component.is_visible())
            .try_fold(RenderFrame::new(size), |frame, slot| -> ChartResult<RenderFrame> {
                let mut layer = FrameLayer::new(slot.component.name(), slot.component.rect());
                slot.component.draw(&mut layer)?;
                Ok(frame.with_layer(layer))
            })
    }

    /// Tracks enter/leave on moves and forwards the event to every component
    /// under the pointer. Returns how many components received it.
    pub(super) fn handle_pointer(
        &mut self,
        event: &PointerEvent,
        ctx: &ComponentContext,
    ) -> ChartResult<usize> {
        if event.kind == PointerKind::Leave {
            for slot in self.slots.iter_mut().filter(|slot| slot.entered) {
                slot.entered = false;
                slot.component.on_pointer_leave(ctx)?;
            }
            return Ok(0);
        }
        if !event.is_finite() {
            return Err(ChartError::InvalidData(format!(
                "pointer position must be finite, got ({}, {})",
                event.x, event.y
            )));
        }

        let mut delivered = 0;
        for slot in &mut self.slots {
            let inside = slot.component.rect().contains(event.x, event.y);
            if event.kind == PointerKind::Move && inside != slot.entered {
                slot.entered = inside;
                if inside {
                    slot.component.on_pointer_enter(ctx)?;
                } else {
                    slot.component.on_pointer_leave(ctx)?;
                }
            }
            if inside {
                slot.component.on_pointer(event, ctx)?;
                delivered += 1;
            }
        }
        Ok(delivered)
    }
}
