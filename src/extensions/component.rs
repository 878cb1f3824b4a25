use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::animation::{AnimationTask, TaskStep};
use crate::core::{EventBus, EventPayload, FrameClock, Rect, events};
use crate::error::ChartResult;
use crate::render::FrameLayer;
use crate::store::{Action, ChangeSet, Dispatcher, StoreSnapshot};

/// What a component needs after re-deriving its model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub enum RenderRequest {
    #[default]
    None,
    Draw,
    /// Model changed in a way that should be animated by the chart loop.
    Animate,
}

impl RenderRequest {
    /// Strongest of both requests.
    #[must_use]
    pub fn merge(self, other: Self) -> Self {
        self.max(other)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PointerKind {
    Move,
    Down,
    Up,
    Click,
    DoubleClick,
    /// Pointer left the chart surface.
    Leave,
}

/// Host pointer input, in chart coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerEvent {
    pub kind: PointerKind,
    pub x: f64,
    pub y: f64,
}

impl PointerEvent {
    #[must_use]
    pub fn new(kind: PointerKind, x: f64, y: f64) -> Self {
        Self { kind, x, y }
    }

    #[must_use]
    pub fn moved(x: f64, y: f64) -> Self {
        Self::new(PointerKind::Move, x, y)
    }

    #[must_use]
    pub fn click(x: f64, y: f64) -> Self {
        Self::new(PointerKind::Click, x, y)
    }

    #[must_use]
    pub fn left() -> Self {
        Self::new(PointerKind::Leave, f64::NAN, f64::NAN)
    }

    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Handles a component may use from inside its callbacks.
///
/// Nothing here borrows the engine: dispatches are queued and tasks are
/// collected, both applied once the callback has returned.
#[derive(Clone)]
pub struct ComponentContext {
    bus: Rc<EventBus>,
    dispatcher: Dispatcher,
    clock: FrameClock,
    tasks: Rc<RefCell<Vec<AnimationTask>>>,
}

impl ComponentContext {
    pub(crate) fn new(bus: Rc<EventBus>, dispatcher: Dispatcher, clock: FrameClock) -> Self {
        Self {
            bus,
            dispatcher,
            clock,
            tasks: Rc::default(),
        }
    }

    #[must_use]
    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn emit(&self, name: &str, payload: &EventPayload) -> usize {
        self.bus.emit(name, payload)
    }

    pub fn request_draw(&self) {
        self.bus.signal(events::NEED_DRAW);
    }

    pub fn request_loop(&self) {
        self.bus.signal(events::NEED_LOOP);
    }

    /// Queues `action` for after the current callback.
    pub fn dispatch(&self, action: Action) {
        self.dispatcher.enqueue(action);
    }

    /// Hands a sub-animation to the chart animator.
    pub fn schedule_task(&self, task: AnimationTask) {
        self.tasks.borrow_mut().push(task);
    }

    #[must_use]
    pub fn now(&self) -> f64 {
        self.clock.now()
    }

    pub(crate) fn take_tasks(&self) -> Vec<AnimationTask> {
        std::mem::take(&mut *self.tasks.borrow_mut())
    }
}

impl fmt::Debug for ComponentContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentContext")
            .field("now", &self.clock.now())
            .field("queued_actions", &self.dispatcher.len())
            .field("scheduled_tasks", &self.tasks.borrow().len())
            .finish()
    }
}

/// Visual unit driven by the chart: axis, series, legend, tooltip and so on.
///
/// Components pull what they need from the snapshot; they never hold on to it
/// past the callback.
pub trait Component {
    fn name(&self) -> &str;

    /// Bounds used for pointer hit tests and as the layer origin.
    fn rect(&self) -> Rect;

    fn is_visible(&self) -> bool {
        true
    }

    /// Re-derives the visual model after a dispatch settled.
    fn render(
        &mut self,
        state: &StoreSnapshot,
        changes: &ChangeSet,
        ctx: &ComponentContext,
    ) -> ChartResult<RenderRequest>;

    /// Advances an in-flight model transition.
    fn update(&mut self, _step: TaskStep) -> ChartResult<()> {
        Ok(())
    }

    /// Advances the reveal animation of the first render. Later loops go
    /// through [`Component::update`].
    fn init_update(&mut self, _step: TaskStep) -> ChartResult<()> {
        Ok(())
    }

    fn draw(&self, layer: &mut FrameLayer) -> ChartResult<()>;

    fn on_pointer(&mut self, _event: &PointerEvent, _ctx: &ComponentContext) -> ChartResult<()> {
        Ok(())
    }

    fn on_pointer_enter(&mut self, _ctx: &ComponentContext) -> ChartResult<()> {
        Ok(())
    }

    fn on_pointer_leave(&mut self, _ctx: &ComponentContext) -> ChartResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::RenderRequest;

    #[test]
    fn merge_keeps_strongest_request() {
        assert_eq!(RenderRequest::None.merge(RenderRequest::Draw), RenderRequest::Draw);
        assert_eq!(RenderRequest::Animate.merge(RenderRequest::Draw), RenderRequest::Animate);
        assert_eq!(RenderRequest::default(), RenderRequest::None);
    }
}
