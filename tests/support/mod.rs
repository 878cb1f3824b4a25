#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use chart_runtime::animation::TaskStep;
use chart_runtime::core::{EventBus, EventPayload, Rect};
use chart_runtime::error::ChartResult;
use chart_runtime::extensions::{
    Component, ComponentContext, PointerEvent, PointerKind, RenderRequest,
};
use chart_runtime::render::FrameLayer;
use chart_runtime::store::{Action, ChangeSet, StoreSnapshot};
use serde_json::json;

/// What a [`Probe`] saw, shared with the test body.
#[derive(Debug, Default)]
pub struct ProbeLog {
    pub renders: usize,
    pub last_version: u64,
    pub last_changes: Option<ChangeSet>,
    pub updates: Vec<TaskStep>,
    pub init_updates: Vec<TaskStep>,
    pub pointer: Vec<String>,
}

pub type SharedLog = Rc<RefCell<ProbeLog>>;

/// Component that records every callback and answers renders with a fixed request.
pub struct Probe {
    name: String,
    rect: Rect,
    request: RenderRequest,
    on_click: Option<Action>,
    log: SharedLog,
}

impl Probe {
    pub fn new(name: &str, rect: Rect, request: RenderRequest) -> (Self, SharedLog) {
        let log = SharedLog::default();
        let probe = Self {
            name: name.to_owned(),
            rect,
            request,
            on_click: None,
            log: Rc::clone(&log),
        };
        (probe, log)
    }

    /// Queues `action` through the component context on every click.
    pub fn dispatching_on_click(mut self, action: Action) -> Self {
        self.on_click = Some(action);
        self
    }
}

impl Component for Probe {
    fn name(&self) -> &str {
        &self.name
    }

    fn rect(&self) -> Rect {
        self.rect
    }

    fn render(
        &mut self,
        state: &StoreSnapshot,
        changes: &ChangeSet,
        _ctx: &ComponentContext,
    ) -> ChartResult<RenderRequest> {
        let mut log = self.log.borrow_mut();
        log.renders += 1;
        log.last_version = state.version();
        log.last_changes = Some(changes.clone());
        Ok(self.request)
    }

    fn update(&mut self, step: TaskStep) -> ChartResult<()> {
        self.log.borrow_mut().updates.push(step);
        Ok(())
    }

    fn init_update(&mut self, step: TaskStep) -> ChartResult<()> {
        self.log.borrow_mut().init_updates.push(step);
        Ok(())
    }

    fn draw(&self, layer: &mut FrameLayer) -> ChartResult<()> {
        layer.draw("probe", json!({ "renders": self.log.borrow().renders }));
        Ok(())
    }

    fn on_pointer(&mut self, event: &PointerEvent, ctx: &ComponentContext) -> ChartResult<()> {
        self.log.borrow_mut().pointer.push(format!("{:?}", event.kind));
        if event.kind == PointerKind::Click {
            if let Some(action) = &self.on_click {
                ctx.dispatch(action.clone());
            }
        }
        Ok(())
    }

    fn on_pointer_enter(&mut self, _ctx: &ComponentContext) -> ChartResult<()> {
        self.log.borrow_mut().pointer.push("enter".to_owned());
        Ok(())
    }

    fn on_pointer_leave(&mut self, _ctx: &ComponentContext) -> ChartResult<()> {
        self.log.borrow_mut().pointer.push("leave".to_owned());
        Ok(())
    }
}

/// Counts emits of `name` on `bus`.
pub fn count_events(bus: &EventBus, name: &str) -> Rc<RefCell<usize>> {
    let count = Rc::new(RefCell::new(0usize));
    let sink = Rc::clone(&count);
    bus.on(name, move |_: &EventPayload| {
        *sink.borrow_mut() += 1;
    });
    count
}
