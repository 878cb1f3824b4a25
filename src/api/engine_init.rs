use std::cell::RefCell;
use std::rc::Rc;

use tracing::{debug, info};

use crate::animation::{AnimationControlFlags, Animator, DurationPolicy};
use crate::core::{Debouncer, EventBus, FrameClock, events};
use crate::error::{ChartError, ChartResult};
use crate::extensions::{Component, ComponentContext, RenderRequest};
use crate::render::Renderer;
use crate::store::modules::ChartOptions;
use crate::store::{Action, Store, StoreModule, default_modules};

use super::component_manager::ComponentManager;
use super::engine::{EnginePhase, ResizeState, SchedulerState};
use super::{ChartEngine, ChartEngineConfig, SchedulerStats};

impl<R: Renderer> ChartEngine<R> {
    /// Builds the engine without touching the store.
    ///
    /// Add chart-type modules and components, then call [`Self::initialize`].
    pub fn new(renderer: R, config: ChartEngineConfig) -> ChartResult<Self> {
        config.validate()?;
        ChartOptions::from_value(&config.initial.options)?;

        let clock = FrameClock::default();
        let bus = Rc::new(EventBus::new());
        let store = Store::new(config.initial.clone());
        let context = ComponentContext::new(Rc::clone(&bus), store.dispatcher(), clock.clone());
        let scheduler = SchedulerState {
            redraw: Rc::new(RefCell::new(Debouncer::new(config.redraw_window))),
            looping: Rc::new(RefCell::new(Debouncer::new(config.loop_window))),
            animator: Animator::new(),
            flags: AnimationControlFlags::default(),
            policy: DurationPolicy::new(config.default_animation_duration),
        };
        let resize = ResizeState {
            coalescer: Debouncer::new(config.resize_window),
            container: config.container,
            observing: None,
        };

        let engine = Self {
            renderer,
            config,
            phase: EnginePhase::Constructed,
            clock,
            bus,
            store,
            pending_modules: Vec::new(),
            components: ComponentManager::default(),
            context,
            scheduler,
            resize,
            stats: SchedulerStats::default(),
        };
        engine.bind_scheduling_signals();
        Ok(engine)
    }

    /// Queues a chart-type module, registered after the built-in ones.
    pub fn add_module(&mut self, module: StoreModule) -> ChartResult<()> {
        match self.phase {
            EnginePhase::Constructed => {
                self.pending_modules.push(module);
                Ok(())
            }
            EnginePhase::Ready => Err(ChartError::AlreadyInitialized),
            EnginePhase::Destroyed => Err(ChartError::Destroyed),
        }
    }

    /// Registers a component. After initialization it renders immediately.
    pub fn add_component(&mut self, component: Box<dyn Component>) -> ChartResult<()> {
        self.ensure_alive()?;
        self.components.add(component)?;
        if self.phase == EnginePhase::Ready {
            let snapshot = self.store.snapshot();
            let changes = snapshot.full_change_set();
            let request = self
                .components
                .render_last(&snapshot, &changes, &self.context)?;
            self.request_render(request, false);
            self.settle_queued()?;
        }
        Ok(())
    }

    /// Populates the store, seeds the chart size from the container, renders
    /// components and starts container observation for `auto` dimensions.
    pub fn initialize(&mut self) -> ChartResult<()> {
        match self.phase {
            EnginePhase::Constructed => {}
            EnginePhase::Ready => return Err(ChartError::AlreadyInitialized),
            EnginePhase::Destroyed => return Err(ChartError::Destroyed),
        }

        let modules: Vec<StoreModule> = default_modules()
            .into_iter()
            .chain(self.pending_modules.iter().cloned())
            .collect();
        let mut store = Store::new(self.config.initial.clone());
        for module in modules {
            store.register_module(module)?;
        }
        store.dispatch(Action::InitChartSize(self.resize.container))?;
        // Components hold a dispatcher handle, which must point at the live store.
        self.context = ComponentContext::new(
            Rc::clone(&self.bus),
            store.dispatcher(),
            self.clock.clone(),
        );
        self.store = store;
        self.pending_modules.clear();
        self.phase = EnginePhase::Ready;

        let snapshot = self.store.snapshot();
        let changes = snapshot.full_change_set();
        let request = self
            .components
            .render_all(&snapshot, &changes, &self.context)?;
        self.request_render(request, false);
        self.settle_queued()?;

        if ChartOptions::from_value(&self.config.initial.options)?.uses_auto_size() {
            self.start_observing_container();
        }
        info!(
            modules = self.store.module_names().len(),
            components = self.components.len(),
            observing = self.is_observing_container(),
            "chart initialized"
        );
        Ok(())
    }

    /// Tears the chart down. Every later call fails with `Destroyed`.
    pub fn destroy(&mut self) -> ChartResult<()> {
        self.ensure_alive()?;
        self.components.clear();
        self.stop_observing_container();
        self.resize.coalescer.cancel();
        self.scheduler.redraw.borrow_mut().cancel();
        self.scheduler.looping.borrow_mut().cancel();
        self.scheduler.animator.clear();
        self.store.clear_observers();
        self.store.discard_queued();
        self.context.take_tasks();
        self.bus.clear_all();
        self.phase = EnginePhase::Destroyed;
        debug!("chart destroyed");
        Ok(())
    }

    /// Routes `needDraw`/`needLoop` into their coalescers.
    fn bind_scheduling_signals(&self) {
        let redraw = Rc::clone(&self.scheduler.redraw);
        let clock = self.clock.clone();
        self.bus.on(events::NEED_DRAW, move |_| {
            redraw.borrow_mut().trigger(clock.now(), ());
        });
        let looping = Rc::clone(&self.scheduler.looping);
        let clock = self.clock.clone();
        self.bus.on(events::NEED_LOOP, move |_| {
            looping.borrow_mut().trigger(clock.now(), ());
        });
    }

    /// Turns a component render request into a scheduling signal.
    pub(super) fn request_render(&self, request: RenderRequest, effective_change: bool) {
        match request {
            RenderRequest::Animate => {
                self.bus.signal(events::NEED_LOOP);
            }
            RenderRequest::Draw => {
                self.bus.signal(events::NEED_DRAW);
            }
            RenderRequest::None if effective_change => {
                self.bus.signal(events::NEED_DRAW);
            }
            RenderRequest::None => {}
        }
    }
}
