use std::cell::RefCell;
use std::rc::Rc;

use crate::animation::{AnimationControlFlags, Animator, DurationPolicy};
use crate::core::{Debouncer, EventBus, FrameClock, Size};
use crate::error::{ChartError, ChartResult};
use crate::extensions::ComponentContext;
use crate::render::Renderer;
use crate::store::modules::root::CHART;
use crate::store::{Store, StoreModule};

use super::component_manager::ComponentManager;
use super::{ChartEngineConfig, SchedulerStats};

/// Lifecycle phase of a [`ChartEngine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnginePhase {
    /// Built; modules and components may still be added.
    Constructed,
    Ready,
    Destroyed,
}

/// How container size changes reach the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResizeSource {
    /// Host resize observer on the container.
    Observer,
    /// Window-level resize events, when the host has no resize observer.
    WindowFallback,
}

pub(super) struct SchedulerState {
    pub(super) redraw: Rc<RefCell<Debouncer<()>>>,
    pub(super) looping: Rc<RefCell<Debouncer<()>>>,
    pub(super) animator: Animator,
    pub(super) flags: AnimationControlFlags,
    pub(super) policy: DurationPolicy,
}

pub(super) struct ResizeState {
    pub(super) coalescer: Debouncer<Size>,
    /// Last container size reported by the host.
    pub(super) container: Size,
    pub(super) observing: Option<ResizeSource>,
}

/// Main orchestration facade consumed by host applications.
///
/// `ChartEngine` owns the store, the components, the animator and the
/// coalescers, and decides when the renderer is called. All deferred work
/// runs when the host advances the clock through `advance_to`.
pub struct ChartEngine<R: Renderer> {
    pub(super) renderer: R,
    pub(super) config: ChartEngineConfig,
    pub(super) phase: EnginePhase,
    pub(super) clock: FrameClock,
    pub(super) bus: Rc<EventBus>,
    pub(super) store: Store,
    pub(super) pending_modules: Vec<StoreModule>,
    pub(super) components: ComponentManager,
    pub(super) context: ComponentContext,
    pub(super) scheduler: SchedulerState,
    pub(super) resize: ResizeState,
    pub(super) stats: SchedulerStats,
}

impl<R: Renderer> ChartEngine<R> {
    #[must_use]
    pub fn phase(&self) -> EnginePhase {
        self.phase
    }

    #[must_use]
    pub fn config(&self) -> &ChartEngineConfig {
        &self.config
    }

    #[must_use]
    pub fn now(&self) -> f64 {
        self.clock.now()
    }

    #[must_use]
    pub fn event_bus(&self) -> &EventBus {
        &self.bus
    }

    /// Read access to the store; mutation goes through `dispatch`.
    #[must_use]
    pub fn store(&self) -> &Store {
        &self.store
    }

    #[must_use]
    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    #[must_use]
    pub fn into_renderer(self) -> R {
        self.renderer
    }

    #[must_use]
    pub fn stats(&self) -> SchedulerStats {
        self.stats
    }

    #[must_use]
    pub fn animator(&self) -> &Animator {
        &self.scheduler.animator
    }

    #[must_use]
    pub fn animation_flags(&self) -> AnimationControlFlags {
        self.scheduler.flags
    }

    #[must_use]
    pub fn is_observing_container(&self) -> bool {
        self.resize.observing.is_some()
    }

    #[must_use]
    pub fn resize_source(&self) -> Option<ResizeSource> {
        self.resize.observing
    }

    /// Last container size reported by the host.
    #[must_use]
    pub fn container_size(&self) -> Size {
        self.resize.container
    }

    #[must_use]
    pub fn pending_redraw(&self) -> bool {
        self.scheduler.redraw.borrow().is_pending()
    }

    #[must_use]
    pub fn pending_loop(&self) -> bool {
        self.scheduler.looping.borrow().is_pending()
    }

    #[must_use]
    pub fn pending_resize(&self) -> bool {
        self.resize.coalescer.is_pending()
    }

    #[must_use]
    pub fn component_names(&self) -> Vec<String> {
        self.components.names()
    }

    pub fn chart_size(&self) -> ChartResult<Size> {
        self.ensure_ready()?;
        self.store.read(CHART)
    }

    pub(super) fn ensure_ready(&self) -> ChartResult<()> {
        match self.phase {
            EnginePhase::Ready => Ok(()),
            EnginePhase::Constructed => Err(ChartError::NotInitialized),
            EnginePhase::Destroyed => Err(ChartError::Destroyed),
        }
    }

    pub(super) fn ensure_alive(&self) -> ChartResult<()> {
        match self.phase {
            EnginePhase::Destroyed => Err(ChartError::Destroyed),
            EnginePhase::Constructed | EnginePhase::Ready => Ok(()),
        }
    }
}
