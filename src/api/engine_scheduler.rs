use std::rc::Rc;

use tracing::{debug, trace};

use crate::animation::{AnimationTask, FrameTarget, RequesterId, TaskStep};
use crate::core::{Size, events};
use crate::error::{ChartError, ChartResult};
use crate::render::Renderer;
use crate::store::{Action, DispatchOutcome};

use super::{ChartEngine, EnginePhase};
use super::component_manager::ComponentManager;

/// Rounds of component-queued dispatches settled before giving up.
const MAX_SYNC_ROUNDS: usize = 64;

/// Render-bound steps update every component, then paint the whole chart.
struct PaintTarget<'a, R: Renderer> {
    components: &'a mut ComponentManager,
    renderer: &'a mut R,
    size: Size,
}

impl<R: Renderer> FrameTarget for PaintTarget<'_, R> {
    fn update(&mut self, step: TaskStep) -> ChartResult<()> {
        self.components.update_all(step)
    }

    fn init_update(&mut self, step: TaskStep) -> ChartResult<()> {
        self.components.init_update_all(step)
    }

    fn paint(&mut self) -> ChartResult<()> {
        let frame = self.components.build_frame(self.size)?;
        self.renderer.render(&frame)
    }
}

impl<R: Renderer> ChartEngine<R> {
    /// Runs every deferred action due up to `now`, in chronological order.
    ///
    /// Within one instant the resize coalescer runs first, then the loop
    /// coalescer, the redraw coalescer and finally an animation frame.
    pub fn advance_to(&mut self, now: f64) -> ChartResult<()> {
        self.ensure_ready()?;
        if !now.is_finite() || now < self.clock.now() {
            return Err(ChartError::InvalidData(format!(
                "cannot advance chart clock from {} to {now}",
                self.clock.now()
            )));
        }
        let mut last_processed: Option<f64> = None;
        while let Some(at) = self.next_wakeup() {
            if at > now {
                break;
            }
            // Every pass must move time forward or it would replay forever.
            if last_processed.is_some_and(|last| at <= last) {
                return Err(ChartError::InvalidData(format!(
                    "scheduler stalled at {at}; timing windows are below clock precision"
                )));
            }
            self.clock.advance_to(at.max(self.clock.now()))?;
            last_processed = Some(self.clock.now());
            self.run_due(self.clock.now())?;
            if self.phase != EnginePhase::Ready {
                return Ok(());
            }
        }
        self.clock.advance_to(now)
    }

    pub fn advance_by(&mut self, delta: f64) -> ChartResult<()> {
        self.advance_to(self.clock.now() + delta)
    }

    /// Earliest instant with pending work, or `None` when the engine is idle.
    #[must_use]
    pub fn next_wakeup(&self) -> Option<f64> {
        if self.ensure_ready().is_err() {
            return None;
        }
        [
            self.resize.coalescer.deadline(),
            self.scheduler.looping.borrow().deadline(),
            self.scheduler.redraw.borrow().deadline(),
            self.scheduler
                .animator
                .next_frame_at(self.config.frame_interval),
        ]
        .into_iter()
        .flatten()
        .reduce(f64::min)
    }

    /// Builds one frame from the visible components and hands it to the renderer.
    pub fn draw(&mut self) -> ChartResult<()> {
        self.ensure_ready()?;
        let frame = self.components.build_frame(self.chart_size()?)?;
        self.renderer.render(&frame)?;
        self.stats.draws += 1;
        debug!(
            layers = frame.layers.len(),
            commands = frame.command_count(),
            "chart drawn"
        );
        Ok(())
    }

    fn run_due(&mut self, at: f64) -> ChartResult<()> {
        if let Some(container) = self.resize.coalescer.poll(at) {
            self.resize_chart_size(container)?;
        }
        let loop_due = self.scheduler.looping.borrow_mut().poll(at).is_some();
        if loop_due {
            self.start_loop()?;
        }
        let redraw_due = self.scheduler.redraw.borrow_mut().poll(at).is_some();
        if redraw_due {
            self.draw()?;
        }
        let frame_due = self
            .scheduler
            .animator
            .next_frame_at(self.config.frame_interval)
            .is_some_and(|frame_at| frame_at <= at);
        if frame_due {
            self.run_frame(at)?;
        }
        Ok(())
    }

    /// Chart loop: pick the duration, announce it, and hand a render-bound
    /// task to the animator.
    fn start_loop(&mut self) -> ChartResult<()> {
        let options = self.current_options()?;
        let responsive = options
            .responsive
            .as_ref()
            .and_then(|responsive| responsive.animation);
        let first_rendering = self.scheduler.animator.first_rendering();
        let duration = self.scheduler.policy.loop_duration(
            options.chart.animation,
            responsive,
            first_rendering,
            &mut self.scheduler.flags,
        );

        self.bus.signal(events::LOOP_START);
        let bus = Rc::clone(&self.bus);
        let task = AnimationTask::transition(RequesterId::chart(), duration)
            .render_bound()
            .on_completed(move || {
                bus.signal(events::LOOP_COMPLETE);
            });
        self.scheduler.animator.add(task, self.clock.now());
        self.stats.loops_started += 1;
        debug!(duration, first_rendering, "chart loop started");
        Ok(())
    }

    fn run_frame(&mut self, now: f64) -> ChartResult<()> {
        let size = self.chart_size()?;
        let mut target = PaintTarget {
            components: &mut self.components,
            renderer: &mut self.renderer,
            size,
        };
        let report = self.scheduler.animator.tick(now, &mut target);

        let chart = RequesterId::chart();
        self.stats.frames += 1;
        self.stats.paints += report.painted as u64;
        self.stats.failed_tasks += report.failed.len() as u64;
        self.stats.loops_completed += report
            .completed
            .iter()
            .filter(|requester| **requester == chart)
            .count() as u64;
        trace!(now, stepped = report.stepped, "frame processed");
        // Completion callbacks may have queued work through a component context.
        self.settle_queued()
    }

    /// Dispatches `action` and lets components react to what changed.
    pub(super) fn dispatch_and_settle(&mut self, action: Action) -> ChartResult<DispatchOutcome> {
        let outcome = self.store.dispatch(action)?;
        self.settle(outcome.clone())?;
        Ok(outcome)
    }

    /// Applies dispatches and tasks queued by components outside a dispatch.
    pub(super) fn settle_queued(&mut self) -> ChartResult<()> {
        self.settle(DispatchOutcome::default())
    }

    fn settle(&mut self, mut outcome: DispatchOutcome) -> ChartResult<()> {
        for _ in 0..MAX_SYNC_ROUNDS {
            if outcome.is_effective() {
                let snapshot = self.store.snapshot();
                let request =
                    self.components
                        .render_all(&snapshot, &outcome.changes, &self.context)?;
                self.request_render(request, true);
            }
            self.adopt_scheduled_tasks();
            if self.store.dispatcher().is_empty() {
                return Ok(());
            }
            outcome = self.store.flush_queued()?;
        }
        let dropped = self.store.discard_queued();
        Err(ChartError::InvalidData(format!(
            "component dispatches did not settle after {MAX_SYNC_ROUNDS} rounds; dropped {dropped}"
        )))
    }

    fn adopt_scheduled_tasks(&mut self) {
        let now = self.clock.now();
        for task in self.context.take_tasks() {
            self.scheduler.animator.add(task, now);
        }
    }
}
