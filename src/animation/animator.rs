use smallvec::SmallVec;
use tracing::{debug, trace, warn};

use crate::error::{ChartError, ChartResult};

use super::task::{AnimationTask, RequesterId, StepControl, TaskStep};

/// Receiver of render-bound task steps.
///
/// Each step of a render-bound task is followed by exactly one `paint`.
pub trait FrameTarget {
    fn update(&mut self, step: TaskStep) -> ChartResult<()>;

    /// Step of the reveal animation played while the chart renders for the
    /// first time.
    fn init_update(&mut self, step: TaskStep) -> ChartResult<()> {
        self.update(step)
    }

    fn paint(&mut self) -> ChartResult<()>;
}

#[derive(Debug)]
pub struct TaskFailure {
    pub requester: RequesterId,
    pub error: ChartError,
}

/// What one frame did.
#[derive(Debug, Default)]
pub struct FrameReport {
    pub now: f64,
    pub delta: f64,
    pub stepped: usize,
    pub painted: usize,
    pub completed: SmallVec<[RequesterId; 4]>,
    pub failed: SmallVec<[TaskFailure; 2]>,
}

impl FrameReport {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stepped == 0
    }
}

/// Owner of the in-flight animation tasks.
///
/// The frame clock only runs while at least one task is active; an idle
/// animator has no next frame.
#[derive(Debug)]
pub struct Animator {
    tasks: Vec<AnimationTask>,
    last_frame: Option<f64>,
    first_rendering: bool,
    frames: u64,
}

impl Default for Animator {
    fn default() -> Self {
        Self::new()
    }
}

impl Animator {
    #[must_use]
    pub fn new() -> Self {
        Self {
            tasks: Vec::new(),
            last_frame: None,
            first_rendering: true,
            frames: 0,
        }
    }

    /// Adds `task`, dropping any in-flight task of the same requester without
    /// running its completion.
    pub fn add(&mut self, task: AnimationTask, now: f64) {
        if self.cancel(task.requester()) {
            debug!(requester = %task.requester(), "animation task replaced");
        }
        if self.tasks.is_empty() {
            self.last_frame = Some(now);
        }
        trace!(requester = %task.requester(), duration = ?task.duration(), "animation task added");
        self.tasks.push(task);
    }

    /// Removes the task of `requester`; its completion never runs.
    pub fn cancel(&mut self, requester: &RequesterId) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|task| task.requester() != requester);
        if self.tasks.is_empty() {
            self.last_frame = None;
        }
        self.tasks.len() != before
    }

    pub fn clear(&mut self) {
        self.tasks.clear();
        self.last_frame = None;
    }

    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.tasks.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    #[must_use]
    pub fn contains(&self, requester: &RequesterId) -> bool {
        self.tasks.iter().any(|task| task.requester() == requester)
    }

    /// Progress of the in-flight task of `requester`.
    #[must_use]
    pub fn progress_of(&self, requester: &RequesterId) -> Option<f64> {
        self.tasks
            .iter()
            .find(|task| task.requester() == requester)
            .map(AnimationTask::progress)
    }

    pub fn requesters(&self) -> impl Iterator<Item = &RequesterId> {
        self.tasks.iter().map(AnimationTask::requester)
    }

    /// `true` until the first render-bound task has completed.
    #[must_use]
    pub fn first_rendering(&self) -> bool {
        self.first_rendering
    }

    #[must_use]
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Instant the next frame is due, or `None` while idle.
    #[must_use]
    pub fn next_frame_at(&self, interval: f64) -> Option<f64> {
        if self.tasks.is_empty() {
            return None;
        }
        self.last_frame.map(|last| last + interval)
    }

    /// Advances every active task once, in insertion order.
    ///
    /// A task whose step (or paint) fails is dropped without completion; the
    /// remaining tasks are still stepped.
    pub fn tick(&mut self, now: f64, target: &mut dyn FrameTarget) -> FrameReport {
        let mut report = FrameReport {
            now,
            ..FrameReport::default()
        };
        if self.tasks.is_empty() {
            self.last_frame = None;
            return report;
        }

        let delta = (now - self.last_frame.unwrap_or(now)).max(0.0);
        self.last_frame = Some(now);
        self.frames += 1;
        report.delta = delta;

        let tasks = std::mem::take(&mut self.tasks);
        let mut survivors = Vec::with_capacity(tasks.len());
        for mut task in tasks {
            report.stepped += 1;
            let step = task.advance(delta);
            let control = match Self::step_task(
                &mut task,
                step,
                self.first_rendering,
                target,
                &mut report,
            ) {
                Ok(control) => control,
                Err(error) => {
                    warn!(requester = %task.requester(), error = %error, "animation task failed; removed");
                    report.failed.push(TaskFailure {
                        requester: task.requester().clone(),
                        error,
                    });
                    continue;
                }
            };

            if control == StepControl::Stop || task.reached_end() {
                if task.is_render_bound() {
                    self.first_rendering = false;
                }
                report.completed.push(task.requester().clone());
                task.complete();
            } else {
                survivors.push(task);
            }
        }
        self.tasks = survivors;
        if self.tasks.is_empty() {
            self.last_frame = None;
        }
        debug!(
            now,
            delta,
            stepped = report.stepped,
            completed = report.completed.len(),
            failed = report.failed.len(),
            "animation frame"
        );
        report
    }

    fn step_task(
        task: &mut AnimationTask,
        step: TaskStep,
        first_rendering: bool,
        target: &mut dyn FrameTarget,
        report: &mut FrameReport,
    ) -> ChartResult<StepControl> {
        let control = task.run_step(step)?;
        if task.is_render_bound() {
            if first_rendering {
                target.init_update(step)?;
            } else {
                target.update(step)?;
            }
            target.paint()?;
            report.painted += 1;
        }
        Ok(control)
    }
}
