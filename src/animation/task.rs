use std::fmt;

use crate::error::ChartResult;

/// Logical owner of an animation task. One task per requester is in flight.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequesterId(String);

impl RequesterId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Requester used by the chart's own redraw loop.
    #[must_use]
    pub fn chart() -> Self {
        Self("chart".to_owned())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RequesterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RequesterId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Value handed to a step callback and to render-bound updates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TaskStep {
    /// Normalized progress of a transition, clamped to `[0, 1]`.
    Progress(f64),
    /// Raw time elapsed since the previous frame, for continuous tasks.
    Delta(f64),
}

impl TaskStep {
    /// Progress for transitions; continuous tasks never report completion.
    #[must_use]
    pub fn progress(self) -> Option<f64> {
        match self {
            Self::Progress(progress) => Some(progress),
            Self::Delta(_) => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StepControl {
    #[default]
    Continue,
    /// Ends the task after this step; its completion callback still runs.
    Stop,
}

pub type StepFn = Box<dyn FnMut(TaskStep) -> ChartResult<StepControl>>;
pub type CompletionFn = Box<dyn FnOnce()>;

/// One steppable unit of animation work.
pub struct AnimationTask {
    requester: RequesterId,
    duration: Option<f64>,
    elapsed: f64,
    progress: f64,
    render_bound: bool,
    on_step: Option<StepFn>,
    on_completed: Option<CompletionFn>,
}

impl AnimationTask {
    /// Task that runs for `duration` time units. Non-finite or negative
    /// durations behave like zero and complete on the next frame.
    #[must_use]
    pub fn transition(requester: impl Into<RequesterId>, duration: f64) -> Self {
        let duration = if duration.is_finite() && duration > 0.0 {
            duration
        } else {
            0.0
        };
        Self::build(requester.into(), Some(duration))
    }

    /// Task without a duration, stepped every frame until its step callback
    /// returns [`StepControl::Stop`] or it is cancelled.
    #[must_use]
    pub fn continuous(requester: impl Into<RequesterId>) -> Self {
        Self::build(requester.into(), None)
    }

    fn build(requester: RequesterId, duration: Option<f64>) -> Self {
        Self {
            requester,
            duration,
            elapsed: 0.0,
            progress: 0.0,
            render_bound: false,
            on_step: None,
            on_completed: None,
        }
    }

    #[must_use]
    pub fn on_step<F>(mut self, step: F) -> Self
    where
        F: FnMut(TaskStep) -> ChartResult<StepControl> + 'static,
    {
        self.on_step = Some(Box::new(step));
        self
    }

    #[must_use]
    pub fn on_completed<F>(mut self, completed: F) -> Self
    where
        F: FnOnce() + 'static,
    {
        self.on_completed = Some(Box::new(completed));
        self
    }

    /// Each step of this task drives an update and paint of the chart.
    #[must_use]
    pub fn render_bound(mut self) -> Self {
        self.render_bound = true;
        self
    }

    #[must_use]
    pub fn requester(&self) -> &RequesterId {
        &self.requester
    }

    /// `None` for continuous tasks.
    #[must_use]
    pub fn duration(&self) -> Option<f64> {
        self.duration
    }

    #[must_use]
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    #[must_use]
    pub fn progress(&self) -> f64 {
        self.progress
    }

    #[must_use]
    pub fn is_continuous(&self) -> bool {
        self.duration.is_none()
    }

    #[must_use]
    pub fn is_render_bound(&self) -> bool {
        self.render_bound
    }

    pub(crate) fn advance(&mut self, delta: f64) -> TaskStep {
        self.elapsed += delta;
        match self.duration {
            Some(duration) if duration > 0.0 => {
                self.progress = (self.elapsed / duration).clamp(0.0, 1.0);
                TaskStep::Progress(self.progress)
            }
            Some(_) => {
                self.progress = 1.0;
                TaskStep::Progress(1.0)
            }
            None => TaskStep::Delta(delta),
        }
    }

    pub(crate) fn run_step(&mut self, step: TaskStep) -> ChartResult<StepControl> {
        match self.on_step.as_mut() {
            Some(on_step) => on_step(step),
            None => Ok(StepControl::Continue),
        }
    }

    #[must_use]
    pub(crate) fn reached_end(&self) -> bool {
        self.duration.is_some() && self.progress >= 1.0
    }

    pub(crate) fn complete(mut self) {
        if let Some(on_completed) = self.on_completed.take() {
            on_completed();
        }
    }
}

impl fmt::Debug for AnimationTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnimationTask")
            .field("requester", &self.requester)
            .field("duration", &self.duration)
            .field("elapsed", &self.elapsed)
            .field("progress", &self.progress)
            .field("render_bound", &self.render_bound)
            .finish_non_exhaustive()
    }
}
