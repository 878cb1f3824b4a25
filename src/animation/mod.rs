//! Frame-driven animation tasks.

mod animator;
pub mod duration_policy;
mod task;

pub use animator::{Animator, FrameReport, FrameTarget, TaskFailure};
pub use duration_policy::{
    AnimationControlFlags, AnimationOption, DEFAULT_ANIMATION_DURATION, DurationPolicy,
};
pub use task::{AnimationTask, CompletionFn, RequesterId, StepControl, StepFn, TaskStep};
