use std::cell::RefCell;
use std::rc::Rc;

use approx::assert_relative_eq;
use chart_runtime::animation::{
    AnimationTask, Animator, FrameTarget, RequesterId, StepControl, TaskStep,
};
use chart_runtime::error::{ChartError, ChartResult};
use proptest::prelude::*;

#[derive(Default)]
struct Canvas {
    updates: Vec<TaskStep>,
    paints: usize,
    fail_paint: bool,
}

impl FrameTarget for Canvas {
    fn update(&mut self, step: TaskStep) -> ChartResult<()> {
        self.updates.push(step);
        Ok(())
    }

    fn paint(&mut self) -> ChartResult<()> {
        if self.fail_paint {
            return Err(ChartError::InvalidData("paint rejected".to_owned()));
        }
        self.paints += 1;
        Ok(())
    }
}

fn counter() -> (Rc<RefCell<usize>>, impl FnOnce() + 'static) {
    let count = Rc::new(RefCell::new(0usize));
    let sink = Rc::clone(&count);
    (count, move || *sink.borrow_mut() += 1)
}

#[test]
fn transition_progress_follows_elapsed_time() {
    let mut animator = Animator::new();
    let mut canvas = Canvas::default();
    let (completed, on_completed) = counter();
    animator.add(
        AnimationTask::transition("series", 100.0).on_completed(on_completed),
        0.0,
    );
    assert_eq!(animator.next_frame_at(16.0), Some(16.0));

    animator.tick(16.0, &mut canvas);
    let progress = animator
        .progress_of(&RequesterId::new("series"))
        .expect("in flight");
    assert_relative_eq!(progress, 0.16, epsilon = 1e-12);

    animator.tick(50.0, &mut canvas);
    let progress = animator
        .progress_of(&RequesterId::new("series"))
        .expect("in flight");
    assert_relative_eq!(progress, 0.5, epsilon = 1e-12);

    let report = animator.tick(120.0, &mut canvas);
    assert_eq!(report.completed.as_slice(), &[RequesterId::new("series")]);
    assert_eq!(*completed.borrow(), 1);
    assert!(animator.is_idle());
    assert_eq!(animator.next_frame_at(16.0), None);

    animator.tick(200.0, &mut canvas);
    assert_eq!(*completed.borrow(), 1);
}

#[test]
fn only_render_bound_tasks_touch_the_frame_target() {
    let mut animator = Animator::new();
    let mut canvas = Canvas::default();
    animator.add(AnimationTask::transition("tooltip", 32.0), 0.0);
    animator.add(AnimationTask::transition("chart", 32.0).render_bound(), 0.0);

    animator.tick(16.0, &mut canvas);
    animator.tick(32.0, &mut canvas);

    assert_eq!(canvas.paints, 2);
    assert_eq!(
        canvas.updates,
        vec![TaskStep::Progress(0.5), TaskStep::Progress(1.0)]
    );
    assert!(!animator.first_rendering());
}

#[test]
fn first_rendering_survives_non_render_tasks() {
    let mut animator = Animator::new();
    let mut canvas = Canvas::default();
    animator.add(AnimationTask::transition("legend", 0.0), 0.0);
    animator.tick(16.0, &mut canvas);
    assert!(animator.is_idle());
    assert!(animator.first_rendering());
}

#[derive(Default)]
struct RevealCanvas {
    reveal: Vec<TaskStep>,
    updates: Vec<TaskStep>,
}

impl FrameTarget for RevealCanvas {
    fn update(&mut self, step: TaskStep) -> ChartResult<()> {
        self.updates.push(step);
        Ok(())
    }

    fn init_update(&mut self, step: TaskStep) -> ChartResult<()> {
        self.reveal.push(step);
        Ok(())
    }

    fn paint(&mut self) -> ChartResult<()> {
        Ok(())
    }
}

#[test]
fn first_render_bound_task_steps_through_init_update() {
    let mut animator = Animator::new();
    let mut canvas = RevealCanvas::default();
    animator.add(AnimationTask::transition("chart", 32.0).render_bound(), 0.0);
    animator.tick(16.0, &mut canvas);
    animator.tick(32.0, &mut canvas);
    assert_eq!(canvas.reveal, vec![TaskStep::Progress(0.5), TaskStep::Progress(1.0)]);
    assert!(canvas.updates.is_empty());

    animator.add(AnimationTask::transition("chart", 16.0).render_bound(), 40.0);
    animator.tick(56.0, &mut canvas);
    assert_eq!(canvas.reveal.len(), 2);
    assert_eq!(canvas.updates, vec![TaskStep::Progress(1.0)]);
}

#[test]
fn continuous_task_receives_deltas_until_it_stops() {
    let mut animator = Animator::new();
    let mut canvas = Canvas::default();
    let deltas = Rc::new(RefCell::new(Vec::<f64>::new()));
    let sink = Rc::clone(&deltas);
    let (completed, on_completed) = counter();
    let task = AnimationTask::continuous("zoom")
        .on_step(move |step| {
            if let TaskStep::Delta(delta) = step {
                sink.borrow_mut().push(delta);
            }
            let control = if sink.borrow().len() == 3 {
                StepControl::Stop
            } else {
                StepControl::Continue
            };
            Ok(control)
        })
        .on_completed(on_completed);
    animator.add(task, 100.0);

    for now in [116.0, 140.0, 150.0, 170.0] {
        animator.tick(now, &mut canvas);
    }

    assert_eq!(*deltas.borrow(), vec![16.0, 24.0, 10.0]);
    assert_eq!(*completed.borrow(), 1);
    assert!(animator.is_idle());
}

#[test]
fn cancelled_task_never_completes() {
    let mut animator = Animator::new();
    let mut canvas = Canvas::default();
    let (completed, on_completed) = counter();
    animator.add(
        AnimationTask::transition("series", 50.0).on_completed(on_completed),
        0.0,
    );
    animator.tick(16.0, &mut canvas);
    assert!(animator.cancel(&RequesterId::new("series")));
    animator.tick(100.0, &mut canvas);
    assert_eq!(*completed.borrow(), 0);
}

#[test]
fn paint_failure_removes_the_task_without_completion() {
    let mut animator = Animator::new();
    let mut canvas = Canvas {
        fail_paint: true,
        ..Canvas::default()
    };
    let (completed, on_completed) = counter();
    animator.add(
        AnimationTask::transition(RequesterId::chart(), 16.0)
            .render_bound()
            .on_completed(on_completed),
        0.0,
    );
    animator.add(AnimationTask::transition("tooltip", 16.0), 0.0);

    let report = animator.tick(16.0, &mut canvas);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].requester, RequesterId::chart());
    assert_eq!(report.completed.as_slice(), &[RequesterId::new("tooltip")]);
    assert_eq!(*completed.borrow(), 0);
    assert!(animator.first_rendering());
}

proptest! {
    #[test]
    fn progress_is_monotonic_and_completion_happens_once(
        duration in 1.0f64..500.0,
        gaps in prop::collection::vec(1.0f64..40.0, 1..60)
    ) {
        let mut animator = Animator::new();
        let mut canvas = Canvas::default();
        let (completed, on_completed) = counter();
        animator.add(
            AnimationTask::transition("series", duration).render_bound().on_completed(on_completed),
            0.0,
        );

        let mut now = 0.0;
        for gap in &gaps {
            now += gap;
            animator.tick(now, &mut canvas);
        }

        let progress: Vec<f64> = canvas
            .updates
            .iter()
            .filter_map(|step| step.progress())
            .collect();
        prop_assert!(progress.windows(2).all(|pair| pair[0] <= pair[1]));
        prop_assert!(progress.iter().all(|value| (0.0..=1.0).contains(value)));

        let finished = progress.last().copied() == Some(1.0);
        if now > duration + 1e-6 {
            prop_assert!(finished);
        }
        if now < duration - 1e-6 {
            prop_assert!(!finished);
        }
        prop_assert_eq!(*completed.borrow(), usize::from(finished));
        prop_assert_eq!(animator.is_idle(), finished);
    }
}
