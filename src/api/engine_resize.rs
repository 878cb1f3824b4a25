use serde_json::Value;
use tracing::debug;

use crate::core::{Size, events};
use crate::error::ChartResult;
use crate::render::Renderer;
use crate::store::modules::options::patched_chart_size;
use crate::store::modules::root::{USING_CONTAINER_SIZE, read_sizes};
use crate::store::{Action, UsingContainerSize};

use super::engine::ResizeSource;
use super::ChartEngine;

/// Which options action a resize-listener decision is made for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum OptionsChange {
    /// Patch merged into the current options.
    Update,
    /// Options replaced as a whole.
    Replace,
}

fn is_auto(value: Option<&Value>) -> bool {
    value.and_then(Value::as_str) == Some("auto")
}

fn is_number(value: Option<&Value>) -> bool {
    value.is_some_and(Value::is_number)
}

impl<R: Renderer> ChartEngine<R> {
    /// Host resize-observer notification for the chart container.
    ///
    /// Returns `false` when the engine is not observing through a resize
    /// observer; the size is still remembered for later explicit resizes.
    pub fn observe_container_resize(&mut self, width: f64, height: f64) -> ChartResult<bool> {
        self.ensure_ready()?;
        let container = Size::new(width, height).validate()?;
        self.resize.container = container;
        if self.resize.observing != Some(ResizeSource::Observer) {
            return Ok(false);
        }
        self.resize.coalescer.trigger(self.clock.now(), container);
        Ok(true)
    }

    /// Window-level resize fallback; the host passes the container's current size.
    pub fn notify_window_resize(&mut self, width: f64, height: f64) -> ChartResult<bool> {
        self.ensure_ready()?;
        let container = Size::new(width, height).validate()?;
        self.resize.container = container;
        if self.resize.observing != Some(ResizeSource::WindowFallback) {
            return Ok(false);
        }
        self.resize.coalescer.trigger(self.clock.now(), container);
        Ok(true)
    }

    pub(super) fn start_observing_container(&mut self) {
        if self.resize.observing.is_some() {
            return;
        }
        let source = if self.config.has_resize_observer {
            ResizeSource::Observer
        } else {
            ResizeSource::WindowFallback
        };
        debug!(?source, "container observation started");
        self.resize.observing = Some(source);
    }

    pub(super) fn stop_observing_container(&mut self) {
        if let Some(source) = self.resize.observing.take() {
            debug!(?source, "container observation stopped");
        }
    }

    /// Feeds the resize coalescer with the last known container size.
    pub(super) fn schedule_resize(&mut self) {
        let container = self.resize.container;
        self.resize.coalescer.trigger(self.clock.now(), container);
    }

    /// Target of the resize coalescer.
    ///
    /// Absorbed (and `resizing` reset) when the container has no area while
    /// the chart tracks it, or when the effective chart size does not change.
    /// Returns whether the chart size was changed.
    pub(super) fn resize_chart_size(&mut self, container: Size) -> ChartResult<bool> {
        self.stats.resize_calls += 1;
        self.scheduler.flags.resizing = true;

        let (chart, using) = read_sizes(&self.store.snapshot())?;
        let target = self.current_options()?.effective_size(container, chart);
        if (using.any() && !container.has_area_hint()) || target.same_as(chart) {
            self.scheduler.flags.resizing = false;
            debug!(
                container_width = container.width,
                container_height = container.height,
                "resize absorbed"
            );
            return Ok(false);
        }

        self.bus.signal(events::RESET_HOVERED_SERIES);
        self.dispatch_and_settle(Action::SetChartSize(target))?;
        self.stats.effective_resizes += 1;
        debug!(width = target.width, height = target.height, "chart resized");
        Ok(true)
    }

    /// Starts or stops container observation for an options change and
    /// returns the container-tracking flags it implies.
    pub(super) fn resize_listener_policy(
        &mut self,
        change: OptionsChange,
        options: &Value,
    ) -> ChartResult<UsingContainerSize> {
        let using: UsingContainerSize = self.store.read(USING_CONTAINER_SIZE)?;
        let (width, height) = patched_chart_size(options);

        if using.any() && is_number(width) && is_number(height) {
            self.stop_observing_container();
        } else if !using.any() && (is_auto(width) || is_auto(height)) {
            self.start_observing_container();
        }

        Ok(match change {
            OptionsChange::Update => UsingContainerSize {
                width: width.map_or(using.width, |width| is_auto(Some(width))),
                height: height.map_or(using.height, |height| is_auto(Some(height))),
            },
            OptionsChange::Replace => UsingContainerSize {
                width: is_auto(width),
                height: is_auto(height),
            },
        })
    }
}
