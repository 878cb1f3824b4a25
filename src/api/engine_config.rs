use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::animation::DEFAULT_ANIMATION_DURATION;
use crate::core::Size;
use crate::error::{ChartError, ChartResult};
use crate::store::StoreInit;

/// Smallest accepted coalescing window or frame interval, in time units.
pub const MIN_TIMING_WINDOW: f64 = 1e-3;

/// Public engine bootstrap configuration.
///
/// This type is serializable so host applications can persist/load chart setup
/// without inventing their own ad-hoc format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartEngineConfig {
    /// Container size observed when the chart is created.
    pub container: Size,
    #[serde(default = "default_redraw_window")]
    pub redraw_window: f64,
    #[serde(default = "default_loop_window")]
    pub loop_window: f64,
    #[serde(default = "default_resize_window")]
    pub resize_window: f64,
    #[serde(default = "default_frame_interval")]
    pub frame_interval: f64,
    #[serde(default = "default_animation_duration")]
    pub default_animation_duration: f64,
    /// `false` when the host can only report window-level resizes.
    #[serde(default = "default_has_resize_observer")]
    pub has_resize_observer: bool,
    #[serde(default)]
    pub initial: StoreInit,
}

impl Default for ChartEngineConfig {
    fn default() -> Self {
        Self::new(Size::default())
    }
}

impl ChartEngineConfig {
    #[must_use]
    pub fn new(container: Size) -> Self {
        Self {
            container,
            redraw_window: default_redraw_window(),
            loop_window: default_loop_window(),
            resize_window: default_resize_window(),
            frame_interval: default_frame_interval(),
            default_animation_duration: default_animation_duration(),
            has_resize_observer: default_has_resize_observer(),
            initial: StoreInit::default(),
        }
    }

    #[must_use]
    pub fn with_container(mut self, container: Size) -> Self {
        self.container = container;
        self
    }

    /// Sets the initial options object.
    #[must_use]
    pub fn with_options(mut self, options: Value) -> Self {
        self.initial.options = options;
        self
    }

    #[must_use]
    pub fn with_series(mut self, name: impl Into<String>, data: Vec<Value>) -> Self {
        self.initial.series.insert(name.into(), data);
        self
    }

    #[must_use]
    pub fn with_categories(mut self, categories: Vec<Value>) -> Self {
        self.initial.categories = categories;
        self
    }

    #[must_use]
    pub fn with_redraw_window(mut self, window: f64) -> Self {
        self.redraw_window = window;
        self
    }

    #[must_use]
    pub fn with_loop_window(mut self, window: f64) -> Self {
        self.loop_window = window;
        self
    }

    #[must_use]
    pub fn with_resize_window(mut self, window: f64) -> Self {
        self.resize_window = window;
        self
    }

    #[must_use]
    pub fn with_frame_interval(mut self, interval: f64) -> Self {
        self.frame_interval = interval;
        self
    }

    #[must_use]
    pub fn with_default_animation_duration(mut self, duration: f64) -> Self {
        self.default_animation_duration = duration;
        self
    }

    /// Container resizes then arrive through `notify_window_resize` only.
    #[must_use]
    pub fn without_resize_observer(mut self) -> Self {
        self.has_resize_observer = false;
        self
    }

    pub fn validate(&self) -> ChartResult<()> {
        self.container.validate()?;
        for (name, value) in [
            ("redraw_window", self.redraw_window),
            ("loop_window", self.loop_window),
            ("resize_window", self.resize_window),
            ("frame_interval", self.frame_interval),
        ] {
            if !value.is_finite() || value < MIN_TIMING_WINDOW {
                return Err(ChartError::InvalidData(format!(
                    "{name} must be finite and >= {MIN_TIMING_WINDOW}, got {value}"
                )));
            }
        }
        if !self.default_animation_duration.is_finite() || self.default_animation_duration < 0.0 {
            return Err(ChartError::InvalidData(format!(
                "default_animation_duration must be finite and >= 0, got {}",
                self.default_animation_duration
            )));
        }
        Ok(())
    }

    /// Serializes config to pretty JSON for debug/config files.
    pub fn to_json_pretty(&self) -> ChartResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| ChartError::InvalidData(format!("failed to serialize config: {e}")))
    }

    /// Deserializes config from JSON.
    pub fn from_json_str(input: &str) -> ChartResult<Self> {
        serde_json::from_str(input)
            .map_err(|e| ChartError::InvalidData(format!("failed to parse config: {e}")))
    }
}

fn default_redraw_window() -> f64 {
    10.0
}

fn default_loop_window() -> f64 {
    10.0
}

fn default_resize_window() -> f64 {
    100.0
}

fn default_frame_interval() -> f64 {
    16.0
}

fn default_animation_duration() -> f64 {
    DEFAULT_ANIMATION_DURATION
}

fn default_has_resize_observer() -> bool {
    true
}
