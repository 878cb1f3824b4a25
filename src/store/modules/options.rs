use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::animation::AnimationOption;
use crate::core::{Size, SizeOption};
use crate::error::ChartResult;
use crate::store::action::{Action, ActionTag};
use crate::store::module::StoreModule;

use super::root::CONTAINER;

pub const OPTIONS: &str = "options";
pub const ORIGINAL_OPTIONS: &str = "originalOptions";

/// `chart` section of the options object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ChartSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<SizeOption>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<SizeOption>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animation: Option<AnimationOption>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ResponsiveOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animation: Option<AnimationOption>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SeriesOptions {
    #[serde(default)]
    pub selectable: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Options surface consumed by the runtime; unknown sections are carried
/// through untouched for external collaborators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ChartOptions {
    #[serde(default)]
    pub chart: ChartSection,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub responsive: Option<ResponsiveOptions>,
    #[serde(default)]
    pub series: SeriesOptions,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ChartOptions {
    pub fn from_value(value: &Value) -> ChartResult<Self> {
        if value.is_null() {
            return Ok(Self::default());
        }
        Ok(Self::deserialize(value)?)
    }

    pub fn to_value(&self) -> ChartResult<Value> {
        Ok(serde_json::to_value(self)?)
    }

    #[must_use]
    pub fn with_size(mut self, width: SizeOption, height: SizeOption) -> Self {
        self.chart.width = Some(width);
        self.chart.height = Some(height);
        self
    }

    #[must_use]
    pub fn with_animation(mut self, animation: AnimationOption) -> Self {
        self.chart.animation = Some(animation);
        self
    }

    #[must_use]
    pub fn with_responsive_animation(mut self, animation: AnimationOption) -> Self {
        self.responsive = Some(ResponsiveOptions {
            animation: Some(animation),
            extra: Map::new(),
        });
        self
    }

    #[must_use]
    pub fn with_selectable_series(mut self, selectable: bool) -> Self {
        self.series.selectable = selectable;
        self
    }

    #[must_use]
    pub fn is_auto_width(&self) -> bool {
        matches!(self.chart.width, Some(SizeOption::Auto))
    }

    #[must_use]
    pub fn is_auto_height(&self) -> bool {
        matches!(self.chart.height, Some(SizeOption::Auto))
    }

    #[must_use]
    pub fn uses_auto_size(&self) -> bool {
        self.is_auto_width() || self.is_auto_height()
    }

    /// Chart size these options produce inside `container`.
    ///
    /// Unset dimensions fall back to `current`.
    #[must_use]
    pub fn effective_size(&self, container: Size, current: Size) -> Size {
        let width = self
            .chart
            .width
            .map_or(current.width, |option| option.resolve(container.width));
        let height = self
            .chart
            .height
            .map_or(current.height, |option| option.resolve(container.height));
        Size::new(width, height)
    }
}

/// Merges `patch` into `target`: objects merge key by key, anything else replaces.
pub fn deep_merge(target: &mut Value, patch: &Value) {
    match (target, patch) {
        (Value::Object(target), Value::Object(patch)) => {
            for (key, value) in patch {
                match target.get_mut(key) {
                    Some(existing) => deep_merge(existing, value),
                    None => {
                        target.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        (target, patch) => *target = patch.clone(),
    }
}

/// Returns the `(width, height)` entries a patch sets under `chart`.
#[must_use]
pub fn patched_chart_size(patch: &Value) -> (Option<&Value>, Option<&Value>) {
    let chart = patch.get("chart");
    (
        chart.and_then(|chart| chart.get("width")),
        chart.and_then(|chart| chart.get("height")),
    )
}

pub fn options_module() -> StoreModule {
    StoreModule::new("options")
        .with_state(|init| {
            let options = if init.options.is_null() {
                json!({})
            } else {
                init.options.clone()
            };
            ChartOptions::from_value(&options)?;
            let mut state = Map::new();
            state.insert(OPTIONS.to_owned(), options.clone());
            state.insert(ORIGINAL_OPTIONS.to_owned(), options);
            Ok(state)
        })
        .with_action(ActionTag::InitOptions, |state, action| {
            let Action::InitOptions(options) = action else {
                return Err(action.unexpected(ActionTag::InitOptions));
            };
            ChartOptions::from_value(options)?;
            state.replace(OPTIONS, options.clone())?;
            state.replace(ORIGINAL_OPTIONS, options.clone())
        })
        .with_action(ActionTag::UpdateOptions, |state, action| {
            let Action::UpdateOptions(update) = action else {
                return Err(action.unexpected(ActionTag::UpdateOptions));
            };
            let mut merged = state.get(OPTIONS)?.clone();
            deep_merge(&mut merged, &update.options);
            ChartOptions::from_value(&merged)?;
            state.replace(OPTIONS, merged)?;
            if let Some(container) = update.container {
                state.write(CONTAINER, &container.validate()?)?;
            }
            Ok(())
        })
}
