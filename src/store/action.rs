use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::Size;
use crate::error::ChartError;

/// Which chart dimensions follow the container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct UsingContainerSize {
    pub width: bool,
    pub height: bool,
}

impl UsingContainerSize {
    #[must_use]
    pub fn any(self) -> bool {
        self.width || self.height
    }
}

/// Options patch plus the container size observed when it was issued.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionsUpdate {
    pub options: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container: Option<Size>,
}

/// Full replacement of series data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SeriesData {
    pub series: IndexMap<String, Vec<Value>>,
    #[serde(default)]
    pub categories: Vec<Value>,
}

/// One new datum per series (in series order) and an optional category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddData {
    pub data: Vec<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Value>,
}

/// Every mutation the store understands, each with its typed payload.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Seeds the chart size from the container on first layout.
    InitChartSize(Size),
    SetChartSize(Size),
    SetUsingContainerSize(UsingContainerSize),
    InitOptions(Value),
    UpdateOptions(OptionsUpdate),
    SetData(SeriesData),
    AddData(AddData),
    SetLegendCheckedState { label: String, checked: bool },
    SetAllLegendActiveState(bool),
    /// Action contributed by a chart-type module.
    Custom { name: String, payload: Value },
}

/// Payload-free discriminant used as dispatch-table key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ActionTag {
    InitChartSize,
    SetChartSize,
    SetUsingContainerSize,
    InitOptions,
    UpdateOptions,
    SetData,
    AddData,
    SetLegendCheckedState,
    SetAllLegendActiveState,
    Custom(String),
}

impl Action {
    #[must_use]
    pub fn custom(name: impl Into<String>, payload: Value) -> Self {
        Self::Custom {
            name: name.into(),
            payload,
        }
    }

    #[must_use]
    pub fn tag(&self) -> ActionTag {
        match self {
            Self::InitChartSize(_) => ActionTag::InitChartSize,
            Self::SetChartSize(_) => ActionTag::SetChartSize,
            Self::SetUsingContainerSize(_) => ActionTag::SetUsingContainerSize,
            Self::InitOptions(_) => ActionTag::InitOptions,
            Self::UpdateOptions(_) => ActionTag::UpdateOptions,
            Self::SetData(_) => ActionTag::SetData,
            Self::AddData(_) => ActionTag::AddData,
            Self::SetLegendCheckedState { .. } => ActionTag::SetLegendCheckedState,
            Self::SetAllLegendActiveState(_) => ActionTag::SetAllLegendActiveState,
            Self::Custom { name, .. } => ActionTag::Custom(name.clone()),
        }
    }

    /// Error for a handler that received a payload of another action kind.
    #[must_use]
    pub fn unexpected(&self, expected: ActionTag) -> ChartError {
        ChartError::InvalidData(format!(
            "handler for `{expected}` received `{}` payload",
            self.tag()
        ))
    }
}

impl ActionTag {
    #[must_use]
    pub fn custom(name: impl Into<String>) -> Self {
        Self::Custom(name.into())
    }

    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::InitChartSize => "initChartSize",
            Self::SetChartSize => "setChartSize",
            Self::SetUsingContainerSize => "setUsingContainerSize",
            Self::InitOptions => "initOptions",
            Self::UpdateOptions => "updateOptions",
            Self::SetData => "setData",
            Self::AddData => "addData",
            Self::SetLegendCheckedState => "setLegendCheckedState",
            Self::SetAllLegendActiveState => "setAllLegendActiveState",
            Self::Custom(name) => name,
        }
    }
}

impl fmt::Display for ActionTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{Action, ActionTag};
    use crate::core::Size;

    #[test]
    fn tags_follow_payload_variant() {
        assert_eq!(
            Action::SetChartSize(Size::new(1.0, 2.0)).tag(),
            ActionTag::SetChartSize
        );
        assert_eq!(
            Action::custom("zoom", json!({ "start": 1 })).tag(),
            ActionTag::custom("zoom")
        );
        assert_eq!(ActionTag::SetAllLegendActiveState.to_string(), "setAllLegendActiveState");
    }
}
