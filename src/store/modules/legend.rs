use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::error::ChartError;
use crate::store::action::{Action, ActionTag};
use crate::store::module::StoreModule;
use crate::store::state::DepKey;

use super::series_data::SERIES;

pub const LEGEND: &str = "legend";
pub const VISIBLE_SERIES: &str = "legend.visibleSeries";
pub const VISIBLE_SERIES_COUNT: &str = "legend.visibleSeriesCount";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegendEntry {
    pub label: String,
    pub checked: bool,
    pub active: bool,
}

impl LegendEntry {
    #[must_use]
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            checked: true,
            active: true,
        }
    }
}

pub fn legend_module() -> StoreModule {
    StoreModule::new("legend")
        .with_state(|init| {
            let entries: Vec<LegendEntry> = init.series.keys().map(LegendEntry::new).collect();
            let mut state = Map::new();
            state.insert(LEGEND.to_owned(), serde_json::to_value(entries)?);
            Ok(state)
        })
        .with_computed(
            VISIBLE_SERIES,
            vec![DepKey::state(SERIES), DepKey::state(LEGEND)],
            |ctx| {
                let series: IndexMap<String, Vec<Value>> = ctx.read_state(SERIES)?;
                let legend: Vec<LegendEntry> = ctx.read_state(LEGEND)?;
                let visible: Vec<&str> = legend
                    .iter()
                    .filter(|entry| entry.checked && series.contains_key(&entry.label))
                    .map(|entry| entry.label.as_str())
                    .collect();
                Ok(json!(visible))
            },
        )
        .with_computed(
            VISIBLE_SERIES_COUNT,
            vec![DepKey::computed(VISIBLE_SERIES)],
            |ctx| {
                let visible: Vec<String> = ctx.read_computed(VISIBLE_SERIES)?;
                Ok(json!(visible.len()))
            },
        )
        .with_action(ActionTag::SetLegendCheckedState, |state, action| {
            let Action::SetLegendCheckedState { label, checked } = action else {
                return Err(action.unexpected(ActionTag::SetLegendCheckedState));
            };
            state.update(LEGEND, |legend: &mut Vec<LegendEntry>| {
                let entry = legend
                    .iter_mut()
                    .find(|entry| &entry.label == label)
                    .ok_or_else(|| {
                        ChartError::InvalidData(format!("legend has no series labelled `{label}`"))
                    })?;
                entry.checked = *checked;
                Ok(())
            })
        })
        .with_action(ActionTag::SetAllLegendActiveState, |state, action| {
            let Action::SetAllLegendActiveState(active) = action else {
                return Err(action.unexpected(ActionTag::SetAllLegendActiveState));
            };
            state.update(LEGEND, |legend: &mut Vec<LegendEntry>| {
                for entry in legend.iter_mut() {
                    entry.active = *active;
                }
                Ok(())
            })
        })
}
