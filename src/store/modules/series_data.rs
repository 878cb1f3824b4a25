use indexmap::IndexMap;
use serde_json::{Map, Value, json};

use crate::error::ChartError;
use crate::store::action::{Action, ActionTag};
use crate::store::module::StoreModule;
use crate::store::state::DepKey;

use super::legend::{LEGEND, LegendEntry};

pub const SERIES: &str = "series";
pub const CATEGORIES: &str = "categories";
pub const SERIES_COUNT: &str = "seriesData.seriesCount";

type SeriesMap = IndexMap<String, Vec<Value>>;

pub fn series_data_module() -> StoreModule {
    StoreModule::new("seriesData")
        .with_state(|init| {
            let mut state = Map::new();
            state.insert(SERIES.to_owned(), serde_json::to_value(&init.series)?);
            state.insert(CATEGORIES.to_owned(), Value::Array(init.categories.clone()));
            Ok(state)
        })
        .with_computed(SERIES_COUNT, vec![DepKey::state(SERIES)], |ctx| {
            let series: SeriesMap = ctx.read_state(SERIES)?;
            Ok(json!(series.len()))
        })
        .with_action(ActionTag::SetData, |state, action| {
            let Action::SetData(data) = action else {
                return Err(action.unexpected(ActionTag::SetData));
            };
            state.write(SERIES, &data.series)?;
            state.replace(CATEGORIES, Value::Array(data.categories.clone()))?;
            if state.contains(LEGEND) {
                let previous: Vec<LegendEntry> = state.read(LEGEND)?;
                let legend: Vec<LegendEntry> = data
                    .series
                    .keys()
                    .map(|label| {
                        previous
                            .iter()
                            .find(|entry| &entry.label == label)
                            .cloned()
                            .unwrap_or_else(|| LegendEntry::new(label.clone()))
                    })
                    .collect();
                state.write(LEGEND, &legend)?;
            }
            Ok(())
        })
        .with_action(ActionTag::AddData, |state, action| {
            let Action::AddData(added) = action else {
                return Err(action.unexpected(ActionTag::AddData));
            };
            state.update(SERIES, |series: &mut SeriesMap| {
                if series.len() != added.data.len() {
                    return Err(ChartError::InvalidData(format!(
                        "addData expects {} values (one per series), got {}",
                        series.len(),
                        added.data.len()
                    )));
                }
                for (values, datum) in series.values_mut().zip(&added.data) {
                    values.push(datum.clone());
                }
                Ok(())
            })?;
            if let Some(category) = &added.category {
                state.update(CATEGORIES, |categories: &mut Vec<Value>| {
                    categories.push(category.clone());
                    Ok(())
                })?;
            }
            Ok(())
        })
}
