use serde_json::Map;

use crate::core::Size;
use crate::error::ChartResult;
use crate::store::action::{Action, ActionTag, UsingContainerSize};
use crate::store::module::StoreModule;
use crate::store::state::StoreSnapshot;

use super::options::ChartOptions;

pub const CHART: &str = "chart";
pub const USING_CONTAINER_SIZE: &str = "usingContainerSize";
pub const CONTAINER: &str = "container";

/// Chart size, container size and which dimensions track the container.
pub fn root_module() -> StoreModule {
    StoreModule::new("root")
        .with_state(|init| {
            let options = ChartOptions::from_value(&init.options)?;
            let chart = Size::new(
                options.chart.width.and_then(|width| width.fixed()).unwrap_or(0.0),
                options.chart.height.and_then(|height| height.fixed()).unwrap_or(0.0),
            );
            let using = UsingContainerSize {
                width: options.is_auto_width(),
                height: options.is_auto_height(),
            };
            let mut state = Map::new();
            state.insert(CHART.to_owned(), serde_json::to_value(chart)?);
            state.insert(USING_CONTAINER_SIZE.to_owned(), serde_json::to_value(using)?);
            state.insert(CONTAINER.to_owned(), serde_json::to_value(Size::default())?);
            Ok(state)
        })
        .with_action(ActionTag::InitChartSize, |state, action| {
            let Action::InitChartSize(container) = action else {
                return Err(action.unexpected(ActionTag::InitChartSize));
            };
            let container = container.validate()?;
            let using: UsingContainerSize = state.read(USING_CONTAINER_SIZE)?;
            state.write(CONTAINER, &container)?;
            state.update(CHART, |chart: &mut Size| {
                if using.width || chart.width == 0.0 {
                    chart.width = container.width;
                }
                if using.height || chart.height == 0.0 {
                    chart.height = container.height;
                }
                Ok(())
            })
        })
        .with_action(ActionTag::SetChartSize, |state, action| {
            let Action::SetChartSize(size) = action else {
                return Err(action.unexpected(ActionTag::SetChartSize));
            };
            state.write(CHART, &size.validate()?)
        })
        .with_action(ActionTag::SetUsingContainerSize, |state, action| {
            let Action::SetUsingContainerSize(using) = action else {
                return Err(action.unexpected(ActionTag::SetUsingContainerSize));
            };
            state.write(USING_CONTAINER_SIZE, using)
        })
}

/// Reads the root state keys a resize decision needs.
pub fn read_sizes(state: &StoreSnapshot) -> ChartResult<(Size, UsingContainerSize)> {
    let chart: Size = state.get(CHART)?;
    let using: UsingContainerSize = state.get(USING_CONTAINER_SIZE)?;
    Ok((chart, using))
}
