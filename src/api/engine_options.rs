use serde_json::{Value, json};

use crate::core::{EventPayload, SeriesInfo, Size, events};
use crate::error::{ChartError, ChartResult};
use crate::extensions::PointerEvent;
use crate::render::Renderer;
use crate::store::modules::legend::{LEGEND, LegendEntry};
use crate::store::modules::options::{OPTIONS, patched_chart_size};
use crate::store::modules::ChartOptions;
use crate::store::{
    Action, AddData, DispatchOutcome, OptionsUpdate, SeriesData, StoreSnapshot,
};

use super::engine_resize::OptionsChange;
use super::ChartEngine;

impl<R: Renderer> ChartEngine<R> {
    /// Registers a handler for a chart event such as `selectSeries` or `zoom`.
    pub fn on<F>(&self, name: impl Into<String>, handler: F) -> ChartResult<()>
    where
        F: Fn(&EventPayload) + 'static,
    {
        self.ensure_alive()?;
        self.bus.on(name, handler);
        Ok(())
    }

    /// Dispatches `action` and schedules whatever redraw the change needs.
    pub fn dispatch(&mut self, action: Action) -> ChartResult<DispatchOutcome> {
        self.ensure_ready()?;
        self.dispatch_and_settle(action)
    }

    pub fn snapshot(&self) -> ChartResult<StoreSnapshot> {
        self.ensure_ready()?;
        Ok(self.store.snapshot())
    }

    /// Currently applied options.
    pub fn get_options(&self) -> ChartResult<ChartOptions> {
        self.ensure_ready()?;
        self.current_options()
    }

    pub fn get_checked_legend(&self) -> ChartResult<Vec<LegendEntry>> {
        self.ensure_ready()?;
        let legend: Vec<LegendEntry> = self.store.read(LEGEND)?;
        Ok(legend.into_iter().filter(|entry| entry.checked).collect())
    }

    /// Merges `patch` into the current options.
    pub fn update_options(&mut self, patch: Value) -> ChartResult<()> {
        self.apply_options(OptionsChange::Update, patch)
    }

    /// Replaces the options as a whole.
    pub fn set_options(&mut self, options: Value) -> ChartResult<()> {
        self.apply_options(OptionsChange::Replace, options)
    }

    /// Sets explicit chart dimensions; container tracking stops.
    pub fn resize(&mut self, size: Size) -> ChartResult<()> {
        let size = size.validate()?;
        self.update_options(json!({
            "chart": { "width": size.width, "height": size.height }
        }))
    }

    pub fn set_tooltip_offset(&mut self, x: f64, y: f64) -> ChartResult<()> {
        self.ensure_ready()?;
        self.dispatch_and_settle(Action::UpdateOptions(OptionsUpdate {
            options: json!({ "tooltip": { "offsetX": x, "offsetY": y } }),
            container: None,
        }))?;
        Ok(())
    }

    /// Appends one datum per series; the redraw it causes is not animated.
    pub fn add_data(&mut self, data: Vec<Value>, category: Option<Value>) -> ChartResult<()> {
        self.ensure_ready()?;
        self.scheduler.flags.updating = true;
        self.dispatch_and_settle(Action::AddData(AddData { data, category }))?;
        Ok(())
    }

    pub fn set_data(&mut self, data: SeriesData) -> ChartResult<()> {
        self.ensure_ready()?;
        self.dispatch_and_settle(Action::SetData(data))?;
        Ok(())
    }

    /// Selects a series. Requires `series.selectable`.
    pub fn select_series(&mut self, info: SeriesInfo) -> ChartResult<()> {
        self.ensure_selectable()?;
        self.bus.emit(events::SELECT_SERIES, &EventPayload::Series(info));
        Ok(())
    }

    /// Clears the selection. Requires `series.selectable`.
    pub fn unselect_series(&mut self) -> ChartResult<()> {
        self.ensure_selectable()?;
        self.dispatch_and_settle(Action::SetAllLegendActiveState(true))?;
        self.bus.signal(events::RESET_SELECTED_SERIES);
        Ok(())
    }

    /// Delivers host pointer input to the components under the pointer.
    pub fn handle_pointer_event(&mut self, event: PointerEvent) -> ChartResult<usize> {
        self.ensure_ready()?;
        let delivered = self.components.handle_pointer(&event, &self.context)?;
        self.settle_queued()?;
        Ok(delivered)
    }

    pub(super) fn current_options(&self) -> ChartResult<ChartOptions> {
        let options: Value = self.store.read(OPTIONS)?;
        ChartOptions::from_value(&options)
    }

    fn ensure_selectable(&self) -> ChartResult<()> {
        self.ensure_ready()?;
        if self.current_options()?.series.selectable {
            Ok(())
        } else {
            Err(ChartError::SelectionDisabled)
        }
    }

    fn apply_options(&mut self, change: OptionsChange, options: Value) -> ChartResult<()> {
        self.ensure_ready()?;
        ChartOptions::from_value(&options)?;
        let using = self.resize_listener_policy(change, &options)?;
        self.dispatch_and_settle(Action::SetUsingContainerSize(using))?;

        let (width, height) = patched_chart_size(&options);
        let touches_size = width.is_some() || height.is_some();
        let action = match change {
            OptionsChange::Update => Action::UpdateOptions(OptionsUpdate {
                options,
                container: Some(self.resize.container),
            }),
            OptionsChange::Replace => Action::InitOptions(options),
        };
        self.dispatch_and_settle(action)?;

        if touches_size || change == OptionsChange::Replace {
            self.schedule_resize();
        }
        Ok(())
    }
}
