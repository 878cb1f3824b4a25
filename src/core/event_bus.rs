use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tracing::trace;

use super::Size;

/// Event names used by the chart runtime itself.
pub mod events {
    pub const NEED_DRAW: &str = "needDraw";
    pub const NEED_LOOP: &str = "needLoop";
    pub const LOOP_START: &str = "loopStart";
    pub const LOOP_COMPLETE: &str = "loopComplete";
    pub const RESET_HOVERED_SERIES: &str = "resetHoveredSeries";
    pub const SELECT_SERIES: &str = "selectSeries";
    pub const RESET_SELECTED_SERIES: &str = "resetSelectedSeries";
    pub const HOVER_SERIES: &str = "hoverSeries";
    pub const UNHOVER_SERIES: &str = "unhoverSeries";
    pub const CLICK_LEGEND_LABEL: &str = "clickLegendLabel";
    pub const CLICK_LEGEND_CHECKBOX: &str = "clickLegendCheckbox";
    pub const ZOOM: &str = "zoom";
    pub const RESET_ZOOM: &str = "resetZoom";
}

/// Identifies one series (and optionally one datum) for selection APIs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct SeriesInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub series_index: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chart_type: Option<String>,
}

/// Payload carried by chart events.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum EventPayload {
    #[default]
    Empty,
    Size(Size),
    Series(SeriesInfo),
    Value(serde_json::Value),
}

pub type EventHandler<P> = Rc<dyn Fn(&P)>;

/// Synchronous named publish/subscribe channel.
///
/// Handlers run in registration order. `emit` works on a copy of the handler
/// list, so handlers may register more handlers or emit again; handlers
/// registered during an emit only see later emits.
pub struct EventBus<P = EventPayload> {
    handlers: RefCell<IndexMap<String, SmallVec<[EventHandler<P>; 2]>>>,
}

impl<P> EventBus<P> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            handlers: RefCell::new(IndexMap::new()),
        }
    }

    pub fn on<F>(&self, name: impl Into<String>, handler: F)
    where
        F: Fn(&P) + 'static,
    {
        self.on_shared(name, Rc::new(handler));
    }

    /// Registers an already shared handler; registering the same handle twice
    /// makes it run twice.
    pub fn on_shared(&self, name: impl Into<String>, handler: EventHandler<P>) {
        self.handlers
            .borrow_mut()
            .entry(name.into())
            .or_default()
            .push(handler);
    }

    /// Invokes every handler registered for `name` and returns how many ran.
    pub fn emit(&self, name: &str, payload: &P) -> usize {
        let snapshot: SmallVec<[EventHandler<P>; 2]> = match self.handlers.borrow().get(name) {
            Some(handlers) => handlers.clone(),
            None => return 0,
        };
        trace!(event = name, handlers = snapshot.len(), "emit");
        for handler in &snapshot {
            handler(payload);
        }
        snapshot.len()
    }

    /// Removes every handler registered for `name`.
    pub fn clear(&self, name: &str) -> usize {
        self.handlers
            .borrow_mut()
            .shift_remove(name)
            .map_or(0, |handlers| handlers.len())
    }

    pub fn clear_all(&self) {
        self.handlers.borrow_mut().clear();
    }

    #[must_use]
    pub fn handler_count(&self, name: &str) -> usize {
        self.handlers
            .borrow()
            .get(name)
            .map_or(0, |handlers| handlers.len())
    }
}

impl EventBus<EventPayload> {
    /// Emits an event without payload.
    pub fn signal(&self, name: &str) -> usize {
        self.emit(name, &EventPayload::Empty)
    }
}

impl<P> Default for EventBus<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> fmt::Debug for EventBus<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let handlers = self.handlers.borrow();
        f.debug_map()
            .entries(handlers.iter().map(|(name, list)| (name, list.len())))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::{EventBus, EventPayload};

    #[test]
    fn handler_registered_during_emit_runs_on_next_emit_only() {
        let bus = Rc::new(EventBus::<EventPayload>::new());
        let hits = Rc::new(RefCell::new(Vec::new()));

        let bus_handle = Rc::clone(&bus);
        let outer_hits = Rc::clone(&hits);
        bus.on("tick", move |_| {
            outer_hits.borrow_mut().push("outer");
            let inner_hits = Rc::clone(&outer_hits);
            bus_handle.on("tick", move |_| inner_hits.borrow_mut().push("inner"));
        });

        assert_eq!(bus.signal("tick"), 1);
        assert_eq!(*hits.borrow(), vec!["outer"]);
        assert_eq!(bus.signal("tick"), 2);
        assert_eq!(*hits.borrow(), vec!["outer", "outer", "inner"]);
    }
}
