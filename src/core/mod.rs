mod clock;
pub mod debounce;
pub mod event_bus;
mod types;

pub use clock::FrameClock;
pub use debounce::{Debounced, Debouncer};
pub use event_bus::{EventBus, EventHandler, EventPayload, SeriesInfo, events};
pub use types::{Rect, Size, SizeOption};
