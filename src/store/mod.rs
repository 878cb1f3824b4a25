//! Reactive chart state.
//!
//! All state lives in named subtrees owned by the [`Store`]. Subtrees change
//! only inside action handlers; computed fields are re-derived along an
//! explicit dependency DAG; observers see immutable snapshots once a dispatch
//! has settled.

mod action;
mod computed;
mod dispatcher;
mod module;
pub mod modules;
mod state;
#[allow(clippy::module_inception)]
mod store;

pub use action::{Action, ActionTag, AddData, OptionsUpdate, SeriesData, UsingContainerSize};
pub use computed::ComputeContext;
pub use dispatcher::Dispatcher;
pub use module::{ActionDef, ActionHandler, ComputeFn, ComputedDef, StateInitializer, StoreInit, StoreModule};
pub use modules::default_modules;
pub use state::{ChangeSet, DepKey, StateWriter, StoreSnapshot};
pub use store::{DispatchOutcome, Observer, ObserverId, Store};
