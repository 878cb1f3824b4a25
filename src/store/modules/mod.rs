//! Store modules every chart registers before its chart-type modules.

pub mod legend;
pub mod options;
pub mod root;
pub mod series_data;

pub use legend::{LegendEntry, legend_module};
pub use options::{ChartOptions, ChartSection, ResponsiveOptions, SeriesOptions, options_module};
pub use root::root_module;
pub use series_data::series_data_module;

use super::StoreModule;

/// Built-in modules in registration order.
#[must_use]
pub fn default_modules() -> Vec<StoreModule> {
    vec![
        root_module(),
        options_module(),
        series_data_module(),
        legend_module(),
    ]
}
