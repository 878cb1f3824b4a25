use thiserror::Error;

pub type ChartResult<T> = Result<T, ChartError>;

#[derive(Debug, Error)]
pub enum ChartError {
    #[error("invalid viewport size: width={width}, height={height}")]
    InvalidViewport { width: f64, height: f64 },

    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("unknown action `{0}`")]
    UnknownAction(String),

    #[error("module `{module}` collides with already registered state key `{key}`")]
    DuplicateModule { module: String, key: String },

    #[error("action `{action}` of module `{module}` is already registered")]
    DuplicateAction { module: String, action: String },

    #[error("computed field `{field}` depends on unknown key `{dependency}`")]
    UnknownDependency { field: String, dependency: String },

    #[error("computed fields form a dependency cycle: {}", cycle.join(" -> "))]
    CyclicDependency { cycle: Vec<String> },

    #[error("computed field `{field}` read undeclared dependency `{dependency}`")]
    UndeclaredDependency { field: String, dependency: String },

    #[error("series selection is disabled; enable `series.selectable` to use this API")]
    SelectionDisabled,

    #[error("chart is not initialized")]
    NotInitialized,

    #[error("chart is already initialized")]
    AlreadyInitialized,

    #[error("chart has been destroyed")]
    Destroyed,

    #[error("animation task `{requester}` failed: {reason}")]
    TaskFailed { requester: String, reason: String },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ChartError {
    /// Returns `true` for integrator mistakes that should surface at startup.
    #[must_use]
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            Self::UnknownAction(_)
                | Self::DuplicateModule { .. }
                | Self::DuplicateAction { .. }
                | Self::UnknownDependency { .. }
                | Self::CyclicDependency { .. }
                | Self::UndeclaredDependency { .. }
        )
    }
}
