//! Opt-in `tracing` subscriber setup for hosts embedding `chart-runtime`.
//!
//! Store dispatches and coalescer firings log at `debug`, animation frames at
//! `debug`/`trace`, isolated task failures at `warn`. Hosts with their own
//! subscriber can ignore this module entirely.

/// Environment variable read for filter directives before falling back to
/// [`DEFAULT_DIRECTIVES`].
pub const LOG_ENV: &str = "CHART_RUNTIME_LOG";

pub const DEFAULT_DIRECTIVES: &str = "chart_runtime=info";

/// Installs a compact global subscriber filtered by `CHART_RUNTIME_LOG`.
///
/// Returns `false` without the `telemetry` feature, or when the host already
/// installed a global subscriber.
#[must_use]
pub fn init_default_tracing() -> bool {
    let directives = std::env::var(LOG_ENV).unwrap_or_else(|_| DEFAULT_DIRECTIVES.to_owned());
    init_tracing_with_filter(&directives)
}

/// Installs a compact global subscriber with explicit filter directives,
/// e.g. `"chart_runtime::store=debug,chart_runtime::animation=trace"`.
#[must_use]
pub fn init_tracing_with_filter(directives: &str) -> bool {
    #[cfg(feature = "telemetry")]
    {
        let filter = tracing_subscriber::EnvFilter::try_new(directives)
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(DEFAULT_DIRECTIVES));
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .compact()
            .try_init()
            .is_ok()
    }

    #[cfg(not(feature = "telemetry"))]
    {
        let _ = directives;
        false
    }
}
