//! Per-redraw animation duration selection.
//!
//! The decision table is kept exactly as the chart behaved historically,
//! including the overlap where `resizing` and `updating` are both set.

use serde::{Deserialize, Serialize};

pub const DEFAULT_ANIMATION_DURATION: f64 = 500.0;

/// `chart.animation` / `responsive.animation` option value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnimationOption {
    Enabled(bool),
    Duration { duration: f64 },
}

/// Flags consumed by the next duration decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AnimationControlFlags {
    /// Set while a container-driven resize is being applied.
    pub resizing: bool,
    /// Set by live data updates that should render instantly.
    pub updating: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DurationPolicy {
    default_duration: f64,
}

impl Default for DurationPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_ANIMATION_DURATION)
    }
}

impl DurationPolicy {
    #[must_use]
    pub fn new(default_duration: f64) -> Self {
        Self { default_duration }
    }

    #[must_use]
    pub fn default_duration(&self) -> f64 {
        self.default_duration
    }

    /// Resolves one option and consumes `updating`.
    pub fn resolve(
        &self,
        option: Option<AnimationOption>,
        first_rendering: bool,
        flags: &mut AnimationControlFlags,
    ) -> f64 {
        let mut duration = match option {
            _ if !first_rendering && !flags.resizing => self.default_duration,
            None => self.default_duration,
            Some(AnimationOption::Enabled(true)) => self.default_duration,
            Some(AnimationOption::Enabled(false)) => 0.0,
            Some(AnimationOption::Duration { duration }) => duration,
        };
        if flags.updating {
            duration = 0.0;
        }
        flags.updating = false;
        duration
    }

    /// Duration of the next chart loop.
    ///
    /// A pending resize re-resolves against the responsive option and wins
    /// over everything decided before it.
    pub fn loop_duration(
        &self,
        chart: Option<AnimationOption>,
        responsive: Option<AnimationOption>,
        first_rendering: bool,
        flags: &mut AnimationControlFlags,
    ) -> f64 {
        let mut duration = self.resolve(chart, first_rendering, flags);
        if flags.resizing {
            duration = self.resolve(responsive, first_rendering, flags);
            flags.resizing = false;
        }
        duration
    }
}

#[cfg(test)]
mod tests {
    use super::{AnimationControlFlags, AnimationOption, DurationPolicy};

    const CHART: Option<AnimationOption> = Some(AnimationOption::Duration { duration: 300.0 });
    const RESPONSIVE: Option<AnimationOption> = Some(AnimationOption::Duration { duration: 200.0 });

    fn decide(first_rendering: bool, resizing: bool, updating: bool) -> (f64, AnimationControlFlags) {
        let mut flags = AnimationControlFlags { resizing, updating };
        let duration =
            DurationPolicy::default().loop_duration(CHART, RESPONSIVE, first_rendering, &mut flags);
        (duration, flags)
    }

    #[test]
    fn loop_duration_table_on_first_render() {
        assert_eq!(decide(true, false, false).0, 300.0);
        assert_eq!(decide(true, false, true).0, 0.0);
        assert_eq!(decide(true, true, false).0, 200.0);
        assert_eq!(decide(true, true, true).0, 200.0);
    }

    #[test]
    fn loop_duration_table_after_first_render() {
        assert_eq!(decide(false, false, false).0, 500.0);
        assert_eq!(decide(false, false, true).0, 0.0);
        assert_eq!(decide(false, true, false).0, 200.0);
        assert_eq!(decide(false, true, true).0, 200.0);
    }

    #[test]
    fn every_decision_resets_both_flags() {
        for resizing in [false, true] {
            for updating in [false, true] {
                let (_, flags) = decide(true, resizing, updating);
                assert_eq!(flags, AnimationControlFlags::default());
            }
        }
    }

    #[test]
    fn disabled_animation_and_missing_option() {
        let policy = DurationPolicy::default();
        let mut flags = AnimationControlFlags::default();
        assert_eq!(
            policy.resolve(Some(AnimationOption::Enabled(false)), true, &mut flags),
            0.0
        );
        assert_eq!(policy.resolve(None, true, &mut flags), 500.0);
        assert_eq!(
            policy.resolve(Some(AnimationOption::Enabled(true)), true, &mut flags),
            500.0
        );
    }
}
