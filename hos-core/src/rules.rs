//! Regulatory constants and planner tuning.
//!
//! The defaults encode the 11-hour driving ceiling, the 8-hour short-break
//! threshold, and the 10-hour cycle reset. The short-break threshold and the
//! cycle reset are separate knobs even though both feed the
//! ledger's rest accounting.

use std::time::Duration;

use crate::StopKind;

/// Metres in one statute mile.
pub const METRES_PER_MILE: f64 = 1609.34;

const HOUR: u64 = 3600;
const MINUTE: u64 = 60;

/// Hours-of-Service limits applied while planning and when reading history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HosRules {
    /// Maximum driving before a sleeper stop is mandatory.
    pub driving_ceiling: Duration,
    /// Driving after which a single short break is mandatory.
    pub short_break_threshold: Duration,
    /// Dwell at a short-break stop.
    pub short_break: Duration,
    /// Dwell at a sleeper stop.
    pub sleeper: Duration,
    /// Accumulated qualifying rest that resets the driving cycle.
    pub cycle_reset_rest: Duration,
    /// Minimum length of a break that counts towards the cycle reset.
    pub qualifying_break: Duration,
    /// Window after the last known driving during which budgets carry over.
    pub resume_grace: Duration,
    /// Dwell at a pickup or dropoff.
    pub key_stop_dwell: Duration,
    /// Dwell at a refuelling stop.
    pub refuel_dwell: Duration,
}

impl Default for HosRules {
    fn default() -> Self {
        Self {
            driving_ceiling: Duration::from_secs(11 * HOUR),
            short_break_threshold: Duration::from_secs(8 * HOUR),
            short_break: Duration::from_secs(30 * MINUTE),
            sleeper: Duration::from_secs(10 * HOUR),
            cycle_reset_rest: Duration::from_secs(36_000),
            qualifying_break: Duration::from_secs(2 * HOUR),
            resume_grace: Duration::from_secs(10 * HOUR),
            key_stop_dwell: Duration::from_secs(HOUR),
            refuel_dwell: Duration::from_secs(15 * MINUTE),
        }
    }
}

impl HosRules {
    /// Dwell time the planner assigns to a stop of the given kind.
    ///
    /// # Examples
    /// ```
    /// use std::time::Duration;
    /// use hos_core::{HosRules, StopKind};
    ///
    /// let rules = HosRules::default();
    /// assert_eq!(rules.dwell(StopKind::Sleeper), Duration::from_secs(36_000));
    /// assert_eq!(rules.dwell(StopKind::Origin), Duration::ZERO);
    /// ```
    #[must_use]
    pub const fn dwell(&self, kind: StopKind) -> Duration {
        match kind {
            StopKind::Origin => Duration::ZERO,
            StopKind::Pickup | StopKind::Dropoff => self.key_stop_dwell,
            StopKind::ShortBreak => self.short_break,
            StopKind::Sleeper => self.sleeper,
            StopKind::Refuel => self.refuel_dwell,
        }
    }
}

/// Complete configuration for a planning run.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannerConfig {
    /// Regulatory limits.
    pub rules: HosRules,
    /// Distance a full tank covers, in metres.
    pub tank_range_m: f64,
    /// Radius used when searching for rest areas and fuel stations.
    pub search_radius_m: f64,
    /// Relative tolerance accepted by the geometry interpolator.
    pub interpolation_tolerance: f64,
}

impl Default for PlannerConfig {
    #[expect(
        clippy::float_arithmetic,
        reason = "tank range default is expressed in miles"
    )]
    fn default() -> Self {
        Self {
            rules: HosRules::default(),
            tank_range_m: 1000.0 * METRES_PER_MILE,
            search_radius_m: 10_000.0,
            interpolation_tolerance: 0.1,
        }
    }
}

impl PlannerConfig {
    /// Replace the regulatory limits.
    #[must_use]
    pub const fn with_rules(mut self, rules: HosRules) -> Self {
        self.rules = rules;
        self
    }

    /// Set the tank range in metres.
    #[must_use]
    pub const fn with_tank_range_m(mut self, tank_range_m: f64) -> Self {
        self.tank_range_m = tank_range_m;
        self
    }

    /// Set the tank range in statute miles.
    ///
    /// # Examples
    /// ```
    /// use hos_core::{PlannerConfig, METRES_PER_MILE};
    ///
    /// let config = PlannerConfig::default().with_tank_range_miles(500.0);
    /// assert_eq!(config.tank_range_m, 500.0 * METRES_PER_MILE);
    /// ```
    #[must_use]
    #[expect(clippy::float_arithmetic, reason = "unit conversion")]
    pub fn with_tank_range_miles(self, miles: f64) -> Self {
        self.with_tank_range_m(miles * METRES_PER_MILE)
    }

    /// Set the point-of-interest search radius in metres.
    #[must_use]
    pub const fn with_search_radius_m(mut self, search_radius_m: f64) -> Self {
        self.search_radius_m = search_radius_m;
        self
    }

    /// Set the interpolation tolerance as a fraction of the probed value.
    #[must_use]
    pub const fn with_interpolation_tolerance(mut self, tolerance: f64) -> Self {
        self.interpolation_tolerance = tolerance;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn defaults_keep_break_and_reset_constants_apart() {
        let rules = HosRules::default();
        assert_eq!(rules.short_break_threshold, Duration::from_secs(28_800));
        assert_eq!(rules.cycle_reset_rest, Duration::from_secs(36_000));
        assert_ne!(rules.short_break_threshold, rules.cycle_reset_rest);
    }

    #[rstest]
    #[case(StopKind::Pickup, 3600)]
    #[case(StopKind::Dropoff, 3600)]
    #[case(StopKind::ShortBreak, 1800)]
    #[case(StopKind::Refuel, 900)]
    fn dwell_follows_stop_kind(#[case] kind: StopKind, #[case] seconds: u64) {
        assert_eq!(HosRules::default().dwell(kind), Duration::from_secs(seconds));
    }

    #[rstest]
    fn default_tank_range_is_one_thousand_miles() {
        let config = PlannerConfig::default();
        assert!((config.tank_range_m - 1_609_340.0).abs() < 1e-6);
    }
}
