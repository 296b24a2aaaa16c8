//! Driving budget resolution from a driver's trip history.
//!
//! The ledger looks for the most recent cycle reset: enough long breaks in a
//! single trip to add up to the reset rest. Driving recorded after that point
//! is charged against the budgets, unless the planned start is far enough
//! past the last known driving that the gap itself counts as a reset.

use std::cmp::Reverse;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use log::debug;

use crate::{DriverId, HosRules, PlanError, TripRecord, TripRepository};

/// Budgets a driver starts a new trip with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(into = "wire::CycleStateRecord", try_from = "wire::CycleStateRecord")
)]
pub struct CycleState {
    /// Driving allowed before a sleeper stop is required.
    pub remaining_drive: Duration,
    /// Driving allowed before the short break is required, or `None` when no
    /// short break is owed in the current duty window.
    pub rest_owed: Option<Duration>,
}

impl CycleState {
    /// Full budgets for a rested driver.
    ///
    /// # Examples
    /// ```
    /// use std::time::Duration;
    /// use hos_core::{CycleState, HosRules};
    ///
    /// let state = CycleState::fresh(&HosRules::default());
    /// assert_eq!(state.remaining_drive, Duration::from_secs(39_600));
    /// assert_eq!(state.rest_owed, Some(Duration::from_secs(28_800)));
    /// ```
    #[must_use]
    pub const fn fresh(rules: &HosRules) -> Self {
        Self {
            remaining_drive: rules.driving_ceiling,
            rest_owed: Some(rules.short_break_threshold),
        }
    }

    const fn after_driving(rules: &HosRules, driven: Duration) -> Self {
        let owed = rules.short_break_threshold.saturating_sub(driven);
        Self {
            remaining_drive: rules.driving_ceiling.saturating_sub(driven),
            rest_owed: if owed.is_zero() { None } else { Some(owed) },
        }
    }
}

/// Resolve the budgets `driver` has for a trip starting at `planned_start`.
///
/// # Errors
/// Returns [`PlanError::Repository`] when the history cannot be loaded and
/// [`PlanError::InvalidPlannedStart`] when `planned_start` precedes the end
/// of driving already on record.
pub fn resolve_cycle_state<T: TripRepository + ?Sized>(
    repository: &T,
    driver: DriverId,
    planned_start: DateTime<Utc>,
    rules: &HosRules,
) -> Result<CycleState, PlanError> {
    let history = repository.load_trip_history(driver)?;
    cycle_state_from_history(&history, planned_start, rules)
}

/// Resolve budgets from an already loaded history.
///
/// The history may be in any order.
///
/// # Errors
/// Returns [`PlanError::InvalidPlannedStart`] when `planned_start` precedes
/// the end of driving already on record, and
/// [`PlanError::TimestampOutOfRange`] when that end cannot be represented.
pub fn cycle_state_from_history(
    history: &[TripRecord],
    planned_start: DateTime<Utc>,
    rules: &HosRules,
) -> Result<CycleState, PlanError> {
    let trips = newest_first(history);
    let Some(latest) = trips.first() else {
        debug!("no trip history; driver starts fresh");
        return Ok(CycleState::fresh(rules));
    };

    let after = trips
        .iter()
        .find_map(|record| reset_point(record, rules))
        .unwrap_or(latest.trip.created_at);

    let segments: Vec<Duration> = history
        .iter()
        .flat_map(|record| &record.trip.driving_segments)
        .filter(|segment| segment.start >= after)
        .map(|segment| segment.driving.get())
        .collect();
    if segments.is_empty() {
        debug!("no driving since {after}; driver starts fresh");
        return Ok(CycleState::fresh(rules));
    }
    let driven: Duration = segments.iter().sum();

    let earliest = shift(after, driven)?;
    if planned_start < earliest {
        return Err(PlanError::InvalidPlannedStart {
            planned: planned_start,
            earliest,
        });
    }
    let grace_end = shift(earliest, rules.resume_grace)?;
    if planned_start <= grace_end {
        debug!("{driven:?} driven since {after}; budgets carry over");
        Ok(CycleState::after_driving(rules, driven))
    } else {
        debug!("planned start {planned_start} is past {grace_end}; budgets reset");
        Ok(CycleState::fresh(rules))
    }
}

/// Distance driven on the current tank before the next trip starts.
///
/// Starts from the most recent fuel event's distance to its dropoff and adds
/// the full distance of every later trip. Without any fuel event, every
/// trip's distance counts.
#[must_use]
#[expect(clippy::float_arithmetic, reason = "distances are summed in metres")]
pub fn distance_since_last_refuel(history: &[TripRecord]) -> f64 {
    let trips = newest_first(history);
    let mut total = 0.0;
    for record in trips {
        if let Some(event) = record.trip.fuel_event {
            return total + event.distance_to_dropoff_m;
        }
        total += record.trip.total_distance_m;
    }
    total
}

fn newest_first(history: &[TripRecord]) -> Vec<&TripRecord> {
    let mut trips: Vec<&TripRecord> = history.iter().collect();
    trips.sort_by_key(|record| Reverse((record.trip.created_at, record.id)));
    trips
}

/// End of the break that completes the reset rest within one trip.
fn reset_point(record: &TripRecord, rules: &HosRules) -> Option<DateTime<Utc>> {
    let mut breaks: Vec<_> = record.trip.breaks.iter().enumerate().collect();
    breaks.sort_by_key(|(index, period)| Reverse((period.end, *index)));
    let mut rested = Duration::ZERO;
    breaks.into_iter().find_map(|(_, period)| {
        let length = period.duration();
        if length >= rules.qualifying_break {
            rested = rested.saturating_add(length);
        }
        (rested >= rules.cycle_reset_rest).then_some(period.end)
    })
}

fn shift(at: DateTime<Utc>, by: Duration) -> Result<DateTime<Utc>, PlanError> {
    TimeDelta::from_std(by)
        .ok()
        .and_then(|delta| at.checked_add_signed(delta))
        .ok_or(PlanError::TimestampOutOfRange { at })
}

#[cfg(feature = "serde")]
mod wire {
    use std::time::Duration;

    use serde::{Deserialize, Serialize};

    use super::CycleState;

    /// Seconds-based shape of a cycle state.
    #[derive(Debug, Clone, Copy, Serialize, Deserialize)]
    pub(super) struct CycleStateRecord {
        remaining_drive_seconds: f64,
        rest_owed_seconds: Option<f64>,
    }

    impl From<CycleState> for CycleStateRecord {
        fn from(state: CycleState) -> Self {
            Self {
                remaining_drive_seconds: state.remaining_drive.as_secs_f64(),
                rest_owed_seconds: state.rest_owed.map(|owed| owed.as_secs_f64()),
            }
        }
    }

    impl TryFrom<CycleStateRecord> for CycleState {
        type Error = std::time::TryFromFloatSecsError;

        fn try_from(record: CycleStateRecord) -> Result<Self, Self::Error> {
            Ok(Self {
                remaining_drive: Duration::try_from_secs_f64(record.remaining_drive_seconds)?,
                rest_owed: record
                    .rest_owed_seconds
                    .map(Duration::try_from_secs_f64)
                    .transpose()?,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        BreakPeriod, BreakReason, DrivingDuration, DrivingSegment, FuelEvent, TripDecomposition,
        TripId,
    };
    use chrono::TimeZone;
    use rstest::{fixture, rstest};

    const HOUR: u64 = 3600;

    #[fixture]
    fn rules() -> HosRules {
        HosRules::default()
    }

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, hour, 0, 0)
            .single()
            .expect("valid timestamp")
    }

    fn trip(id: u64, created_at: DateTime<Utc>) -> TripRecord {
        TripRecord {
            id: TripId(id),
            trip: TripDecomposition {
                driver: DriverId(1),
                created_at,
                waypoints: Vec::new(),
                total_distance_m: 0.0,
                total_driving: Duration::ZERO,
                driving_segments: Vec::new(),
                breaks: Vec::new(),
                fuel_event: None,
            },
        }
    }

    fn drive(start: DateTime<Utc>, hours: u64) -> DrivingSegment {
        DrivingSegment {
            start,
            driving: DrivingDuration::new(Duration::from_secs(hours * HOUR)).expect("in range"),
        }
    }

    fn rest(begin: DateTime<Utc>, hours: i64) -> BreakPeriod {
        BreakPeriod {
            begin,
            end: begin + TimeDelta::hours(hours),
            reason: BreakReason::Rest,
        }
    }

    #[rstest]
    fn empty_history_is_fresh(rules: HosRules) {
        let state = cycle_state_from_history(&[], at(8), &rules).expect("state");
        assert_eq!(state, CycleState::fresh(&rules));
    }

    #[rstest]
    fn five_hours_within_grace_carries_over(rules: HosRules) {
        let mut record = trip(1, at(0));
        record.trip.driving_segments.push(drive(at(0), 5));
        let state = cycle_state_from_history(&[record], at(6), &rules).expect("state");
        assert_eq!(state.remaining_drive, Duration::from_secs(6 * HOUR));
        assert_eq!(state.rest_owed, Some(Duration::from_secs(3 * HOUR)));
    }

    #[rstest]
    fn eight_hours_driven_owes_no_break(rules: HosRules) {
        let mut record = trip(1, at(0));
        record.trip.driving_segments.push(drive(at(0), 8));
        let state = cycle_state_from_history(&[record], at(9), &rules).expect("state");
        assert_eq!(state.remaining_drive, Duration::from_secs(3 * HOUR));
        assert_eq!(state.rest_owed, None);
    }

    #[rstest]
    fn start_before_recorded_driving_is_rejected(rules: HosRules) {
        let mut record = trip(1, at(0));
        record.trip.driving_segments.push(drive(at(0), 5));
        let err = cycle_state_from_history(&[record], at(4), &rules).expect_err("too early");
        assert!(matches!(
            err,
            PlanError::InvalidPlannedStart { earliest, .. } if earliest == at(5)
        ));
    }

    #[rstest]
    fn start_past_grace_resets(rules: HosRules) {
        let mut record = trip(1, at(0));
        record.trip.driving_segments.push(drive(at(0), 5));
        let state = cycle_state_from_history(&[record], at(16), &rules).expect("state");
        assert_eq!(state, CycleState::fresh(&rules));
    }

    #[rstest]
    fn long_rest_moves_the_reset_point(rules: HosRules) {
        let mut record = trip(1, at(0));
        record.trip.driving_segments.push(drive(at(0), 9));
        record.trip.breaks.push(rest(at(9), 10));
        record.trip.driving_segments.push(drive(at(19), 2));
        let state = cycle_state_from_history(&[record], at(21), &rules).expect("state");
        assert_eq!(state.remaining_drive, Duration::from_secs(9 * HOUR));
        assert_eq!(state.rest_owed, Some(Duration::from_secs(6 * HOUR)));
    }

    #[rstest]
    fn short_breaks_do_not_qualify(rules: HosRules) {
        let mut record = trip(1, at(0));
        record.trip.driving_segments.push(drive(at(0), 4));
        for hour in [4, 6, 8, 10, 12, 14] {
            record.trip.breaks.push(BreakPeriod {
                begin: at(hour),
                end: at(hour) + TimeDelta::minutes(90),
                reason: BreakReason::Rest,
            });
        }
        let state = cycle_state_from_history(&[record], at(5), &rules).expect("state");
        assert_eq!(state.remaining_drive, Duration::from_secs(7 * HOUR));
    }

    #[rstest]
    fn reset_in_an_older_trip_charges_newer_driving(rules: HosRules) {
        let mut older = trip(1, at(0));
        older.trip.driving_segments.push(drive(at(0), 4));
        older.trip.breaks.push(rest(at(4), 5));
        older.trip.driving_segments.push(drive(at(9), 3));
        older.trip.breaks.push(rest(at(12), 5));
        let mut newer = trip(2, at(17));
        newer.trip.driving_segments.push(drive(at(17), 2));
        let state = cycle_state_from_history(&[newer, older], at(19), &rules).expect("state");
        assert_eq!(state.remaining_drive, Duration::from_secs(6 * HOUR));
        assert_eq!(state.rest_owed, Some(Duration::from_secs(3 * HOUR)));
    }

    #[rstest]
    fn without_a_reset_only_the_newest_trip_counts(rules: HosRules) {
        let mut older = trip(1, at(0));
        older.trip.driving_segments.push(drive(at(0), 6));
        let mut newer = trip(2, at(10));
        newer.trip.driving_segments.push(drive(at(10), 2));
        let state = cycle_state_from_history(&[older, newer], at(12), &rules).expect("state");
        assert_eq!(state.remaining_drive, Duration::from_secs(9 * HOUR));
        assert_eq!(state.rest_owed, Some(Duration::from_secs(6 * HOUR)));
    }

    #[rstest]
    #[case::two_five_hour_rests(&[(4, 5), (11, 5)], 8, Some(5))]
    #[case::two_hour_rest_still_qualifies(&[(4, 5), (11, 3), (14, 2)], 8, Some(5))]
    #[case::short_rest_breaks_the_sum(&[(4, 1), (11, 5)], 4, Some(1))]
    fn qualifying_breaks_add_up_within_a_trip(
        rules: HosRules,
        #[case] rests: &[(u32, i64)],
        #[case] remaining_hours: u64,
        #[case] owed_hours: Option<u64>,
    ) {
        // 4 h from 00:00, 2 h from 09:00, 1 h from 16:00.
        let mut record = trip(1, at(0));
        record.trip.driving_segments.push(drive(at(0), 4));
        record.trip.driving_segments.push(drive(at(9), 2));
        record.trip.driving_segments.push(drive(at(16), 1));
        for &(begin, hours) in rests {
            record.trip.breaks.push(rest(at(begin), hours));
        }
        let state = cycle_state_from_history(&[record], at(17), &rules).expect("state");
        assert_eq!(
            state.remaining_drive,
            Duration::from_secs(remaining_hours * HOUR)
        );
        assert_eq!(
            state.rest_owed,
            owed_hours.map(|hours| Duration::from_secs(hours * HOUR))
        );
    }

    #[rstest]
    fn fuel_baseline_adds_later_trips() {
        let mut older = trip(1, at(0));
        older.trip.fuel_event = Some(FuelEvent {
            distance_to_dropoff_m: 1_000.0,
        });
        older.trip.total_distance_m = 50_000.0;
        let mut newer = trip(2, at(12));
        newer.trip.total_distance_m = 20_000.0;
        let baseline = distance_since_last_refuel(&[newer, older]);
        assert!((baseline - 21_000.0).abs() < 1e-9);
    }

    #[rstest]
    fn fuel_baseline_without_events_sums_everything() {
        let mut first = trip(1, at(0));
        first.trip.total_distance_m = 300.0;
        let mut second = trip(2, at(1));
        second.trip.total_distance_m = 700.0;
        assert!((distance_since_last_refuel(&[first, second]) - 1_000.0).abs() < 1e-9);
    }
}
