//! Break a planned itinerary into the records the ledger reads back.

use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};

use crate::{
    BreakPeriod, DriverId, DrivingDuration, DrivingSegment, FuelEvent, PlanError,
    TripDecomposition, TripPlan,
};

/// Wall clock advanced along the itinerary.
struct Clock {
    now: DateTime<Utc>,
}

impl Clock {
    fn advance(&mut self, by: Duration) -> Result<DateTime<Utc>, PlanError> {
        let at = self.now;
        self.now = TimeDelta::from_std(by)
            .ok()
            .and_then(|delta| at.checked_add_signed(delta))
            .ok_or(PlanError::TimestampOutOfRange { at })?;
        Ok(self.now)
    }
}

/// Derive driving segments, breaks, and the fuel event for a trip starting
/// at `started_at`.
///
/// Travel accumulates into one driving segment until a waypoint with a
/// positive dwell closes it. Every waypoint whose kind maps to a break
/// reason yields a break spanning its dwell.
///
/// # Errors
/// Returns [`PlanError::InvalidDrivingDuration`] when a segment lasts a day
/// or more and [`PlanError::TimestampOutOfRange`] when the itinerary runs
/// past the representable time range.
pub fn decompose_trip(
    driver: DriverId,
    started_at: DateTime<Utc>,
    plan: &TripPlan,
) -> Result<TripDecomposition, PlanError> {
    let mut clock = Clock { now: started_at };
    let mut segments = Vec::new();
    let mut breaks = Vec::new();
    let mut open: Option<(DateTime<Utc>, Duration)> = None;

    for waypoint in &plan.waypoints {
        let travel = waypoint.duration_from_previous;
        if !travel.is_zero() {
            let (start, length) = open.unwrap_or((clock.now, Duration::ZERO));
            open = Some((start, length.saturating_add(travel)));
            clock.advance(travel)?;
        }
        if waypoint.dwell.is_zero() {
            continue;
        }
        if let Some(segment) = open.take() {
            segments.push(close(segment)?);
        }
        let begin = clock.now;
        let end = clock.advance(waypoint.dwell)?;
        if let Some(reason) = waypoint.kind.break_reason() {
            breaks.push(BreakPeriod { begin, end, reason });
        }
    }
    if let Some(segment) = open {
        segments.push(close(segment)?);
    }

    let total_driving = segments
        .iter()
        .map(|segment: &DrivingSegment| segment.driving.get())
        .sum();
    Ok(TripDecomposition {
        driver,
        created_at: started_at,
        waypoints: plan.waypoints.clone(),
        total_distance_m: plan.total_distance_m,
        total_driving,
        driving_segments: segments,
        breaks,
        fuel_event: plan
            .distance_since_last_refuel_m
            .map(|distance_to_dropoff_m| FuelEvent {
                distance_to_dropoff_m,
            }),
    })
}

fn close((start, length): (DateTime<Utc>, Duration)) -> Result<DrivingSegment, PlanError> {
    Ok(DrivingSegment {
        start,
        driving: DrivingDuration::new(length)?,
    })
}
