//! Rest and sleeper planning.
//!
//! The planner walks the key stops pairwise and tracks two budgets at once:
//! the short-break threshold, which triggers a single 30-minute break per
//! duty window, and the driving ceiling, which triggers a sleeper stop and
//! opens a fresh duty window. Crossing points are located on the routed leg
//! and snapped to the nearest rest area.

use std::time::Duration;

use geo::Coord;

use crate::legs::{ProgressGuard, StopRequest, leg_duration, stop_near};
use crate::{CycleState, Metric, PlanError, PlanningContext, PoiCategory, StopKind, Waypoint};

/// A caller-supplied stop the itinerary must visit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyPoint {
    /// Location with `x = longitude` and `y = latitude`.
    pub location: Coord<f64>,
    /// Origin, pickup, or dropoff.
    pub kind: StopKind,
}

impl KeyPoint {
    /// Build a key point.
    #[must_use]
    pub const fn new(kind: StopKind, location: Coord<f64>) -> Self {
        Self { location, kind }
    }
}

/// Budgets carried through the walk.
#[derive(Debug)]
struct DutyWindow {
    /// Driving since the window opened, up to the current position.
    driven: Duration,
    /// Driving allowed in this window.
    ceiling: Duration,
    /// Driving after which the short break is due, until it is taken.
    break_due: Option<Duration>,
}

/// Insert short breaks and sleeper stops between `key_points`.
///
/// The first key point becomes the itinerary origin with no dwell. Every
/// later key point keeps the dwell configured for its kind. `initial` seeds
/// the first duty window with the budgets resolved by the ledger.
///
/// # Errors
/// Returns [`PlanError::NoRoute`] or [`PlanError::ProviderUnavailable`] when
/// routing fails, [`PlanError::NoCandidateFound`] when no rest area is found
/// near a required stop, and [`PlanError::StalledSegment`] when inserted
/// sleepers stop making progress along a leg.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use hos_core::test_support::{LinearRouteProvider, StubPoiProvider};
/// use hos_core::{CycleState, KeyPoint, PlannerConfig, PlanningContext, StopKind, plan_rest_stops};
///
/// let routes = LinearRouteProvider::default();
/// let pois = StubPoiProvider::default();
/// let config = PlannerConfig::default();
/// let ctx = PlanningContext::new(&routes, &pois, &config);
/// let keys = [
///     KeyPoint::new(StopKind::Origin, Coord { x: 0.0, y: 0.0 }),
///     KeyPoint::new(StopKind::Pickup, Coord { x: 2.0, y: 0.0 }),
///     KeyPoint::new(StopKind::Dropoff, Coord { x: 4.0, y: 0.0 }),
/// ];
/// let plan = plan_rest_stops(&ctx, &keys, &CycleState::fresh(&config.rules))?;
/// assert_eq!(plan.len(), 3);
/// # Ok::<(), hos_core::PlanError>(())
/// ```
pub fn plan_rest_stops(
    ctx: &PlanningContext<'_>,
    key_points: &[KeyPoint],
    initial: &CycleState,
) -> Result<Vec<Waypoint>, PlanError> {
    let rules = &ctx.config.rules;
    let Some((first, rest)) = key_points.split_first() else {
        return Ok(Vec::new());
    };
    let mut itinerary = vec![Waypoint::key_stop(StopKind::Origin, first.location, rules)];
    let mut window = DutyWindow {
        driven: Duration::ZERO,
        ceiling: initial.remaining_drive,
        break_due: initial.rest_owed,
    };
    let mut origin = first.location;

    for key in rest {
        let mut leg = leg_duration(ctx, origin, key.location)?;
        let mut guard = ProgressGuard::default();
        loop {
            let reached = window.driven.saturating_add(leg);
            let break_now = window
                .break_due
                .filter(|due| reached > *due && *due < window.ceiling);
            if let Some(threshold) = break_now {
                let offset = threshold.saturating_sub(window.driven);
                let stop = stop_near(
                    ctx,
                    rest_request(origin, key.location, offset, StopKind::ShortBreak),
                )?;
                window.driven = window
                    .driven
                    .saturating_add(leg_duration(ctx, origin, stop.location)?);
                window.break_due = None;
                origin = stop.location;
                itinerary.push(stop);
                leg = leg_duration(ctx, origin, key.location)?;
                continue;
            }
            if reached <= window.ceiling {
                window.driven = reached;
                break;
            }
            let offset = window.ceiling.saturating_sub(window.driven);
            let stop = stop_near(
                ctx,
                rest_request(origin, key.location, offset, StopKind::Sleeper),
            )?;
            let next = leg_duration(ctx, stop.location, key.location)?;
            guard.observe(leg, next, stop.location)?;
            window = DutyWindow {
                driven: Duration::ZERO,
                ceiling: rules.driving_ceiling,
                break_due: Some(rules.short_break_threshold),
            };
            origin = stop.location;
            itinerary.push(stop);
            leg = next;
        }
        itinerary.push(Waypoint::key_stop(key.kind, key.location, rules));
        origin = key.location;
    }
    Ok(itinerary)
}

const fn rest_request(
    from: Coord<f64>,
    to: Coord<f64>,
    offset: Duration,
    kind: StopKind,
) -> StopRequest {
    StopRequest {
        from,
        to,
        metric: Metric::Duration,
        target: offset.as_secs_f64(),
        category: PoiCategory::RestArea,
        kind,
    }
}
