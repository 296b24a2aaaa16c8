//! Per-leg routing helpers shared by the rest and fuel planners.

use std::time::Duration;

use geo::Coord;
use log::{debug, info};

use crate::{
    GeometryDetail, Metric, PlanError, PlanningContext, PoiCategory, RouteSummary, StopKind,
    Waypoint, locate_by_target,
};

pub(crate) fn leg_summary(
    ctx: &PlanningContext<'_>,
    from: Coord<f64>,
    to: Coord<f64>,
) -> Result<RouteSummary, PlanError> {
    ctx.routes
        .route(&[from, to], GeometryDetail::Summary)?
        .ok_or(PlanError::NoRoute { from, to })
}

pub(crate) fn leg_duration(
    ctx: &PlanningContext<'_>,
    from: Coord<f64>,
    to: Coord<f64>,
) -> Result<Duration, PlanError> {
    Ok(leg_summary(ctx, from, to)?.duration)
}

pub(crate) fn leg_distance(
    ctx: &PlanningContext<'_>,
    from: Coord<f64>,
    to: Coord<f64>,
) -> Result<f64, PlanError> {
    Ok(leg_summary(ctx, from, to)?.distance_m)
}

/// Where along a leg a synthetic stop is wanted.
pub(crate) struct StopRequest {
    pub(crate) from: Coord<f64>,
    pub(crate) to: Coord<f64>,
    pub(crate) metric: Metric,
    pub(crate) target: f64,
    pub(crate) category: PoiCategory,
    pub(crate) kind: StopKind,
}

/// Interpolate the target point, then snap it to the nearest place of the
/// requested category that is still reachable within `target`.
///
/// Candidates past the limit are skipped, so a stop never lets the budget
/// run over.
pub(crate) fn stop_near(
    ctx: &PlanningContext<'_>,
    request: StopRequest,
) -> Result<Waypoint, PlanError> {
    let StopRequest {
        from,
        to,
        metric,
        target,
        category,
        kind,
    } = request;
    let point = locate_by_target(
        ctx.routes,
        from,
        to,
        metric,
        target,
        ctx.config.interpolation_tolerance,
    )?;
    for place in ctx.pois.nearby(point, ctx.config.search_radius_m, category)? {
        let reach = metric.measure(&leg_summary(ctx, from, place.location)?);
        if reach > target {
            debug!(
                "skipping {} at ({}, {}): {reach:.1} past the limit of {target:.1}",
                place.name, place.location.y, place.location.x
            );
            continue;
        }
        info!(
            "inserting {kind:?} stop at {} ({}, {})",
            place.name, place.location.y, place.location.x
        );
        return Ok(Waypoint::synthetic(kind, place, &ctx.config.rules));
    }
    Err(PlanError::NoCandidateFound {
        category,
        near: point,
    })
}

/// Counts consecutive insertions on a leg that failed to shorten it.
#[derive(Debug, Default)]
pub(crate) struct ProgressGuard {
    stalls: u8,
}

impl ProgressGuard {
    pub(crate) fn observe<T: PartialOrd>(
        &mut self,
        before: T,
        after: T,
        at: Coord<f64>,
    ) -> Result<(), PlanError> {
        if after < before {
            self.stalls = 0;
            return Ok(());
        }
        self.stalls = self.stalls.saturating_add(1);
        if self.stalls >= 2 {
            return Err(PlanError::StalledSegment { at });
        }
        Ok(())
    }
}

/// Recompute travel time from the previous waypoint for every waypoint.
pub(crate) fn recompute_timing(
    ctx: &PlanningContext<'_>,
    waypoints: &mut [Waypoint],
) -> Result<(), PlanError> {
    let mut previous: Option<Coord<f64>> = None;
    for waypoint in waypoints.iter_mut() {
        waypoint.duration_from_previous = match previous {
            Some(from) => leg_duration(ctx, from, waypoint.location)?,
            None => Duration::ZERO,
        };
        previous = Some(waypoint.location);
    }
    Ok(())
}
