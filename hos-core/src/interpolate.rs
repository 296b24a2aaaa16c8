//! Locate the point along a routed leg where a duration or distance target is
//! reached.
//!
//! The search runs over polyline vertex indices rather than geographic
//! distance. Each probe asks the router for the sub-route from the leg start
//! to a candidate vertex and narrows the bracket on the measured value. The
//! stopping rule is relative to the probed value, so short probes converge
//! less precisely than long ones.
//!
//! A probe is only accepted when it does not exceed the target. Callers place
//! stops "before the limit", and an overshooting probe would break that
//! guarantee.

use geo::Coord;
use log::debug;

use crate::{GeometryDetail, PlanError, RouteProvider, RouteSummary};

/// Quantity measured along a leg.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    /// Travel time in seconds.
    Duration,
    /// Travel distance in metres.
    Distance,
}

impl Metric {
    /// Read the metric from a route summary.
    ///
    /// # Examples
    /// ```
    /// use std::time::Duration;
    /// use hos_core::{Metric, RouteSummary};
    ///
    /// let summary = RouteSummary {
    ///     distance_m: 1200.0,
    ///     duration: Duration::from_secs(90),
    ///     geometry: Vec::new(),
    /// };
    /// assert_eq!(Metric::Duration.measure(&summary), 90.0);
    /// assert_eq!(Metric::Distance.measure(&summary), 1200.0);
    /// ```
    #[must_use]
    pub fn measure(self, summary: &RouteSummary) -> f64 {
        match self {
            Self::Duration => summary.duration.as_secs_f64(),
            Self::Distance => summary.distance_m,
        }
    }
}

/// Find the coordinate on the route from `from` to `to` where `metric`
/// reaches `target`.
///
/// Returns `from` when `target <= 0` or the leg measures zero, and `to` when
/// the whole leg measures no more than `target`. Otherwise the returned
/// vertex measures at most `target` from `from`, and lies within
/// `tolerance * measured` of it when the polyline is dense enough.
///
/// # Errors
/// Returns [`PlanError::NoRoute`] when the router cannot connect the points,
/// and [`PlanError::ProviderUnavailable`] when a router call fails or the full
/// route has no geometry.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use hos_core::{Metric, locate_by_target, test_support::LinearRouteProvider};
///
/// let routes = LinearRouteProvider::default();
/// let from = Coord { x: 0.0, y: 0.0 };
/// let to = Coord { x: 4.0, y: 0.0 };
/// let end = locate_by_target(&routes, from, to, Metric::Duration, 1.0e9, 0.1)?;
/// assert_eq!(end, to);
/// # Ok::<(), hos_core::PlanError>(())
/// ```
#[expect(
    clippy::float_arithmetic,
    reason = "bracket narrowing compares measured values against the target"
)]
pub fn locate_by_target<R: RouteProvider + ?Sized>(
    routes: &R,
    from: Coord<f64>,
    to: Coord<f64>,
    metric: Metric,
    target: f64,
    tolerance: f64,
) -> Result<Coord<f64>, PlanError> {
    if target <= 0.0 {
        return Ok(from);
    }
    let leg = routes
        .route(&[from, to], GeometryDetail::Full)?
        .ok_or(PlanError::NoRoute { from, to })?;
    let total = metric.measure(&leg);
    if total <= 0.0 {
        return Ok(from);
    }
    if total <= target {
        return Ok(to);
    }

    let geometry = leg.geometry;
    let Some(last) = geometry.len().checked_sub(1) else {
        return Err(crate::ProviderError::ParseError {
            message: "full route returned no geometry".to_owned(),
        }
        .into());
    };
    let vertex = |index: usize| geometry.get(index).copied().unwrap_or(from);

    let mut low = 0_usize;
    let mut high = last;
    while high.saturating_sub(low) > 1 {
        let mid = (low + high).div_ceil(2);
        let candidate = vertex(mid);
        let probe = routes
            .route(&[from, candidate], GeometryDetail::Summary)?
            .ok_or(PlanError::NoRoute {
                from,
                to: candidate,
            })?;
        let measured = metric.measure(&probe);
        debug!("probe vertex {mid}/{last}: measured {measured:.1} against target {target:.1}");
        if measured <= target && target - measured <= tolerance * measured {
            return Ok(candidate);
        }
        if measured < target {
            low = mid;
        } else {
            high = mid;
        }
    }
    Ok(vertex(low))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{FailingRouteProvider, LinearRouteProvider};
    use rstest::{fixture, rstest};

    #[fixture]
    fn routes() -> LinearRouteProvider {
        LinearRouteProvider::default()
    }

    const FROM: Coord<f64> = Coord { x: 0.0, y: 0.0 };
    const TO: Coord<f64> = Coord { x: 10.0, y: 0.0 };

    #[rstest]
    #[case(0.0)]
    #[case(-5.0)]
    fn non_positive_target_returns_start(routes: LinearRouteProvider, #[case] target: f64) {
        let point = locate_by_target(&routes, FROM, TO, Metric::Duration, target, 0.1)
            .expect("locate");
        assert_eq!(point, FROM);
    }

    #[rstest]
    fn target_beyond_leg_returns_end(routes: LinearRouteProvider) {
        let point = locate_by_target(&routes, FROM, TO, Metric::Distance, 2.0e6, 0.1)
            .expect("locate");
        assert_eq!(point, TO);
    }

    #[rstest]
    fn zero_length_leg_returns_start(routes: LinearRouteProvider) {
        let point =
            locate_by_target(&routes, FROM, FROM, Metric::Duration, 60.0, 0.1).expect("locate");
        assert_eq!(point, FROM);
    }

    #[rstest]
    #[case(Metric::Duration, 4.0 * 3600.0)]
    #[case(Metric::Distance, 250_000.0)]
    fn located_point_never_exceeds_target(
        routes: LinearRouteProvider,
        #[case] metric: Metric,
        #[case] target: f64,
    ) {
        let point = locate_by_target(&routes, FROM, TO, metric, target, 0.1).expect("locate");
        let probe = routes
            .route(&[FROM, point], GeometryDetail::Summary)
            .expect("route")
            .expect("some route");
        let measured = metric.measure(&probe);
        assert!(measured <= target, "{measured} exceeds {target}");
        assert!(target - measured <= 0.1 * measured, "{measured} too far below {target}");
    }

    #[rstest]
    fn repeated_calls_agree(routes: LinearRouteProvider) {
        let first = locate_by_target(&routes, FROM, TO, Metric::Duration, 12_345.0, 0.1)
            .expect("locate");
        let second = locate_by_target(&routes, FROM, TO, Metric::Duration, 12_345.0, 0.1)
            .expect("locate");
        assert_eq!(first, second);
    }

    #[rstest]
    fn provider_failure_surfaces() {
        let err = locate_by_target(&FailingRouteProvider, FROM, TO, Metric::Duration, 10.0, 0.1)
            .expect_err("provider fails");
        assert!(matches!(err, PlanError::ProviderUnavailable(_)));
    }
}
