//! Refuelling stops along an itinerary.

use geo::Coord;

use crate::legs::{ProgressGuard, StopRequest, leg_distance, stop_near};
use crate::{GeometryDetail, Metric, PlanError, PlanningContext, PoiCategory, StopKind, Waypoint};

/// Itinerary with refuelling stops and the distances derived while planning.
#[derive(Debug, Clone, PartialEq)]
pub struct FuelPlan {
    /// Final itinerary.
    pub waypoints: Vec<Waypoint>,
    /// Routed distance through every waypoint, in metres.
    pub total_distance_m: f64,
    /// Distance from the last inserted refuel to the end of the itinerary.
    /// `None` when no refuel was needed.
    pub distance_since_last_refuel_m: Option<f64>,
}

/// Insert refuelling stops wherever the tank range runs out.
///
/// `range_used_m` is the distance already driven on the current tank when
/// the itinerary starts, so the first refuel comes after
/// `tank_range_m - range_used_m` metres.
///
/// # Errors
/// Returns [`PlanError::NoRoute`] or [`PlanError::ProviderUnavailable`] when
/// routing fails, [`PlanError::NoCandidateFound`] when no fuel station is
/// found near a required stop, and [`PlanError::StalledSegment`] when
/// inserted stations stop making progress along a leg.
#[expect(
    clippy::float_arithmetic,
    reason = "fuel range bookkeeping works in metres"
)]
pub fn plan_fuel_stops(
    ctx: &PlanningContext<'_>,
    waypoints: Vec<Waypoint>,
    range_used_m: f64,
) -> Result<FuelPlan, PlanError> {
    let tank = ctx.config.tank_range_m;
    let mut since_refuel = range_used_m.max(0.0);
    let mut refuelled = false;
    let mut planned: Vec<Waypoint> = Vec::with_capacity(waypoints.len());
    let mut stops = waypoints.into_iter();

    if let Some(first) = stops.next() {
        let mut origin = first.location;
        planned.push(first);
        for waypoint in stops {
            let mut leg = leg_distance(ctx, origin, waypoint.location)?;
            let mut guard = ProgressGuard::default();
            while since_refuel + leg > tank {
                let offset = tank - since_refuel;
                let station = stop_near(
                    ctx,
                    StopRequest {
                        from: origin,
                        to: waypoint.location,
                        metric: Metric::Distance,
                        target: offset,
                        category: PoiCategory::FuelStation,
                        kind: StopKind::Refuel,
                    },
                )?;
                let next = leg_distance(ctx, station.location, waypoint.location)?;
                guard.observe(leg, next, station.location)?;
                since_refuel = 0.0;
                refuelled = true;
                origin = station.location;
                planned.push(station);
                leg = next;
            }
            since_refuel += leg;
            origin = waypoint.location;
            planned.push(waypoint);
        }
    }

    let total_distance_m = total_distance(ctx, &planned)?;
    Ok(FuelPlan {
        waypoints: planned,
        total_distance_m,
        distance_since_last_refuel_m: refuelled.then_some(since_refuel),
    })
}

/// Routed distance through every waypoint; a lone waypoint goes nowhere.
fn total_distance(ctx: &PlanningContext<'_>, waypoints: &[Waypoint]) -> Result<f64, PlanError> {
    let (Some(first), Some(last)) = (waypoints.first(), waypoints.last()) else {
        return Ok(0.0);
    };
    if waypoints.len() < 2 {
        return Ok(0.0);
    }
    let points: Vec<Coord<f64>> = waypoints.iter().map(|w| w.location).collect();
    ctx.routes
        .route(&points, GeometryDetail::Summary)?
        .map(|route| route.distance_m)
        .ok_or(PlanError::NoRoute {
            from: first.location,
            to: last.location,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{LinearRouteProvider, StubPoi, StubPoiProvider};
    use crate::{HosRules, PlannerConfig, PoiCandidate, ProviderError, RouteProvider, RouteSummary};
    use rstest::{fixture, rstest};

    /// Routes single legs but cannot join more than two points.
    #[derive(Debug, Default)]
    struct PairwiseRouteProvider {
        inner: LinearRouteProvider,
    }

    impl RouteProvider for PairwiseRouteProvider {
        fn route(
            &self,
            points: &[Coord<f64>],
            detail: GeometryDetail,
        ) -> Result<Option<RouteSummary>, ProviderError> {
            if points.len() > 2 {
                return Ok(None);
            }
            self.inner.route(points, detail)
        }
    }

    fn station(x: f64) -> PoiCandidate {
        PoiCandidate {
            location: Coord { x, y: 0.0 },
            name: format!("Station {x}"),
        }
    }

    #[fixture]
    fn routes() -> LinearRouteProvider {
        LinearRouteProvider::default()
    }

    /// One coordinate unit is 90 km; a 1 000 km tank covers about 11.1 units.
    fn config() -> PlannerConfig {
        PlannerConfig::default().with_tank_range_m(1_000_000.0)
    }

    fn itinerary(xs: &[f64]) -> Vec<Waypoint> {
        let rules = HosRules::default();
        xs.iter()
            .enumerate()
            .map(|(i, x)| {
                let kind = if i == 0 {
                    StopKind::Origin
                } else {
                    StopKind::Pickup
                };
                Waypoint::key_stop(kind, Coord { x: *x, y: 0.0 }, &rules)
            })
            .collect()
    }

    #[rstest]
    fn within_range_adds_nothing(routes: LinearRouteProvider) {
        let config = config();
        let pois = StubPoiProvider::default();
        let ctx = PlanningContext::new(&routes, &pois, &config);
        let plan = plan_fuel_stops(&ctx, itinerary(&[0.0, 5.0, 10.0]), 0.0).expect("plan");
        assert_eq!(plan.waypoints.len(), 3);
        assert!((plan.total_distance_m - 900_000.0).abs() < 1e-6);
        assert_eq!(plan.distance_since_last_refuel_m, None);
    }

    #[rstest]
    fn long_leg_gets_one_refuel_within_range(routes: LinearRouteProvider) {
        let config = config();
        let pois = StubPoiProvider::default();
        let ctx = PlanningContext::new(&routes, &pois, &config);
        let plan = plan_fuel_stops(&ctx, itinerary(&[0.0, 5.0, 16.0]), 0.0).expect("plan");
        let refuels: Vec<&Waypoint> = plan
            .waypoints
            .iter()
            .filter(|w| w.kind == StopKind::Refuel)
            .collect();
        assert_eq!(refuels.len(), 1);
        let station = refuels.first().expect("refuel present");
        assert!(station.location.x * 90_000.0 <= 1_000_000.0);
        assert!(station.label.starts_with("refueling - "));
        let remaining = plan.distance_since_last_refuel_m.expect("refuelled");
        assert!((remaining - (16.0 - station.location.x) * 90_000.0).abs() < 1e-6);
    }

    #[rstest]
    fn used_range_brings_the_first_refuel_forward(routes: LinearRouteProvider) {
        let config = config();
        let pois = StubPoiProvider::default();
        let ctx = PlanningContext::new(&routes, &pois, &config);
        let plan = plan_fuel_stops(&ctx, itinerary(&[0.0, 5.0]), 900_000.0).expect("plan");
        let station = plan.waypoints.get(1).expect("refuel inserted");
        assert_eq!(station.kind, StopKind::Refuel);
        assert!(station.location.x * 90_000.0 <= 100_000.0);
    }

    #[rstest]
    fn no_station_is_fatal(routes: LinearRouteProvider) {
        let config = config();
        let pois = StubPoiProvider::new(StubPoi::Empty);
        let ctx = PlanningContext::new(&routes, &pois, &config);
        let err = plan_fuel_stops(&ctx, itinerary(&[0.0, 20.0]), 0.0).expect_err("no station");
        assert!(matches!(
            err,
            PlanError::NoCandidateFound {
                category: PoiCategory::FuelStation,
                ..
            }
        ));
    }

    #[rstest]
    fn station_that_never_helps_stalls(routes: LinearRouteProvider) {
        let config = config();
        let pois = StubPoiProvider::new(StubPoi::Fixed(vec![station(-1.0)]));
        let ctx = PlanningContext::new(&routes, &pois, &config);
        let err = plan_fuel_stops(&ctx, itinerary(&[0.0, 20.0]), 0.0).expect_err("stalls");
        assert!(matches!(err, PlanError::StalledSegment { .. }));
    }

    #[rstest]
    fn station_past_the_range_is_skipped(routes: LinearRouteProvider) {
        let config = config();
        // 11.3 units is 1 017 km from the origin, past the 1 000 km tank.
        let pois =
            StubPoiProvider::new(StubPoi::Fixed(vec![station(11.3), station(10.5)]));
        let ctx = PlanningContext::new(&routes, &pois, &config);
        let plan = plan_fuel_stops(&ctx, itinerary(&[0.0, 16.0]), 0.0).expect("plan");
        let refuel = plan.waypoints.get(1).expect("refuel inserted");
        assert_eq!(refuel.kind, StopKind::Refuel);
        assert_eq!(refuel.location, Coord { x: 10.5, y: 0.0 });
    }

    #[rstest]
    fn only_station_past_the_range_is_fatal(routes: LinearRouteProvider) {
        let config = config();
        let pois = StubPoiProvider::new(StubPoi::Fixed(vec![station(11.3)]));
        let ctx = PlanningContext::new(&routes, &pois, &config);
        let err = plan_fuel_stops(&ctx, itinerary(&[0.0, 16.0]), 0.0)
            .expect_err("no station within range");
        assert!(matches!(
            err,
            PlanError::NoCandidateFound {
                category: PoiCategory::FuelStation,
                ..
            }
        ));
    }

    #[rstest]
    fn unroutable_itinerary_reports_no_route() {
        let config = config();
        let routes = PairwiseRouteProvider::default();
        let pois = StubPoiProvider::default();
        let ctx = PlanningContext::new(&routes, &pois, &config);
        let err = plan_fuel_stops(&ctx, itinerary(&[0.0, 2.0, 4.0]), 0.0)
            .expect_err("the whole itinerary has no route");
        match err {
            PlanError::NoRoute { from, to } => {
                assert_eq!(from, Coord { x: 0.0, y: 0.0 });
                assert_eq!(to, Coord { x: 4.0, y: 0.0 });
            }
            other => panic!("expected NoRoute, found {other:?}"),
        }
    }

    #[rstest]
    fn single_waypoint_has_no_distance(routes: LinearRouteProvider) {
        let config = config();
        let pois = StubPoiProvider::default();
        let ctx = PlanningContext::new(&routes, &pois, &config);
        let plan = plan_fuel_stops(&ctx, itinerary(&[3.0]), 0.0).expect("plan");
        assert_eq!(plan.waypoints.len(), 1);
        assert!(plan.total_distance_m.abs() < 1e-9);
    }
}
