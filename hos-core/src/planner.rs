//! End-to-end trip planning: ledger, rest stops, fuel stops, timing.

use chrono::{DateTime, Utc};
use geo::Coord;
use log::info;

use crate::fuel::plan_fuel_stops;
use crate::ledger::{CycleState, cycle_state_from_history, distance_since_last_refuel};
use crate::legs::recompute_timing;
use crate::rest::{KeyPoint, plan_rest_stops};
use crate::{
    DriverId, PlanError, PlannerConfig, PoiProvider, RouteProvider, StopKind, TripId, TripRecord,
    TripRepository, Waypoint, decompose_trip,
};

/// Collaborators and configuration shared by the planning stages.
#[derive(Clone, Copy)]
pub struct PlanningContext<'a> {
    /// Route and geometry lookups.
    pub routes: &'a dyn RouteProvider,
    /// Rest area and fuel station lookups.
    pub pois: &'a dyn PoiProvider,
    /// Limits and search parameters.
    pub config: &'a PlannerConfig,
}

impl<'a> PlanningContext<'a> {
    /// Bundle the collaborators for one planning run.
    #[must_use]
    pub const fn new(
        routes: &'a dyn RouteProvider,
        pois: &'a dyn PoiProvider,
        config: &'a PlannerConfig,
    ) -> Self {
        Self {
            routes,
            pois,
            config,
        }
    }
}

/// A request to plan one trip.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlanRequest {
    /// Driver the trip is planned for.
    pub driver_id: DriverId,
    /// Where the driver is now.
    #[cfg_attr(feature = "serde", serde(with = "crate::serde_coord"))]
    pub current: Coord<f64>,
    /// Where the freight is collected.
    #[cfg_attr(feature = "serde", serde(with = "crate::serde_coord"))]
    pub pickup: Coord<f64>,
    /// Where the freight is delivered.
    #[cfg_attr(feature = "serde", serde(with = "crate::serde_coord"))]
    pub dropoff: Coord<f64>,
    /// When the driver intends to start.
    pub planned_start: DateTime<Utc>,
}

impl PlanRequest {
    /// Key points in visiting order.
    #[must_use]
    pub const fn key_points(&self) -> [KeyPoint; 3] {
        [
            KeyPoint::new(StopKind::Origin, self.current),
            KeyPoint::new(StopKind::Pickup, self.pickup),
            KeyPoint::new(StopKind::Dropoff, self.dropoff),
        ]
    }
}

/// A planned itinerary.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TripPlan {
    /// Stops in visiting order with per-leg timing.
    pub waypoints: Vec<Waypoint>,
    /// Routed distance through every waypoint, in metres.
    #[cfg_attr(feature = "serde", serde(rename = "total_distance"))]
    pub total_distance_m: f64,
    /// Distance from the last refuel to the dropoff, when the trip refuels.
    #[cfg_attr(
        feature = "serde",
        serde(
            rename = "distance_to_next_refuel",
            alias = "distance_to_dropoff",
            default,
            skip_serializing_if = "Option::is_none"
        )
    )]
    pub distance_since_last_refuel_m: Option<f64>,
    /// Budgets the driver started with.
    pub cycle: CycleState,
}

/// A plan together with the identifier it was stored under.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedTrip {
    /// The planned itinerary.
    pub plan: TripPlan,
    /// Identifier assigned by the repository.
    pub trip_id: TripId,
}

/// Plans trips against injected routing and point-of-interest providers.
///
/// # Examples
/// ```
/// use chrono::{TimeZone, Utc};
/// use geo::Coord;
/// use hos_core::test_support::{LinearRouteProvider, StubPoiProvider};
/// use hos_core::{DriverId, PlanRequest, TripPlanner};
///
/// let planner = TripPlanner::new(LinearRouteProvider::default(), StubPoiProvider::default());
/// let request = PlanRequest {
///     driver_id: DriverId(1),
///     current: Coord { x: 0.0, y: 0.0 },
///     pickup: Coord { x: 1.0, y: 0.0 },
///     dropoff: Coord { x: 3.0, y: 0.0 },
///     planned_start: Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap(),
/// };
/// let plan = planner.plan(&[], &request)?;
/// assert_eq!(plan.waypoints.len(), 3);
/// # Ok::<(), hos_core::PlanError>(())
/// ```
#[derive(Debug, Clone)]
pub struct TripPlanner<R, P> {
    routes: R,
    pois: P,
    config: PlannerConfig,
}

impl<R, P> TripPlanner<R, P>
where
    R: RouteProvider,
    P: PoiProvider,
{
    /// Planner with the default configuration.
    #[must_use]
    pub fn new(routes: R, pois: P) -> Self {
        Self::with_config(routes, pois, PlannerConfig::default())
    }

    /// Planner with an explicit configuration.
    #[must_use]
    pub const fn with_config(routes: R, pois: P, config: PlannerConfig) -> Self {
        Self {
            routes,
            pois,
            config,
        }
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &PlannerConfig {
        &self.config
    }

    fn context(&self) -> PlanningContext<'_> {
        PlanningContext::new(&self.routes, &self.pois, &self.config)
    }

    /// Plan a trip given the driver's already loaded history.
    ///
    /// # Errors
    /// Propagates every [`PlanError`] raised by the ledger and the planning
    /// stages. No partial itinerary is returned.
    pub fn plan(
        &self,
        history: &[TripRecord],
        request: &PlanRequest,
    ) -> Result<TripPlan, PlanError> {
        let ctx = self.context();
        let cycle = cycle_state_from_history(history, request.planned_start, &self.config.rules)?;
        let range_used = distance_since_last_refuel(history);
        let with_rest = plan_rest_stops(&ctx, &request.key_points(), &cycle)?;
        let fuel = plan_fuel_stops(&ctx, with_rest, range_used)?;
        let mut waypoints = fuel.waypoints;
        recompute_timing(&ctx, &mut waypoints)?;
        info!(
            "planned trip for driver {} with {} waypoints",
            request.driver_id.0,
            waypoints.len()
        );
        Ok(TripPlan {
            waypoints,
            total_distance_m: fuel.total_distance_m,
            distance_since_last_refuel_m: fuel.distance_since_last_refuel_m,
            cycle,
        })
    }

    /// Load the driver's history from `repository`, then plan.
    ///
    /// # Errors
    /// As [`TripPlanner::plan`], plus [`PlanError::Repository`] when the
    /// history cannot be loaded.
    pub fn plan_for<T: TripRepository + ?Sized>(
        &self,
        repository: &T,
        request: &PlanRequest,
    ) -> Result<TripPlan, PlanError> {
        let history = repository.load_trip_history(request.driver_id)?;
        self.plan(&history, request)
    }

    /// Plan a trip and persist its decomposition.
    ///
    /// Nothing is written unless planning succeeds completely.
    ///
    /// # Errors
    /// As [`TripPlanner::plan_for`], plus [`PlanError::Repository`] when the
    /// save fails.
    pub fn plan_and_record<T: TripRepository + ?Sized>(
        &self,
        repository: &mut T,
        request: &PlanRequest,
    ) -> Result<RecordedTrip, PlanError> {
        let plan = self.plan_for(&*repository, request)?;
        let decomposition = decompose_trip(request.driver_id, request.planned_start, &plan)?;
        let trip_id = repository.save_trip_decomposition(&decomposition)?;
        info!("recorded trip {} for driver {}", trip_id.0, request.driver_id.0);
        Ok(RecordedTrip { plan, trip_id })
    }
}
