//! Facade crate for the HOS trip planner.
//!
//! This crate re-exports the core planning API and exposes the HTTP
//! collaborators and the SQLite trip store behind feature flags.

#![forbid(unsafe_code)]

pub use hos_core::{
    ActivityType, BreakPeriod, BreakReason, CycleState, Driver, DriverId, DrivingDuration,
    DrivingSegment, FuelEvent, FuelPlan, GeometryDetail, HosRules, KeyPoint, Metric, PlanError,
    PlanRequest, PlannerConfig, PoiCandidate, PoiCategory, PoiProvider, ProviderError,
    RecordedTrip, RepositoryError, RouteProvider, RouteSummary, StopKind, TripDecomposition,
    TripId, TripPlan, TripPlanner, TripRecord, TripRepository, Waypoint, decompose_trip,
    locate_by_target, plan_fuel_stops, plan_rest_stops, resolve_cycle_state,
};

#[cfg(feature = "http-providers")]
pub use hos_data::{
    HttpRouteProvider, HttpRouteProviderConfig, OverpassPoiProvider, OverpassPoiProviderConfig,
    ProviderBuildError,
};

#[cfg(feature = "store-sqlite")]
pub use hos_data::{SqliteTripStore, StoreError};
