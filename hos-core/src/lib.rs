//! Core planning engine for Hours-of-Service compliant truck trips.
//!
//! The crate turns a driver's current position, a pickup, and a dropoff into
//! an itinerary that respects driving-time regulation and fuel range:
//!
//! 1. the [`ledger`] resolves how much driving budget a driver has left from
//!    their trip history;
//! 2. the [`rest`] planner walks the key stops and inserts short breaks and
//!    sleeper stops as budgets run out;
//! 3. the [`fuel`] planner inserts refuelling stops whenever the tank range is
//!    exhausted;
//! 4. [`decompose`] turns the final itinerary into the persisted trip record.
//!
//! Routing and point-of-interest lookups are external collaborators injected
//! through the [`RouteProvider`] and [`PoiProvider`] traits, and persistence
//! goes through [`TripRepository`]. Nothing in this crate performs I/O.

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod decompose;
mod error;
pub mod fuel;
pub mod interpolate;
mod legs;
pub mod ledger;
mod planner;
pub mod provider;
mod repository;
pub mod rest;
mod rules;
#[cfg(feature = "serde")]
mod serde_coord;
mod trip;
mod waypoint;

#[doc(hidden)]
pub mod test_support;

pub use decompose::decompose_trip;
pub use error::PlanError;
pub use fuel::{FuelPlan, plan_fuel_stops};
pub use interpolate::{Metric, locate_by_target};
pub use ledger::{
    CycleState, cycle_state_from_history, distance_since_last_refuel, resolve_cycle_state,
};
pub use planner::{PlanRequest, PlanningContext, RecordedTrip, TripPlan, TripPlanner};
pub use provider::{
    GeometryDetail, PoiCandidate, PoiCategory, PoiProvider, ProviderError, RouteProvider,
    RouteSummary,
};
pub use repository::{RepositoryError, TripRepository};
pub use rest::{KeyPoint, plan_rest_stops};
pub use rules::{HosRules, METRES_PER_MILE, PlannerConfig};
pub use trip::{
    BreakPeriod, BreakReason, Driver, DriverId, DrivingDuration, DrivingDurationError,
    DrivingSegment, FuelEvent, TripDecomposition, TripId, TripRecord,
};
pub use waypoint::{ActivityType, StopKind, Waypoint};
