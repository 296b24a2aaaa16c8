//! Capability traits for the external routing and point-of-interest services.
//!
//! The planners never talk to the network themselves. They are handed a
//! [`RouteProvider`] for distances, durations, and polylines and a
//! [`PoiProvider`] for rest areas and fuel stations, which keeps planning
//! deterministic under test doubles.

mod error;
mod poi;
mod route;

pub use error::ProviderError;
pub use poi::{PoiCandidate, PoiCategory, PoiProvider};
pub use route::{GeometryDetail, RouteProvider, RouteSummary};
