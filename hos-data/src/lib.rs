//! Concrete collaborators for the HOS trip planner.
//!
//! Responsibilities:
//! - Route distances, durations, and polylines from an OSRM service
//!   ([`routing`]).
//! - Rest areas and fuel stations from an Overpass interpreter ([`poi`]).
//! - Trip history and the driver registry in SQLite ([`store`]).
//!
//! Boundaries:
//! - Do not encode regulatory rules (they live in `hos-core`).
//! - Present synchronous trait implementations; the async HTTP client is
//!   driven internally.
//!
//! Invariants:
//! - No global mutable state.
//! - A trip and its derived records are stored atomically.

#![forbid(unsafe_code)]

mod http;
pub mod poi;
pub mod routing;
pub mod store;

pub use http::{DEFAULT_USER_AGENT, ProviderBuildError};
pub use poi::{OverpassPoiProvider, OverpassPoiProviderConfig};
pub use routing::{HttpRouteProvider, HttpRouteProviderConfig};
pub use store::{SqliteTripStore, StoreError};
