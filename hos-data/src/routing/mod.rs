//! HTTP route provider backed by an OSRM routing service.
//!
//! [`HttpRouteProvider`] implements [`hos_core::RouteProvider`] over the OSRM
//! Route API. Summary queries request `overview=false`; full queries request
//! `overview=full&geometries=geojson` so the polyline can be searched by the
//! geometry interpolator.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use hos_data::routing::{HttpRouteProvider, HttpRouteProviderConfig};
//!
//! let config = HttpRouteProviderConfig::new("http://localhost:5000")
//!     .with_timeout(Duration::from_secs(60))
//!     .with_user_agent("my-app/1.0");
//! let provider = HttpRouteProvider::with_config(config)?;
//! # Ok::<(), hos_data::ProviderBuildError>(())
//! ```

mod osrm;
mod provider;

pub use provider::{DEFAULT_OSRM_URL, HttpRouteProvider, HttpRouteProviderConfig};
