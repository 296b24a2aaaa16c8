//! OSRM API response types for the Route service.
//!
//! See: <http://project-osrm.org/docs/v5.24.0/api/#route-service>

use serde::Deserialize;

/// OSRM status code returned when the coordinates cannot be connected.
pub const NO_ROUTE: &str = "NoRoute";

/// OSRM Route API response.
///
/// The response contains candidate routes on success or an error message on
/// failure. The `code` field indicates the response status.
#[derive(Debug, Deserialize)]
pub struct RouteResponse {
    /// Status code from OSRM.
    ///
    /// Common values:
    /// - `"Ok"` - Request was successful
    /// - `"NoRoute"` - No route between the coordinates
    /// - `"NoSegment"` - A coordinate could not be snapped to the network
    /// - `"InvalidQuery"` - Invalid query parameters
    pub code: String,

    /// Optional error message when `code` is not `"Ok"`.
    pub message: Option<String>,

    /// Candidate routes, best first.
    #[serde(default)]
    pub routes: Vec<Route>,
}

impl RouteResponse {
    /// Check if the response indicates success.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.code == "Ok"
    }

    /// Check if the service found no path between the coordinates.
    #[must_use]
    pub fn is_no_route(&self) -> bool {
        self.code == NO_ROUTE
    }
}

/// One routed path.
#[derive(Debug, Deserialize)]
pub struct Route {
    /// Distance in metres.
    pub distance: f64,
    /// Duration in seconds.
    pub duration: f64,
    /// `GeoJSON` line geometry, present when an overview was requested.
    #[serde(default)]
    pub geometry: Option<LineGeometry>,
}

/// `GeoJSON` `LineString` geometry with `[lon, lat]` positions.
#[derive(Debug, Deserialize)]
pub struct LineGeometry {
    /// Polyline vertices.
    pub coordinates: Vec<[f64; 2]>,
}
