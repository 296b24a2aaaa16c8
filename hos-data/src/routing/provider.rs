//! HTTP-based `RouteProvider` using OSRM's Route API.
//!
//! # Example
//!
//! ```no_run
//! use geo::Coord;
//! use hos_core::{GeometryDetail, RouteProvider};
//! use hos_data::routing::HttpRouteProvider;
//!
//! let provider = HttpRouteProvider::new("http://localhost:5000")?;
//! let route = provider.route(
//!     &[Coord { x: -74.0, y: 40.7 }, Coord { x: -75.1, y: 39.9 }],
//!     GeometryDetail::Summary,
//! )?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::time::Duration;

use geo::Coord;
use hos_core::{GeometryDetail, ProviderError, RouteProvider, RouteSummary};
use log::{debug, warn};
use reqwest::StatusCode;

use super::osrm::RouteResponse;
use crate::http::{
    DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT, HttpBridge, ProviderBuildError, decode,
};

/// Public OSRM demo server.
pub const DEFAULT_OSRM_URL: &str = "https://router.project-osrm.org";

/// Configuration for [`HttpRouteProvider`].
#[derive(Debug, Clone)]
pub struct HttpRouteProviderConfig {
    /// Base URL for the OSRM service (e.g., `"http://localhost:5000"`).
    pub base_url: String,
    /// Routing profile segment of the URL.
    pub profile: String,
    /// Request timeout duration.
    pub timeout: Duration,
    /// User agent string for requests.
    pub user_agent: String,
}

impl Default for HttpRouteProviderConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_OSRM_URL.to_owned(),
            profile: "driving".to_owned(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        }
    }
}

impl HttpRouteProviderConfig {
    /// Create a new configuration with the given base URL.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Set the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the user agent string.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set the routing profile.
    #[must_use]
    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = profile.into();
        self
    }
}

/// HTTP-based route provider using the OSRM Route API.
///
/// This provider implements the synchronous [`RouteProvider`] trait by
/// blocking on asynchronous HTTP requests. It owns a Tokio runtime that is
/// reused across calls.
///
/// OSRM answers some failures, including `NoRoute`, with HTTP 400 and a JSON
/// body. Those bodies are decoded so that "no route" surfaces as `Ok(None)`
/// and other codes as [`ProviderError::ServiceError`].
#[derive(Debug)]
pub struct HttpRouteProvider {
    bridge: HttpBridge,
    config: HttpRouteProviderConfig,
}

impl HttpRouteProvider {
    /// Create a new provider with default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client or Tokio runtime fails to build.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ProviderBuildError> {
        Self::with_config(HttpRouteProviderConfig::new(base_url))
    }

    /// Create a new provider with explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client or Tokio runtime fails to build.
    pub fn with_config(config: HttpRouteProviderConfig) -> Result<Self, ProviderBuildError> {
        let bridge = HttpBridge::new(&config.user_agent, config.timeout)?;
        Ok(Self { bridge, config })
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &HttpRouteProviderConfig {
        &self.config
    }

    /// Build the OSRM Route API URL for the given points.
    ///
    /// The URL format is: `{base_url}/route/v1/{profile}/{coordinates}`
    /// where coordinates are semicolon-separated `lon,lat` pairs.
    fn build_route_url(&self, points: &[Coord<f64>]) -> String {
        let coords: String = points
            .iter()
            .map(|point| format!("{},{}", point.x, point.y))
            .collect::<Vec<_>>()
            .join(";");

        format!(
            "{}/route/v1/{}/{}",
            self.config.base_url.trim_end_matches('/'),
            self.config.profile,
            coords
        )
    }

    async fn fetch_route_async(
        &self,
        points: &[Coord<f64>],
        detail: GeometryDetail,
    ) -> Result<Option<RouteSummary>, ProviderError> {
        let url = self.build_route_url(points);
        let response = self.bridge.send(&url, query_for(detail)).await?;
        let body: RouteResponse = if response.status() == StatusCode::BAD_REQUEST {
            decode(response).await?
        } else {
            let checked = response
                .error_for_status()
                .map_err(|err| self.bridge.convert_reqwest_error(&err, &url))?;
            decode(checked).await?
        };
        convert_response(body, detail)
    }
}

const fn query_for(detail: GeometryDetail) -> &'static [(&'static str, &'static str)] {
    match detail {
        GeometryDetail::Summary => &[("overview", "false")],
        GeometryDetail::Full => &[("overview", "full"), ("geometries", "geojson")],
    }
}

/// Convert an OSRM response to a [`RouteSummary`].
fn convert_response(
    response: RouteResponse,
    detail: GeometryDetail,
) -> Result<Option<RouteSummary>, ProviderError> {
    if response.is_no_route() {
        debug!("OSRM reported no route");
        return Ok(None);
    }
    if !response.is_ok() {
        return Err(ProviderError::ServiceError {
            code: response.code,
            message: response.message.unwrap_or_default(),
        });
    }
    let Some(route) = response.routes.into_iter().next() else {
        return Ok(None);
    };

    let duration = Duration::try_from_secs_f64(route.duration).map_err(|err| {
        warn!("OSRM returned unusable duration {}", route.duration);
        ProviderError::ParseError {
            message: format!("invalid route duration {}: {err}", route.duration),
        }
    })?;
    if !(route.distance.is_finite() && route.distance >= 0.0) {
        warn!("OSRM returned unusable distance {}", route.distance);
        return Err(ProviderError::ParseError {
            message: format!("invalid route distance {}", route.distance),
        });
    }

    let geometry = match detail {
        GeometryDetail::Summary => Vec::new(),
        GeometryDetail::Full => route
            .geometry
            .ok_or_else(|| ProviderError::ParseError {
                message: "OSRM response missing route geometry".to_owned(),
            })?
            .coordinates
            .into_iter()
            .map(|[lon, lat]| Coord { x: lon, y: lat })
            .collect(),
    };

    Ok(Some(RouteSummary {
        distance_m: route.distance,
        duration,
        geometry,
    }))
}

impl RouteProvider for HttpRouteProvider {
    /// Route through `points` in order.
    ///
    /// # Runtime requirements
    ///
    /// When called from within an existing Tokio runtime, the runtime must be
    /// multi-threaded. From a `current_thread` runtime the provider falls back
    /// to its own internal runtime, which blocks the caller's runtime.
    fn route(
        &self,
        points: &[Coord<f64>],
        detail: GeometryDetail,
    ) -> Result<Option<RouteSummary>, ProviderError> {
        if points.len() < 2 {
            return Ok(None);
        }
        self.bridge.block_on(self.fetch_route_async(points, detail))
    }
}
