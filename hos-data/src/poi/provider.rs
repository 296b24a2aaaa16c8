//! HTTP-based `PoiProvider` using the Overpass API.

use std::time::Duration;

use geo::{Coord, Distance, Haversine, Point};
use hos_core::{PoiCandidate, PoiCategory, PoiProvider, ProviderError};
use log::{debug, warn};

use super::overpass::{OverpassResponse, build_query, fallback_name};
use crate::http::{DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT, HttpBridge, ProviderBuildError};

/// Public Overpass interpreter endpoint.
pub const DEFAULT_OVERPASS_URL: &str = "https://overpass-api.de/api/interpreter";

/// Configuration for [`OverpassPoiProvider`].
#[derive(Debug, Clone)]
pub struct OverpassPoiProviderConfig {
    /// Interpreter endpoint URL.
    pub endpoint: String,
    /// Request timeout duration, also sent as the server-side query timeout.
    pub timeout: Duration,
    /// User agent string for requests.
    pub user_agent: String,
}

impl Default for OverpassPoiProviderConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_OVERPASS_URL.to_owned(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        }
    }
}

impl OverpassPoiProviderConfig {
    /// Create a new configuration with the given interpreter endpoint.
    #[must_use]
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
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
}

/// Rest area and fuel station lookup against an Overpass interpreter.
///
/// Results are ordered by great-circle distance from the query point, so
/// the first candidate is the nearest. Elements without a usable coordinate
/// are dropped; unnamed ones get a category-specific placeholder name.
///
/// # Example
///
/// ```no_run
/// use geo::Coord;
/// use hos_core::{PoiCategory, PoiProvider};
/// use hos_data::poi::OverpassPoiProvider;
///
/// let provider = OverpassPoiProvider::new("https://overpass-api.de/api/interpreter")?;
/// let stations = provider.nearby(Coord { x: -74.0, y: 40.7 }, 10_000.0, PoiCategory::FuelStation)?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug)]
pub struct OverpassPoiProvider {
    bridge: HttpBridge,
    config: OverpassPoiProviderConfig,
}

impl OverpassPoiProvider {
    /// Create a new provider with default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client or Tokio runtime fails to build.
    pub fn new(endpoint: impl Into<String>) -> Result<Self, ProviderBuildError> {
        Self::with_config(OverpassPoiProviderConfig::new(endpoint))
    }

    /// Create a new provider with explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client or Tokio runtime fails to build.
    pub fn with_config(config: OverpassPoiProviderConfig) -> Result<Self, ProviderBuildError> {
        let bridge = HttpBridge::new(&config.user_agent, config.timeout)?;
        Ok(Self { bridge, config })
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &OverpassPoiProviderConfig {
        &self.config
    }

    async fn fetch_async(
        &self,
        location: Coord<f64>,
        radius_m: f64,
        category: PoiCategory,
    ) -> Result<Vec<PoiCandidate>, ProviderError> {
        let query = build_query(location, radius_m, category, self.config.timeout.as_secs());
        debug!("querying Overpass for {category} within {radius_m} m");
        let response: OverpassResponse = self
            .bridge
            .get_json(&self.config.endpoint, &[("data", query.as_str())])
            .await?;
        convert_response(response, location, category)
    }
}

/// Convert an Overpass response into candidates ordered nearest first.
fn convert_response(
    response: OverpassResponse,
    origin: Coord<f64>,
    category: PoiCategory,
) -> Result<Vec<PoiCandidate>, ProviderError> {
    if let Some(remark) = response.remark.filter(|_| response.elements.is_empty()) {
        warn!("Overpass aborted the query: {remark}");
        return Err(ProviderError::ServiceError {
            code: "remark".to_owned(),
            message: remark,
        });
    }

    let from = Point::from(origin);
    let mut ranked: Vec<(f64, PoiCandidate)> = response
        .elements
        .iter()
        .filter_map(|element| {
            let location = element.location()?;
            let name = element.name().unwrap_or(fallback_name(category)).to_owned();
            let distance = Haversine.distance(from, Point::from(location));
            Some((distance, PoiCandidate { location, name }))
        })
        .collect();
    ranked.sort_by(|(left, _), (right, _)| left.total_cmp(right));
    Ok(ranked.into_iter().map(|(_, candidate)| candidate).collect())
}

impl PoiProvider for OverpassPoiProvider {
    fn nearby(
        &self,
        location: Coord<f64>,
        radius_m: f64,
        category: PoiCategory,
    ) -> Result<Vec<PoiCandidate>, ProviderError> {
        self.bridge
            .block_on(self.fetch_async(location, radius_m, category))
    }
}
