//! Deterministic providers and an in-memory repository used by unit and
//! behaviour tests.

use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;

use geo::Coord;

use crate::{
    DriverId, GeometryDetail, PoiCandidate, PoiCategory, PoiProvider, ProviderError,
    RepositoryError, RouteProvider, RouteSummary, TripDecomposition, TripId, TripRecord,
    TripRepository,
};

/// Router that drives in straight lines across a flat plane.
///
/// One coordinate unit is `metres_per_unit` metres and the truck always
/// travels at `speed_mps`. With the defaults one unit is 90 km and takes
/// exactly one hour.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearRouteProvider {
    /// Metres represented by one coordinate unit.
    pub metres_per_unit: f64,
    /// Constant travel speed in metres per second.
    pub speed_mps: f64,
    /// Polyline vertices generated per routed leg.
    pub vertices_per_leg: u32,
}

impl Default for LinearRouteProvider {
    fn default() -> Self {
        Self {
            metres_per_unit: 90_000.0,
            speed_mps: 25.0,
            vertices_per_leg: 100,
        }
    }
}

#[expect(
    clippy::float_arithmetic,
    reason = "straight-line routing is planar arithmetic"
)]
impl LinearRouteProvider {
    fn leg_metres(&self, a: Coord<f64>, b: Coord<f64>) -> f64 {
        (b.x - a.x).hypot(b.y - a.y) * self.metres_per_unit
    }

    fn densify(&self, points: &[Coord<f64>]) -> Vec<Coord<f64>> {
        let mut geometry: Vec<Coord<f64>> = points.first().copied().into_iter().collect();
        for pair in points.windows(2) {
            let [a, b] = pair else { continue };
            for step in 1..=self.vertices_per_leg {
                let t = f64::from(step) / f64::from(self.vertices_per_leg);
                geometry.push(Coord {
                    x: a.x + (b.x - a.x) * t,
                    y: a.y + (b.y - a.y) * t,
                });
            }
        }
        geometry
    }
}

impl RouteProvider for LinearRouteProvider {
    #[expect(
        clippy::float_arithmetic,
        reason = "duration derives from distance and speed"
    )]
    fn route(
        &self,
        points: &[Coord<f64>],
        detail: GeometryDetail,
    ) -> Result<Option<RouteSummary>, ProviderError> {
        if points.len() < 2 {
            return Ok(None);
        }
        let distance_m: f64 = points
            .windows(2)
            .map(|pair| match pair {
                [a, b] => self.leg_metres(*a, *b),
                _ => 0.0,
            })
            .sum();
        let duration = Duration::try_from_secs_f64(distance_m / self.speed_mps).map_err(|err| {
            ProviderError::ParseError {
                message: err.to_string(),
            }
        })?;
        let geometry = match detail {
            GeometryDetail::Summary => Vec::new(),
            GeometryDetail::Full => self.densify(points),
        };
        Ok(Some(RouteSummary {
            distance_m,
            duration,
            geometry,
        }))
    }
}

/// Router whose every call fails with a network error.
#[derive(Debug, Default, Clone, Copy)]
pub struct FailingRouteProvider;

impl RouteProvider for FailingRouteProvider {
    fn route(
        &self,
        _points: &[Coord<f64>],
        _detail: GeometryDetail,
    ) -> Result<Option<RouteSummary>, ProviderError> {
        Err(ProviderError::NetworkError {
            url: "stub://route".to_owned(),
            message: "router offline".to_owned(),
        })
    }
}

/// Canned answers returned by [`StubPoiProvider`].
#[derive(Debug, Clone, Default, PartialEq)]
pub enum StubPoi {
    /// One candidate exactly at the query location.
    #[default]
    AtQuery,
    /// No candidates at all.
    Empty,
    /// The same candidates for every query.
    Fixed(Vec<PoiCandidate>),
    /// Every call fails.
    Failing,
}

/// Point-of-interest provider with canned answers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StubPoiProvider {
    mode: StubPoi,
}

impl StubPoiProvider {
    /// Build a provider answering in the given mode.
    #[must_use]
    pub const fn new(mode: StubPoi) -> Self {
        Self { mode }
    }

    /// Provider that never finds anything.
    #[must_use]
    pub const fn empty() -> Self {
        Self::new(StubPoi::Empty)
    }
}

impl PoiProvider for StubPoiProvider {
    fn nearby(
        &self,
        location: Coord<f64>,
        _radius_m: f64,
        category: PoiCategory,
    ) -> Result<Vec<PoiCandidate>, ProviderError> {
        match &self.mode {
            StubPoi::AtQuery => Ok(vec![PoiCandidate {
                location,
                name: format!("Stub {category}"),
            }]),
            StubPoi::Empty => Ok(Vec::new()),
            StubPoi::Fixed(candidates) => Ok(candidates.clone()),
            StubPoi::Failing => Err(ProviderError::Timeout {
                url: "stub://poi".to_owned(),
                timeout_secs: 1,
            }),
        }
    }
}

/// In-memory [`TripRepository`] keyed by driver.
#[derive(Debug, Default, Clone)]
pub struct MemoryTripRepository {
    drivers: BTreeSet<DriverId>,
    trips: BTreeMap<TripId, TripDecomposition>,
    next_id: u64,
}

impl MemoryTripRepository {
    /// Repository with the given drivers registered and no trips.
    #[must_use]
    pub fn with_drivers<I>(drivers: I) -> Self
    where
        I: IntoIterator<Item = DriverId>,
    {
        Self {
            drivers: drivers.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Number of trips stored so far.
    #[must_use]
    pub fn trip_count(&self) -> usize {
        self.trips.len()
    }

    fn ensure_driver(&self, driver: DriverId) -> Result<(), RepositoryError> {
        if self.drivers.contains(&driver) {
            Ok(())
        } else {
            Err(RepositoryError::UnknownDriver {
                driver_id: driver.0,
            })
        }
    }
}

impl TripRepository for MemoryTripRepository {
    fn load_trip_history(&self, driver: DriverId) -> Result<Vec<TripRecord>, RepositoryError> {
        self.ensure_driver(driver)?;
        Ok(self
            .trips
            .iter()
            .filter(|(_, trip)| trip.driver == driver)
            .map(|(id, trip)| TripRecord {
                id: *id,
                trip: trip.clone(),
            })
            .collect())
    }

    fn save_trip_decomposition(
        &mut self,
        trip: &TripDecomposition,
    ) -> Result<TripId, RepositoryError> {
        self.ensure_driver(trip.driver)?;
        self.next_id = self.next_id.saturating_add(1);
        let id = TripId(self.next_id);
        self.trips.insert(id, trip.clone());
        Ok(id)
    }
}
