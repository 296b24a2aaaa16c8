//! Point-of-interest lookup used to snap synthetic stops to real places.

use std::fmt;

use geo::Coord;

use super::error::ProviderError;

/// Kind of place a synthetic stop needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum PoiCategory {
    /// Somewhere a truck can park for a break or a night.
    RestArea,
    /// A fuel station.
    FuelStation,
}

impl fmt::Display for PoiCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RestArea => f.write_str("rest area"),
            Self::FuelStation => f.write_str("fuel station"),
        }
    }
}

/// A place returned by a [`PoiProvider`].
#[derive(Debug, Clone, PartialEq)]
pub struct PoiCandidate {
    /// Location with `x = longitude` and `y = latitude`.
    pub location: Coord<f64>,
    /// Display name.
    pub name: String,
}

/// Search for places of a category around a coordinate.
///
/// Results are ordered nearest first. An empty list is a valid answer; it is
/// the caller's decision whether that is fatal.
pub trait PoiProvider {
    /// Return candidates within `radius_m` metres of `location`.
    fn nearby(
        &self,
        location: Coord<f64>,
        radius_m: f64,
        category: PoiCategory,
    ) -> Result<Vec<PoiCandidate>, ProviderError>;
}

impl<T: PoiProvider + ?Sized> PoiProvider for &T {
    fn nearby(
        &self,
        location: Coord<f64>,
        radius_m: f64,
        category: PoiCategory,
    ) -> Result<Vec<PoiCandidate>, ProviderError> {
        (**self).nearby(location, radius_m, category)
    }
}

impl<T: PoiProvider + ?Sized> PoiProvider for Box<T> {
    fn nearby(
        &self,
        location: Coord<f64>,
        radius_m: f64,
        category: PoiCategory,
    ) -> Result<Vec<PoiCandidate>, ProviderError> {
        (**self).nearby(location, radius_m, category)
    }
}
