//! Route provider trait and the summary it returns.

use std::time::Duration;

use geo::Coord;

use super::error::ProviderError;

/// How much geometry a route query should return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeometryDetail {
    /// Distance and duration only.
    Summary,
    /// Distance, duration, and the full polyline.
    Full,
}

/// Distance, duration, and optional polyline of a routed path.
///
/// Coordinates are WGS84 with `x = longitude` and `y = latitude`.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteSummary {
    /// Total travel distance in metres.
    pub distance_m: f64,
    /// Total travel duration.
    pub duration: Duration,
    /// Polyline from the first to the last input point. Empty unless
    /// [`GeometryDetail::Full`] was requested.
    pub geometry: Vec<Coord<f64>>,
}

/// Route an ordered list of coordinates.
///
/// Implementations return `Ok(None)` when fewer than two points are given or
/// when no path exists between them.
///
/// # Examples
///
/// ```rust
/// use std::time::Duration;
/// use geo::Coord;
/// use hos_core::{GeometryDetail, ProviderError, RouteProvider, RouteSummary};
///
/// struct Teleport;
///
/// impl RouteProvider for Teleport {
///     fn route(
///         &self,
///         points: &[Coord<f64>],
///         _detail: GeometryDetail,
///     ) -> Result<Option<RouteSummary>, ProviderError> {
///         if points.len() < 2 {
///             return Ok(None);
///         }
///         Ok(Some(RouteSummary {
///             distance_m: 0.0,
///             duration: Duration::ZERO,
///             geometry: points.to_vec(),
///         }))
///     }
/// }
///
/// let origin = Coord { x: 0.0, y: 0.0 };
/// assert!(Teleport.route(&[origin], GeometryDetail::Summary)?.is_none());
/// # Ok::<(), ProviderError>(())
/// ```
pub trait RouteProvider {
    /// Route through `points` in order.
    fn route(
        &self,
        points: &[Coord<f64>],
        detail: GeometryDetail,
    ) -> Result<Option<RouteSummary>, ProviderError>;
}

impl<T: RouteProvider + ?Sized> RouteProvider for &T {
    fn route(
        &self,
        points: &[Coord<f64>],
        detail: GeometryDetail,
    ) -> Result<Option<RouteSummary>, ProviderError> {
        (**self).route(points, detail)
    }
}

impl<T: RouteProvider + ?Sized> RouteProvider for Box<T> {
    fn route(
        &self,
        points: &[Coord<f64>],
        detail: GeometryDetail,
    ) -> Result<Option<RouteSummary>, ProviderError> {
        (**self).route(points, detail)
    }
}
