//! Errors raised while planning a trip.

use chrono::{DateTime, Utc};
use geo::Coord;
use thiserror::Error;

use crate::{DrivingDurationError, PoiCategory, ProviderError, RepositoryError};

/// Failure of any planning operation.
///
/// No partial itinerary is returned alongside an error and nothing is
/// persisted when one is raised.
#[derive(Debug, Error)]
pub enum PlanError {
    /// A routing or point-of-interest lookup failed outright.
    #[error("provider unavailable: {0}")]
    ProviderUnavailable(#[from] ProviderError),
    /// The router found no path for a leg.
    #[error("no route from ({}, {}) to ({}, {})", from.y, from.x, to.y, to.x)]
    NoRoute {
        /// Leg start.
        from: Coord<f64>,
        /// Leg end.
        to: Coord<f64>,
    },
    /// A synthetic stop was needed but no place was found near the target.
    #[error("no {category} found near ({}, {})", near.y, near.x)]
    NoCandidateFound {
        /// Kind of place searched for.
        category: PoiCategory,
        /// Point the search was centred on.
        near: Coord<f64>,
    },
    /// The requested start precedes driving already on record.
    #[error("planned start {planned} is before the earliest allowed start {earliest}")]
    InvalidPlannedStart {
        /// Requested start.
        planned: DateTime<Utc>,
        /// End of the driving already on record.
        earliest: DateTime<Utc>,
    },
    /// Consecutive stops inserted on one leg did not shorten it, so planning
    /// cannot terminate.
    #[error("inserted stops make no progress near ({}, {})", at.y, at.x)]
    StalledSegment {
        /// Location of the last inserted stop.
        at: Coord<f64>,
    },
    /// Trip history could not be loaded or saved.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    /// A driving segment did not fit the stored representation.
    #[error(transparent)]
    InvalidDrivingDuration(#[from] DrivingDurationError),
    /// Timestamp arithmetic left the representable range.
    #[error("timestamp arithmetic overflowed near {at}")]
    TimestampOutOfRange {
        /// Last representable timestamp before the overflow.
        at: DateTime<Utc>,
    },
}
