//! Persistence seam for trip history.

use std::error::Error as StdError;

use thiserror::Error;

use crate::{DriverId, TripDecomposition, TripId, TripRecord};

/// Errors raised by a [`TripRepository`].
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// The driver is not registered.
    #[error("unknown driver {driver_id}")]
    UnknownDriver {
        /// Rejected driver identifier.
        driver_id: u64,
    },
    /// A segment, break, or fuel event referenced a trip that does not exist.
    #[error("unknown trip reference {trip_id}")]
    UnknownTripReference {
        /// Referenced trip identifier.
        trip_id: u64,
    },
    /// The storage backend failed.
    #[error("trip store failed to {operation}")]
    Backend {
        /// Operation being attempted.
        operation: &'static str,
        /// Underlying backend error.
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },
}

impl RepositoryError {
    /// Wrap a backend error with the operation that raised it.
    pub fn backend(
        operation: &'static str,
        source: impl Into<Box<dyn StdError + Send + Sync>>,
    ) -> Self {
        Self::Backend {
            operation,
            source: source.into(),
        }
    }
}

/// Load and store trip history for the ledger.
///
/// Saving is all-or-nothing: a failed save leaves no trip, segment, break, or
/// fuel event behind.
pub trait TripRepository {
    /// All trips recorded for `driver`, in any order.
    ///
    /// # Errors
    /// Returns [`RepositoryError::UnknownDriver`] when the driver is not
    /// registered, or [`RepositoryError::Backend`] when storage fails.
    fn load_trip_history(&self, driver: DriverId) -> Result<Vec<TripRecord>, RepositoryError>;

    /// Persist a decomposed trip atomically and return its identifier.
    ///
    /// # Errors
    /// Returns [`RepositoryError::UnknownDriver`] when the owning driver is
    /// not registered, or [`RepositoryError::Backend`] when storage fails.
    fn save_trip_decomposition(
        &mut self,
        trip: &TripDecomposition,
    ) -> Result<TripId, RepositoryError>;
}
