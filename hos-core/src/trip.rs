//! Persisted trip model: drivers, driving segments, breaks, and fuel events.

use std::time::Duration;

use chrono::{DateTime, NaiveTime, Timelike, Utc};
use thiserror::Error;

use crate::Waypoint;

const DAY: Duration = Duration::from_secs(24 * 3600);

/// Identifier of a registered driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct DriverId(pub u64);

/// Identifier of a persisted trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct TripId(pub u64);

/// A registered driver.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Driver {
    /// Stable identifier.
    pub id: DriverId,
    /// Display name.
    pub name: String,
    /// Unique contact address.
    pub email: String,
}

/// Raised when a driving duration does not fit in a single day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DrivingDurationError {
    /// The duration was 24 hours or longer.
    #[error("driving duration of {seconds}s must be shorter than 24 hours")]
    OutOfRange {
        /// Rejected duration in whole seconds.
        seconds: u64,
    },
}

/// Driving time within one segment, always shorter than a day.
///
/// Segments are stored as a time-of-day value, so anything that would wrap
/// past midnight is rejected up front instead of being silently truncated.
///
/// # Examples
/// ```
/// use std::time::Duration;
/// use hos_core::DrivingDuration;
///
/// let five_hours = DrivingDuration::new(Duration::from_secs(5 * 3600))?;
/// assert_eq!(five_hours.to_time_of_day().to_string(), "05:00:00");
/// assert!(DrivingDuration::new(Duration::from_secs(24 * 3600)).is_err());
/// # Ok::<(), hos_core::DrivingDurationError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "Duration", into = "Duration"))]
pub struct DrivingDuration(Duration);

impl DrivingDuration {
    /// Validate and wrap a duration.
    ///
    /// # Errors
    /// Returns [`DrivingDurationError::OutOfRange`] for 24 hours or more.
    pub const fn new(duration: Duration) -> Result<Self, DrivingDurationError> {
        if duration.as_secs() >= DAY.as_secs() {
            return Err(DrivingDurationError::OutOfRange {
                seconds: duration.as_secs(),
            });
        }
        Ok(Self(duration))
    }

    /// The wrapped duration.
    #[must_use]
    pub const fn get(self) -> Duration {
        self.0
    }

    /// Render as a wall-clock time after midnight.
    #[must_use]
    pub fn to_time_of_day(self) -> NaiveTime {
        let seconds = u32::try_from(self.0.as_secs()).unwrap_or(u32::MAX);
        NaiveTime::from_num_seconds_from_midnight_opt(seconds, self.0.subsec_nanos())
            .unwrap_or(NaiveTime::MIN)
    }

    /// Read back a duration stored as a wall-clock time.
    #[must_use]
    pub fn from_time_of_day(time: NaiveTime) -> Self {
        Self(
            Duration::from_secs(u64::from(time.num_seconds_from_midnight()))
                + Duration::from_nanos(u64::from(time.nanosecond() % 1_000_000_000)),
        )
    }
}

impl TryFrom<Duration> for DrivingDuration {
    type Error = DrivingDurationError;

    fn try_from(value: Duration) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<DrivingDuration> for Duration {
    fn from(value: DrivingDuration) -> Self {
        value.0
    }
}

/// Continuous driving between two on-duty or off-duty stops.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DrivingSegment {
    /// When the wheels started turning.
    pub start: DateTime<Utc>,
    /// How long the segment lasted.
    pub driving: DrivingDuration,
}

/// Why a driver stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum BreakReason {
    /// Short break or sleeper rest.
    Rest,
    /// Refuelling.
    Refuel,
    /// Loading at the pickup.
    Pickup,
    /// Unloading at the dropoff.
    Dropoff,
}

impl BreakReason {
    /// Stable lowercase name used in storage.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Rest => "rest",
            Self::Refuel => "refuel",
            Self::Pickup => "pickup",
            Self::Dropoff => "dropoff",
        }
    }

    /// Parse the storage name back.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "rest" => Some(Self::Rest),
            "refuel" => Some(Self::Refuel),
            "pickup" => Some(Self::Pickup),
            "dropoff" => Some(Self::Dropoff),
            _ => None,
        }
    }
}

/// A stop with a wall-clock span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BreakPeriod {
    /// Arrival at the stop.
    pub begin: DateTime<Utc>,
    /// Departure from the stop.
    pub end: DateTime<Utc>,
    /// Why the driver stopped.
    pub reason: BreakReason,
}

impl BreakPeriod {
    /// Length of the break; zero when `end` precedes `begin`.
    #[must_use]
    pub fn duration(&self) -> Duration {
        (self.end - self.begin).to_std().unwrap_or(Duration::ZERO)
    }
}

/// Distance driven after the last refuel of a trip.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FuelEvent {
    /// Metres from the last refuelling stop to the dropoff.
    pub distance_to_dropoff_m: f64,
}

/// A planned trip broken down into the records the ledger reads back.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TripDecomposition {
    /// Driver the trip belongs to.
    pub driver: DriverId,
    /// When the trip starts.
    pub created_at: DateTime<Utc>,
    /// Final itinerary.
    pub waypoints: Vec<Waypoint>,
    /// Routed distance through every waypoint, in metres.
    pub total_distance_m: f64,
    /// Sum of all driving segments.
    ///
    /// Kept as a plain [`Duration`] rather than a [`DrivingDuration`]: a trip
    /// with several sleeper stops can drive for more than 24 hours in total,
    /// which a time-of-day value cannot hold.
    pub total_driving: Duration,
    /// Driving between stops, in chronological order.
    pub driving_segments: Vec<DrivingSegment>,
    /// Stops with a wall-clock span, in chronological order.
    pub breaks: Vec<BreakPeriod>,
    /// Present when the trip included at least one refuel.
    pub fuel_event: Option<FuelEvent>,
}

/// A trip as read back from a repository.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TripRecord {
    /// Identifier assigned on save.
    pub id: TripId,
    /// Stored trip content.
    pub trip: TripDecomposition,
}
