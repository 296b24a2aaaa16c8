//! Itinerary waypoints and their classification.

use std::time::Duration;

use geo::Coord;

use crate::{BreakReason, HosRules, PoiCandidate};

/// Why a waypoint is in the itinerary.
///
/// Every waypoint carries its kind from the moment it is created, so the
/// break ledger never has to guess from a label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum StopKind {
    /// The driver's position when planning starts.
    Origin,
    /// Freight pickup.
    Pickup,
    /// Freight dropoff.
    Dropoff,
    /// Mandatory 30-minute break.
    ShortBreak,
    /// Mandatory long rest after the driving ceiling.
    Sleeper,
    /// Refuelling stop.
    Refuel,
}

impl StopKind {
    /// Reason recorded in the break ledger, if the stop is a break at all.
    ///
    /// # Examples
    /// ```
    /// use hos_core::{BreakReason, StopKind};
    ///
    /// assert_eq!(StopKind::Sleeper.break_reason(), Some(BreakReason::Rest));
    /// assert_eq!(StopKind::Origin.break_reason(), None);
    /// ```
    #[must_use]
    pub const fn break_reason(self) -> Option<BreakReason> {
        match self {
            Self::Origin => None,
            Self::Pickup => Some(BreakReason::Pickup),
            Self::Dropoff => Some(BreakReason::Dropoff),
            Self::ShortBreak | Self::Sleeper => Some(BreakReason::Rest),
            Self::Refuel => Some(BreakReason::Refuel),
        }
    }

    /// Duty status of the driver while at the stop.
    #[must_use]
    pub const fn activity(self) -> ActivityType {
        match self {
            Self::Origin => ActivityType::Driving,
            Self::Pickup | Self::Dropoff | Self::Refuel => ActivityType::OnDuty,
            Self::ShortBreak => ActivityType::OffDutyOnDuty,
            Self::Sleeper => ActivityType::Sleeper,
        }
    }

    /// Whether the planner inserted the stop rather than the caller.
    #[must_use]
    pub const fn is_synthetic(self) -> bool {
        matches!(self, Self::ShortBreak | Self::Sleeper | Self::Refuel)
    }

    const fn label_prefix(self) -> &'static str {
        match self {
            Self::Origin => "current",
            Self::Pickup => "pickup",
            Self::Dropoff => "dropoff",
            Self::ShortBreak => "Rest Area",
            Self::Sleeper => "Sleeper Area",
            Self::Refuel => "refueling",
        }
    }
}

/// Duty status tag shown for each waypoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ActivityType {
    /// Driving away from the stop.
    #[cfg_attr(feature = "serde", serde(rename = "driving"))]
    Driving,
    /// Working but not driving.
    #[cfg_attr(feature = "serde", serde(rename = "on-duty"))]
    OnDuty,
    /// Short break, off duty or on duty not driving.
    #[cfg_attr(feature = "serde", serde(rename = "off-duty/on-duty"))]
    OffDutyOnDuty,
    /// In the sleeper berth.
    #[cfg_attr(feature = "serde", serde(rename = "sleeper"))]
    Sleeper,
}

/// One stop in a planned itinerary.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(into = "wire::WaypointRecord", try_from = "wire::WaypointRecord")
)]
pub struct Waypoint {
    /// Location with `x = longitude` and `y = latitude`.
    pub location: Coord<f64>,
    /// Free-text label for display.
    pub label: String,
    /// Why the stop exists.
    pub kind: StopKind,
    /// Time spent at the stop.
    pub dwell: Duration,
    /// Travel time from the previous waypoint.
    pub duration_from_previous: Duration,
    /// Duty status while at the stop.
    pub activity: ActivityType,
}

impl Waypoint {
    /// Build a caller-supplied stop (origin, pickup, or dropoff).
    ///
    /// # Examples
    /// ```
    /// use std::time::Duration;
    /// use geo::Coord;
    /// use hos_core::{HosRules, StopKind, Waypoint};
    ///
    /// let pickup = Waypoint::key_stop(StopKind::Pickup, Coord { x: 1.0, y: 2.0 }, &HosRules::default());
    /// assert_eq!(pickup.label, "pickup");
    /// assert_eq!(pickup.dwell, Duration::from_secs(3600));
    /// ```
    #[must_use]
    pub fn key_stop(kind: StopKind, location: Coord<f64>, rules: &HosRules) -> Self {
        Self {
            location,
            label: kind.label_prefix().to_owned(),
            kind,
            dwell: rules.dwell(kind),
            duration_from_previous: Duration::ZERO,
            activity: kind.activity(),
        }
    }

    /// Build a planner-inserted stop at a point of interest.
    #[must_use]
    pub fn synthetic(kind: StopKind, place: PoiCandidate, rules: &HosRules) -> Self {
        Self {
            location: place.location,
            label: format!("{} - {}", kind.label_prefix(), place.name),
            kind,
            dwell: rules.dwell(kind),
            duration_from_previous: Duration::ZERO,
            activity: kind.activity(),
        }
    }
}

#[cfg(feature = "serde")]
mod wire {
    use std::time::Duration;

    use geo::Coord;
    use serde::{Deserialize, Serialize};
    use thiserror::Error;

    use super::{ActivityType, StopKind, Waypoint};

    /// Flat `lat`/`lng` shape used in plan responses and persisted trips.
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub(super) struct WaypointRecord {
        lat: f64,
        lng: f64,
        label: String,
        kind: StopKind,
        dwell_seconds: f64,
        duration_from_last_point_seconds: f64,
        #[serde(rename = "type")]
        activity: ActivityType,
    }

    #[derive(Debug, Error)]
    #[error("invalid {field}: {message}")]
    pub(super) struct WaypointRecordError {
        field: &'static str,
        message: String,
    }

    impl From<Waypoint> for WaypointRecord {
        fn from(waypoint: Waypoint) -> Self {
            Self {
                lat: waypoint.location.y,
                lng: waypoint.location.x,
                label: waypoint.label,
                kind: waypoint.kind,
                dwell_seconds: waypoint.dwell.as_secs_f64(),
                duration_from_last_point_seconds: waypoint.duration_from_previous.as_secs_f64(),
                activity: waypoint.activity,
            }
        }
    }

    impl TryFrom<WaypointRecord> for Waypoint {
        type Error = WaypointRecordError;

        fn try_from(record: WaypointRecord) -> Result<Self, Self::Error> {
            let seconds = |field: &'static str, value: f64| {
                Duration::try_from_secs_f64(value).map_err(|err| WaypointRecordError {
                    field,
                    message: err.to_string(),
                })
            };
            Ok(Self {
                location: Coord {
                    x: record.lng,
                    y: record.lat,
                },
                label: record.label,
                kind: record.kind,
                dwell: seconds("dwell_seconds", record.dwell_seconds)?,
                duration_from_previous: seconds(
                    "duration_from_last_point_seconds",
                    record.duration_from_last_point_seconds,
                )?,
                activity: record.activity,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(StopKind::ShortBreak, ActivityType::OffDutyOnDuty)]
    #[case(StopKind::Sleeper, ActivityType::Sleeper)]
    #[case(StopKind::Refuel, ActivityType::OnDuty)]
    #[case(StopKind::Origin, ActivityType::Driving)]
    fn activity_follows_kind(#[case] kind: StopKind, #[case] expected: ActivityType) {
        assert_eq!(kind.activity(), expected);
    }

    #[rstest]
    fn synthetic_label_names_the_place() {
        let place = PoiCandidate {
            location: Coord { x: 3.0, y: 4.0 },
            name: "Shell".to_owned(),
        };
        let stop = Waypoint::synthetic(StopKind::Refuel, place, &HosRules::default());
        assert_eq!(stop.label, "refueling - Shell");
        assert_eq!(stop.dwell, Duration::from_secs(900));
        assert!(stop.kind.is_synthetic());
    }

    #[cfg(feature = "serde")]
    #[rstest]
    fn serialises_flat_lat_lng_shape() {
        let stop = Waypoint::key_stop(
            StopKind::Dropoff,
            Coord { x: -87.6, y: 41.8 },
            &HosRules::default(),
        );
        let json = serde_json::to_value(&stop).expect("serialise waypoint");
        assert_eq!(json["lat"], 41.8);
        assert_eq!(json["lng"], -87.6);
        assert_eq!(json["type"], "on-duty");
        assert_eq!(json["kind"], "dropoff");
        assert_eq!(json["dwell_seconds"], 3600.0);

        let back: Waypoint = serde_json::from_value(json).expect("deserialise waypoint");
        assert_eq!(back, stop);
    }

    #[cfg(feature = "serde")]
    #[rstest]
    fn rejects_negative_dwell() {
        let json = serde_json::json!({
            "lat": 0.0,
            "lng": 0.0,
            "label": "broken",
            "kind": "pickup",
            "dwell_seconds": -1.0,
            "duration_from_last_point_seconds": 0.0,
            "type": "on-duty",
        });
        assert!(serde_json::from_value::<Waypoint>(json).is_err());
    }
}
