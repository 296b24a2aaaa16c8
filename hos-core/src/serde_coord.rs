//! `{ "lat": .., "lng": .. }` representation for [`geo::Coord`] fields.

use geo::Coord;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[derive(Serialize, Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

pub(crate) fn serialize<S: Serializer>(coord: &Coord<f64>, serializer: S) -> Result<S::Ok, S::Error> {
    LatLng {
        lat: coord.y,
        lng: coord.x,
    }
    .serialize(serializer)
}

pub(crate) fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Coord<f64>, D::Error> {
    let LatLng { lat, lng } = LatLng::deserialize(deserializer)?;
    Ok(Coord { x: lng, y: lat })
}
