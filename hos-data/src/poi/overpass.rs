//! Overpass QL query construction and response types.
//!
//! See: <https://wiki.openstreetmap.org/wiki/Overpass_API/Overpass_QL>

use std::collections::HashMap;

use geo::Coord;
use hos_core::PoiCategory;
use serde::Deserialize;

/// OSM element type and tag filter making up one query statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selector {
    /// `node`, `way`, or `relation`.
    pub element: &'static str,
    /// Tag key.
    pub key: &'static str,
    /// Required tag value.
    pub value: &'static str,
}

const fn selector(element: &'static str, key: &'static str, value: &'static str) -> Selector {
    Selector {
        element,
        key,
        value,
    }
}

const REST_AREA: &[Selector] = &[
    selector("node", "amenity", "fuel"),
    selector("way", "amenity", "fuel"),
    selector("node", "amenity", "parking"),
    selector("way", "amenity", "parking"),
    selector("node", "leisure", "picnic_site"),
    selector("node", "amenity", "fast_food"),
    selector("node", "amenity", "cafe"),
];

const FUEL_STATION: &[Selector] = &[
    selector("node", "amenity", "fuel"),
    selector("way", "amenity", "fuel"),
    selector("relation", "amenity", "fuel"),
];

/// Statements searched for a category.
#[must_use]
pub const fn selectors(category: PoiCategory) -> &'static [Selector] {
    match category {
        PoiCategory::RestArea => REST_AREA,
        PoiCategory::FuelStation => FUEL_STATION,
    }
}

/// Name given to results without a `name` tag.
#[must_use]
pub const fn fallback_name(category: PoiCategory) -> &'static str {
    match category {
        PoiCategory::RestArea => "Unnamed Rest Area",
        PoiCategory::FuelStation => "Unnamed Station",
    }
}

/// Build an Overpass QL query for `category` within `radius_m` metres of
/// `location`.
///
/// Ways and relations are returned with their centre point (`out center`)
/// so every element carries a single coordinate.
#[must_use]
pub fn build_query(
    location: Coord<f64>,
    radius_m: f64,
    category: PoiCategory,
    timeout_secs: u64,
) -> String {
    let statements: String = selectors(category)
        .iter()
        .map(|statement| {
            format!(
                r#"{}["{}"="{}"](around:{},{},{});"#,
                statement.element,
                statement.key,
                statement.value,
                radius_m,
                location.y,
                location.x
            )
        })
        .collect();
    format!("[out:json][timeout:{timeout_secs}];({statements});out center;")
}

/// Overpass API JSON response.
#[derive(Debug, Deserialize)]
pub struct OverpassResponse {
    /// Matching elements in server order.
    #[serde(default)]
    pub elements: Vec<Element>,
    /// Runtime notice, set when the server aborted the query.
    pub remark: Option<String>,
}

/// One matching OSM element.
#[derive(Debug, Deserialize)]
pub struct Element {
    /// Latitude of a node.
    pub lat: Option<f64>,
    /// Longitude of a node.
    pub lon: Option<f64>,
    /// Centre of a way or relation.
    pub center: Option<Center>,
    /// OSM tags.
    #[serde(default)]
    pub tags: HashMap<String, String>,
}

/// Centre point reported for ways and relations.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Center {
    /// Latitude.
    pub lat: f64,
    /// Longitude.
    pub lon: f64,
}

impl Element {
    /// Location with `x = longitude`, preferring the node coordinate.
    #[must_use]
    pub fn location(&self) -> Option<Coord<f64>> {
        match (self.lat, self.lon, self.center) {
            (Some(lat), Some(lon), _) => Some(Coord { x: lon, y: lat }),
            (_, _, Some(center)) => Some(Coord {
                x: center.lon,
                y: center.lat,
            }),
            _ => None,
        }
    }

    /// The `name` tag, if present and not blank.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.tags
            .get("name")
            .map(String::as_str)
            .filter(|name| !name.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn rest_area_query_lists_every_amenity() {
        let query = build_query(
            Coord { x: -74.5, y: 40.25 },
            10_000.0,
            PoiCategory::RestArea,
            25,
        );

        assert!(query.starts_with("[out:json][timeout:25];("));
        assert!(query.ends_with(");out center;"));
        assert!(query.contains(r#"node["amenity"="parking"](around:10000,40.25,-74.5);"#));
        assert!(query.contains(r#"node["leisure"="picnic_site"]"#));
        assert!(query.contains(r#"node["amenity"="cafe"]"#));
        assert_eq!(query.matches("around:").count(), 7);
    }

    #[rstest]
    fn fuel_query_covers_relations() {
        let query = build_query(Coord { x: 1.0, y: 2.0 }, 500.0, PoiCategory::FuelStation, 25);

        assert!(query.contains(r#"relation["amenity"="fuel"](around:500,2,1);"#));
        assert_eq!(query.matches("around:").count(), 3);
    }

    #[rstest]
    fn deserialise_nodes_and_ways() {
        let json = r#"{
            "version": 0.6,
            "elements": [
                { "type": "node", "id": 1, "lat": 40.1, "lon": -74.1,
                  "tags": { "amenity": "fuel", "name": "Truck Stop" } },
                { "type": "way", "id": 2, "center": { "lat": 40.2, "lon": -74.2 },
                  "tags": { "amenity": "parking" } },
                { "type": "relation", "id": 3 }
            ]
        }"#;

        let response: OverpassResponse = serde_json::from_str(json).expect("should deserialise");

        let locations: Vec<Option<Coord<f64>>> =
            response.elements.iter().map(Element::location).collect();
        assert_eq!(
            locations,
            vec![
                Some(Coord { x: -74.1, y: 40.1 }),
                Some(Coord { x: -74.2, y: 40.2 }),
                None,
            ]
        );
        let names: Vec<Option<&str>> = response.elements.iter().map(Element::name).collect();
        assert_eq!(names, vec![Some("Truck Stop"), None, None]);
        assert!(response.remark.is_none());
    }

    #[rstest]
    fn deserialise_remark() {
        let json = r#"{ "elements": [], "remark": "runtime error: Query timed out" }"#;

        let response: OverpassResponse = serde_json::from_str(json).expect("should deserialise");

        assert_eq!(
            response.remark.as_deref(),
            Some("runtime error: Query timed out")
        );
    }
}
