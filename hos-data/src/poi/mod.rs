//! HTTP point-of-interest provider backed by the Overpass API.
//!
//! [`OverpassPoiProvider`] implements [`hos_core::PoiProvider`] with Overpass
//! QL `around:` queries. Rest areas cover fuel stations, parking, picnic
//! sites, fast food, and cafés; fuel stations cover `amenity=fuel` nodes,
//! ways, and relations.

mod overpass;
mod provider;

pub use provider::{DEFAULT_OVERPASS_URL, OverpassPoiProvider, OverpassPoiProviderConfig};
