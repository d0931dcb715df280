//! Map page queries
//!
//! Only listings with both coordinates are plotted. Everything here is pure;
//! the map widget itself is out of process.

use serde::Serialize;
use std::collections::BTreeSet;
use thiserror::Error;
use url::Url;

use xarcon_config::MapsConfig;
use xarcon_core::{fold, Property};

/// Shown for listings without images
pub const PLACEHOLDER_IMAGE: &str =
    "https://images.unsplash.com/photo-1560518883-ce09059eeffa?auto=format&fit=crop&w=1200&q=80";

const DETAIL_PAGE: &str = "propiedades/propiedad-template.html";
const MAPS_SCRIPT: &str = "https://maps.googleapis.com/maps/api/js";

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

/// A listing as the map sees it
#[derive(Debug, Clone, PartialEq)]
pub struct GeoProperty<'a> {
    pub property: &'a Property,
    pub city: &'a str,
    pub address: &'a str,
    pub coordinates: Option<LatLng>,
}

impl<'a> GeoProperty<'a> {
    pub fn new(property: &'a Property) -> Self {
        let city = if property.city.is_empty() {
            property.location.as_str()
        } else {
            property.city.as_str()
        };
        let address = if property.address.is_empty() {
            property.location.as_str()
        } else {
            property.address.as_str()
        };

        Self {
            property,
            city,
            address,
            coordinates: property
                .coordinates()
                .map(|(lat, lng)| LatLng { lat, lng }),
        }
    }

    /// Whether the listing can be plotted
    pub fn has_coordinates(&self) -> bool {
        self.coordinates.is_some()
    }

    /// Marker image, or the placeholder
    pub fn image(&self) -> &'a str {
        self.property.primary_image().unwrap_or(PLACEHOLDER_IMAGE)
    }

    /// Link to the detail page
    pub fn detail_href(&self) -> String {
        format!("{DETAIL_PAGE}?id={}", self.property.id)
    }
}

/// Map view of every listing
pub fn geo_properties(properties: &[Property]) -> Vec<GeoProperty<'_>> {
    properties.iter().map(GeoProperty::new).collect()
}

/// Map page filter bar
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MapFilter {
    pub city: Option<String>,
    pub property_type: Option<String>,
    pub max_price: Option<f64>,
}

impl MapFilter {
    /// Whether a plotted listing passes every set filter
    pub fn matches(&self, geo: &GeoProperty<'_>) -> bool {
        if !geo.has_coordinates() {
            return false;
        }
        if let Some(city) = non_blank(&self.city) {
            if fold(geo.city) != fold(city) {
                return false;
            }
        }
        if let Some(kind) = non_blank(&self.property_type) {
            if fold(&geo.property.property_type) != fold(kind) {
                return false;
            }
        }
        !self.max_price.is_some_and(|max| geo.property.price > max)
    }

    /// Keep the matching listings
    pub fn apply<'a>(&self, geos: &[GeoProperty<'a>]) -> Vec<GeoProperty<'a>> {
        geos.iter().filter(|g| self.matches(g)).cloned().collect()
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Options for the city dropdown
pub fn distinct_cities(geos: &[GeoProperty<'_>]) -> Vec<String> {
    distinct(geos.iter().map(|g| g.city))
}

/// Options for the type dropdown
pub fn distinct_types(geos: &[GeoProperty<'_>]) -> Vec<String> {
    distinct(geos.iter().map(|g| g.property.property_type.as_str()))
}

fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    values
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Smallest box holding every plotted marker
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bounds {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl Bounds {
    /// `None` when there are no points
    pub fn around(points: impl IntoIterator<Item = LatLng>) -> Option<Self> {
        points.into_iter().fold(None, |bounds, p| {
            Some(match bounds {
                None => Bounds {
                    south: p.lat,
                    west: p.lng,
                    north: p.lat,
                    east: p.lng,
                },
                Some(b) => Bounds {
                    south: b.south.min(p.lat),
                    west: b.west.min(p.lng),
                    north: b.north.max(p.lat),
                    east: b.east.max(p.lng),
                },
            })
        })
    }

    /// Whether a point lies inside the box
    pub fn contains(&self, point: LatLng) -> bool {
        (self.south..=self.north).contains(&point.lat) && (self.west..=self.east).contains(&point.lng)
    }

    /// Midpoint of the box
    pub fn center(&self) -> LatLng {
        LatLng {
            lat: (self.south + self.north) / 2.0,
            lng: (self.west + self.east) / 2.0,
        }
    }
}

#[derive(Error, Debug, PartialEq)]
pub enum MapUnavailable {
    #[error("No Google Maps API key configured")]
    MissingKey,

    #[error("Invalid maps script URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// Widget loader URL for the configured key
pub fn script_url(maps: &MapsConfig) -> Result<Url, MapUnavailable> {
    if !maps.has_key() {
        return Err(MapUnavailable::MissingKey);
    }
    let url = Url::parse_with_params(
        MAPS_SCRIPT,
        &[("key", maps.api_key.trim()), ("libraries", "places,geometry")],
    )?;
    Ok(url)
}

/// Status line under the map
pub fn map_status(plotted: usize) -> String {
    if plotted == 0 {
        "No hay propiedades con coordenadas para el filtro actual.".to_string()
    } else {
        format!("Mapa activo con {plotted} propiedad(es).")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use xarcon_config::MAPS_KEY_PLACEHOLDER;
    use xarcon_core::RawProperty;

    fn listing(value: serde_json::Value) -> Property {
        RawProperty::from_value(value).normalize()
    }

    fn sample() -> Vec<Property> {
        vec![
            listing(json!({ "id": "a", "title": "Casa Granada", "city": "Granada", "price": 200000, "lat": 11.93, "lng": -85.95, "images": ["a.jpg"] })),
            listing(json!({ "id": "b", "title": "Apartamento", "location": "León", "type": "Apartamento", "price": 90000, "latitude": 12.43, "longitude": -86.88 })),
            listing(json!({ "id": "c", "title": "Sin mapa", "city": "Managua", "price": 50000 })),
        ]
    }

    #[test]
    fn test_geo_fallbacks() {
        let properties = sample();
        let geos = geo_properties(&properties);
        assert_eq!(geos[1].city, "León");
        assert_eq!(geos[1].address, "León");
        assert_eq!(geos[0].image(), "a.jpg");
        assert_eq!(geos[1].image(), PLACEHOLDER_IMAGE);
        assert_eq!(geos[0].detail_href(), "propiedades/propiedad-template.html?id=a");
        assert!(!geos[2].has_coordinates());
    }

    #[test]
    fn test_map_filter_requires_coordinates() {
        let properties = sample();
        let geos = geo_properties(&properties);

        let all = MapFilter::default().apply(&geos);
        assert_eq!(all.len(), 2);

        let filter = MapFilter {
            city: Some("Managua".to_string()),
            ..Default::default()
        };
        assert!(filter.apply(&geos).is_empty());

        let filter = MapFilter {
            city: Some("leon".to_string()),
            max_price: Some(100000.0),
            ..Default::default()
        };
        let hits = filter.apply(&geos);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].property.id, "b");

        let filter = MapFilter {
            property_type: Some("casa".to_string()),
            ..Default::default()
        };
        assert_eq!(filter.apply(&geos)[0].property.id, "a");
    }

    #[test]
    fn test_distinct_options() {
        let properties = sample();
        let geos = geo_properties(&properties);
        assert_eq!(distinct_cities(&geos), vec!["Granada", "León", "Managua"]);
        assert_eq!(distinct_types(&geos), vec!["Apartamento", "Casa"]);
    }

    #[test]
    fn test_bounds() {
        assert!(Bounds::around(Vec::<LatLng>::new()).is_none());

        let bounds = Bounds::around([
            LatLng { lat: 11.0, lng: -86.0 },
            LatLng { lat: 13.0, lng: -85.0 },
        ])
        .unwrap();
        assert_eq!(bounds.south, 11.0);
        assert_eq!(bounds.east, -85.0);
        assert!(bounds.contains(LatLng { lat: 12.0, lng: -85.5 }));
        assert!(!bounds.contains(LatLng { lat: 14.0, lng: -85.5 }));
        assert_eq!(bounds.center(), LatLng { lat: 12.0, lng: -85.5 });
    }

    #[test]
    fn test_script_url_needs_real_key() {
        let mut maps = MapsConfig::default();
        assert_eq!(script_url(&maps), Err(MapUnavailable::MissingKey));

        maps.api_key = MAPS_KEY_PLACEHOLDER.to_string();
        assert_eq!(script_url(&maps), Err(MapUnavailable::MissingKey));

        maps.api_key = "abc123".to_string();
        let url = script_url(&maps).unwrap();
        assert_eq!(url.host_str(), Some("maps.googleapis.com"));
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert!(pairs.contains(&("key".to_string(), "abc123".to_string())));
        assert!(pairs.contains(&("libraries".to_string(), "places,geometry".to_string())));
    }

    #[test]
    fn test_map_status() {
        assert_eq!(map_status(2), "Mapa activo con 2 propiedad(es).");
        assert_eq!(map_status(0), "No hay propiedades con coordenadas para el filtro actual.");
    }
}
