//! Raw record → canonical [`Property`]
//!
//! Total and idempotent. Every field has a default:
//!
//! | field | default |
//! |---|---|
//! | price, bedrooms, bathrooms, area | `0` (also for negative or non-finite input) |
//! | latitude, longitude | `null` (also when out of range) |
//! | images | `[]`, non-string and blank entries dropped |
//! | status / sold | `available` / `false` |
//! | type | `Casa` |
//! | agent | `Equipo Xarcon` |
//! | dateAdded | `null` |
//!
//! A recognized `status` string is authoritative; the legacy `sold` flag is
//! only consulted when `status` is absent or unrecognized.

use chrono::{DateTime, NaiveDate};
use serde_json::Value;

use crate::{slugify, Fields, Property, RawProperty, Status, DEFAULT_AGENT, DEFAULT_TYPE};

/// Normalize any raw record. Never fails.
pub fn normalize(raw: RawProperty) -> Property {
    let fields = raw.into_fields();
    from_fields(&fields)
}

fn from_fields(fields: &Fields) -> Property {
    let title = text(fields, "title").unwrap_or_default();
    let id = text(fields, "id").unwrap_or_else(|| slugify(&title));
    let status = resolve_status(fields);

    Property {
        id,
        description: text(fields, "description").unwrap_or_default(),
        price: amount(fields, &["price"]),
        location: text(fields, "location").unwrap_or_default(),
        city: text(fields, "city").unwrap_or_default(),
        address: text(fields, "address").unwrap_or_default(),
        property_type: text(fields, "type").unwrap_or_else(|| DEFAULT_TYPE.to_string()),
        bedrooms: amount(fields, &["bedrooms"]),
        bathrooms: amount(fields, &["bathrooms"]),
        area: amount(fields, &["area", "size"]),
        images: images(fields),
        latitude: coordinate(fields, &["latitude", "lat"], 90.0),
        longitude: coordinate(fields, &["longitude", "lng"], 180.0),
        status,
        sold: status.is_sold(),
        featured: flag(fields, "featured").unwrap_or(false),
        opportunity: flag(fields, "opportunity").unwrap_or(false),
        date_added: ["dateAdded", "createdAt"]
            .iter()
            .find_map(|key| text(fields, key).and_then(|s| parse_day(&s))),
        agent: text(fields, "agent").unwrap_or_else(|| DEFAULT_AGENT.to_string()),
        title,
    }
}

fn resolve_status(fields: &Fields) -> Status {
    let declared = fields
        .get("status")
        .and_then(Value::as_str)
        .and_then(|s| s.parse::<Status>().ok());

    match declared {
        Some(status) => status,
        None if flag(fields, "sold") == Some(true) => Status::Sold,
        None => Status::Available,
    }
}

/// Trimmed, non-empty string. Numbers are stringified so numeric ids survive.
fn text(fields: &Fields, key: &str) -> Option<String> {
    let value = match fields.get(key)? {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    (!value.is_empty()).then_some(value)
}

/// Finite number from a JSON number or a numeric-looking string
fn number(fields: &Fields, key: &str) -> Option<f64> {
    let parsed = match fields.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|n| n.is_finite())
}

fn amount(fields: &Fields, keys: &[&str]) -> f64 {
    keys.iter()
        .find_map(|key| number(fields, key))
        .filter(|n| *n >= 0.0)
        .unwrap_or(0.0)
}

fn coordinate(fields: &Fields, keys: &[&str], limit: f64) -> Option<f64> {
    keys.iter()
        .find_map(|key| number(fields, key))
        .filter(|n| n.abs() <= limit)
}

fn flag(fields: &Fields, key: &str) -> Option<bool> {
    match fields.get(key)? {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_f64().map(|n| n != 0.0),
        Value::String(s) => match s.trim().to_lowercase().as_str() {
            "true" | "1" | "yes" | "si" | "sí" => Some(true),
            "false" | "0" | "no" | "" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

fn images(fields: &Fields) -> Vec<String> {
    let source = fields.get("images").or_else(|| fields.get("image"));
    let candidates: Vec<&Value> = match source {
        Some(Value::Array(items)) => items.iter().collect(),
        Some(single @ Value::String(_)) => vec![single],
        _ => Vec::new(),
    };

    candidates
        .into_iter()
        .filter_map(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Day-precision date from `YYYY-MM-DD` or an RFC 3339 timestamp
fn parse_day(s: &str) -> Option<NaiveDate> {
    if let Ok(day) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(day);
    }
    if let Ok(stamp) = DateTime::parse_from_rfc3339(s) {
        return Some(stamp.date_naive());
    }
    s.get(..10)
        .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn loose(value: Value) -> Property {
        normalize(RawProperty::from_value(value))
    }

    #[test]
    fn test_empty_record_gets_defaults() {
        let property = loose(json!({}));
        assert_eq!(property.id, "");
        assert_eq!(property.price, 0.0);
        assert_eq!(property.property_type, "Casa");
        assert_eq!(property.agent, "Equipo Xarcon");
        assert!(property.images.is_empty());
        assert_eq!(property.status, Status::Available);
        assert!(!property.sold);
    }

    #[test]
    fn test_non_object_is_total() {
        assert_eq!(loose(json!(42)), loose(json!({})));
        assert_eq!(loose(json!(null)), loose(json!([])));
    }

    #[test]
    fn test_numeric_coercion() {
        let property = loose(json!({
            "price": "125000",
            "bedrooms": "tres",
            "bathrooms": -2,
            "area": " 240.5 ",
            "latitude": "12.11",
            "longitude": "abc"
        }));
        assert_eq!(property.price, 125000.0);
        assert_eq!(property.bedrooms, 0.0);
        assert_eq!(property.bathrooms, 0.0);
        assert_eq!(property.area, 240.5);
        assert_eq!(property.latitude, Some(12.11));
        assert_eq!(property.longitude, None);
    }

    #[test]
    fn test_out_of_range_coordinates_are_null() {
        let property = loose(json!({ "latitude": 123.0, "longitude": -86.2 }));
        assert_eq!(property.latitude, None);
        assert_eq!(property.longitude, Some(-86.2));
        assert_eq!(property.coordinates(), None);
    }

    #[test]
    fn test_legacy_sold_flag() {
        let property = loose(json!({ "id": "a", "sold": true }));
        assert_eq!(property.status, Status::Sold);
        assert!(property.sold);

        let property = loose(json!({ "id": "a", "sold": "false" }));
        assert_eq!(property.status, Status::Available);
    }

    #[test]
    fn test_status_wins_over_sold() {
        let property = loose(json!({ "id": "a", "status": "available", "sold": true }));
        assert_eq!(property.status, Status::Available);
        assert!(!property.sold);

        let property = loose(json!({ "id": "a", "status": "nonsense", "sold": true }));
        assert_eq!(property.status, Status::Sold);
    }

    #[test]
    fn test_images_drop_holes() {
        let property = loose(json!({ "images": ["a.jpg", null, 3, "  ", " b.jpg "] }));
        assert_eq!(property.images, vec!["a.jpg", "b.jpg"]);

        let property = loose(json!({ "image": "cover.jpg" }));
        assert_eq!(property.images, vec!["cover.jpg"]);
    }

    #[test]
    fn test_id_aliases_and_fallback() {
        assert_eq!(loose(json!({ "id": 17 })).id, "17");
        assert_eq!(loose(json!({ "title": "Casa Colonial, León" })).id, "casa-colonial-leon");
    }

    #[test]
    fn test_dates() {
        let day = NaiveDate::from_ymd_opt(2024, 5, 7);
        assert_eq!(loose(json!({ "dateAdded": "2024-05-07" })).date_added, day);
        assert_eq!(loose(json!({ "createdAt": "2024-05-07T14:30:00Z" })).date_added, day);
        assert_eq!(loose(json!({ "dateAdded": "2024-05-07T14:30" })).date_added, day);
        assert_eq!(loose(json!({ "dateAdded": "ayer" })).date_added, None);
    }

    #[test]
    fn test_idempotent() {
        let inputs = [
            json!({}),
            json!({ "id": 5, "title": "  Casa  ", "price": "1e3", "sold": 1, "images": ["x", false] }),
            json!({ "title": "Lote Ñandú", "status": "VENDIDA", "latitude": "-91", "createdAt": "2023-01-02T00:00:00+06:00" }),
        ];
        for input in inputs {
            let once = loose(input);
            let twice = normalize(RawProperty::Canonical(once.clone()));
            assert_eq!(once, twice);
            let via_fields = normalize(RawProperty::Loose(once.to_fields()));
            assert_eq!(once, via_fields);
        }
    }

    #[test]
    fn test_canonical_repairs_status_mismatch() {
        let mut property = Property::empty("a");
        property.status = Status::Sold;
        property.sold = false;
        property.price = f64::NAN;
        let repaired = normalize(property.into());
        assert!(repaired.sold);
        assert_eq!(repaired.price, 0.0);
    }
}
