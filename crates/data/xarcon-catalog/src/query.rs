//! Listing queries used by the listing pages and the admin inventory

use serde::Serialize;
use std::borrow::Borrow;
use std::cmp::Ordering;
use std::str::FromStr;

use xarcon_core::{fold, Property, Status};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Newest `dateAdded` first, undated last
    #[default]
    Recent,
    Title,
    PriceAsc,
    PriceDesc,
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "recent" | "newest" => Ok(SortOrder::Recent),
            "title" => Ok(SortOrder::Title),
            "price-asc" | "price_asc" => Ok(SortOrder::PriceAsc),
            "price-desc" | "price_desc" => Ok(SortOrder::PriceDesc),
            other => Err(format!("unknown sort order: {other}")),
        }
    }
}

/// Sort owned records or references in place
pub fn sort_properties<P: Borrow<Property>>(properties: &mut [P], order: SortOrder) {
    properties.sort_by(|a, b| {
        compare(
            <P as Borrow<Property>>::borrow(a),
            <P as Borrow<Property>>::borrow(b),
            order,
        )
    });
}

fn compare(a: &Property, b: &Property, order: SortOrder) -> Ordering {
    let by_title = || fold(&a.title).cmp(&fold(&b.title)).then_with(|| a.id.cmp(&b.id));
    match order {
        SortOrder::Recent => match (a.date_added, b.date_added) {
            (Some(x), Some(y)) => y.cmp(&x),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
        .then_with(by_title),
        SortOrder::Title => by_title(),
        SortOrder::PriceAsc => a.price.total_cmp(&b.price).then_with(by_title),
        SortOrder::PriceDesc => b.price.total_cmp(&a.price).then_with(by_title),
    }
}

/// Listing page filter. Empty filter matches everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListingFilter {
    /// Every whitespace-separated term must appear somewhere in the listing
    pub query: Option<String>,
    pub city: Option<String>,
    pub property_type: Option<String>,
    pub status: Option<Status>,
    pub max_price: Option<f64>,
    pub featured_only: bool,
    pub opportunity_only: bool,
}

impl ListingFilter {
    /// Whether a listing passes every set filter
    pub fn matches(&self, property: &Property) -> bool {
        if self.featured_only && !property.featured {
            return false;
        }
        if self.opportunity_only && !property.opportunity {
            return false;
        }
        if self.status.is_some_and(|status| status != property.status) {
            return false;
        }
        if self.max_price.is_some_and(|max| property.price > max) {
            return false;
        }
        if let Some(city) = non_blank(&self.city) {
            let listed = if property.city.is_empty() {
                &property.location
            } else {
                &property.city
            };
            if fold(listed) != fold(city) {
                return false;
            }
        }
        if let Some(kind) = non_blank(&self.property_type) {
            if fold(&property.property_type) != fold(kind) {
                return false;
            }
        }
        if let Some(query) = non_blank(&self.query) {
            let haystack = fold(&[
                property.title.as_str(),
                property.location.as_str(),
                property.city.as_str(),
                property.address.as_str(),
                property.description.as_str(),
                property.property_type.as_str(),
            ]
            .join(" "));
            if !fold(query).split_whitespace().all(|term| haystack.contains(term)) {
                return false;
            }
        }
        true
    }

    /// Keep the matching listings, in order
    pub fn apply<'a>(&self, properties: &'a [Property]) -> Vec<&'a Property> {
        properties.iter().filter(|p| self.matches(p)).collect()
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Featured shelf
pub fn featured(properties: &[Property]) -> Vec<&Property> {
    properties.iter().filter(|p| p.featured).collect()
}

/// Opportunities shelf
pub fn opportunities(properties: &[Property]) -> Vec<&Property> {
    properties.iter().filter(|p| p.opportunity).collect()
}

/// The `limit` most recently added listings
pub fn recent(properties: &[Property], limit: usize) -> Vec<&Property> {
    let mut sorted: Vec<&Property> = properties.iter().collect();
    sort_properties(&mut sorted, SortOrder::Recent);
    sorted.truncate(limit);
    sorted
}

/// Inventory counters shown on the admin dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Counters {
    pub total: usize,
    pub sold: usize,
    pub available: usize,
}

impl Counters {
    /// Count a catalog
    pub fn of(properties: &[Property]) -> Self {
        let sold = properties.iter().filter(|p| p.is_sold()).count();
        Self {
            total: properties.len(),
            sold,
            available: properties.len() - sold,
        }
    }
}

/// `$1,250,000` style, rounded to whole dollars
pub fn format_price(price: f64) -> String {
    let whole = if price.is_finite() && price > 0.0 {
        price.round() as u64
    } else {
        0
    };

    let digits = whole.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    format!("${grouped}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use xarcon_core::RawProperty;

    fn listing(value: serde_json::Value) -> Property {
        RawProperty::from_value(value).normalize()
    }

    fn sample() -> Vec<Property> {
        vec![
            listing(json!({ "id": "a", "title": "Casa Colonial", "city": "Granada", "price": 250000, "dateAdded": "2024-02-01", "featured": true })),
            listing(json!({ "id": "b", "title": "apartamento Centro", "location": "León", "type": "Apartamento", "price": 90000, "dateAdded": "2024-06-10", "sold": true })),
            listing(json!({ "id": "c", "title": "Lote en Estelí", "city": "Estelí", "type": "Lote", "price": 30000, "opportunity": true, "description": "Vista al valle" })),
        ]
    }

    fn ids(properties: &[&Property]) -> Vec<String> {
        properties.iter().map(|p| p.id.clone()).collect()
    }

    #[test]
    fn test_sort_orders() {
        let mut properties = sample();
        sort_properties(&mut properties, SortOrder::Recent);
        assert_eq!(properties.iter().map(|p| p.id.as_str()).collect::<Vec<_>>(), vec!["b", "a", "c"]);

        sort_properties(&mut properties, SortOrder::Title);
        assert_eq!(properties.iter().map(|p| p.id.as_str()).collect::<Vec<_>>(), vec!["b", "a", "c"]);

        sort_properties(&mut properties, SortOrder::PriceAsc);
        assert_eq!(properties.iter().map(|p| p.id.as_str()).collect::<Vec<_>>(), vec!["c", "b", "a"]);

        sort_properties(&mut properties, SortOrder::PriceDesc);
        assert_eq!(properties[0].id, "a");
        assert_eq!("price_desc".parse::<SortOrder>().unwrap(), SortOrder::PriceDesc);
        assert!("cheapest".parse::<SortOrder>().is_err());
    }

    #[test]
    fn test_filter_by_city_falls_back_to_location() {
        let properties = sample();
        let filter = ListingFilter {
            city: Some("leon".to_string()),
            ..Default::default()
        };
        assert_eq!(ids(&filter.apply(&properties)), vec!["b"]);
    }

    #[test]
    fn test_filter_query_is_accent_insensitive() {
        let properties = sample();
        let filter = ListingFilter {
            query: Some("ESTELI valle".to_string()),
            ..Default::default()
        };
        assert_eq!(ids(&filter.apply(&properties)), vec!["c"]);
    }

    #[test]
    fn test_filter_combinations() {
        let properties = sample();
        let filter = ListingFilter {
            status: Some(Status::Available),
            max_price: Some(100000.0),
            ..Default::default()
        };
        assert_eq!(ids(&filter.apply(&properties)), vec!["c"]);

        let filter = ListingFilter {
            featured_only: true,
            property_type: Some("casa".to_string()),
            ..Default::default()
        };
        assert_eq!(ids(&filter.apply(&properties)), vec!["a"]);
        assert_eq!(ListingFilter::default().apply(&properties).len(), 3);
    }

    #[test]
    fn test_shelves_and_counters() {
        let properties = sample();
        assert_eq!(ids(&featured(&properties)), vec!["a"]);
        assert_eq!(ids(&opportunities(&properties)), vec!["c"]);
        assert_eq!(ids(&recent(&properties, 2)), vec!["b", "a"]);
        assert_eq!(
            Counters::of(&properties),
            Counters { total: 3, sold: 1, available: 2 }
        );
    }

    #[test]
    fn test_format_price() {
        assert_eq!(format_price(0.0), "$0");
        assert_eq!(format_price(950.4), "$950");
        assert_eq!(format_price(1250000.0), "$1,250,000");
        assert_eq!(format_price(120000.0), "$120,000");
        assert_eq!(format_price(f64::NAN), "$0");
    }
}
