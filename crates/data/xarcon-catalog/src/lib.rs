//! # Xarcon Catalog
//!
//! The merged listing catalog every view reads.
//!
//! ```text
//! CatalogLoader ──► baseline ─┐
//!                             ├─► reconcile() ──► Vec<Property>
//! PropertyStore ──► custom ───┤
//!                  overrides ─┤
//!                  deleted ───┘
//! ```
//!
//! Merge order is fixed: baseline, then same-id custom records replacing
//! baseline ones, then override patches, then deletions.

pub mod catalog;
pub mod geo;
pub mod loader;
pub mod query;
pub mod reconcile;

pub use catalog::{Catalog, CatalogSnapshot};
pub use geo::{
    distinct_cities, distinct_types, geo_properties, map_status, script_url, Bounds, GeoProperty, LatLng,
    MapFilter, MapUnavailable, PLACEHOLDER_IMAGE,
};
pub use loader::{CatalogLoader, CatalogSource};
pub use query::{featured, format_price, opportunities, recent, sort_properties, Counters, ListingFilter, SortOrder};
pub use reconcile::{apply_patch, reconcile};

use thiserror::Error;

/// Why the static catalog could not be read
#[derive(Error, Debug, Clone, PartialEq)]
pub enum UnavailableReason {
    #[error("request failed: {0}")]
    Http(String),

    #[error("HTTP {0}")]
    Status(u16),

    #[error("read failed: {0}")]
    Io(String),

    #[error("invalid JSON: {0}")]
    Json(String),

    #[error("payload is not a JSON array")]
    NotAnArray,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CatalogError {
    /// The static catalog could not be loaded; callers decide the fallback
    #[error("Catalog unavailable at {location}: {reason}")]
    Unavailable {
        location: String,
        #[source]
        reason: UnavailableReason,
    },
}

impl CatalogError {
    pub fn unavailable(location: impl Into<String>, reason: UnavailableReason) -> Self {
        CatalogError::Unavailable {
            location: location.into(),
            reason,
        }
    }
}

pub type Result<T> = std::result::Result<T, CatalogError>;
