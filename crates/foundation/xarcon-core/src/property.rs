//! Canonical property record

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::Fields;

/// Agent shown when a listing names nobody
pub const DEFAULT_AGENT: &str = "Equipo Xarcon";

/// Property type used when the record carries none
pub const DEFAULT_TYPE: &str = "Casa";

/// Sale state of a listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    Available,
    Sold,
}

impl Status {
    pub fn is_sold(self) -> bool {
        matches!(self, Status::Sold)
    }

    /// The other state, used by the admin "mark sold / available" action
    pub fn toggled(self) -> Self {
        match self {
            Status::Available => Status::Sold,
            Status::Sold => Status::Available,
        }
    }

    /// Public-facing label
    pub fn label(self) -> &'static str {
        match self {
            Status::Available => "Disponible",
            Status::Sold => "Vendida",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Available => write!(f, "available"),
            Status::Sold => write!(f, "sold"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown property status: {0}")]
pub struct ParseStatusError(pub String);

impl FromStr for Status {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "available" | "disponible" => Ok(Status::Available),
            "sold" | "vendida" | "vendido" => Ok(Status::Sold),
            other => Err(ParseStatusError(other.to_string())),
        }
    }
}

/// A listing in canonical form.
///
/// `status` and `sold` always agree once a record has been through
/// [`crate::normalize`]. `city` and `address` are empty when unknown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    pub id: String,
    pub title: String,
    pub description: String,
    pub price: f64,
    pub location: String,
    pub city: String,
    pub address: String,
    #[serde(rename = "type")]
    pub property_type: String,
    pub bedrooms: f64,
    pub bathrooms: f64,
    pub area: f64,
    /// Display order
    pub images: Vec<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub status: Status,
    pub sold: bool,
    pub featured: bool,
    pub opportunity: bool,
    #[serde(alias = "createdAt")]
    pub date_added: Option<NaiveDate>,
    pub agent: String,
}

impl Property {
    /// Empty record with every documented default
    pub fn empty(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: String::new(),
            description: String::new(),
            price: 0.0,
            location: String::new(),
            city: String::new(),
            address: String::new(),
            property_type: DEFAULT_TYPE.to_string(),
            bedrooms: 0.0,
            bathrooms: 0.0,
            area: 0.0,
            images: Vec::new(),
            latitude: None,
            longitude: None,
            status: Status::Available,
            sold: false,
            featured: false,
            opportunity: false,
            date_added: None,
            agent: DEFAULT_AGENT.to_string(),
        }
    }

    /// Set the sale state, keeping the legacy flag in step
    pub fn set_status(&mut self, status: Status) {
        self.status = status;
        self.sold = status.is_sold();
    }

    pub fn is_sold(&self) -> bool {
        self.status.is_sold()
    }

    /// `(latitude, longitude)` when both are known
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        self.latitude.zip(self.longitude)
    }

    /// Cover image
    pub fn primary_image(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }

    /// The record as a loose field map, ready to be patched
    pub fn to_fields(&self) -> Fields {
        match serde_json::to_value(self) {
            Ok(serde_json::Value::Object(map)) => map,
            _ => Fields::new(),
        }
    }
}
