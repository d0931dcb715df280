//! Raw input records
//!
//! Listings reach the normalizer from several places: the static catalog,
//! records stored by older versions of the admin panel, override patches
//! merged over a canonical record, and admin form drafts. [`RawProperty`]
//! is the single type all of them are funnelled through.

use serde_json::Value;

use crate::{Fields, Property};

/// A property-shaped record of unknown quality
#[derive(Debug, Clone, PartialEq)]
pub enum RawProperty {
    /// Already canonical, re-normalized to repair any broken invariant
    Canonical(Property),
    /// Arbitrary JSON fields, possibly from another schema version
    Loose(Fields),
}

impl RawProperty {
    /// Wrap any JSON value; non-objects become an empty record
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(fields) => RawProperty::Loose(fields),
            _ => RawProperty::Loose(Fields::new()),
        }
    }

    /// Normalize into the canonical record
    pub fn normalize(self) -> Property {
        crate::normalize(self)
    }

    /// Field view of the record
    pub fn into_fields(self) -> Fields {
        match self {
            RawProperty::Canonical(property) => property.to_fields(),
            RawProperty::Loose(fields) => fields,
        }
    }
}

impl From<Property> for RawProperty {
    fn from(property: Property) -> Self {
        RawProperty::Canonical(property)
    }
}

impl From<Fields> for RawProperty {
    fn from(fields: Fields) -> Self {
        RawProperty::Loose(fields)
    }
}

impl From<Value> for RawProperty {
    fn from(value: Value) -> Self {
        RawProperty::from_value(value)
    }
}
