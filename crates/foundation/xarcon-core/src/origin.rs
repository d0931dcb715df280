//! Where a listing id comes from
//!
//! Reconciliation does not care about origin. The admin write path does:
//! edits to a static listing become override patches, edits to a stored
//! listing replace it in place.

use serde::Serialize;
use std::collections::HashMap;

use crate::Property;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    /// Only in the static catalog
    Default,
    /// Only in locally stored custom listings
    Custom,
    /// Stored custom listing reusing a static catalog id
    Shadowing,
}

impl Origin {
    /// A stored custom record backs this id
    pub fn has_custom_record(self) -> bool {
        matches!(self, Origin::Custom | Origin::Shadowing)
    }

    /// The static catalog carries this id
    pub fn has_baseline_record(self) -> bool {
        matches!(self, Origin::Default | Origin::Shadowing)
    }
}

/// Origin of every known id, computed once and handed to the write path
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OriginMap {
    origins: HashMap<String, Origin>,
}

impl OriginMap {
    /// Classify ids by where their records live
    pub fn classify<'a, B, C>(baseline_ids: B, custom_ids: C) -> Self
    where
        B: IntoIterator<Item = &'a str>,
        C: IntoIterator<Item = &'a str>,
    {
        let mut origins: HashMap<String, Origin> = baseline_ids
            .into_iter()
            .map(|id| (id.to_string(), Origin::Default))
            .collect();

        for id in custom_ids {
            let origin = match origins.get(id) {
                Some(Origin::Default) | Some(Origin::Shadowing) => Origin::Shadowing,
                _ => Origin::Custom,
            };
            origins.insert(id.to_string(), origin);
        }

        Self { origins }
    }

    /// Classify from loaded records
    pub fn from_records(baseline: &[Property], custom: &[Property]) -> Self {
        Self::classify(
            baseline.iter().map(|p| p.id.as_str()),
            custom.iter().map(|p| p.id.as_str()),
        )
    }

    /// Origin of an id, if known
    pub fn origin(&self, id: &str) -> Option<Origin> {
        self.origins.get(id).copied()
    }

    /// Whether the static catalog carries the id
    pub fn is_baseline(&self, id: &str) -> bool {
        self.origin(id).is_some_and(Origin::has_baseline_record)
    }

    pub fn len(&self) -> usize {
        self.origins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.origins.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        let map = OriginMap::classify(["a", "b"], ["b", "c"]);
        assert_eq!(map.origin("a"), Some(Origin::Default));
        assert_eq!(map.origin("b"), Some(Origin::Shadowing));
        assert_eq!(map.origin("c"), Some(Origin::Custom));
        assert_eq!(map.origin("d"), None);
        assert_eq!(map.len(), 3);
        assert!(map.is_baseline("b"));
        assert!(!map.is_baseline("c"));
    }

    #[test]
    fn test_duplicate_custom_ids_stay_custom() {
        let map = OriginMap::classify([], ["x", "x"]);
        assert_eq!(map.origin("x"), Some(Origin::Custom));
    }
}
