//! Baseline + custom + overrides − deletions
//!
//! Deterministic and origin-agnostic. Output order is stable: baseline order
//! first, then ids that only exist as custom records, in their stored order.

use serde_json::Value;
use std::collections::HashMap;

use xarcon_core::{normalize, DeletedIds, Fields, Overrides, Property, RawProperty};

/// Merge the four inputs into one catalog.
///
/// 1. baseline records, then custom records; a custom record with a
///    baseline id replaces it wholesale
/// 2. each override patch is shallow-merged over its record and
///    re-normalized; patches for unknown ids are dropped
/// 3. ids in `deleted` are removed
pub fn reconcile(
    baseline: &[Property],
    custom: &[Property],
    overrides: &Overrides,
    deleted: &DeletedIds,
) -> Vec<Property> {
    let mut order: Vec<String> = Vec::with_capacity(baseline.len() + custom.len());
    let mut records: HashMap<String, Property> = HashMap::with_capacity(order.capacity());

    for property in baseline.iter().chain(custom) {
        let property = normalize(RawProperty::Canonical(property.clone()));
        if property.id.is_empty() {
            tracing::debug!("Skipping listing without id: {:?}", property.title);
            continue;
        }
        let id = property.id.clone();
        if records.insert(id.clone(), property).is_none() {
            order.push(id);
        }
    }

    let mut applied = 0usize;
    for (id, patch) in overrides {
        match records.get_mut(id) {
            Some(existing) => {
                *existing = apply_patch(existing, patch);
                applied += 1;
            }
            None => tracing::debug!("Dropping override for unknown listing {}", id),
        }
    }

    let merged: Vec<Property> = order
        .into_iter()
        .filter(|id| !deleted.contains(id))
        .filter_map(|id| records.remove(&id))
        .collect();

    tracing::debug!(
        baseline = baseline.len(),
        custom = custom.len(),
        overrides = applied,
        deleted = deleted.len(),
        total = merged.len(),
        "Reconciled catalog"
    );

    merged
}

/// Loose spellings the normalizer accepts, next to their canonical key
const FIELD_ALIASES: [(&str, &str); 5] = [
    ("dateAdded", "createdAt"),
    ("images", "image"),
    ("area", "size"),
    ("latitude", "lat"),
    ("longitude", "lng"),
];

/// Shallow-merge `patch` over `base` and re-normalize.
///
/// The id is never patched. A patch that mentions `status` or `sold` owns
/// the sale state, so the base record's pair is dropped first. Likewise a
/// patch that only carries an alias (`createdAt`, `image`, `size`, `lat`,
/// `lng`) replaces the base record's canonical field.
pub fn apply_patch(base: &Property, patch: &Fields) -> Property {
    let mut fields = base.to_fields();

    if patch.contains_key("status") || patch.contains_key("sold") {
        fields.remove("status");
        fields.remove("sold");
    }
    for (canonical, alias) in FIELD_ALIASES {
        if patch.contains_key(alias) && !patch.contains_key(canonical) {
            fields.remove(canonical);
        }
    }

    for (key, value) in patch {
        fields.insert(key.clone(), value.clone());
    }
    fields.insert("id".to_string(), Value::String(base.id.clone()));

    normalize(RawProperty::Loose(fields))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::BTreeSet;
    use chrono::NaiveDate;
    use xarcon_core::Status;

    fn record(value: Value) -> Property {
        RawProperty::from_value(value).normalize()
    }

    fn patch(value: Value) -> Fields {
        value.as_object().cloned().unwrap()
    }

    fn overrides(entries: &[(&str, Value)]) -> Overrides {
        entries
            .iter()
            .map(|(id, value)| (id.to_string(), patch(value.clone())))
            .collect()
    }

    fn deleted(ids: &[&str]) -> DeletedIds {
        ids.iter().map(|id| id.to_string()).collect()
    }

    fn casa_a() -> Property {
        record(json!({ "id": "a", "title": "Casa A", "price": 100000, "images": ["x.jpg"], "sold": false }))
    }

    #[test]
    fn test_override_patches_price() {
        let result = reconcile(
            &[casa_a()],
            &[],
            &overrides(&[("a", json!({ "price": 120000 }))]),
            &deleted(&[]),
        );
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].id, "a");
        assert_eq!(result[0].title, "Casa A");
        assert_eq!(result[0].price, 120000.0);
        assert_eq!(result[0].status, Status::Available);
        assert!(!result[0].sold);
    }

    #[test]
    fn test_custom_replaces_baseline_wholesale() {
        let custom = record(json!({ "id": "a", "title": "Casa A v2", "images": ["y.jpg"] }));
        let result = reconcile(&[casa_a()], &[custom], &Overrides::new(), &deleted(&[]));
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].title, "Casa A v2");
        assert_eq!(result[0].price, 0.0);
        assert_eq!(result[0].images, vec!["y.jpg"]);
    }

    #[test]
    fn test_deleted_baseline_disappears() {
        let result = reconcile(&[casa_a()], &[], &Overrides::new(), &deleted(&["a"]));
        assert!(result.is_empty());
    }

    #[test]
    fn test_deletion_dominates_override() {
        let result = reconcile(
            &[casa_a()],
            &[],
            &overrides(&[("a", json!({ "title": "Editada" }))]),
            &deleted(&["a"]),
        );
        assert!(result.is_empty());
    }

    #[test]
    fn test_unknown_override_is_noop() {
        let baseline = [casa_a()];
        let custom = [record(json!({ "id": "c", "title": "Custom" }))];
        let without = reconcile(&baseline, &custom, &Overrides::new(), &deleted(&[]));
        let with = reconcile(
            &baseline,
            &custom,
            &overrides(&[("ghost", json!({ "price": 1 }))]),
            &deleted(&[]),
        );
        assert_eq!(without, with);
    }

    #[test]
    fn test_deterministic_and_ordered() {
        let baseline = [
            record(json!({ "id": "b1", "title": "B1" })),
            record(json!({ "id": "b2", "title": "B2" })),
        ];
        let custom = [
            record(json!({ "id": "c1", "title": "C1" })),
            record(json!({ "id": "b1", "title": "B1 custom" })),
        ];
        let patches = overrides(&[("b2", json!({ "featured": true })), ("c1", json!({ "sold": true }))]);

        let first = reconcile(&baseline, &custom, &patches, &deleted(&[]));
        let second = reconcile(&baseline, &custom, &patches, &deleted(&[]));
        assert_eq!(first, second);

        let ids: Vec<_> = first.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["b1", "b2", "c1"]);
        assert_eq!(first[0].title, "B1 custom");
        assert!(first[1].featured);
        assert_eq!(first[2].status, Status::Sold);

        let unique: BTreeSet<_> = first.iter().map(|p| p.id.clone()).collect();
        assert_eq!(unique.len(), first.len());
    }

    #[test]
    fn test_patch_sold_flag_overrides_status() {
        let mut base = casa_a();
        base.set_status(Status::Available);
        let patched = apply_patch(&base, &patch(json!({ "sold": true })));
        assert_eq!(patched.status, Status::Sold);
        assert!(patched.sold);

        let patched = apply_patch(&patched, &patch(json!({ "status": "available" })));
        assert!(!patched.sold);
    }

    #[test]
    fn test_patch_cannot_change_id_and_renormalizes() {
        let patched = apply_patch(
            &casa_a(),
            &patch(json!({ "id": "b", "price": "oops", "images": ["z.jpg", null] })),
        );
        assert_eq!(patched.id, "a");
        assert_eq!(patched.price, 0.0);
        assert_eq!(patched.images, vec!["z.jpg"]);
    }

    #[test]
    fn test_patch_aliases_replace_canonical_fields() {
        let mut base = casa_a();
        base.area = 10.0;
        base.date_added = NaiveDate::from_ymd_opt(2024, 1, 1);
        base.latitude = Some(12.0);

        let patched = apply_patch(
            &base,
            &patch(json!({
                "createdAt": "2024-05-07T10:00:00Z",
                "image": "y.jpg",
                "size": 250,
                "lat": 13.5
            })),
        );
        assert_eq!(patched.date_added, NaiveDate::from_ymd_opt(2024, 5, 7));
        assert_eq!(patched.images, vec!["y.jpg"]);
        assert_eq!(patched.area, 250.0);
        assert_eq!(patched.latitude, Some(13.5));

        let both = apply_patch(&base, &patch(json!({ "area": 40, "size": 250 })));
        assert_eq!(both.area, 40.0);
    }

    #[test]
    fn test_records_without_id_are_skipped() {
        let result = reconcile(&[Property::empty("")], &[], &Overrides::new(), &deleted(&[]));
        assert!(result.is_empty());
    }
}
