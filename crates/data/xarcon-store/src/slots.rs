//! Storage accessor for the admin slots
//!
//! | slot | value | empty default |
//! |---|---|---|
//! | `properties` | array of canonical records | `[]` |
//! | `overrides` | object: id → partial record | `{}` |
//! | `deleted` | array of ids | `[]` |
//! | legacy property slots | array of records, any schema | read once, migrated |

use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;

use xarcon_config::StorageKeys;
use xarcon_core::{DeletedIds, Fields, Overrides, Property, RawProperty};

use crate::{KeyValueStore, Result};

/// The three live slots read together
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoredState {
    pub custom: Vec<Property>,
    pub overrides: Overrides,
    pub deleted: DeletedIds,
}

/// Typed access to the admin slots of a [`KeyValueStore`]
#[derive(Clone)]
pub struct PropertyStore {
    store: Arc<dyn KeyValueStore>,
    keys: StorageKeys,
}

impl PropertyStore {
    /// Create a property store over a backend
    pub fn new(store: Arc<dyn KeyValueStore>, keys: StorageKeys) -> Self {
        Self { store, keys }
    }

    /// Get the slot keys
    pub fn keys(&self) -> &StorageKeys {
        &self.keys
    }

    /// Custom listings, migrating a legacy slot on first read when the
    /// primary slot is empty
    pub fn custom_properties(&self) -> Vec<Property> {
        let primary = self.read_records(&self.keys.properties);
        if !primary.is_empty() {
            return primary;
        }

        for legacy_key in self.keys.legacy_sources() {
            let legacy = self.read_records(legacy_key);
            if legacy.is_empty() {
                continue;
            }

            tracing::info!(
                "Migrating {} custom listings from legacy slot {}",
                legacy.len(),
                legacy_key
            );
            if let Err(e) = self.set_custom_properties(&legacy) {
                tracing::warn!("Legacy migration write failed: {}", e);
            }
            return legacy;
        }

        primary
    }

    /// Save custom listings
    pub fn set_custom_properties(&self, properties: &[Property]) -> Result<()> {
        self.write_slot(&self.keys.properties, &properties)
    }

    /// Override patches; non-object entries are dropped
    pub fn overrides(&self) -> Overrides {
        let raw: serde_json::Map<String, Value> = self.read_slot(&self.keys.overrides);
        raw.into_iter()
            .filter_map(|(id, patch)| match patch {
                Value::Object(fields) => Some((id, fields)),
                _ => {
                    tracing::warn!("Ignoring non-object override for {}", id);
                    None
                }
            })
            .collect()
    }

    /// Save override patches
    pub fn set_overrides(&self, overrides: &Overrides) -> Result<()> {
        self.write_slot(&self.keys.overrides, overrides)
    }

    /// Single override patch, if any
    pub fn override_for(&self, id: &str) -> Option<Fields> {
        self.overrides().remove(id)
    }

    /// Deleted ids; numbers are kept as text, other junk is dropped
    pub fn deleted_ids(&self) -> DeletedIds {
        let raw: Vec<Value> = self.read_slot(&self.keys.deleted);
        raw.into_iter()
            .filter_map(|id| match id {
                Value::String(s) if !s.is_empty() => Some(s),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .collect()
    }

    /// Save deleted ids
    pub fn set_deleted_ids(&self, deleted: &DeletedIds) -> Result<()> {
        self.write_slot(&self.keys.deleted, deleted)
    }

    /// Read all three slots
    pub fn snapshot(&self) -> StoredState {
        StoredState {
            custom: self.custom_properties(),
            overrides: self.overrides(),
            deleted: self.deleted_ids(),
        }
    }

    fn read_records(&self, key: &str) -> Vec<Property> {
        let raw: Vec<Value> = self.read_slot(key);
        raw.into_iter()
            .map(|value| RawProperty::from_value(value).normalize())
            .collect()
    }

    /// Missing, unreadable, `null` or malformed slots all read as `T::default()`
    fn read_slot<T>(&self, key: &str) -> T
    where
        T: DeserializeOwned + Default,
    {
        let content = match self.store.get(key) {
            Ok(Some(content)) => content,
            Ok(None) => return T::default(),
            Err(e) => {
                tracing::warn!("Storage slot {} unreadable: {}", key, e);
                return T::default();
            }
        };

        match serde_json::from_str::<Option<T>>(&content) {
            Ok(value) => value.unwrap_or_default(),
            Err(e) => {
                tracing::warn!("Storage slot {} is corrupt, using empty default: {}", key, e);
                T::default()
            }
        }
    }

    fn write_slot<T>(&self, key: &str, value: &T) -> Result<()>
    where
        T: serde::Serialize + ?Sized,
    {
        let content = serde_json::to_string(value)?;
        self.store.set(key, &content)
    }
}

impl std::fmt::Debug for PropertyStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PropertyStore")
            .field("keys", &self.keys)
            .finish()
    }
}
