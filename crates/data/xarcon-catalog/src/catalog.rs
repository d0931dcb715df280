//! Catalog service: loader + stored admin state

use std::sync::Arc;
use tokio::sync::RwLock;

use xarcon_core::{OriginMap, Property};
use xarcon_store::{PropertyStore, StoredState};

use crate::{reconcile, CatalogLoader, Result};

/// Everything a view needs from one load
#[derive(Debug, Clone)]
pub struct CatalogSnapshot {
    pub baseline: Vec<Property>,
    pub stored: StoredState,
    pub properties: Vec<Property>,
    pub origins: OriginMap,
}

/// Reconciled catalog over a loader and a property store.
///
/// The baseline only changes on redeploy, so it is cached after the first
/// successful load; stored state is re-read on every call.
pub struct Catalog {
    loader: CatalogLoader,
    store: PropertyStore,
    baseline: Arc<RwLock<Option<Vec<Property>>>>,
}

impl Catalog {
    /// Create a catalog with an empty baseline cache
    pub fn new(loader: CatalogLoader, store: PropertyStore) -> Self {
        Self {
            loader,
            store,
            baseline: Arc::new(RwLock::new(None)),
        }
    }

    /// Get the property store
    pub fn store(&self) -> &PropertyStore {
        &self.store
    }

    /// Static catalog, cached
    pub async fn baseline(&self) -> Result<Vec<Property>> {
        {
            let cache = self.baseline.read().await;
            if let Some(baseline) = cache.as_ref() {
                return Ok(baseline.clone());
            }
        }

        let loaded = self.loader.load().await?;
        let mut cache = self.baseline.write().await;
        *cache = Some(loaded.clone());
        Ok(loaded)
    }

    /// Drop the cached baseline so the next call refetches it
    pub async fn refresh(&self) {
        let mut cache = self.baseline.write().await;
        *cache = None;
    }

    /// Baseline, stored state, merged catalog and origins in one pass
    pub async fn snapshot(&self) -> Result<CatalogSnapshot> {
        let baseline = self.baseline().await?;
        let stored = self.store.snapshot();
        let properties = reconcile(&baseline, &stored.custom, &stored.overrides, &stored.deleted);
        let origins = OriginMap::from_records(&baseline, &stored.custom);

        Ok(CatalogSnapshot {
            baseline,
            stored,
            properties,
            origins,
        })
    }

    /// The reconciled catalog
    pub async fn properties(&self) -> Result<Vec<Property>> {
        Ok(self.snapshot().await?.properties)
    }

    /// One listing from the merged catalog
    pub async fn property(&self, id: &str) -> Result<Option<Property>> {
        Ok(self.properties().await?.into_iter().find(|p| p.id == id))
    }

    /// Classify every known id
    pub async fn origins(&self) -> Result<OriginMap> {
        Ok(self.snapshot().await?.origins)
    }
}

impl std::fmt::Debug for Catalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Catalog")
            .field("loader", &self.loader)
            .field("store", &self.store)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CatalogError, CatalogSource};
    use tempfile::tempdir;
    use xarcon_config::StorageKeys;
    use xarcon_core::Origin;
    use xarcon_store::{KeyValueStore, MemoryStore};

    fn catalog_at(path: std::path::PathBuf, backend: Arc<dyn KeyValueStore>) -> Catalog {
        Catalog::new(
            CatalogLoader::new(CatalogSource::File(path)),
            PropertyStore::new(backend, StorageKeys::default()),
        )
    }

    #[tokio::test]
    async fn test_properties_merge_stored_state() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("properties.json");
        std::fs::write(
            &path,
            r#"[{"id": "a", "title": "Casa A", "price": 100000}, {"id": "b", "title": "Casa B"}]"#,
        )
        .unwrap();

        let backend: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::with_entries([
            ("xarcon_properties", r#"[{"id": "c", "title": "Casa C"}]"#),
            ("xarcon-admin-property-overrides", r#"{"a": {"price": 120000}}"#),
            ("xarcon-admin-deleted-properties", r#"["b"]"#),
        ]));
        let catalog = catalog_at(path, backend);

        let snapshot = catalog.snapshot().await.unwrap();
        let ids: Vec<_> = snapshot.properties.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);
        assert_eq!(snapshot.properties[0].price, 120000.0);
        assert_eq!(snapshot.origins.origin("a"), Some(Origin::Default));
        assert_eq!(snapshot.origins.origin("c"), Some(Origin::Custom));

        assert_eq!(catalog.property("c").await.unwrap().unwrap().title, "Casa C");
        assert!(catalog.property("b").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_corrupt_overrides_slot_is_ignored() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("properties.json");
        std::fs::write(
            &path,
            r#"[{"id": "a", "title": "Casa A", "price": 100000}, {"id": "b", "title": "Casa B"}]"#,
        )
        .unwrap();

        let stored = [
            ("xarcon_properties", r#"[{"id": "c", "title": "Casa C"}]"#),
            ("xarcon-admin-deleted-properties", r#"["b"]"#),
        ];
        let clean = catalog_at(path.clone(), Arc::new(MemoryStore::with_entries(stored)));
        let corrupt = catalog_at(
            path,
            Arc::new(MemoryStore::with_entries(
                stored
                    .into_iter()
                    .chain([("xarcon-admin-property-overrides", "{\"a\": {\"price\": 1")]),
            )),
        );

        let expected = clean.properties().await.unwrap();
        let merged = corrupt.properties().await.unwrap();
        assert_eq!(merged, expected);
        assert_eq!(merged[0].price, 100000.0);
        assert_eq!(merged.len(), 2);
    }

    #[tokio::test]
    async fn test_baseline_is_cached_until_refresh() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("properties.json");
        std::fs::write(&path, r#"[{"id": "a"}]"#).unwrap();

        let catalog = catalog_at(path.clone(), Arc::new(MemoryStore::new()));
        assert_eq!(catalog.properties().await.unwrap().len(), 1);

        std::fs::remove_file(&path).unwrap();
        assert_eq!(catalog.properties().await.unwrap().len(), 1);

        catalog.refresh().await;
        assert!(matches!(
            catalog.properties().await,
            Err(CatalogError::Unavailable { .. })
        ));
    }
}
