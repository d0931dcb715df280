//! Wiring from config to services

use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;

use xarcon_admin::{AdminAuth, AdminPanel, ImageIngestor};
use xarcon_catalog::{Catalog, CatalogLoader};
use xarcon_config::Config;
use xarcon_store::{FileStore, KeyValueStore, PropertyStore};

/// Loaded config and the two storage backends
pub struct App {
    pub config: Config,
    local: Arc<dyn KeyValueStore>,
    session: Arc<dyn KeyValueStore>,
}

impl App {
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let config = Config::load(config_path).context("Failed to load configuration")?;
        tracing::debug!(
            "Catalog {} with data in {}",
            config.catalog.source,
            config.data_dir.display()
        );

        Ok(Self {
            local: Arc::new(FileStore::at_path(config.local_store_path())),
            session: Arc::new(FileStore::at_path(config.session_store_path())),
            config,
        })
    }

    /// Catalog over the local store
    pub fn catalog(&self) -> Catalog {
        Catalog::new(
            CatalogLoader::from_config(&self.config.catalog),
            PropertyStore::new(self.local.clone(), self.config.storage.clone()),
        )
    }

    /// Credential check over the local and session stores
    pub fn auth(&self) -> AdminAuth {
        AdminAuth::new(
            self.local.clone(),
            self.session.clone(),
            &self.config.storage,
            &self.config.admin,
        )
    }

    /// Fails unless `xarcon admin login` ran first
    pub async fn panel(&self) -> Result<AdminPanel> {
        AdminPanel::open(self.catalog(), self.auth(), &self.config.admin)
            .await
            .context("Cannot open the admin panel (try `xarcon admin login`)")
    }

    pub fn ingestor(&self) -> ImageIngestor {
        ImageIngestor::from_config(&self.config.images)
    }
}
