//! Xarcon configuration
//!
//! Loaded from YAML, then patched from the environment:
//!
//! ```text
//! --config <path>  >  $XARCON_CONFIG  >  ~/.config/xarcon/config.yaml  >  defaults
//!
//! XARCON_CATALOG        catalog.source
//! XARCON_DATA_DIR       data_dir
//! XARCON_MAPS_API_KEY   maps.api_key
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Placeholder key shipped in the site template
pub const MAPS_KEY_PLACEHOLDER: &str = "YOUR_GOOGLE_MAPS_API_KEY";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Storage slot keys. The same names the site has always used in the
/// browser, so exported storage files stay interchangeable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageKeys {
    /// Custom listings (primary slot)
    pub properties: String,
    /// First legacy source for custom listings
    pub primary_legacy_properties: String,
    /// Second legacy source for custom listings
    pub legacy_properties: String,
    /// Override patches keyed by id
    pub overrides: String,
    /// Deleted ids
    pub deleted: String,
    /// Session flag gating the admin panel
    pub admin_auth: String,
    /// SHA-256 of `user:password`
    pub admin_credentials: String,
}

impl Default for StorageKeys {
    fn default() -> Self {
        Self {
            properties: "xarcon_properties".to_string(),
            primary_legacy_properties: "realEstateProperties".to_string(),
            legacy_properties: "xarcon-admin-properties".to_string(),
            overrides: "xarcon-admin-property-overrides".to_string(),
            deleted: "xarcon-admin-deleted-properties".to_string(),
            admin_auth: "xarcon-admin-auth".to_string(),
            admin_credentials: "xarcon-admin-credentials-hash".to_string(),
        }
    }
}

impl StorageKeys {
    /// Legacy custom-listing slots in migration priority order
    pub fn legacy_sources(&self) -> [&str; 2] {
        [&self.primary_legacy_properties, &self.legacy_properties]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// `http(s)://` URL or filesystem path of the static catalog
    pub source: String,
    pub timeout_secs: u64,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            source: "data/properties.json".to_string(),
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminConfig {
    /// `user:password` seeded when no credential hash is stored yet
    pub default_credentials: String,
    pub default_agent: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            default_credentials: "admin:Xarcon#2026".to_string(),
            default_agent: "Equipo Xarcon".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageConfig {
    /// Per-file ceiling for ingested images
    pub max_bytes: u64,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            max_bytes: 3 * 1024 * 1024,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapView {
    pub lat: f64,
    pub lng: f64,
    pub zoom: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapsConfig {
    pub api_key: String,
    /// Public map page
    pub public_view: MapView,
    /// Admin coordinate editor
    pub editor_view: MapView,
}

impl Default for MapsConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            public_view: MapView {
                lat: 12.1149926,
                lng: -86.2361744,
                zoom: 9,
            },
            editor_view: MapView {
                lat: 12.8654,
                lng: -85.2072,
                zoom: 7,
            },
        }
    }
}

impl MapsConfig {
    /// A usable key is configured
    pub fn has_key(&self) -> bool {
        let key = self.api_key.trim();
        !key.is_empty() && key != MAPS_KEY_PLACEHOLDER
    }
}

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub storage: StorageKeys,
    pub catalog: CatalogConfig,
    pub admin: AdminConfig,
    pub images: ImageConfig,
    pub maps: MapsConfig,
    /// Holds `local.json` and `session.json`
    pub data_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            storage: StorageKeys::default(),
            catalog: CatalogConfig::default(),
            admin: AdminConfig::default(),
            images: ImageConfig::default(),
            maps: MapsConfig::default(),
            data_dir: default_data_dir(),
        }
    }
}

impl Config {
    /// Resolve the config file, read it if present, then apply env overrides
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = explicit
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os("XARCON_CONFIG").map(PathBuf::from))
            .or_else(default_config_path);

        let mut config = match path {
            Some(path) if path.exists() => Self::from_file(&path)?,
            Some(path) if explicit.is_some() => {
                return Err(ConfigError::Io {
                    source: std::io::Error::new(std::io::ErrorKind::NotFound, "config file not found"),
                    path,
                })
            }
            _ => Self::default(),
        };

        config.apply_env(|name| std::env::var(name).ok());
        Ok(config)
    }

    /// Load config from a YAML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_yaml(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Parse config from YAML text
    pub fn from_yaml(content: &str) -> std::result::Result<Self, serde_yaml::Error> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content)
    }

    /// Apply overrides from a variable lookup (the process env in practice)
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(source) = lookup("XARCON_CATALOG").filter(|v| !v.is_empty()) {
            self.catalog.source = source;
        }
        if let Some(dir) = lookup("XARCON_DATA_DIR").filter(|v| !v.is_empty()) {
            self.data_dir = PathBuf::from(dir);
        }
        if let Some(key) = lookup("XARCON_MAPS_API_KEY") {
            self.maps.api_key = key;
        }
    }

    /// Persistent store file (the site's local storage)
    pub fn local_store_path(&self) -> PathBuf {
        self.data_dir.join("local.json")
    }

    /// Session store file, cleared on logout
    pub fn session_store_path(&self) -> PathBuf {
        self.data_dir.join("session.json")
    }
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("xarcon").join("config.yaml"))
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("xarcon")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    #[test]
    fn test_defaults_match_site_keys() {
        let config = Config::default();
        assert_eq!(config.storage.properties, "xarcon_properties");
        assert_eq!(
            config.storage.legacy_sources(),
            ["realEstateProperties", "xarcon-admin-properties"]
        );
        assert_eq!(config.images.max_bytes, 3_145_728);
        assert!(!config.maps.has_key());
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = Config::from_yaml(
            "catalog:\n  source: https://example.com/data/properties.json\nmaps:\n  api_key: abc\n",
        )
        .unwrap();
        assert_eq!(config.catalog.source, "https://example.com/data/properties.json");
        assert_eq!(config.catalog.timeout_secs, 10);
        assert_eq!(config.storage, StorageKeys::default());
        assert!(config.maps.has_key());
        assert_eq!(config.maps.public_view.zoom, 9);
    }

    #[test]
    fn test_placeholder_key_is_not_a_key() {
        let mut maps = MapsConfig::default();
        maps.api_key = MAPS_KEY_PLACEHOLDER.to_string();
        assert!(!maps.has_key());
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            ("XARCON_CATALOG", "site/data/properties.json"),
            ("XARCON_DATA_DIR", "/tmp/xarcon-test"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_env(|name| vars.get(name).map(|v| v.to_string()));
        assert_eq!(config.catalog.source, "site/data/properties.json");
        assert_eq!(config.local_store_path(), PathBuf::from("/tmp/xarcon-test/local.json"));
        assert_eq!(config.maps.api_key, "");
    }

    #[test]
    fn test_from_file_errors_name_the_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "catalog: [not, a, map]").unwrap();

        let err = Config::from_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("config.yaml"));

        let missing = dir.path().join("missing.yaml");
        assert!(matches!(Config::load(Some(&missing)), Err(ConfigError::Io { .. })));
    }
}
