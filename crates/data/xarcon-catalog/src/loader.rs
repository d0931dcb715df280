//! Static catalog loader
//!
//! Reads the deploy-time JSON array either over HTTP or from disk and
//! normalizes every entry. No retries: a failure is reported to the caller
//! as [`CatalogError::Unavailable`].

use serde_json::Value;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

use xarcon_config::CatalogConfig;
use xarcon_core::{Property, RawProperty};

use crate::{CatalogError, Result, UnavailableReason};

/// Where the static catalog lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogSource {
    Http(Url),
    File(PathBuf),
}

impl CatalogSource {
    /// `http(s)://` strings are URLs, anything else is a path
    pub fn parse(source: &str) -> Self {
        let trimmed = source.trim();
        if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            if let Ok(url) = Url::parse(trimmed) {
                return CatalogSource::Http(url);
            }
        }
        CatalogSource::File(PathBuf::from(trimmed))
    }

    /// URL or path, for error messages
    pub fn location(&self) -> String {
        match self {
            CatalogSource::Http(url) => url.to_string(),
            CatalogSource::File(path) => path.display().to_string(),
        }
    }
}

/// Fetches and normalizes the baseline catalog
pub struct CatalogLoader {
    source: CatalogSource,
    client: reqwest::Client,
}

impl CatalogLoader {
    /// Create a loader for a source
    pub fn new(source: CatalogSource) -> Self {
        Self {
            source,
            client: build_client(Duration::from_secs(10)),
        }
    }

    /// Create a loader from the catalog config
    pub fn from_config(config: &CatalogConfig) -> Self {
        Self::new(CatalogSource::parse(&config.source))
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
    }

    /// Set request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.client = build_client(timeout);
        self
    }

    /// Get the catalog source
    pub fn source(&self) -> &CatalogSource {
        &self.source
    }

    /// Load and normalize the catalog
    pub async fn load(&self) -> Result<Vec<Property>> {
        let payload = self.fetch().await?;
        let properties = parse_catalog(&self.source.location(), payload)?;
        tracing::info!(
            "Loaded {} baseline listings from {}",
            properties.len(),
            self.source.location()
        );
        Ok(properties)
    }

    async fn fetch(&self) -> Result<Value> {
        let location = self.source.location();
        match &self.source {
            CatalogSource::Http(url) => {
                let response = self
                    .client
                    .get(url.clone())
                    .send()
                    .await
                    .map_err(|e| CatalogError::unavailable(&location, UnavailableReason::Http(e.to_string())))?;

                if !response.status().is_success() {
                    return Err(CatalogError::unavailable(
                        &location,
                        UnavailableReason::Status(response.status().as_u16()),
                    ));
                }

                response
                    .json::<Value>()
                    .await
                    .map_err(|e| CatalogError::unavailable(&location, UnavailableReason::Json(e.to_string())))
            }
            CatalogSource::File(path) => {
                let content = tokio::fs::read_to_string(path)
                    .await
                    .map_err(|e| CatalogError::unavailable(&location, UnavailableReason::Io(e.to_string())))?;

                serde_json::from_str(&content)
                    .map_err(|e| CatalogError::unavailable(&location, UnavailableReason::Json(e.to_string())))
            }
        }
    }
}

impl std::fmt::Debug for CatalogLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogLoader")
            .field("source", &self.source)
            .finish()
    }
}

fn build_client(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .unwrap_or_default()
}

/// Normalize a catalog payload. Entries that are not objects, or that end
/// up without an id, are skipped.
pub fn parse_catalog(location: &str, payload: Value) -> Result<Vec<Property>> {
    let Value::Array(entries) = payload else {
        return Err(CatalogError::unavailable(location, UnavailableReason::NotAnArray));
    };

    let mut properties = Vec::with_capacity(entries.len());
    for (index, entry) in entries.into_iter().enumerate() {
        if !entry.is_object() {
            tracing::warn!("Skipping catalog entry {}: not an object", index);
            continue;
        }

        let property = RawProperty::from_value(entry).normalize();
        if property.id.is_empty() {
            tracing::warn!("Skipping catalog entry {}: no id or title", index);
            continue;
        }
        properties.push(property);
    }

    Ok(properties)
}
