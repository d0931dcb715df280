//! Listing photos → inline `data:` URIs
//!
//! Files are read one at a time. Oversized and non-image files are reported,
//! never fatal; remote `http(s)` images are kept as given.

use base64::Engine;
use std::path::Path;

use xarcon_config::ImageConfig;

/// `0 B`, `512 B`, `1.5 KB`, `3.00 MB`
pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = 1024 * 1024;
    match bytes {
        0 => "0 B".to_string(),
        b if b < KB => format!("{b} B"),
        b if b < MB => format!("{:.1} KB", b as f64 / KB as f64),
        b => format!("{:.2} MB", b as f64 / MB as f64),
    }
}

/// Decoded size of a base64 `data:` URI, rounded up
pub fn estimated_size(data_uri: &str) -> u64 {
    (data_uri.len() as u64 * 3).div_ceil(4)
}

/// MIME type of a `data:` URI; `image/*` when it carries none
pub fn mime_of(data_uri: &str) -> &str {
    data_uri
        .strip_prefix("data:")
        .and_then(|rest| rest.split([';', ',']).next())
        .filter(|mime| !mime.is_empty())
        .unwrap_or("image/*")
}

fn mime_for_path(path: &Path) -> Option<&'static str> {
    let extension = path.extension()?.to_str()?.to_ascii_lowercase();
    let mime = match extension.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "avif" => "image/avif",
        "svg" => "image/svg+xml",
        "bmp" => "image/bmp",
        _ => return None,
    };
    Some(mime)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OversizedImage {
    pub source: String,
    pub bytes: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedImage {
    pub source: String,
    pub reason: String,
}

/// Outcome of one ingest batch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestReport {
    /// Ready to store on the listing, in input order
    pub images: Vec<String>,
    pub oversized: Vec<OversizedImage>,
    pub rejected: Vec<RejectedImage>,
}

impl IngestReport {
    /// Status line for the upload form
    pub fn summary(&self, max_bytes: u64) -> String {
        let mut lines = Vec::new();
        if !self.oversized.is_empty() {
            let skipped: Vec<String> = self
                .oversized
                .iter()
                .map(|o| format!("{} ({})", o.source, format_bytes(o.bytes)))
                .collect();
            lines.push(format!(
                "Se omitieron archivos mayores de {}: {}",
                format_bytes(max_bytes),
                skipped.join(", ")
            ));
        }
        if !self.rejected.is_empty() {
            let rejected: Vec<String> = self
                .rejected
                .iter()
                .map(|r| format!("{} ({})", r.source, r.reason))
                .collect();
            lines.push(format!("Archivos no válidos: {}", rejected.join(", ")));
        }
        lines.push(format!("{} imagen(es) lista(s)", self.images.len()));
        lines.join("\n")
    }
}

/// Reads local image files into `data:` URIs under a size ceiling
#[derive(Debug, Clone)]
pub struct ImageIngestor {
    max_bytes: u64,
}

impl ImageIngestor {
    /// Create an ingestor with a per-file byte ceiling
    pub fn new(max_bytes: u64) -> Self {
        Self { max_bytes }
    }

    /// Create an ingestor from the image config
    pub fn from_config(config: &ImageConfig) -> Self {
        Self::new(config.max_bytes)
    }

    /// Get the per-file byte ceiling
    pub fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    /// Turn paths and URLs into listing images, in order
    pub async fn ingest<S: AsRef<str>>(&self, sources: &[S]) -> IngestReport {
        let mut report = IngestReport::default();

        for source in sources {
            let source = source.as_ref().trim();
            if source.is_empty() {
                continue;
            }
            if source.starts_with("http://")
                || source.starts_with("https://")
                || source.starts_with("data:image/")
            {
                report.images.push(source.to_string());
                continue;
            }

            let path = Path::new(source);
            let Some(mime) = mime_for_path(path) else {
                report.rejected.push(RejectedImage {
                    source: source.to_string(),
                    reason: "not an image".to_string(),
                });
                continue;
            };

            match self.read(path).await {
                Ok(Some(bytes)) => {
                    let encoded = base64::engine::general_purpose::STANDARD.encode(&bytes);
                    report.images.push(format!("data:{mime};base64,{encoded}"));
                }
                Ok(None) => {
                    let bytes = tokio::fs::metadata(path).await.map(|m| m.len()).unwrap_or(0);
                    tracing::warn!("Skipping {}: {} exceeds the image limit", source, format_bytes(bytes));
                    report.oversized.push(OversizedImage {
                        source: source.to_string(),
                        bytes,
                    });
                }
                Err(e) => {
                    tracing::warn!("Could not read image {}: {}", source, e);
                    report.rejected.push(RejectedImage {
                        source: source.to_string(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        tracing::info!(
            ready = report.images.len(),
            oversized = report.oversized.len(),
            rejected = report.rejected.len(),
            "Ingested listing images"
        );
        report
    }

    /// `None` when the file is over the ceiling
    async fn read(&self, path: &Path) -> std::io::Result<Option<Vec<u8>>> {
        let metadata = tokio::fs::metadata(path).await?;
        if metadata.len() > self.max_bytes {
            return Ok(None);
        }
        tokio::fs::read(path).await.map(Some)
    }
}
