//! # Xarcon Admin
//!
//! The write path behind the admin panel.
//!
//! ```text
//! AdminAuth ──► session flag ──► require_auth()
//!                                     │
//! ListingDraft ──► AdminPanel::submit ┤──► Origin ──┬─ Default   → override patch
//!                                     │             ├─ Custom    → custom record
//!                                     │             └─ Shadowing → custom record
//!                  AdminPanel::delete ┘
//! ```
//!
//! Every write lands in the [`xarcon_store::PropertyStore`] slots; the
//! reconciled catalog is recomputed on the next read.

pub mod auth;
pub mod coords;
pub mod ids;
pub mod images;
pub mod panel;

pub use auth::{hash_credentials, AdminAuth};
pub use coords::round_coordinate;
pub use ids::generate_unique_id;
pub use images::{estimated_size, format_bytes, mime_of, ImageIngestor, IngestReport};
pub use panel::{AdminPanel, ListingDraft, SubmitMode};

use thiserror::Error;
use xarcon_catalog::CatalogError;
use xarcon_store::StoreError;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    #[error("A listing needs a title or an id")]
    MissingId,

    #[error("A listing needs at least one image")]
    NoImages,

    #[error("Coordinates out of range")]
    CoordinatesOutOfRange,
}

#[derive(Error, Debug)]
pub enum AdminError {
    #[error("Admin session required")]
    Unauthorized,

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Invalid listing: {0}")]
    Validation(#[from] ValidationError),

    #[error("Listing not found: {0}")]
    NotFound(String),

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

pub type Result<T> = std::result::Result<T, AdminError>;
