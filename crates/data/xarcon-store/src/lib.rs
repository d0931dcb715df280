//! # Xarcon Store
//!
//! Browser-style storage for admin state.
//!
//! ```text
//! PropertyStore ──► KeyValueStore (trait)
//!                    ├── MemoryStore   tests, session scope
//!                    └── FileStore     one JSON object per profile
//! ```
//!
//! Slots hold JSON-encoded strings exactly like `localStorage` does. Reads
//! through [`PropertyStore`] never fail: a missing or corrupt slot reads as
//! its empty default.

pub mod kv;
pub mod session;
pub mod slots;

pub use kv::{FileStore, KeyValueStore, MemoryStore};
pub use session::SessionFlag;
pub use slots::{PropertyStore, StoredState};

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Store file is not a JSON object: {}", .0.display())]
    Corrupt(PathBuf),

    #[error("Store lock poisoned")]
    Poisoned,
}

pub type Result<T> = std::result::Result<T, StoreError>;
