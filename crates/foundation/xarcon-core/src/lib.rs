//! # Xarcon Core
//!
//! Canonical listing model shared by every Xarcon crate.
//!
//! ```text
//! baseline JSON ─┐
//! stored custom ─┼─► RawProperty ──normalize──► Property
//! override patch ┘
//! ```
//!
//! - [`Property`] is the canonical record every view works with
//! - [`RawProperty`] is whatever arrived from disk, HTTP or a form
//! - [`normalize`] turns the latter into the former and never fails
//! - [`OriginMap`] answers "did this id come from the static catalog?"

pub mod normalize;
pub mod origin;
pub mod property;
pub mod raw;
pub mod slug;

pub use normalize::normalize;
pub use origin::{Origin, OriginMap};
pub use property::{ParseStatusError, Property, Status, DEFAULT_AGENT, DEFAULT_TYPE};
pub use raw::RawProperty;
pub use slug::{fold, slugify};

/// Field map used for loose records and override patches
pub type Fields = serde_json::Map<String, serde_json::Value>;

/// Override patches keyed by property id
pub type Overrides = std::collections::BTreeMap<String, Fields>;

/// Ids suppressed from the catalog
pub type DeletedIds = std::collections::BTreeSet<String>;
