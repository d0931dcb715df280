//! Session-scoped boolean flag

use std::sync::Arc;

use crate::{KeyValueStore, Result};

const SET: &str = "true";

/// A `"true"`-valued key in a session store. Anything else reads as unset.
#[derive(Clone)]
pub struct SessionFlag {
    store: Arc<dyn KeyValueStore>,
    key: String,
}

impl SessionFlag {
    /// Create a flag stored under `key`
    pub fn new(store: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    /// Whether the flag holds `"true"`
    pub fn is_set(&self) -> bool {
        match self.store.get(&self.key) {
            Ok(value) => value.as_deref() == Some(SET),
            Err(e) => {
                tracing::warn!("Session flag {} unreadable: {}", self.key, e);
                false
            }
        }
    }

    /// Raise the flag
    pub fn set(&self) -> Result<()> {
        self.store.set(&self.key, SET)
    }

    /// Lower the flag
    pub fn clear(&self) -> Result<()> {
        self.store.remove(&self.key)
    }
}

impl std::fmt::Debug for SessionFlag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionFlag").field("key", &self.key).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryStore;

    #[test]
    fn test_flag_lifecycle() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let flag = SessionFlag::new(store.clone(), "xarcon-admin-auth");
        assert!(!flag.is_set());

        flag.set().unwrap();
        assert!(flag.is_set());
        assert_eq!(store.get("xarcon-admin-auth").unwrap().as_deref(), Some("true"));

        flag.clear().unwrap();
        assert!(!flag.is_set());
    }

    #[test]
    fn test_only_true_counts() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::with_entries([("auth", "1")]));
        assert!(!SessionFlag::new(store, "auth").is_set());
    }
}
