//! Admin login
//!
//! A single credential pair, stored as the SHA-256 hex digest of
//! `user:password`. The seeded default is written on first read.

use sha2::{Digest, Sha256};
use std::sync::Arc;

use xarcon_config::{AdminConfig, StorageKeys};
use xarcon_store::{KeyValueStore, SessionFlag};

use crate::{AdminError, Result};

/// SHA-256 hex of `user:password`
pub fn hash_credentials(username: &str, password: &str) -> String {
    hash_text(&format!("{}:{}", username.trim(), password))
}

fn hash_text(value: &str) -> String {
    hex::encode(Sha256::digest(value.as_bytes()))
}

/// Admin credential check and session gate
pub struct AdminAuth {
    local: Arc<dyn KeyValueStore>,
    credentials_key: String,
    default_credentials: String,
    session: SessionFlag,
}

impl AdminAuth {
    /// `local` holds the credential hash, `session` the login flag
    pub fn new(
        local: Arc<dyn KeyValueStore>,
        session: Arc<dyn KeyValueStore>,
        keys: &StorageKeys,
        admin: &AdminConfig,
    ) -> Self {
        Self {
            local,
            credentials_key: keys.admin_credentials.clone(),
            default_credentials: admin.default_credentials.clone(),
            session: SessionFlag::new(session, keys.admin_auth.clone()),
        }
    }

    fn stored_hash(&self) -> Result<String> {
        if let Some(hash) = self.local.get(&self.credentials_key)? {
            if !hash.trim().is_empty() {
                return Ok(hash.trim().to_string());
            }
        }

        let seeded = hash_text(&self.default_credentials);
        self.local.set(&self.credentials_key, &seeded)?;
        tracing::info!("Seeded default admin credentials");
        Ok(seeded)
    }

    /// Open a session when the credentials match the stored hash
    pub fn login(&self, username: &str, password: &str) -> Result<()> {
        if hash_credentials(username, password) != self.stored_hash()? {
            tracing::warn!("Rejected admin login for {:?}", username.trim());
            return Err(AdminError::InvalidCredentials);
        }
        self.session.set()?;
        tracing::info!("Admin session opened");
        Ok(())
    }

    /// Close the session
    pub fn logout(&self) -> Result<()> {
        self.session.clear()?;
        tracing::info!("Admin session closed");
        Ok(())
    }

    /// Whether a session is open
    pub fn is_authenticated(&self) -> bool {
        self.session.is_set()
    }

    /// Fail with `Unauthorized` unless a session is open
    pub fn require_auth(&self) -> Result<()> {
        if self.is_authenticated() {
            Ok(())
        } else {
            Err(AdminError::Unauthorized)
        }
    }

    /// Replace the stored pair. Needs an open session.
    pub fn change_credentials(&self, username: &str, password: &str) -> Result<()> {
        self.require_auth()?;
        self.local
            .set(&self.credentials_key, &hash_credentials(username, password))?;
        tracing::info!("Admin credentials updated");
        Ok(())
    }
}

impl std::fmt::Debug for AdminAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminAuth")
            .field("credentials_key", &self.credentials_key)
            .field("session", &self.session)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use xarcon_store::MemoryStore;

    fn auth() -> (AdminAuth, Arc<dyn KeyValueStore>) {
        let local: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let session: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let auth = AdminAuth::new(
            local.clone(),
            session,
            &StorageKeys::default(),
            &AdminConfig::default(),
        );
        (auth, local)
    }

    #[test]
    fn test_hash_is_sha256_hex() {
        assert_eq!(
            hash_credentials("admin", "password"),
            hex::encode(Sha256::digest(b"admin:password"))
        );
        assert_eq!(hash_credentials("admin", "x").len(), 64);
    }

    #[test]
    fn test_default_login_seeds_hash() {
        let (auth, local) = auth();
        assert!(auth.require_auth().is_err());

        auth.login("admin", "Xarcon#2026").unwrap();
        assert!(auth.is_authenticated());
        assert_eq!(
            local.get("xarcon-admin-credentials-hash").unwrap(),
            Some(hash_credentials("admin", "Xarcon#2026"))
        );

        auth.logout().unwrap();
        assert!(matches!(auth.require_auth(), Err(AdminError::Unauthorized)));
    }

    #[test]
    fn test_wrong_password_is_rejected() {
        let (auth, _) = auth();
        assert!(matches!(
            auth.login("admin", "nope"),
            Err(AdminError::InvalidCredentials)
        ));
        assert!(!auth.is_authenticated());
    }

    #[test]
    fn test_change_credentials() {
        let (auth, _) = auth();
        assert!(matches!(
            auth.change_credentials("ana", "secreto"),
            Err(AdminError::Unauthorized)
        ));

        auth.login("admin", "Xarcon#2026").unwrap();
        auth.change_credentials("ana", "secreto").unwrap();
        auth.logout().unwrap();

        assert!(auth.login("admin", "Xarcon#2026").is_err());
        auth.login("ana", "secreto").unwrap();
    }
}
