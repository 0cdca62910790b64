//! Identity check collaborator
//!
//! Per-tenant user list with argon2id password hashes. Plaintext passwords are
//! only ever held in `Zeroizing` buffers and never written anywhere.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;
use tracing::{info, warn};
use zeroize::Zeroizing;

use crate::error::{LedgerError, LedgerResult};
use crate::models::{TenantKey, User, UserRole};
use crate::storage::{load_json, save_json, users_key, KeyValueStore};

/// Hash a password into a PHC string
pub fn hash_password(password: &str) -> LedgerResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| LedgerError::CollaboratorFailure(format!("Password hashing failed: {}", e)))
}

/// Check a password against a stored PHC string; malformed hashes never match
pub fn verify_password(password: &str, phc: &str) -> bool {
    match PasswordHash::new(phc) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            warn!(error = %e, "stored password hash is malformed");
            false
        }
    }
}

/// Users of one tenant
pub struct UserDirectory<'a> {
    store: &'a dyn KeyValueStore,
    tenant: TenantKey,
    users: Vec<User>,
}

impl<'a> UserDirectory<'a> {
    pub fn load(store: &'a dyn KeyValueStore, tenant: TenantKey) -> LedgerResult<Self> {
        let users = load_json(store, &users_key(&tenant))?.unwrap_or_default();
        Ok(Self {
            store,
            tenant,
            users,
        })
    }

    pub fn users(&self) -> &[User] {
        &self.users
    }

    pub fn get(&self, username: &str) -> Option<&User> {
        self.users.iter().find(|u| u.username == username.trim())
    }

    pub fn add_user(
        &mut self,
        username: &str,
        password: Zeroizing<String>,
        role: UserRole,
    ) -> LedgerResult<User> {
        let username = username.trim();
        if username.is_empty() {
            return Err(LedgerError::InvalidInput("username cannot be empty".into()));
        }
        if password.is_empty() {
            return Err(LedgerError::InvalidInput("password cannot be empty".into()));
        }
        if self.get(username).is_some() {
            return Err(LedgerError::Duplicate {
                entity_type: "User",
                identifier: username.to_string(),
            });
        }

        let user = User {
            username: username.to_string(),
            password_hash: hash_password(&password)?,
            role,
            created_at: Utc::now(),
        };
        self.users.push(user.clone());
        self.save()?;

        info!(tenant = %self.tenant, username = %user.username, role = %user.role, "user added");
        Ok(user)
    }

    pub fn remove_user(&mut self, username: &str) -> LedgerResult<User> {
        let idx = self
            .users
            .iter()
            .position(|u| u.username == username.trim())
            .ok_or_else(|| LedgerError::user_not_found(username.trim()))?;
        let removed = self.users.remove(idx);
        self.save()?;

        info!(tenant = %self.tenant, username = %removed.username, "user removed");
        Ok(removed)
    }

    /// True only for a known user with a matching password
    pub fn verify(&self, username: &str, password: &str) -> bool {
        self.get(username)
            .map(|user| verify_password(password, &user.password_hash))
            .unwrap_or(false)
    }

    /// Verify or fail with an error suitable for the CLI
    pub fn authenticate(&self, username: &str, password: &str) -> LedgerResult<&User> {
        match self.get(username) {
            Some(user) if verify_password(password, &user.password_hash) => Ok(user),
            _ => Err(LedgerError::InvalidInput(format!(
                "invalid credentials for user '{}'",
                username.trim()
            ))),
        }
    }

    fn save(&self) -> LedgerResult<()> {
        save_json(self.store, &users_key(&self.tenant), &self.users)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn tenant() -> TenantKey {
        TenantKey::normalize("Acme").unwrap()
    }

    fn secret(s: &str) -> Zeroizing<String> {
        Zeroizing::new(s.to_string())
    }

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("s3cret").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("s3cret", &hash));
        assert!(!verify_password("wrong", &hash));
        assert!(!verify_password("s3cret", "not-a-phc-string"));
    }

    #[test]
    fn test_users_persist_per_tenant() {
        let store = MemoryStore::new();
        {
            let mut directory = UserDirectory::load(&store, tenant()).unwrap();
            directory
                .add_user("maria", secret("obra2025"), UserRole::Admin)
                .unwrap();
        }

        let directory = UserDirectory::load(&store, tenant()).unwrap();
        assert!(directory.verify("maria", "obra2025"));
        assert!(!directory.verify("maria", "other"));
        assert!(!directory.verify("joao", "obra2025"));

        let other = UserDirectory::load(&store, TenantKey::normalize("Beta").unwrap()).unwrap();
        assert!(other.users().is_empty());
    }

    #[test]
    fn test_duplicate_and_missing_users() {
        let store = MemoryStore::new();
        let mut directory = UserDirectory::load(&store, tenant()).unwrap();
        directory.add_user("ana", secret("x"), UserRole::Editor).unwrap();

        let err = directory
            .add_user("ana", secret("y"), UserRole::Editor)
            .unwrap_err();
        assert!(matches!(err, LedgerError::Duplicate { .. }));
        assert!(directory.remove_user("nobody").unwrap_err().is_not_found());
        assert!(directory.authenticate("ana", "bad").is_err());
    }
}
