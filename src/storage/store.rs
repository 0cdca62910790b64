//! Persistence collaborator
//!
//! The ledger only ever sees a byte-oriented key-value store. Snapshots are
//! serialized to JSON by the helpers here; bytes that fail to deserialize are
//! treated as if nothing had been stored.

use std::collections::HashMap;
use std::sync::RwLock;

use serde::{de::DeserializeOwned, Serialize};
use tracing::warn;

use crate::error::{LedgerError, LedgerResult};
use crate::models::TenantKey;

/// Minimal get/set byte store
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> LedgerResult<Option<Vec<u8>>>;
    fn set(&self, key: &str, bytes: &[u8]) -> LedgerResult<()>;
}

/// Key holding the tenant registry
pub const TENANTS_KEY: &str = "tenants";

pub fn projects_key(tenant: &TenantKey) -> String {
    format!("projects/{}", tenant)
}

pub fn users_key(tenant: &TenantKey) -> String {
    format!("users/{}", tenant)
}

pub fn rates_key(tenant: &TenantKey) -> String {
    format!("rates/{}", tenant)
}

/// Load and deserialize a key.
///
/// Returns `Ok(None)` when the key is absent or its bytes are not valid
/// JSON for `T`. Only a failing store read is an error.
pub fn load_json<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> LedgerResult<Option<T>> {
    let Some(bytes) = store.get(key)? else {
        return Ok(None);
    };

    match serde_json::from_slice(&bytes) {
        Ok(value) => Ok(Some(value)),
        Err(e) => {
            warn!(key, error = %e, "ignoring unreadable snapshot");
            Ok(None)
        }
    }
}

/// Serialize and store a value under `key`
pub fn save_json<T: Serialize + ?Sized>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> LedgerResult<()> {
    let bytes = serde_json::to_vec_pretty(value)
        .map_err(|e| LedgerError::Json(format!("Failed to serialize {}: {}", key, e)))?;
    store.set(key, &bytes)
}

/// In-memory store, used by tests and dry runs
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> LedgerResult<Option<Vec<u8>>> {
        let entries = self
            .entries
            .read()
            .map_err(|e| LedgerError::Storage(format!("Failed to acquire read lock: {}", e)))?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, bytes: &[u8]) -> LedgerResult<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|e| LedgerError::Storage(format!("Failed to acquire write lock: {}", e)))?;
        entries.insert(key.to_string(), bytes.to_vec());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Snapshot {
        name: String,
        value: i32,
    }

    #[test]
    fn test_round_trip() {
        let store = MemoryStore::new();
        let snapshot = Snapshot {
            name: "a".into(),
            value: 1,
        };

        save_json(&store, "k", &snapshot).unwrap();
        let loaded: Option<Snapshot> = load_json(&store, "k").unwrap();
        assert_eq!(loaded, Some(snapshot));
    }

    #[test]
    fn test_absent_key_loads_none() {
        let store = MemoryStore::new();
        let loaded: Option<Snapshot> = load_json(&store, "missing").unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn test_corrupt_bytes_load_none() {
        let store = MemoryStore::new();
        store.set("k", b"{not json").unwrap();
        let loaded: Option<Snapshot> = load_json(&store, "k").unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn test_keys_are_scoped_by_tenant() {
        let tenant = TenantKey::normalize("ACME  Ltd").unwrap();
        assert_eq!(projects_key(&tenant), "projects/acme-ltd");
        assert_eq!(users_key(&tenant), "users/acme-ltd");
        assert_eq!(rates_key(&tenant), "rates/acme-ltd");
    }
}
