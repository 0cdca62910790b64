//! Tenant keys and the tenant registry
//!
//! Every company's data lives under a key derived from its name. Because two
//! different spellings can normalize to the same key, companies must be
//! registered first; a registration whose key is already held by a different
//! display name is refused instead of merging the two companies' ledgers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{LedgerError, LedgerResult};

/// Normalized, storage-safe company key
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TenantKey(String);

impl TenantKey {
    /// Case-fold, trim and collapse internal whitespace to single `-`
    pub fn normalize(company_name: &str) -> LedgerResult<Self> {
        let key = company_name
            .split_whitespace()
            .map(|word| word.to_lowercase())
            .collect::<Vec<_>>()
            .join("-");

        if key.is_empty() {
            return Err(LedgerError::InvalidInput(
                "company name cannot be empty".into(),
            ));
        }
        Ok(Self(key))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TenantKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A registered company
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tenant {
    pub key: TenantKey,
    pub display_name: String,
    pub registered_at: DateTime<Utc>,
}

/// All registered companies
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TenantRegistry {
    #[serde(default)]
    tenants: Vec<Tenant>,
}

impl TenantRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a company.
    ///
    /// Returns the existing tenant when the same display name (after trimming)
    /// registers again; fails with `TenantCollision` when a different name
    /// already owns the normalized key.
    pub fn register(&mut self, company_name: &str) -> LedgerResult<Tenant> {
        let key = TenantKey::normalize(company_name)?;
        let display_name = company_name.split_whitespace().collect::<Vec<_>>().join(" ");

        if let Some(existing) = self.tenants.iter().find(|t| t.key == key) {
            if existing.display_name == display_name {
                return Ok(existing.clone());
            }
            return Err(LedgerError::TenantCollision {
                key: key.to_string(),
                existing: existing.display_name.clone(),
                requested: display_name,
            });
        }

        let tenant = Tenant {
            key,
            display_name,
            registered_at: Utc::now(),
        };
        self.tenants.push(tenant.clone());
        Ok(tenant)
    }

    /// Look up the tenant a company name belongs to.
    ///
    /// The lookup is by normalized key but the display name must match too,
    /// so a colliding spelling cannot open another company's ledger.
    pub fn resolve(&self, company_name: &str) -> LedgerResult<&Tenant> {
        let key = TenantKey::normalize(company_name)?;
        let display_name = company_name.split_whitespace().collect::<Vec<_>>().join(" ");

        match self.tenants.iter().find(|t| t.key == key) {
            Some(t) if t.display_name == display_name => Ok(t),
            Some(t) => Err(LedgerError::TenantCollision {
                key: key.to_string(),
                existing: t.display_name.clone(),
                requested: display_name,
            }),
            None => Err(LedgerError::tenant_not_found(company_name.trim())),
        }
    }

    pub fn get(&self, key: &TenantKey) -> Option<&Tenant> {
        self.tenants.iter().find(|t| &t.key == key)
    }

    pub fn tenants(&self) -> &[Tenant] {
        &self.tenants
    }

    pub fn len(&self) -> usize {
        self.tenants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tenants.is_empty()
    }
}
