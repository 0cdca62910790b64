//! Tenant service
//!
//! Registration and lookup of companies against the persisted registry, and
//! opening a registered company's ledger.

use std::sync::Arc;

use tracing::info;

use super::forecast::ForecastRuleKind;
use super::ledger::Ledger;
use crate::error::LedgerResult;
use crate::models::{RateSettings, Tenant, TenantRegistry};
use crate::storage::{load_json, save_json, KeyValueStore, TENANTS_KEY};

/// Service for tenant management
pub struct TenantService {
    store: Arc<dyn KeyValueStore>,
}

impl TenantService {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    fn registry(&self) -> LedgerResult<TenantRegistry> {
        Ok(load_json(self.store.as_ref(), TENANTS_KEY)?.unwrap_or_default())
    }

    /// Register a company, or return it if it is already registered
    pub fn register(&self, company_name: &str) -> LedgerResult<Tenant> {
        let mut registry = self.registry()?;
        let before = registry.len();
        let tenant = registry.register(company_name)?;

        if registry.len() != before {
            save_json(self.store.as_ref(), TENANTS_KEY, &registry)?;
            info!(tenant = %tenant.key, name = %tenant.display_name, "tenant registered");
        }
        Ok(tenant)
    }

    pub fn resolve(&self, company_name: &str) -> LedgerResult<Tenant> {
        self.registry()?.resolve(company_name).cloned()
    }

    pub fn list(&self) -> LedgerResult<Vec<Tenant>> {
        Ok(self.registry()?.tenants().to_vec())
    }

    /// Open the ledger of a registered company
    pub fn open_ledger(
        &self,
        company_name: &str,
        default_rates: RateSettings,
        rule: ForecastRuleKind,
    ) -> LedgerResult<Ledger> {
        let tenant = self.resolve(company_name)?;
        Ledger::open(tenant.key, Arc::clone(&self.store), default_rates, rule)
    }
}
