//! siteledger - construction-project ledger and forecasting engine
//!
//! Keeps, per company (tenant), the projects of a construction business with
//! their costs, received income and planned measurement milestones, and
//! derives portfolio figures and a tax/commission/profit forecast from them.
//!
//! # Architecture
//!
//! - `models`: money, rates, projects, entries, tenants, users
//! - `services`: tax calculator, forecast rules, aggregation, milestone
//!   transition, the `Ledger` repository and tenant management
//! - `storage`: key-value persistence (file-backed and in-memory)
//! - `collab`: AI extraction/narrative collaborators, task tracking, identity
//! - `audit`: append-only audit log fed by ledger events
//! - `export`: JSON, YAML and CSV export/import
//! - `config`, `logging`, `display`, `cli`: the command-line front end
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use siteledger::models::RateSettings;
//! use siteledger::services::{ForecastRuleKind, TenantService};
//! use siteledger::storage::MemoryStore;
//!
//! let tenants = TenantService::new(Arc::new(MemoryStore::new()));
//! tenants.register("Acme Construções")?;
//! let ledger = tenants.open_ledger(
//!     "Acme Construções",
//!     RateSettings::default(),
//!     ForecastRuleKind::default(),
//! )?;
//! println!("{} projects", ledger.summary().project_count);
//! # Ok::<(), siteledger::error::LedgerError>(())
//! ```

pub mod audit;
pub mod cli;
pub mod collab;
pub mod config;
pub mod display;
pub mod error;
pub mod export;
pub mod logging;
pub mod models;
pub mod services;
pub mod storage;

pub use error::{LedgerError, LedgerResult};
