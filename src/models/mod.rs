//! Core data models for siteledger
//!
//! Projects, their cost and income entries, the money and rate value types,
//! tenants and users.

pub mod cost;
pub mod ids;
pub mod income;
pub mod money;
pub mod project;
pub mod rate;
pub mod tenant;
pub mod user;

pub use cost::{Attachment, CostCategory, CostEntry, NewCostEntry};
pub use ids::{EntryId, ProjectId};
pub use income::{IncomeEntry, NewIncomeEntry};
pub use money::{Money, MoneyParseError};
pub use project::{
    EntryCollection, EntryPatch, LedgerEntry, NewProject, Project, ProjectPatch, ProjectStatus,
};
pub use rate::{Percentage, RateSettings};
pub use tenant::{Tenant, TenantKey, TenantRegistry};
pub use user::{User, UserRole};
