//! CLI command handlers
//!
//! This module contains the implementation of CLI commands,
//! bridging the clap argument parsing with the ledger and its services.

pub mod audit;
pub mod context;
pub mod cost;
pub mod export;
pub mod income;
pub mod project;
pub mod rates;
pub mod summary;
pub mod tenant;
pub mod user;

pub use audit::{handle_audit_command, AuditArgs};
pub use context::CliContext;
pub use cost::{handle_cost_command, CostCommands};
pub use export::{handle_export_command, handle_import_command, ExportArgs, ExportFormat, ImportArgs};
pub use income::{handle_income_command, IncomeCommands};
pub use project::{handle_project_command, ProjectCommands};
pub use rates::{handle_rates_command, RatesCommands};
pub use summary::{handle_summary_command, SummaryArgs};
pub use tenant::{handle_tenant_command, TenantCommands};
pub use user::{handle_user_command, UserCommands};
