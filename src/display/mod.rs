//! Display formatting for terminal output
//!
//! Plain-text tables and detail views for projects, the portfolio summary,
//! tenants, users and the audit log.

pub mod project;
pub mod report;
pub mod summary;
pub mod tenant;

pub use project::{format_due_milestones, format_project_details, format_project_list};
pub use report::{format_money, format_percent};
pub use summary::{format_histogram, format_portfolio_summary};
pub use tenant::{format_audit_entries, format_tenant_list, format_user_list};
