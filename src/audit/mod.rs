//! Audit logging for siteledger
//!
//! Records every create, update, delete and milestone transition with
//! before/after values in an append-only JSONL log.
//!
//! - `AuditEntry`: one log line with timestamp, tenant, operation, entity
//!   information and optional before/after values.
//! - `AuditLogger`: writes and reads the log, and is a `LedgerObserver`.
//! - `generate_diff`: top-level field diff between two entity states.

mod diff;
mod entry;
mod logger;

pub use diff::generate_diff;
pub use entry::{AuditEntry, EntityType, Operation};
pub use logger::{audit_entry_for, AuditLogger};
