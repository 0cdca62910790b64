//! Collaborators the ledger consumes through interfaces
//!
//! AI document extraction and narrative, the external-program adapter for
//! them, per-project task tracking, and the credential check.

pub mod ai;
pub mod command;
pub mod identity;
pub mod tasks;

pub use ai::{
    narrate, parse_expense_payload, parse_extraction_payload, parse_project_payload,
    strip_code_fences, DocumentExtractor, ExtractedExpense, ExtractedIncome, ExtractedProject,
    FinancialNarrator,
};
pub use command::CommandCollaborator;
pub use identity::{hash_password, verify_password, UserDirectory};
pub use tasks::ExtractionTasks;
