//! Ledger change notifications
//!
//! Observers are told what changed after every successful mutation. They get
//! the before/after values so that they can diff, but the ledger itself stays
//! the source of truth: anything derived is re-queried, not patched.

use serde::Serialize;

use super::milestone::MilestoneTransition;
use crate::models::{EntryCollection, LedgerEntry, Project, ProjectId, RateSettings, TenantKey};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum LedgerEvent {
    ProjectCreated {
        project: Project,
    },
    ProjectUpdated {
        before: Project,
        after: Project,
    },
    ProjectDeleted {
        project: Project,
    },
    EntryAdded {
        project_id: ProjectId,
        collection: EntryCollection,
        entry: LedgerEntry,
    },
    EntryEdited {
        project_id: ProjectId,
        collection: EntryCollection,
        before: LedgerEntry,
        after: LedgerEntry,
    },
    EntryRemoved {
        project_id: ProjectId,
        collection: EntryCollection,
        entry: LedgerEntry,
    },
    ReceiptConfirmed {
        transition: MilestoneTransition,
    },
    RatesChanged {
        before: RateSettings,
        after: RateSettings,
    },
    SnapshotImported {
        project_count: usize,
    },
}

impl LedgerEvent {
    /// Project the event concerns, if any
    pub fn project_id(&self) -> Option<ProjectId> {
        match self {
            Self::ProjectCreated { project } | Self::ProjectDeleted { project } => Some(project.id),
            Self::ProjectUpdated { after, .. } => Some(after.id),
            Self::EntryAdded { project_id, .. }
            | Self::EntryEdited { project_id, .. }
            | Self::EntryRemoved { project_id, .. } => Some(*project_id),
            Self::ReceiptConfirmed { transition } => Some(transition.project_id),
            Self::RatesChanged { .. } | Self::SnapshotImported { .. } => None,
        }
    }
}

/// Receives ledger events; must not fail the mutation that triggered it
pub trait LedgerObserver: Send {
    fn on_event(&self, tenant: &TenantKey, event: &LedgerEvent);
}
