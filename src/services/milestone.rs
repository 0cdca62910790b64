//! Milestone transition handler
//!
//! A planned income milestone becomes realized income when the client pays.
//! The move is one-way; correcting a mistaken confirmation means removing the
//! realized entry and planning it again.

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::{LedgerError, LedgerResult};
use crate::models::{EntryId, IncomeEntry, Project, ProjectId};

/// Record of one planned-to-realized move
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MilestoneTransition {
    pub project_id: ProjectId,
    pub planned: IncomeEntry,
    pub realized: IncomeEntry,
}

/// Confirm receipt of a planned milestone on `received`.
///
/// Fails with `NotFound` and leaves the project untouched when the entry is
/// not currently planned, including when it was already realized.
pub fn confirm(
    project: &mut Project,
    entry_id: EntryId,
    received: NaiveDate,
) -> LedgerResult<MilestoneTransition> {
    let planned = project
        .planned_income
        .iter()
        .find(|i| i.id == entry_id)
        .cloned()
        .ok_or_else(|| LedgerError::entry_not_found(entry_id.to_string()))?;

    let realized = project.confirm_receipt(entry_id, received)?;

    Ok(MilestoneTransition {
        project_id: project.id,
        planned,
        realized,
    })
}

/// Planned milestones dated on or before `as_of`, oldest first
pub fn due_milestones(project: &Project, as_of: NaiveDate) -> Vec<&IncomeEntry> {
    let mut due: Vec<&IncomeEntry> = project
        .planned_income
        .iter()
        .filter(|i| i.date <= as_of)
        .collect();
    due.sort_by_key(|i| i.date);
    due
}
