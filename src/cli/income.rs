//! Income CLI commands
//!
//! Realized receipts, planned measurement milestones and the transition from
//! one to the other.

use clap::Subcommand;

use super::context::{parse_date, parse_date_or_today, parse_money, CliContext};
use crate::display::format_due_milestones;
use crate::error::{LedgerError, LedgerResult};
use crate::models::{EntryCollection, EntryId, EntryPatch, NewIncomeEntry, ProjectId};
use crate::services::milestone::due_milestones;
use crate::services::Ledger;

#[derive(Subcommand)]
pub enum IncomeCommands {
    /// Record income already received
    Add {
        /// Project name or ID
        project: String,
        description: String,
        amount: String,
        /// Receipt date (YYYY-MM-DD), defaults to today
        #[arg(short, long)]
        date: Option<String>,
    },
    /// Plan a future measurement milestone
    Plan {
        /// Project name or ID
        project: String,
        description: String,
        amount: String,
        /// Expected date (YYYY-MM-DD)
        #[arg(short, long)]
        date: String,
    },
    /// Confirm that a planned milestone was received
    Confirm {
        /// Planned entry ID (full or short)
        entry: String,
        /// Receipt date (YYYY-MM-DD), defaults to today
        #[arg(short, long)]
        date: Option<String>,
    },
    /// List planned milestones expected on or before a date
    Due {
        /// Project name or ID
        project: String,
        /// Cut-off date (YYYY-MM-DD), defaults to today
        #[arg(long)]
        as_of: Option<String>,
    },
    /// Edit a realized or planned income entry
    Edit {
        /// Entry ID (full or short)
        entry: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        amount: Option<String>,
        #[arg(long)]
        date: Option<String>,
    },
    /// Remove a realized or planned income entry
    Remove {
        /// Entry ID (full or short)
        entry: String,
    },
}

fn locate_income(ledger: &Ledger, reference: &str) -> LedgerResult<(ProjectId, EntryCollection, EntryId)> {
    let located = ledger.locate_entry(reference)?;
    if located.1 == EntryCollection::Costs {
        return Err(LedgerError::InvalidInput(format!(
            "entry {} is a cost, not income",
            reference
        )));
    }
    Ok(located)
}

pub fn handle_income_command(ctx: &CliContext, cmd: IncomeCommands) -> LedgerResult<()> {
    let mut ledger = ctx.open_ledger()?;
    let symbol = ctx.symbol();

    match cmd {
        IncomeCommands::Add {
            project,
            description,
            amount,
            date,
        } => {
            let project_id = ledger.resolve_project(&project)?.id;
            let draft = NewIncomeEntry::new(
                description,
                parse_money(&amount)?,
                parse_date_or_today(date.as_deref())?,
            );
            let entry = ledger.add_income_entry(project_id, draft)?;
            println!(
                "Recorded receipt {} {} on {}",
                entry.id.short(),
                entry.amount.format_with_symbol(symbol),
                entry.date
            );
        }

        IncomeCommands::Plan {
            project,
            description,
            amount,
            date,
        } => {
            let project_id = ledger.resolve_project(&project)?.id;
            let draft = NewIncomeEntry::new(description, parse_money(&amount)?, parse_date(&date)?);
            let entry = ledger.add_planned_income_entry(project_id, draft)?;
            println!(
                "Planned milestone {} {} for {}",
                entry.id.short(),
                entry.amount.format_with_symbol(symbol),
                entry.date
            );
        }

        IncomeCommands::Confirm { entry, date } => {
            let (project_id, collection, entry_id) = ledger.locate_entry(&entry)?;
            if collection != EntryCollection::PlannedIncome {
                return Err(LedgerError::InvalidInput(format!(
                    "entry {} is {}, only planned milestones can be confirmed",
                    entry, collection
                )));
            }
            let received = parse_date_or_today(date.as_deref())?;
            let realized = ledger.confirm_receipt(project_id, entry_id, received)?;
            println!(
                "Milestone {} received: {} on {}",
                realized.id.short(),
                realized.amount.format_with_symbol(symbol),
                realized.date
            );
        }

        IncomeCommands::Due { project, as_of } => {
            let as_of = parse_date_or_today(as_of.as_deref())?;
            let project = ledger.resolve_project(&project)?;
            let due = due_milestones(project, as_of);
            print!("{}", format_due_milestones(project, &due, symbol));
        }

        IncomeCommands::Edit {
            entry,
            description,
            amount,
            date,
        } => {
            let (project_id, collection, entry_id) = locate_income(&ledger, &entry)?;
            let patch = EntryPatch {
                description,
                amount: amount.as_deref().map(parse_money).transpose()?,
                date: date.as_deref().map(parse_date).transpose()?,
                category: None,
            };
            let edited = ledger.edit_entry(project_id, collection, entry_id, patch)?;
            println!("Updated {} entry {}", collection, edited.id().short());
        }

        IncomeCommands::Remove { entry } => {
            let (project_id, collection, entry_id) = locate_income(&ledger, &entry)?;
            let removed = ledger.remove_entry(project_id, collection, entry_id)?;
            println!(
                "Removed {} entry {} ({})",
                collection,
                removed.id().short(),
                removed.amount().format_with_symbol(symbol)
            );
        }
    }

    Ok(())
}
