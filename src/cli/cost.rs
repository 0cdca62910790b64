//! Cost entry CLI commands

use std::path::PathBuf;

use clap::Subcommand;
use tracing::info;

use super::context::{guess_mime, parse_date, parse_date_or_today, parse_money, today, CliContext};
use crate::collab::DocumentExtractor;
use crate::error::{LedgerError, LedgerResult};
use crate::models::{CostCategory, EntryCollection, EntryId, EntryPatch, NewCostEntry, ProjectId};
use crate::services::Ledger;

#[derive(Subcommand)]
pub enum CostCommands {
    /// Record a cost against a project
    Add {
        /// Project name or ID
        project: String,
        description: String,
        /// Amount (e.g. "1200.50")
        amount: String,
        /// Category (material, labor, logistics, equipment, taxes,
        /// subcontracted_services, commission, other)
        #[arg(short, long, default_value = "other")]
        category: String,
        /// Date (YYYY-MM-DD), defaults to today
        #[arg(short, long)]
        date: Option<String>,
        /// Invoice number
        #[arg(short, long)]
        invoice: Option<String>,
    },
    /// Record a cost read from a receipt or invoice scan
    Scan {
        /// Project name or ID
        project: String,
        file: PathBuf,
        /// MIME type, guessed from the extension when omitted
        #[arg(long)]
        mime: Option<String>,
    },
    /// Edit a cost entry
    Edit {
        /// Entry ID (full or short)
        entry: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        amount: Option<String>,
        #[arg(long)]
        date: Option<String>,
        #[arg(long)]
        category: Option<String>,
    },
    /// Remove a cost entry
    Remove {
        /// Entry ID (full or short)
        entry: String,
    },
}

fn locate_cost(ledger: &Ledger, reference: &str) -> LedgerResult<(ProjectId, EntryCollection, EntryId)> {
    let located = ledger.locate_entry(reference)?;
    if located.1 != EntryCollection::Costs {
        return Err(LedgerError::InvalidInput(format!(
            "entry {} is {}, not a cost",
            reference, located.1
        )));
    }
    Ok(located)
}

pub fn handle_cost_command(ctx: &CliContext, cmd: CostCommands) -> LedgerResult<()> {
    let mut ledger = ctx.open_ledger()?;
    let symbol = ctx.symbol();

    match cmd {
        CostCommands::Add {
            project,
            description,
            amount,
            category,
            date,
            invoice,
        } => {
            let project_id = ledger.resolve_project(&project)?.id;
            let mut draft = NewCostEntry::new(
                description,
                parse_money(&amount)?,
                parse_date_or_today(date.as_deref())?,
                category.parse::<CostCategory>()?,
            );
            draft.invoice_number = invoice;

            let entry = ledger.add_cost_entry(project_id, draft)?;
            println!(
                "Recorded cost {} {} ({}) on {}",
                entry.id.short(),
                entry.amount.format_with_symbol(symbol),
                entry.category,
                entry.date
            );
        }

        CostCommands::Scan {
            project,
            file,
            mime,
        } => {
            let project_id = ledger.resolve_project(&project)?.id;
            let bytes = std::fs::read(&file).map_err(|e| {
                LedgerError::Io(format!("Failed to read {}: {}", file.display(), e))
            })?;
            let mime = mime.unwrap_or_else(|| guess_mime(&file).to_string());
            let extractor = ctx.extractor()?;

            info!(file = %file.display(), %mime, "extracting expense from receipt");
            let runtime = ctx.runtime()?;
            let handle = runtime.block_on(async {
                ledger.extraction_tasks().spawn(project_id, async move {
                    extractor.extract_expense_from_receipt(&bytes, &mime).await
                })
            });
            let expense = runtime
                .block_on(handle)
                .map_err(|e| LedgerError::CollaboratorFailure(format!("extraction task failed: {}", e)))?
                .ok_or_else(|| {
                    LedgerError::CollaboratorFailure(format!(
                        "could not read an expense from {}",
                        file.display()
                    ))
                })?;

            let entry = ledger.apply_extracted_expense(project_id, expense, today())?;
            println!(
                "Recorded cost {} from receipt: {} {} ({})",
                entry.id.short(),
                entry.description,
                entry.amount.format_with_symbol(symbol),
                entry.category
            );
        }

        CostCommands::Edit {
            entry,
            description,
            amount,
            date,
            category,
        } => {
            let (project_id, collection, entry_id) = locate_cost(&ledger, &entry)?;
            let patch = EntryPatch {
                description,
                amount: amount.as_deref().map(parse_money).transpose()?,
                date: date.as_deref().map(parse_date).transpose()?,
                category: category
                    .as_deref()
                    .map(str::parse::<CostCategory>)
                    .transpose()?,
            };
            let edited = ledger.edit_entry(project_id, collection, entry_id, patch)?;
            println!("Updated {} entry {}", collection, edited.id().short());
        }

        CostCommands::Remove { entry } => {
            let (project_id, collection, entry_id) = locate_cost(&ledger, &entry)?;
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
