//! Project CLI commands

use std::path::PathBuf;

use clap::Subcommand;
use tracing::info;

use super::context::{guess_mime, parse_date, parse_date_or_today, parse_money, parse_rate, today, CliContext};
use crate::collab::DocumentExtractor;
use crate::display::{format_project_details, format_project_list};
use crate::error::{LedgerError, LedgerResult};
use crate::models::{NewProject, ProjectPatch, ProjectStatus};

#[derive(Subcommand)]
pub enum ProjectCommands {
    /// Create a project
    Create {
        name: String,
        /// Client the contract is with
        #[arg(short, long)]
        client: String,
        /// Contract value (e.g. "250000.00")
        #[arg(short, long)]
        budget: String,
        /// Start date (YYYY-MM-DD), defaults to today
        #[arg(short, long)]
        start: Option<String>,
        /// Status (planning, in_execution, completed, paused)
        #[arg(long)]
        status: Option<String>,
        /// Tax rate for this project, overriding the company rate
        #[arg(long)]
        tax: Option<String>,
        /// Commission rate for this project, overriding the company rate
        #[arg(long)]
        commission: Option<String>,
    },
    /// List projects
    List,
    /// Show a project with its entries
    Show {
        /// Project name or ID
        project: String,
    },
    /// Edit a project's contract terms
    Edit {
        /// Project name or ID
        project: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        client: Option<String>,
        #[arg(long)]
        budget: Option<String>,
        #[arg(long)]
        start: Option<String>,
        #[arg(long)]
        status: Option<String>,
        #[arg(long, conflicts_with = "clear_tax")]
        tax: Option<String>,
        #[arg(long, conflicts_with = "clear_commission")]
        commission: Option<String>,
        /// Use the company tax rate again
        #[arg(long)]
        clear_tax: bool,
        /// Use the company commission rate again
        #[arg(long)]
        clear_commission: bool,
    },
    /// Delete a project and all of its entries
    Delete {
        /// Project name or ID
        project: String,
        /// Required; deletion cannot be undone
        #[arg(long)]
        force: bool,
    },
    /// Create a project from a contract or budget document
    Extract {
        /// Document to read
        file: PathBuf,
        /// MIME type, guessed from the extension when omitted
        #[arg(long)]
        mime: Option<String>,
    },
}

pub fn handle_project_command(ctx: &CliContext, cmd: ProjectCommands) -> LedgerResult<()> {
    let mut ledger = ctx.open_ledger()?;
    let symbol = ctx.symbol();

    match cmd {
        ProjectCommands::Create {
            name,
            client,
            budget,
            start,
            status,
            tax,
            commission,
        } => {
            let mut draft = NewProject::new(
                name,
                client,
                parse_money(&budget)?,
                parse_date_or_today(start.as_deref())?,
            )
            .rates(
                tax.as_deref().map(parse_rate).transpose()?,
                commission.as_deref().map(parse_rate).transpose()?,
            );
            if let Some(status) = status {
                draft = draft.status(status.parse()?);
            }

            let project = ledger.create_project(draft)?;
            println!("Created project: {}", project.name);
            println!("  Client: {}", project.client);
            println!("  Budget: {}", project.budget.format_with_symbol(symbol));
            println!("  ID:     {}", project.id);
        }

        ProjectCommands::List => {
            print!("{}", format_project_list(&ledger.summary().projects, symbol));
        }

        ProjectCommands::Show { project } => {
            let project = ledger.resolve_project(&project)?;
            let summary = ledger.project_summary(project.id)?;
            print!("{}", format_project_details(project, &summary, symbol));
        }

        ProjectCommands::Edit {
            project,
            name,
            client,
            budget,
            start,
            status,
            tax,
            commission,
            clear_tax,
            clear_commission,
        } => {
            let id = ledger.resolve_project(&project)?.id;
            let patch = ProjectPatch {
                name,
                client,
                budget: budget.as_deref().map(parse_money).transpose()?,
                start_date: start.as_deref().map(parse_date).transpose()?,
                status: status.as_deref().map(str::parse::<ProjectStatus>).transpose()?,
                tax_rate: rate_change(tax.as_deref(), clear_tax)?,
                commission_rate: rate_change(commission.as_deref(), clear_commission)?,
            };

            let updated = ledger.update_project(id, patch)?;
            println!("Updated project: {}", updated.name);
        }

        ProjectCommands::Delete { project, force } => {
            let found = ledger.resolve_project(&project)?;
            if !force {
                return Err(LedgerError::InvalidInput(format!(
                    "deleting '{}' removes {} entries; re-run with --force",
                    found.name,
                    found.entry_count()
                )));
            }
            let id = found.id;
            let removed = ledger.delete_project(id)?;
            println!("Deleted project: {}", removed.name);
        }

        ProjectCommands::Extract { file, mime } => {
            let bytes = std::fs::read(&file).map_err(|e| {
                LedgerError::Io(format!("Failed to read {}: {}", file.display(), e))
            })?;
            let mime = mime.unwrap_or_else(|| guess_mime(&file).to_string());
            let extractor = ctx.extractor()?;

            info!(file = %file.display(), %mime, "extracting project from document");
            let extracted = ctx
                .runtime()?
                .block_on(extractor.extract_project_from_document(&bytes, &mime))
                .ok_or_else(|| {
                    LedgerError::CollaboratorFailure(format!(
                        "could not extract a project from {}",
                        file.display()
                    ))
                })?;

            let project = ledger.apply_extracted_project(extracted, today())?;
            println!("Created project from document: {}", project.name);
            println!("  Client:  {}", project.client);
            println!("  Budget:  {}", project.budget.format_with_symbol(symbol));
            println!("  Entries: {}", project.entry_count());
            println!("  ID:      {}", project.id);
        }
    }

    Ok(())
}

/// `--tax 6` sets an override, `--clear-tax` removes it, neither leaves it
fn rate_change(
    value: Option<&str>,
    clear: bool,
) -> LedgerResult<Option<Option<crate::models::Percentage>>> {
    if clear {
        return Ok(Some(None));
    }
    value.map(|v| parse_rate(v).map(Some)).transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Percentage;

    #[test]
    fn test_rate_change() {
        assert_eq!(rate_change(None, false).unwrap(), None);
        assert_eq!(rate_change(None, true).unwrap(), Some(None));
        assert_eq!(
            rate_change(Some("6"), false).unwrap(),
            Some(Some(Percentage::from_basis_points(600).unwrap()))
        );
        assert!(rate_change(Some("120"), false).is_err());
    }
}
