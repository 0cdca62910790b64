//! CSV Export functionality
//!
//! Exports ledger entries and per-project summaries to spreadsheet-friendly
//! CSV. Amounts are written in currency units with two decimals.

use std::io::Write;

use serde::Serialize;

use crate::error::{LedgerError, LedgerResult};
use crate::models::{EntryCollection, Project};
use crate::services::PortfolioSummary;

#[derive(Serialize)]
struct EntryRow<'a> {
    project_id: String,
    project: &'a str,
    collection: &'static str,
    entry_id: String,
    date: String,
    description: &'a str,
    category: String,
    amount: String,
    invoice_number: &'a str,
    recorded_by: &'a str,
}

#[derive(Serialize)]
struct SummaryRow<'a> {
    project_id: String,
    project: &'a str,
    client: &'a str,
    status: String,
    budget: String,
    received: String,
    planned: String,
    spent: String,
    net_profit: String,
    outstanding: String,
    projected_tax: String,
    projected_commission: String,
    forecast_profit: String,
    percent_received: String,
    percent_spent: String,
}

fn collection_label(collection: EntryCollection) -> &'static str {
    match collection {
        EntryCollection::Costs => "cost",
        EntryCollection::RealizedIncome => "realized",
        EntryCollection::PlannedIncome => "planned",
    }
}

fn percent_cell(value: Option<f64>) -> String {
    value.map(|v| format!("{:.2}", v)).unwrap_or_default()
}

fn csv_err(e: impl std::fmt::Display) -> LedgerError {
    LedgerError::Export(e.to_string())
}

/// Export every cost, realized and planned income entry, one row each
pub fn export_entries_csv<W: Write>(projects: &[Project], writer: W) -> LedgerResult<()> {
    let mut out = csv::Writer::from_writer(writer);

    for project in projects {
        let project_id = project.id.to_string();
        for cost in &project.costs {
            out.serialize(EntryRow {
                project_id: project_id.clone(),
                project: &project.name,
                collection: collection_label(EntryCollection::Costs),
                entry_id: cost.id.to_string(),
                date: cost.date.to_string(),
                description: &cost.description,
                category: cost.category.to_string(),
                amount: cost.amount.to_string(),
                invoice_number: cost.invoice_number.as_deref().unwrap_or(""),
                recorded_by: cost.recorded_by.as_deref().unwrap_or(""),
            })
            .map_err(csv_err)?;
        }

        let income = [
            (EntryCollection::RealizedIncome, &project.realized_income),
            (EntryCollection::PlannedIncome, &project.planned_income),
        ];
        for (collection, entries) in income {
            for entry in entries {
                out.serialize(EntryRow {
                    project_id: project_id.clone(),
                    project: &project.name,
                    collection: collection_label(collection),
                    entry_id: entry.id.to_string(),
                    date: entry.date.to_string(),
                    description: &entry.description,
                    category: String::new(),
                    amount: entry.amount.to_string(),
                    invoice_number: "",
                    recorded_by: entry.recorded_by.as_deref().unwrap_or(""),
                })
                .map_err(csv_err)?;
            }
        }
    }

    out.flush().map_err(csv_err)?;
    Ok(())
}

/// Export one summary row per project
pub fn export_summary_csv<W: Write>(summary: &PortfolioSummary, writer: W) -> LedgerResult<()> {
    let mut out = csv::Writer::from_writer(writer);

    for project in &summary.projects {
        out.serialize(SummaryRow {
            project_id: project.project_id.to_string(),
            project: &project.name,
            client: &project.client,
            status: project.status.to_string(),
            budget: project.budget.to_string(),
            received: project.total_realized_income.to_string(),
            planned: project.total_planned_income.to_string(),
            spent: project.total_cost.to_string(),
            net_profit: project.net_profit.to_string(),
            outstanding: project.outstanding_receivable.to_string(),
            projected_tax: project.projected_tax.to_string(),
            projected_commission: project.projected_commission.to_string(),
            forecast_profit: project.forecast_profit.to_string(),
            percent_received: percent_cell(project.percent_received),
            percent_spent: percent_cell(project.percent_spent),
        })
        .map_err(csv_err)?;
    }

    out.flush().map_err(csv_err)?;
    Ok(())
}
