//! Project display formatting
//!
//! Formats projects for terminal output in table and detail views.

use super::report::{column_width, format_money, format_percent, separator, truncate};
use crate::models::{CostEntry, IncomeEntry, Project};
use crate::services::ProjectSummary;

/// Format project summaries as a table
pub fn format_project_list(summaries: &[ProjectSummary], symbol: &str) -> String {
    if summaries.is_empty() {
        return "No projects found.\n".to_string();
    }

    let name_width = column_width(summaries.iter().map(|s| s.name.as_str()), 4).min(30);
    let client_width = column_width(summaries.iter().map(|s| s.client.as_str()), 6).min(20);

    let mut output = String::new();
    output.push_str(&format!(
        "{:<10}  {:<name_width$}  {:<client_width$}  {:<12}  {:>16}  {:>16}  {:>16}  {:>8}\n",
        "ID",
        "Name",
        "Client",
        "Status",
        "Budget",
        "Received",
        "Spent",
        "Recv %",
    ));
    output.push_str(&"-".repeat(10 + name_width + client_width + 12 + 16 * 3 + 8 + 14));
    output.push('\n');

    for summary in summaries {
        output.push_str(&format!(
            "{:<10}  {:<name_width$}  {:<client_width$}  {:<12}  {:>16}  {:>16}  {:>16}  {:>8}\n",
            summary.project_id.short(),
            truncate(&summary.name, name_width),
            truncate(&summary.client, client_width),
            summary.status.to_string(),
            format_money(summary.budget, symbol),
            format_money(summary.total_realized_income, symbol),
            format_money(summary.total_cost, symbol),
            format_percent(summary.percent_received),
        ));
    }

    output
}

fn format_cost_rows(costs: &[CostEntry], symbol: &str, output: &mut String) {
    let mut costs: Vec<&CostEntry> = costs.iter().collect();
    costs.sort_by_key(|c| c.date);

    for cost in costs {
        output.push_str(&format!(
            "  {:<10}  {}  {:<30}  {:<22}  {:>16}\n",
            cost.id.short(),
            cost.date.format("%Y-%m-%d"),
            truncate(&cost.description, 30),
            cost.category.to_string(),
            format_money(cost.amount, symbol),
        ));
    }
}

fn format_income_rows<'a>(
    entries: impl IntoIterator<Item = &'a IncomeEntry>,
    symbol: &str,
    output: &mut String,
) {
    let mut entries: Vec<&IncomeEntry> = entries.into_iter().collect();
    entries.sort_by_key(|e| e.date);

    for entry in entries {
        output.push_str(&format!(
            "  {:<10}  {}  {:<30}  {:>16}\n",
            entry.id.short(),
            entry.date.format("%Y-%m-%d"),
            truncate(&entry.description, 30),
            format_money(entry.amount, symbol),
        ));
    }
}

/// Format a single project's contract terms, figures and entries
pub fn format_project_details(project: &Project, summary: &ProjectSummary, symbol: &str) -> String {
    let mut output = String::new();

    output.push_str(&format!("Project: {}\n", project.name));
    output.push_str(&format!("  ID:          {}\n", project.id));
    output.push_str(&format!("  Client:      {}\n", project.client));
    output.push_str(&format!("  Status:      {}\n", project.status));
    output.push_str(&format!("  Start date:  {}\n", project.start_date));
    output.push_str(&format!("  Budget:      {}\n", format_money(project.budget, symbol)));
    output.push_str(&format!(
        "  Tax rate:    {}{}\n",
        summary.rates.tax_rate,
        if project.tax_rate.is_some() { "" } else { " (tenant default)" }
    ));
    output.push_str(&format!(
        "  Commission:  {}{}\n",
        summary.rates.commission_rate,
        if project.commission_rate.is_some() { "" } else { " (tenant default)" }
    ));
    output.push('\n');

    output.push_str(&format!(
        "  Received:    {:>16}  ({} of budget)\n",
        format_money(summary.total_realized_income, symbol),
        format_percent(summary.percent_received)
    ));
    output.push_str(&format!(
        "  Planned:     {:>16}\n",
        format_money(summary.total_planned_income, symbol)
    ));
    output.push_str(&format!(
        "  Spent:       {:>16}  ({} of budget)\n",
        format_money(summary.total_cost, symbol),
        format_percent(summary.percent_spent)
    ));
    output.push_str(&format!(
        "  Net profit:  {:>16}\n",
        format_money(summary.net_profit, symbol)
    ));
    output.push_str(&format!(
        "  Outstanding: {:>16}\n",
        format_money(summary.outstanding_receivable, symbol)
    ));
    output.push_str(&format!(
        "  Forecast:    {:>16}  (tax {}, commission {})\n",
        format_money(summary.forecast_profit, symbol),
        format_money(summary.projected_tax, symbol),
        format_money(summary.projected_commission, symbol)
    ));

    output.push_str(&format!("\nCosts ({})\n", project.costs.len()));
    output.push_str(&separator(60));
    output.push('\n');
    format_cost_rows(&project.costs, symbol, &mut output);

    output.push_str(&format!("\nReceived ({})\n", project.realized_income.len()));
    output.push_str(&separator(60));
    output.push('\n');
    format_income_rows(&project.realized_income, symbol, &mut output);

    output.push_str(&format!("\nPlanned milestones ({})\n", project.planned_income.len()));
    output.push_str(&separator(60));
    output.push('\n');
    format_income_rows(&project.planned_income, symbol, &mut output);

    output
}

/// Planned milestones that have come due
pub fn format_due_milestones(project: &Project, due: &[&IncomeEntry], symbol: &str) -> String {
    if due.is_empty() {
        return format!("No milestones due for {}.\n", project.name);
    }

    let mut output = format!("Milestones due for {}:\n", project.name);
    format_income_rows(due.iter().copied(), symbol, &mut output);
    output
}
