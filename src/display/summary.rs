//! Portfolio summary and cost histogram views

use super::report::{double_separator, format_bar, format_money, format_percent, separator};
use crate::services::{CostHistogram, PortfolioSummary};

const BAR_WIDTH: usize = 24;

/// Cost per category with a proportional bar, largest first
pub fn format_histogram(histogram: &CostHistogram, symbol: &str) -> String {
    if histogram.is_empty() {
        return "  (no costs recorded)\n".to_string();
    }

    let mut rows: Vec<_> = histogram.iter().collect();
    rows.sort_by(|a, b| b.1.cmp(a.1).then(a.0.cmp(b.0)));
    let max = rows.first().map(|(_, m)| m.cents()).unwrap_or(0) as f64;

    let mut output = String::new();
    for (category, amount) in rows {
        output.push_str(&format!(
            "  {:<22}  {:>16}  {}\n",
            category.to_string(),
            format_money(*amount, symbol),
            format_bar(amount.cents() as f64, max, BAR_WIDTH)
        ));
    }
    output
}

/// Format the tenant-wide dashboard
pub fn format_portfolio_summary(summary: &PortfolioSummary, symbol: &str) -> String {
    let mut output = String::new();

    output.push_str(&format!("Portfolio ({} projects)\n", summary.project_count));
    output.push_str(&double_separator(48));
    output.push('\n');

    let rows = [
        ("Total budget", summary.total_budget),
        ("Received", summary.total_realized_income),
        ("Planned", summary.total_planned_income),
        ("Spent", summary.total_cost),
        ("Net profit", summary.net_profit),
        ("Outstanding", summary.outstanding_receivable),
        ("Projected tax", summary.projected_tax),
        ("Projected commission", summary.projected_commission),
        ("Forecast profit", summary.forecast_profit),
    ];
    for (label, amount) in rows {
        output.push_str(&format!("  {:<22}{:>20}\n", label, format_money(amount, symbol)));
    }

    output.push_str(&format!(
        "  {:<22}{:>20}\n",
        "Received / budget",
        format_percent(summary.percent_received)
    ));
    output.push_str(&format!(
        "  {:<22}{:>20}\n",
        "Spent / budget",
        format_percent(summary.percent_spent)
    ));

    output.push_str("\nCosts by category\n");
    output.push_str(&separator(48));
    output.push('\n');
    output.push_str(&format_histogram(&summary.cost_by_category, symbol));

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CostCategory, Money};

    #[test]
    fn test_histogram_sorted_by_amount() {
        let mut histogram = CostHistogram::new();
        histogram.insert(CostCategory::Labor, Money::from_units(50));
        histogram.insert(CostCategory::Material, Money::from_units(200));

        let output = format_histogram(&histogram, "R$");
        let material = output.find("Material").unwrap();
        let labor = output.find("Labor").unwrap();
        assert!(material < labor);
        assert!(output.contains("R$ 200.00"));
    }

    #[test]
    fn test_empty_portfolio_shows_na() {
        let summary = PortfolioSummary {
            project_count: 0,
            total_budget: Money::zero(),
            total_realized_income: Money::zero(),
            total_planned_income: Money::zero(),
            total_cost: Money::zero(),
            net_profit: Money::zero(),
            outstanding_receivable: Money::zero(),
            projected_tax: Money::zero(),
            projected_commission: Money::zero(),
            forecast_profit: Money::zero(),
            cost_by_category: CostHistogram::new(),
            percent_received: None,
            percent_spent: None,
            projects: Vec::new(),
        };

        let output = format_portfolio_summary(&summary, "$");
        assert!(output.contains("Portfolio (0 projects)"));
        assert!(output.contains("n/a"));
        assert!(output.contains("(no costs recorded)"));
    }
}
