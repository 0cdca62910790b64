//! Aggregation engine
//!
//! Derives per-project and portfolio-wide summaries from the current project
//! collection. Nothing is cached: every call recomputes from the entries, so
//! two calls over the same state always compare equal.

use serde::Serialize;
use std::collections::BTreeMap;

use super::forecast::ForecastRule;
use super::tax;
use crate::models::{CostCategory, CostEntry, Money, Project, ProjectId, ProjectStatus, RateSettings};

/// Total cost per category, in category order
pub type CostHistogram = BTreeMap<CostCategory, Money>;

/// Build a per-category histogram from a set of cost entries
pub fn cost_histogram<'a>(costs: impl IntoIterator<Item = &'a CostEntry>) -> CostHistogram {
    let mut histogram = CostHistogram::new();
    for cost in costs {
        *histogram.entry(cost.category).or_insert_with(Money::zero) += cost.amount;
    }
    histogram
}

/// Derived figures for one project
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectSummary {
    pub project_id: ProjectId,
    pub name: String,
    pub client: String,
    pub status: ProjectStatus,
    pub budget: Money,
    pub total_realized_income: Money,
    pub total_planned_income: Money,
    pub total_cost: Money,
    pub net_profit: Money,
    pub outstanding_receivable: Money,
    /// Rates in force after per-project overrides
    pub rates: RateSettings,
    pub projected_tax: Money,
    pub projected_commission: Money,
    pub forecast_profit: Money,
    pub cost_by_category: CostHistogram,
    /// `None` when the budget is zero
    pub percent_received: Option<f64>,
    /// `None` when the budget is zero
    pub percent_spent: Option<f64>,
}

/// Derived figures for a tenant's whole portfolio
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortfolioSummary {
    pub project_count: usize,
    pub total_budget: Money,
    pub total_realized_income: Money,
    pub total_planned_income: Money,
    pub total_cost: Money,
    pub net_profit: Money,
    /// Portfolio budget minus portfolio income, floored at zero once
    pub outstanding_receivable: Money,
    /// Sum of the per-project projections. Each project floors its own base,
    /// so an overpaid project contributes nothing and this need not equal the
    /// tax on `outstanding_receivable`.
    pub projected_tax: Money,
    /// Sum of the per-project projections, like `projected_tax`
    pub projected_commission: Money,
    pub forecast_profit: Money,
    pub cost_by_category: CostHistogram,
    pub percent_received: Option<f64>,
    pub percent_spent: Option<f64>,
    pub projects: Vec<ProjectSummary>,
}

/// Computes summaries under one forecast rule and one set of default rates
pub struct AggregationEngine<'a> {
    rule: &'a dyn ForecastRule,
    defaults: RateSettings,
}

impl<'a> AggregationEngine<'a> {
    pub fn new(rule: &'a dyn ForecastRule, defaults: RateSettings) -> Self {
        Self { rule, defaults }
    }

    pub fn project_summary(&self, project: &Project) -> ProjectSummary {
        let total_realized_income = project.total_realized_income();
        let total_planned_income = project.total_planned_income();
        let total_cost = project.total_cost();

        let rates = self.rule.rates_for(project, &self.defaults);
        let breakdown = tax::compute_breakdown(self.rule.projection_base(project), rates);

        ProjectSummary {
            project_id: project.id,
            name: project.name.clone(),
            client: project.client.clone(),
            status: project.status,
            budget: project.budget,
            total_realized_income,
            total_planned_income,
            total_cost,
            net_profit: total_realized_income - total_cost,
            outstanding_receivable: project.outstanding_receivable(),
            rates,
            projected_tax: breakdown.tax,
            projected_commission: breakdown.commission,
            forecast_profit: project.budget - total_cost - breakdown.tax - breakdown.commission,
            cost_by_category: cost_histogram(&project.costs),
            percent_received: total_realized_income.percent_of(project.budget),
            percent_spent: total_cost.percent_of(project.budget),
        }
    }

    pub fn portfolio_summary(&self, projects: &[Project]) -> PortfolioSummary {
        let summaries: Vec<ProjectSummary> =
            projects.iter().map(|p| self.project_summary(p)).collect();

        let total_budget: Money = summaries.iter().map(|s| s.budget).sum();
        let total_realized_income: Money =
            summaries.iter().map(|s| s.total_realized_income).sum();
        let total_planned_income: Money = summaries.iter().map(|s| s.total_planned_income).sum();
        let total_cost: Money = summaries.iter().map(|s| s.total_cost).sum();
        let projected_tax: Money = summaries.iter().map(|s| s.projected_tax).sum();
        let projected_commission: Money = summaries.iter().map(|s| s.projected_commission).sum();

        PortfolioSummary {
            project_count: summaries.len(),
            total_budget,
            total_realized_income,
            total_planned_income,
            total_cost,
            net_profit: total_realized_income - total_cost,
            outstanding_receivable: (total_budget - total_realized_income).floor_zero(),
            projected_tax,
            projected_commission,
            forecast_profit: total_budget - total_cost - projected_tax - projected_commission,
            cost_by_category: cost_histogram(projects.iter().flat_map(|p| p.costs.iter())),
            percent_received: total_realized_income.percent_of(total_budget),
            percent_spent: total_cost.percent_of(total_budget),
            projects: summaries,
        }
    }
}

/// Compact digest of the portfolio handed to the narrative collaborator
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NarrativeInput {
    pub projects: Vec<NarrativeProject>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NarrativeProject {
    pub name: String,
    pub contract_value: Money,
    pub total_spent: Money,
    pub total_received: Money,
    pub cost_distribution: CostHistogram,
}

impl NarrativeInput {
    pub fn from_summary(summary: &PortfolioSummary) -> Self {
        Self {
            projects: summary
                .projects
                .iter()
                .map(|p| NarrativeProject {
                    name: p.name.clone(),
                    contract_value: p.budget,
                    total_spent: p.total_cost,
                    total_received: p.total_realized_income,
                    cost_distribution: p.cost_by_category.clone(),
                })
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{IncomeEntry, NewCostEntry, NewIncomeEntry, NewProject, Percentage};
    use crate::services::forecast::{OutstandingBalanceRule, PlannedMilestonesRule};
    use chrono::NaiveDate;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 1).unwrap()
    }

    fn rates() -> RateSettings {
        RateSettings::new(
            Percentage::from_percent(6.0).unwrap(),
            Percentage::from_percent(15.0).unwrap(),
        )
    }

    fn project(budget: i64, realized: i64, costs: &[(i64, CostCategory)]) -> Project {
        let mut p = Project::new(NewProject::new("Tower", "Acme", Money::from_units(budget), date()));
        if realized > 0 {
            p.push_realized(IncomeEntry::from_draft(NewIncomeEntry::new(
                "Advance",
                Money::from_units(realized),
                date(),
            )));
        }
        for (amount, category) in costs {
            p.push_cost(CostEntry::from_draft(NewCostEntry::new(
                "Item",
                Money::from_units(*amount),
                date(),
                *category,
            )));
        }
        p
    }

    #[test]
    fn test_project_summary_figures() {
        let p = project(
            20_000,
            10_000,
            &[(3000, CostCategory::Material), (1000, CostCategory::Labor)],
        );
        let rule = OutstandingBalanceRule;
        let engine = AggregationEngine::new(&rule, rates());

        let s = engine.project_summary(&p);
        assert_eq!(s.total_cost, Money::from_units(4000));
        assert_eq!(s.net_profit, Money::from_units(6000));
        assert_eq!(s.outstanding_receivable, Money::from_units(10_000));
        assert_eq!(s.projected_tax, Money::from_units(600));
        assert_eq!(s.projected_commission, Money::from_units(1410));
        assert_eq!(s.forecast_profit, Money::from_units(20_000 - 4000 - 600 - 1410));
        assert_eq!(s.percent_received, Some(50.0));
        assert_eq!(s.percent_spent, Some(20.0));
        assert_eq!(s.cost_by_category[&CostCategory::Material], Money::from_units(3000));
    }

    #[test]
    fn test_portfolio_totals_sum_projects() {
        let projects = vec![
            project(10_000, 2000, &[(500, CostCategory::Material)]),
            project(5000, 6000, &[(700, CostCategory::Material), (50, CostCategory::Other)]),
        ];
        let rule = OutstandingBalanceRule;
        let summary = AggregationEngine::new(&rule, rates()).portfolio_summary(&projects);

        assert_eq!(summary.project_count, 2);
        assert_eq!(summary.total_budget, Money::from_units(15_000));
        assert_eq!(summary.total_realized_income, Money::from_units(8000));
        assert_eq!(summary.total_cost, Money::from_units(1250));
        assert_eq!(summary.net_profit, Money::from_units(6750));
        assert_eq!(summary.outstanding_receivable, Money::from_units(7000));
        assert_eq!(summary.cost_by_category[&CostCategory::Material], Money::from_units(1200));
        assert_eq!(
            summary.projected_tax,
            summary.projects.iter().map(|p| p.projected_tax).sum::<Money>()
        );
        // second project is overpaid, so only the first contributes a projection
        assert_eq!(summary.projected_tax, Money::from_units(480));
    }

    #[test]
    fn test_aggregation_is_idempotent() {
        let projects = vec![project(10_000, 2000, &[(500, CostCategory::Equipment)])];
        let rule = OutstandingBalanceRule;
        let engine = AggregationEngine::new(&rule, rates());

        assert_eq!(engine.portfolio_summary(&projects), engine.portfolio_summary(&projects));
    }

    #[test]
    fn test_portfolio_totals_are_order_independent() {
        let a = project(10_000, 2000, &[(500, CostCategory::Equipment)]);
        let b = project(3000, 0, &[(40, CostCategory::Taxes)]);
        let rule = OutstandingBalanceRule;
        let engine = AggregationEngine::new(&rule, rates());

        let forward = engine.portfolio_summary(&[a.clone(), b.clone()]);
        let reverse = engine.portfolio_summary(&[b, a]);
        assert_eq!(forward.total_cost, reverse.total_cost);
        assert_eq!(forward.forecast_profit, reverse.forecast_profit);
        assert_eq!(forward.cost_by_category, reverse.cost_by_category);
    }

    #[test]
    fn test_zero_budget_ratios_are_undefined() {
        let mut p = project(100, 0, &[(10, CostCategory::Other)]);
        p.budget = Money::zero();
        let rule = OutstandingBalanceRule;
        let engine = AggregationEngine::new(&rule, rates());

        let s = engine.project_summary(&p);
        assert_eq!(s.percent_received, None);
        assert_eq!(s.percent_spent, None);

        let portfolio = engine.portfolio_summary(&[p]);
        assert_eq!(portfolio.percent_received, None);
    }

    #[test]
    fn test_empty_portfolio() {
        let rule = OutstandingBalanceRule;
        let summary = AggregationEngine::new(&rule, rates()).portfolio_summary(&[]);
        assert_eq!(summary.project_count, 0);
        assert!(summary.total_budget.is_zero());
        assert!(summary.cost_by_category.is_empty());
        assert_eq!(summary.percent_spent, None);
    }

    #[test]
    fn test_rule_changes_projection_not_shape() {
        let mut p = project(10_000, 0, &[]);
        p.push_planned(IncomeEntry::from_draft(NewIncomeEntry::new(
            "Milestone",
            Money::from_units(1000),
            date(),
        )));
        let rule = PlannedMilestonesRule;
        let s = AggregationEngine::new(&rule, rates()).project_summary(&p);
        assert_eq!(s.projected_tax, Money::from_units(60));
        assert_eq!(s.outstanding_receivable, Money::from_units(10_000));
    }

    #[test]
    fn test_narrative_input_digest() {
        let projects = vec![project(10_000, 2000, &[(500, CostCategory::Material)])];
        let rule = OutstandingBalanceRule;
        let summary = AggregationEngine::new(&rule, rates()).portfolio_summary(&projects);

        let input = NarrativeInput::from_summary(&summary);
        assert_eq!(input.projects.len(), 1);
        assert_eq!(input.projects[0].contract_value, Money::from_units(10_000));
        assert_eq!(input.projects[0].total_spent, Money::from_units(500));
        assert_eq!(input.projects[0].total_received, Money::from_units(2000));
    }

    #[test]
    fn test_huge_budgets_saturate_instead_of_overflowing() {
        let mut a = project(0, 0, &[]);
        a.budget = Money::from_cents(5_000_000_000_000_000_000);
        let mut b = a.clone();
        b.id = crate::models::ProjectId::new();

        let rule = OutstandingBalanceRule;
        let summary = AggregationEngine::new(&rule, rates()).portfolio_summary(&[a, b]);

        assert_eq!(summary.total_budget, Money::from_cents(i64::MAX));
        assert!(!summary.outstanding_receivable.is_negative());
        assert!(!summary.forecast_profit.is_negative());
    }

    #[test]
    fn test_overpaid_project_adds_no_projection() {
        let overpaid = project(1000, 1500, &[]);
        let open = project(1000, 0, &[]);
        let rule = OutstandingBalanceRule;
        let summary = AggregationEngine::new(&rule, rates()).portfolio_summary(&[overpaid, open]);

        assert_eq!(summary.outstanding_receivable, Money::from_units(500));
        assert_eq!(summary.projected_tax, Money::from_units(60));
        assert_eq!(summary.projects[0].projected_tax, Money::zero());
    }
}
