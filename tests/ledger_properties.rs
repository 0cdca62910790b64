//! Property tests for the ledger's aggregate figures.

use std::sync::Arc;

use chrono::NaiveDate;
use proptest::prelude::*;

use siteledger::models::{
    CostCategory, EntryCollection, Money, NewCostEntry, NewIncomeEntry, NewProject, Percentage,
    RateSettings, TenantKey,
};
use siteledger::services::{compute_commission, compute_withholding, ForecastRuleKind, Ledger};
use siteledger::storage::MemoryStore;

#[derive(Debug, Clone)]
enum Op {
    Cost { project: usize, cents: i64, category: usize },
    Income { project: usize, cents: i64 },
    Plan { project: usize, cents: i64 },
    Confirm { project: usize },
    RemoveCost { project: usize },
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..3usize, 0..5_000_000i64, 0..8usize)
            .prop_map(|(project, cents, category)| Op::Cost { project, cents, category }),
        (0..3usize, 0..5_000_000i64).prop_map(|(project, cents)| Op::Income { project, cents }),
        (0..3usize, 0..5_000_000i64).prop_map(|(project, cents)| Op::Plan { project, cents }),
        (0..3usize).prop_map(|project| Op::Confirm { project }),
        (0..3usize).prop_map(|project| Op::RemoveCost { project }),
    ]
}

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
}

fn ledger_with_projects(budgets: &[i64]) -> Ledger {
    let mut ledger = Ledger::open(
        TenantKey::normalize("Prop Co").unwrap(),
        Arc::new(MemoryStore::new()),
        RateSettings::new(
            Percentage::from_basis_points(600).unwrap(),
            Percentage::from_basis_points(1500).unwrap(),
        ),
        ForecastRuleKind::OutstandingBalance,
    )
    .unwrap();
    for (i, budget) in budgets.iter().enumerate() {
        ledger
            .create_project(NewProject::new(
                format!("Project {}", i),
                "Client",
                Money::from_cents(*budget),
                date(),
            ))
            .unwrap();
    }
    ledger
}

fn apply(ledger: &mut Ledger, op: &Op) {
    let ids: Vec<_> = ledger.projects().iter().map(|p| p.id).collect();
    match *op {
        Op::Cost { project, cents, category } => {
            ledger
                .add_cost_entry(
                    ids[project],
                    NewCostEntry::new("cost", Money::from_cents(cents), date(), CostCategory::ALL[category]),
                )
                .unwrap();
        }
        Op::Income { project, cents } => {
            ledger
                .add_income_entry(ids[project], NewIncomeEntry::new("income", Money::from_cents(cents), date()))
                .unwrap();
        }
        Op::Plan { project, cents } => {
            ledger
                .add_planned_income_entry(ids[project], NewIncomeEntry::new("plan", Money::from_cents(cents), date()))
                .unwrap();
        }
        Op::Confirm { project } => {
            let planned = ledger.project(ids[project]).unwrap().planned_income.first().map(|e| e.id);
            if let Some(entry) = planned {
                ledger.confirm_receipt(ids[project], entry, date()).unwrap();
            }
        }
        Op::RemoveCost { project } => {
            let cost = ledger.project(ids[project]).unwrap().costs.first().map(|c| c.id);
            if let Some(entry) = cost {
                ledger.remove_entry(ids[project], EntryCollection::Costs, entry).unwrap();
            }
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 64,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: portfolio totals always equal the sums over every entry.
    #[test]
    fn property_totals_match_entry_sums(
        budgets in proptest::collection::vec(1..100_000_000i64, 3),
        ops in proptest::collection::vec(op(), 0..40),
    ) {
        let mut ledger = ledger_with_projects(&budgets);
        for op in &ops {
            apply(&mut ledger, op);
        }

        let summary = ledger.summary();
        let projects = ledger.projects();

        let cost: Money = projects.iter().flat_map(|p| &p.costs).map(|c| c.amount).sum();
        let realized: Money = projects.iter().flat_map(|p| &p.realized_income).map(|i| i.amount).sum();
        let planned: Money = projects.iter().flat_map(|p| &p.planned_income).map(|i| i.amount).sum();
        let budget: Money = projects.iter().map(|p| p.budget).sum();

        prop_assert_eq!(summary.total_cost, cost);
        prop_assert_eq!(summary.total_realized_income, realized);
        prop_assert_eq!(summary.total_planned_income, planned);
        prop_assert_eq!(summary.total_budget, budget);
        prop_assert_eq!(summary.net_profit, realized - cost);
        prop_assert_eq!(summary.outstanding_receivable, (budget - realized).floor_zero());
        prop_assert_eq!(
            summary.cost_by_category.values().copied().sum::<Money>(),
            cost
        );
        prop_assert_eq!(
            summary.forecast_profit,
            budget - cost - summary.projected_tax - summary.projected_commission
        );

        // aggregation is a pure function of the ledger
        prop_assert_eq!(&summary, &ledger.summary());
    }

    /// PROPERTY: commission is always charged on the tax-withheld remainder.
    #[test]
    fn property_commission_after_tax(
        cents in -1_000_000_000i64..1_000_000_000i64,
        tax_bp in 0u32..=10_000,
        commission_bp in 0u32..=10_000,
    ) {
        let tax_rate = Percentage::from_basis_points(tax_bp).unwrap();
        let commission_rate = Percentage::from_basis_points(commission_bp).unwrap();
        let base = Money::from_cents(cents);

        let tax = compute_withholding(base, tax_rate);
        let commission = compute_commission(base, tax_rate, commission_rate);

        prop_assert!(tax.cents().abs() <= base.cents().abs());
        prop_assert_eq!(commission, compute_withholding(base - tax, commission_rate));
    }
}
