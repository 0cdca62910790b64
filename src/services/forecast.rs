//! Forecast rules
//!
//! A forecast rule decides which amount of a project the projected tax and
//! commission are charged on, and which rates apply. The aggregation engine
//! only talks to the trait, so the rule can be swapped from the settings file
//! without changing the summary shape.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::{Money, Project, RateSettings};

/// Strategy for projecting end-of-contract tax and commission
pub trait ForecastRule: Send + Sync {
    fn name(&self) -> &'static str;

    /// Amount on which tax and commission are projected for this project
    fn projection_base(&self, project: &Project) -> Money;

    /// Rates in force for this project
    fn rates_for(&self, project: &Project, defaults: &RateSettings) -> RateSettings {
        defaults.with_overrides(project.tax_rate, project.commission_rate)
    }
}

/// Projects on the budget not yet received (budget - realized, floored at 0)
#[derive(Debug, Clone, Copy, Default)]
pub struct OutstandingBalanceRule;

impl ForecastRule for OutstandingBalanceRule {
    fn name(&self) -> &'static str {
        "outstanding-balance"
    }

    fn projection_base(&self, project: &Project) -> Money {
        project.outstanding_receivable()
    }
}

/// Projects on the sum of milestones still planned
#[derive(Debug, Clone, Copy, Default)]
pub struct PlannedMilestonesRule;

impl ForecastRule for PlannedMilestonesRule {
    fn name(&self) -> &'static str {
        "planned-milestones"
    }

    fn projection_base(&self, project: &Project) -> Money {
        project.total_planned_income()
    }
}

/// Serializable selector for the active rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ForecastRuleKind {
    #[default]
    OutstandingBalance,
    PlannedMilestones,
}

impl ForecastRuleKind {
    pub fn build(self) -> Box<dyn ForecastRule> {
        match self {
            Self::OutstandingBalance => Box::new(OutstandingBalanceRule),
            Self::PlannedMilestones => Box::new(PlannedMilestonesRule),
        }
    }
}

impl fmt::Display for ForecastRuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.build().name())
    }
}
