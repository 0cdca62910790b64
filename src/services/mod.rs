//! Service layer for siteledger
//!
//! Business logic on top of the models and the storage layer: the tax
//! calculator, forecast rules, the aggregation engine, the milestone
//! transition, the ledger repository and tenant management.

pub mod aggregation;
pub mod events;
pub mod forecast;
pub mod ledger;
pub mod milestone;
pub mod tax;
pub mod tenant;

pub use aggregation::{
    cost_histogram, AggregationEngine, CostHistogram, NarrativeInput, NarrativeProject,
    PortfolioSummary, ProjectSummary,
};
pub use events::{LedgerEvent, LedgerObserver};
pub use forecast::{ForecastRule, ForecastRuleKind, OutstandingBalanceRule, PlannedMilestonesRule};
pub use ledger::{Ledger, LedgerSnapshot};
pub use milestone::MilestoneTransition;
pub use tax::{compute_breakdown, compute_commission, compute_withholding, TaxBreakdown};
pub use tenant::TenantService;
