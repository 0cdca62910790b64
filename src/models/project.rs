//! Project aggregate
//!
//! A project owns its contract terms and the three entry collections: costs,
//! realized income and planned income. All in-place edits of those
//! collections go through the methods here so that the "planned xor realized"
//! rule and the non-negative amount rule are enforced in one place.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::cost::{CostCategory, CostEntry};
use super::ids::{EntryId, ProjectId};
use super::income::IncomeEntry;
use super::money::Money;
use super::rate::Percentage;
use crate::error::{LedgerError, LedgerResult};

/// Lifecycle status of a project
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    Planning,
    #[default]
    InExecution,
    Completed,
    Paused,
}

impl ProjectStatus {
    /// Parse a status label (English or the Portuguese labels of older data)
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().replace(['-', ' '], "_").as_str() {
            "planning" | "em_planejamento" => Some(Self::Planning),
            "in_execution" | "inexecution" | "active" | "em_execução" | "em_execucao" => {
                Some(Self::InExecution)
            }
            "completed" | "done" | "concluído" | "concluido" => Some(Self::Completed),
            "paused" | "pausado" => Some(Self::Paused),
            _ => None,
        }
    }
}

impl FromStr for ProjectStatus {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
            .ok_or_else(|| LedgerError::InvalidInput(format!("unknown project status: {}", s)))
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Planning => write!(f, "Planning"),
            Self::InExecution => write!(f, "In Execution"),
            Self::Completed => write!(f, "Completed"),
            Self::Paused => write!(f, "Paused"),
        }
    }
}

/// Which entry collection of a project an operation targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryCollection {
    Costs,
    RealizedIncome,
    PlannedIncome,
}

impl fmt::Display for EntryCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Costs => write!(f, "costs"),
            Self::RealizedIncome => write!(f, "realized income"),
            Self::PlannedIncome => write!(f, "planned income"),
        }
    }
}

/// An entry taken out of, or edited in, one of the collections
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum LedgerEntry {
    Cost(CostEntry),
    Income(IncomeEntry),
}

impl LedgerEntry {
    pub fn id(&self) -> EntryId {
        match self {
            Self::Cost(c) => c.id,
            Self::Income(i) => i.id,
        }
    }

    pub fn amount(&self) -> Money {
        match self {
            Self::Cost(c) => c.amount,
            Self::Income(i) => i.amount,
        }
    }

    pub fn description(&self) -> &str {
        match self {
            Self::Cost(c) => &c.description,
            Self::Income(i) => &i.description,
        }
    }
}

/// In-place edit of an entry; `None` fields are left untouched
#[derive(Debug, Clone, Default)]
pub struct EntryPatch {
    pub description: Option<String>,
    pub amount: Option<Money>,
    pub date: Option<NaiveDate>,
    /// Only meaningful for cost entries
    pub category: Option<CostCategory>,
}

impl EntryPatch {
    pub fn is_empty(&self) -> bool {
        self.description.is_none()
            && self.amount.is_none()
            && self.date.is_none()
            && self.category.is_none()
    }

    fn validate(&self, collection: EntryCollection) -> LedgerResult<()> {
        if let Some(amount) = self.amount {
            validate_amount(amount)?;
        }
        if let Some(description) = &self.description {
            validate_description(description)?;
        }
        if self.category.is_some() && collection != EntryCollection::Costs {
            return Err(LedgerError::InvalidInput(format!(
                "category cannot be set on {} entries",
                collection
            )));
        }
        Ok(())
    }
}

/// Caller-supplied fields for a new project
#[derive(Debug, Clone)]
pub struct NewProject {
    pub name: String,
    pub client: String,
    pub budget: Money,
    pub start_date: NaiveDate,
    pub status: ProjectStatus,
    pub tax_rate: Option<Percentage>,
    pub commission_rate: Option<Percentage>,
}

impl NewProject {
    pub fn new(
        name: impl Into<String>,
        client: impl Into<String>,
        budget: Money,
        start_date: NaiveDate,
    ) -> Self {
        Self {
            name: name.into(),
            client: client.into(),
            budget,
            start_date,
            status: ProjectStatus::default(),
            tax_rate: None,
            commission_rate: None,
        }
    }

    pub fn status(mut self, status: ProjectStatus) -> Self {
        self.status = status;
        self
    }

    pub fn rates(mut self, tax: Option<Percentage>, commission: Option<Percentage>) -> Self {
        self.tax_rate = tax;
        self.commission_rate = commission;
        self
    }

    /// Budgets must be strictly positive when a project is created
    pub fn validate(&self) -> LedgerResult<()> {
        validate_name("project name", &self.name)?;
        validate_name("client", &self.client)?;
        if !self.budget.is_positive() {
            return Err(LedgerError::InvalidInput(format!(
                "contract budget must be greater than zero, got {}",
                self.budget
            )));
        }
        validate_amount(self.budget)
    }
}

/// Partial update of a project's contract terms
///
/// The rate fields are doubly optional: `Some(None)` clears a per-project
/// override so the tenant-wide rate applies again.
#[derive(Debug, Clone, Default)]
pub struct ProjectPatch {
    pub name: Option<String>,
    pub client: Option<String>,
    pub budget: Option<Money>,
    pub start_date: Option<NaiveDate>,
    pub status: Option<ProjectStatus>,
    pub tax_rate: Option<Option<Percentage>>,
    pub commission_rate: Option<Option<Percentage>>,
}

impl ProjectPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.client.is_none()
            && self.budget.is_none()
            && self.start_date.is_none()
            && self.status.is_none()
            && self.tax_rate.is_none()
            && self.commission_rate.is_none()
    }

    pub fn validate(&self) -> LedgerResult<()> {
        if let Some(name) = &self.name {
            validate_name("project name", name)?;
        }
        if let Some(client) = &self.client {
            validate_name("client", client)?;
        }
        // A zero budget may be set later (e.g. a cancelled contract); the
        // aggregation engine reports "n/a" ratios for it.
        if let Some(budget) = self.budget {
            validate_amount(budget)?;
        }
        Ok(())
    }
}

/// A construction project and its ledger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    pub client: String,
    pub budget: Money,
    pub start_date: NaiveDate,
    #[serde(default)]
    pub status: ProjectStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax_rate: Option<Percentage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commission_rate: Option<Percentage>,
    #[serde(default)]
    pub costs: Vec<CostEntry>,
    #[serde(default)]
    pub realized_income: Vec<IncomeEntry>,
    #[serde(default)]
    pub planned_income: Vec<IncomeEntry>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Project {
    /// Create a project with empty entry collections
    pub fn new(draft: NewProject) -> Self {
        let now = Utc::now();
        Self {
            id: ProjectId::new(),
            name: draft.name.trim().to_string(),
            client: draft.client.trim().to_string(),
            budget: draft.budget,
            start_date: draft.start_date,
            status: draft.status,
            tax_rate: draft.tax_rate,
            commission_rate: draft.commission_rate,
            costs: Vec::new(),
            realized_income: Vec::new(),
            planned_income: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn total_cost(&self) -> Money {
        self.costs.iter().map(|c| c.amount).sum()
    }

    pub fn total_realized_income(&self) -> Money {
        self.realized_income.iter().map(|i| i.amount).sum()
    }

    pub fn total_planned_income(&self) -> Money {
        self.planned_income.iter().map(|i| i.amount).sum()
    }

    /// Budget still to be received, never negative
    pub fn outstanding_receivable(&self) -> Money {
        (self.budget - self.total_realized_income()).floor_zero()
    }

    /// Every entry id held by this project, across all three collections
    pub fn entry_ids(&self) -> impl Iterator<Item = EntryId> + '_ {
        self.costs
            .iter()
            .map(|c| c.id)
            .chain(self.realized_income.iter().map(|i| i.id))
            .chain(self.planned_income.iter().map(|i| i.id))
    }

    pub fn contains_entry(&self, id: EntryId) -> bool {
        self.entry_ids().any(|e| e == id)
    }

    pub fn entry_count(&self) -> usize {
        self.costs.len() + self.realized_income.len() + self.planned_income.len()
    }

    pub fn find_entry(&self, collection: EntryCollection, id: EntryId) -> Option<LedgerEntry> {
        match collection {
            EntryCollection::Costs => self
                .costs
                .iter()
                .find(|c| c.id == id)
                .cloned()
                .map(LedgerEntry::Cost),
            EntryCollection::RealizedIncome => self
                .realized_income
                .iter()
                .find(|i| i.id == id)
                .cloned()
                .map(LedgerEntry::Income),
            EntryCollection::PlannedIncome => self
                .planned_income
                .iter()
                .find(|i| i.id == id)
                .cloned()
                .map(LedgerEntry::Income),
        }
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    pub fn push_cost(&mut self, entry: CostEntry) {
        self.costs.push(entry);
        self.touch();
    }

    pub fn push_realized(&mut self, entry: IncomeEntry) {
        self.realized_income.push(entry);
        self.touch();
    }

    pub fn push_planned(&mut self, entry: IncomeEntry) {
        self.planned_income.push(entry);
        self.touch();
    }

    /// Apply a validated patch to the contract terms
    pub fn apply_patch(&mut self, patch: ProjectPatch) -> LedgerResult<()> {
        patch.validate()?;

        if let Some(name) = patch.name {
            self.name = name.trim().to_string();
        }
        if let Some(client) = patch.client {
            self.client = client.trim().to_string();
        }
        if let Some(budget) = patch.budget {
            self.budget = budget;
        }
        if let Some(start_date) = patch.start_date {
            self.start_date = start_date;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(tax_rate) = patch.tax_rate {
            self.tax_rate = tax_rate;
        }
        if let Some(commission_rate) = patch.commission_rate {
            self.commission_rate = commission_rate;
        }
        self.touch();
        Ok(())
    }

    /// Edit an entry in place. Nothing changes unless the patch is valid and
    /// the entry exists in the named collection.
    pub fn edit_entry(
        &mut self,
        collection: EntryCollection,
        id: EntryId,
        patch: EntryPatch,
    ) -> LedgerResult<LedgerEntry> {
        patch.validate(collection)?;

        let edited = match collection {
            EntryCollection::Costs => {
                let entry = self
                    .costs
                    .iter_mut()
                    .find(|c| c.id == id)
                    .ok_or_else(|| LedgerError::entry_not_found(id.to_string()))?;
                if let Some(description) = patch.description {
                    entry.description = description.trim().to_string();
                }
                if let Some(amount) = patch.amount {
                    entry.amount = amount;
                }
                if let Some(date) = patch.date {
                    entry.date = date;
                }
                if let Some(category) = patch.category {
                    entry.category = category;
                }
                LedgerEntry::Cost(entry.clone())
            }
            EntryCollection::RealizedIncome | EntryCollection::PlannedIncome => {
                let list = if collection == EntryCollection::RealizedIncome {
                    &mut self.realized_income
                } else {
                    &mut self.planned_income
                };
                let entry = list
                    .iter_mut()
                    .find(|i| i.id == id)
                    .ok_or_else(|| LedgerError::entry_not_found(id.to_string()))?;
                if let Some(description) = patch.description {
                    entry.description = description.trim().to_string();
                }
                if let Some(amount) = patch.amount {
                    entry.amount = amount;
                }
                if let Some(date) = patch.date {
                    entry.date = date;
                }
                LedgerEntry::Income(entry.clone())
            }
        };

        self.touch();
        Ok(edited)
    }

    /// Remove an entry from the named collection
    pub fn remove_entry(
        &mut self,
        collection: EntryCollection,
        id: EntryId,
    ) -> LedgerResult<LedgerEntry> {
        let removed = match collection {
            EntryCollection::Costs => {
                let idx = self
                    .costs
                    .iter()
                    .position(|c| c.id == id)
                    .ok_or_else(|| LedgerError::entry_not_found(id.to_string()))?;
                LedgerEntry::Cost(self.costs.remove(idx))
            }
            EntryCollection::RealizedIncome => {
                let idx = self
                    .realized_income
                    .iter()
                    .position(|i| i.id == id)
                    .ok_or_else(|| LedgerError::entry_not_found(id.to_string()))?;
                LedgerEntry::Income(self.realized_income.remove(idx))
            }
            EntryCollection::PlannedIncome => {
                let idx = self
                    .planned_income
                    .iter()
                    .position(|i| i.id == id)
                    .ok_or_else(|| LedgerError::entry_not_found(id.to_string()))?;
                LedgerEntry::Income(self.planned_income.remove(idx))
            }
        };

        self.touch();
        Ok(removed)
    }

    /// Move a planned milestone into the realized collection.
    ///
    /// The position lookup is the only fallible step; once it succeeds the
    /// removal and the append both happen.
    pub fn confirm_receipt(&mut self, id: EntryId, received: NaiveDate) -> LedgerResult<IncomeEntry> {
        let idx = self
            .planned_income
            .iter()
            .position(|i| i.id == id)
            .ok_or_else(|| LedgerError::entry_not_found(id.to_string()))?;

        let realized = self.planned_income.remove(idx).realized_on(received);
        self.realized_income.push(realized.clone());
        self.touch();
        Ok(realized)
    }
}

impl fmt::Display for Project {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.client)
    }
}

/// Entry amounts must not be negative
pub fn validate_amount(amount: Money) -> LedgerResult<()> {
    if amount.is_negative() {
        return Err(LedgerError::InvalidInput(format!(
            "amount cannot be negative, got {}",
            amount
        )));
    }
    if amount > Money::MAX {
        return Err(LedgerError::InvalidInput(format!(
            "amount {} exceeds the maximum of {}",
            amount,
            Money::MAX
        )));
    }
    Ok(())
}

pub fn validate_description(description: &str) -> LedgerResult<()> {
    if description.trim().is_empty() {
        return Err(LedgerError::InvalidInput("description cannot be empty".into()));
    }
    Ok(())
}

fn validate_name(field: &str, value: &str) -> LedgerResult<()> {
    if value.trim().is_empty() {
        return Err(LedgerError::InvalidInput(format!("{} cannot be empty", field)));
    }
    Ok(())
}
