//! Ledger repository
//!
//! `Ledger` owns one tenant's projects and rate settings. Every mutation
//! validates first, changes the in-memory collection, writes the full snapshot
//! to the store and finally notifies observers. A failed validation or lookup
//! leaves everything untouched.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::aggregation::{AggregationEngine, PortfolioSummary, ProjectSummary};
use super::events::{LedgerEvent, LedgerObserver};
use super::forecast::{ForecastRule, ForecastRuleKind};
use super::milestone;
use crate::collab::{ExtractedExpense, ExtractedProject, ExtractionTasks};
use crate::error::{LedgerError, LedgerResult};
use crate::models::project::{validate_amount, validate_description};
use crate::models::{
    CostEntry, EntryCollection, EntryId, EntryPatch, IncomeEntry, LedgerEntry, NewCostEntry,
    NewIncomeEntry, NewProject, Project, ProjectId, ProjectPatch, RateSettings, TenantKey,
};
use crate::storage::{load_json, projects_key, rates_key, save_json, KeyValueStore};

/// Everything a tenant's ledger holds, as exported and imported
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub tenant: TenantKey,
    #[serde(default)]
    pub rates: RateSettings,
    #[serde(default)]
    pub projects: Vec<Project>,
}

impl LedgerSnapshot {
    /// Check the invariants an imported snapshot must satisfy
    pub fn validate(&self) -> LedgerResult<()> {
        let mut project_ids = HashSet::new();
        let mut entry_ids = HashSet::new();

        for project in &self.projects {
            if !project_ids.insert(project.id) {
                return Err(LedgerError::Duplicate {
                    entity_type: "Project",
                    identifier: project.id.to_string(),
                });
            }
            if project.budget.is_negative() {
                return Err(LedgerError::InvalidInput(format!(
                    "project '{}' has a negative budget",
                    project.name
                )));
            }
            validate_amount(project.budget)?;
            for id in project.entry_ids() {
                if !entry_ids.insert(id) {
                    return Err(LedgerError::Duplicate {
                        entity_type: "Entry",
                        identifier: id.to_string(),
                    });
                }
            }
            let amounts = project
                .costs
                .iter()
                .map(|c| c.amount)
                .chain(project.realized_income.iter().map(|i| i.amount))
                .chain(project.planned_income.iter().map(|i| i.amount));
            for amount in amounts {
                validate_amount(amount)?;
            }
        }
        Ok(())
    }
}

/// One tenant's authoritative project collection
pub struct Ledger {
    tenant: TenantKey,
    store: Arc<dyn KeyValueStore>,
    projects: Vec<Project>,
    rates: RateSettings,
    rule: Box<dyn ForecastRule>,
    observers: Vec<Box<dyn LedgerObserver>>,
    tasks: ExtractionTasks,
    actor: Option<String>,
}

impl Ledger {
    /// Load a tenant's ledger from the store.
    ///
    /// Missing or unreadable snapshots start an empty ledger; `default_rates`
    /// apply until the tenant stores rates of its own.
    pub fn open(
        tenant: TenantKey,
        store: Arc<dyn KeyValueStore>,
        default_rates: RateSettings,
        rule: ForecastRuleKind,
    ) -> LedgerResult<Self> {
        let projects: Vec<Project> =
            load_json(store.as_ref(), &projects_key(&tenant))?.unwrap_or_default();
        let rates = load_json(store.as_ref(), &rates_key(&tenant))?.unwrap_or(default_rates);

        debug!(tenant = %tenant, projects = projects.len(), rule = %rule, "ledger opened");

        Ok(Self {
            tenant,
            store,
            projects,
            rates,
            rule: rule.build(),
            observers: Vec::new(),
            tasks: ExtractionTasks::new(),
            actor: None,
        })
    }

    pub fn tenant(&self) -> &TenantKey {
        &self.tenant
    }

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn rates(&self) -> RateSettings {
        self.rates
    }

    pub fn forecast_rule(&self) -> &dyn ForecastRule {
        self.rule.as_ref()
    }

    /// Username stamped on entries that do not name their recorder
    pub fn set_actor(&mut self, username: Option<String>) {
        self.actor = username;
    }

    /// Handle for spawning collaborator tasks tied to this ledger's projects
    pub fn extraction_tasks(&self) -> ExtractionTasks {
        self.tasks.clone()
    }

    pub fn subscribe(&mut self, observer: Box<dyn LedgerObserver>) {
        self.observers.push(observer);
    }

    pub fn get_project(&self, id: ProjectId) -> Option<&Project> {
        self.projects.iter().find(|p| p.id == id)
    }

    pub fn project(&self, id: ProjectId) -> LedgerResult<&Project> {
        self.get_project(id)
            .ok_or_else(|| LedgerError::project_not_found(id.to_string()))
    }

    fn project_mut(&mut self, id: ProjectId) -> LedgerResult<&mut Project> {
        self.projects
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| LedgerError::project_not_found(id.to_string()))
    }

    /// Find a project by full id, short id or (case-insensitive) name
    pub fn resolve_project(&self, reference: &str) -> LedgerResult<&Project> {
        let reference = reference.trim();
        if let Ok(id) = reference.parse::<ProjectId>() {
            if let Some(project) = self.get_project(id) {
                return Ok(project);
            }
        }

        let short = reference.to_lowercase();
        let matches: Vec<&Project> = self
            .projects
            .iter()
            .filter(|p| p.id.short() == short || p.name.to_lowercase() == short)
            .collect();

        match matches.as_slice() {
            [project] => Ok(project),
            [] => Err(LedgerError::project_not_found(reference)),
            _ => Err(LedgerError::InvalidInput(format!(
                "'{}' matches {} projects; use the project id",
                reference,
                matches.len()
            ))),
        }
    }

    /// Find which project and collection hold an entry, by full or short id
    pub fn locate_entry(&self, reference: &str) -> LedgerResult<(ProjectId, EntryCollection, EntryId)> {
        let reference = reference.trim();
        let full = reference.parse::<EntryId>().ok();
        let short = reference.to_lowercase();
        let is_match = |id: EntryId| Some(id) == full || id.short() == short;

        let mut found = Vec::new();
        for project in &self.projects {
            let collections = [
                (EntryCollection::Costs, project.costs.iter().map(|c| c.id).collect::<Vec<_>>()),
                (
                    EntryCollection::RealizedIncome,
                    project.realized_income.iter().map(|i| i.id).collect(),
                ),
                (
                    EntryCollection::PlannedIncome,
                    project.planned_income.iter().map(|i| i.id).collect(),
                ),
            ];
            for (collection, ids) in collections {
                for id in ids.into_iter().filter(|id| is_match(*id)) {
                    found.push((project.id, collection, id));
                }
            }
        }

        match found.as_slice() {
            [single] => Ok(*single),
            [] => Err(LedgerError::entry_not_found(reference)),
            _ => Err(LedgerError::InvalidInput(format!(
                "'{}' matches {} entries; use the full entry id",
                reference,
                found.len()
            ))),
        }
    }

    fn contains_entry(&self, id: EntryId) -> bool {
        self.projects.iter().any(|p| p.contains_entry(id))
    }

    fn fresh_entry_id(&self) -> EntryId {
        let mut id = EntryId::new();
        while self.contains_entry(id) {
            id = EntryId::new();
        }
        id
    }

    fn stamp(&self, recorded_by: Option<String>) -> Option<String> {
        recorded_by.or_else(|| self.actor.clone())
    }

    fn persist(&self) -> LedgerResult<()> {
        save_json(self.store.as_ref(), &projects_key(&self.tenant), &self.projects)
            .and_then(|_| save_json(self.store.as_ref(), &rates_key(&self.tenant), &self.rates))
            .map_err(|e| {
                warn!(tenant = %self.tenant, error = %e, "failed to persist ledger snapshot");
                LedgerError::CollaboratorFailure(format!(
                    "change applied in memory but not saved: {}",
                    e
                ))
            })
    }

    /// Persist, then notify. Observers hear about the change even when the
    /// write failed, since the in-memory state did change.
    ///
    /// A `CollaboratorFailure` from here means "applied in memory, not saved":
    /// this `Ledger` reflects the mutation, but a ledger opened later from the
    /// same store will not.
    fn commit(&self, event: LedgerEvent) -> LedgerResult<()> {
        let persisted = self.persist();
        for observer in &self.observers {
            observer.on_event(&self.tenant, &event);
        }
        persisted
    }

    // ---- projects ----

    pub fn create_project(&mut self, draft: NewProject) -> LedgerResult<Project> {
        draft.validate()?;

        let mut project = Project::new(draft);
        while self.get_project(project.id).is_some() {
            project.id = ProjectId::new();
        }
        self.projects.push(project.clone());

        info!(tenant = %self.tenant, project = %project.id.short(), name = %project.name, "project created");
        self.commit(LedgerEvent::ProjectCreated {
            project: project.clone(),
        })?;
        Ok(project)
    }

    pub fn update_project(&mut self, id: ProjectId, patch: ProjectPatch) -> LedgerResult<Project> {
        if patch.is_empty() {
            return Err(LedgerError::InvalidInput("nothing to change".into()));
        }
        let project = self.project_mut(id)?;
        let before = project.clone();
        project.apply_patch(patch)?;
        let after = project.clone();

        info!(tenant = %self.tenant, project = %id.short(), "project updated");
        self.commit(LedgerEvent::ProjectUpdated {
            before,
            after: after.clone(),
        })?;
        Ok(after)
    }

    /// Delete a project with all its entries and abort its pending extractions
    pub fn delete_project(&mut self, id: ProjectId) -> LedgerResult<Project> {
        let idx = self
            .projects
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| LedgerError::project_not_found(id.to_string()))?;
        let removed = self.projects.remove(idx);
        let aborted = self.tasks.cancel(id);

        info!(
            tenant = %self.tenant,
            project = %id.short(),
            entries = removed.entry_count(),
            aborted_tasks = aborted,
            "project deleted"
        );
        self.commit(LedgerEvent::ProjectDeleted {
            project: removed.clone(),
        })?;
        Ok(removed)
    }

    // ---- entries ----

    pub fn add_cost_entry(&mut self, project_id: ProjectId, draft: NewCostEntry) -> LedgerResult<CostEntry> {
        validate_amount(draft.amount)?;
        validate_description(&draft.description)?;
        self.project(project_id)?;

        let mut entry = CostEntry::from_draft(draft);
        entry.id = self.fresh_entry_id();
        entry.recorded_by = self.stamp(entry.recorded_by.take());

        self.project_mut(project_id)?.push_cost(entry.clone());

        debug!(project = %project_id.short(), entry = %entry.id.short(), amount = %entry.amount, "cost added");
        self.commit(LedgerEvent::EntryAdded {
            project_id,
            collection: EntryCollection::Costs,
            entry: LedgerEntry::Cost(entry.clone()),
        })?;
        Ok(entry)
    }

    pub fn add_income_entry(
        &mut self,
        project_id: ProjectId,
        draft: NewIncomeEntry,
    ) -> LedgerResult<IncomeEntry> {
        self.add_income(project_id, EntryCollection::RealizedIncome, draft)
    }

    pub fn add_planned_income_entry(
        &mut self,
        project_id: ProjectId,
        draft: NewIncomeEntry,
    ) -> LedgerResult<IncomeEntry> {
        self.add_income(project_id, EntryCollection::PlannedIncome, draft)
    }

    fn add_income(
        &mut self,
        project_id: ProjectId,
        collection: EntryCollection,
        draft: NewIncomeEntry,
    ) -> LedgerResult<IncomeEntry> {
        validate_amount(draft.amount)?;
        validate_description(&draft.description)?;
        self.project(project_id)?;

        let mut entry = IncomeEntry::from_draft(draft);
        entry.id = self.fresh_entry_id();
        entry.recorded_by = self.stamp(entry.recorded_by.take());

        let project = self.project_mut(project_id)?;
        if collection == EntryCollection::PlannedIncome {
            project.push_planned(entry.clone());
        } else {
            project.push_realized(entry.clone());
        }

        debug!(project = %project_id.short(), entry = %entry.id.short(), %collection, "income added");
        self.commit(LedgerEvent::EntryAdded {
            project_id,
            collection,
            entry: LedgerEntry::Income(entry.clone()),
        })?;
        Ok(entry)
    }

    pub fn edit_entry(
        &mut self,
        project_id: ProjectId,
        collection: EntryCollection,
        entry_id: EntryId,
        patch: EntryPatch,
    ) -> LedgerResult<LedgerEntry> {
        if patch.is_empty() {
            return Err(LedgerError::InvalidInput("nothing to change".into()));
        }

        let project = self.project_mut(project_id)?;
        let before = project
            .find_entry(collection, entry_id)
            .ok_or_else(|| LedgerError::entry_not_found(entry_id.to_string()))?;
        let after = project.edit_entry(collection, entry_id, patch)?;

        debug!(project = %project_id.short(), entry = %entry_id.short(), %collection, "entry edited");
        self.commit(LedgerEvent::EntryEdited {
            project_id,
            collection,
            before,
            after: after.clone(),
        })?;
        Ok(after)
    }

    pub fn remove_entry(
        &mut self,
        project_id: ProjectId,
        collection: EntryCollection,
        entry_id: EntryId,
    ) -> LedgerResult<LedgerEntry> {
        let removed = self.project_mut(project_id)?.remove_entry(collection, entry_id)?;

        debug!(project = %project_id.short(), entry = %entry_id.short(), %collection, "entry removed");
        self.commit(LedgerEvent::EntryRemoved {
            project_id,
            collection,
            entry: removed.clone(),
        })?;
        Ok(removed)
    }

    /// Move a planned milestone to realized income
    pub fn confirm_receipt(
        &mut self,
        project_id: ProjectId,
        entry_id: EntryId,
        received: NaiveDate,
    ) -> LedgerResult<IncomeEntry> {
        let transition = milestone::confirm(self.project_mut(project_id)?, entry_id, received)?;
        let realized = transition.realized.clone();

        info!(
            project = %project_id.short(),
            entry = %entry_id.short(),
            amount = %realized.amount,
            "milestone received"
        );
        self.commit(LedgerEvent::ReceiptConfirmed { transition })?;
        Ok(realized)
    }

    pub fn set_rate_settings(&mut self, rates: RateSettings) -> LedgerResult<()> {
        let before = std::mem::replace(&mut self.rates, rates);
        info!(tenant = %self.tenant, tax = %rates.tax_rate, commission = %rates.commission_rate, "rates changed");
        self.commit(LedgerEvent::RatesChanged {
            before,
            after: rates,
        })
    }

    // ---- summaries ----

    pub fn summary(&self) -> PortfolioSummary {
        AggregationEngine::new(self.rule.as_ref(), self.rates).portfolio_summary(&self.projects)
    }

    pub fn project_summary(&self, id: ProjectId) -> LedgerResult<ProjectSummary> {
        let project = self.project(id)?;
        Ok(AggregationEngine::new(self.rule.as_ref(), self.rates).project_summary(project))
    }

    // ---- snapshots ----

    pub fn export_snapshot(&self) -> LedgerSnapshot {
        LedgerSnapshot {
            tenant: self.tenant.clone(),
            rates: self.rates,
            projects: self.projects.clone(),
        }
    }

    /// Replace the whole ledger with a validated snapshot
    pub fn import_snapshot(&mut self, snapshot: LedgerSnapshot) -> LedgerResult<usize> {
        snapshot.validate()?;
        if snapshot.tenant != self.tenant {
            warn!(from = %snapshot.tenant, into = %self.tenant, "importing another tenant's snapshot");
        }

        let incoming: HashSet<ProjectId> = snapshot.projects.iter().map(|p| p.id).collect();
        for project in &self.projects {
            if !incoming.contains(&project.id) {
                self.tasks.cancel(project.id);
            }
        }

        self.projects = snapshot.projects;
        self.rates = snapshot.rates;
        let project_count = self.projects.len();

        info!(tenant = %self.tenant, projects = project_count, "snapshot imported");
        self.commit(LedgerEvent::SnapshotImported { project_count })?;
        Ok(project_count)
    }

    // ---- collaborator results ----

    /// Create a project, with its entries, from an extraction result
    pub fn apply_extracted_project(
        &mut self,
        extracted: ExtractedProject,
        fallback_date: NaiveDate,
    ) -> LedgerResult<Project> {
        let start_date = extracted.start_date.unwrap_or(fallback_date);
        let draft = NewProject::new(extracted.name, extracted.client, extracted.budget, start_date);
        draft.validate()?;

        let mut project = Project::new(draft);
        while self.get_project(project.id).is_some() {
            project.id = ProjectId::new();
        }

        let mut used = HashSet::new();
        let mut next_id = |ledger: &Ledger| loop {
            let id = ledger.fresh_entry_id();
            if used.insert(id) {
                break id;
            }
        };

        for expense in extracted.expenses {
            let mut draft = NewCostEntry::new(
                expense.description,
                expense.amount,
                expense.date.unwrap_or(start_date),
                expense.category,
            );
            draft.invoice_number = expense.invoice_number;
            let mut entry = CostEntry::from_draft(draft);
            entry.id = next_id(self);
            entry.recorded_by = self.actor.clone();
            project.push_cost(entry);
        }
        for (revenues, planned) in [(extracted.revenues, false), (extracted.planned_revenues, true)] {
            for revenue in revenues {
                let mut entry = IncomeEntry::from_draft(NewIncomeEntry::new(
                    revenue.description,
                    revenue.amount,
                    revenue.date.unwrap_or(start_date),
                ));
                entry.id = next_id(self);
                entry.recorded_by = self.actor.clone();
                if planned {
                    project.push_planned(entry);
                } else {
                    project.push_realized(entry);
                }
            }
        }

        self.projects.push(project.clone());
        info!(
            tenant = %self.tenant,
            project = %project.id.short(),
            entries = project.entry_count(),
            "project created from document"
        );
        self.commit(LedgerEvent::ProjectCreated {
            project: project.clone(),
        })?;
        Ok(project)
    }

    /// Record an extracted receipt as a cost. Fails with `NotFound` when the
    /// project was deleted while extraction was running.
    pub fn apply_extracted_expense(
        &mut self,
        project_id: ProjectId,
        expense: ExtractedExpense,
        fallback_date: NaiveDate,
    ) -> LedgerResult<CostEntry> {
        if self.get_project(project_id).is_none() {
            warn!(project = %project_id.short(), "discarding extraction result for a deleted project");
            return Err(LedgerError::project_not_found(project_id.to_string()));
        }

        let mut draft = NewCostEntry::new(
            expense.description,
            expense.amount,
            expense.date.unwrap_or(fallback_date),
            expense.category,
        );
        draft.invoice_number = expense.invoice_number;
        self.add_cost_entry(project_id, draft)
    }
}
