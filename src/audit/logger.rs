//! Append-only audit log
//!
//! Each entry is written as a single JSON line (JSONL) and flushed
//! immediately. The logger also subscribes to ledger events so that every
//! successful mutation lands in the log without the ledger knowing about it.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;

use serde::Serialize;
use tracing::warn;

use super::diff::generate_diff;
use super::entry::{AuditEntry, EntityType};
use crate::error::{LedgerError, LedgerResult};
use crate::models::{EntryCollection, LedgerEntry, TenantKey};
use crate::services::{LedgerEvent, LedgerObserver};

/// Handles writing audit entries to the audit log file
pub struct AuditLogger {
    log_path: PathBuf,
}

impl AuditLogger {
    pub fn new(log_path: PathBuf) -> Self {
        Self { log_path }
    }

    /// Append the entry as a JSON line
    pub fn log(&self, entry: &AuditEntry) -> LedgerResult<()> {
        if let Some(parent) = self.log_path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| LedgerError::Io(format!("Failed to create audit directory: {}", e)))?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)
            .map_err(|e| LedgerError::Io(format!("Failed to open audit log: {}", e)))?;

        let json = serde_json::to_string(entry)
            .map_err(|e| LedgerError::Json(format!("Failed to serialize audit entry: {}", e)))?;

        writeln!(file, "{}", json)
            .map_err(|e| LedgerError::Io(format!("Failed to write audit entry: {}", e)))?;

        file.flush()
            .map_err(|e| LedgerError::Io(format!("Failed to flush audit log: {}", e)))?;

        Ok(())
    }

    /// Read all audit entries, oldest first
    pub fn read_all(&self) -> LedgerResult<Vec<AuditEntry>> {
        if !self.log_path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&self.log_path)
            .map_err(|e| LedgerError::Io(format!("Failed to open audit log: {}", e)))?;

        let reader = BufReader::new(file);
        let mut entries = Vec::new();

        for (line_num, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| {
                LedgerError::Io(format!("Failed to read audit log line {}: {}", line_num + 1, e))
            })?;

            if line.trim().is_empty() {
                continue;
            }

            let entry: AuditEntry = serde_json::from_str(&line).map_err(|e| {
                LedgerError::Json(format!(
                    "Failed to parse audit entry at line {}: {}",
                    line_num + 1,
                    e
                ))
            })?;

            entries.push(entry);
        }

        Ok(entries)
    }

    /// Read the most recent N entries, optionally only one tenant's
    pub fn read_recent(&self, count: usize, tenant: Option<&TenantKey>) -> LedgerResult<Vec<AuditEntry>> {
        let mut entries = self.read_all()?;
        if let Some(tenant) = tenant {
            entries.retain(|e| e.tenant.as_deref() == Some(tenant.as_str()));
        }
        let start = entries.len().saturating_sub(count);
        Ok(entries.split_off(start))
    }

    pub fn entry_count(&self) -> LedgerResult<usize> {
        Ok(self.read_all()?.len())
    }

    pub fn path(&self) -> &PathBuf {
        &self.log_path
    }
}

fn entity_type_for(collection: EntryCollection) -> EntityType {
    match collection {
        EntryCollection::Costs => EntityType::CostEntry,
        EntryCollection::RealizedIncome => EntityType::RealizedIncome,
        EntryCollection::PlannedIncome => EntityType::PlannedIncome,
    }
}

fn diff_of<T: Serialize>(before: &T, after: &T) -> Option<String> {
    let before = serde_json::to_value(before).ok()?;
    let after = serde_json::to_value(after).ok()?;
    generate_diff(&before, &after)
}

fn entry_name(entry: &LedgerEntry) -> Option<String> {
    Some(entry.description().to_string())
}

/// Translate a ledger event into its audit entry
pub fn audit_entry_for(event: &LedgerEvent) -> AuditEntry {
    match event {
        LedgerEvent::ProjectCreated { project } => AuditEntry::create(
            EntityType::Project,
            project.id.to_string(),
            Some(project.name.clone()),
            project,
        ),
        LedgerEvent::ProjectUpdated { before, after } => AuditEntry::update(
            EntityType::Project,
            after.id.to_string(),
            Some(after.name.clone()),
            before,
            after,
            diff_of(before, after),
        ),
        LedgerEvent::ProjectDeleted { project } => AuditEntry::delete(
            EntityType::Project,
            project.id.to_string(),
            Some(project.name.clone()),
            project,
        ),
        LedgerEvent::EntryAdded {
            collection, entry, ..
        } => AuditEntry::create(
            entity_type_for(*collection),
            entry.id().to_string(),
            entry_name(entry),
            entry,
        ),
        LedgerEvent::EntryEdited {
            collection,
            before,
            after,
            ..
        } => AuditEntry::update(
            entity_type_for(*collection),
            after.id().to_string(),
            entry_name(after),
            before,
            after,
            diff_of(before, after),
        ),
        LedgerEvent::EntryRemoved {
            collection, entry, ..
        } => AuditEntry::delete(
            entity_type_for(*collection),
            entry.id().to_string(),
            entry_name(entry),
            entry,
        ),
        LedgerEvent::ReceiptConfirmed { transition } => AuditEntry::transition(
            EntityType::PlannedIncome,
            transition.realized.id.to_string(),
            Some(transition.realized.description.clone()),
            &transition.planned,
            &transition.realized,
            Some(format!(
                "planned ({}) -> realized ({})",
                transition.planned.date, transition.realized.date
            )),
        ),
        LedgerEvent::RatesChanged { before, after } => AuditEntry::update(
            EntityType::RateSettings,
            "rates",
            None,
            before,
            after,
            diff_of(before, after),
        ),
        LedgerEvent::SnapshotImported { project_count } => {
            AuditEntry::import("ledger", format!("{} projects imported", project_count))
        }
    }
}

impl LedgerObserver for AuditLogger {
    fn on_event(&self, tenant: &TenantKey, event: &LedgerEvent) {
        let entry = audit_entry_for(event).for_tenant(tenant.as_str());
        if let Err(e) = self.log(&entry) {
            warn!(error = %e, path = %self.log_path.display(), "failed to write audit entry");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::entry::Operation;
    use crate::models::{Money, NewIncomeEntry, NewProject, RateSettings};
    use crate::services::{ForecastRuleKind, Ledger};
    use crate::storage::MemoryStore;
    use chrono::NaiveDate;
    use serde_json::json;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn create_test_logger() -> (AuditLogger, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let logger = AuditLogger::new(temp_dir.path().join("audit.log"));
        (logger, temp_dir)
    }

    #[test]
    fn test_log_and_read() {
        let (logger, _temp) = create_test_logger();
        let entry = AuditEntry::create(EntityType::Project, "prj-1", None, &json!({"name": "A"}));

        logger.log(&entry).unwrap();

        let entries = logger.read_all().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].entity_type, EntityType::Project);
    }

    #[test]
    fn test_read_empty_log() {
        let (logger, _temp) = create_test_logger();
        assert!(logger.read_all().unwrap().is_empty());
        assert_eq!(logger.entry_count().unwrap(), 0);
    }

    #[test]
    fn test_read_recent_filters_tenant() {
        let (logger, _temp) = create_test_logger();
        for (i, tenant) in ["a", "b", "a", "a"].iter().enumerate() {
            let entry = AuditEntry::create(EntityType::Project, format!("prj-{}", i), None, &json!({}))
                .for_tenant(*tenant);
            logger.log(&entry).unwrap();
        }

        let tenant = TenantKey::normalize("a").unwrap();
        let recent = logger.read_recent(2, Some(&tenant)).unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].entity_id, "prj-2");
        assert_eq!(recent[1].entity_id, "prj-3");
        assert_eq!(logger.read_recent(10, None).unwrap().len(), 4);
    }

    #[test]
    fn test_ledger_mutations_are_audited() {
        let (logger, temp) = create_test_logger();
        let mut ledger = Ledger::open(
            TenantKey::normalize("Acme").unwrap(),
            Arc::new(MemoryStore::new()),
            RateSettings::default(),
            ForecastRuleKind::default(),
        )
        .unwrap();
        ledger.subscribe(Box::new(logger));

        let date = NaiveDate::from_ymd_opt(2025, 11, 30).unwrap();
        let project = ledger
            .create_project(NewProject::new("Bridge", "State", Money::from_units(1000), date))
            .unwrap();
        let planned = ledger
            .add_planned_income_entry(project.id, NewIncomeEntry::new("Nov", Money::from_units(100), date))
            .unwrap();
        ledger
            .confirm_receipt(project.id, planned.id, NaiveDate::from_ymd_opt(2025, 12, 1).unwrap())
            .unwrap();

        let entries = AuditLogger::new(temp.path().join("audit.log")).read_all().unwrap();
        let operations: Vec<Operation> = entries.iter().map(|e| e.operation).collect();
        assert_eq!(
            operations,
            vec![Operation::Create, Operation::Create, Operation::Transition]
        );
        assert!(entries.iter().all(|e| e.tenant.as_deref() == Some("acme")));
        assert!(entries[2].diff_summary.as_deref().unwrap().contains("2025-12-01"));
    }
}
