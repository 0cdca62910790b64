//! JSON Export functionality
//!
//! Exports a tenant's complete ledger to JSON with schema versioning. The
//! same document is accepted back by `import_from_json`.

use std::io::Write;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{LedgerError, LedgerResult};
use crate::models::{Project, RateSettings, TenantKey};
use crate::services::LedgerSnapshot;

/// Current export schema version
pub const EXPORT_SCHEMA_VERSION: &str = "1.0.0";

/// Full ledger export structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FullExport {
    /// Schema version for compatibility checking
    pub schema_version: String,

    pub exported_at: DateTime<Utc>,

    /// Application version that created the export
    pub app_version: String,

    pub tenant: TenantKey,

    #[serde(default)]
    pub rates: RateSettings,

    #[serde(default)]
    pub projects: Vec<Project>,

    pub metadata: ExportMetadata,
}

/// Export metadata for reference
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportMetadata {
    pub project_count: usize,
    pub cost_count: usize,
    pub realized_income_count: usize,
    pub planned_income_count: usize,

    /// Earliest entry date across all collections
    pub earliest_entry: Option<String>,

    /// Latest entry date across all collections
    pub latest_entry: Option<String>,
}

impl FullExport {
    pub fn from_snapshot(snapshot: LedgerSnapshot) -> Self {
        let dates: Vec<_> = snapshot
            .projects
            .iter()
            .flat_map(|p| {
                p.costs
                    .iter()
                    .map(|c| c.date)
                    .chain(p.realized_income.iter().map(|i| i.date))
                    .chain(p.planned_income.iter().map(|i| i.date))
            })
            .collect();

        let metadata = ExportMetadata {
            project_count: snapshot.projects.len(),
            cost_count: snapshot.projects.iter().map(|p| p.costs.len()).sum(),
            realized_income_count: snapshot.projects.iter().map(|p| p.realized_income.len()).sum(),
            planned_income_count: snapshot.projects.iter().map(|p| p.planned_income.len()).sum(),
            earliest_entry: dates.iter().min().map(|d| d.to_string()),
            latest_entry: dates.iter().max().map(|d| d.to_string()),
        };

        Self {
            schema_version: EXPORT_SCHEMA_VERSION.to_string(),
            exported_at: Utc::now(),
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            tenant: snapshot.tenant,
            rates: snapshot.rates,
            projects: snapshot.projects,
            metadata,
        }
    }

    /// Validate the export structure
    pub fn validate(&self) -> Result<(), String> {
        if self.schema_version != EXPORT_SCHEMA_VERSION {
            return Err(format!(
                "Schema version mismatch: expected {}, got {}",
                EXPORT_SCHEMA_VERSION, self.schema_version
            ));
        }

        self.snapshot().validate().map_err(|e| e.to_string())
    }

    /// The ledger content of this export
    pub fn snapshot(&self) -> LedgerSnapshot {
        LedgerSnapshot {
            tenant: self.tenant.clone(),
            rates: self.rates,
            projects: self.projects.clone(),
        }
    }

    pub fn into_snapshot(self) -> LedgerSnapshot {
        LedgerSnapshot {
            tenant: self.tenant,
            rates: self.rates,
            projects: self.projects,
        }
    }
}

/// Export the ledger to JSON
pub fn export_full_json<W: Write>(
    snapshot: LedgerSnapshot,
    writer: &mut W,
    pretty: bool,
) -> LedgerResult<()> {
    let export = FullExport::from_snapshot(snapshot);

    if pretty {
        serde_json::to_writer_pretty(writer, &export)
    } else {
        serde_json::to_writer(writer, &export)
    }
    .map_err(|e| LedgerError::Export(e.to_string()))?;

    Ok(())
}

/// Parse and validate a JSON export
pub fn import_from_json(json_str: &str) -> LedgerResult<FullExport> {
    let export: FullExport =
        serde_json::from_str(json_str).map_err(|e| LedgerError::Import(e.to_string()))?;

    export.validate().map_err(LedgerError::Import)?;

    Ok(export)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CostCategory, Money, NewCostEntry, NewIncomeEntry, NewProject};
    use crate::services::{ForecastRuleKind, Ledger};
    use crate::storage::MemoryStore;
    use chrono::NaiveDate;
    use std::sync::Arc;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn populated_ledger() -> Ledger {
        let mut ledger = Ledger::open(
            TenantKey::normalize("Acme").unwrap(),
            Arc::new(MemoryStore::new()),
            RateSettings::default(),
            ForecastRuleKind::default(),
        )
        .unwrap();
        let project = ledger
            .create_project(NewProject::new("Bridge", "State", Money::from_units(5000), date(2025, 1, 10)))
            .unwrap();
        ledger
            .add_cost_entry(
                project.id,
                NewCostEntry::new("Cement", Money::from_units(300), date(2025, 2, 1), CostCategory::Material),
            )
            .unwrap();
        ledger
            .add_planned_income_entry(project.id, NewIncomeEntry::new("M1", Money::from_units(2000), date(2025, 3, 1)))
            .unwrap();
        ledger
    }

    #[test]
    fn test_full_export_metadata() {
        let export = FullExport::from_snapshot(populated_ledger().export_snapshot());

        assert_eq!(export.schema_version, EXPORT_SCHEMA_VERSION);
        assert_eq!(export.metadata.project_count, 1);
        assert_eq!(export.metadata.cost_count, 1);
        assert_eq!(export.metadata.planned_income_count, 1);
        assert_eq!(export.metadata.earliest_entry.as_deref(), Some("2025-02-01"));
        assert_eq!(export.metadata.latest_entry.as_deref(), Some("2025-03-01"));
        assert!(export.validate().is_ok());
    }

    #[test]
    fn test_json_roundtrip_restores_ledger() {
        let ledger = populated_ledger();
        let mut output = Vec::new();
        export_full_json(ledger.export_snapshot(), &mut output, true).unwrap();

        let imported = import_from_json(&String::from_utf8(output).unwrap()).unwrap();

        let mut restored = Ledger::open(
            TenantKey::normalize("Acme").unwrap(),
            Arc::new(MemoryStore::new()),
            RateSettings::default(),
            ForecastRuleKind::default(),
        )
        .unwrap();
        restored.import_snapshot(imported.into_snapshot()).unwrap();
        assert_eq!(restored.projects(), ledger.projects());
    }

    #[test]
    fn test_schema_mismatch_is_rejected() {
        let mut export = FullExport::from_snapshot(populated_ledger().export_snapshot());
        export.schema_version = "0.1.0".into();
        let json = serde_json::to_string(&export).unwrap();

        let err = import_from_json(&json).unwrap_err();
        assert!(matches!(err, LedgerError::Import(ref msg) if msg.contains("Schema version")));
    }

    #[test]
    fn test_duplicate_entry_ids_are_rejected() {
        let mut export = FullExport::from_snapshot(populated_ledger().export_snapshot());
        let mut copy = export.projects[0].clone();
        copy.id = crate::models::ProjectId::new();
        export.projects.push(copy);
        let json = serde_json::to_string(&export).unwrap();

        assert!(matches!(import_from_json(&json), Err(LedgerError::Import(_))));
    }
}
