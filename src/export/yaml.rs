//! YAML Export functionality
//!
//! Exports the ledger to YAML for a human-readable backup.

use std::io::Write;

use crate::error::{LedgerError, LedgerResult};
use crate::export::json::FullExport;
use crate::services::LedgerSnapshot;

fn export_err(e: impl std::fmt::Display) -> LedgerError {
    LedgerError::Export(e.to_string())
}

/// Export the ledger to YAML format
pub fn export_full_yaml<W: Write>(snapshot: LedgerSnapshot, writer: &mut W) -> LedgerResult<()> {
    let export = FullExport::from_snapshot(snapshot);

    writeln!(writer, "# siteledger export for tenant '{}'", export.tenant).map_err(export_err)?;
    writeln!(writer, "# Generated: {}", export.exported_at).map_err(export_err)?;
    writeln!(writer, "# App Version: {}", export.app_version).map_err(export_err)?;
    writeln!(writer, "#").map_err(export_err)?;
    writeln!(writer, "# Amounts are in cents, rates in basis points.").map_err(export_err)?;
    writeln!(writer).map_err(export_err)?;

    serde_yaml::to_writer(writer, &export).map_err(export_err)?;

    Ok(())
}

/// Parse and validate a YAML export
pub fn import_from_yaml(yaml_str: &str) -> LedgerResult<FullExport> {
    let export: FullExport =
        serde_yaml::from_str(yaml_str).map_err(|e| LedgerError::Import(e.to_string()))?;

    export.validate().map_err(LedgerError::Import)?;

    Ok(export)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Money, NewProject, RateSettings, TenantKey};
    use crate::services::{ForecastRuleKind, Ledger};
    use crate::storage::MemoryStore;
    use chrono::NaiveDate;
    use std::sync::Arc;

    #[test]
    fn test_yaml_roundtrip() {
        let mut ledger = Ledger::open(
            TenantKey::normalize("Acme").unwrap(),
            Arc::new(MemoryStore::new()),
            RateSettings::default(),
            ForecastRuleKind::default(),
        )
        .unwrap();
        ledger
            .create_project(NewProject::new(
                "Warehouse",
                "Logistics Co",
                Money::from_units(12000),
                NaiveDate::from_ymd_opt(2025, 4, 1).unwrap(),
            ))
            .unwrap();

        let mut output = Vec::new();
        export_full_yaml(ledger.export_snapshot(), &mut output).unwrap();
        let yaml = String::from_utf8(output).unwrap();

        assert!(yaml.starts_with("# siteledger export for tenant 'acme'"));
        assert!(yaml.contains("Warehouse"));

        // comment lines are valid YAML, so the file parses as written
        let imported = import_from_yaml(&yaml).unwrap();
        assert_eq!(imported.projects.len(), 1);
        assert_eq!(imported.projects[0].client, "Logistics Co");
    }
}
