//! CLI commands for export and import

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use clap::{Args, ValueEnum};

use super::context::CliContext;
use crate::error::{LedgerError, LedgerResult};
use crate::export::{csv, json, yaml};

/// Export format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    /// Full ledger, machine-readable
    Json,
    /// Full ledger, human-readable
    Yaml,
    /// Every entry, one row each
    Csv,
    /// One summary row per project
    SummaryCsv,
}

#[derive(Args)]
pub struct ExportArgs {
    /// Output file; stdout when omitted
    #[arg(short, long)]
    pub output: Option<PathBuf>,
    #[arg(short, long, value_enum, default_value = "json")]
    pub format: ExportFormat,
    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,
}

#[derive(Args)]
pub struct ImportArgs {
    /// JSON or YAML export to load
    pub file: PathBuf,
    /// Required; the import replaces every project of the company
    #[arg(long)]
    pub force: bool,
}

fn create_output(path: &Path) -> LedgerResult<BufWriter<File>> {
    let file = File::create(path).map_err(|e| {
        LedgerError::Export(format!("Failed to create file {}: {}", path.display(), e))
    })?;
    Ok(BufWriter::new(file))
}

pub fn handle_export_command(ctx: &CliContext, args: ExportArgs) -> LedgerResult<()> {
    let ledger = ctx.open_ledger()?;

    let mut writer: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(create_output(path)?),
        None => Box::new(std::io::stdout().lock()),
    };

    match args.format {
        ExportFormat::Json => json::export_full_json(ledger.export_snapshot(), &mut writer, args.pretty)?,
        ExportFormat::Yaml => yaml::export_full_yaml(ledger.export_snapshot(), &mut writer)?,
        ExportFormat::Csv => csv::export_entries_csv(ledger.projects(), &mut writer)?,
        ExportFormat::SummaryCsv => csv::export_summary_csv(&ledger.summary(), &mut writer)?,
    }
    writer
        .flush()
        .map_err(|e| LedgerError::Export(e.to_string()))?;

    if let Some(path) = &args.output {
        eprintln!(
            "Exported {} projects to: {}",
            ledger.projects().len(),
            path.display()
        );
    }

    Ok(())
}

pub fn handle_import_command(ctx: &CliContext, args: ImportArgs) -> LedgerResult<()> {
    let contents = std::fs::read_to_string(&args.file).map_err(|e| {
        LedgerError::Import(format!("Failed to read {}: {}", args.file.display(), e))
    })?;

    let is_yaml = matches!(
        args.file.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    );
    let export = if is_yaml {
        yaml::import_from_yaml(&contents)?
    } else {
        json::import_from_json(&contents)?
    };

    let mut ledger = ctx.open_ledger()?;
    if !args.force && !ledger.projects().is_empty() {
        return Err(LedgerError::InvalidInput(format!(
            "{} has {} projects that the import would replace; re-run with --force",
            ledger.tenant(),
            ledger.projects().len()
        )));
    }

    let count = ledger.import_snapshot(export.into_snapshot())?;
    println!("Imported {} projects into {}", count, ledger.tenant());
    Ok(())
}
