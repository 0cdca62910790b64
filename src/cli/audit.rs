//! Audit log viewer

use clap::Args;

use super::context::CliContext;
use crate::audit::AuditLogger;
use crate::display::format_audit_entries;
use crate::error::LedgerResult;

#[derive(Args)]
pub struct AuditArgs {
    /// Number of most recent entries to show
    #[arg(short = 'n', long, default_value = "20")]
    pub limit: usize,
}

pub fn handle_audit_command(ctx: &CliContext, args: AuditArgs) -> LedgerResult<()> {
    // a company's history needs the same access as its ledger
    let tenant = ctx.open_ledger()?.tenant().clone();
    let logger = AuditLogger::new(ctx.paths.audit_log());

    let entries = logger.read_recent(args.limit, Some(&tenant))?;
    print!("{}", format_audit_entries(&entries));
    Ok(())
}
