//! Portfolio summary command

use clap::Args;

use super::context::CliContext;
use crate::collab::narrate;
use crate::display::{format_portfolio_summary, format_project_details};
use crate::error::LedgerResult;
use crate::services::NarrativeInput;

#[derive(Args)]
pub struct SummaryArgs {
    /// Summarize one project instead of the whole portfolio
    #[arg(short, long)]
    pub project: Option<String>,
    /// Print the summary as JSON
    #[arg(long)]
    pub json: bool,
    /// Ask the configured narrator for a written analysis
    #[arg(long, conflicts_with = "json")]
    pub narrate: bool,
}

pub fn handle_summary_command(ctx: &CliContext, args: SummaryArgs) -> LedgerResult<()> {
    let ledger = ctx.open_ledger()?;
    let symbol = ctx.symbol();

    if let Some(reference) = args.project {
        let project = ledger.resolve_project(&reference)?;
        let summary = ledger.project_summary(project.id)?;
        if args.json {
            println!("{}", serde_json::to_string_pretty(&summary)?);
        } else {
            print!("{}", format_project_details(project, &summary, symbol));
        }
        return Ok(());
    }

    let summary = ledger.summary();
    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print!("{}", format_portfolio_summary(&summary, symbol));
    }

    if args.narrate {
        let narrator = ctx.narrator()?;
        let input = NarrativeInput::from_summary(&summary);
        let text = ctx.runtime()?.block_on(narrate(&narrator, &input));
        println!();
        println!("Analysis");
        println!("{}", "=".repeat(8));
        println!("{}", text);
    }

    Ok(())
}
