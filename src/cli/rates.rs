//! Company-wide tax and commission rates

use clap::Subcommand;

use super::context::{parse_money, parse_rate, CliContext};
use crate::error::{LedgerError, LedgerResult};
use crate::models::RateSettings;
use crate::services::compute_breakdown;

#[derive(Subcommand)]
pub enum RatesCommands {
    /// Show the rates in force and what they withhold from an amount
    Show {
        /// Example amount to break down
        #[arg(long)]
        example: Option<String>,
    },
    /// Change the company rates; omitted rates keep their value
    Set {
        /// Withheld tax in percent (e.g. 6 or 6.5)
        #[arg(long)]
        tax: Option<String>,
        /// Commission in percent, applied after tax
        #[arg(long)]
        commission: Option<String>,
    },
}

pub fn handle_rates_command(ctx: &CliContext, cmd: RatesCommands) -> LedgerResult<()> {
    let mut ledger = ctx.open_ledger()?;
    let symbol = ctx.symbol();

    match cmd {
        RatesCommands::Show { example } => {
            let rates = ledger.rates();
            println!("Tax rate:        {}", rates.tax_rate);
            println!("Commission rate: {}", rates.commission_rate);
            println!("Forecast rule:   {}", ledger.forecast_rule().name());

            if let Some(example) = example {
                let breakdown = compute_breakdown(parse_money(&example)?, rates);
                println!();
                println!("  Base:       {:>16}", breakdown.base.format_with_symbol(symbol));
                println!("  Tax:        {:>16}", breakdown.tax.format_with_symbol(symbol));
                println!("  Commission: {:>16}", breakdown.commission.format_with_symbol(symbol));
                println!("  Net:        {:>16}", breakdown.net.format_with_symbol(symbol));
            }
        }

        RatesCommands::Set { tax, commission } => {
            if tax.is_none() && commission.is_none() {
                return Err(LedgerError::InvalidInput(
                    "nothing to change; pass --tax and/or --commission".into(),
                ));
            }
            let current = ledger.rates();
            let rates = RateSettings::new(
                tax.as_deref().map(parse_rate).transpose()?.unwrap_or(current.tax_rate),
                commission
                    .as_deref()
                    .map(parse_rate)
                    .transpose()?
                    .unwrap_or(current.commission_rate),
            );
            ledger.set_rate_settings(rates)?;
            println!(
                "Rates updated: tax {}, commission {}",
                rates.tax_rate, rates.commission_rate
            );
        }
    }

    Ok(())
}
