use anyhow::Result;
use clap::{Parser, Subcommand};

use siteledger::cli::{
    handle_audit_command, handle_cost_command, handle_export_command, handle_import_command,
    handle_income_command, handle_project_command, handle_rates_command, handle_summary_command,
    handle_tenant_command, handle_user_command, AuditArgs, CliContext, CostCommands, ExportArgs,
    ImportArgs, IncomeCommands, ProjectCommands, RatesCommands, SummaryArgs, TenantCommands,
    UserCommands,
};
use siteledger::config::{LedgerPaths, Settings};
use siteledger::logging::init_tracing;

#[derive(Parser)]
#[command(
    name = "siteledger",
    version,
    about = "Construction-project ledger with income milestones and profit forecasting",
    long_about = "siteledger keeps, per company, the projects of a construction business: \
                  contract value, costs by category, received and planned measurement \
                  payments, and the tax, commission and profit forecast they imply."
)]
struct Cli {
    /// Company to operate on (defaults to the one set with 'tenant use')
    #[arg(short, long, global = true, env = "SITELEDGER_COMPANY")]
    company: Option<String>,

    /// User to act as, required once the company has users
    #[arg(short, long, global = true, env = "SITELEDGER_USER")]
    user: Option<String>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Company registration and selection
    #[command(subcommand)]
    Tenant(TenantCommands),

    /// Users of the selected company
    #[command(subcommand)]
    User(UserCommands),

    /// Project management commands
    #[command(subcommand)]
    Project(ProjectCommands),

    /// Cost entries
    #[command(subcommand)]
    Cost(CostCommands),

    /// Received income and planned milestones
    #[command(subcommand)]
    Income(IncomeCommands),

    /// Company-wide tax and commission rates
    #[command(subcommand)]
    Rates(RatesCommands),

    /// Portfolio or project summary with forecast
    Summary(SummaryArgs),

    /// Export the company's ledger
    Export(ExportArgs),

    /// Replace the company's ledger with an export
    Import(ImportArgs),

    /// Show recent changes
    Audit(AuditArgs),

    /// Show current configuration and paths
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let paths = LedgerPaths::new()?;
    paths.ensure_directories()?;
    let settings = Settings::load_or_create(&paths)?;
    let mut ctx = CliContext::new(paths, settings, cli.company, cli.user);

    match cli.command {
        Some(Commands::Tenant(cmd)) => handle_tenant_command(&mut ctx, cmd)?,
        Some(Commands::User(cmd)) => handle_user_command(&ctx, cmd)?,
        Some(Commands::Project(cmd)) => handle_project_command(&ctx, cmd)?,
        Some(Commands::Cost(cmd)) => handle_cost_command(&ctx, cmd)?,
        Some(Commands::Income(cmd)) => handle_income_command(&ctx, cmd)?,
        Some(Commands::Rates(cmd)) => handle_rates_command(&ctx, cmd)?,
        Some(Commands::Summary(args)) => handle_summary_command(&ctx, args)?,
        Some(Commands::Export(args)) => handle_export_command(&ctx, args)?,
        Some(Commands::Import(args)) => handle_import_command(&ctx, args)?,
        Some(Commands::Audit(args)) => handle_audit_command(&ctx, args)?,
        Some(Commands::Config) => {
            let settings = &ctx.settings;
            println!("siteledger Configuration");
            println!("========================");
            println!("Base directory: {}", ctx.paths.base_dir().display());
            println!("Data directory: {}", ctx.paths.data_dir().display());
            println!("Settings file:  {}", ctx.paths.settings_file().display());
            println!("Audit log:      {}", ctx.paths.audit_log().display());
            println!();
            println!("Settings:");
            println!("  Currency symbol:  {}", settings.currency_symbol);
            println!(
                "  Default company:  {}",
                settings.default_company.as_deref().unwrap_or("(none)")
            );
            println!("  Default tax:      {}", settings.default_rates.tax_rate);
            println!("  Default commission: {}", settings.default_rates.commission_rate);
            println!("  Forecast rule:    {}", settings.forecast_rule);
            println!(
                "  Extractor:        {}",
                settings.extractor_command.as_deref().unwrap_or("(not configured)")
            );
            println!(
                "  Narrator:         {}",
                settings.narrator_command.as_deref().unwrap_or("(not configured)")
            );
        }
        None => {
            println!("siteledger - construction project ledger");
            println!();
            println!("Run 'siteledger --help' for usage information.");
            println!("Start with 'siteledger tenant register \"<company>\"'.");
        }
    }

    Ok(())
}
