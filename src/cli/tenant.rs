//! Company (tenant) CLI commands

use clap::Subcommand;

use super::context::CliContext;
use crate::display::format_tenant_list;
use crate::error::LedgerResult;

#[derive(Subcommand)]
pub enum TenantCommands {
    /// Register a company
    Register {
        /// Company name as it should be displayed
        name: String,
    },
    /// List registered companies
    List,
    /// Make a company the default for later commands
    Use {
        /// Company name or key
        name: String,
    },
}

pub fn handle_tenant_command(ctx: &mut CliContext, cmd: TenantCommands) -> LedgerResult<()> {
    let service = ctx.tenants();

    match cmd {
        TenantCommands::Register { name } => {
            let tenant = service.register(&name)?;
            println!("Registered company: {}", tenant.display_name);
            println!("  Key: {}", tenant.key);
        }

        TenantCommands::List => {
            print!("{}", format_tenant_list(&service.list()?));
        }

        TenantCommands::Use { name } => {
            let tenant = service.resolve(&name)?;
            ctx.settings.default_company = Some(tenant.display_name.clone());
            ctx.settings.save(&ctx.paths)?;
            println!("Default company set to: {}", tenant.display_name);
        }
    }

    Ok(())
}
