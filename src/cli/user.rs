//! User CLI commands
//!
//! The first user of a company can be added without credentials. After that
//! only an authenticated admin may add or remove users.

use clap::Subcommand;

use super::context::{read_new_password, CliContext};
use crate::collab::UserDirectory;
use crate::display::format_user_list;
use crate::error::{LedgerError, LedgerResult};
use crate::models::UserRole;

#[derive(Subcommand)]
pub enum UserCommands {
    /// Add a user to the selected company
    Add {
        username: String,
        /// Role (admin, editor)
        #[arg(short, long, default_value = "editor")]
        role: String,
    },
    /// List the company's users
    List,
    /// Remove a user
    Remove { username: String },
}

fn require_admin(ctx: &CliContext, directory: &UserDirectory<'_>) -> LedgerResult<()> {
    if directory.users().is_empty() {
        return Ok(());
    }
    ctx.authenticate(directory)?;
    match ctx.user().and_then(|u| directory.get(u)) {
        Some(user) if user.role == UserRole::Admin => Ok(()),
        _ => Err(LedgerError::InvalidInput(
            "only an admin can manage users".into(),
        )),
    }
}

pub fn handle_user_command(ctx: &CliContext, cmd: UserCommands) -> LedgerResult<()> {
    let tenant = ctx.tenant()?;
    let mut directory = UserDirectory::load(ctx.store(), tenant.key.clone())?;

    match cmd {
        UserCommands::Add { username, role } => {
            // the first user always administers the company
            let role = if directory.users().is_empty() {
                UserRole::Admin
            } else {
                role.parse()?
            };
            require_admin(ctx, &directory)?;

            let password = read_new_password(&format!("New password for {}: ", username))?;
            let user = directory.add_user(&username, password, role)?;
            println!("Added user {} ({}) to {}", user.username, user.role, tenant.display_name);
        }

        UserCommands::List => {
            ctx.authenticate(&directory)?;
            print!("{}", format_user_list(directory.users()));
        }

        UserCommands::Remove { username } => {
            require_admin(ctx, &directory)?;
            let removed = directory.remove_user(&username)?;
            println!("Removed user {}", removed.username);
        }
    }

    Ok(())
}
