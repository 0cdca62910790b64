//! Shared state for CLI command handlers
//!
//! Resolves which company a command runs against, checks the user's
//! credentials when the company has users, and wires the audit log into
//! every ledger it opens.

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use tracing::debug;
use zeroize::Zeroizing;

use crate::audit::AuditLogger;
use crate::collab::{CommandCollaborator, UserDirectory};
use crate::config::{LedgerPaths, Settings};
use crate::error::{LedgerError, LedgerResult};
use crate::models::{Money, Percentage, Tenant};
use crate::services::{Ledger, TenantService};
use crate::storage::{FileStore, KeyValueStore};

/// Non-interactive password source for scripts
pub const PASSWORD_ENV: &str = "SITELEDGER_PASSWORD";

/// Non-interactive source for the password of a user being added
pub const NEW_PASSWORD_ENV: &str = "SITELEDGER_NEW_PASSWORD";

pub struct CliContext {
    pub paths: LedgerPaths,
    pub settings: Settings,
    store: Arc<FileStore>,
    company: Option<String>,
    user: Option<String>,
}

impl CliContext {
    pub fn new(
        paths: LedgerPaths,
        settings: Settings,
        company: Option<String>,
        user: Option<String>,
    ) -> Self {
        let store = Arc::new(FileStore::new(paths.data_dir()));
        Self {
            paths,
            settings,
            store,
            company,
            user,
        }
    }

    pub fn store(&self) -> &dyn KeyValueStore {
        self.store.as_ref()
    }

    pub fn tenants(&self) -> TenantService {
        TenantService::new(self.store.clone())
    }

    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }

    pub fn symbol(&self) -> &str {
        &self.settings.currency_symbol
    }

    /// Company named by `--company`, else the configured default
    pub fn company_name(&self) -> LedgerResult<&str> {
        self.company
            .as_deref()
            .or(self.settings.default_company.as_deref())
            .ok_or_else(|| {
                LedgerError::InvalidInput(
                    "no company selected; pass --company or run 'siteledger tenant use <name>'"
                        .into(),
                )
            })
    }

    pub fn tenant(&self) -> LedgerResult<Tenant> {
        self.tenants().resolve(self.company_name()?)
    }

    /// Check the `--user` credentials against the tenant's directory.
    ///
    /// A company without users is open; once it has users every command needs
    /// a valid `--user` and password.
    pub fn authenticate(&self, directory: &UserDirectory<'_>) -> LedgerResult<()> {
        if directory.users().is_empty() {
            return Ok(());
        }

        let username = self.user.as_deref().ok_or_else(|| {
            LedgerError::InvalidInput("this company requires --user".into())
        })?;
        let password = read_password(&format!("Password for {}: ", username))?;
        directory.authenticate(username, &password)?;
        debug!(username, "user authenticated");
        Ok(())
    }

    /// Open the selected company's ledger with the audit log attached
    pub fn open_ledger(&self) -> LedgerResult<Ledger> {
        let tenant = self.tenant()?;
        let directory = UserDirectory::load(self.store(), tenant.key.clone())?;
        self.authenticate(&directory)?;

        let mut ledger = self.tenants().open_ledger(
            &tenant.display_name,
            self.settings.default_rates,
            self.settings.forecast_rule,
        )?;
        ledger.set_actor(self.user.clone());
        ledger.subscribe(Box::new(AuditLogger::new(self.paths.audit_log())));
        Ok(ledger)
    }

    fn collaborator(&self, command: Option<&String>, setting: &str) -> LedgerResult<CommandCollaborator> {
        command
            .and_then(|c| CommandCollaborator::from_command_line(c))
            .map(|c| c.with_timeout(Duration::from_secs(self.settings.collaborator_timeout_secs)))
            .ok_or_else(|| {
                LedgerError::Config(format!("no {} configured in {}", setting, self.paths.settings_file().display()))
            })
    }

    pub fn extractor(&self) -> LedgerResult<CommandCollaborator> {
        self.collaborator(self.settings.extractor_command.as_ref(), "extractor_command")
    }

    pub fn narrator(&self) -> LedgerResult<CommandCollaborator> {
        self.collaborator(self.settings.narrator_command.as_ref(), "narrator_command")
    }

    pub fn runtime(&self) -> LedgerResult<tokio::runtime::Runtime> {
        tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()
            .map_err(|e| LedgerError::CollaboratorFailure(format!("failed to start runtime: {}", e)))
    }
}

fn password_from(env: &str, prompt: &str) -> LedgerResult<Zeroizing<String>> {
    if let Ok(password) = std::env::var(env) {
        return Ok(Zeroizing::new(password));
    }
    rpassword::prompt_password(prompt)
        .map(Zeroizing::new)
        .map_err(|e| LedgerError::Io(format!("Failed to read password: {}", e)))
}

/// Password from `SITELEDGER_PASSWORD`, else an interactive prompt
pub fn read_password(prompt: &str) -> LedgerResult<Zeroizing<String>> {
    password_from(PASSWORD_ENV, prompt)
}

/// Password for a new user from `SITELEDGER_NEW_PASSWORD`, else a prompt
pub fn read_new_password(prompt: &str) -> LedgerResult<Zeroizing<String>> {
    password_from(NEW_PASSWORD_ENV, prompt)
}

pub fn parse_money(s: &str) -> LedgerResult<Money> {
    Money::parse(s).map_err(|e| LedgerError::InvalidInput(format!("{} (use e.g. 1500.00)", e)))
}

pub fn parse_rate(s: &str) -> LedgerResult<Percentage> {
    Percentage::parse(s)
}

/// Accepts `YYYY-MM-DD` and `DD/MM/YYYY`
pub fn parse_date(s: &str) -> LedgerResult<NaiveDate> {
    let s = s.trim();
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(s, "%d/%m/%Y"))
        .map_err(|_| {
            LedgerError::InvalidInput(format!("invalid date '{}': use YYYY-MM-DD", s))
        })
}

pub fn parse_date_or_today(s: Option<&str>) -> LedgerResult<NaiveDate> {
    match s {
        Some(s) => parse_date(s),
        None => Ok(today()),
    }
}

pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// Guess a MIME type from the file extension when none is given
pub fn guess_mime(path: &std::path::Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("pdf") => "application/pdf",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("webp") => "image/webp",
        Some("txt") => "text/plain",
        _ => "application/octet-stream",
    }
}
