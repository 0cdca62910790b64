//! User settings for siteledger
//!
//! Display preferences, the company used when `--company` is omitted, the
//! default rates new tenants start with, the active forecast rule and the
//! external collaborator commands.

use serde::{Deserialize, Serialize};

use super::paths::LedgerPaths;
use crate::error::LedgerError;
use crate::models::RateSettings;
use crate::services::ForecastRuleKind;

/// User settings for siteledger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Currency symbol used when printing amounts
    #[serde(default = "default_currency")]
    pub currency_symbol: String,

    /// Date format preference (strftime format)
    #[serde(default = "default_date_format")]
    pub date_format: String,

    /// Company opened when no `--company` flag is given
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_company: Option<String>,

    /// Rates a tenant uses until it sets its own
    #[serde(default)]
    pub default_rates: RateSettings,

    /// How projected tax and commission are computed
    #[serde(default)]
    pub forecast_rule: ForecastRuleKind,

    /// Program used for document and receipt extraction
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extractor_command: Option<String>,

    /// Program used for the financial narrative
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub narrator_command: Option<String>,

    /// Seconds to wait for a collaborator program
    #[serde(default = "default_collaborator_timeout")]
    pub collaborator_timeout_secs: u64,
}

fn default_schema_version() -> u32 {
    1
}

fn default_currency() -> String {
    "R$".to_string()
}

fn default_date_format() -> String {
    "%Y-%m-%d".to_string()
}

fn default_collaborator_timeout() -> u64 {
    120
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            currency_symbol: default_currency(),
            date_format: default_date_format(),
            default_company: None,
            default_rates: RateSettings::default(),
            forecast_rule: ForecastRuleKind::default(),
            extractor_command: None,
            narrator_command: None,
            collaborator_timeout_secs: default_collaborator_timeout(),
        }
    }
}

impl Settings {
    /// Load settings from disk, or create default settings if file doesn't exist
    pub fn load_or_create(paths: &LedgerPaths) -> Result<Self, LedgerError> {
        let settings_path = paths.settings_file();

        if settings_path.exists() {
            let contents = std::fs::read_to_string(&settings_path)
                .map_err(|e| LedgerError::Io(format!("Failed to read settings file: {}", e)))?;

            let settings: Settings = serde_json::from_str(&contents).map_err(|e| {
                LedgerError::Config(format!("Failed to parse settings file: {}", e))
            })?;

            Ok(settings)
        } else {
            // Don't save yet - let caller decide when to persist
            Ok(Settings::default())
        }
    }

    /// Save settings to disk
    pub fn save(&self, paths: &LedgerPaths) -> Result<(), LedgerError> {
        paths.ensure_directories()?;

        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| LedgerError::Config(format!("Failed to serialize settings: {}", e)))?;

        std::fs::write(paths.settings_file(), contents)
            .map_err(|e| LedgerError::Io(format!("Failed to write settings file: {}", e)))?;

        Ok(())
    }
}
