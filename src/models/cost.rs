//! Cost entry model
//!
//! A cost is money spent on a project, tagged with one of a closed set of
//! categories so the aggregation engine can build a per-category histogram.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::ids::EntryId;
use super::money::Money;
use crate::error::LedgerError;

/// Closed set of cost categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CostCategory {
    Material,
    Labor,
    Logistics,
    Equipment,
    Taxes,
    SubcontractedServices,
    Commission,
    Other,
}

impl CostCategory {
    /// Every category, in display order
    pub const ALL: [CostCategory; 8] = [
        Self::Material,
        Self::Labor,
        Self::Logistics,
        Self::Equipment,
        Self::Taxes,
        Self::SubcontractedServices,
        Self::Commission,
        Self::Other,
    ];

    /// Parse a category label.
    ///
    /// Accepts the English names (any case, spaces/underscores/dashes
    /// interchangeable) and the Portuguese labels used by imported documents.
    pub fn parse(s: &str) -> Option<Self> {
        let key: String = s
            .trim()
            .to_lowercase()
            .chars()
            .map(|c| if c == ' ' || c == '-' { '_' } else { c })
            .collect();

        match key.as_str() {
            "material" | "materials" => Some(Self::Material),
            "labor" | "labour" | "mão_de_obra" | "mao_de_obra" => Some(Self::Labor),
            "logistics" | "logística" | "logistica" => Some(Self::Logistics),
            "equipment" | "equipamentos" => Some(Self::Equipment),
            "taxes" | "tax" | "impostos" => Some(Self::Taxes),
            "subcontracted_services" | "subcontracted" | "serviços_terceiros"
            | "servicos_terceiros" => Some(Self::SubcontractedServices),
            "commission" | "comissão" | "comissao" => Some(Self::Commission),
            "other" | "outros" => Some(Self::Other),
            _ => None,
        }
    }
}

impl FromStr for CostCategory {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
            .ok_or_else(|| LedgerError::InvalidInput(format!("unknown cost category: {}", s)))
    }
}

impl fmt::Display for CostCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Material => write!(f, "Material"),
            Self::Labor => write!(f, "Labor"),
            Self::Logistics => write!(f, "Logistics"),
            Self::Equipment => write!(f, "Equipment"),
            Self::Taxes => write!(f, "Taxes"),
            Self::SubcontractedServices => write!(f, "Subcontracted Services"),
            Self::Commission => write!(f, "Commission"),
            Self::Other => write!(f, "Other"),
        }
    }
}

/// Reference to a stored receipt or invoice scan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub name: String,
    pub mime_type: String,
    /// Opaque locator understood by whatever stores the file
    pub reference: String,
}

/// A single cost recorded against a project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostEntry {
    pub id: EntryId,
    pub description: String,
    pub amount: Money,
    pub date: NaiveDate,
    pub category: CostCategory,
    pub recorded_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recorded_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invoice_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachment: Option<Attachment>,
}

/// Caller-supplied fields for a new cost entry; the ledger assigns the id
#[derive(Debug, Clone)]
pub struct NewCostEntry {
    pub description: String,
    pub amount: Money,
    pub date: NaiveDate,
    pub category: CostCategory,
    pub recorded_by: Option<String>,
    pub invoice_number: Option<String>,
    pub attachment: Option<Attachment>,
}

impl NewCostEntry {
    pub fn new(
        description: impl Into<String>,
        amount: Money,
        date: NaiveDate,
        category: CostCategory,
    ) -> Self {
        Self {
            description: description.into(),
            amount,
            date,
            category,
            recorded_by: None,
            invoice_number: None,
            attachment: None,
        }
    }

    pub fn recorded_by(mut self, user: impl Into<String>) -> Self {
        self.recorded_by = Some(user.into());
        self
    }

    pub fn invoice_number(mut self, number: impl Into<String>) -> Self {
        self.invoice_number = Some(number.into());
        self
    }
}

impl CostEntry {
    /// Materialize a draft with a fresh id and recorded-at timestamp
    pub fn from_draft(draft: NewCostEntry) -> Self {
        Self {
            id: EntryId::new(),
            description: draft.description.trim().to_string(),
            amount: draft.amount,
            date: draft.date,
            category: draft.category,
            recorded_at: Utc::now(),
            recorded_by: draft.recorded_by,
            invoice_number: draft.invoice_number,
            attachment: draft.attachment,
        }
    }
}

impl fmt::Display for CostEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} [{}] {}",
            self.date.format("%Y-%m-%d"),
            self.description,
            self.category,
            self.amount
        )
    }
}
