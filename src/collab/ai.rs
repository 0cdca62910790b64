//! AI collaborators
//!
//! Document extraction and financial narrative are opaque services that may
//! return best-effort data or nothing at all. This module defines the traits
//! the rest of the crate talks to, plus the lenient parsing that turns a raw
//! model reply into typed, validated drafts.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::models::{CostCategory, Money};
use crate::services::aggregation::NarrativeInput;

/// Project terms and entries read out of a contract or measurement document
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedProject {
    pub name: String,
    pub client: String,
    pub budget: Money,
    pub start_date: Option<NaiveDate>,
    pub expenses: Vec<ExtractedExpense>,
    pub revenues: Vec<ExtractedIncome>,
    pub planned_revenues: Vec<ExtractedIncome>,
}

/// One expense read out of a document or receipt
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedExpense {
    pub description: String,
    pub amount: Money,
    pub date: Option<NaiveDate>,
    pub category: CostCategory,
    pub invoice_number: Option<String>,
}

/// One income line read out of a document
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedIncome {
    pub description: String,
    pub amount: Money,
    pub date: Option<NaiveDate>,
}

/// Reads structured data out of uploaded documents
#[async_trait]
pub trait DocumentExtractor: Send + Sync {
    async fn extract_project_from_document(
        &self,
        bytes: &[u8],
        mime_type: &str,
    ) -> Option<ExtractedProject>;

    async fn extract_expense_from_receipt(
        &self,
        bytes: &[u8],
        mime_type: &str,
    ) -> Option<ExtractedExpense>;
}

/// Writes a prose analysis of the portfolio
#[async_trait]
pub trait FinancialNarrator: Send + Sync {
    async fn summarize_financials(&self, input: &NarrativeInput) -> Result<String, String>;
}

/// Ask the narrator for an analysis, always producing something printable
pub async fn narrate(narrator: &dyn FinancialNarrator, input: &NarrativeInput) -> String {
    if input.is_empty() {
        return "No projects to analyze yet.".to_string();
    }

    match narrator.summarize_financials(input).await {
        Ok(text) if !text.trim().is_empty() => text,
        Ok(_) => "The financial analysis could not be generated right now.".to_string(),
        Err(e) => {
            warn!(error = %e, "narrative collaborator failed");
            "The financial analyst is temporarily unavailable. Check the connection and try again."
                .to_string()
        }
    }
}

/// Remove markdown code fences (```` ``` ```` and ```` ```json ````) from a reply
pub fn strip_code_fences(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(pos) = rest.find("```") {
        out.push_str(&rest[..pos]);
        rest = &rest[pos + 3..];
        if rest.len() >= 4 && rest.is_char_boundary(4) && rest[..4].eq_ignore_ascii_case("json") {
            rest = &rest[4..];
        }
    }
    out.push_str(rest);
    out.trim().to_string()
}

/// Strip fences and deserialize, returning `None` for anything unparseable
pub fn parse_extraction_payload<T: DeserializeOwned>(text: &str) -> Option<T> {
    let cleaned = strip_code_fences(text);
    match serde_json::from_str(&cleaned) {
        Ok(value) => Some(value),
        Err(e) => {
            debug!(error = %e, "extraction payload is not valid JSON");
            None
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawProject {
    #[serde(default)]
    name: String,
    #[serde(default)]
    client: String,
    #[serde(default)]
    budget: Value,
    #[serde(default)]
    start_date: Option<String>,
    #[serde(default)]
    expenses: Vec<RawExpense>,
    #[serde(default)]
    revenues: Vec<RawIncome>,
    #[serde(default)]
    planned_revenues: Vec<RawIncome>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawExpense {
    #[serde(default)]
    description: String,
    #[serde(default)]
    amount: Value,
    #[serde(default)]
    date: Option<String>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    invoice_number: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawIncome {
    #[serde(default)]
    description: String,
    #[serde(default)]
    amount: Value,
    #[serde(default)]
    date: Option<String>,
}

/// Accepts a JSON number (currency units) or a string such as "R$ 1.500,00"
fn lenient_amount(value: &Value) -> Option<Money> {
    let money = match value {
        Value::Number(n) => {
            let units = n.as_f64()?;
            if !units.is_finite() {
                return None;
            }
            Money::from_cents((units * 100.0).round() as i64)
        }
        Value::String(s) if s.contains(',') => Money::parse(&s.replace('.', "").replace(',', "."))
            .or_else(|_| Money::parse(&s.replace(',', "")))
            .ok()?,
        Value::String(s) => Money::parse(s).ok()?,
        _ => return None,
    };
    (!money.is_negative() && money <= Money::MAX).then_some(money)
}

fn lenient_date(value: Option<&str>) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value?.trim(), "%Y-%m-%d").ok()
}

impl RawExpense {
    fn into_expense(self) -> Option<ExtractedExpense> {
        let description = self.description.trim().to_string();
        let Some(amount) = lenient_amount(&self.amount) else {
            warn!(description = %description, "dropping extracted expense without a usable amount");
            return None;
        };
        if description.is_empty() {
            return None;
        }
        // Categories the model invents map to Other rather than losing the row
        let category = self
            .category
            .as_deref()
            .and_then(CostCategory::parse)
            .unwrap_or(CostCategory::Other);

        Some(ExtractedExpense {
            description,
            amount,
            date: lenient_date(self.date.as_deref()),
            category,
            invoice_number: self.invoice_number.filter(|n| !n.trim().is_empty()),
        })
    }
}

impl RawIncome {
    fn into_income(self) -> Option<ExtractedIncome> {
        let description = self.description.trim().to_string();
        let amount = lenient_amount(&self.amount)?;
        if description.is_empty() {
            return None;
        }
        Some(ExtractedIncome {
            description,
            amount,
            date: lenient_date(self.date.as_deref()),
        })
    }
}

/// Parse a document-extraction reply into a project draft
pub fn parse_project_payload(text: &str) -> Option<ExtractedProject> {
    let raw: RawProject = parse_extraction_payload(text)?;

    Some(ExtractedProject {
        name: raw.name.trim().to_string(),
        client: raw.client.trim().to_string(),
        budget: lenient_amount(&raw.budget).unwrap_or_default(),
        start_date: lenient_date(raw.start_date.as_deref()),
        expenses: raw
            .expenses
            .into_iter()
            .filter_map(RawExpense::into_expense)
            .collect(),
        revenues: raw
            .revenues
            .into_iter()
            .filter_map(RawIncome::into_income)
            .collect(),
        planned_revenues: raw
            .planned_revenues
            .into_iter()
            .filter_map(RawIncome::into_income)
            .collect(),
    })
}

/// Parse a receipt-extraction reply into an expense draft
pub fn parse_expense_payload(text: &str) -> Option<ExtractedExpense> {
    let raw: RawExpense = parse_extraction_payload(text)?;
    raw.into_expense()
}
