//! Income milestone model
//!
//! An income entry is a measurement payment on the contract. The same struct
//! is used for planned milestones and realized receipts; which one it is
//! depends solely on the project collection holding it.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::EntryId;
use super::money::Money;

/// A planned or realized income milestone
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncomeEntry {
    pub id: EntryId,
    pub description: String,
    pub amount: Money,
    /// Expected date while planned, receipt date once realized
    pub date: NaiveDate,
    pub recorded_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recorded_by: Option<String>,
}

/// Caller-supplied fields for a new income entry
#[derive(Debug, Clone)]
pub struct NewIncomeEntry {
    pub description: String,
    pub amount: Money,
    pub date: NaiveDate,
    pub recorded_by: Option<String>,
}

impl NewIncomeEntry {
    pub fn new(description: impl Into<String>, amount: Money, date: NaiveDate) -> Self {
        Self {
            description: description.into(),
            amount,
            date,
            recorded_by: None,
        }
    }

    pub fn recorded_by(mut self, user: impl Into<String>) -> Self {
        self.recorded_by = Some(user.into());
        self
    }
}

impl IncomeEntry {
    /// Materialize a draft with a fresh id and recorded-at timestamp
    pub fn from_draft(draft: NewIncomeEntry) -> Self {
        Self {
            id: EntryId::new(),
            description: draft.description.trim().to_string(),
            amount: draft.amount,
            date: draft.date,
            recorded_at: Utc::now(),
            recorded_by: draft.recorded_by,
        }
    }

    /// The realized form of a planned milestone: same id, description and
    /// amount, dated on receipt, with a new recorded-at timestamp
    pub fn realized_on(self, received: NaiveDate) -> Self {
        Self {
            date: received,
            recorded_at: Utc::now(),
            ..self
        }
    }
}

impl fmt::Display for IncomeEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}",
            self.date.format("%Y-%m-%d"),
            self.description,
            self.amount
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_realized_on_keeps_identity() {
        let planned = IncomeEntry::from_draft(NewIncomeEntry::new(
            "Nov measurement",
            Money::from_units(1000),
            NaiveDate::from_ymd_opt(2025, 11, 30).unwrap(),
        ));
        let id = planned.id;
        let before = planned.recorded_at;

        let received = NaiveDate::from_ymd_opt(2025, 12, 1).unwrap();
        let realized = planned.realized_on(received);

        assert_eq!(realized.id, id);
        assert_eq!(realized.amount, Money::from_units(1000));
        assert_eq!(realized.description, "Nov measurement");
        assert_eq!(realized.date, received);
        assert!(realized.recorded_at >= before);
    }

    #[test]
    fn test_serialization_skips_missing_recorder() {
        let entry = IncomeEntry::from_draft(NewIncomeEntry::new(
            "Advance",
            Money::from_units(5),
            NaiveDate::from_ymd_opt(2025, 1, 2).unwrap(),
        ));
        let json = serde_json::to_string(&entry).unwrap();
        assert!(!json.contains("recorded_by"));

        let back: IncomeEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(back, entry);
    }
}
