//! Withheld tax and commission calculator
//!
//! Commission is always computed on the amount left after tax is withheld,
//! never on the gross base. All functions are pure.

use serde::Serialize;

use crate::models::{Money, Percentage, RateSettings};

/// Tax withheld from `base`
pub fn compute_withholding(base: Money, tax_rate: Percentage) -> Money {
    tax_rate.apply(base)
}

/// Commission owed on `base` net of withheld tax
pub fn compute_commission(base: Money, tax_rate: Percentage, commission_rate: Percentage) -> Money {
    let tax = compute_withholding(base, tax_rate);
    commission_rate.apply(base - tax)
}

/// All figures for one base amount
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TaxBreakdown {
    pub base: Money,
    pub tax: Money,
    pub commission: Money,
    /// What remains after both deductions
    pub net: Money,
}

pub fn compute_breakdown(base: Money, rates: RateSettings) -> TaxBreakdown {
    let tax = compute_withholding(base, rates.tax_rate);
    let commission = compute_commission(base, rates.tax_rate, rates.commission_rate);
    TaxBreakdown {
        base,
        tax,
        commission,
        net: base - tax - commission,
    }
}
