//! Percentage rates for withheld tax and commission
//!
//! Rates are held as basis points (hundredths of a percent) so that applying
//! them to a `Money` amount is pure integer arithmetic. A `Percentage` can only
//! be built inside the 0-100% range; out-of-range rates are rejected, never
//! clamped.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

use super::money::Money;
use crate::error::{LedgerError, LedgerResult};

const MAX_BASIS_POINTS: u32 = 10_000;

/// A rate between 0% and 100%, stored in basis points
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
#[serde(transparent)]
pub struct Percentage(u32);

impl Percentage {
    pub const ZERO: Percentage = Percentage(0);

    /// Build a rate from basis points (600 = 6%)
    pub fn from_basis_points(bp: u32) -> LedgerResult<Self> {
        if bp > MAX_BASIS_POINTS {
            return Err(LedgerError::InvalidInput(format!(
                "rate {}.{:02}% is outside 0-100%",
                bp / 100,
                bp % 100
            )));
        }
        Ok(Self(bp))
    }

    /// Build a rate from a percent value such as `6.5`
    pub fn from_percent(pct: f64) -> LedgerResult<Self> {
        if !pct.is_finite() || !(0.0..=100.0).contains(&pct) {
            return Err(LedgerError::InvalidInput(format!(
                "rate {}% is outside 0-100%",
                pct
            )));
        }
        Self::from_basis_points((pct * 100.0).round() as u32)
    }

    /// Parse "6", "6.5", "6,5" or "6%"
    pub fn parse(s: &str) -> LedgerResult<Self> {
        let cleaned = s.trim().trim_end_matches('%').trim().replace(',', ".");
        let pct: f64 = cleaned
            .parse()
            .map_err(|_| LedgerError::InvalidInput(format!("invalid rate: {}", s)))?;
        Self::from_percent(pct)
    }

    pub const fn basis_points(&self) -> u32 {
        self.0
    }

    pub fn as_percent(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Apply this rate to an amount, rounding half away from zero to the cent
    pub fn apply(&self, base: Money) -> Money {
        let numerator = base.cents() as i128 * self.0 as i128;
        let denominator = MAX_BASIS_POINTS as i128;
        let half = denominator / 2;
        let rounded = if numerator >= 0 {
            (numerator + half) / denominator
        } else {
            (numerator - half) / denominator
        };
        // |base * rate| <= |base|, so the result always fits back into i64
        Money::from_cents(rounded as i64)
    }
}

impl fmt::Display for Percentage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 % 100 == 0 {
            write!(f, "{}%", self.0 / 100)
        } else {
            write!(f, "{}.{:02}%", self.0 / 100, self.0 % 100)
        }
    }
}

impl<'de> Deserialize<'de> for Percentage {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let bp = u32::deserialize(deserializer)?;
        Percentage::from_basis_points(bp).map_err(serde::de::Error::custom)
    }
}

/// Tenant-wide default rates
///
/// A project's own rates, when set, override these field by field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RateSettings {
    #[serde(default)]
    pub tax_rate: Percentage,
    #[serde(default)]
    pub commission_rate: Percentage,
}

impl RateSettings {
    pub fn new(tax_rate: Percentage, commission_rate: Percentage) -> Self {
        Self {
            tax_rate,
            commission_rate,
        }
    }

    /// Rates in force for a project given its optional overrides
    pub fn with_overrides(
        &self,
        tax_rate: Option<Percentage>,
        commission_rate: Option<Percentage>,
    ) -> Self {
        Self {
            tax_rate: tax_rate.unwrap_or(self.tax_rate),
            commission_rate: commission_rate.unwrap_or(self.commission_rate),
        }
    }
}
