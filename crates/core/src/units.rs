//! Decimal scaling between contract integers and human-readable amounts.
//!
//! The contract stores plain integers. Two scales apply on the client side:
//!
//! - `count_decimals` is the fixed-point precision of the value returned by
//!   `get_count`. The loader divides by `10^count_decimals` to obtain the
//!   number of items. It is 0 for the current contract ABI.
//! - `price_decimals` is the precision of the base asset. It is used only to
//!   display prices and to parse prices typed by a user; prices are always
//!   sent to and read from the contract in native units.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Largest supported precision: `10^19` is the largest power of ten in a u64.
pub const MAX_DECIMALS: u32 = 19;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UnitsError {
    #[error("value {raw} is not a whole multiple of 10^{decimals}")]
    NotIntegral { raw: u64, decimals: u32 },

    #[error("invalid amount {input:?}: {reason}")]
    InvalidAmount { input: String, reason: String },

    #[error("precision {0} exceeds the maximum of 19")]
    PrecisionTooLarge(u32),
}

/// Scale configuration agreed with the contract ABI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Units {
    /// Fixed-point precision of the item count.
    #[serde(default)]
    pub count_decimals: u32,
    /// Precision of the base asset.
    #[serde(default = "default_price_decimals")]
    pub price_decimals: u32,
}

fn default_price_decimals() -> u32 {
    9
}

impl Default for Units {
    fn default() -> Self {
        Self {
            count_decimals: 0,
            price_decimals: default_price_decimals(),
        }
    }
}

fn scale(decimals: u32) -> Result<u64, UnitsError> {
    if decimals > MAX_DECIMALS {
        return Err(UnitsError::PrecisionTooLarge(decimals));
    }
    Ok(10u64.pow(decimals))
}

impl Units {
    /// Convert a raw count from the contract to a number of items.
    pub fn normalize_count(&self, raw: u64) -> Result<u64, UnitsError> {
        let s = scale(self.count_decimals)?;
        if raw % s != 0 {
            return Err(UnitsError::NotIntegral {
                raw,
                decimals: self.count_decimals,
            });
        }
        Ok(raw / s)
    }

    /// Render a native price as a decimal string ("1.5", "0.000000015", "2.0").
    pub fn format_price(&self, amount: u64) -> Result<String, UnitsError> {
        format_units(amount, self.price_decimals)
    }

    /// Parse a user-entered decimal price into native units.
    pub fn parse_price(&self, input: &str) -> Result<u64, UnitsError> {
        parse_units(input, self.price_decimals)
    }
}

/// Format a fixed-point integer with `decimals` fractional digits.
///
/// Trailing zeros are trimmed but one fractional digit is always kept.
pub fn format_units(amount: u64, decimals: u32) -> Result<String, UnitsError> {
    let s = scale(decimals)?;
    if decimals == 0 {
        return Ok(amount.to_string());
    }
    let whole = amount / s;
    let frac = amount % s;

    let frac = format!("{:0width$}", frac, width = decimals as usize);
    let trimmed = frac.trim_end_matches('0');
    if trimmed.is_empty() {
        Ok(format!("{}.0", whole))
    } else {
        Ok(format!("{}.{}", whole, trimmed))
    }
}

/// Parse a decimal string into a fixed-point integer with `decimals` digits.
pub fn parse_units(input: &str, decimals: u32) -> Result<u64, UnitsError> {
    let invalid = |reason: &str| UnitsError::InvalidAmount {
        input: input.to_string(),
        reason: reason.to_string(),
    };

    let s = scale(decimals)?;
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(invalid("empty"));
    }

    let (whole, frac) = match trimmed.split_once('.') {
        Some((w, f)) => (w, f),
        None => (trimmed, ""),
    };
    if whole.is_empty() && frac.is_empty() {
        return Err(invalid("no digits"));
    }
    if !whole.chars().all(|c| c.is_ascii_digit()) || !frac.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid("only digits and one '.' are allowed"));
    }
    if frac.len() > decimals as usize {
        return Err(invalid(&format!(
            "at most {} fractional digits are allowed",
            decimals
        )));
    }

    let whole: u64 = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| invalid("too large"))?
    };
    let frac: u64 = if frac.is_empty() {
        0
    } else {
        let padded = format!("{:0<width$}", frac, width = decimals as usize);
        padded.parse().map_err(|_| invalid("too large"))?
    };

    whole
        .checked_mul(s)
        .and_then(|w| w.checked_add(frac))
        .ok_or_else(|| invalid("too large"))
}
