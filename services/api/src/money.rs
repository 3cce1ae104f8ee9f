//! Monetary amounts
//!
//! Amounts are stored as integer cents and exposed as decimal numbers with
//! two fractional digits.

use serde::Serializer;

/// Convert a decimal amount to cents, rounding half away from zero
pub fn to_cents(amount: f64) -> Option<i64> {
    if !amount.is_finite() {
        return None;
    }
    let cents = (amount * 100.0).round();
    if cents.abs() > i64::MAX as f64 {
        return None;
    }
    Some(cents as i64)
}

pub fn from_cents(cents: i64) -> f64 {
    cents as f64 / 100.0
}

/// Change to a running total when an amount goes from `old` to `new`
pub fn amount_delta(old: i64, new: i64) -> i64 {
    new - old
}

/// `serialize_with` helper for cent columns
pub fn serialize_cents<S: Serializer>(cents: &i64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(from_cents(*cents))
}
