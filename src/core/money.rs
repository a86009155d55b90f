//! Fixed two-decimal rendering of amounts, quantities and rates.
//!
//! Every numeric field of a FatturaPA document goes through [`format_amount`];
//! the SDI checks reject any value not matching `-?\d+\.\d{2}`.

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use super::error::FormattingError;

/// Widest integer part the schema accepts for any amount field (`[0-9]{1,13}`).
pub const MAX_INTEGER_DIGITS: usize = 13;

/// Round to two decimal places, half away from zero.
pub fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Render `amount` with exactly two fractional digits.
///
/// Rounds half away from zero on the decimal value itself, so `0.005`
/// becomes `"0.01"` and `-2.345` becomes `"-2.35"`. A result that rounds to
/// zero is always rendered unsigned.
pub fn format_amount(amount: Decimal) -> Result<String, FormattingError> {
    let mut rounded = round2(amount);
    if rounded.is_zero() {
        rounded = Decimal::ZERO;
    }
    rounded.rescale(2);
    let s = rounded.to_string();

    let digits = s.trim_start_matches('-').split('.').next().unwrap_or("");
    if digits.len() > MAX_INTEGER_DIGITS {
        return Err(FormattingError {
            value: s,
            reason: format!("more than {MAX_INTEGER_DIGITS} integer digits"),
        });
    }
    Ok(s)
}

/// Convert a binary float coming from storage into a decimal.
///
/// NaN and infinities cannot be represented and are rejected.
pub fn decimal_from_f64(value: f64) -> Result<Decimal, FormattingError> {
    if !value.is_finite() {
        return Err(FormattingError {
            value: value.to_string(),
            reason: "value is not a finite number".into(),
        });
    }
    Decimal::from_f64(value).ok_or_else(|| FormattingError {
        value: value.to_string(),
        reason: "value is out of decimal range".into(),
    })
}

/// Format a binary float directly, rejecting non-finite input.
pub fn format_f64(value: f64) -> Result<String, FormattingError> {
    format_amount(decimal_from_f64(value)?)
}
