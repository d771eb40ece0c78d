//! Digit-count limits shared by the recipe and order paths.
//!
//! The limits are expressed as "number of digits in the integer part": a
//! base yield of 12345 (5 digits) passes, 123456 (6 digits) is rejected.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::error::{ComputeError, Result};

/// Maximum digits allowed for a recipe's base yield.
pub const MAX_BASE_YIELD_DIGITS: u32 = 5;
/// Maximum digits allowed for an ingredient's gram quantity.
pub const MAX_GRAMS_DIGITS: u32 = 7;
/// Maximum digits allowed for an order's quantity.
pub const MAX_QUANTITY_DIGITS: u32 = 5;
/// Maximum length for an order's customer name.
pub const MAX_CUSTOMER_NAME_LEN: usize = 15;

/// Number of digits in the integer part of `n` (sign ignored; 0 counts as 1).
pub fn digit_count(n: i64) -> u32 {
    match n.unsigned_abs().checked_ilog10() {
        Some(log) => log + 1,
        None => 1,
    }
}

/// Digit count of the truncated integer part of a decimal quantity.
pub fn decimal_digit_count(d: Decimal) -> u32 {
    digit_count(d.trunc().abs().to_i64().unwrap_or(i64::MAX))
}

/// Reject `value` when its digit count exceeds `max_digits`.
pub fn ensure_digits(field: &str, value: i64, max_digits: u32) -> Result<()> {
    if digit_count(value) > max_digits {
        return Err(ComputeError::Validation(format!(
            "{field} exceeds {max_digits} digits"
        )));
    }
    Ok(())
}

/// Decimal variant of [`ensure_digits`].
pub fn ensure_decimal_digits(field: &str, value: Decimal, max_digits: u32) -> Result<()> {
    if decimal_digit_count(value) > max_digits {
        return Err(ComputeError::Validation(format!(
            "{field} exceeds {max_digits} digits"
        )));
    }
    Ok(())
}
