//! Decimal rounding helpers.
//!
//! Money and derived hours are kept to two decimal places, rounding halves
//! away from zero. Every amount rounded here is non-negative, so this is the
//! conventional round-half-up.

use rust_decimal::{Decimal, RoundingStrategy};

/// Number of decimal places kept for currency and hour values.
pub const MONEY_SCALE: u32 = 2;

/// Rounds a currency amount to cents using round-half-up.
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::round_currency;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// assert_eq!(round_currency(Decimal::from_str("10.005").unwrap()), Decimal::from_str("10.01").unwrap());
/// assert_eq!(round_currency(Decimal::from_str("10.004").unwrap()), Decimal::from_str("10.00").unwrap());
/// ```
pub fn round_currency(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Rounds an hour quantity to hundredths of an hour.
pub fn round_hours(hours: Decimal) -> Decimal {
    hours.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Converts whole minutes into hours rounded to hundredths.
pub fn minutes_to_hours(minutes: i64) -> Decimal {
    round_hours(Decimal::from(minutes) / Decimal::from(60))
}
