//! Overflow-checked decimal arithmetic.
//!
//! `Decimal` operators panic when a result leaves the representable range.
//! Rates, salaries and bonuses arrive from employee records and requests, so
//! the calculation functions use these helpers and report an out-of-range
//! amount as a validation error.

use rust_decimal::Decimal;

use crate::error::{EngineError, EngineResult};

fn out_of_range(a: Decimal, op: &str, b: Decimal) -> EngineError {
    EngineError::validation(format!("Amount out of range: {a} {op} {b}"))
}

/// `a * b`, or a validation error on overflow.
pub fn checked_mul(a: Decimal, b: Decimal) -> EngineResult<Decimal> {
    a.checked_mul(b).ok_or_else(|| out_of_range(a, "*", b))
}

/// `a / b`, or a validation error on overflow or a zero divisor.
pub fn checked_div(a: Decimal, b: Decimal) -> EngineResult<Decimal> {
    a.checked_div(b).ok_or_else(|| out_of_range(a, "/", b))
}

/// `a + b`, or a validation error on overflow.
pub fn checked_add(a: Decimal, b: Decimal) -> EngineResult<Decimal> {
    a.checked_add(b).ok_or_else(|| out_of_range(a, "+", b))
}

/// `a - b`, or a validation error on overflow.
pub fn checked_sub(a: Decimal, b: Decimal) -> EngineResult<Decimal> {
    a.checked_sub(b).ok_or_else(|| out_of_range(a, "-", b))
}

/// Sum of all values, or a validation error on overflow.
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::checked_sum;
/// use rust_decimal::Decimal;
///
/// assert_eq!(checked_sum([Decimal::ONE, Decimal::TWO]).unwrap(), Decimal::from(3));
/// assert!(checked_sum([Decimal::MAX, Decimal::ONE]).is_err());
/// ```
pub fn checked_sum(values: impl IntoIterator<Item = Decimal>) -> EngineResult<Decimal> {
    values.into_iter().try_fold(Decimal::ZERO, checked_add)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_in_range_results_match_operators() {
        assert_eq!(checked_mul(dec("20"), dec("1.5")).unwrap(), dec("30"));
        assert_eq!(checked_div(dec("52000"), dec("26")).unwrap(), dec("2000"));
        assert_eq!(checked_add(dec("0.1"), dec("0.2")).unwrap(), dec("0.3"));
        assert_eq!(checked_sub(dec("10"), dec("12.5")).unwrap(), dec("-2.5"));
    }

    #[test]
    fn test_overflow_is_validation_error() {
        let err = checked_mul(Decimal::MAX, dec("2")).unwrap_err();
        assert!(matches!(err, EngineError::Validation { .. }));
        assert!(err.to_string().contains("out of range"));

        assert!(checked_add(Decimal::MAX, Decimal::ONE).is_err());
        assert!(checked_sub(Decimal::MIN, Decimal::ONE).is_err());
    }

    #[test]
    fn test_divide_by_zero_is_validation_error() {
        let err = checked_div(Decimal::ONE, Decimal::ZERO).unwrap_err();
        assert!(matches!(err, EngineError::Validation { .. }));
    }

    #[test]
    fn test_sum_of_empty_is_zero() {
        assert_eq!(checked_sum(Vec::<Decimal>::new()).unwrap(), Decimal::ZERO);
    }
}
