//! Daily hour tiering.
//!
//! This module splits the hours worked in a single day into regular,
//! overtime and double-time buckets using fixed daily thresholds. The
//! thresholds are applied per entry, never to a weekly aggregate.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Default number of regular hours per day.
pub const DEFAULT_REGULAR_HOURS_LIMIT: Decimal = Decimal::from_parts(8, 0, 0, false, 0);

/// Default number of worked hours per day after which double time starts.
pub const DEFAULT_OVERTIME_HOURS_LIMIT: Decimal = Decimal::from_parts(12, 0, 0, false, 0);

/// Worked hours split into pay tiers.
///
/// The three buckets always sum to the worked hours they were derived from.
///
/// # Example
///
/// ```
/// use payroll_engine::calculation::HourTiers;
/// use rust_decimal::Decimal;
///
/// let tiers = HourTiers {
///     regular_hours: Decimal::from(8),
///     overtime_hours: Decimal::from(2),
///     double_time_hours: Decimal::ZERO,
/// };
/// assert_eq!(tiers.total_hours(), Decimal::from(10));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HourTiers {
    /// Hours paid at the regular rate.
    pub regular_hours: Decimal,
    /// Hours paid at the overtime multiplier.
    pub overtime_hours: Decimal,
    /// Hours paid at the double-time multiplier.
    pub double_time_hours: Decimal,
}

impl HourTiers {
    /// Returns the sum of all three tiers.
    pub fn total_hours(&self) -> Decimal {
        self.regular_hours + self.overtime_hours + self.double_time_hours
    }
}

/// Splits one day's worked hours into regular, overtime and double-time tiers.
///
/// Negative input is treated as zero.
///
/// # Arguments
///
/// * `worked_hours` - Hours worked in the day, net of breaks
/// * `regular_limit` - Hours paid as regular time (typically 8)
/// * `overtime_limit` - Hours after which double time starts (typically 12)
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::{
///     tier_daily_hours, DEFAULT_OVERTIME_HOURS_LIMIT, DEFAULT_REGULAR_HOURS_LIMIT,
/// };
/// use rust_decimal::Decimal;
///
/// let tiers = tier_daily_hours(
///     Decimal::from(13),
///     DEFAULT_REGULAR_HOURS_LIMIT,
///     DEFAULT_OVERTIME_HOURS_LIMIT,
/// );
///
/// assert_eq!(tiers.regular_hours, Decimal::from(8));
/// assert_eq!(tiers.overtime_hours, Decimal::from(4));
/// assert_eq!(tiers.double_time_hours, Decimal::from(1));
/// ```
pub fn tier_daily_hours(
    worked_hours: Decimal,
    regular_limit: Decimal,
    overtime_limit: Decimal,
) -> HourTiers {
    let worked = worked_hours.max(Decimal::ZERO);

    if worked <= regular_limit {
        HourTiers {
            regular_hours: worked,
            overtime_hours: Decimal::ZERO,
            double_time_hours: Decimal::ZERO,
        }
    } else if worked <= overtime_limit {
        HourTiers {
            regular_hours: regular_limit,
            overtime_hours: worked - regular_limit,
            double_time_hours: Decimal::ZERO,
        }
    } else {
        HourTiers {
            regular_hours: regular_limit,
            overtime_hours: overtime_limit - regular_limit,
            double_time_hours: worked - overtime_limit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn tier(worked: &str) -> HourTiers {
        tier_daily_hours(
            dec(worked),
            DEFAULT_REGULAR_HOURS_LIMIT,
            DEFAULT_OVERTIME_HOURS_LIMIT,
        )
    }

    #[test]
    fn test_under_regular_limit() {
        let tiers = tier("7.0");
        assert_eq!(tiers.regular_hours, dec("7.0"));
        assert_eq!(tiers.overtime_hours, Decimal::ZERO);
        assert_eq!(tiers.double_time_hours, Decimal::ZERO);
    }

    #[test]
    fn test_exactly_regular_limit() {
        let tiers = tier("8.0");
        assert_eq!(tiers.regular_hours, dec("8.0"));
        assert_eq!(tiers.overtime_hours, Decimal::ZERO);
    }

    #[test]
    fn test_overtime_band() {
        let tiers = tier("10.0");
        assert_eq!(tiers.regular_hours, dec("8"));
        assert_eq!(tiers.overtime_hours, dec("2.0"));
        assert_eq!(tiers.double_time_hours, Decimal::ZERO);
    }

    #[test]
    fn test_exactly_overtime_limit() {
        let tiers = tier("12.0");
        assert_eq!(tiers.regular_hours, dec("8"));
        assert_eq!(tiers.overtime_hours, dec("4"));
        assert_eq!(tiers.double_time_hours, Decimal::ZERO);
    }

    #[test]
    fn test_double_time_band() {
        let tiers = tier("13.0");
        assert_eq!(tiers.regular_hours, dec("8"));
        assert_eq!(tiers.overtime_hours, dec("4"));
        assert_eq!(tiers.double_time_hours, dec("1.0"));
    }

    #[test]
    fn test_negative_hours_clamped_to_zero() {
        let tiers = tier("-1.5");
        assert_eq!(tiers, HourTiers::default());
    }

    #[test]
    fn test_custom_thresholds() {
        let tiers = tier_daily_hours(dec("11"), dec("7.6"), dec("10"));
        assert_eq!(tiers.regular_hours, dec("7.6"));
        assert_eq!(tiers.overtime_hours, dec("2.4"));
        assert_eq!(tiers.double_time_hours, dec("1"));
    }

    proptest! {
        #[test]
        fn prop_tiers_sum_to_worked_hours(hundredths in 0i64..2_400_00) {
            let worked = Decimal::new(hundredths, 2);
            let tiers = tier_daily_hours(
                worked,
                DEFAULT_REGULAR_HOURS_LIMIT,
                DEFAULT_OVERTIME_HOURS_LIMIT,
            );
            prop_assert_eq!(tiers.total_hours(), worked);
            prop_assert!(tiers.regular_hours <= DEFAULT_REGULAR_HOURS_LIMIT);
            prop_assert!(tiers.overtime_hours <= dec("4"));
            prop_assert!(tiers.double_time_hours >= Decimal::ZERO);
        }
    }
}
