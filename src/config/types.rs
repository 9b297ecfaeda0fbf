//! Configuration types for payroll calculation.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from YAML configuration files. The `Default` impls
//! reproduce the engine's built-in flat-rate approximations.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Tax rates and allowance amounts used by the flat-rate tax approximations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxRates {
    /// Social Security rate applied to gross pay (e.g. 0.062).
    pub social_security_rate: Decimal,
    /// Medicare rate applied to gross pay (e.g. 0.0145).
    pub medicare_rate: Decimal,
    /// Flat federal income tax rate applied to gross pay (e.g. 0.20).
    pub default_tax_rate: Decimal,
    /// Flat state income tax rate applied to gross pay (e.g. 0.05).
    pub state_tax_rate: Decimal,
    /// Federal tax reduction per claimed federal allowance.
    pub federal_allowance_amount: Decimal,
    /// State tax reduction per claimed state allowance.
    pub state_allowance_amount: Decimal,
}

impl Default for TaxRates {
    fn default() -> Self {
        Self {
            social_security_rate: Decimal::new(62, 3),
            medicare_rate: Decimal::new(145, 4),
            default_tax_rate: Decimal::new(20, 2),
            state_tax_rate: Decimal::new(5, 2),
            federal_allowance_amount: Decimal::new(5000, 2),
            state_allowance_amount: Decimal::new(2500, 2),
        }
    }
}

/// Fixed monthly benefit premiums, prorated per payroll frequency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BenefitPremiums {
    /// Monthly health insurance premium.
    pub health_monthly: Decimal,
    /// Monthly dental insurance premium.
    pub dental_monthly: Decimal,
    /// Monthly vision insurance premium.
    pub vision_monthly: Decimal,
}

impl Default for BenefitPremiums {
    fn default() -> Self {
        Self {
            health_monthly: Decimal::new(20000, 2),
            dental_monthly: Decimal::new(5000, 2),
            vision_monthly: Decimal::new(2500, 2),
        }
    }
}

/// Daily hour thresholds, pay multipliers and time-entry limits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HourRules {
    /// Worked hours per day paid as regular time.
    pub regular_hours_limit: Decimal,
    /// Worked hours per day after which double time starts.
    pub overtime_hours_limit: Decimal,
    /// Overtime multiplier used when the employee has none of their own.
    pub default_overtime_multiplier: Decimal,
    /// Multiplier applied to hourly double-time hours.
    pub double_time_multiplier: Decimal,
    /// Maximum total hours a single day's entry may carry.
    pub max_daily_hours: Decimal,
    /// Maximum break duration in hours for a single entry.
    pub max_break_hours: Decimal,
    /// Maximum manually supplied hours for one pay period.
    pub max_period_hours: Decimal,
}

impl Default for HourRules {
    fn default() -> Self {
        Self {
            regular_hours_limit: Decimal::new(8, 0),
            overtime_hours_limit: Decimal::new(12, 0),
            default_overtime_multiplier: Decimal::new(15, 1),
            double_time_multiplier: Decimal::new(20, 1),
            max_daily_hours: Decimal::new(24, 0),
            max_break_hours: Decimal::new(4, 0),
            max_period_hours: Decimal::new(168, 0),
        }
    }
}

/// What to do with an employee that has neither a salary nor an hourly rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingCompensationPolicy {
    /// Compute a gross pay of zero and attach a warning.
    #[default]
    ZeroGrossPay,
    /// Fail the calculation with a validation error.
    Reject,
}

/// How a pay period's pay date is checked against its bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayDateRule {
    /// The pay date must fall on or after the period end date.
    #[default]
    OnOrAfterEndDate,
    /// The pay date must fall on or after the period start date.
    OnOrAfterStartDate,
}

/// Engine policies that callers may switch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyConfig {
    /// Handling of employees without compensation data.
    pub missing_compensation: MissingCompensationPolicy,
    /// Pay date validation rule for new pay periods.
    pub pay_date_rule: PayDateRule,
    /// Worker count for concurrent batch processing.
    pub batch_workers: usize,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            missing_compensation: MissingCompensationPolicy::default(),
            pay_date_rule: PayDateRule::default(),
            batch_workers: 4,
        }
    }
}

/// The complete payroll configuration.
///
/// # Example
///
/// ```
/// use payroll_engine::config::PayrollConfig;
/// use rust_decimal::Decimal;
///
/// let config = PayrollConfig::default();
/// assert_eq!(config.taxes.social_security_rate, Decimal::new(62, 3));
/// assert_eq!(config.hours.regular_hours_limit, Decimal::new(8, 0));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PayrollConfig {
    /// Tax rates and allowance amounts.
    pub taxes: TaxRates,
    /// Monthly benefit premiums.
    pub benefits: BenefitPremiums,
    /// Hour thresholds, multipliers and limits.
    pub hours: HourRules,
    /// Switchable policies.
    pub policy: PolicyConfig,
}
