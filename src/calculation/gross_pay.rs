//! Gross pay calculation.
//!
//! Salaried employees receive their annual salary divided by the number of
//! pay periods per year. Hourly employees are paid per regular, overtime and
//! double-time hour. A bonus is added on top in both cases, and the total is
//! rounded to cents once at the end.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::HourRules;
use crate::error::EngineResult;
use crate::models::{Compensation, Employee, ResolvedHours};

use super::{checked_div, checked_mul, checked_sum, round_currency};

/// Default overtime multiplier when neither employee nor configuration sets one.
pub const DEFAULT_OVERTIME_MULTIPLIER: Decimal = Decimal::from_parts(15, 0, 0, false, 1);

/// The components of a gross pay figure.
///
/// Components are unrounded; only `gross_pay` is rounded to cents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrossPayBreakdown {
    /// Salary share, or regular hours times the hourly rate.
    pub base_pay: Decimal,
    /// Overtime hours at the overtime multiplier.
    pub overtime_pay: Decimal,
    /// Double-time hours at the double-time multiplier.
    pub double_time_pay: Decimal,
    /// Bonus added, if positive.
    pub bonus: Decimal,
    /// The rounded total.
    pub gross_pay: Decimal,
}

/// Calculates gross pay for one pay period.
///
/// # Arguments
///
/// * `employee` - The employee's compensation profile
/// * `hours` - Resolved hours for the period (ignored for salaried employees)
/// * `bonus` - Bonus amount; non-positive values are ignored
/// * `rules` - Supplies the default overtime and double-time multipliers
///
/// Employees with no compensation data yield zero before the bonus. An
/// amount beyond the decimal range is a validation error.
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::calculate_gross_pay;
/// use payroll_engine::config::HourRules;
/// use payroll_engine::models::{Employee, EmployeeStatus, PayrollFrequency, ResolvedHours};
/// use rust_decimal::Decimal;
///
/// let employee = Employee {
///     id: "emp_001".to_string(),
///     name: "Ada Lovelace".to_string(),
///     status: EmployeeStatus::Active,
///     manager_id: None,
///     salary: None,
///     hourly_rate: Some(Decimal::from(20)),
///     payroll_frequency: PayrollFrequency::Weekly,
///     overtime_multiplier: None,
///     federal_allowances: 0,
///     state_allowances: 0,
///     additional_federal_withholding: Decimal::ZERO,
///     additional_state_withholding: Decimal::ZERO,
///     benefits: Default::default(),
/// };
/// let hours = ResolvedHours {
///     total: Decimal::from(42),
///     regular: Decimal::from(40),
///     overtime: Decimal::from(2),
///     double_time: Decimal::ZERO,
/// };
///
/// let breakdown =
///     calculate_gross_pay(&employee, &hours, Decimal::ZERO, &HourRules::default()).unwrap();
/// assert_eq!(breakdown.gross_pay, Decimal::from(860));
/// ```
pub fn calculate_gross_pay(
    employee: &Employee,
    hours: &ResolvedHours,
    bonus: Decimal,
    rules: &HourRules,
) -> EngineResult<GrossPayBreakdown> {
    let mut breakdown = match employee.compensation() {
        Compensation::Salaried { annual_salary } => GrossPayBreakdown {
            base_pay: checked_div(annual_salary, employee.payroll_frequency.salary_divisor())?,
            ..Default::default()
        },
        Compensation::Hourly { hourly_rate } => {
            let overtime_multiplier = employee
                .overtime_multiplier
                .unwrap_or(rules.default_overtime_multiplier);
            GrossPayBreakdown {
                base_pay: checked_mul(hours.regular, hourly_rate)?,
                overtime_pay: checked_mul(
                    checked_mul(hours.overtime, hourly_rate)?,
                    overtime_multiplier,
                )?,
                double_time_pay: checked_mul(
                    checked_mul(hours.double_time, hourly_rate)?,
                    rules.double_time_multiplier,
                )?,
                ..Default::default()
            }
        }
        Compensation::Missing => GrossPayBreakdown::default(),
    };

    if bonus > Decimal::ZERO {
        breakdown.bonus = bonus;
    }

    breakdown.gross_pay = round_currency(checked_sum([
        breakdown.base_pay,
        breakdown.overtime_pay,
        breakdown.double_time_pay,
        breakdown.bonus,
    ])?);
    Ok(breakdown)
}
