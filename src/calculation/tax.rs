//! Flat-rate tax withholding.
//!
//! These are simplified approximations, not bracket tables: federal and
//! state income tax are flat rates less a fixed amount per claimed
//! allowance, floored at zero. Each component is rounded independently.

use rust_decimal::Decimal;

use crate::config::TaxRates;
use crate::error::EngineResult;
use crate::models::{Employee, TaxDeductions};

use super::{checked_add, checked_mul, checked_sub, round_currency};

/// Calculates tax withholding on a gross pay amount.
///
/// # Formula
///
/// - federal = max(0, gross × default_tax_rate − federal_allowances × allowance + additional)
/// - state = max(0, gross × state_tax_rate − state_allowances × allowance + additional)
/// - social_security = gross × social_security_rate
/// - medicare = gross × medicare_rate
///
/// Returns a validation error if any product or sum overflows.
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::calculate_tax_deductions;
/// use payroll_engine::config::TaxRates;
/// use payroll_engine::models::{Employee, EmployeeStatus, PayrollFrequency};
/// use rust_decimal::Decimal;
///
/// let employee = Employee {
///     id: "emp_001".to_string(),
///     name: "Ada Lovelace".to_string(),
///     status: EmployeeStatus::Active,
///     manager_id: None,
///     salary: Some(Decimal::from(52000)),
///     hourly_rate: None,
///     payroll_frequency: PayrollFrequency::Biweekly,
///     overtime_multiplier: None,
///     federal_allowances: 2,
///     state_allowances: 1,
///     additional_federal_withholding: Decimal::ZERO,
///     additional_state_withholding: Decimal::ZERO,
///     benefits: Default::default(),
/// };
///
/// let taxes =
///     calculate_tax_deductions(Decimal::from(2000), &employee, &TaxRates::default()).unwrap();
/// assert_eq!(taxes.federal, Decimal::from(300));
/// assert_eq!(taxes.state, Decimal::from(75));
/// assert_eq!(taxes.social_security, Decimal::from(124));
/// assert_eq!(taxes.medicare, Decimal::from(29));
/// ```
pub fn calculate_tax_deductions(
    gross_pay: Decimal,
    employee: &Employee,
    rates: &TaxRates,
) -> EngineResult<TaxDeductions> {
    let federal = withholding(
        gross_pay,
        rates.default_tax_rate,
        employee.federal_allowances,
        rates.federal_allowance_amount,
        employee.additional_federal_withholding,
    )?;
    let state = withholding(
        gross_pay,
        rates.state_tax_rate,
        employee.state_allowances,
        rates.state_allowance_amount,
        employee.additional_state_withholding,
    )?;

    Ok(TaxDeductions {
        federal,
        state,
        social_security: round_currency(checked_mul(gross_pay, rates.social_security_rate)?),
        medicare: round_currency(checked_mul(gross_pay, rates.medicare_rate)?),
    })
}

/// `max(0, gross × rate − allowances × per_allowance + additional)`, rounded.
fn withholding(
    gross_pay: Decimal,
    rate: Decimal,
    allowances: u32,
    per_allowance: Decimal,
    additional: Decimal,
) -> EngineResult<Decimal> {
    let allowance_total = checked_mul(Decimal::from(allowances), per_allowance)?;
    let amount = checked_add(
        checked_sub(checked_mul(gross_pay, rate)?, allowance_total)?,
        additional,
    )?;
    Ok(round_currency(amount.max(Decimal::ZERO)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BenefitEnrollment, EmployeeStatus, PayrollFrequency};
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn create_employee(federal_allowances: u32, state_allowances: u32) -> Employee {
        Employee {
            id: "emp_001".to_string(),
            name: "Test Employee".to_string(),
            status: EmployeeStatus::Active,
            manager_id: None,
            salary: Some(dec("52000")),
            hourly_rate: None,
            payroll_frequency: PayrollFrequency::Biweekly,
            overtime_multiplier: None,
            federal_allowances,
            state_allowances,
            additional_federal_withholding: Decimal::ZERO,
            additional_state_withholding: Decimal::ZERO,
            benefits: BenefitEnrollment::default(),
        }
    }

    #[test]
    fn test_no_allowances() {
        let taxes =
            calculate_tax_deductions(dec("1000"), &create_employee(0, 0), &TaxRates::default())
                .unwrap();
        assert_eq!(taxes.federal, dec("200.00"));
        assert_eq!(taxes.state, dec("50.00"));
        assert_eq!(taxes.social_security, dec("62.00"));
        assert_eq!(taxes.medicare, dec("14.50"));
        assert_eq!(taxes.total(), dec("326.50"));
    }

    #[test]
    fn test_allowances_floor_at_zero() {
        let taxes =
            calculate_tax_deductions(dec("100"), &create_employee(10, 10), &TaxRates::default())
                .unwrap();
        assert_eq!(taxes.federal, Decimal::ZERO);
        assert_eq!(taxes.state, Decimal::ZERO);
        assert_eq!(taxes.social_security, dec("6.20"));
    }

    #[test]
    fn test_additional_withholding_added() {
        let mut employee = create_employee(1, 1);
        employee.additional_federal_withholding = dec("40");
        employee.additional_state_withholding = dec("10");
        let taxes = calculate_tax_deductions(dec("1000"), &employee, &TaxRates::default()).unwrap();
        assert_eq!(taxes.federal, dec("190.00"));
        assert_eq!(taxes.state, dec("35.00"));
    }

    #[test]
    fn test_components_rounded_independently() {
        let taxes =
            calculate_tax_deductions(dec("961.54"), &create_employee(0, 0), &TaxRates::default())
                .unwrap();
        // 961.54 * 0.062 = 59.61548, 961.54 * 0.0145 = 13.94233
        assert_eq!(taxes.social_security, dec("59.62"));
        assert_eq!(taxes.medicare, dec("13.94"));
        assert_eq!(taxes.federal, dec("192.31"));
        assert_eq!(taxes.state, dec("48.08"));
    }

    #[test]
    fn test_injected_rates_used() {
        let rates = TaxRates {
            social_security_rate: dec("0.07"),
            medicare_rate: dec("0.02"),
            default_tax_rate: dec("0.10"),
            ..TaxRates::default()
        };
        let taxes = calculate_tax_deductions(dec("1000"), &create_employee(0, 0), &rates).unwrap();
        assert_eq!(taxes.federal, dec("100.00"));
        assert_eq!(taxes.social_security, dec("70.00"));
        assert_eq!(taxes.medicare, dec("20.00"));
    }

    #[test]
    fn test_zero_gross() {
        let taxes =
            calculate_tax_deductions(Decimal::ZERO, &create_employee(1, 1), &TaxRates::default())
                .unwrap();
        assert_eq!(taxes, TaxDeductions::default());
    }

    #[test]
    fn test_overflowing_gross_is_validation_error() {
        let rates = TaxRates {
            default_tax_rate: dec("2"),
            ..TaxRates::default()
        };
        let err = calculate_tax_deductions(Decimal::MAX, &create_employee(0, 0), &rates).unwrap_err();
        assert!(matches!(err, crate::error::EngineError::Validation { .. }));
    }
}
