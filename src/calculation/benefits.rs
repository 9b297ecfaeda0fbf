//! Benefit deductions.
//!
//! Insurance premiums are fixed monthly amounts prorated to the employee's
//! payroll frequency. The 401k contribution is a percentage of gross pay.

use rust_decimal::Decimal;

use crate::config::BenefitPremiums;
use crate::error::{EngineError, EngineResult};
use crate::models::{BenefitDeductions, Employee};

use super::{checked_mul, round_currency};

/// Calculates benefit deductions for one pay period.
///
/// Each enrolled premium is prorated and rounded on its own. The 401k
/// contribution applies only when enrolled with a positive percentage. An
/// amount beyond the decimal range is a validation error.
pub fn calculate_benefit_deductions(
    gross_pay: Decimal,
    employee: &Employee,
    premiums: &BenefitPremiums,
) -> EngineResult<BenefitDeductions> {
    let enrollment = &employee.benefits;
    let frequency = employee.payroll_frequency;
    let premium = |enrolled: bool, monthly: Decimal| -> EngineResult<Decimal> {
        if !enrolled {
            return Ok(Decimal::ZERO);
        }
        frequency
            .prorate_monthly(monthly)
            .map(round_currency)
            .ok_or_else(|| {
                EngineError::validation(format!("Amount out of range: monthly premium {monthly}"))
            })
    };

    let retirement_401k =
        if enrollment.retirement_401k && enrollment.retirement_401k_percent > Decimal::ZERO {
            let contribution = checked_mul(gross_pay, enrollment.retirement_401k_percent)?;
            round_currency(contribution / Decimal::ONE_HUNDRED)
        } else {
            Decimal::ZERO
        };

    Ok(BenefitDeductions {
        health: premium(enrollment.health, premiums.health_monthly)?,
        dental: premium(enrollment.dental, premiums.dental_monthly)?,
        vision: premium(enrollment.vision, premiums.vision_monthly)?,
        retirement_401k,
    })
}
