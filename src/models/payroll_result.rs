//! Payroll calculation result and record models.
//!
//! This module defines the output of the payroll calculator
//! ([`PayrollResult`]) and the persisted [`PayrollRecord`] that wraps it with
//! a draft/processed/cancelled lifecycle.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::calculation::round_currency;
use crate::error::{EngineError, EngineResult};

/// Hours used for a payroll calculation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedHours {
    /// All hours worked.
    pub total: Decimal,
    /// Hours at the regular rate.
    pub regular: Decimal,
    /// Hours at the overtime rate.
    pub overtime: Decimal,
    /// Hours at the double-time rate.
    pub double_time: Decimal,
}

/// Itemized tax withholding for one pay period.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxDeductions {
    /// Federal income tax.
    pub federal: Decimal,
    /// State income tax.
    pub state: Decimal,
    /// Social Security.
    pub social_security: Decimal,
    /// Medicare.
    pub medicare: Decimal,
}

impl TaxDeductions {
    /// Sum of all tax components.
    pub fn total(&self) -> Decimal {
        self.federal + self.state + self.social_security + self.medicare
    }
}

/// Itemized benefit deductions for one pay period.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BenefitDeductions {
    /// Health insurance premium.
    pub health: Decimal,
    /// Dental insurance premium.
    pub dental: Decimal,
    /// Vision insurance premium.
    pub vision: Decimal,
    /// 401k contribution.
    pub retirement_401k: Decimal,
}

impl BenefitDeductions {
    /// Sum of all benefit components.
    pub fn total(&self) -> Decimal {
        self.health + self.dental + self.vision + self.retirement_401k
    }
}

/// A non-fatal observation attached to a calculation.
///
/// # Example
///
/// ```
/// use payroll_engine::models::CalculationWarning;
///
/// let warning = CalculationWarning {
///     code: "FALLBACK_HOURS_USED".to_string(),
///     message: "No approved time entries; manually supplied hours used".to_string(),
/// };
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculationWarning {
    /// A code identifying the type of warning.
    pub code: String,
    /// A human-readable description of the warning.
    pub message: String,
}

impl CalculationWarning {
    /// Employee has neither a salary nor an hourly rate.
    pub const MISSING_COMPENSATION: &'static str = "MISSING_COMPENSATION";
    /// Hours came from the caller rather than approved time entries.
    pub const FALLBACK_HOURS_USED: &'static str = "FALLBACK_HOURS_USED";

    /// Creates a warning.
    pub fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
        }
    }
}

/// One employee's payroll breakdown for one period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollResult {
    /// Unique identifier for this calculation.
    pub calculation_id: Uuid,
    /// The employee paid.
    pub employee_id: String,
    /// First day covered.
    pub period_start: NaiveDate,
    /// Last day covered.
    pub period_end: NaiveDate,
    /// Hours the gross pay is based on.
    pub hours: ResolvedHours,
    /// True if hours came from approved time entries.
    pub time_entries_used: bool,
    /// Number of approved time entries summed.
    pub time_entries_count: usize,
    /// Earnings before deductions.
    pub gross_pay: Decimal,
    /// Itemized taxes.
    pub tax_deductions: TaxDeductions,
    /// Itemized benefits.
    pub benefit_deductions: BenefitDeductions,
    /// Caller-supplied extra deductions.
    pub other_deductions: Decimal,
    /// Taxes, benefits and other deductions combined.
    pub total_deductions: Decimal,
    /// Gross pay less total deductions.
    pub net_pay: Decimal,
    /// Non-fatal observations.
    pub warnings: Vec<CalculationWarning>,
    /// When the calculation ran.
    pub calculated_at: DateTime<Utc>,
}

impl PayrollResult {
    /// Sum of the tax components.
    pub fn tax_total(&self) -> Decimal {
        self.tax_deductions.total()
    }

    /// Sum of the benefit components.
    pub fn benefit_total(&self) -> Decimal {
        self.benefit_deductions.total()
    }

    /// Net pay as a percentage of gross pay, rounded to hundredths.
    ///
    /// `None` when gross pay is zero or the ratio is out of range.
    pub fn take_home_percentage(&self) -> Option<Decimal> {
        self.net_pay
            .checked_div(self.gross_pay)?
            .checked_mul(Decimal::ONE_HUNDRED)
            .map(round_currency)
    }

    /// Returns true if a warning with the given code is attached.
    pub fn has_warning(&self, code: &str) -> bool {
        self.warnings.iter().any(|w| w.code == code)
    }
}

/// Lifecycle state of a payroll record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayrollStatus {
    /// Calculated but not final; may be amended or cancelled.
    #[default]
    Draft,
    /// Final and immutable.
    Processed,
    /// Withdrawn before processing.
    Cancelled,
}

/// A persisted payroll calculation for one employee and pay period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollRecord {
    /// Unique identifier for the record.
    pub id: Uuid,
    /// The pay period the record belongs to.
    pub pay_period_id: Uuid,
    /// Lifecycle state.
    pub status: PayrollStatus,
    /// The calculation.
    pub result: PayrollResult,
    /// When the record was processed.
    pub processed_at: Option<DateTime<Utc>>,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
    /// When the record was last changed.
    pub updated_at: DateTime<Utc>,
}

impl PayrollRecord {
    /// Creates a draft record.
    pub fn new(pay_period_id: Uuid, result: PayrollResult, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            pay_period_id,
            status: PayrollStatus::Draft,
            result,
            processed_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// The employee the record pays.
    pub fn employee_id(&self) -> &str {
        &self.result.employee_id
    }

    /// Moves a draft record to processed.
    pub fn process(&mut self, at: DateTime<Utc>) -> EngineResult<()> {
        self.require_draft("processed")?;
        self.status = PayrollStatus::Processed;
        self.processed_at = Some(at);
        self.updated_at = at;
        Ok(())
    }

    /// Cancels a draft record.
    pub fn cancel(&mut self, at: DateTime<Utc>) -> EngineResult<()> {
        self.require_draft("cancelled")?;
        self.status = PayrollStatus::Cancelled;
        self.updated_at = at;
        Ok(())
    }

    /// Replaces the calculation of a draft record.
    pub fn amend(&mut self, result: PayrollResult, at: DateTime<Utc>) -> EngineResult<()> {
        self.require_draft("amended")?;
        if result.employee_id != self.result.employee_id {
            return Err(EngineError::validation(
                "Amended result must belong to the same employee",
            ));
        }
        self.result = result;
        self.updated_at = at;
        Ok(())
    }

    /// Gross pay divided by total hours, if any hours were paid.
    pub fn effective_hourly_rate(&self) -> Option<Decimal> {
        let hours = self.result.hours.total;
        (hours > Decimal::ZERO).then(|| round_currency(self.result.gross_pay / hours))
    }

    fn require_draft(&self, verb: &str) -> EngineResult<()> {
        match self.status {
            PayrollStatus::Draft => Ok(()),
            PayrollStatus::Processed | PayrollStatus::Cancelled => Err(EngineError::state(format!(
                "Payroll record {} is {:?} and cannot be {verb}",
                self.id, self.status
            ))),
        }
    }
}
