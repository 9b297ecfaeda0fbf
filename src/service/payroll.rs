//! Payroll calculation service.
//!
//! [`PayrollCalculator`] resolves an employee's hours (approved time entries
//! or caller-supplied fallback hours), then runs the pure calculation
//! functions to produce a [`PayrollResult`].

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{Datelike, NaiveDate, Utc, Weekday};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::calculation::{
    calculate_benefit_deductions, calculate_gross_pay, calculate_tax_deductions, checked_add,
    checked_sub, checked_sum, round_currency,
};
use crate::config::{MissingCompensationPolicy, PayrollConfig};
use crate::error::{EngineError, EngineResult};
use crate::models::{
    CalculationWarning, Compensation, Employee, PayrollResult, ResolvedHours, TimeEntry,
};
use crate::repository::{EmployeeRepository, TimeEntryRepository};

/// Input for one employee's payroll calculation.
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use payroll_engine::service::PayrollRequest;
/// use rust_decimal::Decimal;
///
/// let request = PayrollRequest {
///     regular_hours: Decimal::from(80),
///     ..PayrollRequest::new(
///         "emp_001",
///         NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
///         NaiveDate::from_ymd_opt(2024, 1, 14).unwrap(),
///     )
/// };
/// assert!(request.use_time_entries);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollRequest {
    /// The employee to pay.
    pub employee_id: String,
    /// First day of the period.
    pub period_start: NaiveDate,
    /// Last day of the period.
    pub period_end: NaiveDate,
    /// Regular hours used when no approved time entries are found.
    #[serde(default)]
    pub regular_hours: Decimal,
    /// Overtime hours used when no approved time entries are found.
    #[serde(default)]
    pub overtime_hours: Decimal,
    /// Bonus added to gross pay.
    #[serde(default)]
    pub bonus_amount: Decimal,
    /// Extra deductions added to the total.
    #[serde(default)]
    pub additional_deductions: Decimal,
    /// Source hours from approved time entries when any exist.
    #[serde(default = "default_use_time_entries")]
    pub use_time_entries: bool,
}

fn default_use_time_entries() -> bool {
    true
}

impl PayrollRequest {
    /// A request with no fallback hours, bonus or extra deductions that
    /// sources hours from time entries.
    pub fn new(employee_id: impl Into<String>, period_start: NaiveDate, period_end: NaiveDate) -> Self {
        Self {
            employee_id: employee_id.into(),
            period_start,
            period_end,
            regular_hours: Decimal::ZERO,
            overtime_hours: Decimal::ZERO,
            bonus_amount: Decimal::ZERO,
            additional_deductions: Decimal::ZERO,
            use_time_entries: default_use_time_entries(),
        }
    }

    fn validate(&self, max_hours: Decimal) -> EngineResult<()> {
        if self.period_end <= self.period_start {
            return Err(EngineError::validation(
                "Pay period end date must be after start date",
            ));
        }
        for (label, hours) in [
            ("Regular hours", self.regular_hours),
            ("Overtime hours", self.overtime_hours),
        ] {
            if hours < Decimal::ZERO || hours > max_hours {
                return Err(EngineError::validation(format!(
                    "{label} must be between 0 and {max_hours}"
                )));
            }
        }
        if self.bonus_amount < Decimal::ZERO {
            return Err(EngineError::validation("Bonus amount cannot be negative"));
        }
        if self.additional_deductions < Decimal::ZERO {
            return Err(EngineError::validation(
                "Additional deductions cannot be negative",
            ));
        }
        Ok(())
    }
}

/// Readiness of an employee's approved time entries for a payroll run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollValidation {
    /// The employee checked.
    pub employee_id: String,
    /// First day checked.
    pub period_start: NaiveDate,
    /// Last day checked.
    pub period_end: NaiveDate,
    /// Approved entries found.
    pub entries_count: usize,
    /// Summed hours of the approved entries.
    pub hours: ResolvedHours,
    /// Monday to Friday dates in the range.
    pub business_days: usize,
    /// Distinct dates with an approved entry.
    pub days_with_entries: usize,
    /// Business days without an approved entry.
    pub missing_days: Vec<NaiveDate>,
    /// Human-readable problems.
    pub warnings: Vec<String>,
    /// No missing business days and a positive total.
    pub is_valid_for_payroll: bool,
}

/// Computes payroll for one employee and one period.
#[derive(Clone)]
pub struct PayrollCalculator {
    employees: Arc<dyn EmployeeRepository>,
    time_entries: Arc<dyn TimeEntryRepository>,
    config: Arc<PayrollConfig>,
}

impl PayrollCalculator {
    /// Creates a calculator over the given repositories and configuration.
    pub fn new(
        employees: Arc<dyn EmployeeRepository>,
        time_entries: Arc<dyn TimeEntryRepository>,
        config: Arc<PayrollConfig>,
    ) -> Self {
        Self {
            employees,
            time_entries,
            config,
        }
    }

    /// The configuration in use.
    pub fn config(&self) -> &PayrollConfig {
        &self.config
    }

    /// Calculates gross pay, itemized deductions and net pay.
    ///
    /// # Errors
    ///
    /// - [`EngineError::Validation`] for a malformed request, or missing
    ///   compensation under [`MissingCompensationPolicy::Reject`]
    /// - [`EngineError::NotFound`] if the employee does not exist
    /// - [`EngineError::State`] if the employee is not active
    /// - [`EngineError::Storage`] if a repository fails
    pub fn calculate(&self, request: &PayrollRequest) -> EngineResult<PayrollResult> {
        request.validate(self.config.hours.max_period_hours)?;

        let employee = self
            .employees
            .get(&request.employee_id)?
            .ok_or_else(|| EngineError::not_found("employee", &request.employee_id))?;
        if !employee.is_active() {
            return Err(EngineError::state(format!(
                "Employee {} is not active",
                employee.id
            )));
        }

        let entries = if request.use_time_entries {
            self.time_entries.find_approved(
                &employee.id,
                request.period_start,
                request.period_end,
            )?
        } else {
            Vec::new()
        };

        self.calculate_with_entries(&employee, request, &entries)
    }

    /// Calculates payroll for an already-loaded employee and set of approved
    /// time entries. Fallback hours from the request apply when `entries` is
    /// empty.
    pub fn calculate_with_entries(
        &self,
        employee: &Employee,
        request: &PayrollRequest,
        entries: &[TimeEntry],
    ) -> EngineResult<PayrollResult> {
        let mut warnings = Vec::new();

        if employee.compensation() == Compensation::Missing {
            match self.config.policy.missing_compensation {
                MissingCompensationPolicy::Reject => {
                    return Err(EngineError::validation(format!(
                        "Employee {} has neither a salary nor an hourly rate",
                        employee.id
                    )));
                }
                MissingCompensationPolicy::ZeroGrossPay => {
                    warn!(
                        employee_id = %employee.id,
                        "Employee has no compensation data; gross pay is zero"
                    );
                    warnings.push(CalculationWarning::new(
                        CalculationWarning::MISSING_COMPENSATION,
                        "Employee has neither a salary nor an hourly rate; gross pay is zero",
                    ));
                }
            }
        }

        let time_entries_used = !entries.is_empty();
        let hours = if time_entries_used {
            sum_entry_hours(entries)
        } else {
            if request.use_time_entries {
                warnings.push(CalculationWarning::new(
                    CalculationWarning::FALLBACK_HOURS_USED,
                    "No approved time entries in period; supplied hours used",
                ));
            }
            ResolvedHours {
                total: checked_add(request.regular_hours, request.overtime_hours)?,
                regular: request.regular_hours,
                overtime: request.overtime_hours,
                double_time: Decimal::ZERO,
            }
        };

        let gross =
            calculate_gross_pay(employee, &hours, request.bonus_amount, &self.config.hours)?;
        let gross_pay = gross.gross_pay;
        let tax_deductions = calculate_tax_deductions(gross_pay, employee, &self.config.taxes)?;
        let benefit_deductions =
            calculate_benefit_deductions(gross_pay, employee, &self.config.benefits)?;

        let other_deductions = request.additional_deductions;
        let total_deductions = round_currency(checked_sum([
            tax_deductions.federal,
            tax_deductions.state,
            tax_deductions.social_security,
            tax_deductions.medicare,
            benefit_deductions.health,
            benefit_deductions.dental,
            benefit_deductions.vision,
            benefit_deductions.retirement_401k,
            other_deductions,
        ])?);
        let net_pay = checked_sub(gross_pay, total_deductions)?;

        debug!(
            employee_id = %employee.id,
            base_pay = %gross.base_pay,
            overtime_pay = %gross.overtime_pay,
            double_time_pay = %gross.double_time_pay,
            bonus = %gross.bonus,
            "Gross pay breakdown"
        );
        info!(
            employee_id = %employee.id,
            gross_pay = %gross_pay,
            net_pay = %net_pay,
            time_entries_used,
            "Payroll calculated"
        );

        Ok(PayrollResult {
            calculation_id: Uuid::new_v4(),
            employee_id: employee.id.clone(),
            period_start: request.period_start,
            period_end: request.period_end,
            hours,
            time_entries_used,
            time_entries_count: entries.len(),
            gross_pay,
            tax_deductions,
            benefit_deductions,
            other_deductions,
            total_deductions,
            net_pay,
            warnings,
            calculated_at: Utc::now(),
        })
    }

    /// Checks whether an employee's approved time entries cover every
    /// business day of a range.
    ///
    /// Gaps produce warnings, not errors.
    pub fn validate_for_payroll(
        &self,
        employee_id: &str,
        period_start: NaiveDate,
        period_end: NaiveDate,
    ) -> EngineResult<PayrollValidation> {
        if period_end < period_start {
            return Err(EngineError::validation(
                "Pay period end date must not be before start date",
            ));
        }
        if self.employees.get(employee_id)?.is_none() {
            return Err(EngineError::not_found("employee", employee_id));
        }

        let entries = self
            .time_entries
            .find_approved(employee_id, period_start, period_end)?;
        let hours = sum_entry_hours(&entries);

        let worked_dates: BTreeSet<NaiveDate> = entries.iter().map(|e| e.work_date).collect();
        let business_days = business_days(period_start, period_end);
        let missing_days: Vec<NaiveDate> = business_days
            .iter()
            .copied()
            .filter(|d| !worked_dates.contains(d))
            .collect();

        let mut warnings = Vec::new();
        if !missing_days.is_empty() {
            warnings.push(format!(
                "Missing time entries for {} business days",
                missing_days.len()
            ));
        }
        if hours.total.is_zero() {
            warnings.push("No hours recorded for pay period".to_string());
        }

        let is_valid_for_payroll = missing_days.is_empty() && hours.total > Decimal::ZERO;
        if !is_valid_for_payroll {
            debug!(
                employee_id,
                missing_days = missing_days.len(),
                "Time entries not ready for payroll"
            );
        }

        Ok(PayrollValidation {
            employee_id: employee_id.to_string(),
            period_start,
            period_end,
            entries_count: entries.len(),
            hours,
            business_days: business_days.len(),
            days_with_entries: worked_dates.len(),
            missing_days,
            warnings,
            is_valid_for_payroll,
        })
    }
}

/// Sums the hour buckets of time entries.
fn sum_entry_hours(entries: &[TimeEntry]) -> ResolvedHours {
    entries
        .iter()
        .fold(ResolvedHours::default(), |acc, entry| ResolvedHours {
            total: acc.total + entry.total_hours,
            regular: acc.regular + entry.regular_hours,
            overtime: acc.overtime + entry.overtime_hours,
            double_time: acc.double_time + entry.double_time_hours,
        })
}

/// Monday to Friday dates in `[start, end]`.
fn business_days(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    start
        .iter_days()
        .take_while(|d| *d <= end)
        .filter(|d| !matches!(d.weekday(), Weekday::Sat | Weekday::Sun))
        .collect()
}
