//! Batch processing result models.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::calculation::checked_add;
use crate::error::EngineResult;

use super::{PayrollRecord, PayrollStatus};

/// Aggregate money totals over the successful employees of a batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchTotals {
    /// Sum of gross pay.
    pub gross: Decimal,
    /// Sum of net pay.
    pub net: Decimal,
    /// Sum of total deductions.
    pub deductions: Decimal,
}

/// A per-employee failure inside a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchError {
    /// The employee whose calculation failed.
    pub employee_id: String,
    /// What went wrong.
    pub message: String,
}

/// Overall outcome of a batch, derived from its counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchOutcome {
    /// Every employee succeeded.
    Completed,
    /// Some employees succeeded and some failed.
    PartialFailure,
    /// Every employee failed.
    Failed,
}

/// The result of running payroll for many employees in one pay period.
///
/// A batch always produces a result; callers inspect [`BatchResult::outcome`]
/// or the error list instead of relying on an overall error.
///
/// # Example
///
/// ```
/// use payroll_engine::models::{BatchOutcome, BatchResult};
/// use uuid::Uuid;
///
/// let result = BatchResult::new("batch_2024_01_19_120000_ab12cd34", Uuid::new_v4());
/// assert_eq!(result.outcome(), BatchOutcome::Completed);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchResult {
    /// Batch identifier (timestamp plus random suffix).
    pub batch_id: String,
    /// The pay period processed.
    pub pay_period_id: Uuid,
    /// Employees with a persisted record.
    pub processed_count: usize,
    /// Employees that failed.
    pub error_count: usize,
    /// Totals over successful employees only.
    pub totals: BatchTotals,
    /// Records created, in input order.
    pub record_ids: Vec<Uuid>,
    /// Failures, in input order.
    pub errors: Vec<BatchError>,
    /// Wall-clock processing time in microseconds.
    pub processing_time_us: u64,
}

impl BatchResult {
    /// Creates an empty result.
    pub fn new(batch_id: impl Into<String>, pay_period_id: Uuid) -> Self {
        Self {
            batch_id: batch_id.into(),
            pay_period_id,
            processed_count: 0,
            error_count: 0,
            totals: BatchTotals::default(),
            record_ids: Vec::new(),
            errors: Vec::new(),
            processing_time_us: 0,
        }
    }

    /// Adds a successful employee's record to the counts and totals.
    ///
    /// The batch is left unchanged if a total would overflow.
    pub fn record_success(&mut self, record: &PayrollRecord) -> EngineResult<()> {
        let result = &record.result;
        self.totals = BatchTotals {
            gross: checked_add(self.totals.gross, result.gross_pay)?,
            net: checked_add(self.totals.net, result.net_pay)?,
            deductions: checked_add(self.totals.deductions, result.total_deductions)?,
        };
        self.processed_count += 1;
        self.record_ids.push(record.id);
        Ok(())
    }

    /// Adds a failed employee.
    pub fn record_failure(&mut self, employee_id: impl Into<String>, message: impl Into<String>) {
        self.error_count += 1;
        self.errors.push(BatchError {
            employee_id: employee_id.into(),
            message: message.into(),
        });
    }

    /// Classifies the batch.
    pub fn outcome(&self) -> BatchOutcome {
        match (self.processed_count, self.error_count) {
            (_, 0) => BatchOutcome::Completed,
            (0, _) => BatchOutcome::Failed,
            _ => BatchOutcome::PartialFailure,
        }
    }
}

/// Builds a batch identifier of the form `batch_YYYY_MM_DD_HHMMSS_xxxxxxxx`.
pub fn generate_batch_id(now: DateTime<Utc>) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("batch_{}_{}", now.format("%Y_%m_%d_%H%M%S"), &suffix[..8])
}

/// Aggregated view of all payroll records for one pay period.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollSummary {
    /// The pay period summarized.
    pub pay_period_id: Uuid,
    /// Records counted, excluding cancelled ones.
    pub record_count: usize,
    /// Draft records.
    pub draft_count: usize,
    /// Processed records.
    pub processed_count: usize,
    /// Cancelled records.
    pub cancelled_count: usize,
    /// Sum of gross pay.
    pub total_gross: Decimal,
    /// Sum of net pay.
    pub total_net: Decimal,
    /// Sum of total deductions.
    pub total_deductions: Decimal,
    /// Sum of federal tax.
    pub total_federal_tax: Decimal,
    /// Sum of state tax.
    pub total_state_tax: Decimal,
    /// Sum of Social Security.
    pub total_social_security: Decimal,
    /// Sum of Medicare.
    pub total_medicare: Decimal,
    /// Sum of regular hours.
    pub total_regular_hours: Decimal,
    /// Sum of overtime hours.
    pub total_overtime_hours: Decimal,
}

impl PayrollSummary {
    /// Summarizes records for a pay period. Cancelled records are counted
    /// but excluded from the totals.
    ///
    /// Fails with a validation error if a total overflows.
    pub fn from_records<'a, I>(pay_period_id: Uuid, records: I) -> EngineResult<Self>
    where
        I: IntoIterator<Item = &'a PayrollRecord>,
    {
        let mut summary = Self {
            pay_period_id,
            ..Default::default()
        };

        for record in records {
            match record.status {
                PayrollStatus::Draft => summary.draft_count += 1,
                PayrollStatus::Processed => summary.processed_count += 1,
                PayrollStatus::Cancelled => {
                    summary.cancelled_count += 1;
                    continue;
                }
            }

            let result = &record.result;
            summary.record_count += 1;
            for (total, amount) in [
                (&mut summary.total_gross, result.gross_pay),
                (&mut summary.total_net, result.net_pay),
                (&mut summary.total_deductions, result.total_deductions),
                (&mut summary.total_federal_tax, result.tax_deductions.federal),
                (&mut summary.total_state_tax, result.tax_deductions.state),
                (&mut summary.total_social_security, result.tax_deductions.social_security),
                (&mut summary.total_medicare, result.tax_deductions.medicare),
                (&mut summary.total_regular_hours, result.hours.regular),
                (&mut summary.total_overtime_hours, result.hours.overtime),
            ] {
                *total = checked_add(*total, amount)?;
            }
        }

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_classification() {
        let mut result = BatchResult::new("batch_test", Uuid::new_v4());
        assert_eq!(result.outcome(), BatchOutcome::Completed);

        result.record_failure("emp_003", "employee not found: emp_003");
        assert_eq!(result.outcome(), BatchOutcome::Failed);
        assert_eq!(result.error_count, 1);

        result.processed_count = 4;
        assert_eq!(result.outcome(), BatchOutcome::PartialFailure);
    }

    fn record_with_gross(gross: Decimal) -> PayrollRecord {
        let result = crate::models::PayrollResult {
            calculation_id: Uuid::new_v4(),
            employee_id: "emp_001".to_string(),
            period_start: chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            period_end: chrono::NaiveDate::from_ymd_opt(2024, 1, 14).unwrap(),
            hours: Default::default(),
            time_entries_used: false,
            time_entries_count: 0,
            gross_pay: gross,
            tax_deductions: Default::default(),
            benefit_deductions: Default::default(),
            other_deductions: Decimal::ZERO,
            total_deductions: Decimal::ZERO,
            net_pay: gross,
            warnings: vec![],
            calculated_at: Utc::now(),
        };
        PayrollRecord::new(Uuid::new_v4(), result, Utc::now())
    }

    #[test]
    fn test_record_success_overflow_leaves_batch_unchanged() {
        let mut result = BatchResult::new("batch_test", Uuid::new_v4());
        result.record_success(&record_with_gross(Decimal::MAX)).unwrap();
        let before = result.clone();

        let err = result
            .record_success(&record_with_gross(Decimal::ONE))
            .unwrap_err();
        assert!(matches!(err, crate::error::EngineError::Validation { .. }));
        assert_eq!(result, before);
        assert_eq!(result.processed_count, 1);
    }

    #[test]
    fn test_summary_overflow_is_error() {
        let records = [record_with_gross(Decimal::MAX), record_with_gross(Decimal::MAX)];
        assert!(PayrollSummary::from_records(Uuid::new_v4(), &records).is_err());

        let summary = PayrollSummary::from_records(Uuid::new_v4(), &records[..1]).unwrap();
        assert_eq!(summary.total_gross, Decimal::MAX);
    }

    #[test]
    fn test_batch_id_format() {
        let now = DateTime::parse_from_rfc3339("2024-01-19T12:34:56Z")
            .unwrap()
            .with_timezone(&Utc);
        let id = generate_batch_id(now);

        assert!(id.starts_with("batch_2024_01_19_123456_"));
        assert_eq!(id.len(), "batch_2024_01_19_123456_".len() + 8);
        assert_ne!(id, generate_batch_id(now));
    }

    #[test]
    fn test_outcome_serialization() {
        assert_eq!(
            serde_json::to_string(&BatchOutcome::PartialFailure).unwrap(),
            "\"partial_failure\""
        );
    }
}
