//! Batch payroll processing.
//!
//! Each employee is an independent unit of work: one calculation and one
//! persisted [`PayrollRecord`]. A failure is recorded against that employee
//! and the batch moves on. Records already written are never rolled back.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{error, info};
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::models::{
    BatchResult, PayPeriod, PayrollRecord, PayrollStatus, PayrollSummary, generate_batch_id,
};
use crate::repository::{PayPeriodRepository, PayrollRecordRepository};

use super::payroll::{PayrollCalculator, PayrollRequest};

/// Runs payroll for many employees in one pay period.
#[derive(Clone)]
pub struct BatchProcessor {
    calculator: PayrollCalculator,
    periods: Arc<dyn PayPeriodRepository>,
    records: Arc<dyn PayrollRecordRepository>,
    workers: usize,
}

impl BatchProcessor {
    /// Creates a processor. The concurrent worker count comes from the
    /// calculator's `policy.batch_workers`.
    pub fn new(
        calculator: PayrollCalculator,
        periods: Arc<dyn PayPeriodRepository>,
        records: Arc<dyn PayrollRecordRepository>,
    ) -> Self {
        let workers = calculator.config().policy.batch_workers.max(1);
        Self {
            calculator,
            periods,
            records,
            workers,
        }
    }

    /// Calculates and persists one employee's record for a period.
    ///
    /// The record is stored as processed when `process_immediately` is set,
    /// otherwise as a draft.
    pub fn process_employee(
        &self,
        period: &PayPeriod,
        employee_id: &str,
        process_immediately: bool,
    ) -> EngineResult<PayrollRecord> {
        let request = PayrollRequest::new(employee_id, period.start_date, period.end_date);
        let result = self.calculator.calculate(&request)?;

        let now = Utc::now();
        let mut record = PayrollRecord::new(period.id, result, now);
        if process_immediately {
            record.process(now)?;
        }
        self.records.insert(&record)?;
        Ok(record)
    }

    /// Processes employees one after another.
    ///
    /// Always returns a result. If the pay period cannot be loaded, every
    /// employee is reported as failed with that error.
    pub fn process(
        &self,
        pay_period_id: Uuid,
        employee_ids: &[String],
        process_immediately: bool,
    ) -> BatchResult {
        let started = Instant::now();
        let mut batch = BatchResult::new(generate_batch_id(Utc::now()), pay_period_id);

        match self.load_period(pay_period_id) {
            Ok(period) => {
                for employee_id in employee_ids {
                    let outcome = self.process_employee(&period, employee_id, process_immediately);
                    Self::record_outcome(&mut batch, employee_id, outcome);
                }
            }
            Err(err) => Self::fail_all(&mut batch, employee_ids, &err),
        }

        Self::finish(batch, started)
    }

    /// Processes employees on a bounded pool of blocking workers.
    ///
    /// At most `batch_workers` employees are in flight at once. Outcomes are
    /// reported in input order, the same as [`BatchProcessor::process`].
    pub async fn process_concurrent(
        &self,
        pay_period_id: Uuid,
        employee_ids: &[String],
        process_immediately: bool,
    ) -> BatchResult {
        let started = Instant::now();
        let mut batch = BatchResult::new(generate_batch_id(Utc::now()), pay_period_id);

        let period = match self.load_period(pay_period_id) {
            Ok(period) => period,
            Err(err) => {
                Self::fail_all(&mut batch, employee_ids, &err);
                return Self::finish(batch, started);
            }
        };

        let semaphore = Arc::new(Semaphore::new(self.workers));
        let mut tasks = JoinSet::new();
        for (index, employee_id) in employee_ids.iter().cloned().enumerate() {
            let processor = self.clone();
            let period = period.clone();
            let semaphore = Arc::clone(&semaphore);
            tasks.spawn(async move {
                let outcome = match semaphore.acquire_owned().await {
                    Ok(_permit) => tokio::task::spawn_blocking(move || {
                        processor.process_employee(&period, &employee_id, process_immediately)
                    })
                    .await
                    .unwrap_or_else(|err| {
                        Err(EngineError::storage(format!("worker task failed: {err}")))
                    }),
                    Err(_) => Err(EngineError::storage("worker pool closed")),
                };
                (index, outcome)
            });
        }

        let mut outcomes: Vec<Option<EngineResult<PayrollRecord>>> =
            employee_ids.iter().map(|_| None).collect();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, outcome)) => outcomes[index] = Some(outcome),
                Err(err) => error!(error = %err, "Batch worker task failed"),
            }
        }

        for (employee_id, outcome) in employee_ids.iter().zip(outcomes) {
            let outcome = outcome
                .unwrap_or_else(|| Err(EngineError::storage("worker task did not complete")));
            Self::record_outcome(&mut batch, employee_id, outcome);
        }

        Self::finish(batch, started)
    }

    /// Moves a draft record to processed.
    pub fn finalize_record(&self, record_id: Uuid) -> EngineResult<PayrollRecord> {
        let mut record = self.load_record(record_id)?;
        record.process(Utc::now())?;
        self.records.update(PayrollStatus::Draft, &record)?;
        info!(record_id = %record_id, employee_id = %record.employee_id(), "Payroll record processed");
        Ok(record)
    }

    /// Cancels a draft record.
    pub fn cancel_record(&self, record_id: Uuid) -> EngineResult<PayrollRecord> {
        let mut record = self.load_record(record_id)?;
        record.cancel(Utc::now())?;
        self.records.update(PayrollStatus::Draft, &record)?;
        info!(record_id = %record_id, employee_id = %record.employee_id(), "Payroll record cancelled");
        Ok(record)
    }

    /// Totals and status counts over a period's records.
    pub fn summary(&self, pay_period_id: Uuid) -> EngineResult<PayrollSummary> {
        let records = self.records.list_for_period(pay_period_id)?;
        PayrollSummary::from_records(pay_period_id, &records)
    }

    fn load_period(&self, id: Uuid) -> EngineResult<PayPeriod> {
        self.periods
            .get(id)?
            .ok_or_else(|| EngineError::not_found("pay period", id))
    }

    fn load_record(&self, id: Uuid) -> EngineResult<PayrollRecord> {
        self.records
            .get(id)?
            .ok_or_else(|| EngineError::not_found("payroll record", id))
    }

    fn record_outcome(
        batch: &mut BatchResult,
        employee_id: &str,
        outcome: EngineResult<PayrollRecord>,
    ) {
        match outcome.and_then(|record| batch.record_success(&record)) {
            Ok(()) => {}
            Err(err) => {
                error!(
                    batch_id = %batch.batch_id,
                    employee_id,
                    error = %err,
                    "Payroll failed for employee"
                );
                batch.record_failure(employee_id, err.to_string());
            }
        }
    }

    fn fail_all(batch: &mut BatchResult, employee_ids: &[String], err: &EngineError) {
        error!(batch_id = %batch.batch_id, error = %err, "Batch cannot start");
        for employee_id in employee_ids {
            batch.record_failure(employee_id.as_str(), err.to_string());
        }
    }

    fn finish(mut batch: BatchResult, started: Instant) -> BatchResult {
        batch.processing_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        info!(
            batch_id = %batch.batch_id,
            pay_period_id = %batch.pay_period_id,
            processed = batch.processed_count,
            errors = batch.error_count,
            total_gross = %batch.totals.gross,
            processing_time_us = batch.processing_time_us,
            "Batch processed"
        );
        batch
    }
}
