//! Pay period management.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::PayDateRule;
use crate::error::{EngineError, EngineResult, ErrorKind};
use crate::models::{PayPeriod, PayrollFrequency};
use crate::repository::{PayPeriodFilter, PayPeriodRepository};

/// Request to create a pay period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPayPeriod {
    /// First day (inclusive).
    pub start_date: NaiveDate,
    /// Last day (inclusive).
    pub end_date: NaiveDate,
    /// Pay date.
    pub pay_date: NaiveDate,
    /// Pay frequency.
    pub frequency: PayrollFrequency,
}

/// Creates and validates pay periods.
///
/// New periods must not overlap existing ones, except that periods sharing
/// a single boundary day are treated as adjacent.
#[derive(Clone)]
pub struct PayPeriodManager {
    periods: Arc<dyn PayPeriodRepository>,
    pay_date_rule: PayDateRule,
}

impl PayPeriodManager {
    /// Creates a manager over the given repository.
    pub fn new(periods: Arc<dyn PayPeriodRepository>, pay_date_rule: PayDateRule) -> Self {
        Self {
            periods,
            pay_date_rule,
        }
    }

    /// Validates and stores a new pay period.
    ///
    /// # Errors
    ///
    /// - [`EngineError::Validation`] if the start is not before the end, or
    ///   the pay date breaks the configured [`PayDateRule`]
    /// - [`EngineError::Conflict`] if the range overlaps an existing period,
    ///   checked atomically with the insert
    pub fn create(&self, new: NewPayPeriod) -> EngineResult<PayPeriod> {
        if new.start_date >= new.end_date {
            return Err(EngineError::validation(
                "Pay period start date must be before end date",
            ));
        }

        match self.pay_date_rule {
            PayDateRule::OnOrAfterEndDate if new.pay_date < new.end_date => {
                return Err(EngineError::validation(
                    "Pay date must be on or after the pay period end date",
                ));
            }
            PayDateRule::OnOrAfterStartDate if new.pay_date < new.start_date => {
                return Err(EngineError::validation(
                    "Pay date must be on or after the pay period start date",
                ));
            }
            _ => {}
        }

        let period = PayPeriod::new(
            new.start_date,
            new.end_date,
            new.pay_date,
            new.frequency,
            Utc::now().naive_utc(),
        );
        if let Err(err) = self.periods.insert(&period) {
            if err.kind() == ErrorKind::Conflict {
                warn!(
                    start_date = %new.start_date,
                    end_date = %new.end_date,
                    error = %err,
                    "Rejected overlapping pay period"
                );
            }
            return Err(err);
        }
        info!(
            pay_period_id = %period.id,
            start_date = %period.start_date,
            end_date = %period.end_date,
            "Pay period created"
        );
        Ok(period)
    }

    /// Retrieve a pay period by ID.
    pub fn get(&self, id: Uuid) -> EngineResult<PayPeriod> {
        self.periods
            .get(id)?
            .ok_or_else(|| EngineError::not_found("pay period", id))
    }

    /// Periods matching the filter, newest first.
    pub fn list(&self, filter: &PayPeriodFilter) -> EngineResult<Vec<PayPeriod>> {
        self.periods.list(filter)
    }

    /// The period containing `today`, if any.
    ///
    /// On a shared boundary day the later period wins.
    pub fn current(&self, today: NaiveDate) -> EngineResult<Option<PayPeriod>> {
        Ok(self
            .periods
            .find_overlapping(today, today)?
            .into_iter()
            .max_by_key(|p| p.start_date))
    }

    /// Marks a period processed. Fails if it already is.
    pub fn mark_processed(&self, id: Uuid) -> EngineResult<PayPeriod> {
        let mut period = self.get(id)?;
        period.mark_processed(Utc::now().naive_utc())?;
        self.periods.update(&period)?;
        info!(pay_period_id = %id, "Pay period marked processed");
        Ok(period)
    }
}
