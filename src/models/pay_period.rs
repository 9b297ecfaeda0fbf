//! Pay period model.
//!
//! This module contains the [`PayPeriod`] type: a bounded date range with a
//! pay date and frequency, processed at most once.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};

use super::PayrollFrequency;

/// Represents a pay period with its date range and pay date.
///
/// # Example
///
/// ```
/// use payroll_engine::models::{PayPeriod, PayrollFrequency};
/// use chrono::NaiveDate;
///
/// let date = |d| NaiveDate::from_ymd_opt(2024, 1, d).unwrap();
/// let period = PayPeriod::new(
///     date(1),
///     date(14),
///     date(19),
///     PayrollFrequency::Biweekly,
///     date(1).and_hms_opt(0, 0, 0).unwrap(),
/// );
///
/// assert_eq!(period.period_days(), 14);
/// assert!(period.contains_date(date(14)));
/// assert!(!period.contains_date(date(15)));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayPeriod {
    /// Unique identifier for the pay period.
    pub id: Uuid,
    /// First day of the period (inclusive).
    pub start_date: NaiveDate,
    /// Last day of the period (inclusive).
    pub end_date: NaiveDate,
    /// The day employees are paid.
    pub pay_date: NaiveDate,
    /// Pay frequency the period belongs to.
    pub frequency: PayrollFrequency,
    /// True once payroll has been run for the period.
    pub is_processed: bool,
    /// When the period was marked processed.
    pub processed_at: Option<NaiveDateTime>,
    /// When the period was created.
    pub created_at: NaiveDateTime,
}

impl PayPeriod {
    /// Creates an unprocessed pay period. No validation is performed here.
    pub fn new(
        start_date: NaiveDate,
        end_date: NaiveDate,
        pay_date: NaiveDate,
        frequency: PayrollFrequency,
        created_at: NaiveDateTime,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            start_date,
            end_date,
            pay_date,
            frequency,
            is_processed: false,
            processed_at: None,
            created_at,
        }
    }

    /// Number of days in the period, counting both ends.
    pub fn period_days(&self) -> i64 {
        (self.end_date - self.start_date).num_days() + 1
    }

    /// Checks if a given date falls within this pay period.
    ///
    /// The check is inclusive of both start and end dates.
    pub fn contains_date(&self, date: NaiveDate) -> bool {
        date >= self.start_date && date <= self.end_date
    }

    /// Returns true if `today` falls within the period.
    pub fn is_current(&self, today: NaiveDate) -> bool {
        self.contains_date(today)
    }

    /// Returns true if the range `[start, end]` overlaps this period.
    ///
    /// Ranges that only touch at a boundary day (this period ends on the day
    /// the other starts, or starts on the day it ends) are adjacent and do not
    /// count as overlapping.
    ///
    /// # Examples
    ///
    /// ```
    /// use payroll_engine::models::{PayPeriod, PayrollFrequency};
    /// use chrono::NaiveDate;
    ///
    /// let date = |d| NaiveDate::from_ymd_opt(2024, 1, d).unwrap();
    /// let period = PayPeriod::new(
    ///     date(1), date(14), date(19), PayrollFrequency::Biweekly,
    ///     date(1).and_hms_opt(0, 0, 0).unwrap(),
    /// );
    ///
    /// assert!(!period.overlaps(date(14), date(28)));
    /// assert!(period.overlaps(date(10), date(20)));
    /// ```
    pub fn overlaps(&self, start: NaiveDate, end: NaiveDate) -> bool {
        let intersects = self.start_date <= end && start <= self.end_date;
        let adjacent = self.end_date == start || self.start_date == end;
        intersects && !adjacent
    }

    /// Marks the period processed.
    pub fn mark_processed(&mut self, at: NaiveDateTime) -> EngineResult<()> {
        if self.is_processed {
            return Err(EngineError::state(format!(
                "Pay period {} has already been processed",
                self.id
            )));
        }
        self.is_processed = true;
        self.processed_at = Some(at);
        Ok(())
    }
}
