//! Structural validation of time entries.
//!
//! The validator reports every problem it finds instead of stopping at the
//! first one, and never touches storage: callers pass in the other entries
//! recorded for the same day.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculation::minutes_to_hours;
use crate::config::HourRules;
use crate::models::TimeEntry;

/// A problem found on a time entry.
///
/// Limit issues carry the configured limit that was exceeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryIssue {
    /// Another entry exists for the same employee and date.
    OverlappingEntry,
    /// Total hours exceed the daily maximum.
    ExceedsDailyHours {
        /// The configured daily maximum.
        max_hours: Decimal,
    },
    /// Combined break and lunch time exceeds the maximum.
    ExceedsBreakLimit {
        /// The configured break maximum.
        max_hours: Decimal,
    },
    /// Clock-out is not after clock-in.
    ClockOutNotAfterClockIn,
    /// Break end is not after break start.
    BreakEndNotAfterStart,
    /// Lunch end is not after lunch start.
    LunchEndNotAfterStart,
}

impl EntryIssue {
    /// Human-readable description of the issue.
    pub fn message(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for EntryIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OverlappingEntry => f.write_str("Overlapping time entry exists for this date"),
            Self::ExceedsDailyHours { max_hours } => write!(
                f,
                "Total hours cannot exceed {} hours per day",
                max_hours.normalize()
            ),
            Self::ExceedsBreakLimit { max_hours } => write!(
                f,
                "Break duration cannot exceed {} hours",
                max_hours.normalize()
            ),
            Self::ClockOutNotAfterClockIn => {
                f.write_str("Clock out time must be after clock in time")
            }
            Self::BreakEndNotAfterStart => {
                f.write_str("Break end time must be after break start time")
            }
            Self::LunchEndNotAfterStart => {
                f.write_str("Lunch end time must be after lunch start time")
            }
        }
    }
}

/// Checks time entries against daily limits and chronological ordering.
#[derive(Debug, Clone, Default)]
pub struct TimeEntryValidator {
    rules: HourRules,
}

impl TimeEntryValidator {
    /// Creates a validator using the given limits.
    pub fn new(rules: HourRules) -> Self {
        Self { rules }
    }

    /// Validates an entry.
    ///
    /// `same_day_entries` may include `entry` itself; it is skipped by ID.
    ///
    /// # Example
    ///
    /// ```
    /// use chrono::NaiveDate;
    /// use payroll_engine::models::TimeEntry;
    /// use payroll_engine::service::{EntryIssue, TimeEntryValidator};
    ///
    /// let day = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
    /// let mut entry = TimeEntry::new("emp_001", day, day.and_hms_opt(8, 0, 0).unwrap());
    /// entry.clock_in_time = day.and_hms_opt(17, 0, 0);
    /// entry.clock_out_time = day.and_hms_opt(9, 0, 0);
    ///
    /// let issues = TimeEntryValidator::default().validate(&entry, &[]);
    /// assert_eq!(issues, vec![EntryIssue::ClockOutNotAfterClockIn]);
    /// ```
    pub fn validate(&self, entry: &TimeEntry, same_day_entries: &[TimeEntry]) -> Vec<EntryIssue> {
        let mut issues = Vec::new();

        let overlapping = same_day_entries.iter().any(|other| {
            other.id != entry.id
                && other.employee_id == entry.employee_id
                && other.work_date == entry.work_date
        });
        if overlapping {
            issues.push(EntryIssue::OverlappingEntry);
        }

        if entry.total_hours > self.rules.max_daily_hours {
            issues.push(EntryIssue::ExceedsDailyHours {
                max_hours: self.rules.max_daily_hours,
            });
        }

        let break_hours =
            minutes_to_hours(entry.break_duration_minutes + entry.lunch_duration_minutes);
        if break_hours > self.rules.max_break_hours {
            issues.push(EntryIssue::ExceedsBreakLimit {
                max_hours: self.rules.max_break_hours,
            });
        }

        if let (Some(clock_in), Some(clock_out)) = (entry.clock_in_time, entry.clock_out_time) {
            if clock_out <= clock_in {
                issues.push(EntryIssue::ClockOutNotAfterClockIn);
            }
        }
        if let (Some(start), Some(end)) = (entry.break_start_time, entry.break_end_time) {
            if end <= start {
                issues.push(EntryIssue::BreakEndNotAfterStart);
            }
        }
        if let (Some(start), Some(end)) = (entry.lunch_start_time, entry.lunch_end_time) {
            if end <= start {
                issues.push(EntryIssue::LunchEndNotAfterStart);
            }
        }

        issues
    }

    /// Returns true if the entry has no issues.
    pub fn is_valid(&self, entry: &TimeEntry, same_day_entries: &[TimeEntry]) -> bool {
        self.validate(entry, same_day_entries).is_empty()
    }
}
