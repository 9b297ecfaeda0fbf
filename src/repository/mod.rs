//! Storage collaborators.
//!
//! The services never touch a database directly. They depend on these narrow
//! traits, which return plain value records. [`memory`] provides thread-safe
//! in-memory implementations.

pub mod memory;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::EngineResult;
use crate::models::{
    ApprovalStatus, Employee, PayPeriod, PayrollFrequency, PayrollRecord, PayrollStatus,
    TimeEntry, TimeEntryStatus,
};

pub use memory::{
    InMemoryEmployeeRepository, InMemoryPayPeriodRepository, InMemoryPayrollRecordRepository,
    InMemoryTimeEntryRepository,
};

/// Read access to employee compensation profiles.
pub trait EmployeeRepository: Send + Sync {
    /// Retrieve an employee by ID.
    fn get(&self, id: &str) -> EngineResult<Option<Employee>>;

    /// List the employees reporting to a manager.
    fn list_by_manager(&self, manager_id: &str) -> EngineResult<Vec<Employee>>;
}

/// Uniqueness rule checked atomically with a time entry insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExclusivityRule {
    /// No clocked-in or on-break entry may exist for the employee on the
    /// entry's work date.
    NoActiveEntry,
    /// No entry of any status may exist for the employee on the entry's work
    /// date.
    NoEntryOnDate,
}

/// Filter for time entry lookups. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeEntryQuery {
    /// Only this employee.
    pub employee_id: Option<String>,
    /// Only these employees.
    pub employee_ids: Option<Vec<String>>,
    /// Work date on or after.
    pub start_date: Option<NaiveDate>,
    /// Work date on or before.
    pub end_date: Option<NaiveDate>,
    /// Only this lifecycle state.
    pub status: Option<TimeEntryStatus>,
    /// Only this approval state.
    pub approval_status: Option<ApprovalStatus>,
}

impl TimeEntryQuery {
    /// Returns true if the entry passes every set filter.
    pub fn matches(&self, entry: &TimeEntry) -> bool {
        self.employee_id
            .as_ref()
            .is_none_or(|id| *id == entry.employee_id)
            && self
                .employee_ids
                .as_ref()
                .is_none_or(|ids| ids.contains(&entry.employee_id))
            && self.start_date.is_none_or(|start| entry.work_date >= start)
            && self.end_date.is_none_or(|end| entry.work_date <= end)
            && self.status.is_none_or(|status| entry.status == status)
            && self
                .approval_status
                .is_none_or(|approval| entry.approval_status == approval)
    }
}

/// Storage for time entries.
pub trait TimeEntryRepository: Send + Sync {
    /// Retrieve a time entry by ID.
    fn get(&self, id: Uuid) -> EngineResult<Option<TimeEntry>>;

    /// Store a new entry if `rule` holds, checking and inserting atomically.
    ///
    /// A violated [`ExclusivityRule::NoActiveEntry`] is a state error; a
    /// violated [`ExclusivityRule::NoEntryOnDate`] is a conflict.
    fn insert_exclusive(&self, entry: TimeEntry, rule: ExclusivityRule) -> EngineResult<TimeEntry>;

    /// Replace stored entries, each paired with the status it had when it was
    /// loaded. Either every entry is written or none is.
    ///
    /// The statuses are checked under the same lock as the write: an entry
    /// whose stored status has moved on is a conflict, and a stored entry
    /// that is approved is a state error.
    fn update_all(&self, updates: &[(TimeEntryStatus, TimeEntry)]) -> EngineResult<()>;

    /// Delete an entry whose stored status is still `expected`. Returns true
    /// if it existed. Approved entries are never deleted.
    fn delete(&self, id: Uuid, expected: TimeEntryStatus) -> EngineResult<bool>;

    /// Entries matching the query, ordered by work date then creation time.
    fn find(&self, query: &TimeEntryQuery) -> EngineResult<Vec<TimeEntry>>;

    /// Replace one stored entry that was loaded with status `expected`.
    fn update(&self, expected: TimeEntryStatus, entry: &TimeEntry) -> EngineResult<()> {
        self.update_all(&[(expected, entry.clone())])
    }

    /// Approved entries for an employee with a work date in `[start, end]`.
    fn find_approved(
        &self,
        employee_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> EngineResult<Vec<TimeEntry>> {
        self.find(&TimeEntryQuery {
            employee_id: Some(employee_id.to_string()),
            start_date: Some(start),
            end_date: Some(end),
            approval_status: Some(ApprovalStatus::Approved),
            ..Default::default()
        })
    }

    /// All entries for an employee on one day.
    fn find_for_day(&self, employee_id: &str, date: NaiveDate) -> EngineResult<Vec<TimeEntry>> {
        self.find(&TimeEntryQuery {
            employee_id: Some(employee_id.to_string()),
            start_date: Some(date),
            end_date: Some(date),
            ..Default::default()
        })
    }

    /// The employee's most recent clocked-in or on-break entry.
    fn find_active(&self, employee_id: &str) -> EngineResult<Option<TimeEntry>> {
        let entries = self.find(&TimeEntryQuery {
            employee_id: Some(employee_id.to_string()),
            ..Default::default()
        })?;
        Ok(entries
            .into_iter()
            .filter(|entry| entry.status.is_active())
            .max_by_key(|entry| (entry.work_date, entry.clock_in_time)))
    }
}

/// Filter for pay period listings. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayPeriodFilter {
    /// Only this frequency.
    pub frequency: Option<PayrollFrequency>,
    /// Only processed (`true`) or unprocessed (`false`) periods.
    pub is_processed: Option<bool>,
}

impl PayPeriodFilter {
    /// Returns true if the period passes every set filter.
    pub fn matches(&self, period: &PayPeriod) -> bool {
        self.frequency.is_none_or(|f| period.frequency == f)
            && self.is_processed.is_none_or(|p| period.is_processed == p)
    }
}

/// Storage for pay periods.
pub trait PayPeriodRepository: Send + Sync {
    /// Retrieve a pay period by ID.
    fn get(&self, id: Uuid) -> EngineResult<Option<PayPeriod>>;

    /// Store a new pay period.
    ///
    /// The overlap check and the insert are atomic: a period overlapping a
    /// stored one is a conflict. Periods that only share a boundary date do
    /// not overlap.
    fn insert(&self, period: &PayPeriod) -> EngineResult<()>;

    /// Replace a stored pay period.
    fn update(&self, period: &PayPeriod) -> EngineResult<()>;

    /// Periods whose date range intersects `[start, end]`, boundaries included.
    fn find_overlapping(&self, start: NaiveDate, end: NaiveDate) -> EngineResult<Vec<PayPeriod>>;

    /// Periods matching the filter, newest start date first.
    fn list(&self, filter: &PayPeriodFilter) -> EngineResult<Vec<PayPeriod>>;
}

/// Storage for payroll records.
pub trait PayrollRecordRepository: Send + Sync {
    /// Retrieve a record by ID.
    fn get(&self, id: Uuid) -> EngineResult<Option<PayrollRecord>>;

    /// Store a new record.
    fn insert(&self, record: &PayrollRecord) -> EngineResult<()>;

    /// Replace a stored record whose stored status is still `expected`.
    ///
    /// A record whose status has moved on is a conflict.
    fn update(&self, expected: PayrollStatus, record: &PayrollRecord) -> EngineResult<()>;

    /// All records for a pay period, in insertion order.
    fn list_for_period(&self, pay_period_id: Uuid) -> EngineResult<Vec<PayrollRecord>>;
}
