//! Thread-safe in-memory repositories.
//!
//! Each repository guards its records with a single `RwLock`, so compound
//! operations such as [`TimeEntryRepository::insert_exclusive`] and the
//! status-checked updates are atomic.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::NaiveDate;
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::models::{
    Employee, PayPeriod, PayrollRecord, PayrollStatus, TimeEntry, TimeEntryStatus,
};

use super::{
    EmployeeRepository, ExclusivityRule, PayPeriodFilter, PayPeriodRepository,
    PayrollRecordRepository, TimeEntryQuery, TimeEntryRepository,
};

fn read<T>(lock: &RwLock<T>) -> EngineResult<RwLockReadGuard<'_, T>> {
    lock.read()
        .map_err(|_| EngineError::storage("repository lock poisoned"))
}

fn write<T>(lock: &RwLock<T>) -> EngineResult<RwLockWriteGuard<'_, T>> {
    lock.write()
        .map_err(|_| EngineError::storage("repository lock poisoned"))
}

/// In-memory employee directory.
#[derive(Debug, Default)]
pub struct InMemoryEmployeeRepository {
    employees: RwLock<HashMap<String, Employee>>,
}

impl InMemoryEmployeeRepository {
    /// Creates a repository holding the given employees.
    pub fn with_employees(employees: impl IntoIterator<Item = Employee>) -> Self {
        Self {
            employees: RwLock::new(employees.into_iter().map(|e| (e.id.clone(), e)).collect()),
        }
    }

    /// Adds or replaces an employee.
    pub fn upsert(&self, employee: Employee) -> EngineResult<()> {
        write(&self.employees)?.insert(employee.id.clone(), employee);
        Ok(())
    }
}

impl EmployeeRepository for InMemoryEmployeeRepository {
    fn get(&self, id: &str) -> EngineResult<Option<Employee>> {
        Ok(read(&self.employees)?.get(id).cloned())
    }

    fn list_by_manager(&self, manager_id: &str) -> EngineResult<Vec<Employee>> {
        let mut employees: Vec<Employee> = read(&self.employees)?
            .values()
            .filter(|e| e.manager_id.as_deref() == Some(manager_id))
            .cloned()
            .collect();
        employees.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(employees)
    }
}

/// In-memory time entry store.
#[derive(Debug, Default)]
pub struct InMemoryTimeEntryRepository {
    entries: RwLock<HashMap<Uuid, TimeEntry>>,
}

impl InMemoryTimeEntryRepository {
    /// Creates an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries.
    pub fn len(&self) -> EngineResult<usize> {
        Ok(read(&self.entries)?.len())
    }

    /// Returns true if no entries are stored.
    pub fn is_empty(&self) -> EngineResult<bool> {
        Ok(self.len()? == 0)
    }
}

impl TimeEntryRepository for InMemoryTimeEntryRepository {
    fn get(&self, id: Uuid) -> EngineResult<Option<TimeEntry>> {
        Ok(read(&self.entries)?.get(&id).cloned())
    }

    fn insert_exclusive(&self, entry: TimeEntry, rule: ExclusivityRule) -> EngineResult<TimeEntry> {
        let mut entries = write(&self.entries)?;

        let mut same_day = entries
            .values()
            .filter(|e| e.employee_id == entry.employee_id && e.work_date == entry.work_date);

        match rule {
            ExclusivityRule::NoActiveEntry => {
                if same_day.any(|e| e.status.is_active()) {
                    return Err(EngineError::state("Employee is already clocked in"));
                }
            }
            ExclusivityRule::NoEntryOnDate => {
                if same_day.next().is_some() {
                    return Err(EngineError::conflict(
                        "Time entry already exists for this employee on this date",
                    ));
                }
            }
        }

        if entries.contains_key(&entry.id) {
            return Err(EngineError::conflict(format!(
                "Time entry {} already exists",
                entry.id
            )));
        }
        entries.insert(entry.id, entry.clone());
        Ok(entry)
    }

    fn update_all(&self, updates: &[(TimeEntryStatus, TimeEntry)]) -> EngineResult<()> {
        let mut entries = write(&self.entries)?;

        for (expected, entry) in updates {
            let stored = entries
                .get(&entry.id)
                .ok_or_else(|| EngineError::not_found("time entry", entry.id))?;
            check_stored_status(stored, *expected)?;
        }
        for (_, entry) in updates {
            entries.insert(entry.id, entry.clone());
        }
        Ok(())
    }

    fn delete(&self, id: Uuid, expected: TimeEntryStatus) -> EngineResult<bool> {
        let mut entries = write(&self.entries)?;
        let Some(stored) = entries.get(&id) else {
            return Ok(false);
        };
        check_stored_status(stored, expected)?;
        entries.remove(&id);
        Ok(true)
    }

    fn find(&self, query: &TimeEntryQuery) -> EngineResult<Vec<TimeEntry>> {
        let mut found: Vec<TimeEntry> = read(&self.entries)?
            .values()
            .filter(|e| query.matches(e))
            .cloned()
            .collect();
        found.sort_by_key(|e| (e.work_date, e.created_at, e.id));
        Ok(found)
    }
}

/// Refuses writes over an approved entry or one whose status has changed
/// since the caller loaded it.
fn check_stored_status(stored: &TimeEntry, expected: TimeEntryStatus) -> EngineResult<()> {
    if !stored.is_editable() {
        return Err(EngineError::state(format!(
            "Time entry {} is approved and cannot be changed",
            stored.id
        )));
    }
    if stored.status != expected {
        return Err(EngineError::conflict(format!(
            "Time entry {} is {}, expected {expected}",
            stored.id, stored.status
        )));
    }
    Ok(())
}

/// In-memory pay period store.
#[derive(Debug, Default)]
pub struct InMemoryPayPeriodRepository {
    periods: RwLock<HashMap<Uuid, PayPeriod>>,
}

impl InMemoryPayPeriodRepository {
    /// Creates an empty repository.
    pub fn new() -> Self {
        Self::default()
    }
}

impl PayPeriodRepository for InMemoryPayPeriodRepository {
    fn get(&self, id: Uuid) -> EngineResult<Option<PayPeriod>> {
        Ok(read(&self.periods)?.get(&id).cloned())
    }

    fn insert(&self, period: &PayPeriod) -> EngineResult<()> {
        let mut periods = write(&self.periods)?;
        if periods.contains_key(&period.id) {
            return Err(EngineError::conflict(format!(
                "Pay period {} already exists",
                period.id
            )));
        }
        if let Some(existing) = periods
            .values()
            .filter(|p| p.overlaps(period.start_date, period.end_date))
            .min_by_key(|p| p.start_date)
        {
            return Err(EngineError::conflict(format!(
                "Pay period overlaps with existing pay period {} to {}",
                existing.start_date, existing.end_date
            )));
        }
        periods.insert(period.id, period.clone());
        Ok(())
    }

    fn update(&self, period: &PayPeriod) -> EngineResult<()> {
        let mut periods = write(&self.periods)?;
        match periods.get_mut(&period.id) {
            Some(stored) => {
                *stored = period.clone();
                Ok(())
            }
            None => Err(EngineError::not_found("pay period", period.id)),
        }
    }

    fn find_overlapping(&self, start: NaiveDate, end: NaiveDate) -> EngineResult<Vec<PayPeriod>> {
        let mut found: Vec<PayPeriod> = read(&self.periods)?
            .values()
            .filter(|p| p.start_date <= end && p.end_date >= start)
            .cloned()
            .collect();
        found.sort_by_key(|p| p.start_date);
        Ok(found)
    }

    fn list(&self, filter: &PayPeriodFilter) -> EngineResult<Vec<PayPeriod>> {
        let mut found: Vec<PayPeriod> = read(&self.periods)?
            .values()
            .filter(|p| filter.matches(p))
            .cloned()
            .collect();
        found.sort_by(|a, b| b.start_date.cmp(&a.start_date));
        Ok(found)
    }
}

/// In-memory payroll record store, preserving insertion order.
#[derive(Debug, Default)]
pub struct InMemoryPayrollRecordRepository {
    records: RwLock<Vec<PayrollRecord>>,
}

impl InMemoryPayrollRecordRepository {
    /// Creates an empty repository.
    pub fn new() -> Self {
        Self::default()
    }
}

impl PayrollRecordRepository for InMemoryPayrollRecordRepository {
    fn get(&self, id: Uuid) -> EngineResult<Option<PayrollRecord>> {
        Ok(read(&self.records)?.iter().find(|r| r.id == id).cloned())
    }

    fn insert(&self, record: &PayrollRecord) -> EngineResult<()> {
        let mut records = write(&self.records)?;
        if records.iter().any(|r| r.id == record.id) {
            return Err(EngineError::conflict(format!(
                "Payroll record {} already exists",
                record.id
            )));
        }
        records.push(record.clone());
        Ok(())
    }

    fn update(&self, expected: PayrollStatus, record: &PayrollRecord) -> EngineResult<()> {
        let mut records = write(&self.records)?;
        let stored = records
            .iter_mut()
            .find(|r| r.id == record.id)
            .ok_or_else(|| EngineError::not_found("payroll record", record.id))?;
        if stored.status != expected {
            return Err(EngineError::conflict(format!(
                "Payroll record {} is {:?}, expected {expected:?}",
                record.id, stored.status
            )));
        }
        *stored = record.clone();
        Ok(())
    }

    fn list_for_period(&self, pay_period_id: Uuid) -> EngineResult<Vec<PayrollRecord>> {
        Ok(read(&self.records)?
            .iter()
            .filter(|r| r.pay_period_id == pay_period_id)
            .cloned()
            .collect())
    }
}
