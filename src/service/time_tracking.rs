//! Time tracking service.
//!
//! Orchestrates the time entry state machine over the storage collaborators:
//! clocking, breaks, manual entries, edits, and the submit/approve/reject
//! workflow. Multi-entry operations are all-or-nothing: every transition is
//! checked before anything is persisted.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::calculation::round_hours;
use crate::config::HourRules;
use crate::error::{EngineError, EngineResult};
use crate::models::{ApprovalStatus, Employee, TimeEntry, TimeEntryStatus, TimeEntryType};
use crate::repository::{EmployeeRepository, ExclusivityRule, TimeEntryQuery, TimeEntryRepository};

use super::validator::{EntryIssue, TimeEntryValidator};

fn now() -> NaiveDateTime {
    Utc::now().naive_utc()
}

/// Request to clock an employee in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClockInRequest {
    /// The employee clocking in.
    pub employee_id: String,
    /// Work date; defaults to the clock-in date.
    #[serde(default)]
    pub work_date: Option<NaiveDate>,
    /// Clock-in time; defaults to now.
    #[serde(default)]
    pub clock_in_time: Option<NaiveDateTime>,
    /// Where the work happens.
    #[serde(default)]
    pub location: Option<String>,
    /// Project code.
    #[serde(default)]
    pub project_code: Option<String>,
    /// Employee notes.
    #[serde(default)]
    pub notes: Option<String>,
}

/// A manually entered time entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTimeEntry {
    /// The employee the entry belongs to.
    pub employee_id: String,
    /// The day worked.
    pub work_date: NaiveDate,
    /// Kind of work.
    #[serde(default)]
    pub entry_type: TimeEntryType,
    /// Clock-in time.
    #[serde(default)]
    pub clock_in_time: Option<NaiveDateTime>,
    /// Clock-out time.
    #[serde(default)]
    pub clock_out_time: Option<NaiveDateTime>,
    /// Break window start.
    #[serde(default)]
    pub break_start_time: Option<NaiveDateTime>,
    /// Break window end.
    #[serde(default)]
    pub break_end_time: Option<NaiveDateTime>,
    /// Lunch window start.
    #[serde(default)]
    pub lunch_start_time: Option<NaiveDateTime>,
    /// Lunch window end.
    #[serde(default)]
    pub lunch_end_time: Option<NaiveDateTime>,
    /// Where the work happened.
    #[serde(default)]
    pub location: Option<String>,
    /// Project code.
    #[serde(default)]
    pub project_code: Option<String>,
    /// Employee notes.
    #[serde(default)]
    pub notes: Option<String>,
    /// Why the entry is being entered by hand.
    #[serde(default)]
    pub manual_entry_reason: Option<String>,
}

/// Partial update to a time entry. Unset fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeEntryUpdate {
    /// New entry type.
    #[serde(default)]
    pub entry_type: Option<TimeEntryType>,
    /// New clock-in time.
    #[serde(default)]
    pub clock_in_time: Option<NaiveDateTime>,
    /// New clock-out time.
    #[serde(default)]
    pub clock_out_time: Option<NaiveDateTime>,
    /// New break window start.
    #[serde(default)]
    pub break_start_time: Option<NaiveDateTime>,
    /// New break window end.
    #[serde(default)]
    pub break_end_time: Option<NaiveDateTime>,
    /// New lunch window start.
    #[serde(default)]
    pub lunch_start_time: Option<NaiveDateTime>,
    /// New lunch window end.
    #[serde(default)]
    pub lunch_end_time: Option<NaiveDateTime>,
    /// New location.
    #[serde(default)]
    pub location: Option<String>,
    /// New project code.
    #[serde(default)]
    pub project_code: Option<String>,
    /// New employee notes.
    #[serde(default)]
    pub notes: Option<String>,
    /// New approver notes.
    #[serde(default)]
    pub admin_notes: Option<String>,
}

impl TimeEntryUpdate {
    fn changes_times(&self) -> bool {
        [
            self.clock_in_time,
            self.clock_out_time,
            self.break_start_time,
            self.break_end_time,
            self.lunch_start_time,
            self.lunch_end_time,
        ]
        .iter()
        .any(Option::is_some)
    }
}

/// Counts and hour totals over a set of time entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeEntryStats {
    /// Entries matched.
    pub total_entries: usize,
    /// Entries awaiting a decision.
    pub pending_approval: usize,
    /// Approved entries.
    pub approved_entries: usize,
    /// Rejected entries.
    pub rejected_entries: usize,
    /// Sum of total hours.
    pub total_hours: Decimal,
    /// Sum of regular hours.
    pub regular_hours: Decimal,
    /// Sum of overtime hours.
    pub overtime_hours: Decimal,
    /// Distinct employees with at least one entry.
    pub employees_with_entries: usize,
}

/// One employee's time over a date range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeTimeReport {
    /// The employee reported on.
    pub employee_id: String,
    /// The employee's name.
    pub employee_name: String,
    /// First day of the range.
    pub start_date: NaiveDate,
    /// Last day of the range.
    pub end_date: NaiveDate,
    /// Entries in the range.
    pub total_entries: usize,
    /// Sum of total hours.
    pub total_hours: Decimal,
    /// Sum of regular hours.
    pub regular_hours: Decimal,
    /// Sum of overtime hours.
    pub overtime_hours: Decimal,
    /// Distinct dates with an entry.
    pub days_worked: usize,
    /// Total hours divided by days worked.
    pub average_hours_per_day: Decimal,
}

/// Drives time entries through their lifecycle.
#[derive(Clone)]
pub struct TimeTrackingService {
    employees: Arc<dyn EmployeeRepository>,
    entries: Arc<dyn TimeEntryRepository>,
    rules: HourRules,
    validator: TimeEntryValidator,
}

impl TimeTrackingService {
    /// Creates a service over the given repositories.
    pub fn new(
        employees: Arc<dyn EmployeeRepository>,
        entries: Arc<dyn TimeEntryRepository>,
        rules: HourRules,
    ) -> Self {
        Self {
            employees,
            entries,
            validator: TimeEntryValidator::new(rules.clone()),
            rules,
        }
    }

    /// Clocks an employee in, creating the day's entry.
    ///
    /// Fails with a state error if the employee already has an open entry on
    /// that work date. The check and insert are atomic.
    pub fn clock_in(&self, request: ClockInRequest) -> EngineResult<TimeEntry> {
        self.active_employee(&request.employee_id)?;

        let at = request.clock_in_time.unwrap_or_else(now);
        let work_date = request.work_date.unwrap_or(at.date());

        let mut entry = TimeEntry::new(request.employee_id, work_date, now());
        entry.location = request.location;
        entry.project_code = request.project_code;
        entry.notes = request.notes;
        entry.clock_in(at)?;

        let entry = self
            .entries
            .insert_exclusive(entry, ExclusivityRule::NoActiveEntry)?;
        info!(
            employee_id = %entry.employee_id,
            entry_id = %entry.id,
            work_date = %entry.work_date,
            "Employee clocked in"
        );
        Ok(entry)
    }

    /// Starts a break, or lunch when `is_lunch` is set.
    pub fn start_break(
        &self,
        entry_id: Uuid,
        at: Option<NaiveDateTime>,
        is_lunch: bool,
    ) -> EngineResult<TimeEntry> {
        let mut entry = self.load(entry_id)?;
        let loaded = entry.status;
        entry.start_break(at.unwrap_or_else(now), is_lunch)?;
        self.entries.update(loaded, &entry)?;
        debug!(entry_id = %entry.id, is_lunch, "Break started");
        Ok(entry)
    }

    /// Ends the open break or lunch.
    pub fn end_break(&self, entry_id: Uuid, at: Option<NaiveDateTime>) -> EngineResult<TimeEntry> {
        let mut entry = self.load(entry_id)?;
        let loaded = entry.status;
        entry.end_break(at.unwrap_or_else(now))?;
        self.entries.update(loaded, &entry)?;
        debug!(entry_id = %entry.id, "Break ended");
        Ok(entry)
    }

    /// Clocks out and derives the entry's hours.
    pub fn clock_out(
        &self,
        entry_id: Uuid,
        at: Option<NaiveDateTime>,
        notes: Option<String>,
    ) -> EngineResult<TimeEntry> {
        let mut entry = self.load(entry_id)?;
        let loaded = entry.status;
        entry.clock_out(at.unwrap_or_else(now), &self.rules)?;
        if notes.is_some() {
            entry.notes = notes;
        }
        self.entries.update(loaded, &entry)?;
        info!(
            employee_id = %entry.employee_id,
            entry_id = %entry.id,
            total_hours = %entry.total_hours,
            "Employee clocked out"
        );
        Ok(entry)
    }

    /// Creates a manual entry. Only one entry per employee and date is
    /// allowed this way; complete entries get their hours computed.
    pub fn create_entry(&self, new: NewTimeEntry) -> EngineResult<TimeEntry> {
        self.active_employee(&new.employee_id)?;

        let mut entry = TimeEntry::new(new.employee_id, new.work_date, now());
        entry.entry_type = new.entry_type;
        entry.clock_in_time = new.clock_in_time;
        entry.clock_out_time = new.clock_out_time;
        entry.break_start_time = new.break_start_time;
        entry.break_end_time = new.break_end_time;
        entry.lunch_start_time = new.lunch_start_time;
        entry.lunch_end_time = new.lunch_end_time;
        entry.location = new.location;
        entry.project_code = new.project_code;
        entry.notes = new.notes;
        entry.is_manual_entry = true;
        entry.manual_entry_reason = new.manual_entry_reason;
        entry.recalculate_hours(&self.rules)?;

        let entry = self
            .entries
            .insert_exclusive(entry, ExclusivityRule::NoEntryOnDate)?;
        info!(
            employee_id = %entry.employee_id,
            entry_id = %entry.id,
            total_hours = %entry.total_hours,
            "Manual time entry created"
        );
        Ok(entry)
    }

    /// Applies a partial update. Approved entries cannot be changed, and
    /// clock or break times can only be edited on draft, clocked-out or
    /// rejected entries.
    pub fn update_entry(&self, entry_id: Uuid, update: TimeEntryUpdate) -> EngineResult<TimeEntry> {
        let mut entry = self.load(entry_id)?;
        if !entry.is_editable() {
            return Err(EngineError::state("Cannot update approved time entry"));
        }

        let recalculate = update.changes_times();
        let loaded = entry.status;
        if recalculate
            && !matches!(
                loaded,
                TimeEntryStatus::Draft | TimeEntryStatus::ClockedOut | TimeEntryStatus::Rejected
            )
        {
            return Err(EngineError::state(format!(
                "Cannot change the times of a time entry that is {loaded}"
            )));
        }
        if let Some(entry_type) = update.entry_type {
            entry.entry_type = entry_type;
        }
        for (slot, value) in [
            (&mut entry.clock_in_time, update.clock_in_time),
            (&mut entry.clock_out_time, update.clock_out_time),
            (&mut entry.break_start_time, update.break_start_time),
            (&mut entry.break_end_time, update.break_end_time),
            (&mut entry.lunch_start_time, update.lunch_start_time),
            (&mut entry.lunch_end_time, update.lunch_end_time),
        ] {
            if value.is_some() {
                *slot = value;
            }
        }
        for (slot, value) in [
            (&mut entry.location, update.location),
            (&mut entry.project_code, update.project_code),
            (&mut entry.notes, update.notes),
            (&mut entry.admin_notes, update.admin_notes),
        ] {
            if value.is_some() {
                *slot = value;
            }
        }

        if recalculate {
            entry.recalculate_hours(&self.rules)?;
        }
        entry.updated_at = now();

        self.entries.update(loaded, &entry)?;
        debug!(entry_id = %entry.id, recalculated = recalculate, "Time entry updated");
        Ok(entry)
    }

    /// Deletes an entry. Approved entries cannot be deleted.
    pub fn delete_entry(&self, entry_id: Uuid) -> EngineResult<()> {
        let entry = self.load(entry_id)?;
        if !entry.is_editable() {
            return Err(EngineError::state("Cannot delete approved time entry"));
        }
        if !self.entries.delete(entry_id, entry.status)? {
            return Err(EngineError::not_found("time entry", entry_id));
        }
        info!(entry_id = %entry_id, "Time entry deleted");
        Ok(())
    }

    /// Submits entries for approval, all or none.
    pub fn submit_for_approval(&self, entry_ids: &[Uuid]) -> EngineResult<Vec<TimeEntry>> {
        let at = now();
        let entries = self.transition_all(entry_ids, |entry| entry.submit_for_approval(at))?;
        info!(count = entries.len(), "Time entries submitted for approval");
        Ok(entries)
    }

    /// Approves submitted entries, all or none.
    pub fn approve(
        &self,
        entry_ids: &[Uuid],
        approver_id: &str,
        notes: Option<String>,
    ) -> EngineResult<Vec<TimeEntry>> {
        let at = now();
        let entries = self.transition_all(entry_ids, |entry| {
            entry.approve(approver_id, at, notes.clone())
        })?;
        info!(approver_id, count = entries.len(), "Time entries approved");
        Ok(entries)
    }

    /// Rejects submitted entries, all or none. A reason is required.
    pub fn reject(
        &self,
        entry_ids: &[Uuid],
        approver_id: &str,
        reason: &str,
    ) -> EngineResult<Vec<TimeEntry>> {
        if reason.trim().is_empty() {
            return Err(EngineError::validation("Rejection reason is required"));
        }
        let at = now();
        let entries = self.transition_all(entry_ids, |entry| entry.reject(approver_id, at, reason))?;
        info!(approver_id, count = entries.len(), "Time entries rejected");
        Ok(entries)
    }

    /// The employee's open (clocked-in or on-break) entry, if any.
    pub fn current_entry(&self, employee_id: &str) -> EngineResult<Option<TimeEntry>> {
        self.entries.find_active(employee_id)
    }

    /// Submitted entries of the manager's direct reports, newest work date first.
    pub fn pending_approvals(&self, manager_id: &str) -> EngineResult<Vec<TimeEntry>> {
        let employee_ids: Vec<String> = self
            .employees
            .list_by_manager(manager_id)?
            .into_iter()
            .map(|e| e.id)
            .collect();
        if employee_ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut entries = self.entries.find(&TimeEntryQuery {
            employee_ids: Some(employee_ids),
            status: Some(TimeEntryStatus::Submitted),
            ..Default::default()
        })?;
        entries.reverse();
        Ok(entries)
    }

    /// Counts and hour totals for entries matching the query.
    pub fn stats(&self, query: &TimeEntryQuery) -> EngineResult<TimeEntryStats> {
        let entries = self.entries.find(query)?;
        let count = |status: ApprovalStatus| {
            entries
                .iter()
                .filter(|e| e.approval_status == status)
                .count()
        };

        Ok(TimeEntryStats {
            total_entries: entries.len(),
            pending_approval: count(ApprovalStatus::Pending),
            approved_entries: count(ApprovalStatus::Approved),
            rejected_entries: count(ApprovalStatus::Rejected),
            total_hours: entries.iter().map(|e| e.total_hours).sum(),
            regular_hours: entries.iter().map(|e| e.regular_hours).sum(),
            overtime_hours: entries.iter().map(|e| e.overtime_hours).sum(),
            employees_with_entries: entries
                .iter()
                .map(|e| e.employee_id.as_str())
                .collect::<HashSet<_>>()
                .len(),
        })
    }

    /// Totals and per-day average for one employee over a date range.
    pub fn employee_report(
        &self,
        employee_id: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> EngineResult<EmployeeTimeReport> {
        if end_date < start_date {
            return Err(EngineError::validation(
                "Report end date must not be before start date",
            ));
        }
        let employee = self.employee(employee_id)?;
        let entries = self.entries.find(&TimeEntryQuery {
            employee_id: Some(employee_id.to_string()),
            start_date: Some(start_date),
            end_date: Some(end_date),
            ..Default::default()
        })?;

        let total_hours: Decimal = entries.iter().map(|e| e.total_hours).sum();
        let days_worked = entries
            .iter()
            .map(|e| e.work_date)
            .collect::<HashSet<_>>()
            .len();
        let average_hours_per_day = if days_worked > 0 {
            round_hours(total_hours / Decimal::from(days_worked))
        } else {
            Decimal::ZERO
        };

        Ok(EmployeeTimeReport {
            employee_id: employee.id,
            employee_name: employee.name,
            start_date,
            end_date,
            total_entries: entries.len(),
            total_hours,
            regular_hours: entries.iter().map(|e| e.regular_hours).sum(),
            overtime_hours: entries.iter().map(|e| e.overtime_hours).sum(),
            days_worked,
            average_hours_per_day,
        })
    }

    /// Validates a stored entry against the other entries of its day.
    pub fn validate_entry(&self, entry_id: Uuid) -> EngineResult<Vec<EntryIssue>> {
        let entry = self.load(entry_id)?;
        let same_day = self.entries.find_for_day(&entry.employee_id, entry.work_date)?;
        Ok(self.validator.validate(&entry, &same_day))
    }

    fn load(&self, entry_id: Uuid) -> EngineResult<TimeEntry> {
        self.entries
            .get(entry_id)?
            .ok_or_else(|| EngineError::not_found("time entry", entry_id))
    }

    fn employee(&self, employee_id: &str) -> EngineResult<Employee> {
        self.employees
            .get(employee_id)?
            .ok_or_else(|| EngineError::not_found("employee", employee_id))
    }

    fn active_employee(&self, employee_id: &str) -> EngineResult<Employee> {
        let employee = self.employee(employee_id)?;
        if !employee.is_active() {
            return Err(EngineError::state(format!(
                "Employee {employee_id} is not active"
            )));
        }
        Ok(employee)
    }

    /// Loads every entry, applies `transition` to each, and persists only if
    /// all of them succeeded and none changed status in the meantime.
    fn transition_all<F>(&self, entry_ids: &[Uuid], mut transition: F) -> EngineResult<Vec<TimeEntry>>
    where
        F: FnMut(&mut TimeEntry) -> EngineResult<()>,
    {
        if entry_ids.is_empty() {
            return Err(EngineError::validation("At least one time entry is required"));
        }

        let mut seen = HashSet::new();
        let mut updates = Vec::with_capacity(entry_ids.len());
        for &id in entry_ids.iter().filter(|id| seen.insert(**id)) {
            let mut entry = self.load(id)?;
            let loaded = entry.status;
            if let Err(err) = transition(&mut entry) {
                warn!(entry_id = %id, error = %err, "Time entry transition rejected");
                return Err(err);
            }
            updates.push((loaded, entry));
        }

        self.entries.update_all(&updates)?;
        Ok(updates.into_iter().map(|(_, entry)| entry).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BenefitEnrollment, EmployeeStatus, PayrollFrequency};
    use crate::repository::{InMemoryEmployeeRepository, InMemoryTimeEntryRepository};
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn at(d: u32, hour: u32, minute: u32) -> NaiveDateTime {
        day(d).and_hms_opt(hour, minute, 0).unwrap()
    }

    fn employee(id: &str, status: EmployeeStatus) -> Employee {
        Employee {
            id: id.to_string(),
            name: format!("Employee {id}"),
            status,
            manager_id: Some("mgr_001".to_string()),
            salary: None,
            hourly_rate: Some(dec("25")),
            payroll_frequency: PayrollFrequency::Biweekly,
            overtime_multiplier: None,
            federal_allowances: 0,
            state_allowances: 0,
            additional_federal_withholding: Decimal::ZERO,
            additional_state_withholding: Decimal::ZERO,
            benefits: BenefitEnrollment::default(),
        }
    }

    fn create_service() -> (TimeTrackingService, Arc<InMemoryTimeEntryRepository>) {
        let employees = Arc::new(InMemoryEmployeeRepository::with_employees([
            employee("emp_001", EmployeeStatus::Active),
            employee("emp_002", EmployeeStatus::Active),
            employee("emp_003", EmployeeStatus::Terminated),
        ]));
        let entries = Arc::new(InMemoryTimeEntryRepository::new());
        let service = TimeTrackingService::new(employees, entries.clone(), HourRules::default());
        (service, entries)
    }

    fn clock_in_request(employee_id: &str, time: NaiveDateTime) -> ClockInRequest {
        ClockInRequest {
            employee_id: employee_id.to_string(),
            clock_in_time: Some(time),
            ..Default::default()
        }
    }

    fn worked_day(service: &TimeTrackingService, employee_id: &str, d: u32, end_hour: u32) -> TimeEntry {
        let entry = service.clock_in(clock_in_request(employee_id, at(d, 8, 0))).unwrap();
        service
            .clock_out(entry.id, Some(at(d, end_hour, 0)), None)
            .unwrap()
    }

    fn manual_entry(employee_id: &str, d: u32) -> NewTimeEntry {
        NewTimeEntry {
            employee_id: employee_id.to_string(),
            work_date: day(d),
            entry_type: TimeEntryType::Regular,
            clock_in_time: Some(at(d, 9, 0)),
            clock_out_time: Some(at(d, 17, 30)),
            break_start_time: None,
            break_end_time: None,
            lunch_start_time: Some(at(d, 12, 0)),
            lunch_end_time: Some(at(d, 12, 30)),
            location: None,
            project_code: Some("PRJ-7".to_string()),
            notes: None,
            manual_entry_reason: Some("Forgot to clock in".to_string()),
        }
    }

    #[test]
    fn test_clock_in_persists_entry() {
        let (service, repo) = create_service();
        let entry = service
            .clock_in(clock_in_request("emp_001", at(15, 8, 0)))
            .unwrap();
        assert_eq!(entry.work_date, day(15));
        assert_eq!(entry.status, TimeEntryStatus::ClockedIn);
        assert_eq!(repo.get(entry.id).unwrap(), Some(entry));
    }

    #[test]
    fn test_clock_in_twice_same_day_is_state_error() {
        let (service, repo) = create_service();
        service
            .clock_in(clock_in_request("emp_001", at(15, 8, 0)))
            .unwrap();
        let err = service
            .clock_in(clock_in_request("emp_001", at(15, 9, 0)))
            .unwrap_err();
        assert!(matches!(err, EngineError::State { .. }));
        assert!(err.to_string().contains("already clocked in"));
        assert_eq!(repo.len().unwrap(), 1);
    }

    #[test]
    fn test_clock_in_unknown_employee() {
        let (service, _) = create_service();
        let err = service
            .clock_in(clock_in_request("emp_404", at(15, 8, 0)))
            .unwrap_err();
        assert!(matches!(err, EngineError::NotFound { .. }));
    }

    #[test]
    fn test_clock_in_inactive_employee() {
        let (service, _) = create_service();
        let err = service
            .clock_in(clock_in_request("emp_003", at(15, 8, 0)))
            .unwrap_err();
        assert!(matches!(err, EngineError::State { .. }));
    }

    #[test]
    fn test_full_day_with_break() {
        let (service, repo) = create_service();
        let entry = service
            .clock_in(clock_in_request("emp_001", at(15, 8, 0)))
            .unwrap();
        service.start_break(entry.id, Some(at(15, 12, 0)), true).unwrap();
        service.end_break(entry.id, Some(at(15, 13, 0))).unwrap();
        let entry = service
            .clock_out(entry.id, Some(at(15, 19, 0)), Some("Inventory".to_string()))
            .unwrap();

        assert_eq!(entry.total_hours, dec("10"));
        assert_eq!(entry.regular_hours, dec("8"));
        assert_eq!(entry.overtime_hours, dec("2"));
        assert_eq!(entry.notes.as_deref(), Some("Inventory"));
        assert_eq!(repo.get(entry.id).unwrap().unwrap().total_hours, dec("10"));
        assert!(service.current_entry("emp_001").unwrap().is_none());
    }

    #[test]
    fn test_current_entry_while_clocked_in() {
        let (service, _) = create_service();
        let entry = service
            .clock_in(clock_in_request("emp_001", at(15, 8, 0)))
            .unwrap();
        assert_eq!(
            service.current_entry("emp_001").unwrap().map(|e| e.id),
            Some(entry.id)
        );
    }

    #[test]
    fn test_failed_transition_not_persisted() {
        let (service, repo) = create_service();
        let entry = service
            .clock_in(clock_in_request("emp_001", at(15, 8, 0)))
            .unwrap();
        let err = service.end_break(entry.id, Some(at(15, 9, 0))).unwrap_err();
        assert!(matches!(err, EngineError::State { .. }));
        assert_eq!(repo.get(entry.id).unwrap(), Some(entry));
    }

    #[test]
    fn test_create_manual_entry_computes_hours() {
        let (service, _) = create_service();
        let entry = service.create_entry(manual_entry("emp_001", 16)).unwrap();
        assert!(entry.is_manual_entry);
        assert_eq!(entry.status, TimeEntryStatus::Draft);
        assert_eq!(entry.lunch_duration_minutes, 30);
        assert_eq!(entry.total_hours, dec("8"));
    }

    #[test]
    fn test_create_duplicate_entry_is_conflict() {
        let (service, _) = create_service();
        service.create_entry(manual_entry("emp_001", 16)).unwrap();
        let err = service.create_entry(manual_entry("emp_001", 16)).unwrap_err();
        assert_eq!(
            err,
            EngineError::conflict("Time entry already exists for this employee on this date")
        );
    }

    #[test]
    fn test_create_entry_with_inverted_times() {
        let (service, _) = create_service();
        let mut new = manual_entry("emp_001", 16);
        new.clock_out_time = Some(at(16, 8, 0));
        let err = service.create_entry(new).unwrap_err();
        assert!(matches!(err, EngineError::Validation { .. }));
    }

    #[test]
    fn test_update_recalculates_hours() {
        let (service, _) = create_service();
        let entry = service.create_entry(manual_entry("emp_001", 16)).unwrap();
        let updated = service
            .update_entry(
                entry.id,
                TimeEntryUpdate {
                    clock_out_time: Some(at(16, 22, 0)),
                    notes: Some("Late shift".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.total_hours, dec("12.5"));
        assert_eq!(updated.overtime_hours, dec("4"));
        assert_eq!(updated.double_time_hours, dec("0.5"));
        assert_eq!(updated.notes.as_deref(), Some("Late shift"));
    }

    #[test]
    fn test_approved_entry_cannot_be_updated_or_deleted() {
        let (service, _) = create_service();
        let entry = worked_day(&service, "emp_001", 15, 16);
        service.submit_for_approval(&[entry.id]).unwrap();
        service.approve(&[entry.id], "mgr_001", None).unwrap();

        let err = service
            .update_entry(entry.id, TimeEntryUpdate::default())
            .unwrap_err();
        assert_eq!(err, EngineError::state("Cannot update approved time entry"));
        let err = service.delete_entry(entry.id).unwrap_err();
        assert!(matches!(err, EngineError::State { .. }));
    }

    #[test]
    fn test_time_edits_refused_while_clocked_in() {
        let (service, repo) = create_service();
        let entry = service
            .clock_in(clock_in_request("emp_001", at(15, 8, 0)))
            .unwrap();

        let err = service
            .update_entry(
                entry.id,
                TimeEntryUpdate {
                    clock_out_time: Some(at(15, 17, 0)),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert_eq!(
            err,
            EngineError::state("Cannot change the times of a time entry that is clocked_in")
        );
        assert_eq!(repo.get(entry.id).unwrap(), Some(entry.clone()));

        let noted = service
            .update_entry(
                entry.id,
                TimeEntryUpdate {
                    notes: Some("On site".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(noted.status, TimeEntryStatus::ClockedIn);
        assert!(noted.clock_out_time.is_none());
    }

    #[test]
    fn test_time_edits_refused_while_submitted() {
        let (service, repo) = create_service();
        let entry = worked_day(&service, "emp_001", 15, 16);
        service.submit_for_approval(&[entry.id]).unwrap();

        let err = service
            .update_entry(
                entry.id,
                TimeEntryUpdate {
                    clock_in_time: Some(at(15, 6, 0)),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, EngineError::State { .. }));
        assert_eq!(
            repo.get(entry.id).unwrap().unwrap().clock_in_time,
            Some(at(15, 8, 0))
        );
    }

    #[test]
    fn test_racing_note_edit_never_reverts_approval() {
        let (service, repo) = create_service();
        let entries: Vec<TimeEntry> = (1..=20)
            .map(|d| worked_day(&service, "emp_001", d, 16))
            .collect();
        let ids: Vec<Uuid> = entries.iter().map(|e| e.id).collect();
        service.submit_for_approval(&ids).unwrap();

        std::thread::scope(|scope| {
            for &id in &ids {
                let (approver, editor) = (service.clone(), service.clone());
                scope.spawn(move || approver.approve(&[id], "mgr_001", None).unwrap());
                scope.spawn(move || {
                    let _ = editor.update_entry(
                        id,
                        TimeEntryUpdate {
                            notes: Some("Edited".to_string()),
                            ..Default::default()
                        },
                    );
                });
            }
        });

        for id in ids {
            let stored = repo.get(id).unwrap().unwrap();
            assert_eq!(stored.status, TimeEntryStatus::Approved);
            assert_eq!(stored.approval_status, ApprovalStatus::Approved);
        }
    }

    #[test]
    fn test_racing_delete_and_approve_admit_one() {
        let (service, repo) = create_service();
        let entry = worked_day(&service, "emp_001", 15, 16);
        service.submit_for_approval(&[entry.id]).unwrap();

        let (deleted, approved) = std::thread::scope(|scope| {
            let delete = scope.spawn(|| service.delete_entry(entry.id));
            let approve = scope.spawn(|| service.approve(&[entry.id], "mgr_001", None));
            (delete.join().unwrap(), approve.join().unwrap())
        });

        assert!(deleted.is_ok() != approved.is_ok());
        let stored = repo.get(entry.id).unwrap();
        if approved.is_ok() {
            assert_eq!(stored.map(|e| e.status), Some(TimeEntryStatus::Approved));
        } else {
            assert!(stored.is_none());
        }
    }

    #[test]
    fn test_delete_entry() {
        let (service, repo) = create_service();
        let entry = service.create_entry(manual_entry("emp_001", 16)).unwrap();
        service.delete_entry(entry.id).unwrap();
        assert!(repo.is_empty().unwrap());
        assert!(matches!(
            service.delete_entry(entry.id),
            Err(EngineError::NotFound { .. })
        ));
    }

    #[test]
    fn test_submit_is_all_or_nothing() {
        let (service, repo) = create_service();
        let complete = worked_day(&service, "emp_001", 15, 16);
        let open = service
            .clock_in(clock_in_request("emp_002", at(15, 8, 0)))
            .unwrap();

        let err = service
            .submit_for_approval(&[complete.id, open.id])
            .unwrap_err();
        assert_eq!(
            err,
            EngineError::state("Time entry must be complete before submission")
        );
        assert_eq!(
            repo.get(complete.id).unwrap().unwrap().status,
            TimeEntryStatus::ClockedOut
        );
    }

    #[test]
    fn test_submit_unknown_id_is_not_found() {
        let (service, repo) = create_service();
        let complete = worked_day(&service, "emp_001", 15, 16);
        let err = service
            .submit_for_approval(&[complete.id, Uuid::new_v4()])
            .unwrap_err();
        assert!(matches!(err, EngineError::NotFound { .. }));
        assert_eq!(
            repo.get(complete.id).unwrap().unwrap().status,
            TimeEntryStatus::ClockedOut
        );
    }

    #[test]
    fn test_reject_requires_reason() {
        let (service, _) = create_service();
        let entry = worked_day(&service, "emp_001", 15, 16);
        service.submit_for_approval(&[entry.id]).unwrap();
        let err = service.reject(&[entry.id], "mgr_001", "").unwrap_err();
        assert!(matches!(err, EngineError::Validation { .. }));

        let rejected = service
            .reject(&[entry.id], "mgr_001", "Wrong project")
            .unwrap();
        assert_eq!(rejected[0].approval_status, ApprovalStatus::Rejected);
    }

    #[test]
    fn test_pending_approvals_for_manager() {
        let (service, _) = create_service();
        let first = worked_day(&service, "emp_001", 15, 16);
        let second = worked_day(&service, "emp_002", 16, 16);
        worked_day(&service, "emp_001", 17, 16);
        service
            .submit_for_approval(&[first.id, second.id])
            .unwrap();

        let pending = service.pending_approvals("mgr_001").unwrap();
        let ids: Vec<Uuid> = pending.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![second.id, first.id]);
        assert!(service.pending_approvals("mgr_999").unwrap().is_empty());
    }

    #[test]
    fn test_stats_and_report() {
        let (service, _) = create_service();
        let first = worked_day(&service, "emp_001", 15, 16);
        worked_day(&service, "emp_001", 16, 18);
        worked_day(&service, "emp_002", 16, 15);
        service.submit_for_approval(&[first.id]).unwrap();
        service.approve(&[first.id], "mgr_001", None).unwrap();

        let stats = service.stats(&TimeEntryQuery::default()).unwrap();
        assert_eq!(stats.total_entries, 3);
        assert_eq!(stats.approved_entries, 1);
        assert_eq!(stats.pending_approval, 2);
        assert_eq!(stats.total_hours, dec("25"));
        assert_eq!(stats.overtime_hours, dec("2"));
        assert_eq!(stats.employees_with_entries, 2);

        let report = service.employee_report("emp_001", day(1), day(31)).unwrap();
        assert_eq!(report.total_entries, 2);
        assert_eq!(report.days_worked, 2);
        assert_eq!(report.total_hours, dec("18"));
        assert_eq!(report.average_hours_per_day, dec("9"));
        assert_eq!(report.employee_name, "Employee emp_001");
    }

    #[test]
    fn test_validate_entry_reports_overlap() {
        let (service, _) = create_service();
        let first = worked_day(&service, "emp_001", 15, 12);
        worked_day(&service, "emp_001", 15, 17);
        let issues = service.validate_entry(first.id).unwrap();
        assert_eq!(issues, vec![EntryIssue::OverlappingEntry]);
    }
}
