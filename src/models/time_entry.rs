//! Time entry model and its clock/approval state machine.
//!
//! A [`TimeEntry`] records one employee's work day. It moves through
//! `Draft -> ClockedIn <-> OnBreak -> ClockedOut -> Submitted -> Approved | Rejected`
//! and derives its regular, overtime and double-time hours on clock-out.
//!
//! Transition methods take explicit timestamps; callers that want "now"
//! resolve it themselves.

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::calculation::{minutes_to_hours, tier_daily_hours};
use crate::config::HourRules;
use crate::error::{EngineError, EngineResult};

/// Lifecycle state of a time entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeEntryStatus {
    /// Created but not yet clocked in, or entered manually.
    Draft,
    /// Clocked in and working.
    ClockedIn,
    /// Clocked in with a break or lunch window open.
    OnBreak,
    /// Clocked out; hours are derived.
    ClockedOut,
    /// Awaiting approval.
    Submitted,
    /// Approved for payroll.
    Approved,
    /// Rejected by an approver.
    Rejected,
}

impl TimeEntryStatus {
    /// Returns the snake_case name of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::ClockedIn => "clocked_in",
            Self::OnBreak => "on_break",
            Self::ClockedOut => "clocked_out",
            Self::Submitted => "submitted",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    /// Returns true while the employee is on the clock.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::ClockedIn | Self::OnBreak)
    }
}

impl fmt::Display for TimeEntryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Approval state of a time entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalStatus {
    /// Not yet decided.
    #[default]
    Pending,
    /// Approved; the entry may feed payroll.
    Approved,
    /// Rejected; the entry may be edited and resubmitted.
    Rejected,
}

/// Kind of work recorded by a time entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeEntryType {
    /// Ordinary work.
    #[default]
    Regular,
    /// Pre-arranged overtime.
    Overtime,
    /// Pre-arranged double time.
    DoubleTime,
    /// Holiday work.
    Holiday,
    /// Sick leave.
    Sick,
    /// Vacation leave.
    Vacation,
    /// Training.
    Training,
    /// Meetings.
    Meeting,
    /// Travel.
    Travel,
    /// Anything else.
    Other,
}

/// One employee's work day.
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use payroll_engine::config::HourRules;
/// use payroll_engine::models::{TimeEntry, TimeEntryStatus};
/// use rust_decimal::Decimal;
///
/// let day = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
/// let at = |h, m| day.and_hms_opt(h, m, 0).unwrap();
///
/// let mut entry = TimeEntry::new("emp_001", day, at(8, 0));
/// entry.clock_in(at(8, 0)).unwrap();
/// entry.start_break(at(12, 0), true).unwrap();
/// entry.end_break(at(12, 30)).unwrap();
/// entry.clock_out(at(19, 0), &HourRules::default()).unwrap();
///
/// assert_eq!(entry.status, TimeEntryStatus::ClockedOut);
/// assert_eq!(entry.total_hours, Decimal::new(105, 1));
/// assert_eq!(entry.regular_hours, Decimal::from(8));
/// assert_eq!(entry.overtime_hours, Decimal::new(25, 1));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeEntry {
    /// Unique identifier for the entry.
    pub id: Uuid,
    /// The employee the entry belongs to.
    pub employee_id: String,
    /// The day worked.
    pub work_date: NaiveDate,
    /// Kind of work recorded.
    pub entry_type: TimeEntryType,
    /// Lifecycle state.
    pub status: TimeEntryStatus,
    /// Approval state.
    pub approval_status: ApprovalStatus,
    /// When the employee clocked in.
    pub clock_in_time: Option<NaiveDateTime>,
    /// When the employee clocked out.
    pub clock_out_time: Option<NaiveDateTime>,
    /// Start of the short break window.
    pub break_start_time: Option<NaiveDateTime>,
    /// End of the short break window.
    pub break_end_time: Option<NaiveDateTime>,
    /// Start of the lunch window.
    pub lunch_start_time: Option<NaiveDateTime>,
    /// End of the lunch window.
    pub lunch_end_time: Option<NaiveDateTime>,
    /// Hours worked, net of breaks.
    pub total_hours: Decimal,
    /// Hours in the regular tier.
    pub regular_hours: Decimal,
    /// Hours in the overtime tier.
    pub overtime_hours: Decimal,
    /// Hours in the double-time tier.
    pub double_time_hours: Decimal,
    /// Length of the closed break window in minutes.
    pub break_duration_minutes: i64,
    /// Length of the closed lunch window in minutes.
    pub lunch_duration_minutes: i64,
    /// True if the entry was created by hand rather than by clocking.
    pub is_manual_entry: bool,
    /// Why a manual entry was needed.
    pub manual_entry_reason: Option<String>,
    /// Where the work happened.
    pub location: Option<String>,
    /// Project the time is booked against.
    pub project_code: Option<String>,
    /// Employee notes.
    pub notes: Option<String>,
    /// Approver notes.
    pub admin_notes: Option<String>,
    /// Who approved or rejected the entry.
    pub approved_by: Option<String>,
    /// When the entry was approved or rejected.
    pub approved_at: Option<NaiveDateTime>,
    /// Why the entry was rejected.
    pub rejection_reason: Option<String>,
    /// When the entry was last submitted.
    pub submitted_at: Option<NaiveDateTime>,
    /// When the entry was created.
    pub created_at: NaiveDateTime,
    /// When the entry was last changed.
    pub updated_at: NaiveDateTime,
}

impl TimeEntry {
    /// Creates an empty draft entry for an employee's work day.
    pub fn new(employee_id: impl Into<String>, work_date: NaiveDate, now: NaiveDateTime) -> Self {
        Self {
            id: Uuid::new_v4(),
            employee_id: employee_id.into(),
            work_date,
            entry_type: TimeEntryType::Regular,
            status: TimeEntryStatus::Draft,
            approval_status: ApprovalStatus::Pending,
            clock_in_time: None,
            clock_out_time: None,
            break_start_time: None,
            break_end_time: None,
            lunch_start_time: None,
            lunch_end_time: None,
            total_hours: Decimal::ZERO,
            regular_hours: Decimal::ZERO,
            overtime_hours: Decimal::ZERO,
            double_time_hours: Decimal::ZERO,
            break_duration_minutes: 0,
            lunch_duration_minutes: 0,
            is_manual_entry: false,
            manual_entry_reason: None,
            location: None,
            project_code: None,
            notes: None,
            admin_notes: None,
            approved_by: None,
            approved_at: None,
            rejection_reason: None,
            submitted_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns true while clocked in and not yet clocked out.
    pub fn is_clocked_in(&self) -> bool {
        self.clock_in_time.is_some() && self.clock_out_time.is_none()
    }

    /// Returns true while a break or lunch window is open.
    pub fn is_on_break(&self) -> bool {
        self.status == TimeEntryStatus::OnBreak
    }

    /// Returns true once both clock times are recorded.
    pub fn is_complete(&self) -> bool {
        self.clock_in_time.is_some() && self.clock_out_time.is_some()
    }

    /// Returns true unless the entry has been approved.
    pub fn is_editable(&self) -> bool {
        self.approval_status != ApprovalStatus::Approved
    }

    /// Returns true if the entry may feed payroll.
    pub fn is_valid_for_payroll(&self) -> bool {
        self.approval_status == ApprovalStatus::Approved
            && self.is_complete()
            && self.total_hours > Decimal::ZERO
    }

    /// Minutes between clock-in and clock-out, net of breaks.
    ///
    /// Returns `None` until the entry is complete.
    pub fn worked_duration_minutes(&self) -> Option<i64> {
        let (clock_in, clock_out) = (self.clock_in_time?, self.clock_out_time?);
        let elapsed = (clock_out - clock_in).num_minutes();
        Some((elapsed - self.break_duration_minutes - self.lunch_duration_minutes).max(0))
    }

    /// Worked duration in hours, rounded to hundredths.
    pub fn worked_duration_hours(&self) -> Option<Decimal> {
        self.worked_duration_minutes().map(minutes_to_hours)
    }

    /// Clocks the employee in.
    pub fn clock_in(&mut self, at: NaiveDateTime) -> EngineResult<()> {
        match self.status {
            TimeEntryStatus::Draft if self.clock_in_time.is_none() => {}
            TimeEntryStatus::ClockedIn | TimeEntryStatus::OnBreak => {
                return Err(EngineError::state("Employee is already clocked in"));
            }
            status => {
                return Err(EngineError::state(format!(
                    "Cannot clock in on a time entry that is {status}"
                )));
            }
        }

        self.clock_in_time = Some(at);
        self.status = TimeEntryStatus::ClockedIn;
        self.updated_at = at;
        Ok(())
    }

    /// Opens a break window, or the lunch window when `is_lunch` is set.
    ///
    /// Each window can be used once per entry.
    pub fn start_break(&mut self, at: NaiveDateTime, is_lunch: bool) -> EngineResult<()> {
        match self.status {
            TimeEntryStatus::ClockedIn => {}
            TimeEntryStatus::OnBreak => {
                return Err(EngineError::state("Employee is already on break"));
            }
            _ => {
                return Err(EngineError::state(
                    "Employee must be clocked in to start break",
                ));
            }
        }

        let (window, label) = if is_lunch {
            (&mut self.lunch_start_time, "Lunch")
        } else {
            (&mut self.break_start_time, "Break")
        };
        if window.is_some() {
            return Err(EngineError::state(format!(
                "{label} has already been taken for this time entry"
            )));
        }
        if self.clock_in_time.is_some_and(|clock_in| at < clock_in) {
            return Err(EngineError::validation(format!(
                "{label} cannot start before clock in time"
            )));
        }

        *window = Some(at);
        self.status = TimeEntryStatus::OnBreak;
        self.updated_at = at;
        Ok(())
    }

    /// Closes the open window. The break window is closed before the lunch
    /// window if both are somehow open.
    pub fn end_break(&mut self, at: NaiveDateTime) -> EngineResult<()> {
        if self.status != TimeEntryStatus::OnBreak {
            return Err(EngineError::state("Employee is not on break"));
        }

        let (start, end, label) = if self.break_start_time.is_some() && self.break_end_time.is_none()
        {
            (self.break_start_time, &mut self.break_end_time, "Break")
        } else if self.lunch_start_time.is_some() && self.lunch_end_time.is_none() {
            (self.lunch_start_time, &mut self.lunch_end_time, "Lunch")
        } else {
            return Err(EngineError::state("Employee is not on break"));
        };

        if start.is_some_and(|start| at <= start) {
            return Err(EngineError::validation(format!(
                "{label} end time must be after {} start time",
                label.to_lowercase()
            )));
        }

        *end = Some(at);
        self.status = TimeEntryStatus::ClockedIn;
        self.updated_at = at;
        Ok(())
    }

    /// Clocks the employee out and derives break durations and hour tiers.
    pub fn clock_out(&mut self, at: NaiveDateTime, rules: &HourRules) -> EngineResult<()> {
        match self.status {
            TimeEntryStatus::ClockedIn => {}
            TimeEntryStatus::OnBreak => {
                return Err(EngineError::state(
                    "Employee must end break before clocking out",
                ));
            }
            _ => return Err(EngineError::state("Employee is not clocked in")),
        }
        if self.clock_in_time.is_some_and(|clock_in| at <= clock_in) {
            return Err(EngineError::validation(
                "Clock out time must be after clock in time",
            ));
        }

        let mut closed = self.clone();
        closed.clock_out_time = Some(at);
        closed.recalculate_hours(rules)?;
        closed.status = TimeEntryStatus::ClockedOut;
        closed.updated_at = at;
        *self = closed;
        Ok(())
    }

    /// Recomputes break durations and hour tiers from the recorded times.
    ///
    /// Incomplete entries are reset to zero hours.
    pub fn recalculate_hours(&mut self, rules: &HourRules) -> EngineResult<()> {
        self.check_chronology()?;

        self.break_duration_minutes = window_minutes(self.break_start_time, self.break_end_time);
        self.lunch_duration_minutes = window_minutes(self.lunch_start_time, self.lunch_end_time);

        let worked = self.worked_duration_hours().unwrap_or(Decimal::ZERO);
        let tiers = tier_daily_hours(
            worked,
            rules.regular_hours_limit,
            rules.overtime_hours_limit,
        );

        self.total_hours = tiers.total_hours();
        self.regular_hours = tiers.regular_hours;
        self.overtime_hours = tiers.overtime_hours;
        self.double_time_hours = tiers.double_time_hours;
        Ok(())
    }

    /// Submits a complete entry for approval.
    ///
    /// Rejected entries may be resubmitted; the previous rejection is cleared.
    pub fn submit_for_approval(&mut self, at: NaiveDateTime) -> EngineResult<()> {
        if !self.is_complete() {
            return Err(EngineError::state(
                "Time entry must be complete before submission",
            ));
        }
        match self.status {
            TimeEntryStatus::Draft | TimeEntryStatus::ClockedOut | TimeEntryStatus::Rejected => {}
            status => {
                return Err(EngineError::state(format!(
                    "Cannot submit a time entry that is {status}"
                )));
            }
        }

        self.status = TimeEntryStatus::Submitted;
        self.approval_status = ApprovalStatus::Pending;
        self.submitted_at = Some(at);
        self.approved_by = None;
        self.approved_at = None;
        self.rejection_reason = None;
        self.updated_at = at;
        Ok(())
    }

    /// Approves a submitted entry.
    pub fn approve(
        &mut self,
        approver_id: &str,
        at: NaiveDateTime,
        notes: Option<String>,
    ) -> EngineResult<()> {
        self.require_submitted("approved")?;

        self.status = TimeEntryStatus::Approved;
        self.approval_status = ApprovalStatus::Approved;
        self.approved_by = Some(approver_id.to_string());
        self.approved_at = Some(at);
        if notes.is_some() {
            self.admin_notes = notes;
        }
        self.updated_at = at;
        Ok(())
    }

    /// Rejects a submitted entry. A non-blank reason is required.
    pub fn reject(&mut self, approver_id: &str, at: NaiveDateTime, reason: &str) -> EngineResult<()> {
        if reason.trim().is_empty() {
            return Err(EngineError::validation("Rejection reason is required"));
        }
        self.require_submitted("rejected")?;

        self.status = TimeEntryStatus::Rejected;
        self.approval_status = ApprovalStatus::Rejected;
        self.approved_by = Some(approver_id.to_string());
        self.approved_at = Some(at);
        self.rejection_reason = Some(reason.trim().to_string());
        self.updated_at = at;
        Ok(())
    }

    /// Returns a read-only view with derived flags.
    pub fn snapshot(&self) -> TimeEntrySnapshot {
        TimeEntrySnapshot {
            is_clocked_in: self.is_clocked_in(),
            is_on_break: self.is_on_break(),
            is_complete: self.is_complete(),
            worked_duration_hours: self.worked_duration_hours(),
            entry: self.clone(),
        }
    }

    fn require_submitted(&self, verb: &str) -> EngineResult<()> {
        if self.status == TimeEntryStatus::Submitted {
            Ok(())
        } else {
            Err(EngineError::state(format!(
                "Only submitted time entries can be {verb} (entry is {})",
                self.status
            )))
        }
    }

    fn check_chronology(&self) -> EngineResult<()> {
        if let (Some(clock_in), Some(clock_out)) = (self.clock_in_time, self.clock_out_time) {
            if clock_out <= clock_in {
                return Err(EngineError::validation(
                    "Clock out time must be after clock in time",
                ));
            }
        }
        if let (Some(start), Some(end)) = (self.break_start_time, self.break_end_time) {
            if end <= start {
                return Err(EngineError::validation(
                    "Break end time must be after break start time",
                ));
            }
        }
        if let (Some(start), Some(end)) = (self.lunch_start_time, self.lunch_end_time) {
            if end <= start {
                return Err(EngineError::validation(
                    "Lunch end time must be after lunch start time",
                ));
            }
        }
        Ok(())
    }
}

/// Minutes covered by a closed window; zero if either end is missing.
fn window_minutes(start: Option<NaiveDateTime>, end: Option<NaiveDateTime>) -> i64 {
    match (start, end) {
        (Some(start), Some(end)) if end > start => (end - start).num_minutes(),
        _ => 0,
    }
}

/// A time entry with its derived flags, as handed to API and report layers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeEntrySnapshot {
    /// All recorded fields.
    #[serde(flatten)]
    pub entry: TimeEntry,
    /// Clocked in and not yet clocked out.
    pub is_clocked_in: bool,
    /// A break or lunch window is open.
    pub is_on_break: bool,
    /// Both clock times are recorded.
    pub is_complete: bool,
    /// Worked hours net of breaks, once complete.
    pub worked_duration_hours: Option<Decimal>,
}
