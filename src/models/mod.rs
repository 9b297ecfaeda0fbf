//! Core data models for the payroll engine.
//!
//! This module contains the domain records the services operate on:
//! employees, time entries, pay periods, payroll results and batch results.

mod batch_result;
mod employee;
mod pay_period;
mod payroll_result;
mod time_entry;

pub use batch_result::{
    BatchError, BatchOutcome, BatchResult, BatchTotals, PayrollSummary, generate_batch_id,
};
pub use employee::{BenefitEnrollment, Compensation, Employee, EmployeeStatus, PayrollFrequency};
pub use pay_period::PayPeriod;
pub use payroll_result::{
    BenefitDeductions, CalculationWarning, PayrollRecord, PayrollResult, PayrollStatus,
    ResolvedHours, TaxDeductions,
};
pub use time_entry::{
    ApprovalStatus, TimeEntry, TimeEntrySnapshot, TimeEntryStatus, TimeEntryType,
};
