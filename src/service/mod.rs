//! Services orchestrating the models over the storage collaborators.
//!
//! - [`TimeTrackingService`] drives the time entry lifecycle.
//! - [`PayPeriodManager`] creates non-overlapping pay periods.
//! - [`PayrollCalculator`] computes one employee's pay for a period.
//! - [`BatchProcessor`] runs the calculator over many employees.

mod batch;
mod pay_period;
mod payroll;
mod time_tracking;
mod validator;

pub use batch::BatchProcessor;
pub use pay_period::{NewPayPeriod, PayPeriodManager};
pub use payroll::{PayrollCalculator, PayrollRequest, PayrollValidation};
pub use time_tracking::{
    ClockInRequest, EmployeeTimeReport, NewTimeEntry, TimeEntryStats, TimeEntryUpdate,
    TimeTrackingService,
};
pub use validator::{EntryIssue, TimeEntryValidator};
