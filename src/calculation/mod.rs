//! Calculation logic for the payroll engine.
//!
//! This module contains the pure calculation functions: currency rounding,
//! daily hour tiering, gross pay, flat-rate tax withholding and benefit
//! deductions. None of them perform I/O, and amounts that overflow the
//! decimal range are reported as validation errors.

mod benefits;
mod checked;
mod gross_pay;
mod hour_tiering;
mod rounding;
mod tax;

pub use benefits::calculate_benefit_deductions;
pub use checked::{checked_add, checked_div, checked_mul, checked_sub, checked_sum};
pub use gross_pay::{DEFAULT_OVERTIME_MULTIPLIER, GrossPayBreakdown, calculate_gross_pay};
pub use hour_tiering::{
    DEFAULT_OVERTIME_HOURS_LIMIT, DEFAULT_REGULAR_HOURS_LIMIT, HourTiers, tier_daily_hours,
};
pub use rounding::{MONEY_SCALE, minutes_to_hours, round_currency, round_hours};
pub use tax::calculate_tax_deductions;
