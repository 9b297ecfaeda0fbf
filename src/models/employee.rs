//! Employee compensation profile and related types.
//!
//! This module defines the [`Employee`] record consumed by the payroll
//! calculator, along with [`PayrollFrequency`] and benefit enrollment.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Employment status of an employee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmployeeStatus {
    /// Currently employed and payable.
    Active,
    /// Not currently employed.
    Inactive,
    /// Employment ended.
    Terminated,
    /// On an extended leave.
    OnLeave,
    /// Temporarily suspended.
    Suspended,
    /// In a probation period.
    Probation,
}

/// How often an employee is paid.
///
/// Quarterly and annual frequencies form the "other" bucket: salaries are
/// not divided and monthly premiums are not prorated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayrollFrequency {
    /// 52 pay periods per year.
    Weekly,
    /// 26 pay periods per year.
    Biweekly,
    /// 24 pay periods per year.
    SemiMonthly,
    /// 12 pay periods per year.
    Monthly,
    /// Paid quarterly.
    Quarterly,
    /// Paid once a year.
    Annually,
}

impl PayrollFrequency {
    /// Returns the divisor applied to an annual salary for one pay period.
    ///
    /// # Examples
    ///
    /// ```
    /// use payroll_engine::models::PayrollFrequency;
    /// use rust_decimal::Decimal;
    ///
    /// assert_eq!(PayrollFrequency::Biweekly.salary_divisor(), Decimal::from(26));
    /// assert_eq!(PayrollFrequency::Annually.salary_divisor(), Decimal::ONE);
    /// ```
    pub fn salary_divisor(&self) -> Decimal {
        match self {
            Self::Weekly => Decimal::from(52),
            Self::Biweekly => Decimal::from(26),
            Self::SemiMonthly => Decimal::from(24),
            Self::Monthly => Decimal::from(12),
            Self::Quarterly | Self::Annually => Decimal::ONE,
        }
    }

    /// Scales a monthly amount to one pay period of this frequency.
    ///
    /// The result is not rounded. Returns `None` if the amount overflows.
    pub fn prorate_monthly(&self, monthly: Decimal) -> Option<Decimal> {
        match self {
            Self::Weekly => monthly.checked_mul(Decimal::from(12))?.checked_div(Decimal::from(52)),
            Self::Biweekly => monthly.checked_mul(Decimal::from(12))?.checked_div(Decimal::from(26)),
            Self::SemiMonthly => monthly.checked_div(Decimal::TWO),
            Self::Monthly | Self::Quarterly | Self::Annually => Some(monthly),
        }
    }
}

/// Benefit plans an employee is enrolled in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BenefitEnrollment {
    /// Enrolled in health insurance.
    #[serde(default)]
    pub health: bool,
    /// Enrolled in dental insurance.
    #[serde(default)]
    pub dental: bool,
    /// Enrolled in vision insurance.
    #[serde(default)]
    pub vision: bool,
    /// Enrolled in the 401k plan.
    #[serde(default)]
    pub retirement_401k: bool,
    /// 401k contribution as a percentage of gross pay (e.g. 5 for 5%).
    #[serde(default)]
    pub retirement_401k_percent: Decimal,
}

/// How an employee's gross pay is derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compensation {
    /// Paid a share of an annual salary each period.
    Salaried {
        /// Annual salary.
        annual_salary: Decimal,
    },
    /// Paid per hour worked.
    Hourly {
        /// Rate per regular hour.
        hourly_rate: Decimal,
    },
    /// Neither a positive salary nor a positive hourly rate is recorded.
    Missing,
}

/// An employee's compensation profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    /// Unique identifier for the employee.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Employment status.
    pub status: EmployeeStatus,
    /// The employee's manager, who approves their time entries.
    #[serde(default)]
    pub manager_id: Option<String>,
    /// Annual salary, if salaried.
    #[serde(default)]
    pub salary: Option<Decimal>,
    /// Hourly rate, if hourly.
    #[serde(default)]
    pub hourly_rate: Option<Decimal>,
    /// Pay frequency.
    pub payroll_frequency: PayrollFrequency,
    /// Employee-specific overtime multiplier; the configured default applies when absent.
    #[serde(default)]
    pub overtime_multiplier: Option<Decimal>,
    /// Claimed federal allowances.
    #[serde(default)]
    pub federal_allowances: u32,
    /// Claimed state allowances.
    #[serde(default)]
    pub state_allowances: u32,
    /// Extra fixed federal withholding per period.
    #[serde(default)]
    pub additional_federal_withholding: Decimal,
    /// Extra fixed state withholding per period.
    #[serde(default)]
    pub additional_state_withholding: Decimal,
    /// Benefit enrollment.
    #[serde(default)]
    pub benefits: BenefitEnrollment,
}

impl Employee {
    /// Returns true if the employee can be paid.
    pub fn is_active(&self) -> bool {
        self.status == EmployeeStatus::Active
    }

    /// Returns true if the employee has a positive annual salary.
    pub fn is_salaried(&self) -> bool {
        self.salary.is_some_and(|s| s > Decimal::ZERO)
    }

    /// Returns true if the employee has a positive hourly rate.
    pub fn is_hourly(&self) -> bool {
        self.hourly_rate.is_some_and(|r| r > Decimal::ZERO)
    }

    /// Resolves how the employee is paid. A salary takes precedence over an
    /// hourly rate.
    ///
    /// # Examples
    ///
    /// ```
    /// use payroll_engine::models::{Compensation, Employee, EmployeeStatus, PayrollFrequency};
    /// use rust_decimal::Decimal;
    ///
    /// let employee = Employee {
    ///     id: "emp_001".to_string(),
    ///     name: "Ada Lovelace".to_string(),
    ///     status: EmployeeStatus::Active,
    ///     manager_id: None,
    ///     salary: None,
    ///     hourly_rate: Some(Decimal::new(2500, 2)),
    ///     payroll_frequency: PayrollFrequency::Biweekly,
    ///     overtime_multiplier: None,
    ///     federal_allowances: 0,
    ///     state_allowances: 0,
    ///     additional_federal_withholding: Decimal::ZERO,
    ///     additional_state_withholding: Decimal::ZERO,
    ///     benefits: Default::default(),
    /// };
    /// assert_eq!(
    ///     employee.compensation(),
    ///     Compensation::Hourly { hourly_rate: Decimal::new(2500, 2) }
    /// );
    /// ```
    pub fn compensation(&self) -> Compensation {
        match (self.salary, self.hourly_rate) {
            (Some(annual_salary), _) if annual_salary > Decimal::ZERO => {
                Compensation::Salaried { annual_salary }
            }
            (_, Some(hourly_rate)) if hourly_rate > Decimal::ZERO => {
                Compensation::Hourly { hourly_rate }
            }
            _ => Compensation::Missing,
        }
    }
}
