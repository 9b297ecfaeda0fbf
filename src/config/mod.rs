//! Configuration loading and management for the payroll engine.
//!
//! This module provides functionality to load payroll configuration from YAML
//! files: tax rates, benefit premiums, hour thresholds and engine policies.
//!
//! # Example
//!
//! ```no_run
//! use payroll_engine::config::ConfigLoader;
//!
//! let loader = ConfigLoader::load("./config/payroll").unwrap();
//! println!("Default tax rate: {}", loader.config().taxes.default_tax_rate);
//! ```

mod loader;
mod types;

pub use loader::{
    ConfigLoader, DEFAULT_TAX_RATE_KEY, MEDICARE_RATE_KEY, SOCIAL_SECURITY_RATE_KEY,
};
pub use types::{
    BenefitPremiums, HourRules, MissingCompensationPolicy, PayDateRule, PayrollConfig,
    PolicyConfig, TaxRates,
};
