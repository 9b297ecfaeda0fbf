//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading payroll
//! configurations from YAML files.

use rust_decimal::Decimal;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use tracing::debug;

use crate::error::{EngineError, EngineResult};

use super::types::{BenefitPremiums, HourRules, PayrollConfig, PolicyConfig, TaxRates};

/// Environment-style keys for the externally injected tax rates.
pub const SOCIAL_SECURITY_RATE_KEY: &str = "PAYROLL_SOCIAL_SECURITY_RATE";
/// Override key for the Medicare rate.
pub const MEDICARE_RATE_KEY: &str = "PAYROLL_MEDICARE_RATE";
/// Override key for the flat federal tax rate.
pub const DEFAULT_TAX_RATE_KEY: &str = "PAYROLL_DEFAULT_TAX_RATE";

/// Loads and provides access to payroll configuration.
///
/// # Directory Structure
///
/// ```text
/// config/payroll/
/// ├── taxes.yaml     # Tax rates and allowance amounts
/// ├── benefits.yaml  # Monthly benefit premiums
/// ├── hours.yaml     # Daily thresholds, multipliers and limits
/// └── policy.yaml    # Switchable engine policies
/// ```
///
/// # Example
///
/// ```no_run
/// use payroll_engine::config::ConfigLoader;
///
/// let mut loader = ConfigLoader::load("./config/payroll")?;
/// loader.apply_overrides(|key| std::env::var(key).ok())?;
/// println!("Medicare rate: {}", loader.config().taxes.medicare_rate);
/// # Ok::<(), payroll_engine::error::EngineError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConfigLoader {
    config: PayrollConfig,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// Returns an error if any required file is missing or contains invalid
    /// YAML.
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();

        let taxes = Self::load_yaml::<TaxRates>(&path.join("taxes.yaml"))?;
        let benefits = Self::load_yaml::<BenefitPremiums>(&path.join("benefits.yaml"))?;
        let hours = Self::load_yaml::<HourRules>(&path.join("hours.yaml"))?;
        let policy = Self::load_yaml::<PolicyConfig>(&path.join("policy.yaml"))?;

        if hours.overtime_hours_limit < hours.regular_hours_limit {
            return Err(EngineError::ConfigParseError {
                path: path.join("hours.yaml").display().to_string(),
                message: "overtime_hours_limit must not be below regular_hours_limit".to_string(),
            });
        }

        debug!(path = %path.display(), "Loaded payroll configuration");

        Ok(Self {
            config: PayrollConfig {
                taxes,
                benefits,
                hours,
                policy,
            },
        })
    }

    /// Wraps an already-built configuration.
    pub fn from_config(config: PayrollConfig) -> Self {
        Self { config }
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    /// Applies overrides for the externally injected tax rates.
    ///
    /// `lookup` maps a key such as [`SOCIAL_SECURITY_RATE_KEY`] to its value;
    /// pass `|k| std::env::var(k).ok()` to read the process environment.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> EngineResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let taxes = &mut self.config.taxes;
        for (key, slot) in [
            (SOCIAL_SECURITY_RATE_KEY, &mut taxes.social_security_rate),
            (MEDICARE_RATE_KEY, &mut taxes.medicare_rate),
            (DEFAULT_TAX_RATE_KEY, &mut taxes.default_tax_rate),
        ] {
            if let Some(raw) = lookup(key) {
                let value = Decimal::from_str(raw.trim()).map_err(|e| {
                    EngineError::ConfigParseError {
                        path: key.to_string(),
                        message: e.to_string(),
                    }
                })?;
                debug!(key, %value, "Applied tax rate override");
                *slot = value;
            }
        }
        Ok(())
    }

    /// Returns the loaded configuration.
    pub fn config(&self) -> &PayrollConfig {
        &self.config
    }

    /// Consumes the loader, returning the configuration.
    pub fn into_config(self) -> PayrollConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{MissingCompensationPolicy, PayDateRule};
    use std::collections::HashMap;

    fn config_path() -> &'static str {
        "./config/payroll"
    }

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_load_valid_configuration() {
        let result = ConfigLoader::load(config_path());
        assert!(result.is_ok(), "Failed to load config: {:?}", result.err());
    }

    #[test]
    fn test_loaded_configuration_matches_defaults() {
        let loader = ConfigLoader::load(config_path()).unwrap();
        assert_eq!(loader.config(), &PayrollConfig::default());
    }

    #[test]
    fn test_tax_rates_loaded_correctly() {
        let loader = ConfigLoader::load(config_path()).unwrap();
        let taxes = &loader.config().taxes;

        assert_eq!(taxes.social_security_rate, dec("0.062"));
        assert_eq!(taxes.medicare_rate, dec("0.0145"));
        assert_eq!(taxes.default_tax_rate, dec("0.20"));
        assert_eq!(taxes.state_tax_rate, dec("0.05"));
    }

    #[test]
    fn test_policy_loaded_correctly() {
        let loader = ConfigLoader::load(config_path()).unwrap();
        let policy = &loader.config().policy;

        assert_eq!(
            policy.missing_compensation,
            MissingCompensationPolicy::ZeroGrossPay
        );
        assert_eq!(policy.pay_date_rule, PayDateRule::OnOrAfterEndDate);
        assert_eq!(policy.batch_workers, 4);
    }

    #[test]
    fn test_load_missing_directory_returns_error() {
        let result = ConfigLoader::load("/nonexistent/path");

        match result {
            Err(EngineError::ConfigNotFound { path }) => {
                assert!(path.contains("taxes.yaml"));
            }
            other => panic!("Expected ConfigNotFound error, got {:?}", other),
        }
    }

    #[test]
    fn test_overrides_replace_tax_rates() {
        let mut loader = ConfigLoader::default();
        let vars: HashMap<&str, &str> = HashMap::from([
            (SOCIAL_SECURITY_RATE_KEY, "0.07"),
            (MEDICARE_RATE_KEY, " 0.02 "),
        ]);

        loader
            .apply_overrides(|key| vars.get(key).map(|v| v.to_string()))
            .unwrap();

        let taxes = &loader.config().taxes;
        assert_eq!(taxes.social_security_rate, dec("0.07"));
        assert_eq!(taxes.medicare_rate, dec("0.02"));
        assert_eq!(taxes.default_tax_rate, dec("0.20"));
    }

    #[test]
    fn test_invalid_override_returns_parse_error() {
        let mut loader = ConfigLoader::default();

        let result = loader.apply_overrides(|key| {
            (key == DEFAULT_TAX_RATE_KEY).then(|| "twenty percent".to_string())
        });

        match result {
            Err(EngineError::ConfigParseError { path, .. }) => {
                assert_eq!(path, DEFAULT_TAX_RATE_KEY);
            }
            other => panic!("Expected ConfigParseError, got {:?}", other),
        }
    }
}
