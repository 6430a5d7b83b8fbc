//! # Valuation Configuration
//!
//! Every field is defaulted, so an empty YAML document (or no file at all)
//! yields the standard behaviour. Out-of-range values are rejected at load
//! time rather than clamped.

use std::path::Path;

use clearance_core::Percent;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Upper bound on `money_scale`. `Decimal` carries 28 significant digits,
/// and customs amounts need room for the integer part.
pub const MAX_MONEY_SCALE: u32 = 10;

/// Which rate record the DDP reverse calculation divides out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateSource {
    /// The rates applied to the line item (caller-supplied, gaps filled from
    /// the tariff lookup).
    #[default]
    Applied,
    /// The official rate record for the matched HS code.
    Declared,
}

impl RateSource {
    /// Wire identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Applied => "applied",
            Self::Declared => "declared",
        }
    }
}

impl std::fmt::Display for RateSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Engine parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ValuationConfig {
    /// Estimated insurance as a percentage of total invoice value, used when
    /// the term needs insurance and none was declared.
    pub insurance_estimate_rate: Percent,
    /// Decimal places money is rounded to.
    pub money_scale: u32,
    /// Rate record used by the DDP reverse calculation.
    pub ddp_rate_source: RateSource,
}

impl Default for ValuationConfig {
    fn default() -> Self {
        Self {
            insurance_estimate_rate: Percent::new(Decimal::new(3, 1)),
            money_scale: 2,
            ddp_rate_source: RateSource::Applied,
        }
    }
}

impl ValuationConfig {
    /// Parse and validate a YAML document.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a YAML file.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let yaml = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&yaml)
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.insurance_estimate_rate.is_negative()
            || self.insurance_estimate_rate.value() > Decimal::ONE_HUNDRED
        {
            return Err(ConfigError::Invalid {
                field: "insurance_estimate_rate".into(),
                reason: format!(
                    "must be between 0 and 100 (got {})",
                    self.insurance_estimate_rate.value()
                ),
            });
        }
        if self.money_scale > MAX_MONEY_SCALE {
            return Err(ConfigError::Invalid {
                field: "money_scale".into(),
                reason: format!("must be at most {MAX_MONEY_SCALE} (got {})", self.money_scale),
            });
        }
        Ok(())
    }

    /// Builder: set the insurance estimate rate.
    pub fn with_insurance_estimate_rate(mut self, rate: Percent) -> Self {
        self.insurance_estimate_rate = rate;
        self
    }

    /// Builder: set the money scale.
    pub fn with_money_scale(mut self, scale: u32) -> Self {
        self.money_scale = scale;
        self
    }

    /// Builder: set the DDP rate source.
    pub fn with_ddp_rate_source(mut self, source: RateSource) -> Self {
        self.ddp_rate_source = source;
        self
    }
}
