//! Engine and configuration errors.

use std::path::PathBuf;

use clearance_core::{CanonicalizationError, ValidationError};
use thiserror::Error;

/// A hard valuation error. Terms-level errors abort the shipment; item-level
/// errors abort only that item and are collected as
/// [`crate::ItemFailure`]s.
#[derive(Error, Debug)]
pub enum ValuationError {
    /// The trade term is not one of the supported Incoterms.
    #[error("unsupported incoterm: {0:?}")]
    InvalidIncoterm(String),

    /// A field is missing, malformed or out of range.
    #[error("invalid input in {field}: {reason}")]
    InvalidInput {
        /// Offending field.
        field: String,
        /// Human-readable reason.
        reason: String,
    },

    /// The computed valuation could not be fingerprinted.
    #[error("canonicalization failed: {0}")]
    Canonicalization(#[from] CanonicalizationError),
}

impl ValuationError {
    /// Build an `InvalidInput` error.
    pub fn invalid_input(field: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::InvalidInput {
            field: field.into(),
            reason: reason.to_string(),
        }
    }

    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidIncoterm(_) => "INVALID_INCOTERM",
            Self::InvalidInput { .. } => "INVALID_INPUT",
            Self::Canonicalization(_) => "CANONICALIZATION_FAILED",
        }
    }
}

impl From<ValidationError> for ValuationError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::InvalidIncoterm(code) => Self::InvalidIncoterm(code),
            // The field travels in `field`; the reason omits it.
            ValidationError::MalformedNumber { field, value } => {
                Self::invalid_input(field, format!("{value:?} is not a decimal number"))
            }
            ValidationError::NegativeAmount { field, value } => {
                Self::invalid_input(field, format!("must not be negative (got {value})"))
            }
            ValidationError::OutOfRange { field, value, max } => {
                Self::invalid_input(field, format!("must not exceed {max} (got {value})"))
            }
            e @ ValidationError::InvalidClearanceType(_) => {
                Self::invalid_input("clearance_type", &e)
            }
            e @ ValidationError::InvalidAllocationMethod(_) => {
                Self::invalid_input("freight_allocation_method", &e)
            }
            e @ ValidationError::InvalidHsCode(_) => Self::invalid_input("hs_code", &e),
            e @ ValidationError::InvalidCountryCode(_) => Self::invalid_input("origin_country", &e),
        }
    }
}

/// Configuration or tariff table could not be loaded.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// File that failed.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// The YAML did not match the expected shape.
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// A value parsed but is out of range.
    #[error("invalid configuration value for {field}: {reason}")]
    Invalid {
        /// Offending key.
        field: String,
        /// Human-readable reason.
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn incoterm_validation_maps_to_invalid_incoterm() {
        let err: ValuationError = ValidationError::InvalidIncoterm("XYZ".into()).into();
        assert!(matches!(err, ValuationError::InvalidIncoterm(ref c) if c == "XYZ"));
        assert_eq!(err.code(), "INVALID_INCOTERM");
    }

    #[test]
    fn number_validation_keeps_field_name() {
        let err: ValuationError = ValidationError::MalformedNumber {
            field: "items[2].invoice_value".into(),
            value: "abc".into(),
        }
        .into();
        match err {
            ValuationError::InvalidInput { field, reason } => {
                assert_eq!(field, "items[2].invoice_value");
                assert!(reason.contains("abc"));
            }
            other => panic!("expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn field_name_appears_once_in_message() {
        let err: ValuationError = ValidationError::OutOfRange {
            field: "rates.vat".into(),
            value: "20000".into(),
            max: "10000".into(),
        }
        .into();
        assert_eq!(
            err.to_string(),
            "invalid input in rates.vat: must not exceed 10000 (got 20000)"
        );
        assert_eq!(err.to_string().matches("rates.vat").count(), 1);
    }

    #[test]
    fn code_mapping_is_stable() {
        assert_eq!(ValuationError::invalid_input("x", "bad").code(), "INVALID_INPUT");
        let err: ValuationError = ValidationError::InvalidHsCode("1".into()).into();
        assert!(matches!(
            err,
            ValuationError::InvalidInput { ref field, .. } if field == "hs_code"
        ));
    }

    #[test]
    fn config_invalid_display() {
        let err = ConfigError::Invalid {
            field: "money_scale".into(),
            reason: "must be at most 10".into(),
        };
        assert_eq!(
            err.to_string(),
            "invalid configuration value for money_scale: must be at most 10"
        );
    }
}
