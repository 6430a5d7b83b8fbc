//! # Error Types
//!
//! Validation and canonicalization errors shared by every crate in the
//! workspace. All errors use `thiserror` for derive-based `Display` and
//! `Error` implementations.

use thiserror::Error;

/// A domain primitive rejected its input at construction.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The trade term code is not one of the twelve supported Incoterms.
    #[error("unsupported incoterm code: {0:?}")]
    InvalidIncoterm(String),

    /// The clearance type is neither "40" nor "42".
    #[error("unsupported clearance type: {0:?} (expected \"40\" or \"42\")")]
    InvalidClearanceType(String),

    /// The freight allocation method is not recognised.
    #[error("unsupported allocation method: {0:?} (expected \"by_value\" or \"by_weight\")")]
    InvalidAllocationMethod(String),

    /// HS codes are 6 to 10 ASCII digits, optionally dotted.
    #[error("invalid HS code: {0:?}")]
    InvalidHsCode(String),

    /// Country codes are ISO 3166-1 alpha-2.
    #[error("invalid country code: {0:?}")]
    InvalidCountryCode(String),

    /// A numeric field could not be parsed as a decimal.
    #[error("{field}: {value:?} is not a decimal number")]
    MalformedNumber {
        /// Field name as supplied by the caller.
        field: String,
        /// The rejected text.
        value: String,
    },

    /// A number is above the largest value accepted for its field.
    #[error("{field}: must not exceed {max} (got {value})")]
    OutOfRange {
        /// Field name as supplied by the caller.
        field: String,
        /// The rejected value, rendered as a decimal string.
        value: String,
        /// The cap for this kind of field.
        max: String,
    },

    /// A field that must be zero or positive was negative.
    #[error("{field}: must not be negative (got {value})")]
    NegativeAmount {
        /// Field name as supplied by the caller.
        field: String,
        /// The rejected value, rendered as a decimal string.
        value: String,
    },
}

/// Error during canonical serialization.
#[derive(Error, Debug)]
pub enum CanonicalizationError {
    /// Float values are not permitted in canonical representations.
    /// Amounts must be decimal strings or integers.
    #[error(
        "float values are not permitted in canonical representations; use a decimal string: {0}"
    )]
    FloatRejected(f64),

    /// JSON serialization failed.
    #[error("serialization failed: {0}")]
    SerializationFailed(#[from] serde_json::Error),
}
