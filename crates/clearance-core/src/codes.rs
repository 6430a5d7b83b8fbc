//! # Customs Codes
//!
//! Validated string newtypes for Harmonized System codes and ISO 3166-1
//! alpha-2 country codes. Both validate at construction and at
//! deserialization, so a malformed code cannot reach the tariff lookup.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Implements `Deserialize` by routing through the type's validating `new`.
macro_rules! impl_validating_deserialize {
    ($ty:ident) => {
        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let raw = String::deserialize(deserializer)?;
                Self::new(raw).map_err(serde::de::Error::custom)
            }
        }
    };
}

/// A Harmonized System tariff code.
///
/// Accepts 6 to 10 digits, optionally grouped with dots (`8471.30.00`).
/// Stored without dots so `"8471.30"` and `"847130"` compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct HsCode(String);

impl HsCode {
    /// Validate and normalize an HS code.
    pub fn new(code: impl Into<String>) -> Result<Self, ValidationError> {
        let raw = code.into();
        let digits: String = raw.trim().chars().filter(|c| *c != '.').collect();
        if !(6..=10).contains(&digits.len()) || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(ValidationError::InvalidHsCode(raw));
        }
        Ok(Self(digits))
    }

    /// The normalized digit string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl_validating_deserialize!(HsCode);

impl std::fmt::Display for HsCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// An ISO 3166-1 alpha-2 country code, stored uppercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct CountryCode(String);

impl CountryCode {
    /// Validate a two-letter country code.
    pub fn new(code: impl Into<String>) -> Result<Self, ValidationError> {
        let raw = code.into();
        let trimmed = raw.trim();
        if trimmed.len() != 2 || !trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(ValidationError::InvalidCountryCode(raw));
        }
        Ok(Self(trimmed.to_ascii_uppercase()))
    }

    /// The uppercase code.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl_validating_deserialize!(CountryCode);

impl std::fmt::Display for CountryCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hs_code_strips_dots() {
        let code = HsCode::new("8471.30.00").unwrap();
        assert_eq!(code.as_str(), "84713000");
        assert_eq!(HsCode::new("847130").unwrap(), HsCode::new("8471.30").unwrap());
    }

    #[test]
    fn hs_code_length_bounds() {
        assert!(HsCode::new("84713").is_err());
        assert!(HsCode::new("847130").is_ok());
        assert!(HsCode::new("8471300000").is_ok());
        assert!(HsCode::new("84713000001").is_err());
    }

    #[test]
    fn hs_code_rejects_letters() {
        assert_eq!(
            HsCode::new("8471AB").unwrap_err(),
            ValidationError::InvalidHsCode("8471AB".into())
        );
    }

    #[test]
    fn hs_code_deserialize_validates() {
        let ok: HsCode = serde_json::from_str("\"6403.99\"").unwrap();
        assert_eq!(ok.as_str(), "640399");
        assert!(serde_json::from_str::<HsCode>("\"64\"").is_err());
    }

    #[test]
    fn country_code_uppercases() {
        assert_eq!(CountryCode::new("cn").unwrap().as_str(), "CN");
        assert_eq!(CountryCode::new(" de ").unwrap().to_string(), "DE");
    }

    #[test]
    fn country_code_rejects_bad_input() {
        assert!(CountryCode::new("CHN").is_err());
        assert!(CountryCode::new("C1").is_err());
        assert!(CountryCode::new("").is_err());
        assert!(serde_json::from_str::<CountryCode>("\"XYZ\"").is_err());
    }
}
