//! Shipment-level classification: how freight is spread across items, and
//! whether import VAT is paid at the border or deferred.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Basis for spreading shipment costs across line items.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AllocationMethod {
    /// Proportional to invoice value.
    #[default]
    ByValue,
    /// Proportional to gross weight.
    ByWeight,
}

impl AllocationMethod {
    /// Wire identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ByValue => "by_value",
            Self::ByWeight => "by_weight",
        }
    }
}

impl std::fmt::Display for AllocationMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AllocationMethod {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "by_value" | "value" => Ok(Self::ByValue),
            "by_weight" | "weight" => Ok(Self::ByWeight),
            _ => Err(ValidationError::InvalidAllocationMethod(s.to_string())),
        }
    }
}

/// Customs clearance procedure.
///
/// Under "42" the importer re-dispatches the goods to another member state
/// and import VAT is deferred; duty and other taxes are still due at the
/// border.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClearanceType {
    /// Release for free circulation, VAT payable at import.
    #[default]
    #[serde(rename = "40")]
    Standard,
    /// Release with deferred (reverse-charged) VAT.
    #[serde(rename = "42")]
    DeferredVat,
}

impl ClearanceType {
    /// Procedure code.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Standard => "40",
            Self::DeferredVat => "42",
        }
    }

    /// Whether import VAT is deferred rather than payable now.
    pub fn is_vat_deferred(&self) -> bool {
        matches!(self, Self::DeferredVat)
    }
}

impl std::fmt::Display for ClearanceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ClearanceType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "40" => Ok(Self::Standard),
            "42" => Ok(Self::DeferredVat),
            _ => Err(ValidationError::InvalidClearanceType(s.to_string())),
        }
    }
}
