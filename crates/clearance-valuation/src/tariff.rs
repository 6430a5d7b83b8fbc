//! # Tariff Lookup
//!
//! The engine does not search tariff schedules. It asks a [`TariffLookup`]
//! for the rate record of an exact HS code (optionally narrowed by origin)
//! and uses whatever comes back. [`TariffTable`] is a static in-memory
//! implementation loaded from YAML:
//!
//! ```yaml
//! entries:
//!   - hs_code: "8471.30"
//!     rates: { duty: "0", vat: "19" }
//!     origins:
//!       CN: { anti_dumping: "35.5" }
//! ```
//!
//! Origin entries override the base record field by field.

use std::collections::BTreeMap;
use std::path::Path;

use clearance_core::{CountryCode, HsCode};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::model::TariffRates;

/// Source of official rate records.
pub trait TariffLookup {
    /// The rate record for `hs_code`, specialised to `origin` when known.
    fn lookup(&self, hs_code: &HsCode, origin: Option<&CountryCode>) -> Option<TariffRates>;
}

/// One HS code's rates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TariffEntry {
    pub hs_code: HsCode,
    #[serde(default)]
    pub rates: TariffRates,
    #[serde(default)]
    pub origins: BTreeMap<CountryCode, TariffRates>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct TariffFile {
    #[serde(default)]
    entries: Vec<TariffEntry>,
}

/// In-memory tariff table keyed by normalized HS code.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TariffTable {
    entries: BTreeMap<HsCode, TariffEntry>,
}

impl TariffTable {
    /// An empty table; every lookup misses.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace an entry.
    pub fn insert(&mut self, entry: TariffEntry) {
        self.entries.insert(entry.hs_code.clone(), entry);
    }

    /// Builder form of [`TariffTable::insert`].
    pub fn with_entry(mut self, entry: TariffEntry) -> Self {
        self.insert(entry);
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Parse a YAML table. Duplicate HS codes are rejected.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::new());
        }
        let file: TariffFile = serde_yaml::from_str(yaml)?;
        let mut table = Self::new();
        for entry in file.entries {
            if table.entries.contains_key(&entry.hs_code) {
                return Err(ConfigError::Invalid {
                    field: "entries".into(),
                    reason: format!("duplicate hs_code {}", entry.hs_code),
                });
            }
            for (scope, rates) in std::iter::once(("rates".to_string(), &entry.rates))
                .chain(entry.origins.iter().map(|(c, r)| (format!("origins.{c}"), r)))
            {
                if let Err(err) = rates.validate(&scope) {
                    return Err(ConfigError::Invalid {
                        field: format!("entries[{}]", entry.hs_code),
                        reason: err.to_string(),
                    });
                }
            }
            table.insert(entry);
        }
        Ok(table)
    }

    /// Read and parse a YAML table.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let yaml = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&yaml)
    }
}

impl TariffLookup for TariffTable {
    fn lookup(&self, hs_code: &HsCode, origin: Option<&CountryCode>) -> Option<TariffRates> {
        let entry = self.entries.get(hs_code)?;
        let specific = origin.and_then(|o| entry.origins.get(o));
        Some(match specific {
            Some(rates) => rates.or(&entry.rates),
            None => entry.rates,
        })
    }
}

impl<T: TariffLookup + ?Sized> TariffLookup for &T {
    fn lookup(&self, hs_code: &HsCode, origin: Option<&CountryCode>) -> Option<TariffRates> {
        (**self).lookup(hs_code, origin)
    }
}

impl<T: TariffLookup + ?Sized> TariffLookup for std::sync::Arc<T> {
    fn lookup(&self, hs_code: &HsCode, origin: Option<&CountryCode>) -> Option<TariffRates> {
        (**self).lookup(hs_code, origin)
    }
}
