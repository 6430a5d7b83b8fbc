//! # clearance-cli: Command-Line Front End
//!
//! Provides the `clearance` binary over the valuation engine.
//!
//! ## Subcommands
//!
//! - `clearance value <FILE>`: value a JSON or YAML shipment file.
//! - `clearance customs-value --incoterm FOB --invoice-value 1000 …`: one item.
//! - `clearance incoterms`: print the rule table.
//!
//! ```bash
//! clearance --tariffs tariffs.yaml value shipment.yaml --format text
//! ```
//!
//! `value` exits 0 when every item was valued, 2 when any item failed, and
//! 1 on a fatal error.

pub mod customs;
pub mod incoterms;
pub mod value;

use std::path::Path;

use anyhow::{Context, Result};
use clap::ValueEnum;
use clearance_valuation::{ShipmentRequest, TariffTable, ValuationConfig};

/// Output format shared by every subcommand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Json,
    Text,
}

/// Configuration and tariff table loaded once per invocation.
#[derive(Debug, Clone, Default)]
pub struct Engine {
    pub config: ValuationConfig,
    pub tariffs: TariffTable,
}

impl Engine {
    /// Load `--config` and `--tariffs`; absent paths mean defaults.
    pub fn load(config: Option<&Path>, tariffs: Option<&Path>) -> Result<Self> {
        let config = match config {
            Some(path) => ValuationConfig::from_path(path)
                .with_context(|| format!("failed to load config {}", path.display()))?,
            None => ValuationConfig::default(),
        };
        let tariffs = match tariffs {
            Some(path) => TariffTable::from_path(path)
                .with_context(|| format!("failed to load tariff table {}", path.display()))?,
            None => TariffTable::new(),
        };
        tracing::debug!(
            money_scale = config.money_scale,
            tariff_entries = tariffs.len(),
            "engine loaded"
        );
        Ok(Self { config, tariffs })
    }
}

/// Read a shipment file. `.yaml`/`.yml` parse as YAML, everything else as
/// JSON.
pub fn read_shipment(path: &Path) -> Result<ShipmentRequest> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let is_yaml = matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    );
    if is_yaml {
        serde_yaml::from_str(&content)
            .with_context(|| format!("failed to parse YAML shipment {}", path.display()))
    } else {
        serde_json::from_str(&content)
            .with_context(|| format!("failed to parse JSON shipment {}", path.display()))
    }
}
