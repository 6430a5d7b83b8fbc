//! # Application State
//!
//! Shared, immutable state handed to every handler through the `State`
//! extractor: the valuation configuration and the tariff table. Nothing is
//! mutated per request, so handlers never lock.

use std::path::PathBuf;
use std::sync::Arc;

use clearance_valuation::{ConfigError, TariffTable, ValuationConfig};
use thiserror::Error;

/// Environment variable naming the valuation config file.
pub const CONFIG_ENV: &str = "CLEARANCE_CONFIG";
/// Environment variable naming the tariff table file.
pub const TARIFFS_ENV: &str = "CLEARANCE_TARIFFS";

/// Errors raised while assembling state at startup.
#[derive(Error, Debug)]
pub enum StartupError {
    #[error("invalid PORT value {0:?}")]
    InvalidPort(String),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Process-level settings read from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Port to bind the HTTP server to.
    pub port: u16,
    /// Optional valuation config YAML.
    pub config_path: Option<PathBuf>,
    /// Optional tariff table YAML.
    pub tariffs_path: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            config_path: None,
            tariffs_path: None,
        }
    }
}

impl AppConfig {
    /// Read `PORT`, `CLEARANCE_CONFIG` and `CLEARANCE_TARIFFS`.
    pub fn from_env() -> Result<Self, StartupError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`AppConfig::from_env`] with an injectable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, StartupError> {
        let port = match lookup("PORT") {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| StartupError::InvalidPort(raw.clone()))?,
            None => 8080,
        };
        let path = |key: &str| lookup(key).filter(|v| !v.trim().is_empty()).map(PathBuf::from);
        Ok(Self {
            port,
            config_path: path(CONFIG_ENV),
            tariffs_path: path(TARIFFS_ENV),
        })
    }
}

/// Shared application state.
#[derive(Debug, Clone)]
pub struct AppState {
    pub valuation: Arc<ValuationConfig>,
    pub tariffs: Arc<TariffTable>,
}

impl AppState {
    /// Default configuration and an empty tariff table.
    pub fn new() -> Self {
        Self::with_parts(ValuationConfig::default(), TariffTable::new())
    }

    pub fn with_parts(valuation: ValuationConfig, tariffs: TariffTable) -> Self {
        Self {
            valuation: Arc::new(valuation),
            tariffs: Arc::new(tariffs),
        }
    }

    /// Load the files named in `config`. A missing path means defaults; an
    /// unreadable or invalid file is an error.
    pub fn load(config: &AppConfig) -> Result<Self, StartupError> {
        let valuation = match &config.config_path {
            Some(path) => ValuationConfig::from_path(path)?,
            None => ValuationConfig::default(),
        };
        let tariffs = match &config.tariffs_path {
            Some(path) => TariffTable::from_path(path)?,
            None => TariffTable::new(),
        };
        tracing::info!(
            money_scale = valuation.money_scale,
            ddp_rate_source = valuation.ddp_rate_source.as_str(),
            tariff_entries = tariffs.len(),
            "valuation state loaded"
        );
        Ok(Self::with_parts(valuation, tariffs))
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
