//! Configuration file (`folio.toml`)
//!
//! Lookup order: explicit `--config` path, `$FOLIO_CONFIG`, then
//! `<config home>/folio/folio.toml`. Only a missing default file means defaults.
//!
//! ```toml
//! history_file = "portfolio_details_history.csv"
//! output_file = "portfolio_return.json"
//! bare_price = "unit"          # or "unknown"
//! return_method = "time_weighted"  # or "simple_ratio"
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::FolioError;
use crate::history::BarePricePolicy;
use crate::reports::ReturnMethod;

pub const DEFAULT_HISTORY_FILE: &str = "portfolio_details_history.csv";
const CONFIG_ENV: &str = "FOLIO_CONFIG";
const CONFIG_FILENAME: &str = "folio.toml";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub history_file: PathBuf,
    /// Dashboard JSON written by `report` when set
    pub output_file: Option<PathBuf>,
    pub bare_price: BarePricePolicy,
    pub return_method: ReturnMethod,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            history_file: PathBuf::from(DEFAULT_HISTORY_FILE),
            output_file: None,
            bare_price: BarePricePolicy::default(),
            return_method: ReturnMethod::default(),
        }
    }
}

impl Config {
    pub fn from_toml(text: &str) -> Result<Self, FolioError> {
        toml::from_str(text).map_err(|e| FolioError::Config(e.message().to_string()))
    }

    /// Load from an explicit path, which must exist.
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config = Self::from_toml(&text)
            .with_context(|| format!("Invalid config {}", path.display()))?;
        debug!("Loaded config from {:?}: {:?}", path, config);
        Ok(config)
    }

    /// Resolve and load the config.
    ///
    /// A path named by `--config` or `$FOLIO_CONFIG` must exist; only the
    /// default location may be absent.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_path(path);
        }
        if let Some(path) = std::env::var_os(CONFIG_ENV) {
            return Self::from_path(Path::new(&path));
        }
        match default_config_path() {
            Some(path) if path.exists() => Self::from_path(&path),
            _ => Ok(Self::default()),
        }
    }
}

fn default_config_path() -> Option<PathBuf> {
    dir_spec::config_home().map(|dir| dir.join("folio").join(CONFIG_FILENAME))
}
