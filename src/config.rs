//! Configuration for the dashboard tools, read from a TOML file.
//!
//! Every section and field has a default, so a missing file or a partial file
//! both work. Command-line flags override what is loaded here.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::layout::LayoutConfig;
use crate::render::colors::ColorSettings;

/// Rebalancing calculator settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RebalanceConfig {
    /// Allowed distance of the target total from 100, in percentage points
    pub tolerance: f64,
    /// New capital to distribute when none is given on the command line
    pub dca_amount: f64,
}

impl Default for RebalanceConfig {
    fn default() -> Self {
        Self {
            tolerance: 0.01,
            dca_amount: 0.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub layout: LayoutConfig,
    pub rebalance: RebalanceConfig,
    pub colors: ColorSettings,
}

impl Config {
    /// Load from `path`, falling back to defaults when the file doesn't exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Config = toml::from_str(&text)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        tracing::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config")
    }
}
