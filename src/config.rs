//! Application configuration.
//!
//! The configuration is loaded from
//! `$XDG_CONFIG_HOME/hyprtile/config.json`.  Every field is optional: a
//! minimal `{}` file is valid and all sections fall back to their
//! compiled-in defaults.
//!
//! # Example
//!
//! ```json
//! {
//!   "tiling": {
//!     "margin": 15.0,
//!     "default_layout": "equal_columns",
//!     "default_primary_factor": 1.2,
//!     "primary_factor_step": 0.05
//!   },
//!   "socket_path": "/run/user/1000/hyprtile.sock"
//! }
//! ```

use crate::layout::Layout;
use crate::reducer::{MAX_PRIMARY_FACTOR, MIN_PRIMARY_FACTOR};
use crate::state::{DisplaySettings, DEFAULT_PRIMARY_FACTOR};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Layout and sizing settings.
    #[serde(default)]
    pub tiling: TilingConfig,

    /// Where the command socket is created.  Defaults to
    /// `$XDG_RUNTIME_DIR/hyprtile.sock`.
    #[serde(default)]
    pub socket_path: Option<String>,
}

/// Layout and sizing settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TilingConfig {
    /// Gap between tiles and around the edge of each display, in pixels.
    pub margin: f64,
    /// Layout given to displays seen for the first time.
    pub default_layout: Layout,
    /// Primary factor given to displays seen for the first time.
    pub default_primary_factor: f64,
    /// Delta applied by `increase-primary` / `decrease-primary`.
    pub primary_factor_step: f64,
}

impl Default for TilingConfig {
    fn default() -> Self {
        Self {
            margin: 15.0,
            default_layout: Layout::default(),
            default_primary_factor: DEFAULT_PRIMARY_FACTOR,
            primary_factor_step: 0.05,
        }
    }
}

impl TilingConfig {
    /// Settings for a display the tiler has not seen before.
    pub fn display_defaults(&self) -> DisplaySettings {
        DisplaySettings {
            layout: self.default_layout,
            primary_factor: self.default_primary_factor,
            ..DisplaySettings::default()
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !self.margin.is_finite() || self.margin < 0.0 {
            return Err(ConfigError(format!(
                "margin must be a non-negative number, got {}",
                self.margin
            )));
        }
        if !(MIN_PRIMARY_FACTOR..=MAX_PRIMARY_FACTOR).contains(&self.default_primary_factor) {
            return Err(ConfigError(format!(
                "default_primary_factor must be within {}..={}, got {}",
                MIN_PRIMARY_FACTOR, MAX_PRIMARY_FACTOR, self.default_primary_factor
            )));
        }
        if !self.primary_factor_step.is_finite() || self.primary_factor_step <= 0.0 {
            return Err(ConfigError(format!(
                "primary_factor_step must be positive, got {}",
                self.primary_factor_step
            )));
        }
        Ok(())
    }
}

impl Config {
    /// Load configuration from a JSON file at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError(format!("failed to read {}: {}", path.display(), e)))?;
        Self::from_json(&contents)
            .map_err(|e| ConfigError(format!("{}: {}", path.display(), e.0)))
    }

    /// Parse and validate configuration from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| ConfigError(format!("failed to parse: {}", e)))?;
        config.tiling.validate()?;
        Ok(config)
    }
}

/// Error from loading or parsing a configuration file.
#[derive(Debug, thiserror::Error)]
#[error("config error: {0}")]
pub struct ConfigError(String);
