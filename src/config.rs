//! # Configuration
//!
//! Engine-wide settings that are not part of any single node: the device
//! resolution, the root font defaults, the pager's placeholder tokens and
//! its widow/orphan limits.
//! A document may embed a config; the CLI can override it from a file.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::units::Units;

/// Engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    /// Device dots per inch.
    pub dpi: f64,
    /// Root font defaults, used where no ancestor sets a font attribute.
    pub font: FontDefaults,
    /// Replaced with the 1-based page number in emitted text.
    pub page_token: String,
    /// Replaced with the total page count in emitted text.
    pub total_token: String,
    /// Fewest lines of a split text left at the bottom of a page.
    pub orphans: usize,
    /// Fewest lines of a split text carried to the next page.
    pub widows: usize,
}

/// Root font defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FontDefaults {
    pub name: String,
    /// Size in points.
    pub size: f64,
    /// Line height: a multiplier below 8, an absolute device length otherwise.
    pub line: f64,
}

impl Default for FontDefaults {
    fn default() -> Self {
        Self {
            name: "helvetica".to_string(),
            size: 10.0,
            line: 1.2,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dpi: 203.2,
            font: FontDefaults::default(),
            page_token: "µP".to_string(),
            total_token: "µT".to_string(),
            orphans: 1,
            widows: 1,
        }
    }
}

impl Config {
    /// Parse a config from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would make layout meaningless.
    pub fn validate(&self) -> Result<()> {
        if !(self.dpi > 0.0) {
            return Err(Error::Config(format!("dpi must be positive, got {}", self.dpi)));
        }
        if !(self.font.size > 0.0) {
            return Err(Error::Config(format!(
                "default font size must be positive, got {}",
                self.font.size
            )));
        }
        if self.page_token.is_empty() || self.total_token.is_empty() {
            return Err(Error::Config("page tokens must not be empty".to_string()));
        }
        if self.orphans == 0 || self.widows == 0 {
            return Err(Error::Config("orphans and widows must be at least 1".to_string()));
        }
        Ok(())
    }

    pub fn units(&self) -> Units {
        Units::new(self.dpi)
    }
}
