//! Conversion options
//!
//! Options can be built in code or loaded from a TOML file; the command-line
//! tool layers its flags on top of whatever the file provides.

use crate::error::{ConvertError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Output document kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Bit-flip test description.
    #[default]
    Bsm,
    /// XML mirror of the database.
    Xml,
}

/// Options for one conversion run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConvertOptions {
    #[serde(default)]
    pub format: OutputFormat,

    /// Add a "Generated on" comment with the local time.
    #[serde(default)]
    pub timestamp: bool,
}

impl ConvertOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_timestamp(mut self, timestamp: bool) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Parse options from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| ConvertError::InvalidField {
            field: "config",
            value: text.lines().next().unwrap_or_default().to_string(),
            reason: e.to_string(),
        })
    }

    /// Load options from a TOML file.
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }
}
