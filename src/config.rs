//! Configuration
//!
//! Read from `--config <path>` or `.anchorlintrc.json` in the working
//! directory; command-line options override file values.

use crate::ast::RegexFlags;
use crate::error::ConfigError;
use crate::report::Severity;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = ".anchorlintrc.json";

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Output settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub format: OutputFormat,

    /// Colored text output
    pub color: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Text,
            color: true,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Flags every pattern starts with, e.g. `"x"` for extended mode.
    pub flags: String,

    /// Severity attached to every reported problem
    pub severity: Severity,

    pub output: OutputConfig,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.regex_flags()?;
        log::debug!("loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Load `.anchorlintrc.json` from the current directory, or defaults.
    pub fn load_default() -> Result<Self, ConfigError> {
        let path = PathBuf::from(DEFAULT_CONFIG_FILE);
        if path.exists() {
            return Self::load(&path);
        }
        Ok(Self::default())
    }

    /// Parsed form of `flags`.
    pub fn regex_flags(&self) -> Result<RegexFlags, ConfigError> {
        self.flags
            .parse::<RegexFlags>()
            .map_err(|ch| ConfigError::Invalid(format!("Unknown regex flag: {}", ch)))
    }

    pub fn merge_cli(
        &mut self,
        flags: Option<String>,
        format: Option<OutputFormat>,
        severity: Option<Severity>,
        no_color: bool,
    ) {
        if let Some(flags) = flags {
            self.flags = flags;
        }
        if let Some(f) = format {
            self.output.format = f;
        }
        if let Some(s) = severity {
            self.severity = s;
        }
        if no_color {
            self.output.color = false;
        }
    }
}
