//! `loadsplit.toml` configuration
//!
//! ```toml
//! [allocator]
//! day_length = 1440
//! rebalancing_iterations = 10
//!
//! [output]
//! format = "delimited"
//! separator = ";"
//! origin = "2025-01-06T00:00:00"
//! ```
//!
//! Every key is optional; command-line flags take precedence.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use loadsplit_solver::AllocatorConfig;
use serde::Deserialize;

/// Looked up in the working directory when `--config` is not given
pub const DEFAULT_CONFIG_FILE: &str = "loadsplit.toml";

#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub allocator: AllocatorConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub separator: char,
    /// Calendar time of schedule time zero
    pub origin: Option<NaiveDateTime>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Delimited,
            separator: ';',
            origin: None,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// One delimited row per segment
    #[default]
    Delimited,
    /// Human-readable report
    Text,
    /// Full allocation as JSON
    Json,
}

impl FileConfig {
    pub fn parse(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Load an explicit config file, or the default one if present
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => path,
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                if !default.exists() {
                    return Ok(Self::default());
                }
                default
            }
        };

        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("parsing config {}", path.display()))
    }
}
