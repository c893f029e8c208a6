//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.isletstat.toml` files.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Name of the configuration file looked up in the working directory
/// and in the base folder.
pub const CONFIG_FILE_NAME: &str = ".isletstat.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Run inclusion filters.
    #[serde(default)]
    pub filters: FilterConfig,

    /// Scanner settings.
    #[serde(default)]
    pub scanner: ScannerConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Results file name, written inside the base folder.
    #[serde(default = "default_output_file")]
    pub output_file: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            output_file: default_output_file(),
        }
    }
}

fn default_output_file() -> String {
    "analysis_results.csv".to_string()
}

/// Inclusion filters on run metadata. An absent or empty list
/// places no restriction on that field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Accepted islet identifiers (e.g. `["H51", "H52"]`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub islets: Option<Vec<String>>,

    /// Accepted glucose levels (e.g. `["G6", "G7"]`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub glucose_levels: Option<Vec<String>>,

    /// Accepted capillary counts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capillaries: Option<Vec<i64>>,
}

/// File scanner settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScannerConfig {
    /// File name prefix of primary data files.
    #[serde(default = "default_primary_prefix")]
    pub primary_prefix: String,

    /// File name suffix of primary data files.
    #[serde(default = "default_primary_suffix")]
    pub primary_suffix: String,

    /// File name suffix of companion cell-state files.
    #[serde(default = "default_companion_suffix")]
    pub companion_suffix: String,

    /// Follow symbolic links while walking the base folder.
    #[serde(default)]
    pub follow_links: bool,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            primary_prefix: default_primary_prefix(),
            primary_suffix: default_primary_suffix(),
            companion_suffix: default_companion_suffix(),
            follow_links: false,
        }
    }
}

fn default_primary_prefix() -> String {
    "H5".to_string()
}

fn default_primary_suffix() -> String {
    "_data_test.dat".to_string()
}

fn default_companion_suffix() -> String {
    "_estado_cells_test.dat".to_string()
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load `.isletstat.toml` from a directory.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        let config_path = dir.join(CONFIG_FILE_NAME);

        if config_path.is_file() {
            Ok(Some(Self::load(&config_path)?))
        } else {
            Ok(None)
        }
    }

    /// Look for `.isletstat.toml` in each directory in turn and load the
    /// first one found, together with its path.
    ///
    /// A file that exists but cannot be read or parsed is an error; the
    /// search does not fall through to later directories or to defaults.
    pub fn discover(dirs: &[&Path]) -> Result<Option<(PathBuf, Self)>> {
        for dir in dirs {
            if let Some(config) = Self::load_from_dir(dir)? {
                return Ok(Some((dir.join(CONFIG_FILE_NAME), config)));
            }
        }
        Ok(None)
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    /// Only values the CLI actually provides are overridden.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref islets) = args.islets {
            self.filters.islets = Some(islets.clone());
        }
        if let Some(ref levels) = args.glucose_levels {
            self.filters.glucose_levels = Some(levels.clone());
        }
        if let Some(ref capillaries) = args.capillaries {
            self.filters.capillaries = Some(capillaries.clone());
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
