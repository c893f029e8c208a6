//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::Parser;
use std::path::{Path, PathBuf};

/// isletstat - aggregate islet oxygenation simulation runs
///
/// Walks a folder of simulation runs, reads each `H5*_data_test.dat`
/// file and its `*_estado_cells_test.dat` companion, and writes one
/// summary row per run to `<BASE_FOLDER>/analysis_results.csv`.
///
/// Examples:
///   isletstat ./simulations
///   isletstat ./simulations --islets H51 H52 --glucose_levels G6
///   isletstat ./simulations --capillaries 5,10 --format json
///   isletstat ./simulations --dry-run
///   isletstat --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Base folder containing the simulation run folders
    #[arg(value_name = "BASE_FOLDER", required_unless_present = "init_config")]
    pub base_folder: Option<PathBuf>,

    /// Islet identifiers to include (e.g. H51 H52)
    #[arg(long, value_name = "ID", num_args = 1.., value_delimiter = ',')]
    pub islets: Option<Vec<String>>,

    /// Glucose levels to include (e.g. G6 G7)
    #[arg(
        long = "glucose_levels",
        visible_alias = "glucose-levels",
        value_name = "LEVEL",
        num_args = 1..,
        value_delimiter = ','
    )]
    pub glucose_levels: Option<Vec<String>>,

    /// Capillary counts to include (e.g. 5 10)
    #[arg(long, value_name = "COUNT", num_args = 1.., value_delimiter = ',')]
    pub capillaries: Option<Vec<i64>>,

    /// Output file path for the results table
    ///
    /// Defaults to `analysis_results.csv` (or `.json`) inside the base folder
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output format (csv, json)
    #[arg(long, default_value = "csv", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Path to configuration file
    ///
    /// If not specified, looks for .isletstat.toml in the current directory,
    /// then in the base folder
    #[arg(short, long, value_name = "FILE", env = "ISLETSTAT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Dry run: list the runs that would be aggregated and exit
    #[arg(long)]
    pub dry_run: bool,

    /// Generate a default .isletstat.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the results table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Comma-separated values (default)
    #[default]
    Csv,
    /// JSON document with run metadata and summary
    Json,
}

impl OutputFormat {
    /// File extension used for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Json => "json",
        }
    }
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get the base folder. Empty when only `--init-config` was given.
    pub fn base_folder(&self) -> &Path {
        self.base_folder.as_deref().unwrap_or(Path::new(""))
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        let base = self.base_folder();
        if !base.exists() {
            return Err(format!("Base folder does not exist: {}", base.display()));
        }
        if !base.is_dir() {
            return Err(format!("Base path is not a directory: {}", base.display()));
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }

    /// Resolve where the results table is written.
    ///
    /// An explicit `--output` wins; otherwise `file_name` is placed in the
    /// base folder with its extension matched to the output format.
    pub fn output_path(&self, file_name: &str) -> PathBuf {
        if let Some(ref output) = self.output {
            return output.clone();
        }
        self.base_folder()
            .join(file_name)
            .with_extension(self.format.extension())
    }
}
