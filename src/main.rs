//! isletstat - islet oxygenation simulation run aggregator
//!
//! A CLI tool that walks a folder of simulation runs and writes one
//! summary row per run: folder metadata, the final oxygen averages of
//! the primary data file, and per-population cell statistics from the
//! companion cell-state file.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (base folder unreadable, bad config, write failure, etc.)

mod analysis;
mod cli;
mod config;
mod error;
mod models;
mod report;
mod scanner;

use analysis::{RunAggregator, RunFilter};
use anyhow::{Context, Result};
use chrono::Utc;
use cli::{Args, OutputFormat};
use config::Config;
use indicatif::{ProgressBar, ProgressStyle};
use models::RunSummary;
use report::{Report, ReportMetadata};
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::{debug, error, info};
use tracing_subscriber::FmtSubscriber;

fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Initialize logging
    init_logging(&args);

    info!("isletstat v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    if let Err(e) = run_aggregation(args) {
        error!("Aggregation failed: {:#}", e);
        eprintln!("\n❌ Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// Handle --init-config: generate a default .isletstat.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(config::CONFIG_FILE_NAME);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            config::CONFIG_FILE_NAME
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", config::CONFIG_FILE_NAME))?;

    println!("✅ Created {} with default settings.", config::CONFIG_FILE_NAME);
    println!("   Edit it to set default filters, file patterns, and the output name.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Run the complete aggregation workflow.
fn run_aggregation(args: Args) -> Result<()> {
    let start_time = Instant::now();

    // Load configuration
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);

    let base = args.base_folder().to_path_buf();
    let filter = RunFilter::from(&config.filters);
    if !filter.is_unrestricted() {
        info!("Filters: {:?}", config.filters);
    }

    let aggregator = RunAggregator::new(base.clone(), &config.scanner, filter);

    // Handle --dry-run: list matched runs and exit
    if args.dry_run {
        return handle_dry_run(&aggregator);
    }

    println!("🔬 Aggregating runs under {}", base.display());

    let output = if args.quiet || args.verbose {
        aggregator.aggregate()?
    } else {
        let pb = make_spinner();
        let output = aggregator.aggregate_with(|row| {
            pb.set_message(row.folder.clone());
            pb.inc(1);
        });
        pb.finish_and_clear();
        output?
    };

    // Write the results table
    let output_path = args.output_path(&config.general.output_file);
    match args.format {
        OutputFormat::Csv => report::write_csv(&output.rows, &output_path)?,
        OutputFormat::Json => {
            let report = Report {
                metadata: ReportMetadata {
                    base_folder: base.display().to_string(),
                    analysis_date: Utc::now(),
                    tool_version: env!("CARGO_PKG_VERSION").to_string(),
                    duration_seconds: start_time.elapsed().as_secs_f64(),
                },
                summary: output.summary.clone(),
                rows: output.rows,
            };
            report::write_json_report(&report, &output_path)?;
        }
    }

    print_summary(&output.summary, start_time.elapsed().as_secs_f64());
    println!(
        "\n✅ Analysis complete. Results saved to {}",
        output_path.display()
    );

    Ok(())
}

fn make_spinner() -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {pos} runs {wide_msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.enable_steady_tick(Duration::from_millis(120));
    pb
}

/// Print the batch counters.
fn print_summary(summary: &RunSummary, duration: f64) {
    println!("\n📊 Aggregation Summary:");
    println!("   Primary files matched: {}", summary.files_matched);
    if summary.files_filtered > 0 {
        println!("   Filtered out: {}", summary.files_filtered);
    }
    println!("   Rows written: {}", summary.rows);
    if summary.primary_failures > 0 {
        println!(
            "   ⚠️  Primary files without metrics: {}",
            summary.primary_failures
        );
    }
    if summary.companions_missing > 0 || summary.companions_unreadable > 0 {
        println!(
            "   Companion files missing: {} | unreadable: {}",
            summary.companions_missing, summary.companions_unreadable
        );
    }
    if summary.malformed_lines > 0 {
        println!("   Malformed cell lines skipped: {}", summary.malformed_lines);
    }
    println!("   Duration: {:.1}s", duration);
}

/// Handle --dry-run: list the runs that would be aggregated, exit.
fn handle_dry_run(aggregator: &RunAggregator) -> Result<()> {
    println!(
        "\n🔍 Dry run: scanning {} (no files parsed)...\n",
        aggregator.base().display()
    );

    let runs = aggregator.matched_runs()?;

    if runs.is_empty() {
        println!("   No matching runs found.");
    } else {
        println!("   Found {} runs that would be aggregated:\n", runs.len());
        for run in &runs {
            println!("     📄 {}", run.primary.display());
        }
        println!("\n   Total: {} runs", runs.len());
    }

    println!("\n✅ Dry run complete. No output was written.");
    Ok(())
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try the working directory, then the base folder
    if let Some((path, config)) = Config::discover(&[Path::new("."), args.base_folder()])? {
        info!("Loaded config from {}", path.display());
        return Ok(config);
    }

    debug!("No config file found, using defaults");
    Ok(Config::default())
}
