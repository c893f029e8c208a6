//! Run aggregation.
//!
//! This module ties the scanner, the metadata extractor, the filters and
//! the two file parsers together and produces one [`ResultRow`] per
//! primary file that passes the filters.

use super::companion::{companion_path, read_cell_summary};
use super::filter::RunFilter;
use super::metadata::extract_metadata;
use super::primary::read_primary_metrics;
use crate::config::ScannerConfig;
use crate::models::{CellSummary, PrimaryMetrics, ResultRow, RunMetadata, RunSummary};
use crate::scanner::{RunScanner, ScanConfig};
use anyhow::Result;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// A primary file together with the metadata of its folder.
#[derive(Debug, Clone)]
pub struct MatchedRun {
    pub primary: PathBuf,
    pub metadata: RunMetadata,
}

/// Rows of one aggregation pass and the counters collected along the way.
#[derive(Debug, Clone, Default)]
pub struct AggregateOutput {
    pub rows: Vec<ResultRow>,
    pub summary: RunSummary,
}

/// Walks a base folder and aggregates every matching run.
pub struct RunAggregator {
    scanner: RunScanner,
    filter: RunFilter,
    primary_suffix: String,
    companion_suffix: String,
}

impl RunAggregator {
    pub fn new(base: PathBuf, config: &ScannerConfig, filter: RunFilter) -> Self {
        Self {
            scanner: RunScanner::new(base, ScanConfig::from(config)),
            filter,
            primary_suffix: config.primary_suffix.clone(),
            companion_suffix: config.companion_suffix.clone(),
        }
    }

    pub fn base(&self) -> &Path {
        self.scanner.base()
    }

    /// List the runs that pass the filters, in scan order, without parsing them.
    pub fn matched_runs(&self) -> Result<Vec<MatchedRun>> {
        let mut summary = RunSummary::default();
        let runs = self
            .scanner
            .scan()?
            .filter_map(|primary| self.select(primary, &mut summary))
            .collect();
        Ok(runs)
    }

    /// Aggregate every run under the base folder.
    pub fn aggregate(&self) -> Result<AggregateOutput> {
        self.aggregate_with(|_| {})
    }

    /// Aggregate every run, calling `on_row` after each row is assembled.
    pub fn aggregate_with<F>(&self, mut on_row: F) -> Result<AggregateOutput>
    where
        F: FnMut(&ResultRow),
    {
        let mut output = AggregateOutput::default();

        for primary in self.scanner.scan()? {
            let Some(run) = self.select(primary, &mut output.summary) else {
                continue;
            };
            let row = self.analyze_run(run, &mut output.summary);
            on_row(&row);
            output.rows.push(row);
        }

        output.summary.rows = output.rows.len();
        info!(
            "Aggregated {} runs ({} matched, {} filtered out)",
            output.summary.rows, output.summary.files_matched, output.summary.files_filtered
        );

        Ok(output)
    }

    /// Derive metadata for a primary file and apply the filters.
    fn select(&self, primary: PathBuf, summary: &mut RunSummary) -> Option<MatchedRun> {
        summary.files_matched += 1;

        let metadata = extract_metadata(&folder_name(&primary));

        if !self.filter.accepts(&metadata) {
            debug!("Filtered out: {}", primary.display());
            summary.files_filtered += 1;
            return None;
        }

        Some(MatchedRun { primary, metadata })
    }

    /// Build the result row for a single run. Never fails: unreadable
    /// files leave their columns at the defaults.
    pub fn analyze_run(&self, run: MatchedRun, summary: &mut RunSummary) -> ResultRow {
        debug!("Analyzing {}", run.primary.display());

        let metrics = match read_primary_metrics(&run.primary) {
            Ok(metrics) => metrics,
            Err(e) => {
                warn!("Error reading file {}: {}", run.primary.display(), e);
                summary.primary_failures += 1;
                PrimaryMetrics::default()
            }
        };

        let cells = self.read_companion(&run.primary, summary);

        ResultRow::assemble(run.metadata, metrics, cells.as_ref())
    }

    fn read_companion(&self, primary: &Path, summary: &mut RunSummary) -> Option<CellSummary> {
        let path = companion_path(primary, &self.primary_suffix, &self.companion_suffix)
            .filter(|p| p.is_file());

        let Some(path) = path else {
            debug!("No companion file for {}", primary.display());
            summary.companions_missing += 1;
            return None;
        };

        match read_cell_summary(&path) {
            Ok(cells) => {
                debug!("Read {} cells from {}", cells.num_cells, path.display());
                summary.malformed_lines += cells.malformed_lines;
                Some(cells)
            }
            Err(e) => {
                warn!("Error reading file {}: {}", path.display(), e);
                summary.companions_unreadable += 1;
                None
            }
        }
    }
}

/// Name of the directory holding `primary`. A parent with no final
/// name component, such as `.` or `..`, is returned as written.
fn folder_name(primary: &Path) -> String {
    let Some(parent) = primary.parent() else {
        return String::new();
    };
    match parent.file_name() {
        Some(name) => name.to_string_lossy().into_owned(),
        None => parent.display().to_string(),
    }
}
