//! Results table generation.
//!
//! This module writes the aggregated rows as CSV (the default) or as a
//! JSON document carrying run metadata and batch counters.

use crate::models::{ResultRow, RunSummary};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::Path;

/// Metadata about one aggregation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// Base folder that was scanned.
    pub base_folder: String,
    /// Date and time the table was generated.
    pub analysis_date: DateTime<Utc>,
    /// Version of the tool that produced the table.
    pub tool_version: String,
    /// Duration of the aggregation in seconds.
    pub duration_seconds: f64,
}

/// The complete JSON report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub metadata: ReportMetadata,
    pub summary: RunSummary,
    pub rows: Vec<ResultRow>,
}

/// Write rows as CSV to any writer.
///
/// The header is always written, so an empty table yields a header-only file.
pub fn write_csv_to<W: Write>(writer: W, rows: &[ResultRow]) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);

    wtr.write_record(ResultRow::COLUMNS)?;
    for row in rows {
        wtr.serialize(row)
            .with_context(|| format!("Failed to serialize row for {}", row.folder))?;
    }
    wtr.flush()?;

    Ok(())
}

/// Write the CSV table to a file.
pub fn write_csv(rows: &[ResultRow], path: &Path) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    write_csv_to(std::io::BufWriter::new(file), rows)
        .with_context(|| format!("Failed to write {}", path.display()))
}

/// Generate a JSON report.
pub fn generate_json_report(report: &Report) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}

/// Write a JSON report to a file.
pub fn write_json_report(report: &Report, path: &Path) -> Result<()> {
    let content = generate_json_report(report)?;

    let mut file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    file.write_all(content.as_bytes())?;

    Ok(())
}
