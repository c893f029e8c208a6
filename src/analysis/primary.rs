//! Primary data file parsing.
//!
//! A primary file is a whitespace-separated time series; only its last
//! record is used. Columns 2 and 3 of that record hold the average total
//! oxygen and the average medium oxygen.

use super::normalize_newlines;
use crate::error::{parse_number, ParseError};
use crate::models::PrimaryMetrics;
use std::fs;
use std::path::Path;

const TOTAL_OXYGEN_COLUMN: usize = 1;
const MEDIUM_OXYGEN_COLUMN: usize = 2;

/// Read the oxygen metrics from the last record of a primary file.
pub fn read_primary_metrics(path: &Path) -> Result<PrimaryMetrics, ParseError> {
    let content = fs::read_to_string(path)?;
    match parse_last_record(&content)? {
        Some(metrics) => Ok(metrics),
        None => Err(ParseError::Empty),
    }
}

/// Parse the last line of `content`. Returns `None` for empty content.
pub fn parse_last_record(content: &str) -> Result<Option<PrimaryMetrics>, ParseError> {
    let content = normalize_newlines(content);
    let Some(last) = content.lines().last() else {
        return Ok(None);
    };

    let columns: Vec<&str> = last.split_whitespace().collect();
    let total = column(&columns, TOTAL_OXYGEN_COLUMN)?;
    let medium = column(&columns, MEDIUM_OXYGEN_COLUMN)?;

    Ok(Some(PrimaryMetrics {
        avg_total_oxygen: Some(total),
        avg_medium_oxygen: Some(medium),
    }))
}

fn column(columns: &[&str], index: usize) -> Result<f64, ParseError> {
    let token = columns
        .get(index)
        .ok_or(ParseError::MissingColumn { column: index + 1 })?;
    parse_number(token)
}
