//! Companion cell-state file location and aggregation.
//!
//! Each line of a companion file describes one simulated cell as four
//! whitespace-separated numbers: `id cell_type oxygen state`.

use super::normalize_newlines;
use crate::error::{parse_number, ParseError};
use crate::models::{CellRecord, CellState, CellSummary, CellType};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

const FIELDS_PER_LINE: usize = 4;

/// Build the companion path for a primary file: the primary suffix is
/// replaced by the companion suffix, in the same directory.
///
/// Returns `None` if the primary file name does not end with `primary_suffix`.
pub fn companion_path(
    primary: &Path,
    primary_suffix: &str,
    companion_suffix: &str,
) -> Option<PathBuf> {
    let name = primary.file_name()?.to_str()?;
    let stem = name.strip_suffix(primary_suffix)?;
    Some(primary.with_file_name(format!("{stem}{companion_suffix}")))
}

/// Parse one companion line into a cell record.
pub fn parse_cell_line(line: &str) -> Result<CellRecord, ParseError> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() != FIELDS_PER_LINE {
        return Err(ParseError::FieldCount {
            expected: FIELDS_PER_LINE,
            found: fields.len(),
        });
    }

    let values = [
        parse_number(fields[0])?,
        parse_number(fields[1])?,
        parse_number(fields[2])?,
        parse_number(fields[3])?,
    ];
    let [_id, cell_type, oxygen, state] = values;

    if !state.is_finite() {
        return Err(ParseError::NonFiniteState(state));
    }

    Ok(CellRecord {
        cell_type: CellType::from_code(cell_type),
        oxygen,
        // Truncates toward zero, e.g. 1.9 -> 1.
        state: CellState::from_code(state as i64),
    })
}

/// Aggregate the content of a companion file.
///
/// Every line counts toward `num_cells`; lines that fail to parse are
/// logged against `source` and contribute nothing else.
pub fn summarize_cells(content: &str, source: &Path) -> CellSummary {
    let mut summary = CellSummary::default();

    for (index, line) in normalize_newlines(content).lines().enumerate() {
        summary.num_cells += 1;
        match parse_cell_line(line) {
            Ok(cell) => summary.record(&cell),
            Err(e) => {
                summary.malformed_lines += 1;
                warn!(
                    "{}:{}: skipping malformed line '{}': {}",
                    source.display(),
                    index + 1,
                    line.trim(),
                    e
                );
            }
        }
    }

    summary
}

/// Read and aggregate a companion file.
pub fn read_cell_summary(path: &Path) -> Result<CellSummary, ParseError> {
    let content = fs::read_to_string(path)?;
    Ok(summarize_cells(&content, path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn summarize(content: &str) -> CellSummary {
        summarize_cells(content, Path::new("test_estado_cells_test.dat"))
    }

    #[test]
    fn test_companion_path() {
        let path = companion_path(
            Path::new("/runs/H51_G6/H51_G6_data_test.dat"),
            "_data_test.dat",
            "_estado_cells_test.dat",
        );
        assert_eq!(
            path,
            Some(PathBuf::from("/runs/H51_G6/H51_G6_estado_cells_test.dat"))
        );
    }

    #[test]
    fn test_companion_path_requires_suffix() {
        let path = companion_path(
            Path::new("/runs/H51.dat"),
            "_data_test.dat",
            "_estado_cells_test.dat",
        );
        assert_eq!(path, None);
    }

    #[test]
    fn test_parse_cell_line() {
        let cell = parse_cell_line("  7\t2 5.5 1 ").unwrap();
        assert_eq!(cell.cell_type, CellType::Alpha);
        assert_eq!(cell.oxygen, 5.5);
        assert_eq!(cell.state, CellState::Functional);
    }

    #[test]
    fn test_parse_cell_line_truncates_state() {
        let cell = parse_cell_line("1 1 0.5 2.9").unwrap();
        assert_eq!(cell.state, CellState::Hypoxic);
    }

    #[test]
    fn test_parse_cell_line_errors() {
        assert!(matches!(
            parse_cell_line("1 2 3.0"),
            Err(ParseError::FieldCount { found: 3, .. })
        ));
        assert!(matches!(
            parse_cell_line("1 2 3.0 1 extra"),
            Err(ParseError::FieldCount { found: 5, .. })
        ));
        assert!(matches!(
            parse_cell_line("1 alpha 3.0 1"),
            Err(ParseError::InvalidNumber { .. })
        ));
        assert!(matches!(
            parse_cell_line("1 2 3.0 nan"),
            Err(ParseError::NonFiniteState(_))
        ));
    }

    #[test]
    fn test_mixed_population_scenario() {
        let summary = summarize("1 2 5.0 1\n2 1 3.0 2\n3 3 1.0 3\n4 99 9.0 1\n");

        assert_eq!(summary.num_cells, 4);
        assert_eq!(summary.alpha.count, 1);
        assert_eq!(summary.beta.count, 1);
        assert_eq!(summary.delta.count, 1);
        assert_eq!(summary.malformed_lines, 0);

        let overall = summary.overall_proportions();
        assert_eq!(overall.functional, 0.5);
        assert_eq!(overall.hypoxic, 0.25);
        assert_eq!(overall.non_viable, 0.25);
        assert_eq!(summary.avg_cell_oxygen(), 2.25);

        assert_eq!(summary.alpha.avg_oxygen(), 5.0);
        assert_eq!(summary.alpha.proportions().functional, 1.0);
        assert_eq!(summary.beta.proportions().hypoxic, 1.0);
        assert_eq!(summary.delta.proportions().non_viable, 1.0);
    }

    #[test]
    fn test_malformed_lines_still_count_as_cells() {
        let summary = summarize("1 2 4.0 1\nbroken line\n\n2 2 x 1\n3 2 2.0 2\n");

        assert_eq!(summary.num_cells, 5);
        assert_eq!(summary.malformed_lines, 3);
        assert_eq!(summary.alpha.count, 2);
        assert_eq!(summary.alpha.avg_oxygen(), 3.0);
        assert_eq!(summary.overall.functional, 1);
        assert_eq!(summary.overall_proportions().functional, 0.2);
        assert_eq!(summary.avg_cell_oxygen(), 6.0 / 5.0);
    }

    #[test]
    fn test_carriage_return_line_endings() {
        let summary = summarize("1 1 2.0 1\r2 3 4.0 3\r\n3 2 6.0 2\r");

        assert_eq!(summary.num_cells, 3);
        assert_eq!(summary.malformed_lines, 0);
        assert_eq!(summary.beta.count, 1);
        assert_eq!(summary.delta.count, 1);
        assert_eq!(summary.alpha.count, 1);
    }

    #[test]
    fn test_empty_buckets_are_zero() {
        let summary = summarize("1 1 4.0 1\n");

        assert_eq!(summary.alpha.count, 0);
        assert_eq!(summary.alpha.avg_oxygen(), 0.0);
        let props = summary.delta.proportions();
        assert_eq!(props.functional, 0.0);
        assert_eq!(props.hypoxic, 0.0);
        assert_eq!(props.non_viable, 0.0);
    }

    #[test]
    fn test_empty_file() {
        let summary = summarize("");
        assert_eq!(summary.num_cells, 0);
        assert_eq!(summary.avg_cell_oxygen(), 0.0);
        assert_eq!(summary.overall_proportions().functional, 0.0);
    }

    #[test]
    fn test_read_cell_summary() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("H51_estado_cells_test.dat");
        std::fs::write(&path, "1 1 2.0 1\n2 3 4.0 3\n").unwrap();

        let summary = read_cell_summary(&path).unwrap();
        assert_eq!(summary.num_cells, 2);
        assert_eq!(summary.beta.count, 1);
        assert_eq!(summary.delta.count, 1);
        assert_eq!(summary.avg_cell_oxygen(), 3.0);
    }

    #[test]
    fn test_read_missing_cell_file() {
        let dir = TempDir::new().unwrap();
        let result = read_cell_summary(&dir.path().join("missing.dat"));
        assert!(matches!(result, Err(ParseError::Io(_))));
    }
}
