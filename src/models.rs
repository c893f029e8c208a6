//! Data models for the run aggregator.
//!
//! This module contains the core data structures used throughout
//! the application for representing run metadata, parsed metrics,
//! per-population cell statistics, and the output rows.

use serde::{Deserialize, Serialize};

/// Metadata encoded in the name of a run's folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunMetadata {
    /// Name of the folder holding the run files.
    pub folder: String,
    /// Islet identifier (e.g. `H51`).
    pub islet: Option<String>,
    /// Glucose level (e.g. `G6`).
    pub glucose: Option<String>,
    /// Number of capillaries (from `<n>_capilares`).
    pub capillaries: Option<i64>,
}

/// Oxygen metrics taken from the last record of a primary data file.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PrimaryMetrics {
    /// Average oxygen over the whole domain.
    pub avg_total_oxygen: Option<f64>,
    /// Average oxygen in the surrounding medium.
    pub avg_medium_oxygen: Option<f64>,
}

/// Cell population, decoded from the numeric type column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellType {
    Beta,
    Alpha,
    Delta,
    Unclassified,
}

impl CellType {
    /// Decode a type code. Only the exact values 1, 2 and 3 are classified.
    pub fn from_code(code: f64) -> Self {
        if code == 1.0 {
            CellType::Beta
        } else if code == 2.0 {
            CellType::Alpha
        } else if code == 3.0 {
            CellType::Delta
        } else {
            CellType::Unclassified
        }
    }
}

/// Viability state of a cell, decoded from the numeric state column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellState {
    Functional,
    Hypoxic,
    NonViable,
    Unclassified,
}

impl CellState {
    pub fn from_code(code: i64) -> Self {
        match code {
            1 => CellState::Functional,
            2 => CellState::Hypoxic,
            3 => CellState::NonViable,
            _ => CellState::Unclassified,
        }
    }
}

/// One well-formed line of a companion cell-state file.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellRecord {
    pub cell_type: CellType,
    pub oxygen: f64,
    pub state: CellState,
}

/// Tally of cells per viability state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StateCounts {
    pub functional: usize,
    pub hypoxic: usize,
    pub non_viable: usize,
}

impl StateCounts {
    /// Count one cell. Unclassified states are not tallied.
    pub fn record(&mut self, state: CellState) {
        match state {
            CellState::Functional => self.functional += 1,
            CellState::Hypoxic => self.hypoxic += 1,
            CellState::NonViable => self.non_viable += 1,
            CellState::Unclassified => {}
        }
    }

    /// Proportions of each state relative to `total`, all zero when `total` is zero.
    pub fn proportions(&self, total: usize) -> StateProportions {
        StateProportions {
            functional: ratio(self.functional, total),
            hypoxic: ratio(self.hypoxic, total),
            non_viable: ratio(self.non_viable, total),
        }
    }
}

/// Share of cells per viability state.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StateProportions {
    pub functional: f64,
    pub hypoxic: f64,
    pub non_viable: f64,
}

/// Accumulated statistics for one cell-type bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PopulationStats {
    /// Number of cells routed to this bucket.
    pub count: usize,
    /// Sum of the oxygen values of those cells.
    pub oxygen_sum: f64,
    /// State tally within the bucket.
    pub states: StateCounts,
}

impl PopulationStats {
    pub fn record(&mut self, oxygen: f64, state: CellState) {
        self.count += 1;
        self.oxygen_sum += oxygen;
        self.states.record(state);
    }

    /// Mean oxygen of the bucket, 0 for an empty bucket.
    pub fn avg_oxygen(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.oxygen_sum / self.count as f64
        }
    }

    pub fn proportions(&self) -> StateProportions {
        self.states.proportions(self.count)
    }
}

/// Per-cell aggregation of one companion file.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CellSummary {
    /// Total line count of the companion file, malformed lines included.
    pub num_cells: usize,
    pub alpha: PopulationStats,
    pub beta: PopulationStats,
    pub delta: PopulationStats,
    /// State tally over every well-formed line, whatever its cell type.
    pub overall: StateCounts,
    /// Lines skipped because they could not be parsed.
    pub malformed_lines: usize,
}

impl CellSummary {
    /// Route one parsed cell into its bucket and the overall tally.
    pub fn record(&mut self, cell: &CellRecord) {
        match cell.cell_type {
            CellType::Alpha => self.alpha.record(cell.oxygen, cell.state),
            CellType::Beta => self.beta.record(cell.oxygen, cell.state),
            CellType::Delta => self.delta.record(cell.oxygen, cell.state),
            CellType::Unclassified => {}
        }
        self.overall.record(cell.state);
    }

    /// Bucketed oxygen divided by the total line count.
    ///
    /// Oxygen of unclassified cells is left out of the sum while the
    /// denominator still counts every line of the file.
    pub fn avg_cell_oxygen(&self) -> f64 {
        if self.num_cells == 0 {
            return 0.0;
        }
        let sum = self.alpha.oxygen_sum + self.beta.oxygen_sum + self.delta.oxygen_sum;
        sum / self.num_cells as f64
    }

    pub fn overall_proportions(&self) -> StateProportions {
        self.overall.proportions(self.num_cells)
    }
}

/// One output row: a run's metadata, primary metrics and cell statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRow {
    #[serde(rename = "Folder")]
    pub folder: String,
    #[serde(rename = "Islet")]
    pub islet: Option<String>,
    #[serde(rename = "Glucose")]
    pub glucose: Option<String>,
    #[serde(rename = "Capillaries")]
    pub capillaries: Option<i64>,
    #[serde(rename = "Avg_Total_Oxygen")]
    pub avg_total_oxygen: Option<f64>,
    #[serde(rename = "Avg_Medium_Oxygen")]
    pub avg_medium_oxygen: Option<f64>,
    #[serde(rename = "Num_Cells")]
    pub num_cells: usize,
    #[serde(rename = "Num_Alpha")]
    pub num_alpha: usize,
    #[serde(rename = "Num_Beta")]
    pub num_beta: usize,
    #[serde(rename = "Num_Delta")]
    pub num_delta: usize,
    #[serde(rename = "Avg_Cell_Oxygen")]
    pub avg_cell_oxygen: f64,
    #[serde(rename = "Avg_Alpha_Oxygen")]
    pub avg_alpha_oxygen: Option<f64>,
    #[serde(rename = "Avg_Beta_Oxygen")]
    pub avg_beta_oxygen: Option<f64>,
    #[serde(rename = "Avg_Delta_Oxygen")]
    pub avg_delta_oxygen: Option<f64>,
    #[serde(rename = "Functional_Prop")]
    pub functional_prop: Option<f64>,
    #[serde(rename = "Hypoxic_Prop")]
    pub hypoxic_prop: Option<f64>,
    #[serde(rename = "Non_Viable_Prop")]
    pub non_viable_prop: Option<f64>,
    #[serde(rename = "Functional_Alpha_Prop")]
    pub functional_alpha_prop: Option<f64>,
    #[serde(rename = "Hypoxic_Alpha_Prop")]
    pub hypoxic_alpha_prop: Option<f64>,
    #[serde(rename = "Non_Viable_Alpha_Prop")]
    pub non_viable_alpha_prop: Option<f64>,
    #[serde(rename = "Functional_Beta_Prop")]
    pub functional_beta_prop: Option<f64>,
    #[serde(rename = "Hypoxic_Beta_Prop")]
    pub hypoxic_beta_prop: Option<f64>,
    #[serde(rename = "Non_Viable_Beta_Prop")]
    pub non_viable_beta_prop: Option<f64>,
    #[serde(rename = "Functional_Delta_Prop")]
    pub functional_delta_prop: Option<f64>,
    #[serde(rename = "Hypoxic_Delta_Prop")]
    pub hypoxic_delta_prop: Option<f64>,
    #[serde(rename = "Non_Viable_Delta_Prop")]
    pub non_viable_delta_prop: Option<f64>,
}

impl ResultRow {
    /// Output column names, in table order.
    pub const COLUMNS: [&'static str; 26] = [
        "Folder",
        "Islet",
        "Glucose",
        "Capillaries",
        "Avg_Total_Oxygen",
        "Avg_Medium_Oxygen",
        "Num_Cells",
        "Num_Alpha",
        "Num_Beta",
        "Num_Delta",
        "Avg_Cell_Oxygen",
        "Avg_Alpha_Oxygen",
        "Avg_Beta_Oxygen",
        "Avg_Delta_Oxygen",
        "Functional_Prop",
        "Hypoxic_Prop",
        "Non_Viable_Prop",
        "Functional_Alpha_Prop",
        "Hypoxic_Alpha_Prop",
        "Non_Viable_Alpha_Prop",
        "Functional_Beta_Prop",
        "Hypoxic_Beta_Prop",
        "Non_Viable_Beta_Prop",
        "Functional_Delta_Prop",
        "Hypoxic_Delta_Prop",
        "Non_Viable_Delta_Prop",
    ];

    /// Assemble a row. Without a cell summary the counts and the overall
    /// cell oxygen are zero and every other cell column is null.
    pub fn assemble(
        metadata: RunMetadata,
        metrics: PrimaryMetrics,
        cells: Option<&CellSummary>,
    ) -> Self {
        let mut row = Self {
            folder: metadata.folder,
            islet: metadata.islet,
            glucose: metadata.glucose,
            capillaries: metadata.capillaries,
            avg_total_oxygen: metrics.avg_total_oxygen,
            avg_medium_oxygen: metrics.avg_medium_oxygen,
            num_cells: 0,
            num_alpha: 0,
            num_beta: 0,
            num_delta: 0,
            avg_cell_oxygen: 0.0,
            avg_alpha_oxygen: None,
            avg_beta_oxygen: None,
            avg_delta_oxygen: None,
            functional_prop: None,
            hypoxic_prop: None,
            non_viable_prop: None,
            functional_alpha_prop: None,
            hypoxic_alpha_prop: None,
            non_viable_alpha_prop: None,
            functional_beta_prop: None,
            hypoxic_beta_prop: None,
            non_viable_beta_prop: None,
            functional_delta_prop: None,
            hypoxic_delta_prop: None,
            non_viable_delta_prop: None,
        };

        let Some(cells) = cells else {
            return row;
        };

        row.num_cells = cells.num_cells;
        row.num_alpha = cells.alpha.count;
        row.num_beta = cells.beta.count;
        row.num_delta = cells.delta.count;
        row.avg_cell_oxygen = cells.avg_cell_oxygen();
        row.avg_alpha_oxygen = Some(cells.alpha.avg_oxygen());
        row.avg_beta_oxygen = Some(cells.beta.avg_oxygen());
        row.avg_delta_oxygen = Some(cells.delta.avg_oxygen());

        let overall = cells.overall_proportions();
        row.functional_prop = Some(overall.functional);
        row.hypoxic_prop = Some(overall.hypoxic);
        row.non_viable_prop = Some(overall.non_viable);

        let alpha = cells.alpha.proportions();
        row.functional_alpha_prop = Some(alpha.functional);
        row.hypoxic_alpha_prop = Some(alpha.hypoxic);
        row.non_viable_alpha_prop = Some(alpha.non_viable);

        let beta = cells.beta.proportions();
        row.functional_beta_prop = Some(beta.functional);
        row.hypoxic_beta_prop = Some(beta.hypoxic);
        row.non_viable_beta_prop = Some(beta.non_viable);

        let delta = cells.delta.proportions();
        row.functional_delta_prop = Some(delta.functional);
        row.hypoxic_delta_prop = Some(delta.hypoxic);
        row.non_viable_delta_prop = Some(delta.non_viable);

        row
    }
}

/// Batch-level counters for one aggregation run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Primary files matched by name.
    pub files_matched: usize,
    /// Primary files rejected by the metadata filters.
    pub files_filtered: usize,
    /// Rows emitted.
    pub rows: usize,
    /// Primary files whose metrics could not be read.
    pub primary_failures: usize,
    /// Runs without a companion cell-state file.
    pub companions_missing: usize,
    /// Companion files that exist but could not be read.
    pub companions_unreadable: usize,
    /// Companion lines skipped as malformed, over all runs.
    pub malformed_lines: usize,
}

fn ratio(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64
    }
}
