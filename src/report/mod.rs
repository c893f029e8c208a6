//! Report output.

pub mod generator;

pub use generator::{write_csv, write_json_report, Report, ReportMetadata};
