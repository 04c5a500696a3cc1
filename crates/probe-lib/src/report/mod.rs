//! Result visualisation model
//!
//! Reads a persisted record stream and reconstructs per-target baselines and
//! classifications for display. Classification is always recomputed here
//! with the same analysis the session controller uses.

mod chart;
mod discovery;

pub use chart::{build_chart, ChartPoint, ChartSeries, PointKind};
pub use discovery::{find_latest_results, list_results};

use crate::models::SessionRecord;
use std::io::Read;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while loading results for display
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("no rtt_results_*.csv found in {0}; run latency-probe first")]
    NoResults(PathBuf),

    #[error("I/O error reading results: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed results row: {0}")]
    Malformed(#[from] csv::Error),
}

/// Parse a record stream written by the CSV sink
pub fn read_records<R: Read>(reader: R) -> Result<Vec<SessionRecord>, ReportError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut records = Vec::new();
    for row in reader.deserialize() {
        records.push(row?);
    }
    Ok(records)
}

/// Parse the results file at `path`
pub fn read_records_file(path: impl AsRef<Path>) -> Result<Vec<SessionRecord>, ReportError> {
    let file = std::fs::File::open(path.as_ref())?;
    read_records(file)
}
