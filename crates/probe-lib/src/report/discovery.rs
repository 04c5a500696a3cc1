//! Results file discovery

use super::ReportError;
use crate::sink::{RESULTS_FILE_PREFIX, RESULTS_FILE_SUFFIX};
use std::path::{Path, PathBuf};

/// All results files in `dir`, sorted by name
///
/// File names embed the session start time, so name order is chronological.
pub fn list_results(dir: impl AsRef<Path>) -> Result<Vec<PathBuf>, ReportError> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir.as_ref())?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && is_results_file(path))
        .collect();

    files.sort();
    Ok(files)
}

/// Most recent results file in `dir`
pub fn find_latest_results(dir: impl AsRef<Path>) -> Result<PathBuf, ReportError> {
    let dir = dir.as_ref();
    list_results(dir)?
        .pop()
        .ok_or_else(|| ReportError::NoResults(dir.to_path_buf()))
}

fn is_results_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(|name| name.starts_with(RESULTS_FILE_PREFIX) && name.ends_with(RESULTS_FILE_SUFFIX))
        .unwrap_or(false)
}
