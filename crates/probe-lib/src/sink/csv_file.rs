//! Delimited results file sink
//!
//! Writes `timestamp,target_name,host,port,sample_index,rtt_ms` rows, one per
//! record. A failed attempt leaves `rtt_ms` empty.

use super::{RecordSink, SinkError};
use crate::models::SessionRecord;
use chrono::NaiveDateTime;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const RESULTS_FILE_PREFIX: &str = "rtt_results_";
pub const RESULTS_FILE_SUFFIX: &str = ".csv";

/// Results file name for a session started at `started_at`
///
/// Colons are replaced so the name is valid on every platform and sorts
/// chronologically.
pub fn results_file_name(started_at: NaiveDateTime) -> String {
    format!(
        "{}{}{}",
        RESULTS_FILE_PREFIX,
        started_at.format("%Y-%m-%dT%H-%M-%S"),
        RESULTS_FILE_SUFFIX
    )
}

/// Sink writing records as CSV rows
pub struct CsvSink<W: Write> {
    writer: Option<csv::Writer<W>>,
    path: Option<PathBuf>,
    rows: usize,
}

impl CsvSink<File> {
    /// Create (or truncate) a results file at `path`
    pub fn create(path: impl AsRef<Path>) -> Result<Self, SinkError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let file = File::create(&path)?;
        info!(path = %path.display(), "Writing results");

        let mut sink = Self::from_writer(file);
        sink.path = Some(path);
        Ok(sink)
    }
}

impl<W: Write> CsvSink<W> {
    pub fn from_writer(writer: W) -> Self {
        Self {
            writer: Some(csv::WriterBuilder::new().has_headers(true).from_writer(writer)),
            path: None,
            rows: 0,
        }
    }

    /// Path of the backing file, if any
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Number of rows written so far
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Finish the sink and hand back the underlying writer
    pub fn into_inner(mut self) -> Result<W, SinkError> {
        let writer = self.writer.take().ok_or(SinkError::Finished)?;
        writer.into_inner().map_err(|e| {
            SinkError::Io(std::io::Error::new(e.error().kind(), e.error().to_string()))
        })
    }
}

impl<W: Write + Send> RecordSink for CsvSink<W> {
    fn write(&mut self, record: &SessionRecord) -> Result<(), SinkError> {
        let writer = self.writer.as_mut().ok_or(SinkError::Finished)?;
        writer.serialize(record)?;
        self.rows += 1;
        Ok(())
    }

    fn finish(&mut self) -> Result<(), SinkError> {
        if let Some(writer) = self.writer.as_mut() {
            writer.flush()?;
            debug!(rows = self.rows, "Results flushed");
        }
        Ok(())
    }
}
