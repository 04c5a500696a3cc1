//! Session record persistence
//!
//! Sinks accept the ordered record stream produced by a probe session and
//! write exactly one entry per record.

mod csv_file;

pub use csv_file::{results_file_name, CsvSink, RESULTS_FILE_PREFIX, RESULTS_FILE_SUFFIX};

use crate::models::SessionRecord;
use thiserror::Error;

/// Errors raised while persisting records
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("I/O error writing results: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to encode record: {0}")]
    Csv(#[from] csv::Error),

    #[error("sink already finished")]
    Finished,
}

/// Destination for session records
pub trait RecordSink: Send {
    /// Append one record, preserving call order
    fn write(&mut self, record: &SessionRecord) -> Result<(), SinkError>;

    /// Flush buffered output at the end of a session
    fn finish(&mut self) -> Result<(), SinkError>;
}

/// In-memory sink
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Vec<SessionRecord>,
    finished: bool,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[SessionRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<SessionRecord> {
        self.records
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

impl RecordSink for MemorySink {
    fn write(&mut self, record: &SessionRecord) -> Result<(), SinkError> {
        if self.finished {
            return Err(SinkError::Finished);
        }
        self.records.push(record.clone());
        Ok(())
    }

    fn finish(&mut self) -> Result<(), SinkError> {
        self.finished = true;
        Ok(())
    }
}
