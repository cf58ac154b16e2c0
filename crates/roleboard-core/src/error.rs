//! Error types for roleboard-core
//!
//! Ingestion is best-effort: only whole-input failures become errors.
//! Row and field anomalies are absorbed and show up as counts in
//! [`IngestReport`].

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for roleboard operations
#[derive(Error, Debug)]
pub enum CoreError {
    // ===================
    // Ingestion Errors
    // ===================
    #[error("CSV input is empty or has no data rows")]
    EmptyInput,

    #[error("Failed to read file: {path}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ===================
    // Filter Errors
    // ===================
    #[error("Invalid month '{value}' (expected YYYY-MM)")]
    InvalidMonth { value: String },

    // ===================
    // Export Errors
    // ===================
    #[error("Failed to write file: {path}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize {what} to JSON")]
    JsonSerialize {
        what: String,
        #[source]
        source: serde_json::Error,
    },
}

impl CoreError {
    /// Short actionable hint for presentation layers
    pub fn suggestion(&self) -> Option<String> {
        match self {
            CoreError::EmptyInput => {
                Some("Provide a header line followed by at least one data row".to_string())
            }
            CoreError::FileRead { path, .. } => {
                Some(format!("Check the file exists and is UTF-8: {}", path.display()))
            }
            CoreError::InvalidMonth { .. } => Some("Use a month such as 2024-03".to_string()),
            _ => None,
        }
    }
}

/// Outcome of a successful ingestion
///
/// Skipped rows are only ever counted, never itemized.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestReport {
    /// Data lines seen (header excluded)
    pub lines_read: usize,
    /// Records kept
    pub records: usize,
    /// Lines dropped for short column count or unparsable date
    pub rows_skipped: usize,
    /// Batches processed
    pub batches: usize,
}

impl IngestReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if any row was dropped
    pub fn has_skipped_rows(&self) -> bool {
        self.rows_skipped > 0
    }

    /// Merge another report into this one
    pub fn merge(&mut self, other: IngestReport) {
        self.lines_read += other.lines_read;
        self.records += other.records;
        self.rows_skipped += other.rows_skipped;
        self.batches += other.batches;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ingest_report_merge() {
        let mut report1 = IngestReport::new();
        report1.lines_read = 100;
        report1.records = 98;
        report1.rows_skipped = 2;
        report1.batches = 1;

        let mut report2 = IngestReport::new();
        report2.lines_read = 5;
        report2.records = 5;
        report2.batches = 1;

        report1.merge(report2);

        assert_eq!(report1.lines_read, 105);
        assert_eq!(report1.records, 103);
        assert_eq!(report1.batches, 2);
        assert!(report1.has_skipped_rows());
    }

    #[test]
    fn test_error_suggestions() {
        assert!(CoreError::EmptyInput.suggestion().is_some());
        let err = CoreError::InvalidMonth {
            value: "2024-13".to_string(),
        };
        assert!(err.to_string().contains("2024-13"));
        assert!(err.suggestion().is_some());
    }
}
