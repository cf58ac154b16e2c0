//! Training CSV parser
//!
//! Positional, comma-split rows (no quoting support): a field containing a
//! comma shifts every following column. Rows are processed in fixed-size
//! batches; the async entry point yields to the runtime between batches so
//! a large upload does not starve other tasks.

use tracing::{debug, trace};

use super::fields::{parse_date, parse_duration, parse_level, parse_score};
use crate::error::{CoreError, IngestReport};
use crate::models::{SessionRecord, CSV_COLUMNS};

/// Rows handled between cooperative yields
pub const DEFAULT_BATCH_SIZE: usize = 100;

/// Records parsed from one CSV text
#[derive(Debug, Clone, Default)]
pub struct ParsedCsv {
    pub records: Vec<SessionRecord>,
    pub report: IngestReport,
}

/// Parser for the 11-column training CSV
#[derive(Debug, Clone)]
pub struct TrainingCsvParser {
    batch_size: usize,
}

impl Default for TrainingCsvParser {
    fn default() -> Self {
        Self::new()
    }
}

impl TrainingCsvParser {
    pub fn new() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    /// Override the batch size (minimum 1)
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Parse the whole text synchronously
    pub fn parse(&self, text: &str) -> Result<ParsedCsv, CoreError> {
        let lines = data_lines(text)?;
        let mut parsed = ParsedCsv::default();

        for batch in lines.chunks(self.batch_size) {
            parse_batch(batch, &mut parsed);
        }

        debug!(
            records = parsed.report.records,
            skipped = parsed.report.rows_skipped,
            "CSV parsed"
        );
        Ok(parsed)
    }

    /// Parse with a `yield_now` between batches
    ///
    /// Produces exactly what [`parse`](Self::parse) produces.
    pub async fn parse_cooperative(&self, text: &str) -> Result<ParsedCsv, CoreError> {
        let lines = data_lines(text)?;
        let mut parsed = ParsedCsv::default();

        for batch in lines.chunks(self.batch_size) {
            parse_batch(batch, &mut parsed);
            tokio::task::yield_now().await;
        }

        debug!(
            records = parsed.report.records,
            skipped = parsed.report.rows_skipped,
            batches = parsed.report.batches,
            "CSV parsed cooperatively"
        );
        Ok(parsed)
    }
}

/// Split into data lines, dropping the header
///
/// Fails with `EmptyInput` when the trimmed text has fewer than 2 lines.
fn data_lines(text: &str) -> Result<Vec<&str>, CoreError> {
    let trimmed = text.trim_start_matches('\u{feff}').trim();
    let lines: Vec<&str> = trimmed.split('\n').collect();
    if lines.len() < 2 {
        return Err(CoreError::EmptyInput);
    }
    Ok(lines[1..].to_vec())
}

fn parse_batch(batch: &[&str], parsed: &mut ParsedCsv) {
    let mut report = IngestReport {
        lines_read: batch.len(),
        batches: 1,
        ..IngestReport::default()
    };
    for line in batch {
        match parse_line(line) {
            Some(record) => {
                parsed.records.push(record);
                report.records += 1;
            }
            None => report.rows_skipped += 1,
        }
    }
    trace!(
        records = report.records,
        skipped = report.rows_skipped,
        "Batch parsed"
    );
    parsed.report.merge(report);
}

/// Parse one data line
///
/// `None` when the line has fewer than 11 columns or an unparsable date.
/// Columns beyond the 11th are ignored.
pub fn parse_line(line: &str) -> Option<SessionRecord> {
    let cols: Vec<&str> = line.split(',').map(str::trim).collect();
    if cols.len() < CSV_COLUMNS {
        return None;
    }

    let date = parse_date(cols[0])?;

    Some(SessionRecord {
        date,
        org: cols[1].to_string(),
        account: cols[2].to_string(),
        group: cols[3].to_string(),
        player: cols[4].to_string(),
        category: cols[5].to_string(),
        level: parse_level(cols[6]),
        lesson: cols[7].to_string(),
        score: parse_score(cols[8]),
        speech_time: parse_duration(cols[9]),
        play_time: parse_duration(cols[10]),
    })
}
