//! Export of records and derived views
//!
//! CSV output uses the same 11-column layout ingestion reads, so an export
//! can be loaded back. Fields are written bare; a value containing a comma
//! will misalign on re-ingest just as it would in any hand-written input.

use anyhow::{Context, Result};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::CoreError;
use crate::models::{SessionRecord, CSV_HEADER};

/// Date format written to CSV; read back by the ingest date parser
///
/// Fractional seconds are written only when present.
pub const EXPORT_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// Export records to CSV in ingest column order
///
/// # Errors
/// Returns error if directory creation, file creation or a write fails
///
/// # Examples
///
/// ```no_run
/// use roleboard_core::export::export_records_to_csv;
/// use std::path::Path;
///
/// export_records_to_csv(&[], Path::new("sessions.csv")).unwrap();
/// ```
pub fn export_records_to_csv(records: &[SessionRecord], path: &Path) -> Result<()> {
    let mut writer = create_writer(path)?;

    writeln!(writer, "{}", CSV_HEADER.join(",")).context("Failed to write CSV header")?;

    for record in records {
        writeln!(
            writer,
            "{},{},{},{},{},{},{},{},{},{},{}",
            record.date.format(EXPORT_DATE_FORMAT),
            record.org,
            record.account,
            record.group,
            record.player,
            record.category,
            record.level,
            record.lesson,
            record.score,
            record.speech_time,
            record.play_time
        )
        .with_context(|| format!("Failed to write row for player {}", record.player))?;
    }

    writer.flush().context("Failed to flush CSV writer")?;
    Ok(())
}

/// Export any serializable view as pretty JSON
pub fn export_view_to_json<T: Serialize + ?Sized>(view: &T, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(view).map_err(|source| CoreError::JsonSerialize {
        what: std::any::type_name::<T>().to_string(),
        source,
    })?;

    let mut writer = create_writer(path)?;
    writer
        .write_all(json.as_bytes())
        .map_err(|source| CoreError::FileWrite {
            path: path.to_path_buf(),
            source,
        })?;
    writer.flush().context("Failed to flush JSON writer")?;
    Ok(())
}

fn create_writer(path: &Path) -> Result<BufWriter<File>> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    let file = File::create(path).map_err(|source| CoreError::FileWrite {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(BufWriter::new(file))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::TrainingCsvParser;
    use chrono::NaiveDate;
    use tempfile::tempdir;

    fn record(player: &str, score: i64) -> SessionRecord {
        SessionRecord {
            date: NaiveDate::from_ymd_opt(2024, 3, 15)
                .unwrap()
                .and_hms_opt(14, 5, 9)
                .unwrap(),
            org: "Acme".to_string(),
            account: "East".to_string(),
            group: "A".to_string(),
            player: player.to_string(),
            category: "Sales".to_string(),
            level: 2,
            lesson: "Closing".to_string(),
            score,
            speech_time: 42.5,
            play_time: 6.0,
        }
    }

    #[test]
    fn test_export_empty_records() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.csv");

        export_records_to_csv(&[], &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 1);
        assert!(content.starts_with("date,org,account,group,player"));
    }

    #[test]
    fn test_export_csv_reingests() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sessions.csv");
        let mut late = record("Bob", 71);
        late.date = NaiveDate::from_ymd_opt(2024, 1, 31)
            .unwrap()
            .and_hms_milli_opt(9, 15, 42, 250)
            .unwrap();
        let records = vec![record("Alice", 88), late];

        export_records_to_csv(&records, &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let row = "2024-03-15 14:05:09,Acme,East,A,Alice,Sales,2,Closing,88,42.5,6\n";
        assert!(content.contains(row));
        assert!(content.contains("2024-01-31 09:15:42.250,Acme,East,A,Bob,"));
        let parsed = TrainingCsvParser::new().parse(&content).unwrap();
        assert_eq!(parsed.records, records);
    }

    #[test]
    fn test_export_creates_nested_dirs() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a").join("b").join("out.csv");

        export_records_to_csv(&[record("Alice", 1)], &path).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_export_view_json() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("view.json");

        export_view_to_json(&[record("Alice", 90)], &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(value[0]["player"], "Alice");
        assert_eq!(value[0]["speechTime"], 42.5);
    }
}
