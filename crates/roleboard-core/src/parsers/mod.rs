//! Parsers for training session data

pub mod csv;
pub mod fields;

pub use csv::{parse_line, ParsedCsv, TrainingCsvParser, DEFAULT_BATCH_SIZE};
pub use fields::{parse_date, parse_or_default};
