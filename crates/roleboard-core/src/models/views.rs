//! Derived view types handed to presentation layers
//!
//! All of these are recomputed from (records, filter state) on demand and
//! never mutated independently.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::month::Month;
use super::record::SessionRecord;

/// Player ranking row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankingEntry {
    /// 1-based position after sorting by average score
    pub rank: usize,
    pub player: String,
    pub avg_score: i64,
    pub play_count: usize,
    pub best_score: i64,
}

/// One point of the monthly trend series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyTrend {
    pub month: Month,
    pub play_count: usize,
    pub avg_score: i64,
}

/// Dimension for grouped aggregates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupBy {
    /// Lesson name
    Lesson,
    /// `"{category} Lv.{level}"`
    Level,
    /// Category name
    Category,
}

impl GroupBy {
    /// Group key for a record under this dimension
    pub fn key(&self, record: &SessionRecord) -> String {
        match self {
            GroupBy::Lesson => record.lesson.clone(),
            GroupBy::Level => format!("{} Lv.{}", record.category, record.level),
            GroupBy::Category => record.category.clone(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GroupBy::Lesson => "lesson",
            GroupBy::Level => "level",
            GroupBy::Category => "category",
        }
    }
}

impl fmt::Display for GroupBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GroupBy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "lesson" => Ok(GroupBy::Lesson),
            "level" => Ok(GroupBy::Level),
            "category" => Ok(GroupBy::Category),
            other => Err(format!(
                "unknown grouping '{}' (expected lesson, level or category)",
                other
            )),
        }
    }
}

/// Grouped statistics row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregatedData {
    pub name: String,
    pub play_count: usize,
    pub avg_score: i64,
    /// Rounded to one decimal
    pub avg_speech_time: f64,
    /// Rounded to one decimal
    pub avg_play_time: f64,
}

/// Per-player summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerRecord {
    pub player: String,
    pub play_count: usize,
    pub avg_score: i64,
    pub last_play_date: NaiveDateTime,
}

/// Log row: a record plus its synthetic id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    /// `log-{index}` where index is the position in the unsorted filtered set
    pub id: String,
    #[serde(flatten)]
    pub record: SessionRecord,
}

/// One page of the log listing
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogPage {
    pub entries: Vec<LogEntry>,
    pub total_pages: usize,
    pub total_count: usize,
}

/// Inclusive date span of a record collection
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DateRange {
    pub min: Option<NaiveDateTime>,
    pub max: Option<NaiveDateTime>,
}

/// Headline numbers for the loaded collection
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingStats {
    pub record_count: usize,
    pub player_count: usize,
    pub lesson_count: usize,
    pub date_range: DateRange,
}

impl TrainingStats {
    pub fn is_empty(&self) -> bool {
        self.record_count == 0
    }
}
