//! Column sort for tabular views
//!
//! Clicking a column sorts it descending; clicking the active column again
//! flips desc -> asc; any further click goes back to desc. Once a column is
//! active there is no way back to "unsorted" except [`TableSort::reset_sort`].

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::models::{
    AggregatedData, LogEntry, MonthlyTrend, PlayerRecord, RankingEntry, SessionRecord,
};

/// Direction of the active sort
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

/// Active column and direction; both `None` means unsorted
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortState {
    pub column: Option<String>,
    pub direction: Option<SortDirection>,
}

/// A cell value as seen by the comparator
#[derive(Debug, Clone, PartialEq)]
pub enum SortValue {
    Date(NaiveDateTime),
    Number(f64),
    Text(String),
}

impl SortValue {
    fn as_text(&self) -> String {
        match self {
            SortValue::Date(d) => d.to_string(),
            SortValue::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => format!("{}", *n as i64),
            SortValue::Number(n) => n.to_string(),
            SortValue::Text(s) => s.clone(),
        }
    }
}

/// Rows that can be sorted by named column
pub trait SortableRow {
    /// Value of `column`, or `None` if the row has no such column
    fn sort_value(&self, column: &str) -> Option<SortValue>;
}

/// Three-state column sort
#[derive(Debug, Clone, Default)]
pub struct TableSort {
    state: SortState,
}

impl TableSort {
    /// Unsorted
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from a given column and direction
    pub fn with_default(column: impl Into<String>, direction: Option<SortDirection>) -> Self {
        Self {
            state: SortState {
                column: Some(column.into()),
                direction,
            },
        }
    }

    pub fn state(&self) -> &SortState {
        &self.state
    }

    /// Column click
    pub fn toggle_sort(&mut self, column: &str) {
        if self.state.column.as_deref() == Some(column) {
            self.state.direction = match self.state.direction {
                Some(SortDirection::Desc) => Some(SortDirection::Asc),
                _ => Some(SortDirection::Desc),
            };
        } else {
            self.state.column = Some(column.to_string());
            self.state.direction = Some(SortDirection::Desc);
        }
    }

    /// Back to unsorted
    pub fn reset_sort(&mut self) {
        self.state = SortState::default();
    }

    /// `▲` for the active ascending column, `▼` otherwise
    pub fn sort_icon(&self, column: &str) -> &'static str {
        if self.is_sorted_column(column) && self.state.direction == Some(SortDirection::Asc) {
            "▲"
        } else {
            "▼"
        }
    }

    /// Whether `column` is the active column (direction ignored)
    pub fn is_sorted_column(&self, column: &str) -> bool {
        self.state.column.as_deref() == Some(column)
    }

    /// Whether `column` is active and has a direction
    pub fn is_sorted(&self, column: &str) -> bool {
        self.is_sorted_column(column) && self.state.direction.is_some()
    }

    /// Sorted copy of `rows`; source order when unsorted
    ///
    /// The sort is stable, so equal keys keep their input order.
    pub fn sorted<T: SortableRow + Clone>(&self, rows: &[T]) -> Vec<T> {
        let mut data = rows.to_vec();
        let (Some(column), Some(direction)) = (self.state.column.as_deref(), self.state.direction)
        else {
            return data;
        };

        data.sort_by(|a, b| {
            let ord = compare_cells(a.sort_value(column), b.sort_value(column));
            match direction {
                SortDirection::Asc => ord,
                SortDirection::Desc => ord.reverse(),
            }
        });
        data
    }
}

fn compare_cells(a: Option<SortValue>, b: Option<SortValue>) -> Ordering {
    let a = a.unwrap_or(SortValue::Text(String::new()));
    let b = b.unwrap_or(SortValue::Text(String::new()));
    compare_values(&a, &b)
}

/// Dates by timestamp, numbers numerically, anything else as folded text
pub fn compare_values(a: &SortValue, b: &SortValue) -> Ordering {
    match (a, b) {
        (SortValue::Date(x), SortValue::Date(y)) => x.cmp(y),
        (SortValue::Number(x), SortValue::Number(y)) => x.partial_cmp(y).unwrap_or(Ordering::Equal),
        _ => locale_compare(&a.as_text(), &b.as_text()),
    }
}

/// Case-insensitive comparison approximating Japanese collation
///
/// Katakana folds onto hiragana so `カ` and `か` sort together.
pub fn locale_compare(a: &str, b: &str) -> Ordering {
    fold(a).cmp(fold(b))
}

fn fold(s: &str) -> impl Iterator<Item = char> + '_ {
    s.chars().flat_map(char::to_lowercase).map(|c| match c {
        '\u{30A1}'..='\u{30F6}' => char::from_u32(c as u32 - 0x60).unwrap_or(c),
        _ => c,
    })
}

fn text(s: &str) -> Option<SortValue> {
    Some(SortValue::Text(s.to_string()))
}

fn number(n: impl Into<f64>) -> Option<SortValue> {
    Some(SortValue::Number(n.into()))
}

fn count(n: usize) -> Option<SortValue> {
    Some(SortValue::Number(n as f64))
}

fn int(n: i64) -> Option<SortValue> {
    Some(SortValue::Number(n as f64))
}

impl SortableRow for SessionRecord {
    fn sort_value(&self, column: &str) -> Option<SortValue> {
        match column {
            "date" => Some(SortValue::Date(self.date)),
            "org" => text(&self.org),
            "account" => text(&self.account),
            "group" => text(&self.group),
            "player" => text(&self.player),
            "category" => text(&self.category),
            "level" => int(self.level),
            "lesson" => text(&self.lesson),
            "score" => int(self.score),
            "speechTime" => number(self.speech_time),
            "playTime" => number(self.play_time),
            _ => None,
        }
    }
}

impl SortableRow for LogEntry {
    fn sort_value(&self, column: &str) -> Option<SortValue> {
        match column {
            "id" => text(&self.id),
            other => self.record.sort_value(other),
        }
    }
}

impl SortableRow for RankingEntry {
    fn sort_value(&self, column: &str) -> Option<SortValue> {
        match column {
            "rank" => count(self.rank),
            "player" => text(&self.player),
            "avgScore" => int(self.avg_score),
            "playCount" => count(self.play_count),
            "bestScore" => int(self.best_score),
            _ => None,
        }
    }
}

impl SortableRow for MonthlyTrend {
    fn sort_value(&self, column: &str) -> Option<SortValue> {
        match column {
            "month" => text(&self.month.to_string()),
            "playCount" => count(self.play_count),
            "avgScore" => int(self.avg_score),
            _ => None,
        }
    }
}

impl SortableRow for AggregatedData {
    fn sort_value(&self, column: &str) -> Option<SortValue> {
        match column {
            "name" => text(&self.name),
            "playCount" => count(self.play_count),
            "avgScore" => int(self.avg_score),
            "avgSpeechTime" => number(self.avg_speech_time),
            "avgPlayTime" => number(self.avg_play_time),
            _ => None,
        }
    }
}

impl SortableRow for PlayerRecord {
    fn sort_value(&self, column: &str) -> Option<SortValue> {
        match column {
            "player" => text(&self.player),
            "playCount" => count(self.play_count),
            "avgScore" => int(self.avg_score),
            "lastPlayDate" => Some(SortValue::Date(self.last_play_date)),
            _ => None,
        }
    }
}
