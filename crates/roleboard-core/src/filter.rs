//! Filter model: date range plus two sparse override maps
//!
//! A record passes when its date is inside the month range AND its lesson
//! key is not pinned to `false` AND its player key is not pinned to `false`.
//! Absent keys mean "included". Overrides are never removed once set, so a
//! re-checked box is recorded as an explicit `true`.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::models::{Month, SessionRecord};

/// Default window when a collection is loaded
pub const DEFAULT_WINDOW_MONTHS: u32 = 6;

/// User-adjustable predicates over the record collection
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterState {
    /// Lesson key -> included
    pub lessons: HashMap<String, bool>,
    /// Player key -> included
    pub players: HashMap<String, bool>,
    /// Inclusive lower bound; `None` is unbounded
    pub start_month: Option<Month>,
    /// Inclusive upper bound; `None` is unbounded
    pub end_month: Option<Month>,
}

impl FilterState {
    /// Everything included, no date bounds
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Default state for a freshly loaded collection
    ///
    /// The range covers `window_months` months ending at the latest record's
    /// month. `None` for an empty collection.
    pub fn default_for(records: &[SessionRecord], window_months: u32) -> Option<Self> {
        let latest = records.iter().map(|r| r.date).max()?;
        let end = Month::of(&latest);
        let span = window_months.max(1) as i32 - 1;
        Some(Self {
            lessons: HashMap::new(),
            players: HashMap::new(),
            start_month: Some(end.add_months(-span)),
            end_month: Some(end),
        })
    }

    /// Pin a lesson key
    pub fn set_lesson_override(&mut self, key: impl Into<String>, included: bool) {
        self.lessons.insert(key.into(), included);
    }

    /// Pin a player key
    pub fn set_player_override(&mut self, key: impl Into<String>, included: bool) {
        self.players.insert(key.into(), included);
    }

    /// Replace both bounds; an inverted range is accepted and matches nothing
    pub fn set_date_range(&mut self, start_month: Option<Month>, end_month: Option<Month>) {
        self.start_month = start_month;
        self.end_month = end_month;
    }

    pub fn is_lesson_included(&self, key: &str) -> bool {
        self.lessons.get(key) != Some(&false)
    }

    pub fn is_player_included(&self, key: &str) -> bool {
        self.players.get(key) != Some(&false)
    }

    /// Month-granular range check
    ///
    /// Lower bound is midnight on the first day of `start_month`; upper
    /// bound is exclusive at the first instant of the month after
    /// `end_month`, so the whole last day is inside.
    pub fn date_in_range(&self, date: &NaiveDateTime) -> bool {
        if let Some(start) = self.start_month {
            if *date < start.start() {
                return false;
            }
        }
        if let Some(end) = self.end_month {
            if *date >= end.end_exclusive() {
                return false;
            }
        }
        true
    }

    pub fn lesson_included(&self, record: &SessionRecord) -> bool {
        self.lessons.is_empty() || self.is_lesson_included(&record.lesson_key())
    }

    pub fn player_included(&self, record: &SessionRecord) -> bool {
        self.players.is_empty() || self.is_player_included(&record.player_key())
    }

    /// Conjunction of the three predicates
    pub fn evaluate(&self, record: &SessionRecord) -> bool {
        self.date_in_range(&record.date)
            && self.lesson_included(record)
            && self.player_included(record)
    }

    /// Records passing [`evaluate`](Self::evaluate), in source order
    pub fn apply(&self, records: &[SessionRecord]) -> Vec<SessionRecord> {
        records
            .iter()
            .filter(|r| self.evaluate(r))
            .cloned()
            .collect()
    }

    /// Number of overrides currently pinned to `false`
    pub fn excluded_count(&self) -> usize {
        self.lessons.values().chain(self.players.values()).filter(|v| !**v).count()
    }
}
