//! Headline numbers for a record collection

use std::collections::HashSet;

use crate::models::{DateRange, SessionRecord, TrainingStats};

/// Record count, distinct players and lessons, and date span
pub fn compute_stats(records: &[SessionRecord]) -> TrainingStats {
    if records.is_empty() {
        return TrainingStats::default();
    }

    let players: HashSet<&str> = records.iter().map(|r| r.player.as_str()).collect();
    let lessons: HashSet<&str> = records.iter().map(|r| r.lesson.as_str()).collect();

    TrainingStats {
        record_count: records.len(),
        player_count: players.len(),
        lesson_count: lessons.len(),
        date_range: DateRange {
            min: records.iter().map(|r| r.date).min(),
            max: records.iter().map(|r| r.date).max(),
        },
    }
}
