//! Grouped aggregates and per-player records

use super::{average_score, group_in_order, round_one_decimal};
use crate::models::{AggregatedData, GroupBy, PlayerRecord, SessionRecord};

/// Statistics per lesson, level or category, in first-encounter order
pub fn compute_aggregates(records: &[SessionRecord], by: GroupBy) -> Vec<AggregatedData> {
    group_in_order(records, |r| by.key(r))
        .into_iter()
        .map(|(name, sessions)| {
            // Groups are non-empty by construction
            let count = sessions.len() as f64;
            let speech: f64 = sessions.iter().map(|s| s.speech_time).sum();
            let play: f64 = sessions.iter().map(|s| s.play_time).sum();
            AggregatedData {
                name,
                play_count: sessions.len(),
                avg_score: average_score(sessions.iter().copied()),
                avg_speech_time: round_one_decimal(speech / count),
                avg_play_time: round_one_decimal(play / count),
            }
        })
        .collect()
}

/// Play count, rounded average and latest play date per player
pub fn compute_player_records(records: &[SessionRecord]) -> Vec<PlayerRecord> {
    group_in_order(records, |r| r.player.clone())
        .into_iter()
        .filter_map(|(player, sessions)| {
            let last_play_date = sessions.iter().map(|s| s.date).max()?;
            Some(PlayerRecord {
                player,
                play_count: sessions.len(),
                avg_score: average_score(sessions.iter().copied()),
                last_play_date,
            })
        })
        .collect()
}
