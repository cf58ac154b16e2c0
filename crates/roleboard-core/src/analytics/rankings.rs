//! Player rankings

use super::{average_score, group_in_order};
use crate::models::{RankingEntry, SessionRecord};

/// Rank players by rounded average score, highest first
///
/// The sort is stable: players with equal averages keep the order in which
/// they first appear in `records`. Ranks are 1-based positions, so ties get
/// distinct ranks.
pub fn compute_rankings(records: &[SessionRecord]) -> Vec<RankingEntry> {
    let mut rankings: Vec<RankingEntry> = group_in_order(records, |r| r.player.clone())
        .into_iter()
        .map(|(player, sessions)| RankingEntry {
            rank: 0,
            player,
            avg_score: average_score(sessions.iter().copied()),
            play_count: sessions.len(),
            best_score: sessions.iter().map(|s| s.score).max().unwrap_or(0),
        })
        .collect();

    rankings.sort_by(|a, b| b.avg_score.cmp(&a.avg_score));

    for (index, entry) in rankings.iter_mut().enumerate() {
        entry.rank = index + 1;
    }

    rankings
}
