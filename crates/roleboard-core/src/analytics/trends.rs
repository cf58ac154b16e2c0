//! Monthly trend series
//!
//! Groups the filtered set by calendar month. Short series are padded
//! backwards with zero-count months so a chart always has at least
//! `min_months` points.

use std::collections::BTreeMap;

use super::round_half_up;
use crate::models::{Month, MonthlyTrend, SessionRecord};

/// Minimum number of points in a non-empty series
pub const MIN_TREND_MONTHS: usize = 6;

#[derive(Default)]
struct MonthAggregate {
    count: usize,
    total_score: i64,
}

/// Compute play count and rounded average score per month
///
/// When 1..`min_months` distinct months are present, zero-count months are
/// synthesized immediately before the earliest one until `min_months` are
/// represented. Output is ascending by month. Empty input yields an empty
/// series (no padding).
pub fn compute_monthly_trends(records: &[SessionRecord], min_months: usize) -> Vec<MonthlyTrend> {
    let mut monthly: BTreeMap<Month, MonthAggregate> = BTreeMap::new();

    for record in records {
        let agg = monthly.entry(record.month()).or_default();
        agg.count += 1;
        agg.total_score += record.score;
    }

    let observed = monthly.len();
    if observed > 0 && observed < min_months {
        if let Some(&earliest) = monthly.keys().next() {
            let mut month = earliest;
            for _ in observed..min_months {
                month = month.pred();
                monthly.entry(month).or_default();
            }
        }
    }

    monthly
        .into_iter()
        .map(|(month, agg)| MonthlyTrend {
            month,
            play_count: agg.count,
            avg_score: if agg.count > 0 {
                round_half_up(agg.total_score as f64 / agg.count as f64)
            } else {
                0
            },
        })
        .collect()
}
