//! Aggregation engine over the filtered record set
//!
//! Every function here is a pure reduction of a record slice. An empty
//! slice yields an empty result, never an error.

use std::collections::HashMap;

use crate::models::SessionRecord;

pub mod aggregates;
pub mod logs;
pub mod rankings;
pub mod stats;
pub mod trends;


pub use aggregates::{compute_aggregates, compute_player_records};
pub use logs::paginate_logs;
pub use rankings::compute_rankings;
pub use stats::compute_stats;
pub use trends::{compute_monthly_trends, MIN_TREND_MONTHS};

/// Round half up (toward positive infinity) to an integer
pub fn round_half_up(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

/// Round half up to one decimal place
pub fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0 + 0.5).floor() / 10.0
}

/// Rounded mean of integer scores; 0 for an empty group
pub fn average_score<'a>(records: impl IntoIterator<Item = &'a SessionRecord>) -> i64 {
    let (sum, count) = records
        .into_iter()
        .fold((0i64, 0usize), |(s, c), r| (s + r.score, c + 1));
    if count == 0 {
        return 0;
    }
    round_half_up(sum as f64 / count as f64)
}

/// Group records by key, keeping groups in first-encounter order
pub(crate) fn group_in_order<'a, F>(
    records: &'a [SessionRecord],
    key: F,
) -> Vec<(String, Vec<&'a SessionRecord>)>
where
    F: Fn(&SessionRecord) -> String,
{
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<(String, Vec<&SessionRecord>)> = Vec::new();

    for record in records {
        let k = key(record);
        match index.get(&k) {
            Some(&i) => groups[i].1.push(record),
            None => {
                index.insert(k.clone(), groups.len());
                groups.push((k, vec![record]));
            }
        }
    }

    groups
}
