//! Paginated log listing

use crate::models::{LogEntry, LogPage, SessionRecord};

/// Newest-first page of log entries
///
/// Ids are `log-{i}` with `i` the index in `records` before sorting, so the
/// same filtered set always yields the same ids. The date sort is stable.
/// `page` is 1-based; 0 is read as 1. `page_size` must be non-zero.
pub fn paginate_logs(records: &[SessionRecord], page: usize, page_size: usize) -> LogPage {
    let page_size = page_size.max(1);
    let page = page.max(1);

    let mut entries: Vec<LogEntry> = records
        .iter()
        .enumerate()
        .map(|(index, record)| LogEntry {
            id: format!("log-{}", index),
            record: record.clone(),
        })
        .collect();
    entries.sort_by(|a, b| b.record.date.cmp(&a.record.date));

    let total_count = entries.len();
    let total_pages = total_count.div_ceil(page_size);
    let start = (page - 1).saturating_mul(page_size);

    let entries = entries.into_iter().skip(start).take(page_size).collect();

    LogPage {
        entries,
        total_pages,
        total_count,
    }
}
