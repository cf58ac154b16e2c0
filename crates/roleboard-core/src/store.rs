//! Training data store with parking_lot::RwLock
//!
//! The record collection is an `Arc<Vec<_>>` swapped wholesale on ingest,
//! so readers always see an immutable snapshot. Filter state sits behind
//! its own lock; the filtered set is cached and dropped on every mutation.
//!
//! Mutations are serialized by one mutex held across the records swap,
//! the filter write and the cache invalidation. Each invalidation bumps a
//! generation counter, and a reader only stores its computed set when the
//! generation has not moved since it started.

use crate::analytics::{
    compute_aggregates, compute_monthly_trends, compute_player_records, compute_rankings,
    compute_stats, paginate_logs,
};
use crate::error::{CoreError, IngestReport};
use crate::event::{DataEvent, EventBus};
use crate::filter::{FilterState, DEFAULT_WINDOW_MONTHS};
use crate::hierarchy::{build_lesson_hierarchy, build_player_hierarchy, Hierarchy};
use crate::models::{
    AggregatedData, GroupBy, LogPage, Month, MonthlyTrend, PlayerRecord, RankingEntry,
    SessionRecord, TrainingStats,
};
use crate::parsers::{TrainingCsvParser, DEFAULT_BATCH_SIZE};
use parking_lot::{Mutex, RwLock};
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Sample data bundled with the crate
const DEMO_CSV: &str = include_str!("../data/demo-data.csv");

/// Configuration for the training store
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Rows parsed between cooperative yields
    pub batch_size: usize,

    /// Months covered by the default date range after a load
    pub default_window_months: u32,

    /// Minimum points in the monthly trend series
    pub trend_min_months: usize,

    /// Page size used when a caller passes 0
    pub default_page_size: usize,

    /// Records returned by `preview`
    pub preview_len: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            default_window_months: DEFAULT_WINDOW_MONTHS,
            trend_min_months: crate::analytics::MIN_TREND_MONTHS,
            default_page_size: 100,
            preview_len: 10,
        }
    }
}

/// Clears the loading flag when an ingest ends, however it ends
struct LoadingGuard<'a>(&'a AtomicBool);

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Owned store for one training dataset
///
/// Holds the record collection and filter state and exposes every view.
/// Independent instances never share state.
pub struct TrainingStore {
    config: StoreConfig,

    /// Full collection in source order
    records: RwLock<Arc<Vec<SessionRecord>>>,

    filter: RwLock<FilterState>,

    /// Filtered snapshot, `None` when stale
    filtered: RwLock<Option<Arc<Vec<SessionRecord>>>>,

    /// Bumped on every invalidation of `filtered`
    generation: AtomicU64,

    /// Held by every writer of `records` or `filter`
    mutation: Mutex<()>,

    loading: AtomicBool,

    /// Message of the last failed ingest
    load_error: RwLock<Option<String>>,

    event_bus: EventBus,
}

impl TrainingStore {
    pub fn new(config: StoreConfig) -> Self {
        Self {
            config,
            records: RwLock::new(Arc::new(Vec::new())),
            filter: RwLock::new(FilterState::unbounded()),
            filtered: RwLock::new(None),
            generation: AtomicU64::new(0),
            mutation: Mutex::new(()),
            loading: AtomicBool::new(false),
            load_error: RwLock::new(None),
            event_bus: EventBus::default_capacity(),
        }
    }

    /// Create with default configuration
    pub fn with_defaults() -> Self {
        Self::new(StoreConfig::default())
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Get the event bus for subscribing to updates
    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    // ========================================================================
    // Loading
    // ========================================================================

    /// Parse `text` and replace the collection with the result
    ///
    /// On success the filter resets to the default window ending at the
    /// latest record's month; an empty result leaves the filter as it was.
    /// On failure the collection is untouched and `load_error` is set.
    pub async fn ingest(&self, text: &str) -> Result<IngestReport, CoreError> {
        self.loading.store(true, Ordering::SeqCst);
        let _guard = LoadingGuard(&self.loading);
        *self.load_error.write() = None;

        let parser = TrainingCsvParser::new().with_batch_size(self.config.batch_size);
        let parsed = match parser.parse_cooperative(text).await {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!(error = %e, "CSV ingest failed");
                self.fail(&e);
                return Err(e);
            }
        };

        let default_filter =
            FilterState::default_for(&parsed.records, self.config.default_window_months);
        let count = parsed.records.len();
        {
            let _mutation = self.mutation.lock();
            *self.records.write() = Arc::new(parsed.records);
            if let Some(filter) = default_filter {
                *self.filter.write() = filter;
            }
            self.invalidate();
        }

        info!(
            records = count,
            rows_skipped = parsed.report.rows_skipped,
            batches = parsed.report.batches,
            "CSV ingest complete"
        );
        self.event_bus.publish(DataEvent::DataLoaded { records: count });

        Ok(parsed.report)
    }

    /// Read a UTF-8 CSV file and ingest it
    pub async fn load_csv_file(&self, path: &Path) -> Result<IngestReport, CoreError> {
        debug!(path = %path.display(), "Reading CSV file");
        let text = match tokio::fs::read_to_string(path).await {
            Ok(text) => text,
            Err(source) => {
                let err = CoreError::FileRead {
                    path: path.to_path_buf(),
                    source,
                };
                warn!(path = %path.display(), error = %err, "CSV file read failed");
                self.fail(&err);
                return Err(err);
            }
        };
        self.ingest(&text).await
    }

    /// Ingest the bundled sample dataset
    pub async fn load_demo_data(&self) -> Result<IngestReport, CoreError> {
        self.ingest(DEMO_CSV).await
    }

    /// Empty the collection and reset the filter
    pub fn clear(&self) {
        {
            let _mutation = self.mutation.lock();
            *self.records.write() = Arc::new(Vec::new());
            *self.filter.write() = FilterState::unbounded();
            self.invalidate();
        }
        *self.load_error.write() = None;
        info!("Store cleared");
        self.event_bus.publish(DataEvent::Cleared);
    }

    /// True while an ingest is in flight
    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst)
    }

    pub fn load_error(&self) -> Option<String> {
        self.load_error.read().clone()
    }

    fn fail(&self, err: &CoreError) {
        let message = err.to_string();
        *self.load_error.write() = Some(message.clone());
        self.event_bus.publish(DataEvent::LoadFailed(message));
    }

    // ========================================================================
    // Filter
    // ========================================================================

    pub fn filter_state(&self) -> FilterState {
        self.filter.read().clone()
    }

    pub fn set_lesson_override(&self, key: impl Into<String>, included: bool) {
        self.mutate_filter(|filter| filter.set_lesson_override(key, included));
    }

    pub fn set_player_override(&self, key: impl Into<String>, included: bool) {
        self.mutate_filter(|filter| filter.set_player_override(key, included));
    }

    /// Replace both month bounds; an inverted range is accepted
    pub fn set_date_range(&self, start_month: Option<Month>, end_month: Option<Month>) {
        self.mutate_filter(|filter| filter.set_date_range(start_month, end_month));
    }

    /// Pin every lesson under a tree node, e.g. `["Sales", "Lv.2"]`
    ///
    /// Returns the number of keys pinned; 0 when the path matches nothing.
    pub fn set_lesson_branch(&self, labels: &[&str], included: bool) -> usize {
        let keys = branch_keys(&self.lesson_hierarchy(), labels);
        self.pin_all(keys, included, |f, k, i| f.set_lesson_override(k, i))
    }

    /// Pin every player under a tree node, e.g. `["Acme", "East"]`
    pub fn set_player_branch(&self, labels: &[&str], included: bool) -> usize {
        let keys = branch_keys(&self.player_hierarchy(), labels);
        self.pin_all(keys, included, |f, k, i| f.set_player_override(k, i))
    }

    fn pin_all(
        &self,
        keys: Vec<String>,
        included: bool,
        pin: fn(&mut FilterState, String, bool),
    ) -> usize {
        let count = keys.len();
        if count == 0 {
            return 0;
        }
        self.mutate_filter(|filter| {
            for key in keys {
                pin(filter, key, included);
            }
        });
        count
    }

    /// Whether `record` passes the current filter
    pub fn evaluate(&self, record: &SessionRecord) -> bool {
        self.filter.read().evaluate(record)
    }

    /// Records passing the current filter, in source order
    pub fn filtered_records(&self) -> Arc<Vec<SessionRecord>> {
        if let Some(cached) = self.filtered.read().as_ref() {
            return Arc::clone(cached);
        }

        let generation = self.generation.load(Ordering::SeqCst);
        let records = self.records();
        let filtered = Arc::new(self.filter.read().apply(&records));
        debug!(
            total = records.len(),
            passed = filtered.len(),
            "Filtered set recomputed"
        );

        let mut cache = self.filtered.write();
        if self.generation.load(Ordering::SeqCst) == generation {
            *cache = Some(Arc::clone(&filtered));
        } else {
            debug!("Filter changed during recompute, result not cached");
        }
        filtered
    }

    /// Apply `change` to the filter under the mutation lock, then notify
    fn mutate_filter(&self, change: impl FnOnce(&mut FilterState)) {
        {
            let _mutation = self.mutation.lock();
            change(&mut *self.filter.write());
            self.invalidate();
        }
        self.event_bus.publish(DataEvent::FilterChanged);
    }

    /// Drop the cached filtered set; callers hold `mutation`
    fn invalidate(&self) {
        let mut cache = self.filtered.write();
        self.generation.fetch_add(1, Ordering::SeqCst);
        *cache = None;
    }

    // ========================================================================
    // Views over the full collection
    // ========================================================================

    /// Snapshot of the full collection
    pub fn records(&self) -> Arc<Vec<SessionRecord>> {
        self.records.read().clone()
    }

    pub fn record_count(&self) -> usize {
        self.records.read().len()
    }

    pub fn stats(&self) -> TrainingStats {
        compute_stats(&self.records())
    }

    /// First `preview_len` records in source order
    pub fn preview(&self) -> Vec<SessionRecord> {
        self.records()
            .iter()
            .take(self.config.preview_len)
            .cloned()
            .collect()
    }

    pub fn lesson_hierarchy(&self) -> Hierarchy {
        build_lesson_hierarchy(&self.records())
    }

    pub fn player_hierarchy(&self) -> Hierarchy {
        build_player_hierarchy(&self.records())
    }

    /// Lesson tree with check states from the current overrides
    pub fn annotated_lesson_hierarchy(&self) -> Hierarchy {
        self.lesson_hierarchy().annotate(&self.filter.read().lessons)
    }

    /// Player tree with check states from the current overrides
    pub fn annotated_player_hierarchy(&self) -> Hierarchy {
        self.player_hierarchy().annotate(&self.filter.read().players)
    }

    // ========================================================================
    // Views over the filtered set
    // ========================================================================

    pub fn rankings(&self) -> Vec<RankingEntry> {
        compute_rankings(&self.filtered_records())
    }

    pub fn monthly_trends(&self) -> Vec<MonthlyTrend> {
        compute_monthly_trends(&self.filtered_records(), self.config.trend_min_months)
    }

    pub fn aggregates(&self, by: GroupBy) -> Vec<AggregatedData> {
        compute_aggregates(&self.filtered_records(), by)
    }

    pub fn player_records(&self) -> Vec<PlayerRecord> {
        compute_player_records(&self.filtered_records())
    }

    /// Newest-first log page; a `page_size` of 0 uses the configured default
    pub fn log_page(&self, page: usize, page_size: usize) -> LogPage {
        let page_size = if page_size == 0 {
            self.config.default_page_size
        } else {
            page_size
        };
        paginate_logs(&self.filtered_records(), page, page_size)
    }
}

impl Default for TrainingStore {
    fn default() -> Self {
        Self::with_defaults()
    }
}

fn branch_keys(tree: &Hierarchy, labels: &[&str]) -> Vec<String> {
    tree.find(labels).map(|node| node.leaf_keys()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV: &str = "date,org,account,group,player,category,level,lesson,score,speechTime,playTime
2024-05-03 10:00:00,Acme,East,A,Alice,Sales,1,Greeting,80,30,5
2024-05-10 11:00:00,Acme,East,A,Bob,Sales,2,Closing,90,45,6
2024-06-01 09:30:00,Acme,West,B,Carol,Support,1,Refund,70,20,4
";

    #[tokio::test]
    async fn test_store_creation() {
        let store = TrainingStore::with_defaults();
        assert_eq!(store.record_count(), 0);
        assert!(!store.is_loading());
        assert!(store.load_error().is_none());
        assert!(store.filtered_records().is_empty());
    }

    #[tokio::test]
    async fn test_ingest_sets_default_window() {
        let store = TrainingStore::with_defaults();
        let report = store.ingest(CSV).await.unwrap();

        assert_eq!(report.records, 3);
        assert_eq!(store.record_count(), 3);
        let filter = store.filter_state();
        assert_eq!(filter.start_month, "2024-01".parse().ok());
        assert_eq!(filter.end_month, "2024-06".parse().ok());
        assert_eq!(store.filtered_records().len(), 3);
        assert!(!store.is_loading());
    }

    #[tokio::test]
    async fn test_empty_input_keeps_collection() {
        let store = TrainingStore::with_defaults();
        store.ingest(CSV).await.unwrap();

        let err = store.ingest("date,org\n").await.unwrap_err();
        assert!(matches!(err, CoreError::EmptyInput));
        assert_eq!(store.record_count(), 3);
        assert!(store.load_error().is_some());
        assert!(!store.is_loading());

        // The next successful ingest clears the error
        store.ingest(CSV).await.unwrap();
        assert!(store.load_error().is_none());
    }

    #[tokio::test]
    async fn test_all_rows_skipped_keeps_filter() {
        let store = TrainingStore::with_defaults();
        store.ingest(CSV).await.unwrap();
        let before = store.filter_state();

        store
            .ingest("header\nnot-a-date,a,b,c,d,e,1,f,1,1,1\n")
            .await
            .unwrap();
        assert_eq!(store.record_count(), 0);
        assert_eq!(store.filter_state(), before);
    }

    #[tokio::test]
    async fn test_filtered_cache_invalidated_on_override() {
        let store = TrainingStore::with_defaults();
        store.ingest(CSV).await.unwrap();
        assert_eq!(store.filtered_records().len(), 3);

        store.set_player_override("Acme|East|A|Bob", false);
        assert_eq!(store.filtered_records().len(), 2);
        assert!(store.rankings().iter().all(|r| r.player != "Bob"));

        store.set_player_override("Acme|East|A|Bob", true);
        assert_eq!(store.filtered_records().len(), 3);
        assert_eq!(store.filter_state().players.len(), 1);
    }

    #[tokio::test]
    async fn test_branch_override() {
        let store = TrainingStore::with_defaults();
        store.ingest(CSV).await.unwrap();

        assert_eq!(store.set_lesson_branch(&["Sales"], false), 2);
        assert_eq!(store.filtered_records().len(), 1);
        assert_eq!(store.set_lesson_branch(&["Nope"], false), 0);

        let tree = store.annotated_lesson_hierarchy();
        let sales = tree.find(&["Sales"]).unwrap();
        assert!(!sales.checked);
        assert!(!sales.indeterminate);
    }

    #[tokio::test]
    async fn test_clear_resets_everything() {
        let store = TrainingStore::with_defaults();
        store.ingest(CSV).await.unwrap();
        store.set_lesson_override("Sales|Lv.1|Greeting", false);

        store.clear();
        assert_eq!(store.record_count(), 0);
        assert_eq!(store.filter_state(), FilterState::unbounded());
        assert!(store.stats().is_empty());
    }

    #[tokio::test]
    async fn test_events_published() {
        let store = TrainingStore::with_defaults();
        let mut rx = store.event_bus().subscribe();

        store.ingest(CSV).await.unwrap();
        store.set_date_range(None, None);
        store.clear();

        assert_eq!(rx.recv().await.unwrap(), DataEvent::DataLoaded { records: 3 });
        assert_eq!(rx.recv().await.unwrap(), DataEvent::FilterChanged);
        assert_eq!(rx.recv().await.unwrap(), DataEvent::Cleared);
    }

    #[tokio::test]
    async fn test_log_page_default_size() {
        let config = StoreConfig {
            default_page_size: 2,
            ..StoreConfig::default()
        };
        let store = TrainingStore::new(config);
        store.ingest(CSV).await.unwrap();

        let page = store.log_page(1, 0);
        assert_eq!(page.entries.len(), 2);
        assert_eq!(page.total_pages, 2);
    }

    const EARLY_CSV: &str = "date,org,account,group,player,category,level,lesson,score,speechTime,playTime
2023-02-14 08:00:00,Beta,North,C,Dana,Support,3,Escalation,65,25,3
";

    fn bulk_csv(rows: usize) -> String {
        let mut csv = String::from(CSV.lines().next().unwrap());
        csv.push('\n');
        for i in 0..rows {
            csv.push_str(&format!(
                "2024-{:02}-{:02} 10:00:00,Acme,East,A,P{},Sales,1,Greeting,{},30,5\n",
                i % 6 + 1,
                i % 28 + 1,
                i % 10,
                i % 100
            ));
        }
        csv
    }

    #[tokio::test]
    async fn test_filtered_cache_consistent_with_concurrent_override() {
        let store = TrainingStore::with_defaults();
        store.ingest(&bulk_csv(20_000)).await.unwrap();
        let key = "Acme|East|A|P0";

        for trial in 0..200 {
            store.set_player_override(key, true);
            std::thread::scope(|s| {
                s.spawn(|| store.filtered_records());
                store.set_player_override(key, false);
            });

            let expected = store.filter_state().apply(&store.records()).len();
            assert_eq!(store.filtered_records().len(), expected, "trial {trial}");
            assert_eq!(expected, 18_000);
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_ingests_keep_records_and_filter_together() {
        let store = Arc::new(TrainingStore::with_defaults());

        for _ in 0..50 {
            let late = tokio::spawn({
                let store = Arc::clone(&store);
                async move { store.ingest(CSV).await }
            });
            let early = tokio::spawn({
                let store = Arc::clone(&store);
                async move { store.ingest(EARLY_CSV).await }
            });
            late.await.unwrap().unwrap();
            early.await.unwrap().unwrap();

            let records = store.records();
            let expected = FilterState::default_for(&records, DEFAULT_WINDOW_MONTHS).unwrap();
            assert_eq!(store.filter_state(), expected);
            assert_eq!(store.filtered_records().len(), records.len());
        }
    }

    #[tokio::test]
    async fn test_loading_flag_set_while_ingest_in_flight() {
        let config = StoreConfig {
            batch_size: 1,
            ..StoreConfig::default()
        };
        let store = Arc::new(TrainingStore::new(config));
        store.ingest("date,org\n").await.unwrap_err();
        assert!(store.load_error().is_some());

        let task = tokio::spawn({
            let store = Arc::clone(&store);
            async move { store.ingest(CSV).await }
        });

        let mut observed = false;
        for _ in 0..1_000 {
            if store.is_loading() {
                observed = true;
                break;
            }
            tokio::task::yield_now().await;
        }
        assert!(observed);
        // Cleared as soon as the new ingest starts
        assert!(store.load_error().is_none());

        let report = task.await.unwrap().unwrap();
        assert_eq!(report.records, 3);
        assert!(!store.is_loading());
    }

    #[tokio::test]
    async fn test_demo_data_loads() {
        let store = TrainingStore::with_defaults();
        let report = store.load_demo_data().await.unwrap();
        assert!(report.records > 0);
        assert_eq!(report.rows_skipped, 0);
        assert_eq!(store.preview().len(), store.config().preview_len);
    }
}
