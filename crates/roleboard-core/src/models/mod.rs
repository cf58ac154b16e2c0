//! Data models for roleboard

pub mod month;
pub mod record;
pub mod views;

pub use month::Month;
pub use record::{
    level_label, lesson_key, player_key, SessionRecord, CSV_COLUMNS, CSV_HEADER,
};
pub use views::{
    AggregatedData, DateRange, GroupBy, LogEntry, LogPage, MonthlyTrend, PlayerRecord,
    RankingEntry, TrainingStats,
};
