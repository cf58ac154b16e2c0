//! roleboard-core - Core library for roleboard
//!
//! Provides CSV ingestion, the filter model, hierarchy trees, analytics
//! and the training store for roleplay session data.

pub mod analytics;
pub mod error;
pub mod event;
pub mod export;
pub mod filter;
pub mod hierarchy;
pub mod models;
pub mod parsers;
pub mod sort;
pub mod store;

pub use error::{CoreError, IngestReport};
pub use event::{DataEvent, EventBus};
pub use export::{export_records_to_csv, export_view_to_json};
pub use filter::FilterState;
pub use hierarchy::{CheckState, Hierarchy, HierarchyKind, HierarchyNode};
pub use models::{GroupBy, Month, SessionRecord};
pub use sort::{SortDirection, SortState, SortableRow, TableSort};
pub use store::{StoreConfig, TrainingStore};
