#![forbid(unsafe_code)]

//! Append-only record of past predictions.
//!
//! [`HistoryStore`] owns the in-memory [`HistoryFile`] and persists it
//! through a [`HistoryRepository`] after every append.

mod exporter;
mod query;
mod record;
mod repo;
mod store;

pub use exporter::{ExportFormat, export};
pub use query::{HistoryQuery, parse_timestamp};
pub use record::{BatchRecord, HistoryFile, HistoryKind, HistoryRecord, SingleRecord};
pub use repo::{HistoryRepository, JsonFileRepository, MemoryRepository};
pub use store::{HistoryStore, HistorySummary};
