#![forbid(unsafe_code)]

use crate::clock::{Clock, SystemClock, TIMESTAMP_FORMAT};
use crate::error::HistoryError;
use crate::history::{
    HistoryFile, HistoryKind, HistoryQuery, HistoryRecord, HistoryRepository, JsonFileRepository,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};

/// Aggregate numbers over the displayed window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HistorySummary {
    pub single: usize,
    pub batch: usize,
    /// Mean confidence of single predictions, as a percentage.
    pub mean_confidence: Option<f64>,
}

/// Lazily loaded, capped prediction history.
///
/// Nothing is read until the first access. After that the in-memory copy
/// is authoritative and every append rewrites the whole file.
pub struct HistoryStore {
    repo: Box<dyn HistoryRepository>,
    clock: Arc<dyn Clock>,
    max_records: usize,
    display_limit: usize,
    loaded: Option<HistoryFile>,
}

impl std::fmt::Debug for HistoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HistoryStore")
            .field("max_records", &self.max_records)
            .field("display_limit", &self.display_limit)
            .field("loaded", &self.loaded.is_some())
            .finish_non_exhaustive()
    }
}

impl HistoryStore {
    pub fn new(repo: Box<dyn HistoryRepository>, max_records: usize) -> Self {
        Self {
            repo,
            clock: Arc::new(SystemClock),
            max_records,
            display_limit: max_records,
            loaded: None,
        }
    }

    /// A JSON-file backed store using the configured paths and limits.
    pub fn from_config(config: &config::History) -> Self {
        Self::new(
            Box::new(JsonFileRepository::from_config(config)),
            config.max_records,
        )
        .with_display_limit(config.display_limit)
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_display_limit(mut self, display_limit: usize) -> Self {
        self.display_limit = display_limit;
        self
    }

    pub fn max_records(&self) -> usize {
        self.max_records
    }

    pub fn display_limit(&self) -> usize {
        self.display_limit
    }

    /// Current time in the record timestamp format.
    pub fn timestamp(&self) -> String {
        self.clock.now().format(TIMESTAMP_FORMAT).to_string()
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded.is_some()
    }

    /// The history, read from the repository on first call only.
    pub fn load(&mut self) -> &HistoryFile {
        self.loaded_mut()
    }

    fn loaded_mut(&mut self) -> &mut HistoryFile {
        ensure_loaded(&mut self.loaded, self.repo.as_ref(), self.max_records)
    }

    /// Append a record and persist the whole history.
    ///
    /// The record is stamped with the current time when it has none. On a
    /// write failure the record stays in memory and the error is returned.
    pub fn append(&mut self, record: impl Into<HistoryRecord>) -> Result<(), HistoryError> {
        let mut record = record.into();
        let kind = record.kind();
        record.stamp_if_missing(|| self.timestamp());

        let file = ensure_loaded(&mut self.loaded, self.repo.as_ref(), self.max_records);
        file.push(record);
        file.truncate_to(self.max_records);
        let total = file.len(kind);

        self.repo.save(file)?;
        info!(%kind, total, "record saved to history");
        Ok(())
    }

    /// Records of one kind matching `query`, most recent first.
    pub fn query(&mut self, kind: HistoryKind, query: &HistoryQuery) -> Vec<HistoryRecord> {
        let found = query.apply(self.load().records(kind));
        debug!(%kind, found = found.len(), "history queried");
        found
    }

    /// The query views use by default: no filters, limited to the display window.
    pub fn display_query(&self) -> HistoryQuery {
        HistoryQuery::default().window(self.display_limit)
    }

    pub fn summary(&mut self) -> HistorySummary {
        let display_limit = self.display_limit;
        let file = self.load();
        let single = &file.single[file.single.len().saturating_sub(display_limit)..];
        let batch = file.batch.len().min(display_limit);

        let confidences: Vec<f64> = single
            .iter()
            .filter_map(|r| r.confidence)
            .filter(|c| c.is_finite())
            .collect();
        let mean_confidence = (!confidences.is_empty())
            .then(|| confidences.iter().sum::<f64>() / confidences.len() as f64);

        HistorySummary {
            single: single.len(),
            batch,
            mean_confidence,
        }
    }
}

fn ensure_loaded<'a>(
    slot: &'a mut Option<HistoryFile>,
    repo: &dyn HistoryRepository,
    max_records: usize,
) -> &'a mut HistoryFile {
    slot.get_or_insert_with(|| {
        let mut file = repo.load();
        file.truncate_to(max_records);
        file
    })
}
