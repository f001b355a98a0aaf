#![forbid(unsafe_code)]

use crate::domain::TerrainSample;
use crate::prediction::PredictionResult;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Which sequence of the history file a record belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryKind {
    Single,
    Batch,
}

impl HistoryKind {
    pub const ALL: [HistoryKind; 2] = [HistoryKind::Single, HistoryKind::Batch];

    pub fn as_str(self) -> &'static str {
        match self {
            HistoryKind::Single => "single",
            HistoryKind::Batch => "batch",
        }
    }
}

impl fmt::Display for HistoryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HistoryKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "single" => Ok(HistoryKind::Single),
            "batch" => Ok(HistoryKind::Batch),
            other => Err(format!("unknown history kind `{other}`, expected single or batch")),
        }
    }
}

/// One scored terrain sample.
///
/// Every modelled field is optional: files written by older versions or
/// edited by hand may lack any of them. A value present under a known key
/// but of the wrong shape is left untouched in `extra`, so a rewrite gives
/// back exactly what was read.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Map<String, Value>")]
pub struct SingleRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    /// Directory holding the saved artifacts, if any were written.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Cover type id, 1..=7.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prediction: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prediction_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub probabilities: Option<Vec<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inputs: Option<TerrainSample>,
    /// Keys this version does not model, kept so rewrites lose nothing.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SingleRecord {
    pub fn new(inputs: TerrainSample, result: &PredictionResult) -> Self {
        Self {
            timestamp: None,
            path: None,
            prediction: Some(result.class_id()),
            prediction_name: Some(result.class_name().to_owned()),
            confidence: Some(result.confidence),
            probabilities: Some(result.probabilities.clone()),
            inputs: Some(inputs),
            extra: Map::new(),
        }
    }
}

impl From<Map<String, Value>> for SingleRecord {
    fn from(mut extra: Map<String, Value>) -> Self {
        Self {
            timestamp: take(&mut extra, "timestamp"),
            path: take(&mut extra, "path"),
            prediction: take(&mut extra, "prediction"),
            prediction_name: take(&mut extra, "prediction_name"),
            confidence: take(&mut extra, "confidence"),
            probabilities: take(&mut extra, "probabilities"),
            inputs: take(&mut extra, "inputs"),
            extra,
        }
    }
}

/// One scored batch upload. Fields follow the same rules as [`SingleRecord`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Map<String, Value>")]
pub struct BatchRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    /// Name of the uploaded file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rows: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Cover type ids of the first rows.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub predictions_preview: Option<Vec<u8>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl BatchRecord {
    pub fn new(file: impl Into<String>, rows: usize, predictions_preview: Vec<u8>) -> Self {
        Self {
            timestamp: None,
            file: Some(file.into()),
            rows: Some(rows),
            path: None,
            predictions_preview: Some(predictions_preview),
            extra: Map::new(),
        }
    }
}

impl From<Map<String, Value>> for BatchRecord {
    fn from(mut extra: Map<String, Value>) -> Self {
        Self {
            timestamp: take(&mut extra, "timestamp"),
            file: take(&mut extra, "file"),
            rows: take(&mut extra, "rows"),
            path: take(&mut extra, "path"),
            predictions_preview: take(&mut extra, "predictions_preview"),
            extra,
        }
    }
}

/// Move `key` out of `map` if its value has the shape `T` expects. Anything
/// else, `null` included, stays where it is.
fn take<T: DeserializeOwned>(map: &mut Map<String, Value>, key: &str) -> Option<T> {
    let value = T::deserialize(map.get(key)?).ok()?;
    map.remove(key);
    Some(value)
}

/// A record of either kind. Serializes as the bare inner record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum HistoryRecord {
    Single(SingleRecord),
    Batch(BatchRecord),
}

impl HistoryRecord {
    pub fn kind(&self) -> HistoryKind {
        match self {
            HistoryRecord::Single(_) => HistoryKind::Single,
            HistoryRecord::Batch(_) => HistoryKind::Batch,
        }
    }

    pub fn timestamp(&self) -> Option<&str> {
        match self {
            HistoryRecord::Single(r) => r.timestamp.as_deref(),
            HistoryRecord::Batch(r) => r.timestamp.as_deref(),
        }
    }

    /// Set the timestamp from `now` unless the record already carries one.
    pub(crate) fn stamp_if_missing(&mut self, now: impl FnOnce() -> String) {
        let (timestamp, extra) = match self {
            HistoryRecord::Single(r) => (&mut r.timestamp, &mut r.extra),
            HistoryRecord::Batch(r) => (&mut r.timestamp, &mut r.extra),
        };
        if timestamp.as_deref().is_none_or(|ts| ts.trim().is_empty()) {
            extra.remove("timestamp");
            *timestamp = Some(now());
        }
    }

    pub fn path(&self) -> Option<&str> {
        match self {
            HistoryRecord::Single(r) => r.path.as_deref(),
            HistoryRecord::Batch(r) => r.path.as_deref(),
        }
    }
}

impl From<SingleRecord> for HistoryRecord {
    fn from(record: SingleRecord) -> Self {
        HistoryRecord::Single(record)
    }
}

impl From<BatchRecord> for HistoryRecord {
    fn from(record: BatchRecord) -> Self {
        HistoryRecord::Batch(record)
    }
}

/// On-disk aggregate: two ordered sequences, oldest first.
///
/// The document must be an object and each sequence, when present, an array
/// of objects. Other top-level keys ride along in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoryFile {
    #[serde(default)]
    pub single: Vec<SingleRecord>,
    #[serde(default)]
    pub batch: Vec<BatchRecord>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl HistoryFile {
    pub fn len(&self, kind: HistoryKind) -> usize {
        match kind {
            HistoryKind::Single => self.single.len(),
            HistoryKind::Batch => self.batch.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.single.is_empty() && self.batch.is_empty()
    }

    /// Records of one kind as owned variants, oldest first.
    pub fn records(&self, kind: HistoryKind) -> Vec<HistoryRecord> {
        match kind {
            HistoryKind::Single => self.single.iter().cloned().map(HistoryRecord::from).collect(),
            HistoryKind::Batch => self.batch.iter().cloned().map(HistoryRecord::from).collect(),
        }
    }

    pub(crate) fn push(&mut self, record: HistoryRecord) {
        match record {
            HistoryRecord::Single(r) => self.single.push(r),
            HistoryRecord::Batch(r) => self.batch.push(r),
        }
    }

    /// Keep only the `cap` most recent records of each kind.
    pub(crate) fn truncate_to(&mut self, cap: usize) {
        drop_oldest(&mut self.single, cap);
        drop_oldest(&mut self.batch, cap);
    }
}

fn drop_oldest<T>(records: &mut Vec<T>, cap: usize) {
    if records.len() > cap {
        let excess = records.len() - cap;
        records.drain(..excess);
    }
}
