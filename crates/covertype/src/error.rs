#![forbid(unsafe_code)]

use std::path::PathBuf;

/// A categorical selection or raw row that cannot be turned into a feature vector.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EncodingError {
    #[error("Wilderness area `{0}` does not name a category")]
    UnrecognizedWilderness(String),

    #[error("Wilderness area {0} is outside 1..=4")]
    WildernessOutOfRange(u32),

    #[error("Soil type `{0}` does not name a category")]
    UnrecognizedSoil(String),

    #[error("Soil type {0} is outside 1..=40")]
    SoilOutOfRange(u32),

    #[error("Expected {expected} feature values, got {actual}")]
    WrongLength { expected: usize, actual: usize },
}

/// The classifier could not be invoked, or answered in an unexpected shape.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PredictionError {
    #[error("Classifier failed: {0}")]
    Classifier(String),

    #[error("Classifier returned {actual} probabilities, expected {expected}")]
    DistributionShape { expected: usize, actual: usize },

    #[error("Classifier returned {actual} rows for {expected} inputs")]
    RowCount { expected: usize, actual: usize },

    #[error("Classifier returned unknown class index {0}")]
    UnknownClass(usize),

    #[error("Classifier probabilities sum to {0}, not 1")]
    Unnormalized(f64),

    #[error("Configured for {0} cover types, expected 7")]
    ClassCount(usize),

    #[error("Classifier expects column `{expected}` at position {position}, encoder produces `{actual}`")]
    FeatureLayout {
        position: usize,
        expected: String,
        actual: String,
    },
}

/// A classifier artifact that cannot be used.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("Failed to read model file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Model file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Model must score at least two classes, found {0}")]
    TooFewClasses(usize),

    #[error("Tree {tree} targets class {class}, model has {num_class}")]
    ClassOutOfRange {
        tree: usize,
        class: usize,
        num_class: usize,
    },

    #[error("Tree {0} has no nodes")]
    EmptyTree(usize),

    #[error("Tree {tree}, node {node} splits on feature {feature}, model has {num_features}")]
    FeatureOutOfRange {
        tree: usize,
        node: usize,
        feature: usize,
        num_features: usize,
    },

    #[error("Tree {tree}, node {node} links to child {child}; children must follow their parent")]
    BadChild {
        tree: usize,
        node: usize,
        child: usize,
    },
}

/// Which one-hot block of a batch row is malformed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OneHotBlock {
    Wilderness,
    Soil,
}

impl std::fmt::Display for OneHotBlock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OneHotBlock::Wilderness => f.write_str("Wilderness_Area"),
            OneHotBlock::Soil => f.write_str("Soil_Type"),
        }
    }
}

/// A batch upload rejected before any row is scored.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BatchValidationError {
    #[error("The uploaded file is empty")]
    Empty,

    #[error("The uploaded file is not valid CSV: {0}")]
    Malformed(String),

    #[error("Uploaded file is missing columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("Row {row} has {actual} cells, header has {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        actual: usize,
    },

    #[error("Row {row}, column `{column}`: `{value}` is not a number")]
    InvalidCell {
        row: usize,
        column: String,
        value: String,
    },

    #[error(
        "Invalid {block} encoding: each row must have exactly one {block} column set to 1. \
         Found {total} invalid rows (showing first {}): {rows:?}",
        .rows.len()
    )]
    InvalidOneHot {
        block: OneHotBlock,
        total: usize,
        rows: Vec<usize>,
    },
}

/// Failures of the prediction history store.
#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    #[error("Failed to read history at {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("History at {path} is not a valid history document: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to serialize history: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Failed to write history to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Encoding(#[from] EncodingError),

    #[error(transparent)]
    Prediction(#[from] PredictionError),

    #[error(transparent)]
    BatchValidation(#[from] BatchValidationError),

    #[error(transparent)]
    History(#[from] HistoryError),

    #[error("Failed to load model from {path}: {source}")]
    ModelLoad {
        path: PathBuf,
        #[source]
        source: ModelError,
    },

    #[error("Failed to encode JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
