use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Model {
    /// Path to the serialized tree-ensemble classifier. The file is read once
    /// when the process starts and shared read-only afterwards.
    pub path: PathBuf,

    /// Number of cover types the classifier is expected to score. Only the
    /// seven known cover types are accepted; a model whose probability output
    /// has a different width is rejected at prediction time.
    pub num_classes: usize,
}

impl Default for Model {
    fn default() -> Self {
        Self {
            path: PathBuf::from("model/cover_model.json"),
            num_classes: 7,
        }
    }
}
