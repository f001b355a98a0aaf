use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Artifacts {
    /// Whether predictions leave files behind (`prediction.json` for a
    /// single patch, `predictions.csv` for a batch).
    pub enabled: bool,

    /// Root directory for saved predictions. Each run gets its own
    /// `<save_root>/<single|batch>/<timestamp>` directory.
    pub save_root: PathBuf,
}

impl Default for Artifacts {
    fn default() -> Self {
        Self {
            enabled: true,
            save_root: PathBuf::from("Saved_Predictions"),
        }
    }
}
