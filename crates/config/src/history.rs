use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct History {
    /// Location of the prediction history file. It holds two arrays,
    /// `single` and `batch`, and is rewritten as a whole on every append.
    pub path: PathBuf,

    /// Directory that receives unreadable history files. A corrupt file is
    /// moved here under a timestamped name and never deleted.
    pub backup_dir: PathBuf,

    /// Retention cap per record kind. When a sequence grows past this, the
    /// oldest entries are dropped.
    pub max_records: usize,

    /// Only the most recent `display_limit` records of each kind are
    /// considered when listing or exporting.
    pub display_limit: usize,
}

impl Default for History {
    fn default() -> Self {
        Self {
            path: PathBuf::from("dataset/history.json"),
            backup_dir: PathBuf::from("dataset/history_backup"),
            max_records: 5000,
            display_limit: 200,
        }
    }
}
