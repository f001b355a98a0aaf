#![forbid(unsafe_code)]

use crate::clock::{COMPACT_FORMAT, Clock, SystemClock};
use crate::error::Error;
use crate::history::{BatchRecord, HistoryKind, SingleRecord};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

pub const SINGLE_FILE: &str = "prediction.json";
pub const BATCH_FILE: &str = "predictions.csv";

/// Writes per-prediction files under `<root>/<single|batch>/<timestamp>`.
pub struct ArtifactStore {
    root: PathBuf,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for ArtifactStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArtifactStore")
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}

impl ArtifactStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            clock: Arc::new(SystemClock),
        }
    }

    /// `None` when artifacts are disabled.
    pub fn from_config(config: &config::Artifacts) -> Option<Self> {
        config.enabled.then(|| Self::new(&config.save_root))
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write `prediction.json` and point the record's `path` at its directory.
    /// The record is left untouched when nothing could be written.
    pub fn save_single(&self, record: &mut SingleRecord) -> Result<PathBuf, Error> {
        let dir = self.fresh_dir(HistoryKind::Single)?;
        let mut saved = record.clone();
        saved.extra.remove("path");
        saved.path = Some(dir.display().to_string());
        let json = serde_json::to_vec_pretty(&saved)?;
        fill(&dir, SINGLE_FILE, &json)?;
        *record = saved;
        info!(dir = %dir.display(), "single prediction saved");
        Ok(dir)
    }

    /// Write `predictions.csv` and point the record's `path` at its directory.
    /// The record is left untouched when nothing could be written.
    pub fn save_batch(&self, record: &mut BatchRecord, csv: &str) -> Result<PathBuf, Error> {
        let dir = self.fresh_dir(HistoryKind::Batch)?;
        fill(&dir, BATCH_FILE, csv.as_bytes())?;
        record.extra.remove("path");
        record.path = Some(dir.display().to_string());
        info!(dir = %dir.display(), rows = ?record.rows, "batch predictions saved");
        Ok(dir)
    }

    /// A new directory named after the current time, suffixed when a run in
    /// the same second already claimed the name.
    fn fresh_dir(&self, kind: HistoryKind) -> Result<PathBuf, Error> {
        let parent = self.root.join(kind.as_str());
        std::fs::create_dir_all(&parent)?;
        let stamp = self.clock.now().format(COMPACT_FORMAT).to_string();
        let mut dir = parent.join(&stamp);
        let mut attempt = 1;
        loop {
            match std::fs::create_dir(&dir) {
                Ok(()) => return Ok(dir),
                Err(err) if err.kind() == std::io::ErrorKind::AlreadyExists => {
                    dir = parent.join(format!("{stamp}_{attempt}"));
                    attempt += 1;
                }
                Err(err) => return Err(err.into()),
            }
        }
    }
}

/// Write `name` into `dir`, removing the directory again if that fails.
fn fill(dir: &Path, name: &str, contents: &[u8]) -> Result<(), Error> {
    std::fs::write(dir.join(name), contents).map_err(|err| {
        if let Err(cleanup) = std::fs::remove_dir(dir) {
            warn!(dir = %dir.display(), %cleanup, "artifact directory left behind");
        }
        Error::from(err)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use chrono::NaiveDate;
    use tempfile::tempdir;

    fn store(root: &Path) -> ArtifactStore {
        let at = NaiveDate::from_ymd_opt(2025, 1, 2)
            .unwrap()
            .and_hms_opt(3, 4, 5)
            .unwrap();
        ArtifactStore::new(root).with_clock(Arc::new(FixedClock(at)))
    }

    #[test]
    fn single_writes_json_with_its_path() {
        let dir = tempdir().unwrap();
        let mut record = SingleRecord {
            prediction: Some(2),
            prediction_name: Some("Lodgepole Pine".into()),
            ..SingleRecord::default()
        };
        let saved = store(dir.path()).save_single(&mut record).unwrap();

        assert_eq!(saved, dir.path().join("single/20250102_030405"));
        let written: SingleRecord =
            serde_json::from_slice(&std::fs::read(saved.join(SINGLE_FILE)).unwrap()).unwrap();
        assert_eq!(written, record);
        assert_eq!(record.path, Some(saved.display().to_string()));
    }

    #[test]
    fn failed_write_is_reported() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("batch/20250102_030405");
        std::fs::create_dir_all(&target).unwrap();
        // A directory squatting on the file name makes the write fail.
        std::fs::create_dir(target.join(BATCH_FILE)).unwrap();

        assert!(fill(&target, BATCH_FILE, b"x\n").is_err());
        assert!(fill(&dir.path().join("batch/missing"), BATCH_FILE, b"x\n").is_err());
        assert!(target.join(BATCH_FILE).is_dir());
    }

    #[test]
    fn same_second_runs_get_distinct_dirs() {
        let dir = tempdir().unwrap();
        let store = store(dir.path());
        let mut first = BatchRecord::new("a.csv", 1, vec![1]);
        let mut second = BatchRecord::new("b.csv", 1, vec![2]);

        let a = store.save_batch(&mut first, "x\n1\n").unwrap();
        let b = store.save_batch(&mut second, "x\n2\n").unwrap();

        assert_ne!(a, b);
        assert_eq!(b, dir.path().join("batch/20250102_030405_1"));
        assert_eq!(std::fs::read_to_string(a.join(BATCH_FILE)).unwrap(), "x\n1\n");
        assert_eq!(std::fs::read_to_string(b.join(BATCH_FILE)).unwrap(), "x\n2\n");
    }

    #[test]
    fn disabled_config_gives_no_store() {
        let config = config::Artifacts {
            enabled: false,
            ..config::Artifacts::default()
        };
        assert!(ArtifactStore::from_config(&config).is_none());
    }
}
