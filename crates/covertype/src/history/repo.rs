#![forbid(unsafe_code)]

use crate::clock::{COMPACT_FORMAT, Clock, SystemClock};
use crate::error::HistoryError;
use crate::history::HistoryFile;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::NamedTempFile;
use tracing::{debug, error, info, warn};

pub trait HistoryRepository: Send + Sync {
    /// Read the persisted history. Never fails: anything unreadable
    /// resolves to an empty history.
    fn load(&self) -> HistoryFile;
    /// Replace the persisted history.
    fn save(&self, file: &HistoryFile) -> Result<(), HistoryError>;
}

/// History kept only for the life of the process.
#[derive(Debug, Default)]
pub struct MemoryRepository {
    file: Mutex<HistoryFile>,
}

impl MemoryRepository {
    pub fn new(file: HistoryFile) -> Self {
        Self {
            file: Mutex::new(file),
        }
    }

    /// Copy of what was last saved.
    pub fn snapshot(&self) -> HistoryFile {
        self.file
            .lock()
            .map(|file| file.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }
}

impl HistoryRepository for MemoryRepository {
    fn load(&self) -> HistoryFile {
        self.snapshot()
    }

    fn save(&self, file: &HistoryFile) -> Result<(), HistoryError> {
        let mut guard = self
            .file
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = file.clone();
        Ok(())
    }
}

/// History stored as one JSON document, rewritten atomically.
pub struct JsonFileRepository {
    path: PathBuf,
    backup_dir: PathBuf,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for JsonFileRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonFileRepository")
            .field("path", &self.path)
            .field("backup_dir", &self.backup_dir)
            .finish_non_exhaustive()
    }
}

impl JsonFileRepository {
    pub fn new(path: impl Into<PathBuf>, backup_dir: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            backup_dir: backup_dir.into(),
            clock: Arc::new(SystemClock),
        }
    }

    pub fn from_config(config: &config::History) -> Self {
        Self::new(&config.path, &config.backup_dir)
    }

    /// Use `clock` to name corrupt-file backups.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn backup_dir(&self) -> &Path {
        &self.backup_dir
    }

    /// `Ok(None)` when no history has been written yet.
    fn read(&self) -> Result<Option<HistoryFile>, HistoryError> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(HistoryError::Read {
                    path: self.path.clone(),
                    source,
                });
            }
        };
        serde_json::from_str(&text)
            .map(Some)
            .map_err(|source| HistoryError::Parse {
                path: self.path.clone(),
                source,
            })
    }

    /// Move the unreadable file into the backup directory under a name no
    /// earlier backup uses.
    fn quarantine(&self) -> io::Result<PathBuf> {
        std::fs::create_dir_all(&self.backup_dir)?;
        let stamp = self.clock.now().format(COMPACT_FORMAT).to_string();
        let mut target = self.backup_dir.join(format!("history_corrupt_{stamp}.json"));
        let mut attempt = 1;
        while target.exists() {
            target = self
                .backup_dir
                .join(format!("history_corrupt_{stamp}_{attempt}.json"));
            attempt += 1;
        }
        std::fs::rename(&self.path, &target)?;
        Ok(target)
    }

    fn write(&self, file: &HistoryFile) -> Result<(), HistoryError> {
        let write_err = |source: io::Error| HistoryError::Write {
            path: self.path.clone(),
            source,
        };
        let json = serde_json::to_vec_pretty(file)?;

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir).map_err(write_err)?;

        let mut tmp = NamedTempFile::new_in(dir).map_err(write_err)?;
        tmp.write_all(&json).map_err(write_err)?;
        tmp.as_file().sync_all().map_err(write_err)?;
        tmp.persist(&self.path).map_err(|err| write_err(err.error))?;
        Ok(())
    }
}

impl HistoryRepository for JsonFileRepository {
    fn load(&self) -> HistoryFile {
        match self.read() {
            Ok(Some(file)) => {
                debug!(
                    path = %self.path.display(),
                    single = file.single.len(),
                    batch = file.batch.len(),
                    "history loaded"
                );
                file
            }
            Ok(None) => {
                debug!(path = %self.path.display(), "no history yet");
                HistoryFile::default()
            }
            Err(err) => {
                warn!(%err, "history unreadable, starting empty");
                match self.quarantine() {
                    Ok(backup) => {
                        info!(backup = %backup.display(), "corrupt history moved aside");
                    }
                    Err(backup_err) => {
                        error!(
                            path = %self.path.display(),
                            %backup_err,
                            "failed to back up corrupt history"
                        );
                    }
                }
                HistoryFile::default()
            }
        }
    }

    fn save(&self, file: &HistoryFile) -> Result<(), HistoryError> {
        self.write(file).inspect_err(|err| error!(%err, "history write failed"))?;
        debug!(path = %self.path.display(), "history written");
        Ok(())
    }
}
