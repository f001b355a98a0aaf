#![forbid(unsafe_code)]

//! Per-user context tying the encoder, prediction service, history and
//! artifact stores together.

use crate::artifacts::ArtifactStore;
use crate::batch::{BatchInput, BatchOutcome};
use crate::domain::TerrainSample;
use crate::encoding::{InputAdvisory, encode, review};
use crate::error::{Error, HistoryError};
use crate::history::{BatchRecord, HistoryStore, SingleRecord};
use crate::prediction::{Classifier, PredictionResult, PredictionService};
use config::{Config, Theme, View};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

/// How many class ids a batch history record keeps.
pub const PREVIEW_ROWS: usize = 10;

/// A scored sample plus what happened when it was recorded.
#[derive(Debug)]
pub struct SinglePrediction {
    pub result: PredictionResult,
    pub advisories: Vec<InputAdvisory>,
    pub record: SingleRecord,
    pub artifact_dir: Option<PathBuf>,
    /// Set when the artifact files could not be written.
    pub artifact_error: Option<Error>,
    /// Set when the history could not be persisted. The record is still
    /// part of the in-memory history.
    pub history_error: Option<HistoryError>,
}

/// A scored batch plus what happened when it was recorded.
#[derive(Debug)]
pub struct BatchPrediction {
    pub outcome: BatchOutcome,
    pub record: BatchRecord,
    pub artifact_dir: Option<PathBuf>,
    pub artifact_error: Option<Error>,
    pub history_error: Option<HistoryError>,
}

#[derive(Debug)]
pub struct Session {
    view: View,
    theme: Theme,
    service: PredictionService,
    history: HistoryStore,
    artifacts: Option<ArtifactStore>,
}

impl Session {
    pub fn new(service: PredictionService, history: HistoryStore) -> Self {
        Self {
            view: View::default(),
            theme: Theme::default(),
            service,
            history,
            artifacts: None,
        }
    }

    /// Build a session from configuration around an already loaded classifier.
    pub fn from_config(config: &Config, classifier: Arc<dyn Classifier>) -> Result<Self, Error> {
        let service = PredictionService::new(classifier, config.model.num_classes)?;
        let mut session = Self::new(service, HistoryStore::from_config(&config.history));
        session.view = config.session.view;
        session.theme = config.session.theme;
        session.artifacts = ArtifactStore::from_config(&config.artifacts);
        Ok(session)
    }

    /// Replace the history store, e.g. with an in-memory one.
    pub fn with_history(mut self, history: HistoryStore) -> Self {
        self.history = history;
        self
    }

    pub fn with_artifacts(mut self, artifacts: ArtifactStore) -> Self {
        self.artifacts = Some(artifacts);
        self
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn set_view(&mut self, view: View) {
        self.view = view;
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
    }

    pub fn service(&self) -> &PredictionService {
        &self.service
    }

    pub fn history(&mut self) -> &mut HistoryStore {
        &mut self.history
    }

    /// Encode, score and record one sample.
    ///
    /// Encoding and scoring failures abort. Failing to save artifacts or
    /// history does not: the result is returned with the error attached.
    pub fn predict_single(&mut self, sample: TerrainSample) -> Result<SinglePrediction, Error> {
        let advisories = review(&sample);
        for advisory in &advisories {
            warn!(%advisory, "input advisory");
        }
        let result = self.service.predict(&encode(&sample))?;
        info!(
            class = result.class_id(),
            name = result.class_name(),
            confidence = result.confidence,
            "single prediction"
        );

        let mut record = SingleRecord::new(sample, &result);
        record.timestamp = Some(self.history.timestamp());
        let (artifact_dir, artifact_error) = match &self.artifacts {
            Some(store) => split(store.save_single(&mut record)),
            None => (None, None),
        };
        let history_error = self.history.append(record.clone()).err();

        Ok(SinglePrediction {
            result,
            advisories,
            record,
            artifact_dir,
            artifact_error,
            history_error,
        })
    }

    /// Validate, score and record a batch upload.
    pub fn predict_batch(&mut self, file_name: &str, csv: &str) -> Result<BatchPrediction, Error> {
        let input = BatchInput::from_csv(csv, self.service.feature_names())?;
        let outcome = BatchOutcome::score(input, &self.service)?;

        let mut record = BatchRecord::new(file_name, outcome.len(), outcome.preview(PREVIEW_ROWS));
        record.timestamp = Some(self.history.timestamp());
        let (artifact_dir, artifact_error) = match &self.artifacts {
            Some(store) => {
                let csv = outcome.to_csv(self.service.feature_names());
                split(store.save_batch(&mut record, &csv))
            }
            None => (None, None),
        };
        let history_error = self.history.append(record.clone()).err();

        Ok(BatchPrediction {
            outcome,
            record,
            artifact_dir,
            artifact_error,
            history_error,
        })
    }
}

fn split(saved: Result<PathBuf, Error>) -> (Option<PathBuf>, Option<Error>) {
    match saved {
        Ok(dir) => (Some(dir), None),
        Err(err) => {
            warn!(%err, "failed to save prediction artifacts");
            (None, Some(err))
        }
    }
}
