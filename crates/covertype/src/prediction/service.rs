#![forbid(unsafe_code)]

use crate::domain::{CoverType, FEATURE_NAMES, FeatureVector};
use crate::error::PredictionError;
use crate::prediction::{Classifier, PredictionResult};
use std::sync::Arc;
use tracing::{debug, warn};

/// Tolerance on the sum of a returned probability distribution.
const NORMALIZATION_TOLERANCE: f64 = 1e-3;

/// Wraps a shared classifier and turns its raw output into [`PredictionResult`]s.
#[derive(Clone)]
pub struct PredictionService {
    classifier: Arc<dyn Classifier>,
    num_classes: usize,
}

impl std::fmt::Debug for PredictionService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PredictionService")
            .field("num_classes", &self.num_classes)
            .field("num_features", &self.classifier.feature_names().len())
            .finish()
    }
}

impl PredictionService {
    /// Check that the classifier consumes the encoder's column layout and
    /// that `num_classes` matches the cover type table.
    pub fn new(classifier: Arc<dyn Classifier>, num_classes: usize) -> Result<Self, PredictionError> {
        if num_classes != CoverType::COUNT {
            return Err(PredictionError::ClassCount(num_classes));
        }
        let names = classifier.feature_names();
        for (position, encoded) in FEATURE_NAMES.iter().enumerate() {
            let wanted = names.get(position).map(String::as_str).unwrap_or("<missing>");
            if wanted != *encoded {
                return Err(PredictionError::FeatureLayout {
                    position,
                    expected: wanted.to_owned(),
                    actual: (*encoded).to_owned(),
                });
            }
        }
        if names.len() != FEATURE_NAMES.len() {
            return Err(PredictionError::FeatureLayout {
                position: FEATURE_NAMES.len(),
                expected: names[FEATURE_NAMES.len()].clone(),
                actual: "<end>".to_owned(),
            });
        }
        if classifier.num_classes() != num_classes {
            warn!(
                model = classifier.num_classes(),
                configured = num_classes,
                "classifier class count differs from configuration"
            );
        }
        Ok(Self {
            classifier,
            num_classes,
        })
    }

    /// Column names the classifier expects, in order.
    pub fn feature_names(&self) -> &[String] {
        self.classifier.feature_names()
    }

    pub fn num_classes(&self) -> usize {
        self.num_classes
    }

    /// Score one feature vector.
    pub fn predict(&self, vector: &FeatureVector) -> Result<PredictionResult, PredictionError> {
        let mut results = self.predict_rows(std::slice::from_ref(vector))?;
        results.pop().ok_or(PredictionError::RowCount {
            expected: 1,
            actual: 0,
        })
    }

    /// Score many vectors with one call per classifier capability.
    pub fn predict_rows(
        &self,
        rows: &[FeatureVector],
    ) -> Result<Vec<PredictionResult>, PredictionError> {
        let classes = self.classifier.predict(rows)?;
        let distributions = self.classifier.predict_probabilities(rows)?;
        for actual in [classes.len(), distributions.len()] {
            if actual != rows.len() {
                return Err(PredictionError::RowCount {
                    expected: rows.len(),
                    actual,
                });
            }
        }

        let results = classes
            .into_iter()
            .zip(distributions)
            .map(|(class, probabilities)| self.post_process(class, probabilities))
            .collect::<Result<Vec<_>, _>>()?;
        debug!(rows = results.len(), "rows scored");
        Ok(results)
    }

    fn post_process(
        &self,
        class: usize,
        probabilities: Vec<f64>,
    ) -> Result<PredictionResult, PredictionError> {
        if probabilities.len() != self.num_classes {
            return Err(PredictionError::DistributionShape {
                expected: self.num_classes,
                actual: probabilities.len(),
            });
        }
        let sum: f64 = probabilities.iter().sum();
        if !sum.is_finite() || (sum - 1.0).abs() > NORMALIZATION_TOLERANCE {
            return Err(PredictionError::Unnormalized(sum));
        }
        let cover_type = CoverType::from_index(class).ok_or(PredictionError::UnknownClass(class))?;
        Ok(PredictionResult::new(cover_type, probabilities))
    }
}
