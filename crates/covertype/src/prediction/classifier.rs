#![forbid(unsafe_code)]

use crate::domain::FeatureVector;
use crate::error::PredictionError;

/// A pre-trained multi-class model.
///
/// Implementations score whole batches; a single prediction is a batch of
/// one. Class indices are zero-based.
pub trait Classifier: Send + Sync {
    /// Column names in the order the model expects them.
    fn feature_names(&self) -> &[String];

    /// Width of the probability distribution returned per row.
    fn num_classes(&self) -> usize;

    /// Most likely class index for each row.
    fn predict(&self, rows: &[FeatureVector]) -> Result<Vec<usize>, PredictionError>;

    /// Probability distribution over classes for each row.
    fn predict_probabilities(&self, rows: &[FeatureVector])
    -> Result<Vec<Vec<f64>>, PredictionError>;
}
