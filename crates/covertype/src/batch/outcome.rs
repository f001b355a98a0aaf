#![forbid(unsafe_code)]

use crate::batch::BatchInput;
use crate::domain::{CoverType, FeatureVector};
use crate::error::PredictionError;
use crate::prediction::{PredictionResult, PredictionService};
use crate::tabular;
use tracing::info;

pub const PREDICTED_NUMBER_COLUMN: &str = "Predicted_Cover_Type_Number";
pub const PREDICTED_NAME_COLUMN: &str = "Predicted_Cover_Type_Name";

/// Scored batch: the validated rows and one result per row.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchOutcome {
    pub rows: Vec<FeatureVector>,
    pub results: Vec<PredictionResult>,
}

impl BatchOutcome {
    /// Score every row of a validated batch in one classifier call.
    pub fn score(input: BatchInput, service: &PredictionService) -> Result<Self, PredictionError> {
        let results = service.predict_rows(&input.rows)?;
        info!(rows = results.len(), "batch scored");
        Ok(Self {
            rows: input.rows,
            results,
        })
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Class ids of the first `n` rows.
    pub fn preview(&self, n: usize) -> Vec<u8> {
        self.results.iter().take(n).map(PredictionResult::class_id).collect()
    }

    /// Row count per cover type, in class id order.
    pub fn distribution(&self) -> Vec<(CoverType, usize)> {
        let mut counts = [0usize; CoverType::COUNT];
        for result in &self.results {
            counts[result.cover_type as usize] += 1;
        }
        CoverType::ALL.iter().copied().zip(counts).collect()
    }

    /// Input features followed by the predicted id and name of each row.
    pub fn to_csv(&self, feature_names: &[String]) -> String {
        let mut out = String::new();
        let header = feature_names
            .iter()
            .map(String::as_str)
            .chain([PREDICTED_NUMBER_COLUMN, PREDICTED_NAME_COLUMN]);
        tabular::write_record(&mut out, header);

        for (row, result) in self.rows.iter().zip(&self.results) {
            let fields = row
                .as_slice()
                .iter()
                .map(f64::to_string)
                .chain([result.class_id().to_string(), result.class_name().to_owned()]);
            tabular::write_record(&mut out, fields);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FEATURE_NAMES, TerrainSample};
    use crate::encoding::encode;

    fn result(cover: CoverType) -> PredictionResult {
        let mut probabilities = vec![0.0; CoverType::COUNT];
        probabilities[cover as usize] = 1.0;
        PredictionResult::new(cover, probabilities)
    }

    fn outcome(covers: &[CoverType]) -> BatchOutcome {
        BatchOutcome {
            rows: vec![encode(&TerrainSample::default()); covers.len()],
            results: covers.iter().copied().map(result).collect(),
        }
    }

    #[test]
    fn distribution_counts_every_class() {
        let outcome = outcome(&[CoverType::Aspen, CoverType::SpruceFir, CoverType::Aspen]);
        let distribution = outcome.distribution();

        assert_eq!(distribution.len(), 7);
        assert_eq!(distribution[0], (CoverType::SpruceFir, 1));
        assert_eq!(distribution[4], (CoverType::Aspen, 2));
        assert_eq!(distribution.iter().map(|(_, n)| n).sum::<usize>(), 3);
    }

    #[test]
    fn preview_is_truncated() {
        let outcome = outcome(&[CoverType::Krummholz; 12]);
        assert_eq!(outcome.preview(10), vec![7; 10]);
        assert_eq!(outcome.preview(50).len(), 12);
    }

    #[test]
    fn csv_appends_prediction_columns() {
        let names: Vec<String> = FEATURE_NAMES.iter().map(|s| s.to_string()).collect();
        let csv = outcome(&[CoverType::SpruceFir, CoverType::DouglasFir]).to_csv(&names);
        let records = tabular::parse(&csv).unwrap();

        assert_eq!(records.len(), 3);
        assert_eq!(records[0].len(), 56);
        assert_eq!(records[0][54], PREDICTED_NUMBER_COLUMN);
        assert_eq!(records[0][55], PREDICTED_NAME_COLUMN);
        assert_eq!(records[1][0], "2500");
        assert_eq!(&records[1][54..], ["1", "Spruce/Fir"]);
        assert_eq!(&records[2][54..], ["6", "Douglas-fir"]);
    }
}
