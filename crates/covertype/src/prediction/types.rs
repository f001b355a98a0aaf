#![forbid(unsafe_code)]

use crate::domain::CoverType;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionResult {
    pub cover_type: CoverType,
    /// One probability per cover type, ordered by class id.
    pub probabilities: Vec<f64>,
    /// Highest probability, as a percentage.
    pub confidence: f64,
}

impl PredictionResult {
    pub fn new(cover_type: CoverType, probabilities: Vec<f64>) -> Self {
        let confidence = probabilities.iter().copied().fold(0.0, f64::max) * 100.0;
        Self {
            cover_type,
            probabilities,
            confidence,
        }
    }

    pub fn class_id(&self) -> u8 {
        self.cover_type.id()
    }

    pub fn class_name(&self) -> &'static str {
        self.cover_type.name()
    }

    pub fn confidence_level(&self) -> ConfidenceLevel {
        ConfidenceLevel::from_confidence(self.confidence)
    }

    /// Cover types paired with their probability, most likely first.
    pub fn ranked(&self) -> Vec<(CoverType, f64)> {
        let mut ranked: Vec<_> = CoverType::ALL
            .iter()
            .copied()
            .zip(self.probabilities.iter().copied())
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked
    }
}

/// Coarse bucket for how sure the classifier is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ConfidenceLevel {
    VeryLow,
    Low,
    Confident,
    VeryConfident,
    ExtremelyConfident,
}

impl ConfidenceLevel {
    /// Bucket a percentage. Bounds are exclusive: exactly 95 is "very confident".
    pub fn from_confidence(confidence: f64) -> Self {
        if confidence > 95.0 {
            ConfidenceLevel::ExtremelyConfident
        } else if confidence > 85.0 {
            ConfidenceLevel::VeryConfident
        } else if confidence > 70.0 {
            ConfidenceLevel::Confident
        } else if confidence > 50.0 {
            ConfidenceLevel::Low
        } else {
            ConfidenceLevel::VeryLow
        }
    }
}

impl fmt::Display for ConfidenceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ConfidenceLevel::VeryLow => "Very Low Confidence",
            ConfidenceLevel::Low => "Low Confidence",
            ConfidenceLevel::Confident => "Confident",
            ConfidenceLevel::VeryConfident => "Very Confident",
            ConfidenceLevel::ExtremelyConfident => "Extremely Confident",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confidence_is_max_probability_percent() {
        let result = PredictionResult::new(
            CoverType::Aspen,
            vec![0.05, 0.05, 0.0, 0.0, 0.8, 0.1, 0.0],
        );
        assert!((result.confidence - 80.0).abs() < 1e-9);
        assert_eq!(result.confidence_level(), ConfidenceLevel::Confident);
        assert_eq!(result.class_id(), 5);
        assert_eq!(result.ranked()[0], (CoverType::Aspen, 0.8));
    }

    #[test]
    fn level_boundaries() {
        assert_eq!(ConfidenceLevel::from_confidence(95.0), ConfidenceLevel::VeryConfident);
        assert_eq!(ConfidenceLevel::from_confidence(95.1), ConfidenceLevel::ExtremelyConfident);
        assert_eq!(ConfidenceLevel::from_confidence(50.0), ConfidenceLevel::VeryLow);
        assert_eq!(ConfidenceLevel::from_confidence(50.5), ConfidenceLevel::Low);
    }
}
