#![forbid(unsafe_code)]

//! Feature layout shared by the encoder, batch validation and the classifier.
//!
//! The order below is the column order the classifier was trained on:
//! ten numeric attributes, a four-wide wilderness one-hot block and a
//! forty-wide soil one-hot block.

use crate::error::EncodingError;
use std::ops::Range;

/// Total number of features in a vector.
pub const FEATURE_COUNT: usize = 54;

/// Number of directly copied numeric attributes.
pub const NUMERIC_COUNT: usize = 10;

/// Positions of the wilderness-area one-hot block.
pub const WILDERNESS_RANGE: Range<usize> = 10..14;

/// Positions of the soil-type one-hot block.
pub const SOIL_RANGE: Range<usize> = 14..54;

/// Column names in classifier order.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "Elevation",
    "Aspect",
    "Slope",
    "Horizontal_Distance_To_Hydrology",
    "Vertical_Distance_To_Hydrology",
    "Horizontal_Distance_To_Roadways",
    "Hillshade_9am",
    "Hillshade_Noon",
    "Hillshade_3pm",
    "Horizontal_Distance_To_Fire_Points",
    "Wilderness_Area1",
    "Wilderness_Area2",
    "Wilderness_Area3",
    "Wilderness_Area4",
    "Soil_Type1",
    "Soil_Type2",
    "Soil_Type3",
    "Soil_Type4",
    "Soil_Type5",
    "Soil_Type6",
    "Soil_Type7",
    "Soil_Type8",
    "Soil_Type9",
    "Soil_Type10",
    "Soil_Type11",
    "Soil_Type12",
    "Soil_Type13",
    "Soil_Type14",
    "Soil_Type15",
    "Soil_Type16",
    "Soil_Type17",
    "Soil_Type18",
    "Soil_Type19",
    "Soil_Type20",
    "Soil_Type21",
    "Soil_Type22",
    "Soil_Type23",
    "Soil_Type24",
    "Soil_Type25",
    "Soil_Type26",
    "Soil_Type27",
    "Soil_Type28",
    "Soil_Type29",
    "Soil_Type30",
    "Soil_Type31",
    "Soil_Type32",
    "Soil_Type33",
    "Soil_Type34",
    "Soil_Type35",
    "Soil_Type36",
    "Soil_Type37",
    "Soil_Type38",
    "Soil_Type39",
    "Soil_Type40",
];

/// A fixed-width, ordered feature vector.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector(Vec<f64>);

impl FeatureVector {
    /// All-zero vector.
    pub fn zeros() -> Self {
        Self(vec![0.0; FEATURE_COUNT])
    }

    /// Build a vector from raw values in classifier order.
    pub fn from_values(values: impl Into<Vec<f64>>) -> Result<Self, EncodingError> {
        let values = values.into();
        if values.len() != FEATURE_COUNT {
            return Err(EncodingError::WrongLength {
                expected: FEATURE_COUNT,
                actual: values.len(),
            });
        }
        Ok(Self(values))
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn get(&self, index: usize) -> Option<f64> {
        self.0.get(index).copied()
    }

    pub(crate) fn set(&mut self, index: usize, value: f64) {
        self.0[index] = value;
    }

    pub fn numeric(&self) -> &[f64] {
        &self.0[..NUMERIC_COUNT]
    }

    pub fn wilderness_block(&self) -> &[f64] {
        &self.0[WILDERNESS_RANGE]
    }

    pub fn soil_block(&self) -> &[f64] {
        &self.0[SOIL_RANGE]
    }

    /// Whether both one-hot blocks sum to exactly one.
    pub fn has_valid_one_hot(&self) -> bool {
        block_sum(self.wilderness_block()) == 1.0 && block_sum(self.soil_block()) == 1.0
    }

    pub fn into_inner(self) -> Vec<f64> {
        self.0
    }
}

pub(crate) fn block_sum(block: &[f64]) -> f64 {
    block.iter().sum()
}

/// Look up a feature's position by its column name.
pub fn feature_index(name: &str) -> Option<usize> {
    FEATURE_NAMES.iter().position(|n| *n == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_is_consistent() {
        assert_eq!(FEATURE_NAMES.len(), FEATURE_COUNT);
        assert_eq!(SOIL_RANGE.end, FEATURE_COUNT);
        assert_eq!(FEATURE_NAMES[WILDERNESS_RANGE.start], "Wilderness_Area1");
        assert_eq!(FEATURE_NAMES[SOIL_RANGE.start], "Soil_Type1");
        assert_eq!(FEATURE_NAMES[SOIL_RANGE.end - 1], "Soil_Type40");
        assert_eq!(feature_index("Horizontal_Distance_To_Fire_Points"), Some(9));
    }

    #[test]
    fn from_values_rejects_wrong_width() {
        let err = FeatureVector::from_values(vec![0.0; 53]).unwrap_err();
        assert!(matches!(
            err,
            EncodingError::WrongLength {
                expected: 54,
                actual: 53
            }
        ));
    }

    #[test]
    fn zero_vector_has_no_valid_one_hot() {
        assert!(!FeatureVector::zeros().has_valid_one_hot());
    }
}
