#![forbid(unsafe_code)]

use crate::domain::{FeatureVector, SOIL_RANGE, TerrainSample, WILDERNESS_RANGE};

/// Turn one terrain sample into the classifier's feature vector.
///
/// The ten numeric attributes are copied to positions 0..10 in column
/// order; the wilderness and soil selections each set a single position in
/// their one-hot block. Everything else stays zero.
pub fn encode(sample: &TerrainSample) -> FeatureVector {
    let mut vector = FeatureVector::zeros();

    let numeric = [
        sample.elevation,
        sample.aspect,
        sample.slope,
        sample.horz_dist_hydro,
        sample.vert_dist_hydro,
        sample.horz_dist_road,
        sample.hillshade_9am,
        sample.hillshade_noon,
        sample.hillshade_3pm,
        sample.horz_dist_fire,
    ];
    for (ix, value) in numeric.into_iter().enumerate() {
        vector.set(ix, f64::from(value));
    }

    vector.set(WILDERNESS_RANGE.start + sample.wilderness_area.offset(), 1.0);
    vector.set(SOIL_RANGE.start + sample.soil_type.offset(), 1.0);

    vector
}
