#![forbid(unsafe_code)]

mod cover;
mod feature;
mod terrain;

pub use cover::CoverType;
pub use feature::{
    FEATURE_COUNT, FEATURE_NAMES, FeatureVector, NUMERIC_COUNT, SOIL_RANGE, WILDERNESS_RANGE,
    feature_index,
};
pub use terrain::{SoilType, TerrainSample, WildernessArea};

pub(crate) use feature::block_sum;
