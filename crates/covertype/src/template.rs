#![forbid(unsafe_code)]

//! Sample generation for the single-prediction form and the batch upload
//! template.

use crate::domain::{FEATURE_NAMES, SoilType, TerrainSample, WildernessArea};
use crate::encoding::encode;
use crate::tabular;
use rand::Rng;

/// Leading serial-number column of the batch template. Ignored on upload.
pub const SERIAL_COLUMN: &str = "S_No";

/// Draw a sample uniformly from plausible ranges for each attribute.
pub fn random_sample<R: Rng + ?Sized>(rng: &mut R) -> TerrainSample {
    TerrainSample {
        elevation: rng.gen_range(1500..=4500),
        aspect: rng.gen_range(0..=360),
        slope: rng.gen_range(0..=75),
        horz_dist_hydro: rng.gen_range(0..=2000),
        vert_dist_hydro: rng.gen_range(-200..=800),
        horz_dist_road: rng.gen_range(0..=8000),
        horz_dist_fire: rng.gen_range(0..=8000),
        hillshade_9am: rng.gen_range(0..=255),
        hillshade_noon: rng.gen_range(0..=255),
        hillshade_3pm: rng.gen_range(0..=255),
        wilderness_area: pick(rng, WildernessArea::all()),
        soil_type: pick(rng, SoilType::all()),
    }
}

fn pick<R, T, I>(rng: &mut R, all: I) -> T
where
    R: Rng + ?Sized,
    I: Iterator<Item = T>,
    T: Default,
{
    let choices: Vec<T> = all.collect();
    let ix = rng.gen_range(0..choices.len());
    choices.into_iter().nth(ix).unwrap_or_default()
}

/// Three measured patches used when a fixed template is requested.
pub fn example_samples() -> [TerrainSample; 3] {
    let sample = |values: [i32; 10], wilderness: u8, soil: u8| TerrainSample {
        elevation: values[0],
        aspect: values[1],
        slope: values[2],
        horz_dist_hydro: values[3],
        vert_dist_hydro: values[4],
        horz_dist_road: values[5],
        hillshade_9am: values[6],
        hillshade_noon: values[7],
        hillshade_3pm: values[8],
        horz_dist_fire: values[9],
        wilderness_area: WildernessArea::new(wilderness.into()).unwrap_or_default(),
        soil_type: SoilType::new(soil.into()).unwrap_or_default(),
    };
    [
        sample([2596, 51, 3, 258, 0, 510, 221, 232, 148, 6279], 1, 40),
        sample([2804, 139, 9, 268, 65, 3180, 234, 238, 135, 6121], 2, 11),
        sample([2590, 56, 2, 212, -6, 390, 220, 235, 151, 6225], 3, 21),
    ]
}

/// Batch upload template: `S_No` followed by the 54 feature columns.
///
/// With `random` every row is drawn from [`random_sample`]; otherwise the
/// rows cycle through [`example_samples`].
pub fn template_csv<R: Rng + ?Sized>(rows: usize, random: bool, rng: &mut R) -> String {
    let mut out = String::new();
    tabular::write_record(&mut out, std::iter::once(SERIAL_COLUMN).chain(FEATURE_NAMES));

    let examples = example_samples();
    for i in 0..rows {
        let sample = if random {
            random_sample(rng)
        } else {
            examples[i % examples.len()].clone()
        };
        let values = encode(&sample)
            .into_inner()
            .into_iter()
            .map(|v| (v as i64).to_string());
        tabular::write_record(&mut out, std::iter::once((i + 1).to_string()).chain(values));
    }
    out
}
