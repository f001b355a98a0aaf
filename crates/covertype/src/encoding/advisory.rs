#![forbid(unsafe_code)]

use crate::domain::TerrainSample;
use std::fmt;

/// Plausibility warnings about form input. None of these block a prediction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputAdvisory {
    /// The patch is further above (or below) water than it is away from it.
    VerticalExceedsHorizontalHydrology,
}

impl fmt::Display for InputAdvisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputAdvisory::VerticalExceedsHorizontalHydrology => f.write_str(
                "Vertical Distance to Hydrology is unusually high compared to Horizontal Distance",
            ),
        }
    }
}

/// Collect advisories for a sample.
pub fn review(sample: &TerrainSample) -> Vec<InputAdvisory> {
    let mut advisories = Vec::new();
    if sample.vert_dist_hydro > sample.horz_dist_hydro {
        advisories.push(InputAdvisory::VerticalExceedsHorizontalHydrology);
    }
    advisories
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_vertical_over_horizontal() {
        let mut sample = TerrainSample::default();
        assert!(review(&sample).is_empty());

        sample.vert_dist_hydro = sample.horz_dist_hydro + 1;
        assert_eq!(
            review(&sample),
            vec![InputAdvisory::VerticalExceedsHorizontalHydrology]
        );
    }
}
