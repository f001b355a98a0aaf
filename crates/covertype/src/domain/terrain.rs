#![forbid(unsafe_code)]

use crate::error::EncodingError;
use serde::{Deserialize, Serialize};
use serde_with::{DisplayFromStr, serde_as};
use std::fmt;
use std::str::FromStr;

/// One of the four wilderness areas, numbered 1 through 4.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WildernessArea(u8);

/// One of the forty soil types, numbered 1 through 40.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SoilType(u8);

impl WildernessArea {
    pub const COUNT: u8 = 4;

    pub fn new(number: u32) -> Result<Self, EncodingError> {
        if (1..=u32::from(Self::COUNT)).contains(&number) {
            Ok(Self(number as u8))
        } else {
            Err(EncodingError::WildernessOutOfRange(number))
        }
    }

    /// The one-based category number.
    pub fn number(self) -> u8 {
        self.0
    }

    /// Zero-based position inside the one-hot block.
    pub fn offset(self) -> usize {
        usize::from(self.0) - 1
    }

    pub fn all() -> impl Iterator<Item = Self> {
        (1..=Self::COUNT).map(Self)
    }
}

impl SoilType {
    pub const COUNT: u8 = 40;

    pub fn new(number: u32) -> Result<Self, EncodingError> {
        if (1..=u32::from(Self::COUNT)).contains(&number) {
            Ok(Self(number as u8))
        } else {
            Err(EncodingError::SoilOutOfRange(number))
        }
    }

    /// The one-based category number.
    pub fn number(self) -> u8 {
        self.0
    }

    /// Zero-based position inside the one-hot block.
    pub fn offset(self) -> usize {
        usize::from(self.0) - 1
    }

    pub fn all() -> impl Iterator<Item = Self> {
        (1..=Self::COUNT).map(Self)
    }
}

impl Default for WildernessArea {
    fn default() -> Self {
        Self(1)
    }
}

impl Default for SoilType {
    fn default() -> Self {
        Self(1)
    }
}

/// Extract the first run of ASCII digits in a label such as
/// `Wilderness_Area3` or `Soil_Type17`.
fn label_number(label: &str) -> Option<u32> {
    let start = label.find(|c: char| c.is_ascii_digit())?;
    let digits = &label[start..];
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    // Saturate so absurdly long digit runs still report as out of range.
    Some(digits[..end].parse::<u32>().unwrap_or(u32::MAX))
}

impl FromStr for WildernessArea {
    type Err = EncodingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let number =
            label_number(s).ok_or_else(|| EncodingError::UnrecognizedWilderness(s.to_owned()))?;
        Self::new(number)
    }
}

impl FromStr for SoilType {
    type Err = EncodingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let number = label_number(s).ok_or_else(|| EncodingError::UnrecognizedSoil(s.to_owned()))?;
        Self::new(number)
    }
}

impl fmt::Display for WildernessArea {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Wilderness_Area{}", self.0)
    }
}

impl fmt::Display for SoilType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Soil_Type{}", self.0)
    }
}

impl fmt::Debug for WildernessArea {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Debug for SoilType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

/// Raw attributes of one terrain patch, as entered on the single-patch form.
///
/// Distances are in meters, angles in degrees and hillshade values on the
/// 0..=255 index scale. The vertical distance to hydrology is negative when
/// the patch sits below the nearest water.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerrainSample {
    pub elevation: i32,
    pub aspect: i32,
    pub slope: i32,
    pub horz_dist_hydro: i32,
    pub vert_dist_hydro: i32,
    pub horz_dist_road: i32,
    pub horz_dist_fire: i32,
    pub hillshade_9am: i32,
    pub hillshade_noon: i32,
    pub hillshade_3pm: i32,
    #[serde_as(as = "DisplayFromStr")]
    pub wilderness_area: WildernessArea,
    #[serde_as(as = "DisplayFromStr")]
    pub soil_type: SoilType,
}

impl Default for TerrainSample {
    /// The values the single-patch form starts with.
    fn default() -> Self {
        Self {
            elevation: 2500,
            aspect: 180,
            slope: 30,
            horz_dist_hydro: 250,
            vert_dist_hydro: 100,
            horz_dist_road: 600,
            horz_dist_fire: 800,
            hillshade_9am: 124,
            hillshade_noon: 124,
            hillshade_3pm: 124,
            wilderness_area: WildernessArea::default(),
            soil_type: SoilType::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn labels_resolve_to_numbers() {
        let area: WildernessArea = "Wilderness_Area3".parse().unwrap();
        assert_eq!(area.number(), 3);
        assert_eq!(area.offset(), 2);

        let soil: SoilType = "Soil_Type40".parse().unwrap();
        assert_eq!(soil.number(), 40);
        assert_eq!(soil.to_string(), "Soil_Type40");
    }

    #[test]
    fn bare_numbers_are_accepted() {
        assert_eq!("2".parse::<WildernessArea>().unwrap().number(), 2);
        assert_eq!("17".parse::<SoilType>().unwrap().number(), 17);
    }

    #[test]
    fn out_of_range_labels_fail() {
        assert!(matches!(
            "Wilderness_Area5".parse::<WildernessArea>(),
            Err(EncodingError::WildernessOutOfRange(5))
        ));
        assert!(matches!(
            "Soil_Type0".parse::<SoilType>(),
            Err(EncodingError::SoilOutOfRange(0))
        ));
        assert!(matches!(
            "Soil_Type99999999999".parse::<SoilType>(),
            Err(EncodingError::SoilOutOfRange(u32::MAX))
        ));
    }

    #[test]
    fn labels_without_digits_fail() {
        assert!(matches!(
            "Rawah".parse::<WildernessArea>(),
            Err(EncodingError::UnrecognizedWilderness(_))
        ));
        assert!(matches!(
            "".parse::<SoilType>(),
            Err(EncodingError::UnrecognizedSoil(_))
        ));
    }

    #[test]
    fn sample_serializes_labels_as_strings() {
        let sample = TerrainSample::default();
        let value = serde_json::to_value(&sample).unwrap();
        assert_eq!(value["wilderness_area"], "Wilderness_Area1");
        assert_eq!(value["soil_type"], "Soil_Type1");

        let back: TerrainSample = serde_json::from_value(value).unwrap();
        assert_eq!(back, sample);
    }

    proptest! {
        #[test]
        fn display_parse_roundtrip(n in 1u32..=40) {
            let soil = SoilType::new(n).unwrap();
            prop_assert_eq!(soil.to_string().parse::<SoilType>().unwrap(), soil);
        }
    }
}
