#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};
use std::fmt;

/// Forest cover type predicted for a patch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CoverType {
    SpruceFir,
    LodgepolePine,
    PonderosaPine,
    CottonwoodWillow,
    Aspen,
    DouglasFir,
    Krummholz,
}

impl CoverType {
    pub const COUNT: usize = 7;

    /// Ordered by class id.
    pub const ALL: [CoverType; Self::COUNT] = [
        CoverType::SpruceFir,
        CoverType::LodgepolePine,
        CoverType::PonderosaPine,
        CoverType::CottonwoodWillow,
        CoverType::Aspen,
        CoverType::DouglasFir,
        CoverType::Krummholz,
    ];

    /// Class id in `1..=7`.
    pub fn id(self) -> u8 {
        self as u8 + 1
    }

    pub fn from_id(id: u8) -> Option<Self> {
        usize::from(id).checked_sub(1).and_then(Self::from_index)
    }

    /// Map a zero-based classifier output to a cover type.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn name(self) -> &'static str {
        match self {
            CoverType::SpruceFir => "Spruce/Fir",
            CoverType::LodgepolePine => "Lodgepole Pine",
            CoverType::PonderosaPine => "Ponderosa Pine",
            CoverType::CottonwoodWillow => "Cottonwood/Willow",
            CoverType::Aspen => "Aspen",
            CoverType::DouglasFir => "Douglas-fir",
            CoverType::Krummholz => "Krummholz",
        }
    }
}

impl fmt::Display for CoverType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
