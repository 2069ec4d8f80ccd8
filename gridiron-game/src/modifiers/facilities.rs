//! Team facilities and their per-level bonuses.
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::units::Unit;

pub const MIN_FACILITY_LEVEL: u8 = 1;
pub const MAX_FACILITY_LEVEL: u8 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FacilityKind {
    Training,
    FilmRoom,
    Stadium,
    Medical,
}

impl FacilityKind {
    pub const ALL: [Self; 4] = [Self::Training, Self::FilmRoom, Self::Stadium, Self::Medical];
}

/// Facility levels for one franchise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Facilities {
    #[serde(default = "Facilities::base_level")]
    pub training: u8,
    #[serde(default = "Facilities::base_level")]
    pub film_room: u8,
    #[serde(default = "Facilities::base_level")]
    pub stadium: u8,
    #[serde(default = "Facilities::base_level")]
    pub medical: u8,
}

impl Facilities {
    const fn base_level() -> u8 {
        MIN_FACILITY_LEVEL
    }

    #[must_use]
    pub const fn uniform(level: u8) -> Self {
        Self {
            training: level,
            film_room: level,
            stadium: level,
            medical: level,
        }
    }

    /// Level clamped into the supported range.
    #[must_use]
    pub fn level(&self, kind: FacilityKind) -> u8 {
        let raw = match kind {
            FacilityKind::Training => self.training,
            FacilityKind::FilmRoom => self.film_room,
            FacilityKind::Stadium => self.stadium,
            FacilityKind::Medical => self.medical,
        };
        raw.clamp(MIN_FACILITY_LEVEL, MAX_FACILITY_LEVEL)
    }

    /// Upgrades above the base level.
    #[must_use]
    pub fn upgrades(&self, kind: FacilityKind) -> f32 {
        f32::from(self.level(kind) - MIN_FACILITY_LEVEL)
    }
}

impl Default for Facilities {
    fn default() -> Self {
        Self::uniform(MIN_FACILITY_LEVEL)
    }
}

/// Bonuses earned per level above 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct FacilityDef {
    #[serde(default)]
    pub units: BTreeMap<Unit, f32>,
    #[serde(default)]
    pub home_field: f32,
    /// Fraction of late-game fatigue removed.
    #[serde(default)]
    pub fatigue_relief: f32,
}
