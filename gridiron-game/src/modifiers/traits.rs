//! Personality traits: rarity-scaled attribute deltas with optional conditions.
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::conditions::Condition;
use crate::attributes::Attribute;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraitRarity {
    Common,
    Uncommon,
    Rare,
    Legendary,
}

impl TraitRarity {
    #[must_use]
    pub const fn multiplier(self) -> f32 {
        match self {
            Self::Common => 1.0,
            Self::Uncommon => 1.25,
            Self::Rare => 1.5,
            Self::Legendary => 2.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraitDef {
    pub id: String,
    pub name: String,
    pub rarity: TraitRarity,
    /// Unscaled attribute deltas; negative values are penalties.
    #[serde(default)]
    pub deltas: BTreeMap<Attribute, f32>,
    #[serde(default)]
    pub condition: Condition,
    #[serde(default)]
    pub morale: i8,
}

impl TraitDef {
    /// Always-on traits get folded into base ratings once per game.
    #[must_use]
    pub fn is_always_on(&self) -> bool {
        self.condition == Condition::Always
    }

    /// Deltas after applying the rarity multiplier.
    pub fn scaled_deltas(&self) -> impl Iterator<Item = (Attribute, f32)> + '_ {
        let factor = self.rarity.multiplier();
        self.deltas
            .iter()
            .map(move |(attr, delta)| (*attr, delta * factor))
    }
}
