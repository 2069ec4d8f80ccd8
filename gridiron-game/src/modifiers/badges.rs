//! Badge definitions, tiers, and slot limits.
use serde::{Deserialize, Serialize};
use std::fmt;

use super::conditions::Condition;
use crate::attributes::{Attribute, AttributeGroup};

/// Hard ceiling on equipped badges regardless of overall or experience.
pub const MAX_BADGES: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BadgeTier {
    Bronze,
    Silver,
    Gold,
    HallOfFame,
}

impl BadgeTier {
    pub const ALL: [Self; 4] = [Self::Bronze, Self::Silver, Self::Gold, Self::HallOfFame];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Bronze => "Bronze",
            Self::Silver => "Silver",
            Self::Gold => "Gold",
            Self::HallOfFame => "Hall of Fame",
        }
    }
}

impl fmt::Display for BadgeTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// How a badge value is applied to the affected attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BadgeMode {
    /// Flat rating points.
    #[default]
    Additive,
    /// Percentage of the current rating.
    Percent,
}

/// Magnitude per tier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TierValues {
    pub bronze: f32,
    pub silver: f32,
    pub gold: f32,
    pub hall_of_fame: f32,
}

impl TierValues {
    #[must_use]
    pub const fn get(&self, tier: BadgeTier) -> f32 {
        match tier {
            BadgeTier::Bronze => self.bronze,
            BadgeTier::Silver => self.silver,
            BadgeTier::Gold => self.gold,
            BadgeTier::HallOfFame => self.hall_of_fame,
        }
    }

    /// Tiers must never get weaker as they climb.
    #[must_use]
    pub fn is_monotone(&self) -> bool {
        self.bronze <= self.silver && self.silver <= self.gold && self.gold <= self.hall_of_fame
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BadgeDef {
    pub id: String,
    pub name: String,
    pub group: AttributeGroup,
    /// Attributes the badge boosts; empty means every attribute.
    #[serde(default)]
    pub attributes: Vec<Attribute>,
    pub values: TierValues,
    #[serde(default)]
    pub mode: BadgeMode,
    #[serde(default)]
    pub condition: Condition,
}

impl BadgeDef {
    #[must_use]
    pub fn applies_to(&self, attr: Attribute) -> bool {
        self.attributes.is_empty() || self.attributes.contains(&attr)
    }

    /// Attributes touched by this badge, expanded when the list is empty.
    pub fn affected(&self) -> impl Iterator<Item = Attribute> + '_ {
        Attribute::ALL
            .into_iter()
            .filter(move |attr| self.applies_to(*attr))
    }
}

/// Badge slots earned by overall rating.
#[must_use]
pub const fn overall_slots(overall: u8) -> usize {
    match overall {
        0..=69 => 1,
        70..=79 => 2,
        80..=89 => 3,
        _ => 4,
    }
}

/// Extra slots earned by years in the league.
#[must_use]
pub const fn experience_slots(experience: u8) -> usize {
    match experience {
        0..=1 => 0,
        2..=5 => 1,
        _ => 2,
    }
}

/// Maximum badges a player may equip.
#[must_use]
pub const fn badge_slot_cap(overall: u8, experience: u8) -> usize {
    let slots = overall_slots(overall) + experience_slots(experience);
    if slots > MAX_BADGES { MAX_BADGES } else { slots }
}
