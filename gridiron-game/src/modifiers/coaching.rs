//! Coaching staff, schemes, and perks.
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::units::Unit;

/// Largest per-unit swing the head coach's rating can produce.
const HEAD_COACH_MAX_BONUS: f32 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OffensiveScheme {
    WestCoast,
    AirRaid,
    PowerRun,
    Spread,
    #[default]
    Balanced,
}

impl OffensiveScheme {
    /// Share of neutral-situation snaps that are passes.
    #[must_use]
    pub const fn pass_ratio(self) -> f64 {
        match self {
            Self::WestCoast => 0.56,
            Self::AirRaid => 0.64,
            Self::PowerRun => 0.46,
            Self::Spread => 0.60,
            Self::Balanced => 0.55,
        }
    }

    /// Share of passes thrown deep.
    #[must_use]
    pub const fn deep_share(self) -> f64 {
        match self {
            Self::WestCoast => 0.15,
            Self::AirRaid => 0.28,
            Self::PowerRun => 0.22,
            Self::Spread | Self::Balanced => 0.20,
        }
    }

    #[must_use]
    pub const fn tilt(self) -> &'static [(Unit, f32)] {
        match self {
            Self::WestCoast => &[(Unit::Passing, 1.0)],
            Self::AirRaid => &[(Unit::Receiving, 1.5), (Unit::RunBlock, -1.0)],
            Self::PowerRun => &[(Unit::RunBlock, 1.5), (Unit::Rushing, 1.0)],
            Self::Spread => &[(Unit::Receiving, 1.0)],
            Self::Balanced => &[],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DefensiveScheme {
    #[default]
    FourThree,
    ThreeFour,
    Nickel,
    Cover2,
}

impl DefensiveScheme {
    #[must_use]
    pub const fn tilt(self) -> &'static [(Unit, f32)] {
        match self {
            Self::FourThree => &[(Unit::RunDefense, 1.5)],
            Self::ThreeFour => &[(Unit::PassRush, 1.5)],
            Self::Nickel => &[(Unit::Coverage, 1.5), (Unit::RunDefense, -1.0)],
            Self::Cover2 => &[(Unit::Coverage, 1.0)],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coach {
    pub name: String,
    /// 0-99 coaching rating.
    pub rating: u8,
    #[serde(default)]
    pub perks: Vec<String>,
}

impl Coach {
    #[must_use]
    pub fn new(name: &str, rating: u8) -> Self {
        Self {
            name: name.to_string(),
            rating: rating.min(99),
            perks: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_perk(mut self, perk: &str) -> Self {
        self.perks.push(perk.to_string());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoachingStaff {
    pub head_coach: Coach,
    pub offensive_coordinator: Coach,
    pub defensive_coordinator: Coach,
    #[serde(default)]
    pub offense: OffensiveScheme,
    #[serde(default)]
    pub defense: DefensiveScheme,
}

impl CoachingStaff {
    /// Every perk across the staff.
    pub fn perks(&self) -> impl Iterator<Item = &str> {
        [
            &self.head_coach,
            &self.offensive_coordinator,
            &self.defensive_coordinator,
        ]
        .into_iter()
        .flat_map(|coach| coach.perks.iter().map(String::as_str))
    }

    /// Flat bonus applied to every unit, centred on a 60-rated head coach.
    #[must_use]
    pub fn head_coach_bonus(&self) -> f32 {
        let delta = f32::from(self.head_coach.rating) - 60.0;
        (delta / 20.0).clamp(-HEAD_COACH_MAX_BONUS, HEAD_COACH_MAX_BONUS)
    }
}

impl Default for CoachingStaff {
    fn default() -> Self {
        Self {
            head_coach: Coach::new("Head Coach", 60),
            offensive_coordinator: Coach::new("Offensive Coordinator", 60),
            defensive_coordinator: Coach::new("Defensive Coordinator", 60),
            offense: OffensiveScheme::default(),
            defense: DefensiveScheme::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerkDef {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub units: BTreeMap<Unit, f32>,
    /// Added to the probability of going for it on fourth down.
    #[serde(default)]
    pub fourth_down_aggression: f64,
    /// Added to the scheme pass ratio.
    #[serde(default)]
    pub pass_bias: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn air_raid_throws_more_than_power_run() {
        assert!(OffensiveScheme::AirRaid.pass_ratio() > OffensiveScheme::PowerRun.pass_ratio());
        assert!(OffensiveScheme::AirRaid.deep_share() > OffensiveScheme::WestCoast.deep_share());
    }

    #[test]
    fn head_coach_bonus_is_bounded() {
        let mut staff = CoachingStaff::default();
        assert!(staff.head_coach_bonus().abs() < f32::EPSILON);
        staff.head_coach.rating = 99;
        assert!((staff.head_coach_bonus() - HEAD_COACH_MAX_BONUS).abs() < f32::EPSILON);
        staff.head_coach.rating = 0;
        assert!((staff.head_coach_bonus() + HEAD_COACH_MAX_BONUS).abs() < f32::EPSILON);
    }

    #[test]
    fn staff_perks_span_all_coaches() {
        let mut staff = CoachingStaff::default();
        staff.head_coach = staff.head_coach.with_perk("motivator");
        staff.defensive_coordinator = staff.defensive_coordinator.with_perk("blitz_happy");
        let perks: Vec<_> = staff.perks().collect();
        assert_eq!(perks, vec!["motivator", "blitz_happy"]);
    }
}
