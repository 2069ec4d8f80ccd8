//! Team units and the attribute formulas that aggregate players into them.
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::attributes::{Attribute, AttributeVector};
use crate::roster::Position;

/// On-field job a group of players is rated for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Unit {
    Passing,
    Rushing,
    Receiving,
    PassBlock,
    RunBlock,
    PassRush,
    RunDefense,
    Coverage,
    Kicking,
    Punting,
    BallSecurity,
}

impl Unit {
    pub const ALL: [Self; 11] = [
        Self::Passing,
        Self::Rushing,
        Self::Receiving,
        Self::PassBlock,
        Self::RunBlock,
        Self::PassRush,
        Self::RunDefense,
        Self::Coverage,
        Self::Kicking,
        Self::Punting,
        Self::BallSecurity,
    ];

    /// Attribute weights for the unit. Weights sum to 1.
    #[must_use]
    pub const fn formula(self) -> &'static [(Attribute, f32)] {
        match self {
            Self::Passing => &[
                (Attribute::ShortAccuracy, 0.30),
                (Attribute::DeepAccuracy, 0.20),
                (Attribute::ThrowPower, 0.15),
                (Attribute::Poise, 0.15),
                (Attribute::Awareness, 0.15),
                (Attribute::ThrowOnRun, 0.05),
            ],
            Self::Rushing => &[
                (Attribute::Speed, 0.20),
                (Attribute::Vision, 0.20),
                (Attribute::Elusiveness, 0.20),
                (Attribute::BreakTackle, 0.15),
                (Attribute::Acceleration, 0.15),
                (Attribute::Strength, 0.10),
            ],
            Self::Receiving => &[
                (Attribute::Catching, 0.35),
                (Attribute::RouteRunning, 0.30),
                (Attribute::Release, 0.15),
                (Attribute::Speed, 0.20),
            ],
            Self::PassBlock => &[
                (Attribute::PassBlock, 0.60),
                (Attribute::Strength, 0.20),
                (Attribute::Awareness, 0.20),
            ],
            Self::RunBlock => &[
                (Attribute::RunBlock, 0.60),
                (Attribute::Strength, 0.30),
                (Attribute::Awareness, 0.10),
            ],
            Self::PassRush => &[
                (Attribute::PassRush, 0.55),
                (Attribute::Speed, 0.20),
                (Attribute::Strength, 0.15),
                (Attribute::Acceleration, 0.10),
            ],
            Self::RunDefense => &[
                (Attribute::BlockShedding, 0.35),
                (Attribute::Tackling, 0.35),
                (Attribute::Strength, 0.15),
                (Attribute::PlayRecognition, 0.15),
            ],
            Self::Coverage => &[
                (Attribute::ManCoverage, 0.30),
                (Attribute::ZoneCoverage, 0.30),
                (Attribute::Speed, 0.20),
                (Attribute::PlayRecognition, 0.20),
            ],
            Self::Kicking => &[
                (Attribute::KickPower, 0.40),
                (Attribute::KickAccuracy, 0.60),
            ],
            Self::Punting => &[
                (Attribute::KickPower, 0.70),
                (Attribute::KickAccuracy, 0.30),
            ],
            Self::BallSecurity => &[
                (Attribute::Carrying, 0.70),
                (Attribute::Strength, 0.10),
                (Attribute::Awareness, 0.20),
            ],
        }
    }

    /// Depth-chart slots feeding the unit and their weights.
    #[must_use]
    pub const fn contributors(self) -> &'static [(Slot, f32)] {
        match self {
            Self::Passing => &[(Slot::Qb1, 1.0)],
            Self::Rushing => &[(Slot::Rb1, 0.7), (Slot::Rb2, 0.3)],
            Self::Receiving => &[
                (Slot::Wr1, 0.30),
                (Slot::Wr2, 0.25),
                (Slot::Wr3, 0.15),
                (Slot::Te1, 0.20),
                (Slot::Rb1, 0.10),
            ],
            Self::PassBlock | Self::RunBlock => &[
                (Slot::Lt, 0.22),
                (Slot::Rt, 0.18),
                (Slot::Lg, 0.18),
                (Slot::Rg, 0.18),
                (Slot::C, 0.18),
                (Slot::Te1, 0.06),
            ],
            Self::PassRush => &[
                (Slot::De1, 0.30),
                (Slot::De2, 0.25),
                (Slot::Dt1, 0.15),
                (Slot::Dt2, 0.15),
                (Slot::Lb1, 0.15),
            ],
            Self::RunDefense => &[
                (Slot::Dt1, 0.20),
                (Slot::Dt2, 0.15),
                (Slot::De1, 0.12),
                (Slot::De2, 0.12),
                (Slot::Lb1, 0.16),
                (Slot::Lb2, 0.13),
                (Slot::Lb3, 0.12),
            ],
            Self::Coverage => &[
                (Slot::Cb1, 0.24),
                (Slot::Cb2, 0.20),
                (Slot::Cb3, 0.12),
                (Slot::S1, 0.18),
                (Slot::S2, 0.16),
                (Slot::Lb1, 0.10),
            ],
            Self::Kicking => &[(Slot::K, 1.0)],
            Self::Punting => &[(Slot::P, 1.0)],
            Self::BallSecurity => &[(Slot::Rb1, 0.5), (Slot::Qb1, 0.3), (Slot::Wr1, 0.2)],
        }
    }

    /// Score a single attribute vector against the unit formula.
    #[must_use]
    pub fn score(self, attrs: &AttributeVector) -> f32 {
        self.formula()
            .iter()
            .map(|(attr, weight)| attrs.get(*attr) * weight)
            .sum()
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

/// Starting depth-chart slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Slot {
    Qb1,
    Rb1,
    Rb2,
    Wr1,
    Wr2,
    Wr3,
    Te1,
    Lt,
    Lg,
    C,
    Rg,
    Rt,
    De1,
    De2,
    Dt1,
    Dt2,
    Lb1,
    Lb2,
    Lb3,
    Cb1,
    Cb2,
    Cb3,
    S1,
    S2,
    K,
    P,
}

impl Slot {
    pub const ALL: [Self; 26] = [
        Self::Qb1,
        Self::Rb1,
        Self::Rb2,
        Self::Wr1,
        Self::Wr2,
        Self::Wr3,
        Self::Te1,
        Self::Lt,
        Self::Lg,
        Self::C,
        Self::Rg,
        Self::Rt,
        Self::De1,
        Self::De2,
        Self::Dt1,
        Self::Dt2,
        Self::Lb1,
        Self::Lb2,
        Self::Lb3,
        Self::Cb1,
        Self::Cb2,
        Self::Cb3,
        Self::S1,
        Self::S2,
        Self::K,
        Self::P,
    ];

    /// Acceptable positions for the slot, most preferred first.
    #[must_use]
    pub const fn eligible(self) -> &'static [Position] {
        match self {
            Self::Qb1 => &[Position::QB],
            Self::Rb1 | Self::Rb2 => &[Position::RB, Position::WR],
            Self::Wr1 | Self::Wr2 | Self::Wr3 => &[Position::WR, Position::TE, Position::RB],
            Self::Te1 => &[Position::TE, Position::WR],
            Self::Lt | Self::Rt => &[Position::OT, Position::OG, Position::C],
            Self::Lg | Self::Rg => &[Position::OG, Position::OT, Position::C],
            Self::C => &[Position::C, Position::OG, Position::OT],
            Self::De1 | Self::De2 => &[Position::DE, Position::DT, Position::LB],
            Self::Dt1 | Self::Dt2 => &[Position::DT, Position::DE],
            Self::Lb1 | Self::Lb2 | Self::Lb3 => &[Position::LB, Position::S, Position::DE],
            Self::Cb1 | Self::Cb2 | Self::Cb3 => &[Position::CB, Position::S],
            Self::S1 | Self::S2 => &[Position::S, Position::CB],
            Self::K => &[Position::K, Position::P],
            Self::P => &[Position::P, Position::K],
        }
    }
}

/// Aggregated unit ratings for one team at one moment of a game.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct UnitRatings([f32; 11]);

impl UnitRatings {
    #[must_use]
    pub const fn get(&self, unit: Unit) -> f32 {
        self.0[unit as usize]
    }

    pub const fn set(&mut self, unit: Unit, value: f32) {
        self.0[unit as usize] = value;
    }

    pub fn add(&mut self, unit: Unit, delta: f32) {
        let slot = &mut self.0[unit as usize];
        *slot = (*slot + delta).clamp(0.0, 120.0);
    }

    pub fn scale(&mut self, unit: Unit, factor: f32) {
        let slot = &mut self.0[unit as usize];
        *slot = (*slot * factor).clamp(0.0, 120.0);
    }

    pub fn add_all(&mut self, delta: f32) {
        for unit in Unit::ALL {
            self.add(unit, delta);
        }
    }

    /// Weighted team overall from unit ratings.
    #[must_use]
    pub fn overall(&self) -> f32 {
        let offense = self.get(Unit::Passing).mul_add(
            0.35,
            self.get(Unit::Rushing).mul_add(
                0.15,
                self.get(Unit::Receiving).mul_add(
                    0.2,
                    (self.get(Unit::PassBlock) + self.get(Unit::RunBlock)) * 0.15,
                ),
            ),
        );
        let defense = self.get(Unit::PassRush).mul_add(
            0.35,
            self.get(Unit::RunDefense)
                .mul_add(0.3, self.get(Unit::Coverage) * 0.35),
        );
        let special = (self.get(Unit::Kicking) + self.get(Unit::Punting)) / 2.0;
        offense.mul_add(0.45, defense.mul_add(0.45, special * 0.1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::Ratings;

    #[test]
    fn formulas_are_normalized() {
        for unit in Unit::ALL {
            let total: f32 = unit.formula().iter().map(|(_, w)| w).sum();
            assert!((total - 1.0).abs() < 1e-4, "{unit} formula sums to {total}");
            let slots: f32 = unit.contributors().iter().map(|(_, w)| w).sum();
            assert!((slots - 1.0).abs() < 1e-4, "{unit} contributors sum to {slots}");
        }
    }

    #[test]
    fn uniform_ratings_score_uniformly() {
        let attrs = Ratings::uniform(70).to_dense();
        for unit in Unit::ALL {
            assert!((unit.score(&attrs) - 70.0).abs() < 1e-3);
        }
    }

    #[test]
    fn overall_of_uniform_units_matches_rating() {
        let mut ratings = UnitRatings::default();
        for unit in Unit::ALL {
            ratings.set(unit, 80.0);
        }
        assert!((ratings.overall() - 80.0).abs() < 1e-3);
    }
}
