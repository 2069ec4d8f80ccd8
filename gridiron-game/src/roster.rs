//! Persisted team and player records as supplied by the roster provider.
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;
use std::str::FromStr;

use crate::attributes::Ratings;
use crate::modifiers::{BadgeTier, CoachingStaff, Facilities};
use crate::weather::Climate;

/// Maximum equipped badges stored inline without additional allocations.
pub type BadgeSet = SmallVec<[EquippedBadge; 6]>;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct TeamId(pub u16);

impl fmt::Display for TeamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{:02}", self.0)
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct PlayerId(pub u32);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Conference {
    East,
    West,
}

impl Conference {
    pub const ALL: [Self; 2] = [Self::East, Self::West];

    #[must_use]
    pub const fn other(self) -> Self {
        match self {
            Self::East => Self::West,
            Self::West => Self::East,
        }
    }

    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::East => 0,
            Self::West => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Division {
    North,
    South,
    East,
    West,
}

impl Division {
    pub const ALL: [Self; 4] = [Self::North, Self::South, Self::East, Self::West];

    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::North => 0,
            Self::South => 1,
            Self::East => 2,
            Self::West => 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[allow(clippy::upper_case_acronyms)]
pub enum Position {
    QB,
    RB,
    WR,
    TE,
    OT,
    OG,
    C,
    DE,
    DT,
    LB,
    CB,
    S,
    K,
    P,
}

impl Position {
    pub const ALL: [Self; 14] = [
        Self::QB,
        Self::RB,
        Self::WR,
        Self::TE,
        Self::OT,
        Self::OG,
        Self::C,
        Self::DE,
        Self::DT,
        Self::LB,
        Self::CB,
        Self::S,
        Self::K,
        Self::P,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::QB => "QB",
            Self::RB => "RB",
            Self::WR => "WR",
            Self::TE => "TE",
            Self::OT => "OT",
            Self::OG => "OG",
            Self::C => "C",
            Self::DE => "DE",
            Self::DT => "DT",
            Self::LB => "LB",
            Self::CB => "CB",
            Self::S => "S",
            Self::K => "K",
            Self::P => "P",
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Position {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|pos| pos.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or(())
    }
}

/// A badge a player has equipped at a given tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquippedBadge {
    pub id: String,
    pub tier: BadgeTier,
}

impl EquippedBadge {
    #[must_use]
    pub fn new(id: &str, tier: BadgeTier) -> Self {
        Self {
            id: id.to_string(),
            tier,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Contract {
    #[serde(default)]
    pub years: u8,
    /// Annual salary in thousands.
    #[serde(default)]
    pub salary: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub id: PlayerId,
    pub name: String,
    pub position: Position,
    #[serde(default)]
    pub age: u8,
    /// Years in the league.
    #[serde(default)]
    pub experience: u8,
    #[serde(default)]
    pub ratings: Ratings,
    #[serde(default)]
    pub badges: BadgeSet,
    #[serde(default)]
    pub traits: Vec<String>,
    #[serde(default)]
    pub contract: Contract,
    /// Explicit overall; computed from ratings when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overall: Option<u8>,
}

impl PlayerRecord {
    #[must_use]
    pub fn new(id: PlayerId, name: &str, position: Position, ratings: Ratings) -> Self {
        Self {
            id,
            name: name.to_string(),
            position,
            age: 25,
            experience: 3,
            ratings,
            badges: BadgeSet::new(),
            traits: Vec::new(),
            contract: Contract::default(),
            overall: None,
        }
    }

    #[must_use]
    pub fn with_badge(mut self, id: &str, tier: BadgeTier) -> Self {
        self.badges.push(EquippedBadge::new(id, tier));
        self
    }

    #[must_use]
    pub fn with_trait(mut self, id: &str) -> Self {
        self.traits.push(id.to_string());
        self
    }

    /// Short display name, e.g. "J. Carter".
    #[must_use]
    pub fn short_name(&self) -> String {
        let mut parts = self.name.split_whitespace();
        match (parts.next(), parts.last()) {
            (Some(first), Some(last)) => {
                let initial = first.chars().next().unwrap_or('?');
                format!("{initial}. {last}")
            }
            (Some(only), None) => only.to_string(),
            _ => self.id.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamRecord {
    pub id: TeamId,
    pub city: String,
    pub name: String,
    pub abbreviation: String,
    pub conference: Conference,
    pub division: Division,
    #[serde(default)]
    pub climate: Climate,
    #[serde(default)]
    pub roster: Vec<PlayerRecord>,
    #[serde(default)]
    pub coaching: Option<CoachingStaff>,
    #[serde(default)]
    pub facilities: Option<Facilities>,
}

impl TeamRecord {
    #[must_use]
    pub fn display_name(&self) -> String {
        format!("{} {}", self.city, self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::Attribute;

    #[test]
    fn short_name_uses_initial() {
        let player = PlayerRecord::new(PlayerId(7), "Jalen Carter", Position::QB, Ratings::default());
        assert_eq!(player.short_name(), "J. Carter");
        let mono = PlayerRecord::new(PlayerId(8), "Pele", Position::RB, Ratings::default());
        assert_eq!(mono.short_name(), "Pele");
    }

    #[test]
    fn position_parses_case_insensitively() {
        assert_eq!("qb".parse::<Position>(), Ok(Position::QB));
        assert_eq!(" Cb ".parse::<Position>(), Ok(Position::CB));
        assert!("XX".parse::<Position>().is_err());
    }

    #[test]
    fn player_record_round_trips_with_defaults() {
        let json = r#"{"id":3,"name":"Sam Reed","position":"WR","ratings":{"speed":92}}"#;
        let player: PlayerRecord = serde_json::from_str(json).unwrap();
        assert_eq!(player.ratings.get(Attribute::Speed), 92);
        assert!(player.badges.is_empty());
        assert_eq!(player.contract, Contract::default());
    }
}
