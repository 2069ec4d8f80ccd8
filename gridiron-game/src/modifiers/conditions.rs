//! Machine-evaluable activation predicates for badges and traits.
use serde::{Deserialize, Serialize};

use crate::game::GameType;
use crate::weather::Weather;

/// Ball position at or beyond which the offense is in the red zone.
pub const RED_ZONE_START: u8 = 80;
/// Seconds left in a half that count as crunch time.
pub const CLUTCH_WINDOW_SECS: u16 = 120;

/// Snapshot of the game from one team's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Situation {
    pub quarter: u8,
    pub clock: u16,
    pub down: u8,
    pub distance: u8,
    /// Offense's ball position, 0 = own goal line, 100 = opponent goal line.
    pub ball_on: u8,
    /// Evaluating team's score minus the opponent's.
    pub score_diff: i16,
    pub on_offense: bool,
    pub is_home: bool,
    pub weather: Weather,
    pub game_type: GameType,
}

impl Situation {
    /// Neutral first-and-ten at midfield in the first quarter.
    #[must_use]
    pub const fn neutral() -> Self {
        Self {
            quarter: 1,
            clock: 900,
            down: 1,
            distance: 10,
            ball_on: 50,
            score_diff: 0,
            on_offense: true,
            is_home: true,
            weather: Weather::Clear,
            game_type: GameType::Regular,
        }
    }

    #[must_use]
    pub const fn is_overtime(&self) -> bool {
        self.quarter > 4
    }

    /// Final two minutes of either half, or any overtime.
    #[must_use]
    pub const fn is_clutch(&self) -> bool {
        self.is_overtime()
            || ((self.quarter == 2 || self.quarter == 4) && self.clock <= CLUTCH_WINDOW_SECS)
    }

    #[must_use]
    pub const fn in_red_zone(&self) -> bool {
        self.ball_on >= RED_ZONE_START
    }
}

/// When a modifier applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    #[default]
    Always,
    /// Offense inside the opponent's 20.
    RedZone,
    /// Final 2 minutes of a half or game, or overtime.
    Clutch,
    /// Clutch window while on offense.
    TwoMinuteDrill,
    ThirdDown,
    FourthDown,
    /// Two yards or fewer to go.
    ShortYardage,
    /// Seven yards or more to go.
    LongYardage,
    Trailing,
    Leading,
    /// Offense on its own side of midfield.
    OwnTerritory,
    Overtime,
    PrimeTime,
    Playoffs,
    BadWeather,
    Home,
    Away,
}

impl Condition {
    #[must_use]
    pub const fn holds(self, s: &Situation) -> bool {
        match self {
            Self::Always => true,
            Self::RedZone => s.in_red_zone(),
            Self::Clutch => s.is_clutch(),
            Self::TwoMinuteDrill => s.on_offense && s.is_clutch(),
            Self::ThirdDown => s.down == 3,
            Self::FourthDown => s.down == 4,
            Self::ShortYardage => s.distance <= 2,
            Self::LongYardage => s.distance >= 7,
            Self::Trailing => s.score_diff < 0,
            Self::Leading => s.score_diff > 0,
            Self::OwnTerritory => s.ball_on < 50,
            Self::Overtime => s.is_overtime(),
            Self::PrimeTime => matches!(s.game_type, GameType::Primetime),
            Self::Playoffs => matches!(s.game_type, GameType::Playoff | GameType::Championship),
            Self::BadWeather => s.weather.is_adverse(),
            Self::Home => s.is_home,
            Self::Away => !s.is_home,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn red_zone_boundary_is_the_twenty() {
        let mut s = Situation::neutral();
        s.ball_on = 79;
        assert!(!Condition::RedZone.holds(&s));
        s.ball_on = 80;
        assert!(Condition::RedZone.holds(&s));
    }

    #[test]
    fn clutch_covers_both_halves_and_overtime() {
        let mut s = Situation::neutral();
        s.quarter = 2;
        s.clock = 119;
        assert!(Condition::Clutch.holds(&s));
        s.quarter = 3;
        assert!(!Condition::Clutch.holds(&s));
        s.quarter = 4;
        s.clock = 121;
        assert!(!Condition::Clutch.holds(&s));
        s.quarter = 5;
        s.clock = 600;
        assert!(Condition::Clutch.holds(&s));
        assert!(Condition::Overtime.holds(&s));
    }

    #[test]
    fn two_minute_drill_needs_the_ball() {
        let mut s = Situation::neutral();
        s.quarter = 4;
        s.clock = 90;
        assert!(Condition::TwoMinuteDrill.holds(&s));
        s.on_offense = false;
        assert!(!Condition::TwoMinuteDrill.holds(&s));
    }

    #[test]
    fn score_conditions_follow_perspective() {
        let mut s = Situation::neutral();
        s.score_diff = -3;
        assert!(Condition::Trailing.holds(&s));
        assert!(!Condition::Leading.holds(&s));
        s.score_diff = 0;
        assert!(!Condition::Trailing.holds(&s) && !Condition::Leading.holds(&s));
    }

    #[test]
    fn condition_names_deserialize() {
        let cond: Condition = serde_json::from_str("\"red_zone\"").unwrap();
        assert_eq!(cond, Condition::RedZone);
        let cond: Condition = serde_json::from_str("\"bad_weather\"").unwrap();
        assert_eq!(cond, Condition::BadWeather);
    }
}
