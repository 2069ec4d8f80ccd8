//! Typed errors surfaced before or between simulations.
use thiserror::Error;

use crate::roster::{PlayerId, TeamId};
use crate::schedule::ScheduleValidation;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error(
        "unsupported league structure: {conferences} conferences x {divisions} divisions x {teams_per_division} teams"
    )]
    UnsupportedStructure {
        conferences: usize,
        divisions: usize,
        teams_per_division: usize,
    },
    #[error("league needs {expected} teams (got {actual})")]
    TeamCount { expected: usize, actual: usize },
    #[error("duplicate team id {0}")]
    DuplicateTeam(TeamId),
    #[error("division {conference}/{division} has {actual} teams (expected {expected})")]
    DivisionSize {
        conference: String,
        division: String,
        expected: usize,
        actual: usize,
    },
    #[error("bye window {start}..={end} does not fit inside {weeks} weeks")]
    ByeWindow { start: u8, end: u8, weeks: u8 },
    #[error("{games} games per team cannot fit in {weeks} weeks with one bye")]
    GameCount { games: u8, weeks: u8 },
    #[error("playoff field of {0} teams per conference is outside 2..=8")]
    PlayoffSize(u8),
    #[error("{field} must be between {min} and {max} seconds (got {value})")]
    PeriodLength {
        field: &'static str,
        min: u16,
        max: u16,
        value: u16,
    },
    #[error("{field} must be between {min:.3} and {max:.3} (got {value:.3})")]
    RangeViolation {
        field: &'static str,
        min: f64,
        max: f64,
        value: f64,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RosterError {
    #[error("player {player} equips unknown badge '{badge}'")]
    UnknownBadge { player: PlayerId, badge: String },
    #[error("player {player} has unknown trait '{trait_id}'")]
    UnknownTrait { player: PlayerId, trait_id: String },
    #[error("player {player} equips conflicting badges '{first}' and '{second}'")]
    BadgeConflict {
        player: PlayerId,
        first: String,
        second: String,
    },
    #[error("player {player} has conflicting traits '{first}' and '{second}'")]
    TraitConflict {
        player: PlayerId,
        first: String,
        second: String,
    },
    #[error("player {player} equips {count} badges but may hold {cap}")]
    TooManyBadges {
        player: PlayerId,
        count: usize,
        cap: usize,
    },
    #[error("player {player} equips badge '{badge}' twice")]
    DuplicateBadge { player: PlayerId, badge: String },
    #[error("team {team} has no player able to fill {position}")]
    MissingPosition { team: TeamId, position: &'static str },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SeasonError {
    #[error("season is complete; no games remain")]
    SeasonComplete,
    #[error("week {requested} cannot be simulated before week {current}")]
    WeekOutOfOrder { requested: u8, current: u8 },
    #[error("schedule failed validation with {} error(s)", .0.errors.len())]
    InvalidSchedule(ScheduleValidation),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Roster(#[from] RosterError),
    #[error("team {0} is not part of this league")]
    UnknownTeam(TeamId),
}
