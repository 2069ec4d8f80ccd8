//! League, game, and playoff configuration.
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

use crate::error::ConfigError;
use crate::roster::{Conference, Division, TeamRecord};

/// Bye weeks are spread over four window weeks plus one catch-up week.
pub const MIN_BYE_WINDOW: u8 = 5;

/// League layout and calendar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeagueConfig {
    #[serde(default = "LeagueConfig::default_conferences")]
    pub conferences: u8,
    #[serde(default = "LeagueConfig::default_divisions")]
    pub divisions_per_conference: u8,
    #[serde(default = "LeagueConfig::default_teams_per_division")]
    pub teams_per_division: u8,
    #[serde(default = "LeagueConfig::default_games_per_team")]
    pub games_per_team: u8,
    #[serde(default = "LeagueConfig::default_weeks")]
    pub regular_season_weeks: u8,
    #[serde(default = "LeagueConfig::default_bye_start")]
    pub bye_window_start: u8,
    #[serde(default = "LeagueConfig::default_bye_end")]
    pub bye_window_end: u8,
    /// Most prime-time appearances any team should get.
    #[serde(default = "LeagueConfig::default_prime_time_cap")]
    pub prime_time_cap: u8,
}

impl LeagueConfig {
    #[must_use]
    pub const fn default_conferences() -> u8 {
        2
    }

    #[must_use]
    pub const fn default_divisions() -> u8 {
        4
    }

    #[must_use]
    pub const fn default_teams_per_division() -> u8 {
        4
    }

    #[must_use]
    pub const fn default_games_per_team() -> u8 {
        17
    }

    #[must_use]
    pub const fn default_weeks() -> u8 {
        18
    }

    #[must_use]
    pub const fn default_bye_start() -> u8 {
        5
    }

    #[must_use]
    pub const fn default_bye_end() -> u8 {
        14
    }

    #[must_use]
    pub const fn default_prime_time_cap() -> u8 {
        5
    }

    #[must_use]
    pub const fn team_count(&self) -> usize {
        self.conferences as usize * self.divisions_per_conference as usize
            * self.teams_per_division as usize
    }

    /// Total games in the regular season.
    #[must_use]
    pub const fn total_games(&self) -> usize {
        self.team_count() * self.games_per_team as usize / 2
    }

    #[must_use]
    pub const fn bye_window_len(&self) -> u8 {
        self.bye_window_end.saturating_sub(self.bye_window_start) + 1
    }

    #[must_use]
    pub const fn in_bye_window(&self, week: u8) -> bool {
        week >= self.bye_window_start && week <= self.bye_window_end
    }

    /// Validate the layout and calendar.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when the structure is not the supported 2x4x4 layout or the
    /// calendar cannot hold the games plus one bye per team.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if (self.conferences, self.divisions_per_conference, self.teams_per_division) != (2, 4, 4) {
            return Err(ConfigError::UnsupportedStructure {
                conferences: usize::from(self.conferences),
                divisions: usize::from(self.divisions_per_conference),
                teams_per_division: usize::from(self.teams_per_division),
            });
        }
        if self.games_per_team != Self::default_games_per_team()
            || self.regular_season_weeks != self.games_per_team + 1
        {
            return Err(ConfigError::GameCount {
                games: self.games_per_team,
                weeks: self.regular_season_weeks,
            });
        }
        let window_ok = self.bye_window_start >= 1
            && self.bye_window_start < self.bye_window_end
            && self.bye_window_end <= self.regular_season_weeks
            && (MIN_BYE_WINDOW..=16).contains(&self.bye_window_len());
        if !window_ok {
            return Err(ConfigError::ByeWindow {
                start: self.bye_window_start,
                end: self.bye_window_end,
                weeks: self.regular_season_weeks,
            });
        }
        Ok(())
    }

    /// Validate that a set of team records fills the configured structure exactly.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` for wrong team counts, duplicate ids, or unbalanced divisions.
    pub fn validate_teams(&self, teams: &[TeamRecord]) -> Result<(), ConfigError> {
        self.validate()?;
        if teams.len() != self.team_count() {
            return Err(ConfigError::TeamCount {
                expected: self.team_count(),
                actual: teams.len(),
            });
        }
        let mut ids = HashSet::new();
        let mut divisions: BTreeMap<(Conference, Division), usize> = BTreeMap::new();
        for team in teams {
            if !ids.insert(team.id) {
                return Err(ConfigError::DuplicateTeam(team.id));
            }
            *divisions.entry((team.conference, team.division)).or_default() += 1;
        }
        let expected = usize::from(self.teams_per_division);
        for conference in Conference::ALL {
            for division in Division::ALL {
                let actual = divisions.get(&(conference, division)).copied().unwrap_or(0);
                if actual != expected {
                    return Err(ConfigError::DivisionSize {
                        conference: format!("{conference:?}"),
                        division: format!("{division:?}"),
                        expected,
                        actual,
                    });
                }
            }
        }
        Ok(())
    }
}

impl Default for LeagueConfig {
    fn default() -> Self {
        Self {
            conferences: Self::default_conferences(),
            divisions_per_conference: Self::default_divisions(),
            teams_per_division: Self::default_teams_per_division(),
            games_per_team: Self::default_games_per_team(),
            regular_season_weeks: Self::default_weeks(),
            bye_window_start: Self::default_bye_start(),
            bye_window_end: Self::default_bye_end(),
            prime_time_cap: Self::default_prime_time_cap(),
        }
    }
}

/// Game-level tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimConfig {
    #[serde(default = "SimConfig::default_quarter_seconds")]
    pub quarter_seconds: u16,
    #[serde(default = "SimConfig::default_overtime_seconds")]
    pub overtime_seconds: u16,
    /// Rating points added to every home unit at non-neutral sites.
    #[serde(default = "SimConfig::default_home_field_advantage")]
    pub home_field_advantage: f32,
    #[serde(default = "SimConfig::default_penalty_rate")]
    pub penalty_rate: f64,
    #[serde(default = "SimConfig::default_max_plays")]
    pub max_plays_per_game: u16,
}

impl SimConfig {
    #[must_use]
    pub const fn default_quarter_seconds() -> u16 {
        900
    }

    #[must_use]
    pub const fn default_overtime_seconds() -> u16 {
        600
    }

    #[must_use]
    pub const fn default_home_field_advantage() -> f32 {
        1.5
    }

    #[must_use]
    pub const fn default_penalty_rate() -> f64 {
        0.06
    }

    #[must_use]
    pub const fn default_max_plays() -> u16 {
        400
    }

    /// Validate game tuning.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when a period length or rate is out of range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(60..=1800).contains(&self.quarter_seconds) {
            return Err(ConfigError::PeriodLength {
                field: "quarter_seconds",
                min: 60,
                max: 1800,
                value: self.quarter_seconds,
            });
        }
        if !(60..=900).contains(&self.overtime_seconds) {
            return Err(ConfigError::PeriodLength {
                field: "overtime_seconds",
                min: 60,
                max: 900,
                value: self.overtime_seconds,
            });
        }
        if !(0.0..=0.25).contains(&self.penalty_rate) {
            return Err(ConfigError::RangeViolation {
                field: "penalty_rate",
                min: 0.0,
                max: 0.25,
                value: self.penalty_rate,
            });
        }
        if !(0.0..=10.0).contains(&self.home_field_advantage) {
            return Err(ConfigError::RangeViolation {
                field: "home_field_advantage",
                min: 0.0,
                max: 10.0,
                value: f64::from(self.home_field_advantage),
            });
        }
        if self.max_plays_per_game < 100 {
            return Err(ConfigError::RangeViolation {
                field: "max_plays_per_game",
                min: 100.0,
                max: f64::from(u16::MAX),
                value: f64::from(self.max_plays_per_game),
            });
        }
        Ok(())
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            quarter_seconds: Self::default_quarter_seconds(),
            overtime_seconds: Self::default_overtime_seconds(),
            home_field_advantage: Self::default_home_field_advantage(),
            penalty_rate: Self::default_penalty_rate(),
            max_plays_per_game: Self::default_max_plays(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayoffConfig {
    #[serde(default = "PlayoffConfig::default_teams_per_conference")]
    pub teams_per_conference: u8,
}

impl PlayoffConfig {
    #[must_use]
    pub const fn default_teams_per_conference() -> u8 {
        7
    }

    /// Validate the playoff field size.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::PlayoffSize` outside `2..=8`.
    pub const fn validate(&self) -> Result<(), ConfigError> {
        if self.teams_per_conference < 2 || self.teams_per_conference > 8 {
            return Err(ConfigError::PlayoffSize(self.teams_per_conference));
        }
        Ok(())
    }
}

impl Default for PlayoffConfig {
    fn default() -> Self {
        Self {
            teams_per_conference: Self::default_teams_per_conference(),
        }
    }
}

/// Everything a season needs besides teams and modifier tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SeasonConfig {
    #[serde(default)]
    pub league: LeagueConfig,
    #[serde(default)]
    pub sim: SimConfig,
    #[serde(default)]
    pub playoffs: PlayoffConfig,
}

impl SeasonConfig {
    /// Load season configuration from JSON string
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON string cannot be parsed or if validation fails.
    pub fn from_json(json_str: &str) -> Result<Self, String> {
        let config: Self =
            serde_json::from_str(json_str).map_err(|e| format!("JSON parse error: {e}"))?;
        config.validate().map_err(|e| e.to_string())?;
        Ok(config)
    }

    /// Get embedded default configuration
    #[must_use]
    pub fn default_config() -> Self {
        Self::from_json(include_str!("../assets/data/season.json")).unwrap_or_else(|e| {
            log::error!("embedded season config failed to load: {e}");
            Self::default()
        })
    }

    /// Validate every section.
    ///
    /// # Errors
    ///
    /// Returns the first `ConfigError` found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.league.validate()?;
        self.sim.validate()?;
        self.playoffs.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = SeasonConfig::default_config();
        assert!(config.validate().is_ok());
        assert_eq!(config.league.team_count(), 32);
        assert_eq!(config.league.total_games(), 272);
        assert_eq!(config.league.bye_window_len(), 10);
    }

    #[test]
    fn embedded_config_parses_without_falling_back() {
        let parsed = SeasonConfig::from_json(include_str!("../assets/data/season.json"));
        assert_eq!(parsed, Ok(SeasonConfig::default_config()));
        let err = SeasonConfig::from_json("{ not json").unwrap_err();
        assert!(err.starts_with("JSON parse error"));
    }

    #[test]
    fn other_structures_fail_fast() {
        let league = LeagueConfig {
            divisions_per_conference: 3,
            ..LeagueConfig::default()
        };
        assert!(matches!(
            league.validate(),
            Err(ConfigError::UnsupportedStructure { divisions: 3, .. })
        ));
    }

    #[test]
    fn bye_window_must_fit_the_calendar() {
        let league = LeagueConfig {
            bye_window_start: 10,
            bye_window_end: 19,
            ..LeagueConfig::default()
        };
        assert!(matches!(league.validate(), Err(ConfigError::ByeWindow { .. })));
    }

    #[test]
    fn playoff_field_is_bounded() {
        assert!(PlayoffConfig { teams_per_conference: 1 }.validate().is_err());
        assert!(PlayoffConfig { teams_per_conference: 8 }.validate().is_ok());
        assert!(PlayoffConfig { teams_per_conference: 9 }.validate().is_err());
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config = SeasonConfig::from_json(r#"{"sim":{"quarter_seconds":600}}"#).unwrap();
        assert_eq!(config.sim.quarter_seconds, 600);
        assert_eq!(config.sim.overtime_seconds, 600);
        assert_eq!(config.playoffs.teams_per_conference, 7);
    }

    #[test]
    fn short_quarters_are_rejected() {
        let err = SeasonConfig::from_json(r#"{"sim":{"quarter_seconds":10}}"#).unwrap_err();
        assert!(err.contains("quarter_seconds"));
    }
}
