//! Gridiron Simulation Engine
//!
//! Platform-agnostic core for an American-football franchise simulator: play
//! resolution, the game state machine, box scores, schedule generation, standings,
//! and playoffs. Nothing here renders or persists; callers supply rosters through
//! [`RosterProvider`] and keep snapshots through [`SeasonStorage`].

pub mod adapter;
pub mod attributes;
pub mod config;
pub mod error;
pub mod game;
pub mod league;
pub mod modifiers;
pub mod numbers;
pub mod playcall;
pub mod playoffs;
pub mod resolver;
pub mod rng;
pub mod roster;
pub mod schedule;
pub mod season;
pub mod seed;
pub mod standings;
pub mod state;
pub mod stats;
pub mod units;
pub mod weather;

use anyhow::Context;

// Re-export commonly used types
pub use adapter::{RatingContext, SimPlayer, SimTeam, Tendencies, build_teams};
pub use attributes::{Attribute, AttributeGroup, AttributeVector, Ratings};
pub use config::{LeagueConfig, PlayoffConfig, SeasonConfig, SimConfig};
pub use error::{ConfigError, RosterError, SeasonError};
pub use game::{
    DriveOutcome, DriveSummary, GameContext, GameResult, GameSimulator, GameType, ScoringPlay,
    simulate_game,
};
pub use league::{TeamProfile, sample_league, synthetic_league, synthetic_team};
pub use modifiers::{
    BadgeDef, BadgeTier, CoachingStaff, Condition, Facilities, ModifierTables, Situation, TraitDef,
};
pub use playcall::choose_play;
pub use playoffs::{PlayoffBracket, PlayoffMatchup, PlayoffRound, SeededTeam};
pub use resolver::{PlayInput, PlayKind, PlayResult, ResultCategory, TurnoverKind, resolve_play};
pub use rng::{CountingRng, SeasonStreams};
pub use roster::{Conference, Division, PlayerId, PlayerRecord, Position, TeamId, TeamRecord};
pub use schedule::{
    GeneratedSchedule, LeagueLayout, MAX_SCHEDULE_ATTEMPTS, Schedule, ScheduleValidation,
    ScheduledGame, TimeSlot, generate_schedule, validate_schedule,
};
pub use season::{
    GameRecord, SeasonPhase, SeasonSimulator, SeasonState, WeekStatus, WeekSummary,
};
pub use seed::{decode_share_code, encode_share_code, generate_share_code};
pub use standings::{ClinchStatus, Record, Standings, Streak, TeamStanding};
pub use state::{GamePhase, GameRules, GameState, Side};
pub use stats::{BoxScore, PlayerGameStats, TeamGameStats};
pub use units::{Slot, Unit, UnitRatings};
pub use weather::{Climate, Weather, WeatherConfig, WeatherEffect};

/// Source of team records and modifier tables.
/// Platform-specific implementations should provide this
pub trait RosterProvider {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load every team in the league.
    ///
    /// # Errors
    ///
    /// Returns an error if the rosters cannot be loaded.
    fn load_teams(&self) -> Result<Vec<TeamRecord>, Self::Error>;

    /// Load badge, trait, perk, and facility tables.
    ///
    /// # Errors
    ///
    /// Returns an error if the tables cannot be loaded.
    fn load_modifier_tables(&self) -> Result<ModifierTables, Self::Error>;
}

/// Trait for persisting season snapshots
pub trait SeasonStorage {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Save a season snapshot under `slot`
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be written.
    fn save_season(&self, slot: &str, state: &SeasonState) -> Result<(), Self::Error>;

    /// Load the snapshot stored under `slot`
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be read.
    fn load_season(&self, slot: &str) -> Result<Option<SeasonState>, Self::Error>;

    /// Delete the snapshot stored under `slot`
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be removed.
    fn delete_season(&self, slot: &str) -> Result<(), Self::Error>;
}

/// Wires a roster provider and season storage to the simulator
pub struct LeagueEngine<P, S>
where
    P: RosterProvider,
    S: SeasonStorage,
{
    provider: P,
    storage: S,
    config: SeasonConfig,
}

impl<P, S> LeagueEngine<P, S>
where
    P: RosterProvider,
    S: SeasonStorage,
{
    /// Create an engine with the embedded season configuration
    pub fn new(provider: P, storage: S) -> Self {
        Self {
            provider,
            storage,
            config: SeasonConfig::default_config(),
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: SeasonConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub const fn config(&self) -> &SeasonConfig {
        &self.config
    }

    /// Start a new season from freshly loaded rosters.
    ///
    /// # Errors
    ///
    /// Returns an error if rosters cannot be loaded or the season fails validation.
    pub fn start_season(&self, year: u16, seed: u64) -> Result<SeasonSimulator, anyhow::Error>
    where
        P::Error: Into<anyhow::Error>,
    {
        let teams = self.provider.load_teams().map_err(Into::into)?;
        let tables = self.provider.load_modifier_tables().map_err(Into::into)?;
        SeasonSimulator::new(&teams, &tables, self.config.clone(), year, seed)
            .with_context(|| format!("starting season {year}"))
    }

    /// Start the season a share code describes.
    ///
    /// # Errors
    ///
    /// Returns an error if the code is malformed or the season cannot start.
    pub fn start_from_code(&self, code: &str) -> Result<SeasonSimulator, anyhow::Error>
    where
        P::Error: Into<anyhow::Error>,
    {
        let (year, seed) = decode_share_code(code)
            .with_context(|| format!("invalid share code {code:?}"))?;
        self.start_season(year, seed)
    }

    /// Save a season snapshot
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be saved.
    pub fn save(&self, slot: &str, season: &SeasonSimulator) -> Result<(), S::Error> {
        self.storage.save_season(slot, season.state())
    }

    /// Load a snapshot and rehydrate it with current rosters
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot or rosters cannot be loaded, or they disagree.
    pub fn resume(&self, slot: &str) -> Result<Option<SeasonSimulator>, anyhow::Error>
    where
        P::Error: Into<anyhow::Error>,
        S::Error: Into<anyhow::Error>,
    {
        let Some(state) = self.storage.load_season(slot).map_err(Into::into)? else {
            return Ok(None);
        };
        let teams = self.provider.load_teams().map_err(Into::into)?;
        let tables = self.provider.load_modifier_tables().map_err(Into::into)?;
        let season = SeasonSimulator::from_state(state, &teams, &tables)
            .with_context(|| format!("resuming season from slot {slot:?}"))?;
        Ok(Some(season))
    }

    /// Delete a saved season
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be removed.
    pub fn delete(&self, slot: &str) -> Result<(), S::Error> {
        self.storage.delete_season(slot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::convert::Infallible;
    use std::rc::Rc;

    #[derive(Clone, Copy, Default)]
    struct FixtureProvider;

    impl RosterProvider for FixtureProvider {
        type Error = Infallible;

        fn load_teams(&self) -> Result<Vec<TeamRecord>, Self::Error> {
            Ok(sample_league())
        }

        fn load_modifier_tables(&self) -> Result<ModifierTables, Self::Error> {
            Ok(ModifierTables::default_config())
        }
    }

    #[derive(Clone, Default)]
    struct MemoryStorage {
        saves: Rc<RefCell<HashMap<String, SeasonState>>>,
    }

    impl SeasonStorage for MemoryStorage {
        type Error = Infallible;

        fn save_season(&self, slot: &str, state: &SeasonState) -> Result<(), Self::Error> {
            self.saves.borrow_mut().insert(slot.to_string(), state.clone());
            Ok(())
        }

        fn load_season(&self, slot: &str) -> Result<Option<SeasonState>, Self::Error> {
            Ok(self.saves.borrow().get(slot).cloned())
        }

        fn delete_season(&self, slot: &str) -> Result<(), Self::Error> {
            self.saves.borrow_mut().remove(slot);
            Ok(())
        }
    }

    #[test]
    fn engine_saves_and_resumes_a_season() {
        let engine = LeagueEngine::new(FixtureProvider, MemoryStorage::default());
        let mut season = engine.start_season(2024, 0xABCD).unwrap();
        season.simulate_week().unwrap();
        season.simulate_week().unwrap();
        engine.save("slot-one", &season).unwrap();

        let mut resumed = engine.resume("slot-one").unwrap().expect("save exists");
        assert_eq!(resumed.state(), season.state());
        assert_eq!(resumed.simulate_week().unwrap(), season.simulate_week().unwrap());
        assert!(engine.resume("missing-slot").unwrap().is_none());

        engine.delete("slot-one").unwrap();
        assert!(engine.resume("slot-one").unwrap().is_none());
    }

    #[test]
    fn share_codes_start_reproducible_seasons() {
        let engine = LeagueEngine::new(FixtureProvider, MemoryStorage::default());
        let a = engine.start_from_code("2026-BLITZ42").unwrap();
        let b = engine.start_from_code("2026-blitz42").unwrap();
        assert_eq!(a.state().year, 2026);
        assert_eq!(a.state().schedule, b.state().schedule);
        assert!(engine.start_from_code("not a code").is_err());
    }
}
