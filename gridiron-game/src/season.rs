//! Season orchestration: weekly slates, standings, and the playoff run.
//!
//! A [`SeasonSimulator`] owns the simulator-form teams and a serializable
//! [`SeasonState`]. Every random stream is derived from the season seed and a
//! game id, so a snapshot resumed with the same rosters replays identically.
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::adapter::{SimTeam, build_teams};
use crate::config::SeasonConfig;
use crate::error::SeasonError;
use crate::game::{GameContext, GameResult, GameType, ScoringPlay, simulate_game};
use crate::modifiers::ModifierTables;
use crate::playoffs::PlayoffBracket;
use crate::rng::SeasonStreams;
use crate::roster::{Conference, TeamId, TeamRecord};
use crate::schedule::{LeagueLayout, Schedule, generate_schedule};
use crate::standings::Standings;
use crate::stats::BoxScore;
use crate::weather::{Weather, WeatherConfig, WeatherStreak, select_weather};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeasonPhase {
    #[default]
    Regular,
    Playoffs,
    Offseason,
}

/// A finished game as kept in the season log. The play-by-play is dropped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameRecord {
    pub id: u32,
    pub week: u8,
    pub home: TeamId,
    pub away: TeamId,
    pub home_score: u16,
    pub away_score: u16,
    pub overtime: bool,
    pub game_type: GameType,
    pub weather: Weather,
    pub winner: Option<TeamId>,
    #[serde(default)]
    pub awarded: bool,
    pub plays: u16,
    pub box_score: BoxScore,
    pub scoring_plays: Vec<ScoringPlay>,
}

impl GameRecord {
    fn from_result(id: u32, week: u8, result: GameResult) -> Self {
        Self {
            id,
            week,
            winner: result.winner(),
            home: result.home,
            away: result.away,
            home_score: result.home_score,
            away_score: result.away_score,
            overtime: result.overtime,
            game_type: result.game_type,
            weather: result.weather,
            awarded: result.awarded,
            plays: u16::try_from(result.plays.len()).unwrap_or(u16::MAX),
            box_score: result.box_score,
            scoring_plays: result.scoring_plays,
        }
    }

    #[must_use]
    pub fn involves(&self, team: TeamId) -> bool {
        self.home == team || self.away == team
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeekStatus {
    Simulated,
    AlreadyCompleted,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekSummary {
    pub week: u8,
    pub phase: SeasonPhase,
    pub status: WeekStatus,
    /// Playoff round name, if any.
    pub round: Option<String>,
    pub games: Vec<GameRecord>,
}

/// Serializable snapshot of a season in progress.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonState {
    pub year: u16,
    pub seed: u64,
    pub phase: SeasonPhase,
    /// Next week to simulate. Playoff rounds continue the count past the regular season.
    pub current_week: u8,
    pub config: SeasonConfig,
    pub schedule: Schedule,
    pub standings: Standings,
    pub games: Vec<GameRecord>,
    pub bracket: Option<PlayoffBracket>,
    pub champion: Option<TeamId>,
    #[serde(default)]
    pub weather_streaks: BTreeMap<TeamId, WeatherStreak>,
}

impl SeasonState {
    pub fn games_in_week(&self, week: u8) -> impl Iterator<Item = &GameRecord> {
        self.games.iter().filter(move |g| g.week == week)
    }

    #[must_use]
    pub const fn is_complete(&self) -> bool {
        matches!(self.phase, SeasonPhase::Offseason)
    }

    fn round_name(&self, week: u8) -> Option<String> {
        let round = week.checked_sub(self.schedule.weeks)?.checked_sub(1)?;
        self.bracket
            .as_ref()
            .and_then(|b| b.rounds.get(usize::from(round)))
            .map(|r| r.name.clone())
    }
}

#[derive(Debug, Clone)]
pub struct SeasonSimulator {
    teams: BTreeMap<TeamId, SimTeam>,
    streams: SeasonStreams,
    weather: WeatherConfig,
    state: SeasonState,
}

impl SeasonSimulator {
    /// Validate the league, build teams, and generate the schedule.
    ///
    /// # Errors
    ///
    /// Fails before any game is played if the configuration, rosters, or generated
    /// schedule are invalid.
    pub fn new(
        records: &[TeamRecord],
        tables: &ModifierTables,
        config: SeasonConfig,
        year: u16,
        seed: u64,
    ) -> Result<Self, SeasonError> {
        config.validate()?;
        config.league.validate_teams(records)?;
        let teams = build_teams(records, tables)?;
        let layout = LeagueLayout::from_teams(&teams)?;
        let streams = SeasonStreams::from_user_seed(seed);
        let generated = generate_schedule(&layout, &config.league, year, &streams)?;
        if !generated.validation.is_valid() {
            return Err(SeasonError::InvalidSchedule(generated.validation));
        }
        info!(
            "season {year}: {} games scheduled after {} attempt(s)",
            generated.schedule.games.len(),
            generated.attempts
        );
        let standings = Standings::new(
            teams.iter().map(|t| (t.id, t.conference, t.division)),
            config.league.games_per_team,
        );
        let state = SeasonState {
            year,
            seed,
            phase: SeasonPhase::Regular,
            current_week: 1,
            config,
            schedule: generated.schedule,
            standings,
            games: Vec::new(),
            bracket: None,
            champion: None,
            weather_streaks: BTreeMap::new(),
        };
        Ok(Self::assemble(teams, state))
    }

    /// Resume from a snapshot with freshly loaded rosters.
    ///
    /// # Errors
    ///
    /// Returns an error if the rosters fail validation or a team in the snapshot is missing.
    pub fn from_state(
        state: SeasonState,
        records: &[TeamRecord],
        tables: &ModifierTables,
    ) -> Result<Self, SeasonError> {
        state.config.validate()?;
        let teams = build_teams(records, tables)?;
        let known: BTreeSet<TeamId> = teams.iter().map(|t| t.id).collect();
        if let Some(missing) = state.standings.teams.keys().find(|t| !known.contains(t)) {
            return Err(SeasonError::UnknownTeam(*missing));
        }
        debug!("resuming season {} at week {}", state.year, state.current_week);
        Ok(Self::assemble(teams, state))
    }

    fn assemble(teams: Vec<SimTeam>, state: SeasonState) -> Self {
        let teams = teams
            .into_iter()
            .map(|mut team| {
                team.bye_week = state.schedule.bye_weeks(team.id).first().copied();
                (team.id, team)
            })
            .collect();
        Self {
            teams,
            streams: SeasonStreams::from_user_seed(state.seed),
            weather: WeatherConfig::default_config(),
            state,
        }
    }

    /// Replace the embedded weather tables.
    #[must_use]
    pub fn with_weather(mut self, weather: WeatherConfig) -> Self {
        self.weather = weather;
        self
    }

    #[must_use]
    pub const fn state(&self) -> &SeasonState {
        &self.state
    }

    #[must_use]
    pub fn into_state(self) -> SeasonState {
        self.state
    }

    #[must_use]
    pub fn team(&self, id: TeamId) -> Option<&SimTeam> {
        self.teams.get(&id)
    }

    pub fn teams(&self) -> impl Iterator<Item = &SimTeam> {
        self.teams.values()
    }

    /// Simulate the current week: a regular-season slate or one playoff round.
    ///
    /// # Errors
    ///
    /// Returns `SeasonError::SeasonComplete` once a champion has been crowned.
    pub fn simulate_week(&mut self) -> Result<WeekSummary, SeasonError> {
        match self.state.phase {
            SeasonPhase::Regular => self.play_regular_week(),
            SeasonPhase::Playoffs => self.play_playoff_round(),
            SeasonPhase::Offseason => Err(SeasonError::SeasonComplete),
        }
    }

    /// Simulate a specific week. Completed weeks are returned untouched.
    ///
    /// # Errors
    ///
    /// Rejects weeks beyond the current one and any week after the season ends.
    pub fn simulate_week_number(&mut self, week: u8) -> Result<WeekSummary, SeasonError> {
        let current = self.state.current_week;
        match week.cmp(&current) {
            std::cmp::Ordering::Less => {
                let phase = if week <= self.state.schedule.weeks {
                    SeasonPhase::Regular
                } else {
                    SeasonPhase::Playoffs
                };
                Ok(WeekSummary {
                    week,
                    phase,
                    status: WeekStatus::AlreadyCompleted,
                    round: self.state.round_name(week),
                    games: self.state.games_in_week(week).cloned().collect(),
                })
            }
            std::cmp::Ordering::Equal => self.simulate_week(),
            std::cmp::Ordering::Greater => Err(SeasonError::WeekOutOfOrder {
                requested: week,
                current,
            }),
        }
    }

    /// Play every remaining regular-season week.
    ///
    /// # Errors
    ///
    /// Propagates the first failing week.
    pub fn simulate_regular_season(&mut self) -> Result<Vec<WeekSummary>, SeasonError> {
        let mut weeks = Vec::new();
        while self.state.phase == SeasonPhase::Regular {
            weeks.push(self.simulate_week()?);
        }
        Ok(weeks)
    }

    /// Play through the championship and return the champion.
    ///
    /// # Errors
    ///
    /// Propagates the first failing week.
    pub fn simulate_to_completion(&mut self) -> Result<TeamId, SeasonError> {
        while self.state.phase != SeasonPhase::Offseason {
            self.simulate_week()?;
        }
        self.state.champion.ok_or(SeasonError::SeasonComplete)
    }

    fn play_regular_week(&mut self) -> Result<WeekSummary, SeasonError> {
        let week = self.state.current_week;
        let slate: Vec<_> = self.state.schedule.week(week).copied().collect();
        let mut records = Vec::with_capacity(slate.len());
        for game in slate {
            let game_type = if game.prime_time {
                GameType::Primetime
            } else {
                GameType::Regular
            };
            let record = self.play(game.id, week, game.home, game.away, game_type)?;
            self.state.standings.record_game(
                record.home,
                record.away,
                record.home_score,
                record.away_score,
            )?;
            records.push(record);
        }
        self.state
            .standings
            .recompute(self.state.config.playoffs.teams_per_conference);
        self.state.games.extend(records.iter().cloned());
        self.state.current_week = week.saturating_add(1);
        debug!("week {week}: {} games final", records.len());

        if week >= self.state.schedule.weeks {
            self.begin_playoffs();
        }
        Ok(WeekSummary {
            week,
            phase: SeasonPhase::Regular,
            status: WeekStatus::Simulated,
            round: None,
            games: records,
        })
    }

    fn begin_playoffs(&mut self) {
        let field = self.state.config.playoffs.teams_per_conference;
        let east = self.state.standings.seeds(Conference::East, field);
        let west = self.state.standings.seeds(Conference::West, field);
        let first_id = self
            .state
            .schedule
            .games
            .iter()
            .map(|g| g.id)
            .max()
            .unwrap_or(0)
            .saturating_add(1);
        self.state.bracket = Some(PlayoffBracket::new(&east, &west, first_id));
        self.state.phase = SeasonPhase::Playoffs;
        info!(
            "season {}: regular season complete, {} teams enter the playoffs",
            self.state.year,
            east.len() + west.len()
        );
    }

    fn play_playoff_round(&mut self) -> Result<WeekSummary, SeasonError> {
        let week = self.state.current_week;
        let Some(round) = self.state.bracket.as_mut().and_then(PlayoffBracket::advance) else {
            return Err(SeasonError::SeasonComplete);
        };
        let name = round.name.clone();
        let slate: Vec<(u32, TeamId, TeamId, bool)> = round
            .matchups
            .iter()
            .map(|m| (m.id, m.home.team, m.away.team, m.conference.is_none()))
            .collect();

        let mut records = Vec::with_capacity(slate.len());
        for (id, home, away, final_game) in slate {
            let game_type = if final_game {
                GameType::Championship
            } else {
                GameType::Playoff
            };
            let record = self.play(id, week, home, away, game_type)?;
            // Knockout games always produce a winner.
            let winner = record.winner.unwrap_or(home);
            if let Some(bracket) = self.state.bracket.as_mut() {
                bracket.record_result(id, record.home_score, record.away_score, winner);
            }
            records.push(record);
        }
        self.state.games.extend(records.iter().cloned());
        self.state.current_week = week.saturating_add(1);
        debug!("{name}: {} games final", records.len());

        if let Some(champion) = self.state.bracket.as_ref().and_then(|b| b.champion) {
            self.state.champion = Some(champion);
            self.state.phase = SeasonPhase::Offseason;
            let label = self.teams.get(&champion).map_or_else(|| champion.to_string(), |t| t.name.clone());
            info!("season {}: {label} win the championship", self.state.year);
        }
        Ok(WeekSummary {
            week,
            phase: SeasonPhase::Playoffs,
            status: WeekStatus::Simulated,
            round: Some(name),
            games: records,
        })
    }

    fn play(
        &mut self,
        id: u32,
        week: u8,
        home: TeamId,
        away: TeamId,
        game_type: GameType,
    ) -> Result<GameRecord, SeasonError> {
        let home_team = self.teams.get(&home).ok_or(SeasonError::UnknownTeam(home))?;
        let away_team = self.teams.get(&away).ok_or(SeasonError::UnknownTeam(away))?;
        let weather = if game_type == GameType::Championship {
            Weather::Dome
        } else {
            let streak = self.state.weather_streaks.get(&home).copied().unwrap_or_default();
            let mut rng = self.streams.weather(id);
            let weather = select_weather(&self.weather, home_team.climate, week, streak, &mut rng);
            self.state.weather_streaks.entry(home).or_default().record(weather);
            weather
        };
        let sim = &self.state.config.sim;
        let context = GameContext::new(game_type, weather, self.weather.effect(weather), sim);
        let result = simulate_game(home_team, away_team, context, sim, self.streams.game_seed(id));
        Ok(GameRecord::from_result(id, week, result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::league::sample_league;

    fn season(seed: u64) -> SeasonSimulator {
        SeasonSimulator::new(
            &sample_league(),
            &ModifierTables::default_config(),
            SeasonConfig::default_config(),
            2024,
            seed,
        )
        .unwrap()
    }

    #[test]
    fn opening_week_updates_standings() {
        let mut sim = season(11);
        let summary = sim.simulate_week().unwrap();
        assert_eq!(summary.week, 1);
        assert_eq!(summary.status, WeekStatus::Simulated);
        assert!(!summary.games.is_empty());
        assert_eq!(sim.state().current_week, 2);
        let played: u16 = sim.state().standings.teams.values().map(|s| s.overall.games()).sum();
        assert_eq!(usize::from(played), summary.games.len() * 2);
    }

    #[test]
    fn completed_weeks_are_not_replayed() {
        let mut sim = season(12);
        sim.simulate_week().unwrap();
        let before = sim.state().clone();
        let again = sim.simulate_week_number(1).unwrap();
        assert_eq!(again.status, WeekStatus::AlreadyCompleted);
        assert_eq!(sim.state(), &before);
        assert!(matches!(
            sim.simulate_week_number(5),
            Err(SeasonError::WeekOutOfOrder { requested: 5, current: 2 })
        ));
    }

    #[test]
    fn teams_know_their_bye() {
        let sim = season(13);
        let config = &sim.state().config.league;
        for team in sim.teams() {
            let bye = team.bye_week.unwrap();
            assert!(config.in_bye_window(bye), "{} rests in week {bye}", team.id);
        }
    }

    #[test]
    fn season_runs_to_a_champion_then_stops() {
        let mut sim = season(14);
        let weeks = sim.simulate_regular_season().unwrap();
        assert_eq!(weeks.len(), 18);
        assert_eq!(sim.state().phase, SeasonPhase::Playoffs);
        assert_eq!(sim.state().games.len(), 272);

        let champion = sim.simulate_to_completion().unwrap();
        let state = sim.state();
        assert_eq!(state.phase, SeasonPhase::Offseason);
        assert_eq!(state.champion, Some(champion));
        let last = state.games.last().unwrap();
        assert_eq!(last.game_type, GameType::Championship);
        assert_eq!(last.weather, Weather::Dome);
        assert_eq!(last.winner, Some(champion));
        assert!(state.games.iter().filter(|g| g.week > 18).all(|g| g.winner.is_some()));
        assert!(matches!(sim.simulate_week(), Err(SeasonError::SeasonComplete)));
    }

    #[test]
    fn resumed_snapshot_matches_uninterrupted_run() {
        let mut straight = season(15);
        for _ in 0..4 {
            straight.simulate_week().unwrap();
        }
        let json = serde_json::to_string(&straight.state().clone()).unwrap();
        let snapshot: SeasonState = serde_json::from_str(&json).unwrap();
        let mut resumed =
            SeasonSimulator::from_state(snapshot, &sample_league(), &ModifierTables::default_config())
                .unwrap();
        let a = straight.simulate_week().unwrap();
        let b = resumed.simulate_week().unwrap();
        assert_eq!(a, b);
        assert_eq!(straight.state(), resumed.state());
    }

    #[test]
    fn missing_rosters_block_a_resume() {
        let sim = season(16);
        let mut records = sample_league();
        records.pop();
        let err = SeasonSimulator::from_state(sim.into_state(), &records, &ModifierTables::default_config())
            .unwrap_err();
        assert!(matches!(err, SeasonError::UnknownTeam(_)));
    }

    #[test]
    fn short_leagues_fail_fast() {
        let mut records = sample_league();
        records.truncate(30);
        let err = SeasonSimulator::new(
            &records,
            &ModifierTables::default_config(),
            SeasonConfig::default_config(),
            2024,
            1,
        )
        .unwrap_err();
        assert!(matches!(err, SeasonError::Config(_)));
    }
}
