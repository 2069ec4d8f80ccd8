//! Game orchestration: play calling, resolution, state updates, and the box score.
use log::debug;
use rand::RngCore;
use rand::rngs::SmallRng;
use serde::{Deserialize, Serialize};

use crate::adapter::{RatingContext, SimTeam};
use crate::config::SimConfig;
use crate::numbers::unit_from_u32;
use crate::playcall::choose_play;
use crate::resolver::{PlayInput, PlayKind, PlayResult, ResultCategory, TurnoverKind, resolve_play};
use crate::rng::CountingRng;
use crate::roster::TeamId;
use crate::state::{GamePhase, GameRules, GameState, Side};
use crate::stats::BoxScore;
use crate::weather::{Weather, WeatherEffect};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameType {
    #[default]
    Regular,
    Primetime,
    Playoff,
    Championship,
}

impl GameType {
    /// Knockout games cannot end tied.
    #[must_use]
    pub const fn is_knockout(self) -> bool {
        matches!(self, Self::Playoff | Self::Championship)
    }
}

/// Conditions a game is played under.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GameContext {
    pub game_type: GameType,
    pub weather: Weather,
    pub weather_effect: WeatherEffect,
    pub neutral_site: bool,
    pub home_field_advantage: f32,
}

impl GameContext {
    #[must_use]
    pub const fn new(game_type: GameType, weather: Weather, weather_effect: WeatherEffect, sim: &SimConfig) -> Self {
        Self {
            game_type,
            weather,
            weather_effect,
            neutral_site: matches!(game_type, GameType::Championship),
            home_field_advantage: sim.home_field_advantage,
        }
    }

    /// Clear-weather regular-season context.
    #[must_use]
    pub const fn regular(sim: &SimConfig) -> Self {
        Self::new(GameType::Regular, Weather::Clear, WeatherEffect::none(), sim)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DriveOutcome {
    Touchdown,
    FieldGoal,
    MissedFieldGoal,
    Punt,
    Turnover,
    Downs,
    Safety,
    EndOfHalf,
    EndOfGame,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriveSummary {
    pub number: u16,
    pub team: TeamId,
    pub side: Side,
    pub start_quarter: u8,
    pub start_clock: u16,
    pub start_ball_on: u8,
    pub plays: u16,
    pub yards: i32,
    pub elapsed: u32,
    pub outcome: Option<DriveOutcome>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringPlay {
    pub quarter: u8,
    pub clock: u16,
    pub team: TeamId,
    pub points: u16,
    pub description: String,
    pub home_score: u16,
    pub away_score: u16,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameResult {
    pub home: TeamId,
    pub away: TeamId,
    pub home_score: u16,
    pub away_score: u16,
    pub overtime: bool,
    pub game_type: GameType,
    pub weather: Weather,
    pub box_score: BoxScore,
    pub scoring_plays: Vec<ScoringPlay>,
    pub drives: Vec<DriveSummary>,
    pub plays: Vec<PlayResult>,
    /// Set when a knockout game hit the play cap tied.
    #[serde(default)]
    pub awarded: bool,
}

impl GameResult {
    #[must_use]
    pub fn winner(&self) -> Option<TeamId> {
        match self.home_score.cmp(&self.away_score) {
            std::cmp::Ordering::Greater => Some(self.home),
            std::cmp::Ordering::Less => Some(self.away),
            std::cmp::Ordering::Equal if self.awarded => Some(self.home),
            std::cmp::Ordering::Equal => None,
        }
    }

    #[must_use]
    pub fn loser(&self) -> Option<TeamId> {
        self.winner()
            .map(|w| if w == self.home { self.away } else { self.home })
    }

    #[must_use]
    pub fn is_tie(&self) -> bool {
        self.winner().is_none()
    }

    /// Points scored and allowed by `team`, if it played.
    #[must_use]
    pub fn points_for(&self, team: TeamId) -> Option<(u16, u16)> {
        if team == self.home {
            Some((self.home_score, self.away_score))
        } else if team == self.away {
            Some((self.away_score, self.home_score))
        } else {
            None
        }
    }
}

/// Steps one game from kickoff to final whistle. Every entry point continues
/// from the current state, so any mix of them yields the same play log.
#[derive(Debug, Clone)]
pub struct GameSimulator<'a> {
    home: &'a SimTeam,
    away: &'a SimTeam,
    context: GameContext,
    penalty_rate: f64,
    state: GameState,
    rng: CountingRng<SmallRng>,
    box_score: BoxScore,
    plays: Vec<PlayResult>,
    drives: Vec<DriveSummary>,
    scoring: Vec<ScoringPlay>,
}

impl<'a> GameSimulator<'a> {
    /// Set up a game and flip for the opening kickoff.
    #[must_use]
    pub fn new(home: &'a SimTeam, away: &'a SimTeam, context: GameContext, sim: &SimConfig, seed: u64) -> Self {
        let mut rng = CountingRng::from_seed_u64(seed);
        let receiver = coin_toss(&mut rng);
        let rules = GameRules::for_game(sim, context.game_type.is_knockout());
        Self {
            home,
            away,
            context,
            penalty_rate: sim.penalty_rate,
            state: GameState::new(rules, receiver),
            rng,
            box_score: BoxScore::default(),
            plays: Vec::new(),
            drives: Vec::new(),
            scoring: Vec::new(),
        }
    }

    #[must_use]
    pub const fn state(&self) -> &GameState {
        &self.state
    }

    #[must_use]
    pub fn plays(&self) -> &[PlayResult] {
        &self.plays
    }

    #[must_use]
    pub const fn is_over(&self) -> bool {
        self.state.is_over()
    }

    /// RNG draws consumed so far.
    #[must_use]
    pub const fn draws(&self) -> u64 {
        self.rng.draws()
    }

    const fn team(&self, side: Side) -> &'a SimTeam {
        match side {
            Side::Home => self.home,
            Side::Away => self.away,
        }
    }

    fn ratings_for(&self, side: Side) -> crate::units::UnitRatings {
        let home_field = (side == Side::Home && !self.context.neutral_site)
            .then_some(self.context.home_field_advantage);
        self.team(side).unit_ratings(&RatingContext {
            situation: self.state.situation(side, self.context.weather, self.context.game_type),
            home_field,
            weather: self.context.weather_effect,
        })
    }

    /// Run one play. Returns `None` once the game is over.
    pub fn simulate_play(&mut self) -> Option<&PlayResult> {
        if self.state.is_over() {
            return None;
        }
        if self.state.phase == GamePhase::Overtime {
            let receiver = coin_toss(&mut self.rng);
            self.state.begin_overtime(receiver);
            debug!("overtime period begins, {} receives", self.team(receiver).abbreviation);
        }

        let offense = self.state.possession;
        let offense_team = self.team(offense);
        let defense_team = self.team(offense.other());
        let kind = choose_play(&self.state, &offense_team.tendencies, &mut self.rng);
        let offense_units = self.ratings_for(offense);
        let defense_units = self.ratings_for(offense.other());
        let input = PlayInput {
            state: &self.state,
            offense: offense_team,
            defense: defense_team,
            offense_units: &offense_units,
            defense_units: &defense_units,
            weather: self.context.weather_effect,
            penalty_rate: self.penalty_rate,
        };
        let play = resolve_play(kind, &input, &mut self.rng);
        self.state.apply(&play);
        self.record(&play);
        self.plays.push(play);
        self.plays.last()
    }

    /// Run through the next possession, including a leading kickoff or toss.
    pub fn simulate_drive(&mut self) -> usize {
        let start = self.plays.len();
        while !self.is_over() && matches!(self.state.phase, GamePhase::Kickoff | GamePhase::Overtime) {
            self.simulate_play();
        }
        let drive = self.state.drive_number;
        let half = half_of(self.state.quarter);
        while !self.is_over()
            && self.state.drive_number == drive
            && matches!(self.state.phase, GamePhase::InDrive | GamePhase::ExtraPoint)
            && half_of(self.state.quarter) == half
        {
            self.simulate_play();
        }
        self.plays.len() - start
    }

    /// Run until the quarter changes or the game ends.
    pub fn simulate_quarter(&mut self) -> usize {
        let start = self.plays.len();
        let quarter = self.state.quarter;
        while !self.is_over() && self.state.quarter == quarter {
            self.simulate_play();
        }
        self.plays.len() - start
    }

    pub fn simulate_to_end(&mut self) -> usize {
        let start = self.plays.len();
        while self.simulate_play().is_some() {}
        self.plays.len() - start
    }

    /// Play out whatever remains and produce the result.
    #[must_use]
    pub fn finish(mut self) -> GameResult {
        self.simulate_to_end();
        if let Some(open) = self.drives.last_mut()
            && open.outcome.is_none()
        {
            open.outcome = Some(DriveOutcome::EndOfGame);
        }
        let state = &self.state;
        self.box_score.set_points(state.home_score, state.away_score);
        let result = GameResult {
            home: self.home.id,
            away: self.away.id,
            home_score: state.home_score,
            away_score: state.away_score,
            overtime: state.overtime.is_some(),
            game_type: self.context.game_type,
            weather: self.context.weather,
            box_score: self.box_score,
            scoring_plays: self.scoring,
            drives: self.drives,
            plays: self.plays,
            awarded: state.awarded_to.is_some(),
        };
        debug!(
            "final: {} {} - {} {}{} ({} plays)",
            self.home.abbreviation,
            result.home_score,
            result.away_score,
            self.away.abbreviation,
            if result.overtime { " OT" } else { "" },
            result.plays.len()
        );
        result
    }

    fn record(&mut self, play: &PlayResult) {
        let teams = (self.home.id, self.away.id);
        self.box_score.record(play, teams);

        let points = play.points();
        if points > 0 {
            let scorer = play.scorer.unwrap_or(play.offense);
            self.scoring.push(ScoringPlay {
                quarter: play.before.quarter,
                clock: self.state.clock,
                team: self.team(scorer).id,
                points,
                description: play.description.clone(),
                home_score: self.state.home_score,
                away_score: self.state.away_score,
            });
        }

        if matches!(play.kind, PlayKind::Kickoff | PlayKind::Onside | PlayKind::ExtraPoint) {
            return;
        }
        let needs_new = self
            .drives
            .last()
            .is_none_or(|d| d.outcome.is_some() || d.side != play.offense);
        if needs_new {
            self.drives.push(DriveSummary {
                number: self.state.drive_number,
                team: self.team(play.offense).id,
                side: play.offense,
                start_quarter: play.before.quarter,
                start_clock: play.before.clock,
                start_ball_on: play.before.ball_on,
                plays: 0,
                yards: 0,
                elapsed: 0,
                outcome: None,
            });
        }
        let ended_half = play.before.quarter == 2 && self.state.quarter == 3;
        let regulation_over = self.state.is_over() || self.state.phase == GamePhase::Overtime;
        if let Some(drive) = self.drives.last_mut() {
            drive.plays = drive.plays.saturating_add(1);
            drive.yards += i32::from(play.yards);
            drive.elapsed += u32::from(play.elapsed);
            drive.outcome = drive_outcome(play).or(if regulation_over {
                Some(DriveOutcome::EndOfGame)
            } else if ended_half {
                Some(DriveOutcome::EndOfHalf)
            } else {
                None
            });
        }
    }
}

fn half_of(quarter: u8) -> u8 {
    match quarter {
        1 | 2 => 1,
        3 | 4 => 2,
        q => q,
    }
}

fn coin_toss<R: RngCore + ?Sized>(rng: &mut R) -> Side {
    if unit_from_u32(rng.next_u32()) < 0.5 {
        Side::Home
    } else {
        Side::Away
    }
}

fn drive_outcome(play: &PlayResult) -> Option<DriveOutcome> {
    match play.category {
        ResultCategory::Touchdown if play.scorer == Some(play.offense) => Some(DriveOutcome::Touchdown),
        ResultCategory::Touchdown => Some(DriveOutcome::Turnover),
        ResultCategory::FieldGoalMade => Some(DriveOutcome::FieldGoal),
        ResultCategory::FieldGoalMissed => Some(DriveOutcome::MissedFieldGoal),
        ResultCategory::Punt => Some(DriveOutcome::Punt),
        ResultCategory::Safety => Some(DriveOutcome::Safety),
        ResultCategory::Turnover if play.turnover == Some(TurnoverKind::Downs) => Some(DriveOutcome::Downs),
        ResultCategory::Turnover => Some(DriveOutcome::Turnover),
        _ => None,
    }
}

/// Simulate a whole game in one call.
#[must_use]
pub fn simulate_game(
    home: &SimTeam,
    away: &SimTeam,
    context: GameContext,
    sim: &SimConfig,
    seed: u64,
) -> GameResult {
    GameSimulator::new(home, away, context, sim, seed).finish()
}
