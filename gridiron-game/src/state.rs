//! Drive and game state machine.
//!
//! The resolver decides what happened on a play; this module applies it. Every
//! transition clamps its numbers instead of failing, since boundary yardage is routine.
use serde::{Deserialize, Serialize};

use crate::config::SimConfig;
use crate::game::GameType;
use crate::modifiers::Situation;
use crate::resolver::{PlayResult, ResultCategory, TurnoverKind};
use crate::weather::Weather;

pub const TOUCHDOWN_POINTS: u16 = 6;
pub const FIELD_GOAL_POINTS: u16 = 3;
pub const SAFETY_POINTS: u16 = 2;
pub const EXTRA_POINT_POINTS: u16 = 1;
/// Spot of the try, two yards from the goal line.
pub const EXTRA_POINT_SPOT: u8 = 98;
pub const KICKOFF_SPOT: u8 = 35;
pub const FIRST_DOWN_YARDS: u8 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Home,
    Away,
}

impl Side {
    #[must_use]
    pub const fn other(self) -> Self {
        match self {
            Self::Home => Self::Away,
            Self::Away => Self::Home,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GamePhase {
    Kickoff,
    InDrive,
    ExtraPoint,
    EndOfQuarter,
    Halftime,
    /// Tied after a period that allows overtime; waiting for the coin toss.
    Overtime,
    GameOver,
}

impl GamePhase {
    /// Phases that pass straight through to the next playable phase.
    #[must_use]
    pub const fn is_transitional(self) -> bool {
        matches!(self, Self::EndOfQuarter | Self::Halftime | Self::Overtime)
    }
}

/// Period structure a game is played under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRules {
    pub quarter_seconds: u16,
    pub overtime_seconds: u16,
    /// `None` repeats overtime until someone wins.
    pub overtime_periods: Option<u8>,
    pub max_plays: u16,
}

impl GameRules {
    #[must_use]
    pub const fn for_game(sim: &SimConfig, knockout: bool) -> Self {
        Self {
            quarter_seconds: sim.quarter_seconds,
            overtime_seconds: sim.overtime_seconds,
            overtime_periods: if knockout { None } else { Some(1) },
            max_plays: sim.max_plays_per_game,
        }
    }

    #[must_use]
    pub const fn allows_tie(&self) -> bool {
        self.overtime_periods.is_some()
    }
}

impl Default for GameRules {
    fn default() -> Self {
        Self::for_game(&SimConfig::default(), false)
    }
}

/// Guaranteed-possession overtime bookkeeping for the current period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OvertimeState {
    pub period: u8,
    pub possessions_completed: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseMark {
    pub phase: GamePhase,
    pub quarter: u8,
    pub play: u16,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub quarter: u8,
    pub clock: u16,
    pub down: u8,
    pub yards_to_go: u8,
    /// 0 = offense's own goal line, 100 = opponent's goal line.
    pub ball_on: u8,
    pub possession: Side,
    pub home_score: u16,
    pub away_score: u16,
    pub phase: GamePhase,
    pub rules: GameRules,
    pub opening_receiver: Side,
    pub overtime: Option<OvertimeState>,
    pub drive_number: u16,
    pub plays: u16,
    /// Winner assigned by the runaway guard when a knockout game cannot end tied.
    pub awarded_to: Option<Side>,
    pub history: Vec<PhaseMark>,
}

impl GameState {
    /// Fresh game waiting on the opening kickoff; `receiver` won the toss.
    #[must_use]
    pub fn new(rules: GameRules, receiver: Side) -> Self {
        let mut state = Self {
            quarter: 1,
            clock: rules.quarter_seconds,
            down: 1,
            yards_to_go: FIRST_DOWN_YARDS,
            ball_on: KICKOFF_SPOT,
            possession: receiver.other(),
            home_score: 0,
            away_score: 0,
            phase: GamePhase::Kickoff,
            rules,
            opening_receiver: receiver,
            overtime: None,
            drive_number: 0,
            plays: 0,
            awarded_to: None,
            history: Vec::new(),
        };
        state.mark(GamePhase::Kickoff);
        state
    }

    #[must_use]
    pub const fn is_over(&self) -> bool {
        matches!(self.phase, GamePhase::GameOver)
    }

    #[must_use]
    pub const fn score(&self, side: Side) -> u16 {
        match side {
            Side::Home => self.home_score,
            Side::Away => self.away_score,
        }
    }

    #[must_use]
    pub fn score_diff(&self, side: Side) -> i16 {
        let mine = i32::from(self.score(side));
        let theirs = i32::from(self.score(side.other()));
        i16::try_from(mine - theirs).unwrap_or(0)
    }

    #[must_use]
    pub const fn is_overtime(&self) -> bool {
        self.quarter > 4
    }

    /// Seconds left in the current half, or in the overtime period.
    #[must_use]
    pub const fn half_seconds_left(&self) -> u32 {
        match self.quarter {
            1 | 3 => self.clock as u32 + self.rules.quarter_seconds as u32,
            _ => self.clock as u32,
        }
    }

    /// The side kicking off when the phase is `Kickoff`.
    #[must_use]
    pub const fn kicking_team(&self) -> Side {
        self.possession
    }

    /// Situation as seen by `side`.
    #[must_use]
    pub fn situation(&self, side: Side, weather: Weather, game_type: GameType) -> Situation {
        Situation {
            quarter: self.quarter,
            clock: self.clock,
            down: self.down,
            distance: self.yards_to_go,
            ball_on: self.ball_on,
            score_diff: self.score_diff(side),
            on_offense: self.possession == side,
            is_home: side == Side::Home,
            weather,
            game_type,
        }
    }

    /// Winner, if any.
    #[must_use]
    pub fn winner(&self) -> Option<Side> {
        match self.home_score.cmp(&self.away_score) {
            std::cmp::Ordering::Greater => Some(Side::Home),
            std::cmp::Ordering::Less => Some(Side::Away),
            std::cmp::Ordering::Equal => self.awarded_to,
        }
    }

    fn mark(&mut self, phase: GamePhase) {
        self.history.push(PhaseMark {
            phase,
            quarter: self.quarter,
            play: self.plays,
        });
    }

    fn set_phase(&mut self, phase: GamePhase) {
        if self.phase != phase {
            self.phase = phase;
            self.mark(phase);
        }
    }

    fn add_points(&mut self, side: Side, points: u16) {
        match side {
            Side::Home => self.home_score = self.home_score.saturating_add(points),
            Side::Away => self.away_score = self.away_score.saturating_add(points),
        }
    }

    fn reset_downs(&mut self) {
        self.down = 1;
        self.yards_to_go = FIRST_DOWN_YARDS.min(100u8.saturating_sub(self.ball_on)).max(1);
    }

    fn start_drive(&mut self, side: Side, ball_on: u8) {
        self.possession = side;
        self.ball_on = ball_on.clamp(1, 99);
        self.reset_downs();
        self.drive_number = self.drive_number.saturating_add(1);
        self.set_phase(GamePhase::InDrive);
    }

    fn prepare_kickoff(&mut self, kicking: Side) {
        self.possession = kicking;
        self.ball_on = KICKOFF_SPOT;
        self.down = 1;
        self.yards_to_go = FIRST_DOWN_YARDS;
        self.set_phase(GamePhase::Kickoff);
    }

    fn complete_possession(&mut self) {
        if let Some(ot) = self.overtime.as_mut() {
            ot.possessions_completed = ot.possessions_completed.saturating_add(1);
        }
    }

    /// Guaranteed-possession rule: once both teams have had the ball, any lead ends it.
    fn overtime_decided(&self) -> bool {
        self.overtime
            .is_some_and(|ot| ot.possessions_completed >= 2 && self.home_score != self.away_score)
    }

    fn end_game(&mut self) {
        self.set_phase(GamePhase::GameOver);
    }

    /// Begin an overtime period after the coin toss.
    pub fn begin_overtime(&mut self, receiver: Side) {
        if self.phase != GamePhase::Overtime {
            return;
        }
        let period = self.overtime.map_or(1, |ot| ot.period.saturating_add(1));
        self.overtime = Some(OvertimeState {
            period,
            possessions_completed: 0,
        });
        self.quarter = 4 + period;
        self.clock = self.rules.overtime_seconds;
        self.prepare_kickoff(receiver.other());
    }

    /// Apply one resolved play.
    pub fn apply(&mut self, play: &PlayResult) {
        if self.is_over() || self.phase == GamePhase::Overtime {
            return;
        }
        self.plays = self.plays.saturating_add(1);
        self.clock = self.clock.saturating_sub(play.elapsed);
        let offense = play.offense;

        match play.category {
            ResultCategory::Normal => {
                self.advance(play.yards);
                self.down = self.down.saturating_add(1);
                if self.down > 4 {
                    self.complete_possession();
                    let spot = 100u8.saturating_sub(self.ball_on);
                    self.start_drive(offense.other(), spot);
                }
            }
            ResultCategory::FirstDown => {
                self.advance(play.yards);
                self.reset_downs();
            }
            ResultCategory::Penalty => {
                let automatic = play
                    .penalty
                    .as_ref()
                    .is_some_and(|p| p.automatic_first_down);
                self.advance(play.yards);
                if automatic || play.yards >= i16::from(play.before.yards_to_go) {
                    self.reset_downs();
                }
            }
            ResultCategory::Touchdown => {
                let scorer = play.scorer.unwrap_or(offense);
                self.add_points(scorer, TOUCHDOWN_POINTS);
                self.possession = scorer;
                let defensive = scorer != offense && play.kind.is_scrimmage();
                if self.overtime.is_some() {
                    let walk_off = defensive
                        || (self.overtime.is_some_and(|ot| ot.possessions_completed >= 1)
                            && self.score_diff(scorer) > 0);
                    if walk_off {
                        self.end_game();
                        return;
                    }
                }
                self.ball_on = EXTRA_POINT_SPOT;
                self.down = 1;
                self.yards_to_go = 2;
                self.set_phase(GamePhase::ExtraPoint);
            }
            ResultCategory::ExtraPointGood | ResultCategory::ExtraPointMissed => {
                if play.category == ResultCategory::ExtraPointGood {
                    self.add_points(offense, EXTRA_POINT_POINTS);
                }
                self.complete_possession();
                self.prepare_kickoff(offense);
            }
            ResultCategory::FieldGoalMade => {
                self.add_points(offense, FIELD_GOAL_POINTS);
                self.complete_possession();
                self.prepare_kickoff(offense);
            }
            ResultCategory::Safety => {
                let scorer = play.scorer.unwrap_or_else(|| offense.other());
                self.add_points(scorer, SAFETY_POINTS);
                if self.overtime.is_some() {
                    self.end_game();
                    return;
                }
                self.complete_possession();
                self.prepare_kickoff(scorer.other());
                self.ball_on = 20;
            }
            ResultCategory::Turnover
            | ResultCategory::FieldGoalMissed
            | ResultCategory::Punt
            | ResultCategory::Kickoff => {
                let next = play.next_possession.unwrap_or_else(|| offense.other());
                let spot = play
                    .next_ball_on
                    .unwrap_or_else(|| 100u8.saturating_sub(self.ball_on));
                let begins_possession = matches!(play.category, ResultCategory::Kickoff)
                    || matches!(play.turnover, Some(TurnoverKind::OnsideRecovery));
                if !begins_possession {
                    self.complete_possession();
                }
                self.start_drive(next, spot);
            }
        }

        if self.overtime_decided() {
            self.end_game();
            return;
        }
        self.check_period_end();
        if !self.is_over() && self.plays >= self.rules.max_plays {
            if self.home_score == self.away_score && !self.rules.allows_tie() {
                self.awarded_to = Some(Side::Home);
            }
            self.end_game();
        }
    }

    /// Move the ball for a play that kept possession.
    fn advance(&mut self, yards: i16) {
        let spot = (i16::from(self.ball_on) + yards).clamp(1, 99);
        self.ball_on = u8::try_from(spot).unwrap_or(50);
        let remaining = i16::from(self.yards_to_go) - yards;
        let to_goal = i16::from(100u8.saturating_sub(self.ball_on));
        let capped = remaining.clamp(1, i16::from(FIRST_DOWN_YARDS)).min(to_goal.max(1));
        self.yards_to_go = u8::try_from(capped).unwrap_or(FIRST_DOWN_YARDS);
    }

    /// Handle the clock reaching zero. Tries are untimed.
    fn check_period_end(&mut self) {
        if self.clock > 0 || matches!(self.phase, GamePhase::ExtraPoint | GamePhase::GameOver) {
            return;
        }
        match self.quarter {
            1 | 3 => {
                self.mark(GamePhase::EndOfQuarter);
                self.quarter += 1;
                self.clock = self.rules.quarter_seconds;
            }
            2 => {
                self.mark(GamePhase::Halftime);
                self.quarter = 3;
                self.clock = self.rules.quarter_seconds;
                self.prepare_kickoff(self.opening_receiver);
            }
            _ => {
                if self.home_score != self.away_score {
                    self.end_game();
                    return;
                }
                let played = self.overtime.map_or(0, |ot| ot.period);
                let more = self.rules.overtime_periods.is_none_or(|max| played < max);
                if more {
                    self.set_phase(GamePhase::Overtime);
                } else {
                    self.end_game();
                }
            }
        }
    }
}
