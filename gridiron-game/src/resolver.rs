//! Single-play resolution.
//!
//! Every probability is a base rate shifted in log-odds space by the rating
//! differential between the relevant offensive and defensive units, so a better
//! offense always gains more and a better defense always gives up less.
use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::adapter::SimTeam;
use crate::numbers::{round_f64_to_i32, round_to_u16, shift_probability, unit_from_u32};
use crate::roster::PlayerId;
use crate::state::{EXTRA_POINT_SPOT, GameState, Side};
use crate::units::{Slot, Unit, UnitRatings};
use crate::weather::WeatherEffect;

/// Rating points per unit of log-odds shift.
const RATING_SCALE: f64 = 10.0;
/// Yards a field goal travels beyond the line of scrimmage (snap plus end zone).
const FIELD_GOAL_OFFSET: u8 = 17;
/// Touchback spots.
const KICKOFF_TOUCHBACK: u8 = 25;
const PUNT_TOUCHBACK: u8 = 20;
/// Receiving team's ball position after a recovered onside kick, from its own goal line.
const ONSIDE_SPOT: u8 = 54;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayKind {
    Run,
    ShortPass,
    DeepPass,
    Punt,
    FieldGoal,
    Kickoff,
    Onside,
    ExtraPoint,
    Kneel,
}

impl PlayKind {
    /// Plays where the ball is live in the offense's hands.
    #[must_use]
    pub const fn is_scrimmage(self) -> bool {
        matches!(self, Self::Run | Self::ShortPass | Self::DeepPass | Self::Kneel)
    }

    #[must_use]
    pub const fn is_pass(self) -> bool {
        matches!(self, Self::ShortPass | Self::DeepPass)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultCategory {
    Normal,
    FirstDown,
    Touchdown,
    Turnover,
    Penalty,
    FieldGoalMade,
    FieldGoalMissed,
    Safety,
    Punt,
    Kickoff,
    ExtraPointGood,
    ExtraPointMissed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnoverKind {
    Interception,
    Fumble,
    Downs,
    /// Kicking team recovered its own onside kick.
    OnsideRecovery,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Penalty {
    pub name: String,
    pub on_offense: bool,
    pub yards: u8,
    pub automatic_first_down: bool,
}

/// Down, distance, and clock before the snap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownAndDistance {
    pub quarter: u8,
    pub clock: u16,
    pub down: u8,
    pub yards_to_go: u8,
    pub ball_on: u8,
}

impl DownAndDistance {
    #[must_use]
    pub const fn capture(state: &GameState) -> Self {
        Self {
            quarter: state.quarter,
            clock: state.clock,
            down: state.down,
            yards_to_go: state.yards_to_go,
            ball_on: state.ball_on,
        }
    }
}

/// Players credited on a play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Participants {
    pub passer: Option<PlayerId>,
    pub rusher: Option<PlayerId>,
    pub receiver: Option<PlayerId>,
    /// Tackler, pass rusher, or interceptor on the defense.
    pub defender: Option<PlayerId>,
    pub kicker: Option<PlayerId>,
    pub returner: Option<PlayerId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayResult {
    pub kind: PlayKind,
    pub category: ResultCategory,
    /// Side with the ball at the snap; the kicking team on kicks.
    pub offense: Side,
    pub yards: i16,
    pub elapsed: u16,
    pub description: String,
    pub before: DownAndDistance,
    pub turnover: Option<TurnoverKind>,
    pub penalty: Option<Penalty>,
    /// Side credited with points when the category scores.
    pub scorer: Option<Side>,
    pub next_possession: Option<Side>,
    /// New ball position for `next_possession`, from its own goal line.
    pub next_ball_on: Option<u8>,
    pub return_yards: i16,
    pub completion: bool,
    pub sack: bool,
    pub participants: Participants,
}

impl PlayResult {
    fn new(kind: PlayKind, state: &GameState) -> Self {
        Self {
            kind,
            category: ResultCategory::Normal,
            offense: state.possession,
            yards: 0,
            elapsed: 0,
            description: String::new(),
            before: DownAndDistance::capture(state),
            turnover: None,
            penalty: None,
            scorer: None,
            next_possession: None,
            next_ball_on: None,
            return_yards: 0,
            completion: false,
            sack: false,
            participants: Participants::default(),
        }
    }

    /// Points this play puts on the board.
    #[must_use]
    pub const fn points(&self) -> u16 {
        match self.category {
            ResultCategory::Touchdown => crate::state::TOUCHDOWN_POINTS,
            ResultCategory::FieldGoalMade => crate::state::FIELD_GOAL_POINTS,
            ResultCategory::Safety => crate::state::SAFETY_POINTS,
            ResultCategory::ExtraPointGood => crate::state::EXTRA_POINT_POINTS,
            _ => 0,
        }
    }

    #[must_use]
    pub const fn ends_possession(&self) -> bool {
        matches!(
            self.category,
            ResultCategory::Touchdown
                | ResultCategory::Turnover
                | ResultCategory::FieldGoalMade
                | ResultCategory::FieldGoalMissed
                | ResultCategory::Safety
                | ResultCategory::Punt
        )
    }
}

/// Everything the resolver reads for one snap.
#[derive(Debug, Clone, Copy)]
pub struct PlayInput<'a> {
    pub state: &'a GameState,
    pub offense: &'a SimTeam,
    pub defense: &'a SimTeam,
    pub offense_units: &'a UnitRatings,
    pub defense_units: &'a UnitRatings,
    pub weather: WeatherEffect,
    pub penalty_rate: f64,
}

impl PlayInput<'_> {
    fn differential(&self, offense: f32, defense: f32) -> f64 {
        f64::from(offense - defense) / RATING_SCALE
    }

    fn blend(units: &UnitRatings, parts: &[(Unit, f32)]) -> f32 {
        parts.iter().map(|(unit, w)| units.get(*unit) * w).sum()
    }
}

fn draw<R: RngCore + ?Sized>(rng: &mut R) -> f64 {
    unit_from_u32(rng.next_u32())
}

/// Sum of three uniforms centred on zero, spanning -1.5..1.5.
fn noise<R: RngCore + ?Sized>(rng: &mut R) -> f64 {
    draw(rng) + draw(rng) + draw(rng) - 1.5
}

fn range<R: RngCore + ?Sized>(rng: &mut R, low: f64, high: f64) -> f64 {
    draw(rng).mul_add(high - low, low)
}

fn to_u8(value: i32) -> u8 {
    u8::try_from(value.clamp(0, 100)).unwrap_or(0)
}

fn to_i16(value: f64) -> i16 {
    i16::try_from(round_f64_to_i32(value).clamp(-99, 99)).unwrap_or(0)
}

fn pick<R: RngCore + ?Sized>(team: &SimTeam, slots: &[(Slot, f64)], rng: &mut R) -> Option<PlayerId> {
    let total: f64 = slots.iter().map(|(_, w)| w).sum();
    let mut roll = draw(rng) * total;
    for (slot, weight) in slots {
        if roll < *weight {
            return team.starter_id(*slot);
        }
        roll -= weight;
    }
    slots.last().and_then(|(slot, _)| team.starter_id(*slot))
}

fn name_of(team: &SimTeam, id: Option<PlayerId>) -> String {
    id.and_then(|id| team.players.iter().find(|p| p.id == id))
        .map_or_else(|| team.abbreviation.clone(), |p| short(&p.name))
}

fn short(name: &str) -> String {
    let mut parts = name.split_whitespace();
    match (parts.next(), parts.last()) {
        (Some(first), Some(last)) => {
            format!("{}. {last}", first.chars().next().unwrap_or('?'))
        }
        (Some(only), None) => only.to_string(),
        _ => String::from("?"),
    }
}

/// Resolve one play of the given kind.
pub fn resolve_play<R: RngCore + ?Sized>(
    kind: PlayKind,
    input: &PlayInput<'_>,
    rng: &mut R,
) -> PlayResult {
    if kind.is_scrimmage() && kind != PlayKind::Kneel && draw(rng) < input.penalty_rate {
        return resolve_penalty(kind, input, rng);
    }
    match kind {
        PlayKind::Run => resolve_run(input, rng),
        PlayKind::ShortPass | PlayKind::DeepPass => resolve_pass(kind, input, rng),
        PlayKind::Punt => resolve_punt(input, rng),
        PlayKind::FieldGoal => resolve_field_goal(input, rng),
        PlayKind::Kickoff => resolve_kickoff(input, rng),
        PlayKind::Onside => resolve_onside(input, rng),
        PlayKind::ExtraPoint => resolve_extra_point(input, rng),
        PlayKind::Kneel => resolve_kneel(input),
    }
}

/// Field-goal distance from the current line of scrimmage.
#[must_use]
pub const fn field_goal_distance(ball_on: u8) -> u8 {
    100u8.saturating_sub(ball_on).saturating_add(FIELD_GOAL_OFFSET)
}

/// Make probability for a league-average kicker at a given distance.
#[must_use]
pub fn field_goal_base(distance: u8) -> f64 {
    1.0 / (1.0 + ((f64::from(distance) - 53.0) / 5.5).exp())
}

/// Classify gained yardage on a scrimmage play that kept the ball alive.
fn settle_yardage(result: &mut PlayResult, state: &GameState, yards: i16) {
    let spot = i16::from(state.ball_on) + yards;
    if spot >= 100 {
        result.yards = 100 - i16::from(state.ball_on);
        result.category = ResultCategory::Touchdown;
        result.scorer = Some(state.possession);
    } else if spot <= 0 {
        result.yards = -i16::from(state.ball_on);
        result.category = ResultCategory::Safety;
        result.scorer = Some(state.possession.other());
    } else if yards >= i16::from(state.yards_to_go) {
        result.yards = yards;
        result.category = ResultCategory::FirstDown;
    } else if state.down >= 4 {
        result.yards = yards;
        result.category = ResultCategory::Turnover;
        result.turnover = Some(TurnoverKind::Downs);
        result.next_possession = Some(state.possession.other());
        result.next_ball_on = Some(to_u8(100 - i32::from(spot)));
    } else {
        result.yards = yards;
        result.category = ResultCategory::Normal;
    }
}

fn describe_gain(result: &PlayResult) -> &'static str {
    match result.category {
        ResultCategory::Touchdown => " TOUCHDOWN",
        ResultCategory::FirstDown => " (first down)",
        ResultCategory::Safety => " SAFETY",
        ResultCategory::Turnover => " (turnover on downs)",
        _ => "",
    }
}

fn elapsed_for<R: RngCore + ?Sized>(input: &PlayInput<'_>, clock_stops: bool, rng: &mut R) -> u16 {
    let state = input.state;
    let hurry = state.half_seconds_left() <= 120 && state.score_diff(state.possession) <= 0;
    let (low, high) = match (clock_stops, hurry) {
        (true, _) => (4.0, 8.0),
        (false, true) => (14.0, 22.0),
        (false, false) => (26.0, 40.0),
    };
    round_to_u16(range(rng, low, high))
}

fn resolve_penalty<R: RngCore + ?Sized>(
    kind: PlayKind,
    input: &PlayInput<'_>,
    rng: &mut R,
) -> PlayResult {
    let state = input.state;
    let mut result = PlayResult::new(kind, state);
    result.category = ResultCategory::Penalty;
    let roll = draw(rng);
    let (name, on_offense, yards, automatic, live) = if roll < 0.30 {
        ("False Start", true, 5u8, false, false)
    } else if roll < 0.55 {
        ("Offensive Holding", true, 10, false, true)
    } else if roll < 0.72 {
        ("Offside", false, 5, false, false)
    } else if roll < 0.87 {
        ("Defensive Holding", false, 5, true, true)
    } else if kind.is_pass() {
        ("Pass Interference", false, 15, true, true)
    } else {
        ("Unnecessary Roughness", false, 15, true, true)
    };
    let yards = if on_offense {
        yards.min(state.ball_on / 2)
    } else {
        yards.min(100u8.saturating_sub(state.ball_on) / 2)
    };
    result.yards = if on_offense {
        -i16::from(yards)
    } else {
        i16::from(yards)
    };
    result.elapsed = if live { elapsed_for(input, true, rng) } else { 0 };
    let side = if on_offense { input.offense } else { input.defense };
    result.description = format!(
        "PENALTY on {}: {name}, {yards} yards{}",
        side.abbreviation,
        if automatic { ", automatic first down" } else { "" }
    );
    result.penalty = Some(Penalty {
        name: name.to_string(),
        on_offense,
        yards,
        automatic_first_down: automatic,
    });
    result
}

fn resolve_run<R: RngCore + ?Sized>(input: &PlayInput<'_>, rng: &mut R) -> PlayResult {
    let state = input.state;
    let off = input.offense_units;
    let def = input.defense_units;
    let mut result = PlayResult::new(PlayKind::Run, state);
    let rusher = pick(input.offense, &[(Slot::Rb1, 0.75), (Slot::Rb2, 0.2), (Slot::Qb1, 0.05)], rng);
    let tackler = pick(
        input.defense,
        &[
            (Slot::Lb1, 0.3),
            (Slot::Lb2, 0.2),
            (Slot::Dt1, 0.15),
            (Slot::S1, 0.15),
            (Slot::Cb1, 0.1),
            (Slot::De1, 0.1),
        ],
        rng,
    );
    result.participants.rusher = rusher;
    result.participants.defender = tackler;

    let attack = PlayInput::blend(off, &[(Unit::Rushing, 0.6), (Unit::RunBlock, 0.4)]);
    let d = input.differential(attack, def.get(Unit::RunDefense));
    let security = input.differential(off.get(Unit::BallSecurity), def.get(Unit::RunDefense));

    let fumble_base = (0.011 * f64::from(input.weather.fumble)).min(0.2);
    if draw(rng) < shift_probability(fumble_base, -0.5 * security) {
        let yards = to_i16(range(rng, -2.0, 4.0));
        let spot = to_u8(i32::from(state.ball_on) + i32::from(yards)).clamp(1, 99);
        result.category = ResultCategory::Turnover;
        result.turnover = Some(TurnoverKind::Fumble);
        result.yards = yards;
        result.next_possession = Some(state.possession.other());
        result.next_ball_on = Some(100 - spot);
        result.elapsed = elapsed_for(input, true, rng);
        result.description = format!(
            "{} rush, FUMBLES, recovered by {}",
            name_of(input.offense, rusher),
            input.defense.abbreviation
        );
        return result;
    }

    let mean = 1.2f64.mul_add(d, 4.2);
    let mut yards = 3.5f64.mul_add(noise(rng), mean);
    if draw(rng) < shift_probability(0.035, 0.4 * d) {
        yards += range(rng, 12.0, 55.0);
    }
    let yards = to_i16(yards.max(-4.0));
    settle_yardage(&mut result, state, yards);
    result.elapsed = elapsed_for(input, false, rng);
    result.description = format!(
        "{} rush for {} yards{}",
        name_of(input.offense, rusher),
        result.yards,
        describe_gain(&result)
    );
    result
}

fn resolve_pass<R: RngCore + ?Sized>(
    kind: PlayKind,
    input: &PlayInput<'_>,
    rng: &mut R,
) -> PlayResult {
    let state = input.state;
    let off = input.offense_units;
    let def = input.defense_units;
    let deep = kind == PlayKind::DeepPass;
    let mut result = PlayResult::new(kind, state);
    let passer = input.offense.starter_id(Slot::Qb1);
    result.participants.passer = passer;

    let protection = input.differential(off.get(Unit::PassBlock), def.get(Unit::PassRush));
    let sack_base = if deep { 0.08 } else { 0.055 };
    if draw(rng) < shift_probability(sack_base, -0.6 * protection) {
        let rusher = pick(
            input.defense,
            &[(Slot::De1, 0.35), (Slot::De2, 0.3), (Slot::Dt1, 0.15), (Slot::Lb1, 0.2)],
            rng,
        );
        let loss = to_i16(-range(rng, 3.0, 10.0));
        result.sack = true;
        result.participants.defender = rusher;
        settle_yardage(&mut result, state, loss);
        result.elapsed = elapsed_for(input, false, rng);
        result.description = format!(
            "{} SACKED by {} for {} yards{}",
            name_of(input.offense, passer),
            name_of(input.defense, rusher),
            result.yards,
            describe_gain(&result)
        );
        return result;
    }

    let receiver = if deep {
        pick(input.offense, &[(Slot::Wr1, 0.45), (Slot::Wr2, 0.35), (Slot::Wr3, 0.1), (Slot::Te1, 0.1)], rng)
    } else {
        pick(
            input.offense,
            &[(Slot::Wr1, 0.3), (Slot::Wr2, 0.25), (Slot::Wr3, 0.15), (Slot::Te1, 0.18), (Slot::Rb1, 0.12)],
            rng,
        )
    };
    result.participants.receiver = receiver;
    let attack = PlayInput::blend(
        off,
        &[(Unit::Passing, 0.5), (Unit::Receiving, 0.35), (Unit::PassBlock, 0.15)],
    );
    let cover = PlayInput::blend(def, &[(Unit::Coverage, 0.75), (Unit::PassRush, 0.25)]);
    let d = input.differential(attack, cover);

    let int_base = if deep { 0.045 } else { 0.02 };
    if draw(rng) < shift_probability(int_base, -0.5 * d) {
        let hawk = pick(
            input.defense,
            &[(Slot::Cb1, 0.3), (Slot::Cb2, 0.25), (Slot::S1, 0.25), (Slot::S2, 0.2)],
            rng,
        );
        let air = if deep { range(rng, 18.0, 40.0) } else { range(rng, 4.0, 14.0) };
        let catch_spot = (f64::from(state.ball_on) + air).min(109.0);
        let returned = range(rng, 0.0, 30.0);
        result.category = ResultCategory::Turnover;
        result.turnover = Some(TurnoverKind::Interception);
        result.participants.defender = hawk;
        result.return_yards = to_i16(returned);
        result.next_possession = Some(state.possession.other());
        let from_goal = 100.0 - catch_spot;
        if from_goal <= 0.0 {
            result.next_ball_on = Some(PUNT_TOUCHBACK);
        } else if from_goal + returned >= 100.0 {
            result.category = ResultCategory::Touchdown;
            result.scorer = Some(state.possession.other());
        } else {
            result.next_ball_on = Some(to_u8(round_f64_to_i32(from_goal + returned)).clamp(1, 99));
        }
        result.elapsed = elapsed_for(input, true, rng);
        result.description = format!(
            "{} pass INTERCEPTED by {}{}",
            name_of(input.offense, passer),
            name_of(input.defense, hawk),
            if result.category == ResultCategory::Touchdown { ", returned for a TOUCHDOWN" } else { "" }
        );
        return result;
    }

    let (completion_base, depth, spread): (f64, f64, f64) = if deep { (0.36, 26.0, 8.0) } else { (0.67, 6.5, 3.0) };
    if draw(rng) >= shift_probability(completion_base, 0.6 * d) {
        result.category = if state.down >= 4 {
            ResultCategory::Turnover
        } else {
            ResultCategory::Normal
        };
        if state.down >= 4 {
            result.turnover = Some(TurnoverKind::Downs);
            result.next_possession = Some(state.possession.other());
            result.next_ball_on = Some(100 - state.ball_on.clamp(1, 99));
        }
        result.elapsed = elapsed_for(input, true, rng);
        result.description = format!(
            "{} pass incomplete intended for {}",
            name_of(input.offense, passer),
            name_of(input.offense, receiver)
        );
        return result;
    }

    let tackler = pick(
        input.defense,
        &[(Slot::Cb1, 0.3), (Slot::Cb2, 0.25), (Slot::S1, 0.2), (Slot::Lb1, 0.25)],
        rng,
    );
    result.completion = true;
    result.participants.defender = tackler;
    let mut yards = spread.mul_add(noise(rng), 0.9f64.mul_add(d, depth));
    if draw(rng) < shift_probability(0.04, 0.3 * d) {
        yards += range(rng, 12.0, 45.0);
    }
    let yards = to_i16(yards.max(-2.0));
    settle_yardage(&mut result, state, yards);
    result.elapsed = elapsed_for(input, false, rng);
    result.description = format!(
        "{} pass {} to {} for {} yards{}",
        name_of(input.offense, passer),
        if deep { "deep" } else { "short" },
        name_of(input.offense, receiver),
        result.yards,
        describe_gain(&result)
    );
    result
}

fn resolve_punt<R: RngCore + ?Sized>(input: &PlayInput<'_>, rng: &mut R) -> PlayResult {
    let state = input.state;
    let mut result = PlayResult::new(PlayKind::Punt, state);
    let punter = input.offense.starter_id(Slot::P);
    result.participants.kicker = punter;
    result.category = ResultCategory::Punt;
    result.next_possession = Some(state.possession.other());
    let skill = f64::from(input.offense_units.get(Unit::Punting) - 60.0) * 0.15;
    let net = (42.0 + skill + 2.5 * noise(rng)).clamp(35.0, 50.0);
    let landing = f64::from(state.ball_on) + net;
    result.elapsed = round_to_u16(range(rng, 6.0, 10.0));
    if landing >= 100.0 {
        result.yards = 100 - i16::from(state.ball_on);
        result.next_ball_on = Some(PUNT_TOUCHBACK);
        result.description = format!("{} punts into the end zone, touchback", name_of(input.offense, punter));
    } else {
        result.yards = to_i16(net);
        result.next_ball_on = Some(to_u8(100 - round_f64_to_i32(landing)).clamp(1, 99));
        result.description = format!("{} punts {} yards", name_of(input.offense, punter), result.yards);
    }
    result
}

fn resolve_field_goal<R: RngCore + ?Sized>(input: &PlayInput<'_>, rng: &mut R) -> PlayResult {
    let state = input.state;
    let mut result = PlayResult::new(PlayKind::FieldGoal, state);
    let kicker = input.offense.starter_id(Slot::K);
    result.participants.kicker = kicker;
    let distance = field_goal_distance(state.ball_on);
    let skill = (f64::from(input.offense_units.get(Unit::Kicking)) - 70.0) / RATING_SCALE;
    let p = shift_probability(field_goal_base(distance), 0.5 * skill);
    result.elapsed = round_to_u16(range(rng, 4.0, 6.0));
    if draw(rng) < p {
        result.category = ResultCategory::FieldGoalMade;
        result.scorer = Some(state.possession);
        result.description = format!("{} {distance} yard field goal is GOOD", name_of(input.offense, kicker));
    } else {
        let kick_spot = state.ball_on.saturating_sub(7);
        result.category = ResultCategory::FieldGoalMissed;
        result.next_possession = Some(state.possession.other());
        result.next_ball_on = Some((100 - kick_spot).clamp(PUNT_TOUCHBACK, 99));
        result.description = format!("{} {distance} yard field goal is NO GOOD", name_of(input.offense, kicker));
    }
    result
}

fn resolve_extra_point<R: RngCore + ?Sized>(input: &PlayInput<'_>, rng: &mut R) -> PlayResult {
    let state = input.state;
    let mut result = PlayResult::new(PlayKind::ExtraPoint, state);
    let kicker = input.offense.starter_id(Slot::K);
    result.participants.kicker = kicker;
    let skill = (f64::from(input.offense_units.get(Unit::Kicking)) - 70.0) / RATING_SCALE;
    let p = shift_probability(field_goal_base(field_goal_distance(EXTRA_POINT_SPOT)), 0.4 * skill)
        .min(0.995);
    if draw(rng) < p {
        result.category = ResultCategory::ExtraPointGood;
        result.scorer = Some(state.possession);
        result.description = format!("{} extra point is GOOD", name_of(input.offense, kicker));
    } else {
        result.category = ResultCategory::ExtraPointMissed;
        result.description = format!("{} extra point is NO GOOD", name_of(input.offense, kicker));
    }
    result
}

fn resolve_kickoff<R: RngCore + ?Sized>(input: &PlayInput<'_>, rng: &mut R) -> PlayResult {
    let state = input.state;
    let receiving = state.possession.other();
    let mut result = PlayResult::new(PlayKind::Kickoff, state);
    let kicker = input.offense.starter_id(Slot::K);
    result.participants.kicker = kicker;
    result.category = ResultCategory::Kickoff;
    result.next_possession = Some(receiving);

    let power = (f64::from(input.offense_units.get(Unit::Kicking)) - 70.0) / RATING_SCALE;
    if draw(rng) < shift_probability(0.55, 0.6 * power) {
        result.next_ball_on = Some(KICKOFF_TOUCHBACK);
        result.description = format!("{} kicks off, touchback", name_of(input.offense, kicker));
        return result;
    }
    let returner = pick(input.defense, &[(Slot::Rb2, 0.6), (Slot::Wr3, 0.4)], rng);
    result.participants.returner = returner;
    let lane = input.differential(
        input.defense_units.get(Unit::Rushing),
        input.offense_units.get(Unit::RunDefense),
    );
    result.elapsed = round_to_u16(range(rng, 5.0, 8.0));
    if draw(rng) < shift_probability(0.006, 0.5 * lane) {
        result.category = ResultCategory::Touchdown;
        result.scorer = Some(receiving);
        result.return_yards = 100;
        result.description = format!(
            "{} kicks off, {} returns it for a TOUCHDOWN",
            name_of(input.offense, kicker),
            name_of(input.defense, returner)
        );
        return result;
    }
    let spot = 2.0f64.mul_add(lane, 24.0) + 6.0 * noise(rng);
    let spot = to_u8(round_f64_to_i32(spot)).clamp(5, 50);
    result.return_yards = i16::from(spot);
    result.next_ball_on = Some(spot);
    result.description = format!(
        "{} kicks off, {} returns to the {}",
        name_of(input.offense, kicker),
        name_of(input.defense, returner),
        spot
    );
    result
}

fn resolve_onside<R: RngCore + ?Sized>(input: &PlayInput<'_>, rng: &mut R) -> PlayResult {
    let state = input.state;
    let mut result = PlayResult::new(PlayKind::Onside, state);
    let kicker = input.offense.starter_id(Slot::K);
    result.participants.kicker = kicker;
    result.elapsed = round_to_u16(range(rng, 3.0, 5.0));
    let hands = input.differential(
        input.offense_units.get(Unit::Coverage),
        input.defense_units.get(Unit::Receiving),
    );
    if draw(rng) < shift_probability(0.10, 0.3 * hands) {
        result.category = ResultCategory::Turnover;
        result.turnover = Some(TurnoverKind::OnsideRecovery);
        result.next_possession = Some(state.possession);
        result.next_ball_on = Some(100 - ONSIDE_SPOT);
        result.description = format!(
            "{} onside kick RECOVERED by {}",
            name_of(input.offense, kicker),
            input.offense.abbreviation
        );
    } else {
        result.category = ResultCategory::Kickoff;
        result.next_possession = Some(state.possession.other());
        result.next_ball_on = Some(ONSIDE_SPOT);
        result.description = format!(
            "{} onside kick recovered by {}",
            name_of(input.offense, kicker),
            input.defense.abbreviation
        );
    }
    result
}

fn resolve_kneel(input: &PlayInput<'_>) -> PlayResult {
    let state = input.state;
    let mut result = PlayResult::new(PlayKind::Kneel, state);
    result.participants.passer = input.offense.starter_id(Slot::Qb1);
    settle_yardage(&mut result, state, -1);
    result.elapsed = 40;
    result.description = format!("{} kneels", name_of(input.offense, result.participants.passer));
    result
}
