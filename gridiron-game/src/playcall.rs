//! Situational play calling.
use rand::RngCore;

use crate::adapter::Tendencies;
use crate::numbers::unit_from_u32;
use crate::resolver::{PlayKind, field_goal_distance};
use crate::state::{GamePhase, GameState};

/// Longest field goal a coach will try.
const MAX_FIELD_GOAL_ATTEMPT: u8 = 57;
/// Seconds per remaining down a kneel burns.
const KNEEL_SECONDS: u16 = 40;
/// Nearest spot to our own goal line the offense will kneel from.
const MIN_KNEEL_SPOT: u8 = 3;
const TWO_MINUTES: u32 = 120;
const LATE_GAME: u16 = 300;

fn draw<R: RngCore + ?Sized>(rng: &mut R) -> f64 {
    unit_from_u32(rng.next_u32())
}

/// Choose the offense's play for the current state.
pub fn choose_play<R: RngCore + ?Sized>(
    state: &GameState,
    tendencies: &Tendencies,
    rng: &mut R,
) -> PlayKind {
    match state.phase {
        GamePhase::Kickoff => choose_kick(state, rng),
        GamePhase::ExtraPoint => PlayKind::ExtraPoint,
        _ => choose_scrimmage(state, tendencies, rng),
    }
}

fn choose_kick<R: RngCore + ?Sized>(state: &GameState, rng: &mut R) -> PlayKind {
    let deficit = -state.score_diff(state.kicking_team());
    let desperate = state.quarter >= 4 && !state.is_overtime() && state.clock <= LATE_GAME;
    if desperate && (1..=16).contains(&deficit) && draw(rng) < 0.8 {
        PlayKind::Onside
    } else {
        PlayKind::Kickoff
    }
}

fn in_field_goal_range(state: &GameState) -> bool {
    field_goal_distance(state.ball_on) <= MAX_FIELD_GOAL_ATTEMPT
}

fn choose_scrimmage<R: RngCore + ?Sized>(
    state: &GameState,
    tendencies: &Tendencies,
    rng: &mut R,
) -> PlayKind {
    let margin = state.score_diff(state.possession);
    let late = state.quarter == 4 && state.clock <= LATE_GAME;
    let remaining_downs = u16::from(5u8.saturating_sub(state.down));

    // Victory formation.
    if state.quarter == 4
        && margin > 0
        && state.clock <= KNEEL_SECONDS * remaining_downs
        && state.ball_on >= MIN_KNEEL_SPOT
    {
        return PlayKind::Kneel;
    }

    // Last snap of the half: take the points if they are there.
    let last_snap = matches!(state.quarter, 2 | 4) && state.clock <= 15;
    if last_snap && in_field_goal_range(state) && (state.quarter == 2 || (-3..=0).contains(&margin))
    {
        return PlayKind::FieldGoal;
    }

    if state.down == 4 {
        if let Some(kind) = fourth_down(state, tendencies, margin, late, rng) {
            return kind;
        }
    }

    let ytg = state.yards_to_go;
    let two_minute = state.half_seconds_left() <= TWO_MINUTES && margin <= 0;
    let mut pass = tendencies.pass_ratio;
    let mut deep = tendencies.deep_share;
    if state.down >= 3 && ytg >= 7 {
        pass += 0.3;
        deep += 0.15;
    }
    if ytg <= 2 {
        pass -= 0.3;
    }
    if two_minute {
        pass += 0.25;
        deep += 0.1;
    }
    if late && margin > 0 {
        pass -= 0.3;
    }
    if state.ball_on >= 80 {
        deep = 0.05;
    }
    let pass = pass.clamp(0.1, 0.95);
    let deep = deep.clamp(0.0, 0.6);

    if draw(rng) < pass {
        if draw(rng) < deep {
            PlayKind::DeepPass
        } else {
            PlayKind::ShortPass
        }
    } else {
        PlayKind::Run
    }
}

/// Go, kick, or punt. `None` means go for it.
fn fourth_down<R: RngCore + ?Sized>(
    state: &GameState,
    tendencies: &Tendencies,
    margin: i16,
    late: bool,
    rng: &mut R,
) -> Option<PlayKind> {
    let ytg = state.yards_to_go;
    let in_range = in_field_goal_range(state);
    if late && margin < 0 {
        // A field goal only helps when it ties or wins.
        if in_range && margin >= -3 {
            return Some(PlayKind::FieldGoal);
        }
        return None;
    }
    let short = ytg <= 2;
    let mut go = if short && state.ball_on >= 40 { 0.35 } else { 0.02 };
    if short && state.ball_on >= 60 {
        go = 0.25;
    }
    go += tendencies.fourth_down_aggression;
    if draw(rng) < go {
        return None;
    }
    if in_range {
        Some(PlayKind::FieldGoal)
    } else {
        Some(PlayKind::Punt)
    }
}
