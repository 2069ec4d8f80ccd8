//! Box score accumulation.
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::resolver::{PlayKind, PlayResult, ResultCategory, TurnoverKind};
use crate::roster::{PlayerId, TeamId};
use crate::state::Side;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamGameStats {
    pub points: u16,
    pub plays: u16,
    pub first_downs: u16,
    pub total_yards: i32,
    pub passing_yards: i32,
    pub rushing_yards: i32,
    pub pass_attempts: u16,
    pub completions: u16,
    pub rush_attempts: u16,
    pub sacks_allowed: u16,
    pub interceptions_thrown: u16,
    pub fumbles_lost: u16,
    pub penalties: u16,
    pub penalty_yards: u16,
    pub punts: u16,
    pub field_goals_made: u16,
    pub field_goals_attempted: u16,
    pub extra_points_made: u16,
    pub extra_points_attempted: u16,
    pub third_down_attempts: u16,
    pub third_down_conversions: u16,
    pub fourth_down_attempts: u16,
    pub fourth_down_conversions: u16,
    /// Seconds with the ball.
    pub time_of_possession: u32,
}

impl TeamGameStats {
    #[must_use]
    pub const fn turnovers(&self) -> u16 {
        self.interceptions_thrown.saturating_add(self.fumbles_lost)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerGameStats {
    pub team: Option<TeamId>,
    pub pass_attempts: u16,
    pub completions: u16,
    pub passing_yards: i32,
    pub passing_touchdowns: u16,
    pub interceptions_thrown: u16,
    pub sacked: u16,
    pub rush_attempts: u16,
    pub rushing_yards: i32,
    pub rushing_touchdowns: u16,
    pub fumbles_lost: u16,
    pub targets: u16,
    pub receptions: u16,
    pub receiving_yards: i32,
    pub receiving_touchdowns: u16,
    pub tackles: u16,
    pub sacks: u16,
    pub interceptions: u16,
    pub defensive_touchdowns: u16,
    pub field_goals_made: u16,
    pub field_goals_attempted: u16,
    pub extra_points_made: u16,
    pub extra_points_attempted: u16,
    pub punts: u16,
    pub punt_yards: i32,
    pub kick_returns: u16,
    pub return_yards: i32,
}

/// Team and player totals for one game.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoxScore {
    pub home: TeamGameStats,
    pub away: TeamGameStats,
    pub players: BTreeMap<PlayerId, PlayerGameStats>,
}

fn bump(value: &mut u16) {
    *value = value.saturating_add(1);
}

impl BoxScore {
    #[must_use]
    pub const fn team(&self, side: Side) -> &TeamGameStats {
        match side {
            Side::Home => &self.home,
            Side::Away => &self.away,
        }
    }

    const fn team_mut(&mut self, side: Side) -> &mut TeamGameStats {
        match side {
            Side::Home => &mut self.home,
            Side::Away => &mut self.away,
        }
    }

    fn player(&mut self, id: Option<PlayerId>, team: TeamId) -> Option<&mut PlayerGameStats> {
        id.map(|id| {
            let entry = self.players.entry(id).or_default();
            if entry.team.is_none() {
                entry.team = Some(team);
            }
            entry
        })
    }

    /// Fold one play into the totals. `teams` maps each side to its team id.
    pub fn record(&mut self, play: &PlayResult, teams: (TeamId, TeamId)) {
        let offense = play.offense;
        let (off_id, def_id) = match offense {
            Side::Home => teams,
            Side::Away => (teams.1, teams.0),
        };
        let who = play.participants;
        let yards = i32::from(play.yards);
        let touchdown = play.category == ResultCategory::Touchdown;
        let offensive_score = touchdown && play.scorer == Some(offense);

        {
            let team = self.team_mut(offense);
            team.time_of_possession = team.time_of_possession.saturating_add(u32::from(play.elapsed));
            if play.kind.is_scrimmage() && play.category != ResultCategory::Penalty {
                bump(&mut team.plays);
                team.total_yards += yards;
                match play.before.down {
                    3 => bump(&mut team.third_down_attempts),
                    4 => bump(&mut team.fourth_down_attempts),
                    _ => {}
                }
                let converted = matches!(play.category, ResultCategory::FirstDown) || offensive_score;
                if converted {
                    bump(&mut team.first_downs);
                    match play.before.down {
                        3 => bump(&mut team.third_down_conversions),
                        4 => bump(&mut team.fourth_down_conversions),
                        _ => {}
                    }
                }
            }
        }

        if let Some(penalty) = &play.penalty {
            let side = if penalty.on_offense { offense } else { offense.other() };
            let team = self.team_mut(side);
            bump(&mut team.penalties);
            team.penalty_yards = team.penalty_yards.saturating_add(u16::from(penalty.yards));
            if penalty.automatic_first_down {
                bump(&mut self.team_mut(offense).first_downs);
            }
            return;
        }

        match play.kind {
            PlayKind::ShortPass | PlayKind::DeepPass => self.record_pass(play, off_id, def_id),
            PlayKind::Run | PlayKind::Kneel => {
                let team = self.team_mut(offense);
                bump(&mut team.rush_attempts);
                team.rushing_yards += yards;
                if let Some(p) = self.player(who.rusher.or(who.passer), off_id) {
                    bump(&mut p.rush_attempts);
                    p.rushing_yards += yards;
                    if offensive_score {
                        bump(&mut p.rushing_touchdowns);
                    }
                    if play.turnover == Some(TurnoverKind::Fumble) {
                        bump(&mut p.fumbles_lost);
                    }
                }
                if play.turnover == Some(TurnoverKind::Fumble) {
                    bump(&mut self.team_mut(offense).fumbles_lost);
                }
                if let Some(p) = self.player(who.defender, def_id) {
                    bump(&mut p.tackles);
                }
            }
            PlayKind::Punt => {
                bump(&mut self.team_mut(offense).punts);
                if let Some(p) = self.player(who.kicker, off_id) {
                    bump(&mut p.punts);
                    p.punt_yards += yards;
                }
            }
            PlayKind::FieldGoal => {
                let made = play.category == ResultCategory::FieldGoalMade;
                let team = self.team_mut(offense);
                bump(&mut team.field_goals_attempted);
                if made {
                    bump(&mut team.field_goals_made);
                }
                if let Some(p) = self.player(who.kicker, off_id) {
                    bump(&mut p.field_goals_attempted);
                    if made {
                        bump(&mut p.field_goals_made);
                    }
                }
            }
            PlayKind::ExtraPoint => {
                let made = play.category == ResultCategory::ExtraPointGood;
                let team = self.team_mut(offense);
                bump(&mut team.extra_points_attempted);
                if made {
                    bump(&mut team.extra_points_made);
                }
                if let Some(p) = self.player(who.kicker, off_id) {
                    bump(&mut p.extra_points_attempted);
                    if made {
                        bump(&mut p.extra_points_made);
                    }
                }
            }
            PlayKind::Kickoff | PlayKind::Onside => {
                if let Some(p) = self.player(who.returner, def_id) {
                    bump(&mut p.kick_returns);
                    p.return_yards += i32::from(play.return_yards);
                    if touchdown {
                        bump(&mut p.defensive_touchdowns);
                    }
                }
            }
        }
    }

    fn record_pass(&mut self, play: &PlayResult, off_id: TeamId, def_id: TeamId) {
        let offense = play.offense;
        let who = play.participants;
        let yards = i32::from(play.yards);
        let offensive_score =
            play.category == ResultCategory::Touchdown && play.scorer == Some(offense);
        let intercepted = play.turnover == Some(TurnoverKind::Interception);

        if play.sack {
            let team = self.team_mut(offense);
            bump(&mut team.sacks_allowed);
            team.passing_yards += yards;
            if let Some(p) = self.player(who.passer, off_id) {
                bump(&mut p.sacked);
            }
            if let Some(p) = self.player(who.defender, def_id) {
                bump(&mut p.sacks);
                bump(&mut p.tackles);
            }
            return;
        }

        let team = self.team_mut(offense);
        bump(&mut team.pass_attempts);
        if play.completion {
            bump(&mut team.completions);
            team.passing_yards += yards;
        }
        if intercepted {
            bump(&mut team.interceptions_thrown);
        }
        if let Some(p) = self.player(who.passer, off_id) {
            bump(&mut p.pass_attempts);
            if play.completion {
                bump(&mut p.completions);
                p.passing_yards += yards;
                if offensive_score {
                    bump(&mut p.passing_touchdowns);
                }
            }
            if intercepted {
                bump(&mut p.interceptions_thrown);
            }
        }
        if let Some(p) = self.player(who.receiver, off_id) {
            bump(&mut p.targets);
            if play.completion {
                bump(&mut p.receptions);
                p.receiving_yards += yards;
                if offensive_score {
                    bump(&mut p.receiving_touchdowns);
                }
            }
        }
        if let Some(p) = self.player(who.defender, def_id) {
            if intercepted {
                bump(&mut p.interceptions);
                if play.category == ResultCategory::Touchdown {
                    bump(&mut p.defensive_touchdowns);
                }
            } else if play.completion {
                bump(&mut p.tackles);
            }
        }
    }

    /// Set the final score on both team lines.
    pub const fn set_points(&mut self, home: u16, away: u16) {
        self.home.points = home;
        self.away.points = away;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::{DownAndDistance, Participants, Penalty};

    fn base(kind: PlayKind, category: ResultCategory, yards: i16) -> PlayResult {
        PlayResult {
            kind,
            category,
            offense: Side::Home,
            yards,
            elapsed: 30,
            description: String::new(),
            before: DownAndDistance {
                quarter: 1,
                clock: 900,
                down: 3,
                yards_to_go: 5,
                ball_on: 40,
            },
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

    const TEAMS: (TeamId, TeamId) = (TeamId(1), TeamId(2));

    #[test]
    fn completed_pass_credits_passer_receiver_and_conversion() {
        let mut box_score = BoxScore::default();
        let mut play = base(PlayKind::ShortPass, ResultCategory::FirstDown, 12);
        play.completion = true;
        play.participants.passer = Some(PlayerId(10));
        play.participants.receiver = Some(PlayerId(11));
        play.participants.defender = Some(PlayerId(20));
        box_score.record(&play, TEAMS);
        assert_eq!(box_score.home.completions, 1);
        assert_eq!(box_score.home.passing_yards, 12);
        assert_eq!(box_score.home.third_down_conversions, 1);
        assert_eq!(box_score.players[&PlayerId(11)].receiving_yards, 12);
        assert_eq!(box_score.players[&PlayerId(11)].team, Some(TeamId(1)));
        assert_eq!(box_score.players[&PlayerId(20)].team, Some(TeamId(2)));
    }

    #[test]
    fn away_offense_lands_on_the_away_line() {
        let mut box_score = BoxScore::default();
        let mut play = base(PlayKind::Run, ResultCategory::Normal, 4);
        play.offense = Side::Away;
        play.participants.rusher = Some(PlayerId(30));
        box_score.record(&play, TEAMS);
        assert_eq!(box_score.away.rushing_yards, 4);
        assert_eq!(box_score.home.rush_attempts, 0);
        assert_eq!(box_score.players[&PlayerId(30)].team, Some(TeamId(2)));
    }

    #[test]
    fn penalties_count_against_the_offending_side() {
        let mut box_score = BoxScore::default();
        let mut play = base(PlayKind::ShortPass, ResultCategory::Penalty, 15);
        play.penalty = Some(Penalty {
            name: "Pass Interference".into(),
            on_offense: false,
            yards: 15,
            automatic_first_down: true,
        });
        box_score.record(&play, TEAMS);
        assert_eq!(box_score.away.penalty_yards, 15);
        assert_eq!(box_score.home.first_downs, 1);
        assert_eq!(box_score.home.pass_attempts, 0);
    }

    #[test]
    fn interception_counts_as_a_turnover() {
        let mut box_score = BoxScore::default();
        let mut play = base(PlayKind::DeepPass, ResultCategory::Turnover, 0);
        play.turnover = Some(TurnoverKind::Interception);
        play.participants.defender = Some(PlayerId(44));
        box_score.record(&play, TEAMS);
        assert_eq!(box_score.home.turnovers(), 1);
        assert_eq!(box_score.players[&PlayerId(44)].interceptions, 1);
    }
}
