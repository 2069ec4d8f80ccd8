//! Re-seeding single-elimination bracket.
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::roster::{Conference, TeamId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeededTeam {
    pub team: TeamId,
    pub seed: u8,
    pub conference: Conference,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayoffMatchup {
    pub id: u32,
    /// `None` for the championship.
    pub conference: Option<Conference>,
    pub home: SeededTeam,
    pub away: SeededTeam,
    pub neutral_site: bool,
    pub home_score: Option<u16>,
    pub away_score: Option<u16>,
    pub winner: Option<TeamId>,
}

impl PlayoffMatchup {
    #[must_use]
    pub fn loser(&self) -> Option<TeamId> {
        self.winner.map(|w| if w == self.home.team { self.away.team } else { self.home.team })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayoffRound {
    pub number: u8,
    pub name: String,
    pub matchups: Vec<PlayoffMatchup>,
    pub byes: Vec<SeededTeam>,
}

impl PlayoffRound {
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.matchups.iter().all(|m| m.winner.is_some())
    }

    #[must_use]
    pub fn is_championship(&self) -> bool {
        self.matchups.iter().any(|m| m.conference.is_none())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayoffBracket {
    pub seeds: BTreeMap<Conference, Vec<SeededTeam>>,
    pub alive: BTreeMap<Conference, Vec<SeededTeam>>,
    pub rounds: Vec<PlayoffRound>,
    pub champion: Option<TeamId>,
    /// Id handed to the next matchup.
    pub next_id: u32,
}

fn round_name(remaining: usize, first: bool) -> &'static str {
    match remaining {
        1 => "Championship",
        2 => "Conference Championship",
        4 if !first => "Divisional",
        _ => "Wild Card",
    }
}

impl PlayoffBracket {
    /// Seed lists are best first. `first_id` numbers the matchups.
    #[must_use]
    pub fn new(east: &[TeamId], west: &[TeamId], first_id: u32) -> Self {
        let seeds: BTreeMap<Conference, Vec<SeededTeam>> = [(Conference::East, east), (Conference::West, west)]
            .into_iter()
            .map(|(conference, teams)| {
                let seeded = teams
                    .iter()
                    .enumerate()
                    .map(|(idx, team)| SeededTeam {
                        team: *team,
                        seed: u8::try_from(idx + 1).unwrap_or(u8::MAX),
                        conference,
                    })
                    .collect();
                (conference, seeded)
            })
            .collect();
        Self {
            alive: seeds.clone(),
            seeds,
            rounds: Vec::new(),
            champion: None,
            next_id: first_id,
        }
    }

    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.champion.is_some()
    }

    #[must_use]
    pub fn current_round(&self) -> Option<&PlayoffRound> {
        self.rounds.last()
    }

    fn take_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id = self.next_id.saturating_add(1);
        id
    }

    /// Build the next round once the previous one is decided. Returns `None` when the
    /// bracket is complete or the current round still has games to play.
    pub fn advance(&mut self) -> Option<&PlayoffRound> {
        if self.champion.is_some() || self.rounds.last().is_some_and(|r| !r.is_complete()) {
            return None;
        }
        let first = self.rounds.is_empty();
        let number = u8::try_from(self.rounds.len() + 1).unwrap_or(u8::MAX);
        let remaining = self.alive.values().map(Vec::len).max().unwrap_or(0);
        let mut matchups = Vec::new();
        let mut byes = Vec::new();

        if remaining <= 1 {
            let east = self.alive.get(&Conference::East).and_then(|v| v.first()).copied();
            let west = self.alive.get(&Conference::West).and_then(|v| v.first()).copied();
            let (Some(east), Some(west)) = (east, west) else {
                return None;
            };
            let (home, away) = if west.seed < east.seed { (west, east) } else { (east, west) };
            matchups.push(PlayoffMatchup {
                id: self.take_id(),
                conference: None,
                home,
                away,
                neutral_site: true,
                home_score: None,
                away_score: None,
                winner: None,
            });
        } else {
            for conference in Conference::ALL {
                let mut field = self.alive.get(&conference).cloned().unwrap_or_default();
                field.sort_by_key(|s| s.seed);
                let target = field.len().next_power_of_two();
                let resting = if first { target - field.len() } else { 0 };
                byes.extend(field.iter().take(resting).copied());
                let playing = &field[resting..];
                let half = playing.len() / 2;
                for idx in 0..half {
                    let (home, away) = (playing[idx], playing[playing.len() - 1 - idx]);
                    matchups.push(PlayoffMatchup {
                        id: self.take_id(),
                        conference: Some(conference),
                        home,
                        away,
                        neutral_site: false,
                        home_score: None,
                        away_score: None,
                        winner: None,
                    });
                }
            }
        }

        self.rounds.push(PlayoffRound {
            number,
            name: round_name(remaining, first).to_string(),
            matchups,
            byes,
        });
        self.rounds.last()
    }

    /// Record a decided matchup. Returns `false` for an unknown id or a winner who
    /// did not play in it.
    pub fn record_result(&mut self, id: u32, home_score: u16, away_score: u16, winner: TeamId) -> bool {
        let Some(round) = self.rounds.last_mut() else {
            return false;
        };
        let Some(matchup) = round.matchups.iter_mut().find(|m| m.id == id) else {
            return false;
        };
        if winner != matchup.home.team && winner != matchup.away.team {
            return false;
        }
        matchup.home_score = Some(home_score);
        matchup.away_score = Some(away_score);
        matchup.winner = Some(winner);
        let loser = matchup.loser();
        let championship = matchup.conference.is_none();
        if championship {
            self.champion = Some(winner);
        }
        if let Some(loser) = loser {
            for field in self.alive.values_mut() {
                field.retain(|s| s.team != loser);
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(range: std::ops::Range<u16>) -> Vec<TeamId> {
        range.map(TeamId).collect()
    }

    fn play_round(bracket: &mut PlayoffBracket) {
        let games: Vec<(u32, TeamId)> = bracket
            .current_round()
            .unwrap()
            .matchups
            .iter()
            .map(|m| (m.id, m.home.team))
            .collect();
        for (id, winner) in games {
            assert!(bracket.record_result(id, 24, 10, winner));
        }
    }

    #[test]
    fn seven_team_field_gives_the_top_seed_a_bye() {
        let mut bracket = PlayoffBracket::new(&ids(1..8), &ids(17..24), 300);
        let round = bracket.advance().unwrap();
        assert_eq!(round.name, "Wild Card");
        assert_eq!(round.matchups.len(), 6);
        assert_eq!(round.byes.len(), 2);
        let first = &round.matchups[0];
        assert_eq!((first.home.seed, first.away.seed), (2, 7));
        assert_eq!(first.id, 300);
    }

    #[test]
    fn rounds_reseed_best_against_worst() {
        let mut bracket = PlayoffBracket::new(&ids(1..8), &ids(17..24), 1);
        bracket.advance();
        // Lower seeds win everything in the wild-card round.
        let upsets: Vec<(u32, TeamId)> = bracket
            .current_round()
            .unwrap()
            .matchups
            .iter()
            .map(|m| (m.id, m.away.team))
            .collect();
        for (id, winner) in upsets {
            bracket.record_result(id, 10, 13, winner);
        }
        let round = bracket.advance().unwrap();
        assert_eq!(round.name, "Divisional");
        let east: Vec<(u8, u8)> = round
            .matchups
            .iter()
            .filter(|m| m.conference == Some(Conference::East))
            .map(|m| (m.home.seed, m.away.seed))
            .collect();
        assert_eq!(east, vec![(1, 7), (5, 6)]);
    }

    #[test]
    fn bracket_runs_to_a_champion() {
        let mut bracket = PlayoffBracket::new(&ids(1..8), &ids(17..24), 1);
        let mut rounds = 0;
        while bracket.advance().is_some() {
            play_round(&mut bracket);
            rounds += 1;
        }
        assert_eq!(rounds, 4);
        let last = bracket.current_round().unwrap();
        assert!(last.is_championship());
        assert!(last.matchups[0].neutral_site);
        assert_eq!(bracket.champion, Some(last.matchups[0].winner.unwrap()));
        assert_eq!(bracket.champion, Some(TeamId(1)));
    }

    #[test]
    fn unfinished_round_blocks_the_next() {
        let mut bracket = PlayoffBracket::new(&ids(1..5), &ids(17..21), 1);
        assert!(bracket.advance().is_some());
        assert!(bracket.advance().is_none());
        assert!(!bracket.record_result(999, 1, 0, TeamId(1)));
        assert!(!bracket.record_result(1, 1, 0, TeamId(30)));
    }
}
