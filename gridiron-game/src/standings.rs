//! Standings, tiebreakers, seeding, and clinch status.
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use crate::error::SeasonError;
use crate::roster::{Conference, Division, TeamId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Record {
    pub wins: u16,
    pub losses: u16,
    pub ties: u16,
}

impl Record {
    #[must_use]
    pub const fn games(&self) -> u16 {
        self.wins + self.losses + self.ties
    }

    /// Ties count as half a win. An empty record is .500.
    #[must_use]
    pub fn win_pct(&self) -> f64 {
        let games = self.games();
        if games == 0 {
            return 0.5;
        }
        (f64::from(self.wins) + f64::from(self.ties) * 0.5) / f64::from(games)
    }

    /// Standings points: two per win, one per tie.
    #[must_use]
    pub const fn points(&self) -> u32 {
        self.wins as u32 * 2 + self.ties as u32
    }

    fn add(&mut self, result: Outcome) {
        match result {
            Outcome::Win => self.wins += 1,
            Outcome::Loss => self.losses += 1,
            Outcome::Tie => self.ties += 1,
        }
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.ties > 0 {
            write!(f, "{}-{}-{}", self.wins, self.losses, self.ties)
        } else {
            write!(f, "{}-{}", self.wins, self.losses)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Win,
    Loss,
    Tie,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Streak {
    #[default]
    None,
    Won(u8),
    Lost(u8),
    Tied(u8),
}

impl Streak {
    const fn extend(self, result: Outcome) -> Self {
        match (self, result) {
            (Self::Won(n), Outcome::Win) => Self::Won(n.saturating_add(1)),
            (Self::Lost(n), Outcome::Loss) => Self::Lost(n.saturating_add(1)),
            (Self::Tied(n), Outcome::Tie) => Self::Tied(n.saturating_add(1)),
            (_, Outcome::Win) => Self::Won(1),
            (_, Outcome::Loss) => Self::Lost(1),
            (_, Outcome::Tie) => Self::Tied(1),
        }
    }
}

impl fmt::Display for Streak {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("-"),
            Self::Won(n) => write!(f, "W{n}"),
            Self::Lost(n) => write!(f, "L{n}"),
            Self::Tied(n) => write!(f, "T{n}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClinchStatus {
    Eliminated,
    #[default]
    Alive,
    Playoffs,
    Division,
    TopSeed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamStanding {
    pub team: TeamId,
    pub conference: Conference,
    pub division: Division,
    pub overall: Record,
    pub home: Record,
    pub away: Record,
    pub division_record: Record,
    pub conference_record: Record,
    pub points_for: u32,
    pub points_against: u32,
    pub head_to_head: BTreeMap<TeamId, Record>,
    pub streak: Streak,
    pub division_rank: u8,
    pub conference_rank: u8,
    pub clinch: ClinchStatus,
    pub seed: Option<u8>,
}

impl TeamStanding {
    fn new(team: TeamId, conference: Conference, division: Division) -> Self {
        Self {
            team,
            conference,
            division,
            overall: Record::default(),
            home: Record::default(),
            away: Record::default(),
            division_record: Record::default(),
            conference_record: Record::default(),
            points_for: 0,
            points_against: 0,
            head_to_head: BTreeMap::new(),
            streak: Streak::None,
            division_rank: 0,
            conference_rank: 0,
            clinch: ClinchStatus::Alive,
            seed: None,
        }
    }

    #[must_use]
    pub fn point_differential(&self) -> i64 {
        i64::from(self.points_for) - i64::from(self.points_against)
    }

    /// Combined record against `opponents`.
    #[must_use]
    pub fn record_against(&self, opponents: &[TeamId]) -> Record {
        opponents
            .iter()
            .filter_map(|o| self.head_to_head.get(o))
            .fold(Record::default(), |acc, r| Record {
                wins: acc.wins + r.wins,
                losses: acc.losses + r.losses,
                ties: acc.ties + r.ties,
            })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Standings {
    pub games_per_team: u8,
    pub teams: BTreeMap<TeamId, TeamStanding>,
}

impl Standings {
    pub fn new(
        teams: impl IntoIterator<Item = (TeamId, Conference, Division)>,
        games_per_team: u8,
    ) -> Self {
        let teams = teams
            .into_iter()
            .map(|(id, c, d)| (id, TeamStanding::new(id, c, d)))
            .collect();
        Self { games_per_team, teams }
    }

    #[must_use]
    pub fn get(&self, team: TeamId) -> Option<&TeamStanding> {
        self.teams.get(&team)
    }

    /// Record a final score.
    ///
    /// # Errors
    ///
    /// Returns `SeasonError::UnknownTeam` if either side is not in the standings.
    pub fn record_game(
        &mut self,
        home: TeamId,
        away: TeamId,
        home_score: u16,
        away_score: u16,
    ) -> Result<(), SeasonError> {
        let (home_conf, home_div) = self.locate(home)?;
        let (away_conf, away_div) = self.locate(away)?;
        let home_result = match home_score.cmp(&away_score) {
            Ordering::Greater => Outcome::Win,
            Ordering::Less => Outcome::Loss,
            Ordering::Equal => Outcome::Tie,
        };
        let away_result = match home_result {
            Outcome::Win => Outcome::Loss,
            Outcome::Loss => Outcome::Win,
            Outcome::Tie => Outcome::Tie,
        };
        let same_conf = home_conf == away_conf;
        let same_div = same_conf && home_div == away_div;
        for (team, opponent, result, scored, allowed, at_home) in [
            (home, away, home_result, home_score, away_score, true),
            (away, home, away_result, away_score, home_score, false),
        ] {
            let Some(row) = self.teams.get_mut(&team) else {
                return Err(SeasonError::UnknownTeam(team));
            };
            row.overall.add(result);
            if at_home {
                row.home.add(result);
            } else {
                row.away.add(result);
            }
            if same_conf {
                row.conference_record.add(result);
            }
            if same_div {
                row.division_record.add(result);
            }
            row.head_to_head.entry(opponent).or_default().add(result);
            row.points_for += u32::from(scored);
            row.points_against += u32::from(allowed);
            row.streak = row.streak.extend(result);
        }
        Ok(())
    }

    fn locate(&self, team: TeamId) -> Result<(Conference, Division), SeasonError> {
        self.teams
            .get(&team)
            .map(|s| (s.conference, s.division))
            .ok_or(SeasonError::UnknownTeam(team))
    }

    #[must_use]
    pub fn games_remaining(&self, team: TeamId) -> u16 {
        self.get(team).map_or(0, |s| {
            u16::from(self.games_per_team).saturating_sub(s.overall.games())
        })
    }

    /// Teams of a division, best first.
    #[must_use]
    pub fn division_order(&self, conference: Conference, division: Division) -> Vec<TeamId> {
        let members: Vec<TeamId> = self
            .teams
            .values()
            .filter(|s| s.conference == conference && s.division == division)
            .map(|s| s.team)
            .collect();
        self.rank(members, true)
    }

    /// Conference teams in seeding order: division winners first, then everyone else.
    #[must_use]
    pub fn conference_order(&self, conference: Conference) -> Vec<TeamId> {
        let mut winners = Vec::new();
        let mut rest = Vec::new();
        for division in Division::ALL {
            let order = self.division_order(conference, division);
            let mut iter = order.into_iter();
            winners.extend(iter.next());
            rest.extend(iter);
        }
        let mut order = self.rank(winners, false);
        order.extend(self.rank(rest, false));
        order
    }

    /// Playoff seeds for a conference, seed 1 first.
    #[must_use]
    pub fn seeds(&self, conference: Conference, playoff_teams: u8) -> Vec<TeamId> {
        let mut order = self.conference_order(conference);
        order.truncate(usize::from(playoff_teams));
        order
    }

    /// Sort `teams` by win percentage, breaking ties within each tied group.
    fn rank(&self, teams: Vec<TeamId>, division: bool) -> Vec<TeamId> {
        let mut rows: Vec<&TeamStanding> = teams.iter().filter_map(|t| self.teams.get(t)).collect();
        rows.sort_by(|a, b| b.overall.win_pct().total_cmp(&a.overall.win_pct()).then(a.team.cmp(&b.team)));
        let mut ranked = Vec::with_capacity(rows.len());
        let mut start = 0;
        while start < rows.len() {
            let pct = rows[start].overall.win_pct();
            let end = rows[start..]
                .iter()
                .position(|r| r.overall.win_pct().total_cmp(&pct) != Ordering::Equal)
                .map_or(rows.len(), |offset| start + offset);
            let group: Vec<TeamId> = rows[start..end].iter().map(|r| r.team).collect();
            let mut tied = rows[start..end].to_vec();
            tied.sort_by(|a, b| Self::tiebreak(a, b, &group, division));
            ranked.extend(tied.iter().map(|r| r.team));
            start = end;
        }
        ranked
    }

    fn tiebreak(a: &TeamStanding, b: &TeamStanding, group: &[TeamId], division: bool) -> Ordering {
        let h2h = |s: &TeamStanding| {
            let others: Vec<TeamId> = group.iter().copied().filter(|t| *t != s.team).collect();
            s.record_against(&others).win_pct()
        };
        let by_division = if division {
            b.division_record.win_pct().total_cmp(&a.division_record.win_pct())
        } else {
            Ordering::Equal
        };
        h2h(b)
            .total_cmp(&h2h(a))
            .then(by_division)
            .then(b.conference_record.win_pct().total_cmp(&a.conference_record.win_pct()))
            .then(b.point_differential().cmp(&a.point_differential()))
            .then(b.points_for.cmp(&a.points_for))
            .then(a.team.cmp(&b.team))
    }

    /// Refresh ranks, seeds, and clinch statuses.
    pub fn recompute(&mut self, playoff_teams: u8) {
        let season_over = self.teams.keys().all(|t| self.games_remaining(*t) == 0);
        let mut updates: BTreeMap<TeamId, (u8, u8, Option<u8>, ClinchStatus)> = BTreeMap::new();
        for conference in Conference::ALL {
            let order = self.conference_order(conference);
            let division_winners: Vec<TeamId> = Division::ALL
                .iter()
                .filter_map(|d| self.division_order(conference, *d).first().copied())
                .collect();
            for (idx, team) in order.iter().enumerate() {
                let conf_rank = u8::try_from(idx + 1).unwrap_or(u8::MAX);
                let seed = (idx < usize::from(playoff_teams)).then_some(conf_rank);
                let Some(row) = self.teams.get(team) else {
                    continue;
                };
                let div_rank = self
                    .division_order(conference, row.division)
                    .iter()
                    .position(|t| t == team)
                    .map_or(0, |p| u8::try_from(p + 1).unwrap_or(u8::MAX));
                let clinch = if season_over {
                    match seed {
                        Some(1) => ClinchStatus::TopSeed,
                        Some(_) if division_winners.contains(team) => ClinchStatus::Division,
                        Some(_) => ClinchStatus::Playoffs,
                        None => ClinchStatus::Eliminated,
                    }
                } else {
                    self.clinch_status(row, playoff_teams)
                };
                updates.insert(*team, (div_rank, conf_rank, seed, clinch));
            }
        }
        for (team, (div_rank, conf_rank, seed, clinch)) in updates {
            if let Some(row) = self.teams.get_mut(&team) {
                row.division_rank = div_rank;
                row.conference_rank = conf_rank;
                row.seed = seed;
                row.clinch = clinch;
            }
        }
    }

    /// Best and worst reachable standings points.
    fn points_range(&self, row: &TeamStanding) -> (u32, u32) {
        let now = row.overall.points();
        let remaining = u32::from(self.games_remaining(row.team));
        (now, now + 2 * remaining)
    }

    /// Clinch status from reachable win totals. Ties in reachable points never clinch.
    fn clinch_status(&self, row: &TeamStanding, playoff_teams: u8) -> ClinchStatus {
        let (floor, ceiling) = self.points_range(row);
        let others: Vec<&TeamStanding> = self
            .teams
            .values()
            .filter(|s| s.conference == row.conference && s.team != row.team)
            .collect();
        let can_catch = |s: &TeamStanding| self.points_range(s).1 >= floor;
        let surely_ahead = |s: &TeamStanding| self.points_range(s).0 > ceiling;

        let threats = others.iter().copied().filter(|&s| can_catch(s)).count();
        if threats == 0 {
            return ClinchStatus::TopSeed;
        }
        let rivals = others.iter().copied().filter(|s| s.division == row.division);
        if rivals.clone().all(|s| !can_catch(s)) {
            return ClinchStatus::Division;
        }
        // A division that can pass us sends at least one of those teams to a division
        // seed, so only the rest compete for the wild cards.
        let wildcard_slots = usize::from(playoff_teams).saturating_sub(Division::ALL.len());
        let wildcard_threats: usize = Division::ALL
            .iter()
            .map(|division| {
                let catchers = others
                    .iter()
                    .copied()
                    .filter(|&s| s.division == *division && can_catch(s))
                    .count();
                if *division == row.division {
                    catchers
                } else {
                    catchers.saturating_sub(1)
                }
            })
            .sum();
        if wildcard_threats < wildcard_slots {
            return ClinchStatus::Playoffs;
        }
        let division_lost = rivals.clone().any(|s| surely_ahead(s));
        let field_lost =
            others.iter().copied().filter(|&s| surely_ahead(s)).count() >= usize::from(playoff_teams);
        if division_lost && field_lost {
            ClinchStatus::Eliminated
        } else {
            ClinchStatus::Alive
        }
    }

    /// Share of decided games won league-wide; 0.5 when ties are excluded.
    #[must_use]
    pub fn league_win_share(&self) -> f64 {
        let (wins, games) = self
            .teams
            .values()
            .fold((0u32, 0u32), |(w, g), s| (w + u32::from(s.overall.wins), g + u32::from(s.overall.wins + s.overall.losses)));
        if games == 0 {
            return 0.5;
        }
        f64::from(wins) / f64::from(games)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn league() -> Standings {
        Standings::new(
            (0..32u16).map(|idx| {
                (
                    TeamId(idx + 1),
                    Conference::ALL[usize::from(idx / 16)],
                    Division::ALL[usize::from((idx / 4) % 4)],
                )
            }),
            17,
        )
    }

    #[test]
    fn records_split_by_venue_and_relationship() {
        let mut s = league();
        s.record_game(TeamId(1), TeamId(2), 24, 17).unwrap();
        s.record_game(TeamId(1), TeamId(20), 10, 10).unwrap();
        let one = s.get(TeamId(1)).unwrap();
        assert_eq!(one.overall, Record { wins: 1, losses: 0, ties: 1 });
        assert_eq!(one.division_record.wins, 1);
        assert_eq!(one.conference_record.games(), 1);
        assert_eq!(one.home.games(), 2);
        assert_eq!(one.streak, Streak::Tied(1));
        assert_eq!(s.get(TeamId(2)).unwrap().away.losses, 1);
        assert_eq!(one.overall.to_string(), "1-0-1");
    }

    #[test]
    fn unknown_teams_are_rejected() {
        let mut s = league();
        assert_eq!(
            s.record_game(TeamId(1), TeamId(99), 3, 0),
            Err(SeasonError::UnknownTeam(TeamId(99)))
        );
    }

    #[test]
    fn head_to_head_breaks_a_two_way_tie() {
        let mut s = league();
        s.record_game(TeamId(2), TeamId(1), 20, 10).unwrap();
        s.record_game(TeamId(1), TeamId(3), 30, 0).unwrap();
        s.record_game(TeamId(4), TeamId(2), 14, 7).unwrap();
        let order = s.division_order(Conference::East, Division::North);
        let pos = |t: u16| order.iter().position(|x| *x == TeamId(t)).unwrap();
        assert!(pos(2) < pos(1), "team 2 beat team 1");
    }

    #[test]
    fn point_differential_then_team_id_settle_the_rest() {
        let mut s = league();
        s.record_game(TeamId(1), TeamId(17), 40, 0).unwrap();
        s.record_game(TeamId(2), TeamId(18), 14, 13).unwrap();
        let order = s.division_order(Conference::East, Division::North);
        assert_eq!(order[..2], [TeamId(1), TeamId(2)]);
        assert_eq!(order[2..], [TeamId(3), TeamId(4)]);
    }

    #[test]
    fn seeds_put_division_winners_first() {
        let mut s = league();
        // Team 2 sweeps, but team 5 wins its division with a worse record.
        for opp in [17, 18, 19] {
            s.record_game(TeamId(2), TeamId(opp), 21, 3).unwrap();
        }
        s.record_game(TeamId(1), TeamId(20), 21, 3).unwrap();
        s.record_game(TeamId(1), TeamId(21), 21, 3).unwrap();
        s.record_game(TeamId(5), TeamId(22), 21, 3).unwrap();
        let seeds = s.seeds(Conference::East, 7);
        assert_eq!(seeds.len(), 7);
        assert_eq!(seeds[0], TeamId(2));
        assert!(seeds[..4].contains(&TeamId(5)));
        let wild = seeds.iter().position(|t| *t == TeamId(1)).unwrap();
        assert!(wild >= 4);
    }

    #[test]
    fn season_end_statuses_follow_the_seeds() {
        let mut s = Standings::new(
            (0..32u16).map(|idx| {
                (
                    TeamId(idx + 1),
                    Conference::ALL[usize::from(idx / 16)],
                    Division::ALL[usize::from((idx / 4) % 4)],
                )
            }),
            1,
        );
        for idx in (1..=32u16).step_by(2) {
            s.record_game(TeamId(idx), TeamId(idx + 1), 10, 3).unwrap();
        }
        s.recompute(7);
        let statuses: Vec<ClinchStatus> = s.teams.values().filter(|r| r.conference == Conference::East).map(|r| r.clinch).collect();
        assert_eq!(statuses.iter().filter(|c| **c == ClinchStatus::TopSeed).count(), 1);
        assert_eq!(statuses.iter().filter(|c| **c == ClinchStatus::Eliminated).count(), 9);
    }

    /// Record East team `team`'s game number `game` against a West opponent.
    fn play(s: &mut Standings, team: u16, game: u16, won: bool) {
        let opponent = TeamId(17 + (team + game) % 16);
        let (ours, theirs) = if won { (20, 10) } else { (10, 20) };
        s.record_game(TeamId(team), opponent, ours, theirs).unwrap();
    }

    #[test]
    fn catchable_teams_in_other_divisions_still_block_a_wild_card() {
        let mut s = league();
        for game in 0..10 {
            play(&mut s, 1, game, true);
            for team in 2..=7 {
                play(&mut s, team, game, game % 2 == 0);
            }
            for team in 8..=16 {
                play(&mut s, team, game, false);
            }
        }
        s.recompute(7);
        assert_eq!(s.get(TeamId(1)).unwrap().clinch, ClinchStatus::Alive);

        for game in 10..17 {
            play(&mut s, 1, game, false);
            for team in 2..=7 {
                play(&mut s, team, game, true);
            }
            for team in 8..=16 {
                play(&mut s, team, game, false);
            }
        }
        s.recompute(7);
        assert!(!s.seeds(Conference::East, 7).contains(&TeamId(1)));
        assert_eq!(s.get(TeamId(1)).unwrap().clinch, ClinchStatus::Eliminated);
    }

    #[test]
    fn wild_card_clinches_once_too_few_teams_can_pass() {
        let mut s = league();
        for game in 0..14 {
            play(&mut s, 1, game, true);
            for team in [2, 5, 6] {
                play(&mut s, team, game, game >= 2);
            }
            for team in (3..=16).filter(|t| ![5, 6].contains(t)) {
                play(&mut s, team, game, false);
            }
        }
        s.recompute(7);
        assert_eq!(s.get(TeamId(1)).unwrap().clinch, ClinchStatus::Playoffs);
        assert_eq!(s.get(TeamId(2)).unwrap().clinch, ClinchStatus::Playoffs);
        assert_eq!(s.get(TeamId(3)).unwrap().clinch, ClinchStatus::Alive);
    }

    #[test]
    fn early_season_everyone_is_alive() {
        let mut s = league();
        s.record_game(TeamId(1), TeamId(2), 10, 3).unwrap();
        s.recompute(7);
        assert!(s.teams.values().all(|r| r.clinch == ClinchStatus::Alive));
        assert!(s.teams.values().all(|r| r.division_rank >= 1 && r.conference_rank >= 1));
    }
}
