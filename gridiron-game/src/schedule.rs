//! Regular-season schedule generation and validation.
//!
//! Every season is built from 17 rounds, each a perfect matching of the league: six
//! division rounds, four rounds against the rotating conference division, four against
//! the rotating inter-conference division, and three same-place rounds. Rounds are
//! shuffled into weeks, and byes are carved out by moving whole divisions' games from a
//! division round into the last bye-window week.
use log::{debug, warn};
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::hash::Hasher;
use twox_hash::XxHash64;

use crate::adapter::SimTeam;
use crate::config::LeagueConfig;
use crate::error::ConfigError;
use crate::rng::SeasonStreams;
use crate::roster::{Conference, Division, TeamId, TeamRecord};

pub const MAX_SCHEDULE_ATTEMPTS: u32 = 25;
/// Window weeks that host byes, and divisions resting in each.
const BYE_WEEKS: usize = 4;
const DIVISIONS_PER_BYE_WEEK: usize = 2;
/// Bonus to prime-time appeal for division rivalries.
const RIVALRY_APPEAL: u32 = 10;
const APPEAL_JITTER: u32 = 15;
const DEFAULT_APPEAL: u8 = 60;
const PRIME_SLOTS: [TimeSlot; 3] = [TimeSlot::Thursday, TimeSlot::SundayNight, TimeSlot::Monday];

const PAIRINGS: [[(usize, usize); 2]; 3] = [[(0, 1), (2, 3)], [(0, 2), (1, 3)], [(0, 3), (1, 2)]];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchupType {
    Division,
    Conference,
    InterConference,
    /// Same-place games against the remaining divisions.
    Rotating,
}

impl MatchupType {
    pub const ALL: [Self; 4] = [Self::Division, Self::Conference, Self::InterConference, Self::Rotating];

    /// Games of this type each team plays.
    #[must_use]
    pub const fn quota(self) -> usize {
        match self {
            Self::Division => 6,
            Self::Conference | Self::InterConference => 4,
            Self::Rotating => 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeSlot {
    Thursday,
    SundayEarly,
    SundayLate,
    SundayNight,
    Monday,
}

impl TimeSlot {
    #[must_use]
    pub const fn is_prime_time(self) -> bool {
        matches!(self, Self::Thursday | Self::SundayNight | Self::Monday)
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Thursday => "TNF",
            Self::SundayEarly => "1:00",
            Self::SundayLate => "4:25",
            Self::SundayNight => "SNF",
            Self::Monday => "MNF",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledGame {
    pub id: u32,
    pub week: u8,
    pub home: TeamId,
    pub away: TeamId,
    pub game_type: MatchupType,
    pub time_slot: TimeSlot,
    pub prime_time: bool,
}

impl ScheduledGame {
    #[must_use]
    pub fn involves(&self, team: TeamId) -> bool {
        self.home == team || self.away == team
    }

    #[must_use]
    pub fn opponent(&self, team: TeamId) -> Option<TeamId> {
        if self.home == team {
            Some(self.away)
        } else if self.away == team {
            Some(self.home)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    pub year: u16,
    pub weeks: u8,
    pub games: Vec<ScheduledGame>,
}

impl Schedule {
    pub fn week(&self, week: u8) -> impl Iterator<Item = &ScheduledGame> {
        self.games.iter().filter(move |g| g.week == week)
    }

    pub fn team_games(&self, team: TeamId) -> impl Iterator<Item = &ScheduledGame> {
        self.games.iter().filter(move |g| g.involves(team))
    }

    #[must_use]
    pub fn game(&self, id: u32) -> Option<&ScheduledGame> {
        self.games.iter().find(|g| g.id == id)
    }

    /// Weeks in which `team` does not play.
    #[must_use]
    pub fn bye_weeks(&self, team: TeamId) -> Vec<u8> {
        let played: BTreeSet<u8> = self.team_games(team).map(|g| g.week).collect();
        (1..=self.weeks).filter(|w| !played.contains(w)).collect()
    }

    /// Stable xxHash64 over the schedule's content.
    #[must_use]
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = XxHash64::with_seed(0);
        hasher.write(&self.year.to_le_bytes());
        hasher.write(&[self.weeks]);
        for game in &self.games {
            hasher.write(&game.id.to_le_bytes());
            hasher.write(&[game.week, game.game_type as u8, game.time_slot as u8]);
            hasher.write(&game.home.0.to_le_bytes());
            hasher.write(&game.away.0.to_le_bytes());
        }
        hasher.finish()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleValidation {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ScheduleValidation {
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn rank(&self) -> (usize, usize) {
        (self.errors.len(), self.warnings.len())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedSchedule {
    pub schedule: Schedule,
    pub validation: ScheduleValidation,
    pub attempts: u32,
}

/// Teams placed in the conference/division/slot grid the matchup formula reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeagueLayout {
    grid: [[[TeamId; 4]; 4]; 2],
    appeal: BTreeMap<TeamId, u8>,
}

impl LeagueLayout {
    /// Build from `(team, conference, division, appeal)` entries. Slots within a
    /// division follow team id order.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` unless the entries fill 2 conferences x 4 divisions x 4 teams
    /// with distinct ids.
    pub fn new(
        entries: impl IntoIterator<Item = (TeamId, Conference, Division, u8)>,
    ) -> Result<Self, ConfigError> {
        let mut appeal = BTreeMap::new();
        let mut divisions: BTreeMap<(Conference, Division), Vec<TeamId>> = BTreeMap::new();
        for (team, conference, division, rating) in entries {
            if appeal.insert(team, rating).is_some() {
                return Err(ConfigError::DuplicateTeam(team));
            }
            divisions.entry((conference, division)).or_default().push(team);
        }
        if appeal.len() != 32 {
            return Err(ConfigError::TeamCount {
                expected: 32,
                actual: appeal.len(),
            });
        }
        let mut grid = [[[TeamId(0); 4]; 4]; 2];
        for conference in Conference::ALL {
            for division in Division::ALL {
                let mut members = divisions.remove(&(conference, division)).unwrap_or_default();
                if members.len() != 4 {
                    return Err(ConfigError::DivisionSize {
                        conference: format!("{conference:?}"),
                        division: format!("{division:?}"),
                        expected: 4,
                        actual: members.len(),
                    });
                }
                members.sort_unstable();
                for (slot, team) in members.into_iter().enumerate() {
                    grid[conference.index()][division.index()][slot] = team;
                }
            }
        }
        Ok(Self { grid, appeal })
    }

    /// # Errors
    ///
    /// See [`LeagueLayout::new`].
    pub fn from_records(teams: &[TeamRecord]) -> Result<Self, ConfigError> {
        Self::new(teams.iter().map(|t| (t.id, t.conference, t.division, DEFAULT_APPEAL)))
    }

    /// # Errors
    ///
    /// See [`LeagueLayout::new`].
    pub fn from_teams(teams: &[SimTeam]) -> Result<Self, ConfigError> {
        Self::new(teams.iter().map(|t| (t.id, t.conference, t.division, t.overall)))
    }

    #[must_use]
    pub const fn team(&self, conference: usize, division: usize, slot: usize) -> TeamId {
        self.grid[conference][division][slot]
    }

    pub fn teams(&self) -> impl Iterator<Item = TeamId> + '_ {
        self.appeal.keys().copied()
    }

    /// Conference and division indices of `team`.
    #[must_use]
    pub fn locate(&self, team: TeamId) -> Option<(usize, usize)> {
        (0..2).find_map(|c| (0..4).find(|d| self.grid[c][*d].contains(&team)).map(|d| (c, d)))
    }

    fn appeal(&self, team: TeamId) -> u32 {
        u32::from(self.appeal.get(&team).copied().unwrap_or(DEFAULT_APPEAL))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Pairing {
    home: TeamId,
    away: TeamId,
    game_type: MatchupType,
}

impl Pairing {
    fn by_parity(a: TeamId, b: TeamId, parity: usize, game_type: MatchupType) -> Self {
        let (home, away) = if parity % 2 == 0 { (a, b) } else { (b, a) };
        Self { home, away, game_type }
    }

    fn involves(&self, team: TeamId) -> bool {
        self.home == team || self.away == team
    }
}

type Round = (MatchupType, Vec<Pairing>);

/// The 17 rounds for `year`. Each is a perfect matching of all 32 teams.
fn build_rounds(layout: &LeagueLayout, year: u16) -> Vec<Round> {
    let y = usize::from(year);
    let mut rounds = Vec::with_capacity(17);

    for leg in 0..2 {
        for pairs in PAIRINGS {
            let mut round = Vec::with_capacity(16);
            for c in 0..2 {
                for d in 0..4 {
                    for (a, b) in pairs {
                        let (ta, tb) = (layout.team(c, d, a), layout.team(c, d, b));
                        round.push(Pairing::by_parity(ta, tb, a + b + d + y + leg, MatchupType::Division));
                    }
                }
            }
            rounds.push((MatchupType::Division, round));
        }
    }

    let rotation = PAIRINGS[y % 3];
    for k in 0..4 {
        let mut round = Vec::with_capacity(16);
        for c in 0..2 {
            for (d1, d2) in rotation {
                for i in 0..4 {
                    let j = (i + k) % 4;
                    let (a, b) = (layout.team(c, d1, i), layout.team(c, d2, j));
                    round.push(Pairing::by_parity(a, b, i + j + y, MatchupType::Conference));
                }
            }
        }
        rounds.push((MatchupType::Conference, round));
    }

    for k in 0..4 {
        let mut round = Vec::with_capacity(16);
        for d in 0..4 {
            let w = (d + y) % 4;
            for i in 0..4 {
                let j = (i + k) % 4;
                let (east, west) = (layout.team(0, d, i), layout.team(1, w, j));
                round.push(Pairing::by_parity(east, west, i + j + y, MatchupType::InterConference));
            }
        }
        rounds.push((MatchupType::InterConference, round));
    }

    // Same-place cycle over the two non-rotating divisions: a hosts c, c hosts b,
    // b hosts d, d hosts a. Odd years reverse it.
    let [(a, b), (c, d)] = rotation;
    let cycle = [[(a, c), (b, d)], [(c, b), (d, a)]];
    for matching in cycle {
        let mut round = Vec::with_capacity(16);
        for conf in 0..2 {
            for (host, guest) in matching {
                for slot in 0..4 {
                    let (h, g) = (layout.team(conf, host, slot), layout.team(conf, guest, slot));
                    round.push(Pairing::by_parity(h, g, y, MatchupType::Rotating));
                }
            }
        }
        rounds.push((MatchupType::Rotating, round));
    }

    let mut round = Vec::with_capacity(16);
    for d in 0..4 {
        let w = (d + y + 2) % 4;
        for slot in 0..4 {
            let (east, west) = (layout.team(0, d, slot), layout.team(1, w, slot));
            round.push(Pairing::by_parity(east, west, y, MatchupType::Rotating));
        }
    }
    rounds.push((MatchupType::Rotating, round));
    rounds
}

/// Place rounds into weeks and carve out byes.
fn assign_weeks<R: Rng + ?Sized>(
    rounds: Vec<Round>,
    layout: &LeagueLayout,
    league: &LeagueConfig,
    rng: &mut R,
) -> BTreeMap<u8, Vec<Pairing>> {
    let weeks = league.regular_season_weeks;
    let catch_up = league.bye_window_end;

    let mut division_rounds = Vec::new();
    let mut other_rounds = Vec::new();
    for (kind, round) in rounds {
        if kind == MatchupType::Division {
            division_rounds.push(round);
        } else {
            other_rounds.push(round);
        }
    }
    division_rounds.shuffle(rng);
    let mut bye_weeks: Vec<u8> = (league.bye_window_start..catch_up).collect();
    bye_weeks.shuffle(rng);
    bye_weeks.truncate(BYE_WEEKS);
    bye_weeks.sort_unstable();

    let mut schedule: BTreeMap<u8, Vec<Pairing>> = BTreeMap::new();
    let mut bye_rounds: Vec<Vec<Pairing>> = division_rounds.drain(..BYE_WEEKS.min(division_rounds.len())).collect();

    let mut divisions: Vec<(usize, usize)> = (0..2).flat_map(|c| (0..4).map(move |d| (c, d))).collect();
    divisions.shuffle(rng);
    let mut moved = Vec::with_capacity(16);
    for (week, chunk) in bye_weeks.iter().zip(divisions.chunks(DIVISIONS_PER_BYE_WEEK)) {
        let Some(mut round) = bye_rounds.pop() else {
            break;
        };
        let resting: BTreeSet<TeamId> = chunk
            .iter()
            .flat_map(|(c, d)| (0..4).map(move |s| layout.team(*c, *d, s)))
            .collect();
        let (rest, play): (Vec<Pairing>, Vec<Pairing>) =
            round.drain(..).partition(|p| resting.contains(&p.home));
        moved.extend(rest);
        schedule.insert(*week, play);
    }
    schedule.insert(catch_up, moved);

    // A division round closes the season when one is left over.
    let mut closer = division_rounds.pop();
    let mut remaining = other_rounds;
    remaining.extend(division_rounds);
    remaining.shuffle(rng);
    let open_weeks: Vec<u8> = (1..=weeks).filter(|w| !schedule.contains_key(w)).collect();
    let mut rounds_iter = remaining.into_iter();
    for week in open_weeks.into_iter().rev() {
        let round = if week == weeks {
            closer.take().or_else(|| rounds_iter.next())
        } else {
            rounds_iter.next().or_else(|| closer.take())
        };
        if let Some(round) = round {
            schedule.insert(week, round);
        }
    }
    schedule
}

/// Pick prime-time games and split the rest between the Sunday afternoon windows.
///
/// Teams are held to an even share of prime-time appearances first and only go past
/// it, up to `cap`, when no pairing of the week fits the share.
fn assign_slots<R: Rng + ?Sized>(
    weeks: BTreeMap<u8, Vec<Pairing>>,
    layout: &LeagueLayout,
    cap: u8,
    rng: &mut R,
) -> Vec<ScheduledGame> {
    let mut prime_counts: BTreeMap<TeamId, u8> = BTreeMap::new();
    let mut played_monday: BTreeSet<TeamId> = BTreeSet::new();
    let mut games = Vec::with_capacity(272);
    let appearances = weeks.len() * PRIME_SLOTS.len() * 2;
    let share = appearances.div_ceil(layout.appeal.len().max(1));
    let target = u8::try_from(share).unwrap_or(u8::MAX).clamp(1, cap.max(1));

    for (week, pairings) in weeks {
        let mut scored: Vec<(u32, Pairing)> = pairings
            .into_iter()
            .map(|p| {
                let rivalry = if p.game_type == MatchupType::Division { RIVALRY_APPEAL } else { 0 };
                let score = layout.appeal(p.home) + layout.appeal(p.away) + rivalry + rng.gen_range(0..APPEAL_JITTER);
                (score, p)
            })
            .collect();
        scored.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.home.cmp(&b.1.home)));
        let mut pool: Vec<Pairing> = scored.into_iter().map(|(_, p)| p).collect();

        let mut slotted: Vec<(Pairing, TimeSlot)> = Vec::with_capacity(pool.len());
        let mut monday_now = BTreeSet::new();
        for slot in PRIME_SLOTS {
            let fits = |p: &Pairing, limit: u8| {
                let under = |t: &TeamId| prime_counts.get(t).copied().unwrap_or(0) < limit;
                let rested = slot != TimeSlot::Thursday
                    || !(played_monday.contains(&p.home) || played_monday.contains(&p.away));
                under(&p.home) && under(&p.away) && rested
            };
            let eligible = pool
                .iter()
                .position(|p| fits(p, target))
                .or_else(|| pool.iter().position(|p| fits(p, cap)));
            if let Some(idx) = eligible {
                let pairing = pool.remove(idx);
                *prime_counts.entry(pairing.home).or_default() += 1;
                *prime_counts.entry(pairing.away).or_default() += 1;
                if slot == TimeSlot::Monday {
                    monday_now.insert(pairing.home);
                    monday_now.insert(pairing.away);
                }
                slotted.push((pairing, slot));
            }
        }
        pool.shuffle(rng);
        let early = pool.len().div_ceil(2);
        for (idx, pairing) in pool.into_iter().enumerate() {
            let slot = if idx < early { TimeSlot::SundayEarly } else { TimeSlot::SundayLate };
            slotted.push((pairing, slot));
        }
        played_monday = monday_now;

        slotted.sort_by(|a, b| a.1.cmp(&b.1).then(a.0.home.cmp(&b.0.home)));
        for (pairing, slot) in slotted {
            games.push(ScheduledGame {
                id: 0,
                week,
                home: pairing.home,
                away: pairing.away,
                game_type: pairing.game_type,
                time_slot: slot,
                prime_time: slot.is_prime_time(),
            });
        }
    }
    for (idx, game) in games.iter_mut().enumerate() {
        game.id = u32::try_from(idx + 1).unwrap_or(u32::MAX);
    }
    games
}

/// Check a schedule against the league's structural rules.
#[must_use]
pub fn validate_schedule(schedule: &Schedule, layout: &LeagueLayout, league: &LeagueConfig) -> ScheduleValidation {
    let mut report = ScheduleValidation::default();
    if schedule.games.len() != league.total_games() {
        report.errors.push(format!(
            "expected {} games, found {}",
            league.total_games(),
            schedule.games.len()
        ));
    }

    let mut booked: BTreeMap<(u8, TeamId), u32> = BTreeMap::new();
    for game in &schedule.games {
        if game.home == game.away {
            report.errors.push(format!("game {} pits {} against itself", game.id, game.home));
        }
        if game.week == 0 || game.week > schedule.weeks {
            report.errors.push(format!("game {} is in week {} outside 1..={}", game.id, game.week, schedule.weeks));
        }
        for team in [game.home, game.away] {
            if let Some(other) = booked.insert((game.week, team), game.id) {
                report.errors.push(format!(
                    "{team} double booked in week {} (games {other} and {})",
                    game.week, game.id
                ));
            }
        }
    }

    for team in layout.teams() {
        let games: Vec<&ScheduledGame> = schedule.team_games(team).collect();
        if games.len() != usize::from(league.games_per_team) {
            report.errors.push(format!(
                "{team} plays {} games (expected {})",
                games.len(),
                league.games_per_team
            ));
        }
        let byes = schedule.bye_weeks(team);
        match byes.as_slice() {
            [week] if league.in_bye_window(*week) => {}
            [week] => report.errors.push(format!("{team} bye in week {week} is outside the bye window")),
            other => report.errors.push(format!("{team} has {} bye weeks", other.len())),
        }
        let home = games.iter().filter(|g| g.home == team).count();
        if !(8..=9).contains(&home) {
            report.errors.push(format!("{team} has {home} home games"));
        }
        for kind in MatchupType::ALL {
            let count = games.iter().filter(|g| g.game_type == kind).count();
            if count != kind.quota() {
                report.errors.push(format!(
                    "{team} has {count} {kind:?} games (expected {})",
                    kind.quota()
                ));
            }
        }
        let prime = games.iter().filter(|g| g.prime_time).count();
        if prime > usize::from(league.prime_time_cap) {
            report.errors.push(format!(
                "{team} has {prime} prime-time games (cap {})",
                league.prime_time_cap
            ));
        }
    }

    for week in 1..=schedule.weeks {
        for slot in [TimeSlot::Thursday, TimeSlot::SundayNight, TimeSlot::Monday] {
            let count = schedule.week(week).filter(|g| g.time_slot == slot).count();
            if count != 1 {
                report.warnings.push(format!("week {week} has {count} {} games", slot.label()));
            }
        }
        if week > 1 {
            let monday: BTreeSet<TeamId> = schedule
                .week(week - 1)
                .filter(|g| g.time_slot == TimeSlot::Monday)
                .flat_map(|g| [g.home, g.away])
                .collect();
            for game in schedule.week(week).filter(|g| g.time_slot == TimeSlot::Thursday) {
                if monday.contains(&game.home) || monday.contains(&game.away) {
                    report.warnings.push(format!("week {week}: Thursday game {} follows a Monday game", game.id));
                }
            }
        }
    }
    report
}

/// Generate the regular season for `year`, retrying until a clean schedule appears.
///
/// # Errors
///
/// Returns `ConfigError` when the league configuration or layout cannot be scheduled.
/// Constraint failures are reported in the returned validation, never as errors.
pub fn generate_schedule(
    layout: &LeagueLayout,
    league: &LeagueConfig,
    year: u16,
    streams: &SeasonStreams,
) -> Result<GeneratedSchedule, ConfigError> {
    league.validate()?;
    let mut best: Option<(Schedule, ScheduleValidation)> = None;
    let mut attempts = 0;
    for attempt in 0..MAX_SCHEDULE_ATTEMPTS {
        attempts = attempt + 1;
        let mut rng = streams.schedule(attempt);
        let weeks = assign_weeks(build_rounds(layout, year), layout, league, &mut rng);
        let games = assign_slots(weeks, layout, league.prime_time_cap, &mut rng);
        let schedule = Schedule {
            year,
            weeks: league.regular_season_weeks,
            games,
        };
        let validation = validate_schedule(&schedule, layout, league);
        debug!(
            "schedule attempt {attempts}: {} errors, {} warnings",
            validation.errors.len(),
            validation.warnings.len()
        );
        let clean = validation.errors.is_empty() && validation.warnings.is_empty();
        let better = best.as_ref().is_none_or(|(_, v)| validation.rank() < v.rank());
        if better {
            best = Some((schedule, validation));
        }
        if clean {
            break;
        }
    }
    let (schedule, validation) = best.ok_or(ConfigError::GameCount {
        games: league.games_per_team,
        weeks: league.regular_season_weeks,
    })?;
    for warning in &validation.warnings {
        warn!("schedule {year}: {warning}");
    }
    Ok(GeneratedSchedule {
        schedule,
        validation,
        attempts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn layout() -> LeagueLayout {
        LeagueLayout::new((0..32u16).map(|idx| {
            let conference = Conference::ALL[usize::from(idx / 16)];
            let division = Division::ALL[usize::from((idx / 4) % 4)];
            (TeamId(idx + 1), conference, division, 50 + u8::try_from(idx).unwrap())
        }))
        .unwrap()
    }

    fn generate(seed: u64, year: u16) -> GeneratedSchedule {
        generate_schedule(&layout(), &LeagueConfig::default(), year, &SeasonStreams::from_user_seed(seed)).unwrap()
    }

    #[test]
    fn every_round_is_a_perfect_matching() {
        let layout = layout();
        for year in 2024..2027 {
            let rounds = build_rounds(&layout, year);
            assert_eq!(rounds.len(), 17);
            for (_, round) in &rounds {
                let teams: BTreeSet<TeamId> = round.iter().flat_map(|p| [p.home, p.away]).collect();
                assert_eq!(round.len(), 16);
                assert_eq!(teams.len(), 32);
            }
        }
    }

    #[test]
    fn no_pair_meets_twice_outside_the_division() {
        let rounds = build_rounds(&layout(), 2025);
        let mut seen = BTreeSet::new();
        for (kind, round) in &rounds {
            for p in round {
                let key = (p.home.min(p.away), p.home.max(p.away));
                if *kind != MatchupType::Division {
                    assert!(seen.insert(key), "{key:?} repeated");
                }
            }
        }
    }

    #[test]
    fn generated_schedule_is_clean() {
        let generated = generate(42, 2025);
        assert!(generated.validation.is_valid(), "{:?}", generated.validation.errors);
        assert_eq!(generated.schedule.games.len(), 272);
        assert!(generated.attempts >= 1);
    }

    #[test]
    fn prime_time_rotates_before_any_team_repeats() {
        let layout = layout();
        let marquee = [(32, 31), (30, 29), (28, 27), (26, 25), (2, 1)];
        let weeks: BTreeMap<u8, Vec<Pairing>> = (1..=3u8)
            .map(|week| {
                let pairings = marquee
                    .iter()
                    .map(|&(home, away)| Pairing {
                        home: TeamId(home),
                        away: TeamId(away),
                        game_type: MatchupType::Division,
                    })
                    .collect();
                (week, pairings)
            })
            .collect();
        let games = assign_slots(weeks, &layout, 5, &mut SmallRng::seed_from_u64(9));
        assert_eq!(games.iter().filter(|g| g.prime_time).count(), 9);
        for (home, _) in marquee {
            assert!(
                games.iter().any(|g| g.home == TeamId(home) && g.prime_time),
                "team {home} never played in prime time"
            );
        }
    }

    #[test]
    fn generated_prime_time_stays_near_an_even_share() {
        let generated = generate(7, 2025);
        let mut counts: BTreeMap<TeamId, u8> = BTreeMap::new();
        for game in generated.schedule.games.iter().filter(|g| g.prime_time) {
            *counts.entry(game.home).or_default() += 1;
            *counts.entry(game.away).or_default() += 1;
        }
        let cap = LeagueConfig::default().prime_time_cap;
        assert!(counts.values().all(|c| *c <= cap));
        assert!(counts.len() >= 22, "only {} teams got prime-time games", counts.len());
    }

    #[test]
    fn same_seed_same_fingerprint() {
        let a = generate(7, 2025);
        let b = generate(7, 2025);
        let c = generate(8, 2025);
        assert_eq!(a.schedule.fingerprint(), b.schedule.fingerprint());
        assert_ne!(a.schedule.fingerprint(), c.schedule.fingerprint());
    }

    #[test]
    fn seventeenth_game_alternates_hosting_conference() {
        let layout = layout();
        for (year, east_hosts) in [(2024u16, true), (2025, false)] {
            let schedule = generate(1, year).schedule;
            let east = layout.team(0, 0, 0);
            let home = schedule.team_games(east).filter(|g| g.home == east).count();
            assert_eq!(home, if east_hosts { 9 } else { 8 });
        }
    }

    #[test]
    fn validation_flags_double_booking() {
        let mut schedule = generate(3, 2025).schedule;
        let week = schedule.games[0].week;
        if let Some(other) = schedule.games.iter_mut().find(|g| g.week != week) {
            other.week = week;
        }
        let report = validate_schedule(&schedule, &layout(), &LeagueConfig::default());
        assert!(report.errors.iter().any(|e| e.contains("double booked") || e.contains("bye")));
    }

    #[test]
    fn layout_rejects_lopsided_divisions() {
        let err = LeagueLayout::new((0..32u16).map(|idx| {
            let division = if idx == 0 { Division::South } else { Division::ALL[usize::from((idx / 4) % 4)] };
            (TeamId(idx + 1), Conference::ALL[usize::from(idx / 16)], division, 50)
        }))
        .unwrap_err();
        assert!(matches!(err, ConfigError::DivisionSize { .. }));
    }
}
