use anyhow::{Context, Result, ensure};
use gridiron_game::{
    GameContext, GameType, LeagueLayout, ModifierTables, SeasonConfig, SeasonPhase,
    SeasonSimulator, SeasonState, SeasonStreams, SimConfig, SimTeam, TeamId, TeamRecord,
    decode_share_code, encode_share_code, generate_schedule, generate_share_code, sample_league,
    simulate_game, synthetic_team,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use thiserror::Error;

const PARITY_GAMES: u64 = 200;
const PARITY_TOLERANCE: f64 = 0.12;
const SNAPSHOT_WEEK: u8 = 5;

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("unknown scenario: {0}")]
    Unknown(String),
}

/// League data every scenario runs against.
#[derive(Debug, Clone)]
pub struct Harness {
    pub teams: Vec<TeamRecord>,
    pub tables: ModifierTables,
    pub config: SeasonConfig,
}

impl Harness {
    #[must_use]
    pub fn load_default() -> Self {
        Self {
            teams: sample_league(),
            tables: ModifierTables::default_config(),
            config: SeasonConfig::default_config(),
        }
    }

    fn season(&self, trial: Trial) -> Result<SeasonSimulator> {
        SeasonSimulator::new(
            &self.teams,
            &self.tables,
            self.config.clone(),
            trial.year,
            trial.seed,
        )
        .with_context(|| format!("starting season {} with seed {}", trial.year, trial.seed))
    }

    fn sim_team(&self, id: TeamId) -> Result<SimTeam> {
        let record = self
            .teams
            .iter()
            .find(|t| t.id == id)
            .with_context(|| format!("{id} missing from the league"))?;
        Ok(SimTeam::from_record(record, &self.tables)?)
    }
}

/// One iteration's inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Trial {
    pub year: u16,
    pub seed: u64,
}

pub type Check = fn(&Harness, Trial) -> Result<String>;

pub struct Scenario {
    pub key: &'static str,
    pub description: &'static str,
    pub check: Check,
}

impl std::fmt::Debug for Scenario {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scenario").field("key", &self.key).finish()
    }
}

static CATALOG: [Scenario; 6] = [
    Scenario {
        key: "smoke",
        description: "Single game between two sample teams",
        check: smoke_game,
    },
    Scenario {
        key: "parity",
        description: "Equal synthetic teams split a neutral-site series",
        check: parity_series,
    },
    Scenario {
        key: "schedule",
        description: "Generated schedule passes every structural rule",
        check: schedule_validity,
    },
    Scenario {
        key: "full-season",
        description: "Regular season and playoffs through to a champion",
        check: full_season,
    },
    Scenario {
        key: "snapshot-resume",
        description: "Mid-season JSON snapshot resumes to the same result",
        check: snapshot_resume,
    },
    Scenario {
        key: "share-codes",
        description: "Share codes round-trip and reproduce the schedule",
        check: share_codes,
    },
];

#[must_use]
pub fn list_scenarios() -> Vec<(&'static str, &'static str)> {
    CATALOG.iter().map(|s| (s.key, s.description)).collect()
}

/// Look up a scenario by key, case-insensitively.
///
/// # Errors
///
/// Returns [`ScenarioError::Unknown`] when no scenario has that key.
pub fn find_scenario(key: &str) -> Result<&'static Scenario, ScenarioError> {
    CATALOG
        .iter()
        .find(|s| s.key.eq_ignore_ascii_case(key.trim()))
        .ok_or_else(|| ScenarioError::Unknown(key.to_string()))
}

fn smoke_game(harness: &Harness, trial: Trial) -> Result<String> {
    let home = harness.sim_team(TeamId(1))?;
    let away = harness.sim_team(TeamId(25))?;
    let sim = harness.config.sim.clone();
    let result = simulate_game(&home, &away, GameContext::regular(&sim), &sim, trial.seed);

    ensure!(!result.plays.is_empty(), "game produced no plays");
    ensure!(
        result.box_score.home.points == result.home_score
            && result.box_score.away.points == result.away_score,
        "box score {}-{} disagrees with scoreboard {}-{}",
        result.box_score.home.points,
        result.box_score.away.points,
        result.home_score,
        result.away_score
    );
    let logged: u16 = result.scoring_plays.iter().map(|p| p.points).sum();
    ensure!(
        logged == result.home_score + result.away_score,
        "scoring log totals {logged}, scoreboard {}",
        result.home_score + result.away_score
    );
    Ok(format!(
        "{} {} - {} {} in {} plays",
        result.home,
        result.home_score,
        result.away_score,
        result.away,
        result.plays.len()
    ))
}

fn parity_series(harness: &Harness, trial: Trial) -> Result<String> {
    let a = SimTeam::from_record(&synthetic_team(TeamId(1), 72), &harness.tables)?;
    let b = SimTeam::from_record(&synthetic_team(TeamId(2), 72), &harness.tables)?;
    let sim = SimConfig::default();
    let mut context = GameContext::regular(&sim);
    context.neutral_site = true;

    let mut points = 0u64;
    for n in 0..PARITY_GAMES {
        let (home, away) = if n % 2 == 0 { (&a, &b) } else { (&b, &a) };
        let result = simulate_game(home, away, context, &sim, trial.seed.wrapping_add(n));
        match result.winner() {
            Some(winner) if winner == a.id => points += 2,
            None => points += 1,
            Some(_) => {}
        }
    }
    #[allow(clippy::cast_precision_loss)]
    let share = points as f64 / (2 * PARITY_GAMES) as f64;
    ensure!(
        (share - 0.5).abs() <= PARITY_TOLERANCE,
        "equal teams drifted to {share:.3}"
    );
    Ok(format!("share {share:.3} over {PARITY_GAMES} games"))
}

fn schedule_validity(harness: &Harness, trial: Trial) -> Result<String> {
    let layout = LeagueLayout::from_records(&harness.teams)?;
    let league = &harness.config.league;
    let generated = generate_schedule(
        &layout,
        league,
        trial.year,
        &SeasonStreams::from_user_seed(trial.seed),
    )?;
    ensure!(
        generated.validation.is_valid(),
        "schedule invalid after {} attempts: {}",
        generated.attempts,
        generated.validation.errors.join("; ")
    );

    let mut per_team: BTreeMap<TeamId, usize> = BTreeMap::new();
    for game in &generated.schedule.games {
        *per_team.entry(game.home).or_default() += 1;
        *per_team.entry(game.away).or_default() += 1;
    }
    let expected = usize::from(league.games_per_team);
    ensure!(
        per_team.values().all(|n| *n == expected),
        "uneven game counts: {per_team:?}"
    );
    Ok(format!(
        "{} games, {} attempt(s), {} warning(s), fingerprint {:016x}",
        generated.schedule.games.len(),
        generated.attempts,
        generated.validation.warnings.len(),
        generated.schedule.fingerprint()
    ))
}

fn full_season(harness: &Harness, trial: Trial) -> Result<String> {
    let mut season = harness.season(trial)?;
    let champion = season.simulate_to_completion()?;
    let state = season.state();

    ensure!(state.phase == SeasonPhase::Offseason, "season stopped in {:?}", state.phase);
    let expected = u16::from(harness.config.league.games_per_team);
    for standing in state.standings.teams.values() {
        ensure!(
            standing.overall.games() == expected,
            "{} played {} games",
            standing.team,
            standing.overall.games()
        );
    }
    let bracket = state.bracket.as_ref().context("playoffs never seeded")?;
    let last = bracket.rounds.last().context("bracket has no rounds")?;
    ensure!(last.is_championship(), "final round is {}", last.name);
    ensure!(
        bracket.champion == Some(champion) && state.champion == Some(champion),
        "champion mismatch between bracket and season"
    );
    let final_game = state.games.last().context("no games recorded")?;
    ensure!(
        final_game.game_type == GameType::Championship,
        "last game was {:?}",
        final_game.game_type
    );
    Ok(format!(
        "champion {champion} after {} games and {} playoff rounds",
        state.games.len(),
        bracket.rounds.len()
    ))
}

fn snapshot_digest(state: &SeasonState) -> Result<String> {
    let json = serde_json::to_vec(state)?;
    let digest = Sha256::digest(&json);
    Ok(digest.iter().map(|b| format!("{b:02x}")).collect())
}

fn snapshot_resume(harness: &Harness, trial: Trial) -> Result<String> {
    let mut season = harness.season(trial)?;
    for _ in 0..SNAPSHOT_WEEK {
        season.simulate_week()?;
    }
    let json = serde_json::to_string(season.state())?;
    let restored: SeasonState = serde_json::from_str(&json)?;
    ensure!(&restored == season.state(), "snapshot changed in transit");

    let mut resumed = SeasonSimulator::from_state(restored, &harness.teams, &harness.tables)?;
    let champion = season.simulate_to_completion()?;
    let resumed_champion = resumed.simulate_to_completion()?;
    ensure!(
        champion == resumed_champion,
        "resumed season crowned {resumed_champion}, original {champion}"
    );
    let original = snapshot_digest(season.state())?;
    let replayed = snapshot_digest(resumed.state())?;
    ensure!(original == replayed, "final snapshots differ");
    Ok(format!("resumed after week {SNAPSHOT_WEEK}, digest {}", &original[..16]))
}

fn share_codes(harness: &Harness, trial: Trial) -> Result<String> {
    let mut rng = ChaCha20Rng::seed_from_u64(trial.seed);
    let code = generate_share_code(trial.year, rng.r#gen());
    let (year, seed) = decode_share_code(&code).with_context(|| format!("{code} did not decode"))?;
    ensure!(year == trial.year, "{code} decoded to year {year}");
    let reencoded = encode_share_code(year, seed);
    ensure!(reencoded == code, "{code} re-encoded as {reencoded}");

    let a = harness.season(Trial { year, seed })?;
    let lowered = code.to_lowercase();
    let (year_b, seed_b) =
        decode_share_code(&lowered).with_context(|| format!("{lowered} did not decode"))?;
    let b = harness.season(Trial {
        year: year_b,
        seed: seed_b,
    })?;
    ensure!(
        a.state().schedule.fingerprint() == b.state().schedule.fingerprint(),
        "{code} produced two schedules"
    );
    Ok(code)
}
