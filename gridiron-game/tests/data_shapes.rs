use gridiron_game::{
    GameContext, GameResult, GameSimulator, GameType, ModifierTables, PlayResult, ResultCategory,
    SeasonConfig, SeasonSimulator, SeasonState, SimConfig, SimTeam, TeamId, Weather, WeatherConfig,
    sample_league, simulate_game,
};
use std::hash::Hasher;
use twox_hash::XxHash64;

fn digest(bytes: &[u8]) -> u64 {
    let mut hasher = XxHash64::with_seed(0);
    hasher.write(bytes);
    hasher.finish()
}

fn teams() -> (SimTeam, SimTeam) {
    let tables = ModifierTables::default_config();
    let league = sample_league();
    let find = |id: u16| {
        let record = league.iter().find(|t| t.id == TeamId(id)).unwrap();
        SimTeam::from_record(record, &tables).unwrap()
    };
    (find(25), find(1))
}

#[test]
fn season_snapshot_survives_json() {
    let mut season = SeasonSimulator::new(
        &sample_league(),
        &ModifierTables::default_config(),
        SeasonConfig::default_config(),
        2024,
        0x5A5A,
    )
    .unwrap();
    for _ in 0..6 {
        season.simulate_week().unwrap();
    }
    let json = serde_json::to_string(season.state()).unwrap();
    let restored: SeasonState = serde_json::from_str(&json).unwrap();
    assert_eq!(&restored, season.state());
    let again = serde_json::to_string(&restored).unwrap();
    assert_eq!(digest(json.as_bytes()), digest(again.as_bytes()));

    let mut resumed =
        SeasonSimulator::from_state(restored, &sample_league(), &ModifierTables::default_config())
            .unwrap();
    let champion = season.simulate_to_completion().unwrap();
    assert_eq!(resumed.simulate_to_completion().unwrap(), champion);
    let finished = serde_json::to_string(season.state()).unwrap();
    let resumed_finished = serde_json::to_string(resumed.state()).unwrap();
    assert_eq!(digest(finished.as_bytes()), digest(resumed_finished.as_bytes()));
}

#[test]
fn game_result_round_trips() {
    let (home, away) = teams();
    let sim = SimConfig::default();
    let cfg = WeatherConfig::default_config();
    let context = GameContext::new(GameType::Playoff, Weather::Snow, cfg.effect(Weather::Snow), &sim);
    let result = simulate_game(&home, &away, context, &sim, 99);
    let json = serde_json::to_string(&result).unwrap();
    let back: GameResult = serde_json::from_str(&json).unwrap();
    assert_eq!(back, result);
    assert!(json.contains("\"weather\":\"snow\""));
    assert!(back.winner().is_some(), "playoff games never end tied");
}

#[test]
fn box_score_totals_match_the_scoreboard() {
    let (home, away) = teams();
    let sim = SimConfig::default();
    for seed in 0..20 {
        let result = simulate_game(&home, &away, GameContext::regular(&sim), &sim, seed);
        let scored: u16 = result
            .scoring_plays
            .iter()
            .filter(|p| p.team == result.home)
            .map(|p| p.points)
            .sum();
        assert_eq!(scored, result.home_score, "seed {seed}");
        assert_eq!(result.box_score.home.points, result.home_score, "seed {seed}");
        assert_eq!(result.box_score.away.points, result.away_score, "seed {seed}");
    }
}

fn play_log(step: impl Fn(&mut GameSimulator<'_>) -> usize) -> Vec<PlayResult> {
    let (home, away) = teams();
    let sim = SimConfig::default();
    let mut game = GameSimulator::new(&home, &away, GameContext::regular(&sim), &sim, 0xBEEF);
    while !game.is_over() {
        step(&mut game);
    }
    game.plays().to_vec()
}

#[test]
fn stepping_granularity_does_not_change_the_game() {
    let all_at_once = play_log(|game| game.simulate_to_end());
    let by_quarter = play_log(|game| game.simulate_quarter());
    let by_drive = play_log(|game| game.simulate_drive());
    let by_play = play_log(|game| usize::from(game.simulate_play().is_some()));
    assert!(!all_at_once.is_empty());
    assert_eq!(by_quarter, all_at_once);
    assert_eq!(by_drive, all_at_once);
    assert_eq!(by_play, all_at_once);
}

#[test]
fn down_and_distance_stay_in_bounds() {
    let (home, away) = teams();
    let sim = SimConfig::default();
    for seed in 0..10 {
        let result = simulate_game(&home, &away, GameContext::regular(&sim), &sim, seed);
        for play in &result.plays {
            let before = play.before;
            assert!((1..=4).contains(&before.down), "seed {seed}: down {}", before.down);
            assert!(before.yards_to_go <= 10, "seed {seed}: {} to go", before.yards_to_go);
            assert!(before.ball_on <= 100);
        }
    }
}

#[test]
fn downs_advance_by_one_until_a_first_down_or_change_of_possession() {
    let (home, away) = teams();
    let sim = SimConfig::default();
    for seed in 0..100 {
        let result = simulate_game(&home, &away, GameContext::regular(&sim), &sim, seed);
        for pair in result.plays.windows(2) {
            let (prev, next) = (&pair[0], &pair[1]);
            if !prev.kind.is_scrimmage() || !next.kind.is_scrimmage() {
                continue;
            }
            let (was, now) = (prev.before.down, next.before.down);
            match prev.category {
                ResultCategory::Normal if was < 4 => {
                    assert_eq!(next.offense, prev.offense, "seed {seed}: drive ended on down {was}");
                    assert_eq!(now, was + 1, "seed {seed}: down {was} followed by {now}");
                }
                ResultCategory::Normal => {
                    assert_ne!(next.offense, prev.offense, "seed {seed}: fifth down");
                    assert_eq!(now, 1, "seed {seed}: turnover on downs gave down {now}");
                }
                ResultCategory::FirstDown => {
                    assert_eq!(next.offense, prev.offense);
                    assert_eq!(now, 1, "seed {seed}: first down gave down {now}");
                }
                ResultCategory::Penalty => {
                    assert_eq!(next.offense, prev.offense);
                    assert!(now == was || now == 1, "seed {seed}: penalty moved down {was} to {now}");
                }
                ResultCategory::Turnover | ResultCategory::Punt | ResultCategory::FieldGoalMissed => {
                    assert_eq!(now, 1, "seed {seed}: new possession began on down {now}");
                }
                _ => {}
            }
        }
    }
}
