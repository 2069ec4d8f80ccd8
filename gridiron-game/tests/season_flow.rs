use gridiron_game::{
    ClinchStatus, Conference, GameType, ModifierTables, SeasonConfig, SeasonError, SeasonPhase,
    SeasonSimulator, TeamId, WeekStatus, sample_league,
};
use std::collections::BTreeSet;

fn new_season(seed: u64) -> SeasonSimulator {
    SeasonSimulator::new(
        &sample_league(),
        &ModifierTables::default_config(),
        SeasonConfig::default_config(),
        2024,
        seed,
    )
    .expect("sample league starts a season")
}

#[test]
fn full_season_reaches_a_champion() {
    let mut season = new_season(0xF00D);
    let champion = season.simulate_to_completion().unwrap();
    let state = season.state();

    assert_eq!(state.phase, SeasonPhase::Offseason);
    for standing in state.standings.teams.values() {
        assert_eq!(standing.overall.games(), 17, "{}", standing.team);
    }
    let bracket = state.bracket.as_ref().expect("playoffs were seeded");
    assert_eq!(bracket.rounds.len(), 4);
    let names: Vec<&str> = bracket.rounds.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(
        names,
        ["Wild Card", "Divisional", "Conference Championship", "Championship"]
    );
    let last = bracket.rounds.last().unwrap();
    assert_eq!(last.matchups.len(), 1);
    assert_eq!(last.matchups[0].winner, Some(champion));
    assert!(last.matchups[0].neutral_site);

    let final_game = state.games.last().unwrap();
    assert_eq!(final_game.game_type, GameType::Championship);
    assert_eq!(final_game.winner, Some(champion));
}

#[test]
fn later_rounds_only_hold_winners_or_bye_teams() {
    let mut season = new_season(77);
    season.simulate_to_completion().unwrap();
    let bracket = season.state().bracket.clone().unwrap();

    for pair in bracket.rounds.windows(2) {
        let (previous, next) = (&pair[0], &pair[1]);
        let mut eligible: BTreeSet<TeamId> =
            previous.matchups.iter().filter_map(|m| m.winner).collect();
        eligible.extend(previous.byes.iter().map(|s| s.team));
        for matchup in &next.matchups {
            for team in [matchup.home.team, matchup.away.team] {
                assert!(eligible.contains(&team), "{team} appeared in {} without advancing", next.name);
            }
        }
    }
    for round in &bracket.rounds {
        for matchup in &round.matchups {
            assert!(matchup.winner.is_some());
            assert!(matchup.home_score.is_some() && matchup.away_score.is_some());
        }
    }
}

#[test]
fn seeds_come_from_final_standings() {
    let mut season = new_season(5150);
    season.simulate_regular_season().unwrap();
    let state = season.state();
    assert_eq!(state.phase, SeasonPhase::Playoffs);
    let bracket = state.bracket.as_ref().unwrap();
    for conference in Conference::ALL {
        let expected = state.standings.seeds(conference, 7);
        let seeded: Vec<TeamId> = bracket.seeds[&conference].iter().map(|s| s.team).collect();
        assert_eq!(seeded, expected);
        for (idx, team) in expected.iter().enumerate() {
            let standing = state.standings.get(*team).unwrap();
            assert_eq!(standing.seed, Some(u8::try_from(idx + 1).unwrap()));
            assert_ne!(standing.clinch, ClinchStatus::Eliminated);
        }
    }
    let seeded: usize = bracket.seeds.values().map(Vec::len).sum();
    let eliminated = state
        .standings
        .teams
        .values()
        .filter(|s| s.clinch == ClinchStatus::Eliminated)
        .count();
    assert_eq!(seeded + eliminated, 32);
}

#[test]
fn replaying_a_completed_week_changes_nothing() {
    let mut season = new_season(31);
    for _ in 0..3 {
        season.simulate_week().unwrap();
    }
    let before = season.state().clone();
    for week in 1..=3 {
        let summary = season.simulate_week_number(week).unwrap();
        assert_eq!(summary.status, WeekStatus::AlreadyCompleted);
        assert!(!summary.games.is_empty());
    }
    assert_eq!(season.state(), &before);
}

#[test]
fn nothing_runs_after_the_championship() {
    let mut season = new_season(8);
    season.simulate_to_completion().unwrap();
    let week = season.state().current_week;
    assert!(matches!(season.simulate_week(), Err(SeasonError::SeasonComplete)));
    assert!(matches!(
        season.simulate_week_number(week),
        Err(SeasonError::SeasonComplete)
    ));
    let summary = season.simulate_week_number(week - 1).unwrap();
    assert_eq!(summary.status, WeekStatus::AlreadyCompleted);
    assert_eq!(summary.round.as_deref(), Some("Championship"));
}

#[test]
fn same_seed_same_season() {
    let mut a = new_season(1234);
    let mut b = new_season(1234);
    assert_eq!(a.simulate_to_completion().unwrap(), b.simulate_to_completion().unwrap());
    assert_eq!(a.state(), b.state());
}
