use gridiron_game::{
    LeagueConfig, LeagueLayout, SeasonStreams, TeamId, TimeSlot, generate_schedule,
    sample_league, validate_schedule,
};
use std::collections::{BTreeMap, BTreeSet};

const SEEDS: [u64; 6] = [0, 1, 42, 0xDEAD_BEEF, 2024, u64::MAX];

fn layout() -> LeagueLayout {
    LeagueLayout::from_records(&sample_league()).expect("sample league fills the layout")
}

#[test]
fn every_seed_yields_a_complete_schedule() {
    let layout = layout();
    let league = LeagueConfig::default();
    for seed in SEEDS {
        let generated =
            generate_schedule(&layout, &league, 2024, &SeasonStreams::from_user_seed(seed)).unwrap();
        let schedule = &generated.schedule;
        assert!(generated.validation.is_valid(), "seed {seed}: {:?}", generated.validation);
        assert_eq!(schedule.games.len(), 272, "seed {seed}");

        let mut per_team: BTreeMap<TeamId, usize> = BTreeMap::new();
        for week in 1..=schedule.weeks {
            let mut seen = BTreeSet::new();
            for game in schedule.week(week) {
                assert!(seen.insert(game.home), "seed {seed}: {} twice in week {week}", game.home);
                assert!(seen.insert(game.away), "seed {seed}: {} twice in week {week}", game.away);
                *per_team.entry(game.home).or_default() += 1;
                *per_team.entry(game.away).or_default() += 1;
            }
        }
        assert_eq!(per_team.len(), 32);
        assert!(per_team.values().all(|n| *n == 17), "seed {seed}: {per_team:?}");

        for team in layout.teams() {
            let byes = schedule.bye_weeks(team);
            assert_eq!(byes.len(), 1, "seed {seed}: {team} byes {byes:?}");
            assert!(league.in_bye_window(byes[0]), "seed {seed}: {team} bye {byes:?}");
        }
    }
}

#[test]
fn same_seed_same_schedule() {
    let layout = layout();
    let league = LeagueConfig::default();
    let streams = SeasonStreams::from_user_seed(0x00C0_FFEE);
    let a = generate_schedule(&layout, &league, 2025, &streams).unwrap();
    let b = generate_schedule(&layout, &league, 2025, &streams).unwrap();
    assert_eq!(a.schedule, b.schedule);
    assert_eq!(a.schedule.fingerprint(), b.schedule.fingerprint());

    let other = generate_schedule(&layout, &league, 2025, &SeasonStreams::from_user_seed(1)).unwrap();
    assert_ne!(a.schedule.fingerprint(), other.schedule.fingerprint());
}

#[test]
fn division_rivals_meet_home_and_away() {
    let layout = layout();
    let generated =
        generate_schedule(&layout, &LeagueConfig::default(), 2024, &SeasonStreams::from_user_seed(9))
            .unwrap();
    for conference in 0..2 {
        for division in 0..4 {
            for a in 0..4 {
                for b in 0..4 {
                    if a == b {
                        continue;
                    }
                    let (home, away) = (
                        layout.team(conference, division, a),
                        layout.team(conference, division, b),
                    );
                    let hosted = generated
                        .schedule
                        .games
                        .iter()
                        .filter(|g| g.home == home && g.away == away)
                        .count();
                    assert_eq!(hosted, 1, "{home} should host {away} once");
                }
            }
        }
    }
}

#[test]
fn prime_time_respects_the_cap_and_short_weeks() {
    let layout = layout();
    let league = LeagueConfig::default();
    let generated =
        generate_schedule(&layout, &league, 2024, &SeasonStreams::from_user_seed(3)).unwrap();
    let schedule = &generated.schedule;
    for team in layout.teams() {
        let prime = schedule.team_games(team).filter(|g| g.prime_time).count();
        assert!(prime <= usize::from(league.prime_time_cap), "{team} has {prime}");
    }
    for game in &schedule.games {
        assert_eq!(game.prime_time, game.time_slot.is_prime_time());
    }
    if generated.validation.warnings.is_empty() {
        for week in 2..=schedule.weeks {
            let monday: BTreeSet<TeamId> = schedule
                .week(week - 1)
                .filter(|g| g.time_slot == TimeSlot::Monday)
                .flat_map(|g| [g.home, g.away])
                .collect();
            assert!(
                schedule
                    .week(week)
                    .filter(|g| g.time_slot == TimeSlot::Thursday)
                    .all(|g| !monday.contains(&g.home) && !monday.contains(&g.away))
            );
        }
    }
}

#[test]
fn tampered_schedules_fail_validation() {
    let layout = layout();
    let league = LeagueConfig::default();
    let mut schedule = generate_schedule(&layout, &league, 2024, &SeasonStreams::from_user_seed(5))
        .unwrap()
        .schedule;
    schedule.games.pop();
    let report = validate_schedule(&schedule, &layout, &league);
    assert!(!report.is_valid());
    assert!(report.errors.iter().any(|e| e.contains("expected 272 games")));
}
