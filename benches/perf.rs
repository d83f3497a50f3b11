use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use wc22_etl::metrics::{build_derive_pool, derive_match_metrics, with_derive_pool};
use wc22_etl::model::{LeagueMatch, WcMatch};
use wc22_etl::normalize::normalize_matches;
use wc22_etl::reference::{TeamIndex, build_teams};
use wc22_etl::split::split_matches;
use wc22_etl::tables::encode_table;
use wc22_etl::validate::{OutputTables, ValidationRules, collect_violations};

fn sample_league(rows: usize, teams: usize) -> Vec<LeagueMatch> {
    (0..rows)
        .map(|i| LeagueMatch {
            date: Some("2022-10-01".to_string()),
            time: Some("15:00:00".to_string()),
            competition_name: "Premier League".to_string(),
            home_team: format!("Club {}", i % teams),
            away_team: format!("Club {}", (i + 1) % teams),
            home_goals: Some((i % 4) as i64),
            away_goals: Some((i % 3) as i64),
            home_shots: Some(12),
            away_shots: Some(9),
            home_sot: Some(5),
            away_sot: Some(3),
            home_yellow: Some(2),
            ..LeagueMatch::default()
        })
        .collect()
}

fn sample_world_cup(rows: usize) -> Vec<WcMatch> {
    (0..rows)
        .map(|i| WcMatch {
            date: Some("2022-11-20".to_string()),
            competition_name: "World Cup".to_string(),
            home_team: format!("Nation {}", i % 32),
            away_team: format!("Nation {}", (i + 7) % 32),
            home_goals: Some(1),
            away_goals: Some(1),
            home_possession: Some(52.0),
            away_possession: Some(48.0),
            home_xg: Some(1.1),
            away_xg: Some(0.9),
            ..WcMatch::default()
        })
        .collect()
}

fn bench_reference_and_split(c: &mut Criterion) {
    let league = sample_league(1900, 98);
    let world_cup = sample_world_cup(64);
    c.bench_function("teams_normalize_split", |b| {
        b.iter(|| {
            let teams = build_teams(black_box(&league), black_box(&world_cup));
            let index = TeamIndex::from_teams(&teams);
            let split = split_matches(
                &normalize_matches(&league, &index),
                &normalize_matches(&world_cup, &index),
            );
            black_box(split.base.len());
        })
    });
}

fn bench_derive_and_validate(c: &mut Criterion) {
    let league = sample_league(1900, 98);
    let world_cup = sample_world_cup(64);
    let teams = build_teams(&league, &world_cup);
    let index = TeamIndex::from_teams(&teams);
    let split = split_matches(
        &normalize_matches(&league, &index),
        &normalize_matches(&world_cup, &index),
    );
    let pool = build_derive_pool(4);

    c.bench_function("derive_match_metrics", |b| {
        b.iter(|| {
            let rows = with_derive_pool(&pool, || derive_match_metrics(black_box(&split.base)));
            black_box(rows.len());
        })
    });

    let tables = OutputTables {
        teams,
        matches: derive_match_metrics(&split.base),
        ..OutputTables::default()
    };
    let rules = ValidationRules::unbounded();
    c.bench_function("collect_violations", |b| {
        b.iter(|| {
            let report = collect_violations(black_box(&tables), &rules);
            black_box(report.checks_run);
        })
    });

    c.bench_function("encode_matches_csv", |b| {
        b.iter(|| {
            let bytes = encode_table(black_box(&tables.matches)).unwrap();
            black_box(bytes.len());
        })
    });
}

criterion_group!(benches, bench_reference_and_split, bench_derive_and_validate);
criterion_main!(benches);
