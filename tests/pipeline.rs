use std::fs;
use std::path::{Path, PathBuf};

use wc22_etl::config::{CardinalityBounds, PipelineConfig, RowBounds};
use wc22_etl::error::EtlError;
use wc22_etl::manifest::Manifest;
use wc22_etl::pipeline::{load_outputs, run_pipeline};
use wc22_etl::validate::{ValidationMode, ValidationRules, validate_all};

fn fixture_dir(name: &str) -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    path
}

fn fixture_config(output: &Path) -> PipelineConfig {
    let mut cfg = PipelineConfig::new(fixture_dir("clean"));
    cfg.output_dir = output.to_path_buf();
    cfg.bounds = CardinalityBounds::unbounded();
    cfg
}

fn read_output(dir: &Path, file: &str) -> String {
    fs::read_to_string(dir.join(file)).expect("output file should be readable")
}

#[test]
fn fixture_run_builds_every_table() {
    let out = tempfile::tempdir().unwrap();
    let summary = run_pipeline(&fixture_config(out.path())).expect("fixture run should pass");

    assert_eq!(summary.teams, 8);
    assert_eq!(summary.players, 3);
    assert_eq!(summary.matches, 5);
    assert_eq!(summary.advanced, 2);
    assert_eq!(summary.player_stats, 3);
    assert_eq!(summary.standings, 4);
    assert!(summary.report.passed());

    let teams = read_output(out.path(), "ref_teams.csv");
    let mut lines = teams.lines();
    assert_eq!(
        lines.next(),
        Some("team_id,team_name,competition_type,country,primary_competition")
    );
    assert_eq!(lines.next(), Some("1,Crystal Palace,league,,Premier League"));
    assert_eq!(lines.nth(3), Some("5,Qatar,international,Qatar,World Cup"));

    let advanced = read_output(out.path(), "db_match_stats_advanced_enhanced.csv");
    let ids: Vec<&str> = advanced
        .lines()
        .skip(1)
        .map(|l| l.split(',').next().unwrap())
        .collect();
    assert_eq!(ids, vec!["4", "5"]);

    for file in [
        "normalized_league_matches.csv",
        "normalized_wc_matches.csv",
        "normalized_wc_players.csv",
        "db_matches_base.csv",
        "db_match_stats_advanced.csv",
        "db_players_stats_enhanced.csv",
        "db_standings_enhanced.csv",
        "manifest.json",
    ] {
        assert!(out.path().join(file).exists(), "{file} should be written");
    }
}

#[test]
fn enhanced_tables_carry_null_not_zero() {
    let out = tempfile::tempdir().unwrap();
    run_pipeline(&fixture_config(out.path())).unwrap();
    let tables = load_outputs(out.path()).unwrap();

    let league = &tables.matches[1];
    assert_eq!(league.base.referee.as_deref(), Some("A Madley"));
    assert_eq!(league.base.home_red, None);
    assert_eq!(league.total_cards, Some(2));
    assert_eq!(league.result, Some('D'));

    let world_cup = &tables.matches[3];
    assert_eq!(world_cup.base.referee, None);
    assert_eq!(world_cup.base.home_yellow, None);
    assert_eq!(world_cup.base.venue.as_deref(), Some("Al Bayt Stadium"));
    assert_eq!(world_cup.home_shot_accuracy, Some(0.0));

    let afif = &tables.player_stats[2];
    assert_eq!(afif.player.record.player, "Akram Afif");
    assert_eq!(afif.player.team_id, Some(5));
    assert_eq!(afif.shot_efficiency, None);
    assert_eq!(afif.player.record.xg_assist, None);

    let valencia = &tables.player_stats[0];
    let recomputed = valencia.player.record.goals.unwrap() as f64
        / valencia.player.record.shots.unwrap() as f64
        * 100.0;
    assert!((valencia.shot_efficiency.unwrap() - recomputed).abs() < 1e-9);

    assert_eq!(tables.standings[0].clean_sheets, Some(3));
    assert_eq!(tables.standings[3].win_percentage, Some(0.0));
}

#[test]
fn rerun_is_byte_identical() {
    let first = tempfile::tempdir().unwrap();
    let second = tempfile::tempdir().unwrap();
    let a = run_pipeline(&fixture_config(first.path())).unwrap();
    let b = run_pipeline(&fixture_config(second.path())).unwrap();

    assert_eq!(a.manifest, b.manifest);
    for entry in &a.manifest.tables {
        let left = fs::read(first.path().join(&entry.file)).unwrap();
        let right = fs::read(second.path().join(&entry.file)).unwrap();
        assert_eq!(left, right, "{} differs between runs", entry.file);
    }
    assert_eq!(
        fs::read(first.path().join("manifest.json")).unwrap(),
        fs::read(second.path().join("manifest.json")).unwrap()
    );
}

#[test]
fn written_outputs_revalidate_and_match_manifest() {
    let out = tempfile::tempdir().unwrap();
    run_pipeline(&fixture_config(out.path())).unwrap();

    let tables = load_outputs(out.path()).unwrap();
    let report = validate_all(&tables, &ValidationRules::unbounded(), ValidationMode::CollectAll)
        .expect("outputs read back from disk should still pass");
    assert!(report.passed());

    let manifest = Manifest::load(out.path()).unwrap();
    assert!(manifest.stale_entries(out.path()).unwrap().is_empty());
    assert_eq!(manifest.get("ref_teams.csv").map(|e| e.rows), Some(8));
}

#[test]
fn player_extracts_replace_cleaned_players() {
    let out = tempfile::tempdir().unwrap();
    let mut cfg = fixture_config(out.path());
    cfg.player_extracts_dir = Some(fixture_dir("extracts"));

    let summary = run_pipeline(&cfg).unwrap();
    assert_eq!(summary.players, 2);

    let players = read_output(out.path(), "ref_players.csv");
    let rows: Vec<&str> = players.lines().skip(1).collect();
    assert_eq!(rows[0], "1,Cody Gakpo,8,Netherlands,FW,23");
    assert_eq!(rows[1], "2,Enner Valencia,6,Ecuador,FW,33");

    let merged = read_output(out.path(), "clean_wc_players.csv");
    assert!(merged.lines().nth(1).unwrap().ends_with(",1.8,0.4"));
}

#[test]
fn missing_source_is_typed() {
    let input = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    let mut cfg = PipelineConfig::new(input.path());
    cfg.output_dir = out.path().to_path_buf();

    let err = run_pipeline(&cfg).unwrap_err();
    match err.downcast_ref::<EtlError>() {
        Some(EtlError::SourceMissing { path }) => {
            assert!(path.ends_with("clean_wc_players.csv"));
        }
        other => panic!("expected SourceMissing, got {other:?}"),
    }
}

#[test]
fn default_bounds_reject_fixture_sized_run() {
    let out = tempfile::tempdir().unwrap();
    let mut cfg = fixture_config(out.path());
    cfg.bounds = CardinalityBounds::default();

    let err = run_pipeline(&cfg).unwrap_err();
    let Some(EtlError::Validation(validation)) = err.downcast_ref::<EtlError>() else {
        panic!("expected a validation error, got {err:#}");
    };
    assert!(validation.to_string().contains("unexpected row count 8"));
    assert!(!out.path().join("manifest.json").exists());
    // Earlier stage outputs stay on disk for inspection.
    assert!(out.path().join("db_standings_enhanced.csv").exists());

    cfg.bounds.teams = Some(RowBounds::range(1, 10));
    cfg.bounds.players = None;
    cfg.bounds.matches = Some(RowBounds::exactly(5));
    cfg.bounds.advanced = Some(RowBounds::exactly(2));
    cfg.bounds.player_stats = None;
    cfg.bounds.standings = Some(RowBounds::exactly(4));
    run_pipeline(&cfg).expect("tuned bounds should pass");
}
