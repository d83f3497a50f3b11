use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::config::PipelineConfig;
use crate::error::EtlError;
use crate::manifest::Manifest;
use crate::metrics::{
    MatchBaseEnhanced, MatchStatsAdvancedEnhanced, PlayerStatsEnhanced, StandingEnhanced,
    build_derive_pool, derive_advanced_metrics, derive_match_metrics, derive_player_metrics,
    derive_standings_metrics, with_derive_pool,
};
use crate::model::{LeagueMatch, PlayerRecord, Standing, WcMatch};
use crate::normalize::{normalize_matches, normalize_players};
use crate::player_merge::merge_player_extracts;
use crate::reference::{Player, Team, TeamIndex, build_players, build_teams};
use crate::split::split_matches;
use crate::tables::{TableRow, read_table, write_table};
use crate::validate::{OutputTables, ValidationReport, ValidationRules, validate_all};

pub fn table_file<T: TableRow>() -> String {
    format!("{}.csv", T::TABLE)
}

fn table_path<T: TableRow>(dir: &Path) -> PathBuf {
    dir.join(table_file::<T>())
}

#[derive(Debug, Clone, Default)]
pub struct SourceTables {
    pub league: Vec<LeagueMatch>,
    pub world_cup: Vec<WcMatch>,
    pub standings: Vec<Standing>,
    pub players: Vec<PlayerRecord>,
}

#[derive(Debug, Clone)]
pub struct PipelineSummary {
    pub output_dir: PathBuf,
    pub teams: usize,
    pub players: usize,
    pub matches: usize,
    pub advanced: usize,
    pub player_stats: usize,
    pub standings: usize,
    pub report: ValidationReport,
    pub manifest: Manifest,
}

fn load_source<T: TableRow>(dir: &Path) -> Result<Vec<T>> {
    let path = table_path::<T>(dir);
    read_table(&path).with_context(|| format!("load {}", T::TABLE))
}

pub fn load_sources(cfg: &PipelineConfig) -> Result<SourceTables> {
    let players = match cfg.player_extracts_dir.as_deref() {
        Some(dir) => merge_player_extracts(dir)
            .with_context(|| format!("merge player extracts in {}", dir.display()))?,
        None => load_source::<PlayerRecord>(&cfg.input_dir)?,
    };
    let sources = SourceTables {
        league: load_source(&cfg.input_dir)?,
        world_cup: load_source(&cfg.input_dir)?,
        standings: load_source(&cfg.input_dir)?,
        players,
    };
    tracing::info!(
        league = sources.league.len(),
        world_cup = sources.world_cup.len(),
        standings = sources.standings.len(),
        players = sources.players.len(),
        "loaded cleaned source tables"
    );
    Ok(sources)
}

struct StageWriter<'a> {
    dir: &'a Path,
    manifest: Manifest,
}

impl StageWriter<'_> {
    fn write<T: TableRow>(&mut self, rows: &[T]) -> Result<()> {
        let file = table_file::<T>();
        let bytes = write_table(&self.dir.join(&file), rows)?;
        self.manifest.record(&file, rows.len(), &bytes);
        Ok(())
    }
}

pub fn run_stages(cfg: &PipelineConfig, sources: &SourceTables) -> Result<PipelineSummary> {
    let mut out = StageWriter {
        dir: &cfg.output_dir,
        manifest: Manifest::default(),
    };
    if cfg.player_extracts_dir.is_some() {
        out.write(&sources.players)?;
    }

    let teams = build_teams(&sources.league, &sources.world_cup);
    let players = build_players(&sources.players, &teams);
    out.write(&teams)?;
    out.write(&players)?;

    let index = TeamIndex::from_teams(&teams);
    let league = normalize_matches(&sources.league, &index);
    let world_cup = normalize_matches(&sources.world_cup, &index);
    let player_stats = normalize_players(&sources.players, &players);
    out.write(&league)?;
    out.write(&world_cup)?;
    out.write(&player_stats)?;

    let split = split_matches(&league, &world_cup);
    out.write(&split.base)?;
    if !split.advanced.is_empty() {
        out.write(&split.advanced)?;
    }

    let pool = build_derive_pool(cfg.derive_parallelism);
    let (matches, advanced, player_stats, standings) = with_derive_pool(&pool, || {
        (
            derive_match_metrics(&split.base),
            derive_advanced_metrics(&split.advanced),
            derive_player_metrics(&player_stats),
            derive_standings_metrics(&sources.standings),
        )
    });
    out.write(&matches)?;
    out.write(&advanced)?;
    out.write(&player_stats)?;
    out.write(&standings)?;

    let tables = OutputTables {
        teams,
        players,
        matches,
        advanced,
        player_stats,
        standings,
    };
    let rules = ValidationRules {
        bounds: cfg.bounds.clone(),
        world_cup_name: cfg.world_cup_name.clone(),
    };
    let report = validate_all(&tables, &rules, cfg.validation_mode).map_err(EtlError::from)?;

    let manifest = out.manifest;
    manifest.write(&cfg.output_dir)?;

    Ok(PipelineSummary {
        output_dir: cfg.output_dir.clone(),
        teams: tables.teams.len(),
        players: tables.players.len(),
        matches: tables.matches.len(),
        advanced: tables.advanced.len(),
        player_stats: tables.player_stats.len(),
        standings: tables.standings.len(),
        report,
        manifest,
    })
}

pub fn run_pipeline(cfg: &PipelineConfig) -> Result<PipelineSummary> {
    tracing::info!(
        input = %cfg.input_dir.display(),
        output = %cfg.output_dir.display(),
        "starting pipeline"
    );
    let sources = load_sources(cfg)?;
    run_stages(cfg, &sources)
}

fn load_output<T: TableRow>(dir: &Path) -> crate::error::Result<Vec<T>> {
    read_table(&table_path::<T>(dir)).map_err(|err| match err {
        EtlError::MissingColumns { table, missing } => {
            EtlError::Validation(crate::validate::ValidationError::schema(table, &missing))
        }
        other => other,
    })
}

/// Missing required columns surface as schema violations.
pub fn load_outputs(dir: &Path) -> crate::error::Result<OutputTables> {
    Ok(OutputTables {
        teams: load_output::<Team>(dir)?,
        players: load_output::<Player>(dir)?,
        matches: load_output::<MatchBaseEnhanced>(dir)?,
        advanced: load_output::<MatchStatsAdvancedEnhanced>(dir)?,
        player_stats: load_output::<PlayerStatsEnhanced>(dir)?,
        standings: load_output::<StandingEnhanced>(dir)?,
    })
}
