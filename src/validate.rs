use std::collections::{HashMap, HashSet};
use std::fmt;

use chrono::{NaiveDate, NaiveTime};

use crate::config::{CardinalityBounds, DEFAULT_WORLD_CUP_NAME, RowBounds};
use crate::metrics::{
    MatchBaseEnhanced, MatchStatsAdvancedEnhanced, PlayerStatsEnhanced, StandingEnhanced,
};
use crate::reference::{Player, Team};
use crate::tables::TableRow;

const SAMPLE_LIMIT: usize = 5;
const POSSESSION_SUM_MIN: f64 = 98.0;
const POSSESSION_SUM_MAX: f64 = 102.0;
const MIN_PLAYER_AGE: i64 = 15;
const MAX_PLAYER_AGE: i64 = 45;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValidationMode {
    #[default]
    FailFast,
    CollectAll,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CheckGroup {
    ReferenceTables,
    MatchBase,
    AdvancedStats,
    PlayerStats,
    Standings,
}

impl CheckGroup {
    pub const ORDER: [CheckGroup; 5] = [
        CheckGroup::ReferenceTables,
        CheckGroup::MatchBase,
        CheckGroup::AdvancedStats,
        CheckGroup::PlayerStats,
        CheckGroup::Standings,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            CheckGroup::ReferenceTables => "reference tables",
            CheckGroup::MatchBase => "match base",
            CheckGroup::AdvancedStats => "advanced stats",
            CheckGroup::PlayerStats => "player stats",
            CheckGroup::Standings => "standings",
        }
    }

    pub fn for_table(table: &str) -> CheckGroup {
        match table {
            t if t == MatchBaseEnhanced::TABLE => CheckGroup::MatchBase,
            t if t == MatchStatsAdvancedEnhanced::TABLE => CheckGroup::AdvancedStats,
            t if t == PlayerStatsEnhanced::TABLE => CheckGroup::PlayerStats,
            t if t == StandingEnhanced::TABLE => CheckGroup::Standings,
            _ => CheckGroup::ReferenceTables,
        }
    }
}

impl fmt::Display for CheckGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViolationKind {
    ReferentialIntegrity,
    BusinessRule,
    CardinalityDrift,
    Schema,
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ViolationKind::ReferentialIntegrity => "referential integrity",
            ViolationKind::BusinessRule => "business rule",
            ViolationKind::CardinalityDrift => "cardinality drift",
            ViolationKind::Schema => "schema",
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Violation {
    pub group: CheckGroup,
    pub kind: ViolationKind,
    pub table: &'static str,
    pub message: String,
    /// Offending rows, or 1 for table-level checks.
    pub count: usize,
    pub sample: Vec<String>,
}

impl Violation {
    fn new(kind: ViolationKind, table: &'static str, message: impl Into<String>) -> Self {
        Self {
            group: CheckGroup::for_table(table),
            kind,
            table,
            message: message.into(),
            count: 1,
            sample: Vec::new(),
        }
    }

    fn with_offenders(mut self, keys: Vec<String>) -> Self {
        self.count = keys.len();
        self.sample = keys.into_iter().take(SAMPLE_LIMIT).collect();
        self
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.kind, self.table, self.message)?;
        if !self.sample.is_empty() {
            write!(f, " ({} rows, e.g. {})", self.count, self.sample.join(", "))?;
        }
        Ok(())
    }
}

#[derive(thiserror::Error, Debug, Clone)]
#[error("{group} validation failed: {}", summarize(.violations))]
pub struct ValidationError {
    pub group: CheckGroup,
    pub violations: Vec<Violation>,
}

impl ValidationError {
    pub fn schema(table: &'static str, missing: &[String]) -> Self {
        let violation = Violation::new(
            ViolationKind::Schema,
            table,
            format!("missing columns: {}", missing.join(", ")),
        );
        Self {
            group: violation.group,
            violations: vec![violation],
        }
    }
}

fn summarize(violations: &[Violation]) -> String {
    match violations {
        [] => "no violations recorded".to_string(),
        [only] => only.to_string(),
        [first, rest @ ..] => format!("{first} (+{} more)", rest.len()),
    }
}

#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    pub checks_run: usize,
    pub violations: Vec<Violation>,
}

impl ValidationReport {
    pub fn passed(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn failed_groups(&self) -> Vec<CheckGroup> {
        let mut groups: Vec<CheckGroup> = self.violations.iter().map(|v| v.group).collect();
        groups.sort();
        groups.dedup();
        groups
    }

    fn into_error(self) -> Option<ValidationError> {
        let group = self.violations.first()?.group;
        Some(ValidationError {
            group,
            violations: self.violations,
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct OutputTables {
    pub teams: Vec<Team>,
    pub players: Vec<Player>,
    pub matches: Vec<MatchBaseEnhanced>,
    pub advanced: Vec<MatchStatsAdvancedEnhanced>,
    pub player_stats: Vec<PlayerStatsEnhanced>,
    pub standings: Vec<StandingEnhanced>,
}

#[derive(Debug, Clone)]
pub struct ValidationRules {
    pub bounds: CardinalityBounds,
    pub world_cup_name: String,
}

impl Default for ValidationRules {
    fn default() -> Self {
        Self {
            bounds: CardinalityBounds::default(),
            world_cup_name: DEFAULT_WORLD_CUP_NAME.to_string(),
        }
    }
}

impl ValidationRules {
    pub fn unbounded() -> Self {
        Self {
            bounds: CardinalityBounds::unbounded(),
            ..Self::default()
        }
    }
}

type Check = fn(&OutputTables, &ValidationRules) -> Option<Violation>;

const REFERENCE_CHECKS: &[Check] = &[
    team_ids_present,
    team_ids_unique,
    team_ids_contiguous,
    team_count,
    competition_types_known,
    player_ids_present,
    player_ids_unique,
    player_team_ids_present,
    player_team_ids_resolve,
    player_count,
    player_ages_plausible,
];

const MATCH_BASE_CHECKS: &[Check] = &[
    match_ids_present,
    match_ids_unique,
    match_count,
    match_team_ids_present,
    match_team_ids_resolve,
    no_self_matches,
    goals_non_negative,
    match_counters_non_negative,
    sot_within_shots,
    shot_accuracy_within_100,
    dates_well_formed,
    results_known,
];

const ADVANCED_CHECKS: &[Check] = &[
    advanced_count,
    advanced_ids_present,
    advanced_ids_unique,
    advanced_ids_resolve,
    advanced_rows_are_world_cup,
    advanced_matches_world_cup_count,
    possession_within_range,
    possession_sums_to_100,
    xg_non_negative,
    passes_within_attempts,
    pass_accuracy_within_100,
];

const PLAYER_STATS_CHECKS: &[Check] = &[
    stat_player_ids_resolve,
    stat_team_ids_resolve,
    player_stats_count,
    player_counts_non_negative,
    player_sot_within_shots,
    player_passes_within_attempts,
    player_goals_within_shots,
    player_percentages_within_100,
];

const STANDINGS_CHECKS: &[Check] = &[
    standings_count,
    standings_complete,
    standings_results_sum_to_played,
    standings_points_match_results,
    standings_non_negative,
    standings_results_within_played,
    standings_ranks_unique,
    win_percentage_within_100,
];

fn checks_for(group: CheckGroup) -> &'static [Check] {
    match group {
        CheckGroup::ReferenceTables => REFERENCE_CHECKS,
        CheckGroup::MatchBase => MATCH_BASE_CHECKS,
        CheckGroup::AdvancedStats => ADVANCED_CHECKS,
        CheckGroup::PlayerStats => PLAYER_STATS_CHECKS,
        CheckGroup::Standings => STANDINGS_CHECKS,
    }
}

fn run_group(
    group: CheckGroup,
    tables: &OutputTables,
    rules: &ValidationRules,
    mode: ValidationMode,
    report: &mut ValidationReport,
) {
    for check in checks_for(group) {
        report.checks_run += 1;
        let Some(violation) = check(tables, rules) else {
            continue;
        };
        tracing::warn!(group = %group, "{violation}");
        report.violations.push(violation);
        if mode == ValidationMode::FailFast {
            return;
        }
    }
}

fn validate_group(
    group: CheckGroup,
    tables: &OutputTables,
    rules: &ValidationRules,
    mode: ValidationMode,
) -> Result<ValidationReport, ValidationError> {
    let mut report = ValidationReport::default();
    run_group(group, tables, rules, mode, &mut report);
    match report.clone().into_error() {
        Some(err) => Err(err),
        None => {
            tracing::info!(group = %group, checks = report.checks_run, "checks passed");
            Ok(report)
        }
    }
}

pub fn validate_reference_tables(
    tables: &OutputTables,
    rules: &ValidationRules,
    mode: ValidationMode,
) -> Result<ValidationReport, ValidationError> {
    validate_group(CheckGroup::ReferenceTables, tables, rules, mode)
}

pub fn validate_matches_base(
    tables: &OutputTables,
    rules: &ValidationRules,
    mode: ValidationMode,
) -> Result<ValidationReport, ValidationError> {
    validate_group(CheckGroup::MatchBase, tables, rules, mode)
}

pub fn validate_match_stats_advanced(
    tables: &OutputTables,
    rules: &ValidationRules,
    mode: ValidationMode,
) -> Result<ValidationReport, ValidationError> {
    validate_group(CheckGroup::AdvancedStats, tables, rules, mode)
}

pub fn validate_players_stats(
    tables: &OutputTables,
    rules: &ValidationRules,
    mode: ValidationMode,
) -> Result<ValidationReport, ValidationError> {
    validate_group(CheckGroup::PlayerStats, tables, rules, mode)
}

pub fn validate_standings(
    tables: &OutputTables,
    rules: &ValidationRules,
    mode: ValidationMode,
) -> Result<ValidationReport, ValidationError> {
    validate_group(CheckGroup::Standings, tables, rules, mode)
}

pub fn collect_violations(tables: &OutputTables, rules: &ValidationRules) -> ValidationReport {
    let mut report = ValidationReport::default();
    for group in CheckGroup::ORDER {
        run_group(group, tables, rules, ValidationMode::CollectAll, &mut report);
    }
    report
}

/// Top-level entry point. In fail-fast mode the first failing group ends
/// the run; in collect-all mode every group runs before the error is built.
pub fn validate_all(
    tables: &OutputTables,
    rules: &ValidationRules,
    mode: ValidationMode,
) -> Result<ValidationReport, ValidationError> {
    let report = match mode {
        ValidationMode::CollectAll => collect_violations(tables, rules),
        ValidationMode::FailFast => {
            let mut report = ValidationReport::default();
            for group in CheckGroup::ORDER {
                let partial = validate_group(group, tables, rules, mode)?;
                report.checks_run += partial.checks_run;
            }
            report
        }
    };
    if let Some(err) = report.clone().into_error() {
        return Err(err);
    }
    tracing::info!(checks = report.checks_run, "all checks passed");
    Ok(report)
}

// Helpers

fn offenders<T>(
    rows: &[T],
    key: impl Fn(&T) -> String,
    bad: impl Fn(&T) -> bool,
) -> Vec<String> {
    rows.iter().filter(|r| bad(r)).map(key).collect()
}

fn rule(kind: ViolationKind, table: &'static str, message: &str, keys: Vec<String>) -> Option<Violation> {
    if keys.is_empty() {
        None
    } else {
        Some(Violation::new(kind, table, message).with_offenders(keys))
    }
}

fn business(table: &'static str, message: &str, keys: Vec<String>) -> Option<Violation> {
    rule(ViolationKind::BusinessRule, table, message, keys)
}

fn referential(table: &'static str, message: &str, keys: Vec<String>) -> Option<Violation> {
    rule(ViolationKind::ReferentialIntegrity, table, message, keys)
}

fn cardinality(table: &'static str, bounds: Option<RowBounds>, rows: usize) -> Option<Violation> {
    let bounds = bounds?;
    if bounds.contains(rows) {
        return None;
    }
    Some(Violation::new(
        ViolationKind::CardinalityDrift,
        table,
        format!("unexpected row count {rows} (expected {})", bounds.describe()),
    ))
}

fn duplicates<K: std::hash::Hash + Eq + Copy + ToString>(keys: impl Iterator<Item = K>) -> Vec<String> {
    let mut seen = HashSet::new();
    keys.filter(|k| !seen.insert(*k)).map(|k| k.to_string()).collect()
}

/// 1-based data row numbers whose key is null.
fn null_keys<T, K>(rows: &[T], key: impl Fn(&T) -> Option<K>) -> Vec<String> {
    rows.iter()
        .zip(1usize..)
        .filter(|(row, _)| key(row).is_none())
        .map(|(_, n)| format!("row {n}"))
        .collect()
}

fn negative(values: &[Option<i64>]) -> bool {
    values.iter().flatten().any(|v| *v < 0)
}

fn exceeds(part: Option<i64>, whole: Option<i64>) -> bool {
    matches!((part, whole), (Some(p), Some(w)) if p > w)
}

fn over_100(values: &[Option<f64>]) -> bool {
    values.iter().flatten().any(|v| *v > 100.0)
}

fn id_key(id: Option<u32>) -> String {
    id.map_or_else(|| "null".to_string(), |id| id.to_string())
}

fn team_ids(tables: &OutputTables) -> HashSet<u32> {
    tables.teams.iter().filter_map(|t| t.team_id).collect()
}

fn player_key(p: &Player) -> String {
    id_key(p.player_id)
}

fn match_key(m: &MatchBaseEnhanced) -> String {
    id_key(m.base.match_id)
}

fn advanced_key(m: &MatchStatsAdvancedEnhanced) -> String {
    id_key(m.stats.match_id)
}

fn stat_key(p: &PlayerStatsEnhanced) -> String {
    match &p.player.record.team {
        Some(team) => format!("{} ({team})", p.player.record.player),
        None => p.player.record.player.clone(),
    }
}

fn standing_key(s: &StandingEnhanced) -> String {
    format!("{}/{}", s.standing.group, s.standing.team)
}

// Reference tables

fn team_ids_present(t: &OutputTables, _: &ValidationRules) -> Option<Violation> {
    referential(Team::TABLE, "team_id is null", null_keys(&t.teams, |team| team.team_id))
}

fn team_ids_unique(t: &OutputTables, _: &ValidationRules) -> Option<Violation> {
    let dups = duplicates(t.teams.iter().filter_map(|team| team.team_id));
    referential(Team::TABLE, "duplicate team_id", dups)
}

fn team_ids_contiguous(t: &OutputTables, _: &ValidationRules) -> Option<Violation> {
    let mut ids: Vec<u32> = t.teams.iter().filter_map(|team| team.team_id).collect();
    ids.sort_unstable();
    let gaps: Vec<String> = ids
        .iter()
        .zip(1u32..)
        .filter(|(id, expected)| **id != *expected)
        .map(|(id, _)| id.to_string())
        .collect();
    referential(Team::TABLE, "team_id is not a contiguous range from 1", gaps)
}

fn team_count(t: &OutputTables, r: &ValidationRules) -> Option<Violation> {
    cardinality(Team::TABLE, r.bounds.teams, t.teams.len())
}

fn competition_types_known(t: &OutputTables, _: &ValidationRules) -> Option<Violation> {
    let bad = offenders(&t.teams, |team| team.team_name.clone(), |team| {
        team.competition_type.is_none()
    });
    business(Team::TABLE, "competition_type must be league or international", bad)
}

fn player_ids_present(t: &OutputTables, _: &ValidationRules) -> Option<Violation> {
    referential(Player::TABLE, "player_id is null", null_keys(&t.players, |p| p.player_id))
}

fn player_ids_unique(t: &OutputTables, _: &ValidationRules) -> Option<Violation> {
    let dups = duplicates(t.players.iter().filter_map(|p| p.player_id));
    referential(Player::TABLE, "duplicate player_id", dups)
}

fn player_team_ids_present(t: &OutputTables, _: &ValidationRules) -> Option<Violation> {
    let bad = offenders(&t.players, player_key, |p| p.team_id.is_none());
    referential(Player::TABLE, "null team_id", bad)
}

fn player_team_ids_resolve(t: &OutputTables, _: &ValidationRules) -> Option<Violation> {
    let known = team_ids(t);
    let bad = offenders(
        &t.players,
        player_key,
        |p| p.team_id.is_some_and(|id| !known.contains(&id)),
    );
    referential(Player::TABLE, "team_id not in ref_teams", bad)
}

fn player_count(t: &OutputTables, r: &ValidationRules) -> Option<Violation> {
    cardinality(Player::TABLE, r.bounds.players, t.players.len())
}

fn player_ages_plausible(t: &OutputTables, _: &ValidationRules) -> Option<Violation> {
    let bad = offenders(
        &t.players,
        player_key,
        |p| p.age.is_some_and(|age| !(MIN_PLAYER_AGE..=MAX_PLAYER_AGE).contains(&age)),
    );
    business(Player::TABLE, "age outside 15-45", bad)
}

// Match base

fn match_ids_present(t: &OutputTables, _: &ValidationRules) -> Option<Violation> {
    let bad = null_keys(&t.matches, |m| m.base.match_id);
    referential(MatchBaseEnhanced::TABLE, "match_id is null", bad)
}

fn match_ids_unique(t: &OutputTables, _: &ValidationRules) -> Option<Violation> {
    let dups = duplicates(t.matches.iter().filter_map(|m| m.base.match_id));
    referential(MatchBaseEnhanced::TABLE, "duplicate match_id", dups)
}

fn match_count(t: &OutputTables, r: &ValidationRules) -> Option<Violation> {
    cardinality(MatchBaseEnhanced::TABLE, r.bounds.matches, t.matches.len())
}

fn match_team_ids_present(t: &OutputTables, _: &ValidationRules) -> Option<Violation> {
    let bad = offenders(&t.matches, match_key, |m| {
        m.base.home_team_id.is_none() || m.base.away_team_id.is_none()
    });
    referential(MatchBaseEnhanced::TABLE, "null home_team_id or away_team_id", bad)
}

fn match_team_ids_resolve(t: &OutputTables, _: &ValidationRules) -> Option<Violation> {
    let known = team_ids(t);
    let bad = offenders(&t.matches, match_key, |m| {
        [m.base.home_team_id, m.base.away_team_id]
            .iter()
            .flatten()
            .any(|id| !known.contains(id))
    });
    referential(MatchBaseEnhanced::TABLE, "team_id not in ref_teams", bad)
}

fn no_self_matches(t: &OutputTables, _: &ValidationRules) -> Option<Violation> {
    let bad = offenders(&t.matches, match_key, |m| {
        m.base.home_team_id.is_some() && m.base.home_team_id == m.base.away_team_id
    });
    business(MatchBaseEnhanced::TABLE, "home_team_id equals away_team_id", bad)
}

fn goals_non_negative(t: &OutputTables, _: &ValidationRules) -> Option<Violation> {
    let bad = offenders(&t.matches, match_key, |m| {
        [m.base.home_goals, m.base.away_goals]
            .iter()
            .any(|g| g.is_none_or(|g| g < 0))
    });
    business(MatchBaseEnhanced::TABLE, "missing or negative goals", bad)
}

fn match_counters_non_negative(t: &OutputTables, _: &ValidationRules) -> Option<Violation> {
    let bad = offenders(&t.matches, match_key, |m| {
        let b = &m.base;
        negative(&[
            b.home_shots,
            b.away_shots,
            b.home_sot,
            b.away_sot,
            b.home_fouls,
            b.away_fouls,
            b.home_corners,
            b.away_corners,
            b.home_yellow,
            b.away_yellow,
            b.home_red,
            b.away_red,
        ])
    });
    business(MatchBaseEnhanced::TABLE, "negative shot, foul, corner or card count", bad)
}

fn sot_within_shots(t: &OutputTables, _: &ValidationRules) -> Option<Violation> {
    let bad = offenders(&t.matches, match_key, |m| {
        exceeds(m.base.home_sot, m.base.home_shots) || exceeds(m.base.away_sot, m.base.away_shots)
    });
    business(MatchBaseEnhanced::TABLE, "shots on target exceed shots", bad)
}

fn shot_accuracy_within_100(t: &OutputTables, _: &ValidationRules) -> Option<Violation> {
    let bad = offenders(&t.matches, match_key, |m| {
        over_100(&[m.home_shot_accuracy, m.away_shot_accuracy])
    });
    business(MatchBaseEnhanced::TABLE, "shot accuracy above 100%", bad)
}

fn dates_well_formed(t: &OutputTables, _: &ValidationRules) -> Option<Violation> {
    let bad = offenders(&t.matches, match_key, |m| {
        let date_ok = m
            .base
            .date
            .as_deref()
            .is_some_and(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").is_ok());
        let time_ok = m
            .base
            .time
            .as_deref()
            .is_none_or(|tm| NaiveTime::parse_from_str(tm, "%H:%M:%S").is_ok());
        !(date_ok && time_ok)
    });
    business(
        MatchBaseEnhanced::TABLE,
        "date is not YYYY-MM-DD or time is not HH:MM:SS",
        bad,
    )
}

fn results_known(t: &OutputTables, _: &ValidationRules) -> Option<Violation> {
    let bad = offenders(&t.matches, match_key, |m| {
        m.result.is_some_and(|r| !matches!(r, 'H' | 'A' | 'D'))
    });
    business(MatchBaseEnhanced::TABLE, "result is not H, A or D", bad)
}

// Advanced stats

fn advanced_count(t: &OutputTables, r: &ValidationRules) -> Option<Violation> {
    cardinality(MatchStatsAdvancedEnhanced::TABLE, r.bounds.advanced, t.advanced.len())
}

fn advanced_ids_present(t: &OutputTables, _: &ValidationRules) -> Option<Violation> {
    let bad = null_keys(&t.advanced, |m| m.stats.match_id);
    referential(MatchStatsAdvancedEnhanced::TABLE, "match_id is null", bad)
}

fn advanced_ids_unique(t: &OutputTables, _: &ValidationRules) -> Option<Violation> {
    let dups = duplicates(t.advanced.iter().filter_map(|m| m.stats.match_id));
    referential(MatchStatsAdvancedEnhanced::TABLE, "duplicate match_id", dups)
}

fn advanced_ids_resolve(t: &OutputTables, _: &ValidationRules) -> Option<Violation> {
    let known: HashSet<u32> = t.matches.iter().filter_map(|m| m.base.match_id).collect();
    let bad = offenders(&t.advanced, advanced_key, |m| {
        m.stats.match_id.is_some_and(|id| !known.contains(&id))
    });
    referential(MatchStatsAdvancedEnhanced::TABLE, "match_id not in db_matches_base", bad)
}

fn advanced_rows_are_world_cup(t: &OutputTables, r: &ValidationRules) -> Option<Violation> {
    let competition: HashMap<u32, &str> = t
        .matches
        .iter()
        .filter_map(|m| Some((m.base.match_id?, m.base.competition_name.as_str())))
        .collect();
    let bad = offenders(&t.advanced, advanced_key, |m| {
        m.stats
            .match_id
            .and_then(|id| competition.get(&id))
            .is_some_and(|name| *name != r.world_cup_name)
    });
    referential(
        MatchStatsAdvancedEnhanced::TABLE,
        "advanced row traces to a non-World-Cup match",
        bad,
    )
}

fn advanced_matches_world_cup_count(t: &OutputTables, r: &ValidationRules) -> Option<Violation> {
    let world_cup = t
        .matches
        .iter()
        .filter(|m| m.base.competition_name == r.world_cup_name)
        .count();
    if world_cup == t.advanced.len() {
        return None;
    }
    Some(Violation::new(
        ViolationKind::CardinalityDrift,
        MatchStatsAdvancedEnhanced::TABLE,
        format!(
            "{} advanced rows for {world_cup} World-Cup base rows",
            t.advanced.len()
        ),
    ))
}

fn possession_within_range(t: &OutputTables, _: &ValidationRules) -> Option<Violation> {
    let bad = offenders(&t.advanced, advanced_key, |m| {
        [m.stats.home_possession, m.stats.away_possession]
            .iter()
            .flatten()
            .any(|p| !(0.0..=100.0).contains(p))
    });
    business(MatchStatsAdvancedEnhanced::TABLE, "possession outside 0-100", bad)
}

fn possession_sums_to_100(t: &OutputTables, _: &ValidationRules) -> Option<Violation> {
    let bad = offenders(&t.advanced, advanced_key, |m| {
        m.stats
            .home_possession
            .zip(m.stats.away_possession)
            .is_some_and(|(h, a)| !(POSSESSION_SUM_MIN..=POSSESSION_SUM_MAX).contains(&(h + a)))
    });
    business(
        MatchStatsAdvancedEnhanced::TABLE,
        "possession sum outside 98-102",
        bad,
    )
}

fn xg_non_negative(t: &OutputTables, _: &ValidationRules) -> Option<Violation> {
    let bad = offenders(&t.advanced, advanced_key, |m| {
        let s = &m.stats;
        [s.home_xg, s.away_xg].iter().flatten().any(|xg| *xg < 0.0)
            || negative(&[
                s.home_passes_completed,
                s.home_passes_attempted,
                s.away_passes_completed,
                s.away_passes_attempted,
                s.home_tackles,
                s.away_tackles,
                s.home_interceptions,
                s.away_interceptions,
                s.home_clearances,
                s.away_clearances,
                s.home_saves,
                s.away_saves,
            ])
    });
    business(MatchStatsAdvancedEnhanced::TABLE, "negative xG or counting stat", bad)
}

fn passes_within_attempts(t: &OutputTables, _: &ValidationRules) -> Option<Violation> {
    let bad = offenders(&t.advanced, advanced_key, |m| {
        let s = &m.stats;
        exceeds(s.home_passes_completed, s.home_passes_attempted)
            || exceeds(s.away_passes_completed, s.away_passes_attempted)
    });
    business(
        MatchStatsAdvancedEnhanced::TABLE,
        "passes completed exceed passes attempted",
        bad,
    )
}

fn pass_accuracy_within_100(t: &OutputTables, _: &ValidationRules) -> Option<Violation> {
    let bad = offenders(&t.advanced, advanced_key, |m| {
        over_100(&[m.home_pass_accuracy, m.away_pass_accuracy])
    });
    business(MatchStatsAdvancedEnhanced::TABLE, "pass accuracy above 100%", bad)
}

// Player stats

fn stat_player_ids_resolve(t: &OutputTables, _: &ValidationRules) -> Option<Violation> {
    let known: HashSet<u32> = t.players.iter().filter_map(|p| p.player_id).collect();
    let bad = offenders(&t.player_stats, stat_key, |p| {
        p.player.player_id.is_none_or(|id| !known.contains(&id))
    });
    referential(
        PlayerStatsEnhanced::TABLE,
        "player_id null or not in ref_players",
        bad,
    )
}

fn stat_team_ids_resolve(t: &OutputTables, _: &ValidationRules) -> Option<Violation> {
    let known = team_ids(t);
    let bad = offenders(&t.player_stats, stat_key, |p| {
        p.player.team_id.is_none_or(|id| !known.contains(&id))
    });
    referential(PlayerStatsEnhanced::TABLE, "team_id null or not in ref_teams", bad)
}

fn player_stats_count(t: &OutputTables, r: &ValidationRules) -> Option<Violation> {
    cardinality(PlayerStatsEnhanced::TABLE, r.bounds.player_stats, t.player_stats.len())
}

fn player_counts_non_negative(t: &OutputTables, _: &ValidationRules) -> Option<Violation> {
    let bad = offenders(&t.player_stats, stat_key, |p| {
        let r = &p.player.record;
        negative(&[r.goals, r.assists, r.shots, r.shots_on_target, r.minutes, r.games])
            || r.xg.is_some_and(|xg| xg < 0.0)
    });
    business(PlayerStatsEnhanced::TABLE, "negative counting stat", bad)
}

fn player_sot_within_shots(t: &OutputTables, _: &ValidationRules) -> Option<Violation> {
    let bad = offenders(&t.player_stats, stat_key, |p| {
        exceeds(p.player.record.shots_on_target, p.player.record.shots)
    });
    business(PlayerStatsEnhanced::TABLE, "shots_on_target exceed shots", bad)
}

fn player_passes_within_attempts(t: &OutputTables, _: &ValidationRules) -> Option<Violation> {
    let bad = offenders(&t.player_stats, stat_key, |p| {
        exceeds(p.player.record.passes_completed, p.player.record.passes)
    });
    business(PlayerStatsEnhanced::TABLE, "passes_completed exceed passes", bad)
}

fn player_goals_within_shots(t: &OutputTables, _: &ValidationRules) -> Option<Violation> {
    let bad = offenders(&t.player_stats, stat_key, |p| {
        exceeds(p.player.record.goals, p.player.record.shots)
    });
    business(PlayerStatsEnhanced::TABLE, "goals exceed shots", bad)
}

fn player_percentages_within_100(t: &OutputTables, _: &ValidationRules) -> Option<Violation> {
    let bad = offenders(&t.player_stats, stat_key, |p| {
        over_100(&[p.player.record.passes_pct, p.shot_efficiency, p.sot_percentage])
    });
    business(PlayerStatsEnhanced::TABLE, "percentage above 100%", bad)
}

// Standings

fn standings_count(t: &OutputTables, r: &ValidationRules) -> Option<Violation> {
    cardinality(StandingEnhanced::TABLE, r.bounds.standings, t.standings.len())
}

fn standings_complete(t: &OutputTables, _: &ValidationRules) -> Option<Violation> {
    let bad = offenders(&t.standings, standing_key, |s| {
        let s = &s.standing;
        s.rank.is_none()
            || s.played.is_none()
            || s.wins.is_none()
            || s.draws.is_none()
            || s.losses.is_none()
            || s.points.is_none()
    });
    business(
        StandingEnhanced::TABLE,
        "null rank, played, wins, draws, losses or points",
        bad,
    )
}

fn standings_results_sum_to_played(t: &OutputTables, _: &ValidationRules) -> Option<Violation> {
    let bad = offenders(&t.standings, standing_key, |s| {
        let s = &s.standing;
        match (s.wins, s.draws, s.losses, s.played) {
            // An overflowing sum cannot equal played.
            (Some(w), Some(d), Some(l), Some(p)) => {
                w.checked_add(d).and_then(|wd| wd.checked_add(l)) != Some(p)
            }
            _ => false,
        }
    });
    business(StandingEnhanced::TABLE, "wins + draws + losses != played", bad)
}

fn standings_points_match_results(t: &OutputTables, _: &ValidationRules) -> Option<Violation> {
    let bad = offenders(&t.standings, standing_key, |s| {
        let s = &s.standing;
        match (s.wins, s.draws, s.points) {
            (Some(w), Some(d), Some(pts)) => {
                w.checked_mul(3).and_then(|w3| w3.checked_add(d)) != Some(pts)
            }
            _ => false,
        }
    });
    business(StandingEnhanced::TABLE, "points != wins * 3 + draws", bad)
}

fn standings_non_negative(t: &OutputTables, _: &ValidationRules) -> Option<Violation> {
    let bad = offenders(&t.standings, standing_key, |s| {
        let s = &s.standing;
        negative(&[
            s.played,
            s.wins,
            s.draws,
            s.losses,
            s.goals_for,
            s.goals_against,
            s.points,
        ])
    });
    business(StandingEnhanced::TABLE, "negative standings value", bad)
}

fn standings_results_within_played(t: &OutputTables, _: &ValidationRules) -> Option<Violation> {
    let bad = offenders(&t.standings, standing_key, |s| {
        let s = &s.standing;
        exceeds(s.wins, s.played) || exceeds(s.draws, s.played) || exceeds(s.losses, s.played)
    });
    business(StandingEnhanced::TABLE, "wins, draws or losses exceed played", bad)
}

fn standings_ranks_unique(t: &OutputTables, _: &ValidationRules) -> Option<Violation> {
    let mut seen: HashSet<(&str, i64)> = HashSet::new();
    let bad: Vec<String> = t
        .standings
        .iter()
        .filter_map(|s| {
            let rank = s.standing.rank?;
            (!seen.insert((s.standing.group.as_str(), rank))).then(|| standing_key(s))
        })
        .collect();
    business(StandingEnhanced::TABLE, "duplicate rank within group", bad)
}

fn win_percentage_within_100(t: &OutputTables, _: &ValidationRules) -> Option<Violation> {
    let bad = offenders(&t.standings, standing_key, |s| over_100(&[s.win_percentage]));
    business(StandingEnhanced::TABLE, "win_percentage above 100%", bad)
}
