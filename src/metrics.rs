use rayon::prelude::*;

use crate::model::Standing;
use crate::normalize::NormalizedPlayer;
use crate::split::{MatchBase, MatchStatsAdvanced};
use crate::tables::{RecordView, TableRow, fmt_opt};

#[derive(Debug, Clone, PartialEq)]
pub struct MatchBaseEnhanced {
    pub base: MatchBase,
    pub goal_difference: Option<i64>,
    pub total_goals: Option<i64>,
    pub total_cards: Option<i64>,
    pub home_shot_accuracy: Option<f64>,
    pub away_shot_accuracy: Option<f64>,
    pub result: Option<char>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MatchStatsAdvancedEnhanced {
    pub stats: MatchStatsAdvanced,
    pub home_pass_accuracy: Option<f64>,
    pub away_pass_accuracy: Option<f64>,
    pub possession_delta: Option<f64>,
    pub xg_difference: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerStatsEnhanced {
    pub player: NormalizedPlayer,
    pub goals_per_game: Option<f64>,
    pub assists_per_game: Option<f64>,
    pub shot_efficiency: Option<f64>,
    pub sot_percentage: Option<f64>,
    pub goal_contributions: Option<i64>,
    pub contributions_per_game: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StandingEnhanced {
    pub standing: Standing,
    pub win_percentage: Option<f64>,
    pub points_per_game: Option<f64>,
    pub goals_per_game: Option<f64>,
    /// `played - losses`: a proxy, not matches without conceding.
    pub clean_sheets: Option<i64>,
}

fn positive(den: Option<i64>) -> Option<f64> {
    den.filter(|d| *d > 0).map(|d| d as f64)
}

pub fn percentage(num: Option<i64>, den: Option<i64>) -> Option<f64> {
    Some(num? as f64 / positive(den)? * 100.0)
}

pub fn ratio(num: Option<i64>, den: Option<i64>) -> Option<f64> {
    Some(num? as f64 / positive(den)?)
}

pub fn match_result(home_goals: Option<i64>, away_goals: Option<i64>) -> Option<char> {
    let (home, away) = (home_goals?, away_goals?);
    Some(if home > away {
        'H'
    } else if away > home {
        'A'
    } else {
        'D'
    })
}

pub fn enhance_match(base: &MatchBase) -> MatchBaseEnhanced {
    // Missing cards count as zero; an overflowing sum is null.
    let total_cards = [base.home_yellow, base.away_yellow, base.home_red, base.away_red]
        .into_iter()
        .try_fold(0i64, |acc, c| acc.checked_add(c.unwrap_or(0)));
    let goals = base.home_goals.zip(base.away_goals);
    MatchBaseEnhanced {
        goal_difference: goals.and_then(|(h, a)| h.checked_sub(a)),
        total_goals: goals.and_then(|(h, a)| h.checked_add(a)),
        total_cards,
        home_shot_accuracy: percentage(base.home_sot, base.home_shots),
        away_shot_accuracy: percentage(base.away_sot, base.away_shots),
        result: match_result(base.home_goals, base.away_goals),
        base: base.clone(),
    }
}

pub fn enhance_advanced(stats: &MatchStatsAdvanced) -> MatchStatsAdvancedEnhanced {
    MatchStatsAdvancedEnhanced {
        home_pass_accuracy: percentage(stats.home_passes_completed, stats.home_passes_attempted),
        away_pass_accuracy: percentage(stats.away_passes_completed, stats.away_passes_attempted),
        possession_delta: stats
            .home_possession
            .zip(stats.away_possession)
            .map(|(h, a)| h - a),
        xg_difference: stats.home_xg.zip(stats.away_xg).map(|(h, a)| h - a),
        stats: stats.clone(),
    }
}

pub fn enhance_player(player: &NormalizedPlayer) -> PlayerStatsEnhanced {
    let r = &player.record;
    let goal_contributions = r.goals.unwrap_or(0).checked_add(r.assists.unwrap_or(0));
    PlayerStatsEnhanced {
        goals_per_game: ratio(r.goals, r.games),
        assists_per_game: ratio(r.assists, r.games),
        shot_efficiency: percentage(r.goals, r.shots),
        sot_percentage: percentage(r.shots_on_target, r.shots),
        goal_contributions,
        contributions_per_game: ratio(goal_contributions, r.games),
        player: player.clone(),
    }
}

pub fn enhance_standing(standing: &Standing) -> StandingEnhanced {
    StandingEnhanced {
        win_percentage: percentage(standing.wins, standing.played),
        points_per_game: ratio(standing.points, standing.played),
        goals_per_game: ratio(standing.goals_for, standing.played),
        clean_sheets: standing
            .played
            .zip(standing.losses)
            .and_then(|(p, l)| p.checked_sub(l)),
        standing: standing.clone(),
    }
}

pub fn derive_match_metrics(rows: &[MatchBase]) -> Vec<MatchBaseEnhanced> {
    let out: Vec<_> = rows.par_iter().map(enhance_match).collect();
    tracing::info!(rows = out.len(), "derived match metrics");
    out
}

pub fn derive_advanced_metrics(rows: &[MatchStatsAdvanced]) -> Vec<MatchStatsAdvancedEnhanced> {
    let out: Vec<_> = rows.par_iter().map(enhance_advanced).collect();
    tracing::info!(rows = out.len(), "derived advanced match metrics");
    out
}

pub fn derive_player_metrics(rows: &[NormalizedPlayer]) -> Vec<PlayerStatsEnhanced> {
    let out: Vec<_> = rows.par_iter().map(enhance_player).collect();
    tracing::info!(rows = out.len(), "derived player metrics");
    out
}

pub fn derive_standings_metrics(rows: &[Standing]) -> Vec<StandingEnhanced> {
    let out: Vec<_> = rows.par_iter().map(enhance_standing).collect();
    tracing::info!(rows = out.len(), "derived standings metrics");
    out
}

pub fn build_derive_pool(threads: usize) -> Option<rayon::ThreadPool> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads.clamp(1, 32))
        .thread_name(|idx| format!("derive-{idx}"))
        .build()
        .ok()
}

pub fn with_derive_pool<T>(pool: &Option<rayon::ThreadPool>, action: impl FnOnce() -> T + Send) -> T
where
    T: Send,
{
    if let Some(pool) = pool.as_ref() {
        pool.install(action)
    } else {
        action()
    }
}

fn read_char(row: &RecordView<'_>, name: &str) -> Option<char> {
    let raw = row.raw(name)?;
    let mut chars = raw.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c),
        // Anything longer is kept as an invalid marker for the validator.
        _ => Some('?'),
    }
}

fn with_extra(mut cells: Vec<String>, extra: Vec<String>) -> Vec<String> {
    cells.extend(extra);
    cells
}

impl TableRow for MatchBaseEnhanced {
    const TABLE: &'static str = "db_matches_base_enhanced";
    const HEADER: &'static [&'static str] = &[
        "match_id",
        "competition_name",
        "season",
        "date",
        "time",
        "home_team_id",
        "away_team_id",
        "home_goals",
        "away_goals",
        "home_shots",
        "away_shots",
        "home_sot",
        "away_sot",
        "home_fouls",
        "away_fouls",
        "home_corners",
        "away_corners",
        "home_yellow",
        "away_yellow",
        "home_red",
        "away_red",
        "venue",
        "referee",
        "goal_difference",
        "total_goals",
        "total_cards",
        "home_shot_accuracy",
        "away_shot_accuracy",
        "result",
    ];
    const REQUIRED: &'static [&'static str] = <MatchBase as TableRow>::REQUIRED;

    fn from_record(row: &RecordView<'_>) -> Self {
        Self {
            base: MatchBase::read(row),
            goal_difference: row.int("goal_difference"),
            total_goals: row.int("total_goals"),
            total_cards: row.int("total_cards"),
            home_shot_accuracy: row.float("home_shot_accuracy"),
            away_shot_accuracy: row.float("away_shot_accuracy"),
            result: read_char(row, "result"),
        }
    }

    fn to_record(&self) -> Vec<String> {
        with_extra(
            self.base.cells(),
            vec![
                fmt_opt(&self.goal_difference),
                fmt_opt(&self.total_goals),
                fmt_opt(&self.total_cards),
                fmt_opt(&self.home_shot_accuracy),
                fmt_opt(&self.away_shot_accuracy),
                fmt_opt(&self.result),
            ],
        )
    }
}

impl TableRow for MatchStatsAdvancedEnhanced {
    const TABLE: &'static str = "db_match_stats_advanced_enhanced";
    const HEADER: &'static [&'static str] = &[
        "match_id",
        "home_xg",
        "away_xg",
        "home_possession",
        "away_possession",
        "home_passes_completed",
        "home_passes_attempted",
        "away_passes_completed",
        "away_passes_attempted",
        "home_tackles",
        "away_tackles",
        "home_interceptions",
        "away_interceptions",
        "home_clearances",
        "away_clearances",
        "home_saves",
        "away_saves",
        "home_pass_accuracy",
        "away_pass_accuracy",
        "possession_delta",
        "xg_difference",
    ];
    const REQUIRED: &'static [&'static str] = &["match_id"];

    fn from_record(row: &RecordView<'_>) -> Self {
        Self {
            stats: MatchStatsAdvanced::read(row),
            home_pass_accuracy: row.float("home_pass_accuracy"),
            away_pass_accuracy: row.float("away_pass_accuracy"),
            possession_delta: row.float("possession_delta"),
            xg_difference: row.float("xg_difference"),
        }
    }

    fn to_record(&self) -> Vec<String> {
        with_extra(
            self.stats.cells(),
            vec![
                fmt_opt(&self.home_pass_accuracy),
                fmt_opt(&self.away_pass_accuracy),
                fmt_opt(&self.possession_delta),
                fmt_opt(&self.xg_difference),
            ],
        )
    }
}

impl TableRow for PlayerStatsEnhanced {
    const TABLE: &'static str = "db_players_stats_enhanced";
    const HEADER: &'static [&'static str] = &[
        "player_id",
        "team_id",
        "player",
        "team",
        "position",
        "age",
        "minutes",
        "games",
        "goals",
        "assists",
        "shots",
        "shots_on_target",
        "passes_completed",
        "passes",
        "passes_pct",
        "tackles",
        "interceptions",
        "clearances",
        "touches",
        "dispossessed",
        "xg",
        "xg_assist",
        "goals_per_game",
        "assists_per_game",
        "shot_efficiency",
        "sot_percentage",
        "goal_contributions",
        "contributions_per_game",
    ];
    const REQUIRED: &'static [&'static str] = &["player_id", "team_id"];

    fn from_record(row: &RecordView<'_>) -> Self {
        Self {
            player: NormalizedPlayer::read(row),
            goals_per_game: row.float("goals_per_game"),
            assists_per_game: row.float("assists_per_game"),
            shot_efficiency: row.float("shot_efficiency"),
            sot_percentage: row.float("sot_percentage"),
            goal_contributions: row.int("goal_contributions"),
            contributions_per_game: row.float("contributions_per_game"),
        }
    }

    fn to_record(&self) -> Vec<String> {
        with_extra(
            self.player.cells(),
            vec![
                fmt_opt(&self.goals_per_game),
                fmt_opt(&self.assists_per_game),
                fmt_opt(&self.shot_efficiency),
                fmt_opt(&self.sot_percentage),
                fmt_opt(&self.goal_contributions),
                fmt_opt(&self.contributions_per_game),
            ],
        )
    }
}

impl TableRow for StandingEnhanced {
    const TABLE: &'static str = "db_standings_enhanced";
    const HEADER: &'static [&'static str] = &[
        "group",
        "rank",
        "team",
        "played",
        "wins",
        "draws",
        "losses",
        "goals_for",
        "goals_against",
        "goal_difference",
        "points",
        "win_percentage",
        "points_per_game",
        "goals_per_game",
        "clean_sheets",
    ];
    const REQUIRED: &'static [&'static str] = &[
        "group", "rank", "team", "played", "wins", "draws", "losses", "points",
    ];

    fn from_record(row: &RecordView<'_>) -> Self {
        Self {
            standing: Standing::read(row),
            win_percentage: row.float("win_percentage"),
            points_per_game: row.float("points_per_game"),
            goals_per_game: row.float("goals_per_game"),
            clean_sheets: row.int("clean_sheets"),
        }
    }

    fn to_record(&self) -> Vec<String> {
        with_extra(
            self.standing.cells(),
            vec![
                fmt_opt(&self.win_percentage),
                fmt_opt(&self.points_per_game),
                fmt_opt(&self.goals_per_game),
                fmt_opt(&self.clean_sheets),
            ],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PlayerRecord;

    #[test]
    fn match_metrics_treat_missing_cards_as_zero() {
        let base = MatchBase {
            home_goals: Some(3),
            away_goals: Some(1),
            home_shots: Some(8),
            home_sot: Some(4),
            away_shots: Some(0),
            away_sot: Some(0),
            home_yellow: Some(2),
            away_red: Some(1),
            ..MatchBase::default()
        };
        let m = enhance_match(&base);
        assert_eq!(m.goal_difference, Some(2));
        assert_eq!(m.total_goals, Some(4));
        assert_eq!(m.total_cards, Some(3));
        assert_eq!(m.home_shot_accuracy, Some(50.0));
        assert_eq!(m.away_shot_accuracy, None);
        assert_eq!(m.result, Some('H'));
    }

    #[test]
    fn result_letters() {
        assert_eq!(match_result(Some(0), Some(2)), Some('A'));
        assert_eq!(match_result(Some(1), Some(1)), Some('D'));
        assert_eq!(match_result(None, Some(1)), None);
    }

    #[test]
    fn advanced_metrics_need_both_sides() {
        let stats = MatchStatsAdvanced {
            home_possession: Some(61.0),
            away_possession: Some(40.5),
            home_xg: Some(1.2),
            home_passes_completed: Some(450),
            home_passes_attempted: Some(500),
            away_passes_completed: Some(10),
            away_passes_attempted: Some(0),
            ..MatchStatsAdvanced::default()
        };
        let e = enhance_advanced(&stats);
        assert_eq!(e.home_pass_accuracy, Some(90.0));
        assert_eq!(e.away_pass_accuracy, None);
        assert_eq!(e.possession_delta, Some(20.5));
        assert_eq!(e.xg_difference, None);
    }

    #[test]
    fn player_metrics_round_trip_from_own_columns() {
        let player = NormalizedPlayer {
            player_id: Some(1),
            team_id: Some(1),
            record: PlayerRecord {
                player: "Mbappe".to_string(),
                games: Some(7),
                goals: Some(8),
                assists: None,
                shots: Some(30),
                shots_on_target: Some(15),
                ..PlayerRecord::default()
            },
        };
        let e = enhance_player(&player);
        let recomputed = 8.0 / 30.0 * 100.0;
        assert!((e.shot_efficiency.unwrap() - recomputed).abs() < 1e-9);
        assert_eq!(e.sot_percentage, Some(50.0));
        assert_eq!(e.goal_contributions, Some(8));
        assert!((e.contributions_per_game.unwrap() - 8.0 / 7.0).abs() < 1e-9);
        assert_eq!(e.assists_per_game, None);

        let mut no_shots = player.clone();
        no_shots.record.shots = Some(0);
        assert_eq!(enhance_player(&no_shots).shot_efficiency, None);
        no_shots.record.shots = None;
        assert_eq!(enhance_player(&no_shots).shot_efficiency, None);
    }

    #[test]
    fn standings_metrics_keep_simplified_clean_sheets() {
        let s = Standing {
            group: "Group A".to_string(),
            rank: Some(1),
            team: "Netherlands".to_string(),
            played: Some(3),
            wins: Some(2),
            draws: Some(1),
            losses: Some(0),
            goals_for: Some(5),
            goals_against: Some(1),
            goal_difference: Some(4),
            points: Some(7),
        };
        let e = enhance_standing(&s);
        assert!((e.win_percentage.unwrap() - 200.0 / 3.0).abs() < 1e-9);
        assert!((e.points_per_game.unwrap() - 7.0 / 3.0).abs() < 1e-9);
        assert_eq!(e.clean_sheets, Some(3));

        let unplayed = Standing {
            played: Some(0),
            ..s
        };
        let e = enhance_standing(&unplayed);
        assert_eq!(e.win_percentage, None);
        assert_eq!(e.points_per_game, None);
        assert_eq!(e.goals_per_game, None);
    }

    #[test]
    fn parallel_derivation_preserves_order() {
        let rows: Vec<MatchBase> = (1..=200)
            .map(|id| MatchBase {
                match_id: Some(id),
                home_goals: Some(i64::from(id % 4)),
                away_goals: Some(1),
                ..MatchBase::default()
            })
            .collect();
        let pool = build_derive_pool(4);
        let out = with_derive_pool(&pool, || derive_match_metrics(&rows));
        let ids: Vec<u32> = out.iter().filter_map(|m| m.base.match_id).collect();
        assert_eq!(ids, (1..=200).collect::<Vec<u32>>());
    }

    #[test]
    fn corrupt_counts_overflow_to_null() {
        let base = MatchBase {
            home_goals: Some(i64::MAX),
            away_goals: Some(1),
            home_yellow: Some(i64::MAX),
            away_yellow: Some(2),
            ..MatchBase::default()
        };
        let m = enhance_match(&base);
        assert_eq!(m.total_goals, None);
        assert_eq!(m.goal_difference, Some(i64::MAX - 1));
        assert_eq!(m.total_cards, None);
        assert_eq!(m.result, Some('H'));

        let player = NormalizedPlayer {
            player_id: Some(1),
            team_id: Some(1),
            record: PlayerRecord {
                player: "Corrupt".to_string(),
                games: Some(3),
                goals: Some(i64::MAX),
                assists: Some(1),
                ..PlayerRecord::default()
            },
        };
        let e = enhance_player(&player);
        assert_eq!(e.goal_contributions, None);
        assert_eq!(e.contributions_per_game, None);

        let standing = Standing {
            played: Some(i64::MIN),
            losses: Some(1),
            ..Standing::default()
        };
        assert_eq!(enhance_standing(&standing).clean_sheets, None);
    }
}
