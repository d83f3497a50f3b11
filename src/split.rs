use crate::model::{MatchId, TeamId};
use crate::normalize::{NormalizedLeagueMatch, NormalizedWcMatch};
use crate::tables::{RecordView, TableRow, fmt_opt};

/// Fields every competition has. Counters a source does not record stay `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatchBase {
    /// `None` only when a table read back from disk has a blank key.
    pub match_id: Option<MatchId>,
    pub competition_name: String,
    pub season: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub home_team_id: Option<TeamId>,
    pub away_team_id: Option<TeamId>,
    pub home_goals: Option<i64>,
    pub away_goals: Option<i64>,
    pub home_shots: Option<i64>,
    pub away_shots: Option<i64>,
    pub home_sot: Option<i64>,
    pub away_sot: Option<i64>,
    pub home_fouls: Option<i64>,
    pub away_fouls: Option<i64>,
    pub home_corners: Option<i64>,
    pub away_corners: Option<i64>,
    pub home_yellow: Option<i64>,
    pub away_yellow: Option<i64>,
    pub home_red: Option<i64>,
    pub away_red: Option<i64>,
    pub venue: Option<String>,
    pub referee: Option<String>,
}

impl MatchBase {
    pub(crate) const COLUMNS: &'static [&'static str] = &[
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
    ];

    pub(crate) fn read(row: &RecordView<'_>) -> Self {
        Self {
            match_id: row.id("match_id"),
            competition_name: row.text("competition_name").unwrap_or_default(),
            season: row.text("season"),
            date: row.text("date"),
            time: row.text("time"),
            home_team_id: row.id("home_team_id"),
            away_team_id: row.id("away_team_id"),
            home_goals: row.int("home_goals"),
            away_goals: row.int("away_goals"),
            home_shots: row.int("home_shots"),
            away_shots: row.int("away_shots"),
            home_sot: row.int("home_sot"),
            away_sot: row.int("away_sot"),
            home_fouls: row.int("home_fouls"),
            away_fouls: row.int("away_fouls"),
            home_corners: row.int("home_corners"),
            away_corners: row.int("away_corners"),
            home_yellow: row.int("home_yellow"),
            away_yellow: row.int("away_yellow"),
            home_red: row.int("home_red"),
            away_red: row.int("away_red"),
            venue: row.text("venue"),
            referee: row.text("referee"),
        }
    }

    pub(crate) fn cells(&self) -> Vec<String> {
        vec![
            fmt_opt(&self.match_id),
            self.competition_name.clone(),
            fmt_opt(&self.season),
            fmt_opt(&self.date),
            fmt_opt(&self.time),
            fmt_opt(&self.home_team_id),
            fmt_opt(&self.away_team_id),
            fmt_opt(&self.home_goals),
            fmt_opt(&self.away_goals),
            fmt_opt(&self.home_shots),
            fmt_opt(&self.away_shots),
            fmt_opt(&self.home_sot),
            fmt_opt(&self.away_sot),
            fmt_opt(&self.home_fouls),
            fmt_opt(&self.away_fouls),
            fmt_opt(&self.home_corners),
            fmt_opt(&self.away_corners),
            fmt_opt(&self.home_yellow),
            fmt_opt(&self.away_yellow),
            fmt_opt(&self.home_red),
            fmt_opt(&self.away_red),
            fmt_opt(&self.venue),
            fmt_opt(&self.referee),
        ]
    }
}

impl TableRow for MatchBase {
    const TABLE: &'static str = "db_matches_base";
    const HEADER: &'static [&'static str] = MatchBase::COLUMNS;
    const REQUIRED: &'static [&'static str] = &[
        "match_id",
        "home_team_id",
        "away_team_id",
        "home_goals",
        "away_goals",
        "date",
    ];

    fn from_record(row: &RecordView<'_>) -> Self {
        MatchBase::read(row)
    }

    fn to_record(&self) -> Vec<String> {
        self.cells()
    }
}

/// World-Cup-only tactical stats, one-to-one with a `MatchBase` row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatchStatsAdvanced {
    pub match_id: Option<MatchId>,
    pub home_xg: Option<f64>,
    pub away_xg: Option<f64>,
    pub home_possession: Option<f64>,
    pub away_possession: Option<f64>,
    pub home_passes_completed: Option<i64>,
    pub home_passes_attempted: Option<i64>,
    pub away_passes_completed: Option<i64>,
    pub away_passes_attempted: Option<i64>,
    pub home_tackles: Option<i64>,
    pub away_tackles: Option<i64>,
    pub home_interceptions: Option<i64>,
    pub away_interceptions: Option<i64>,
    pub home_clearances: Option<i64>,
    pub away_clearances: Option<i64>,
    pub home_saves: Option<i64>,
    pub away_saves: Option<i64>,
}

impl MatchStatsAdvanced {
    pub(crate) const COLUMNS: &'static [&'static str] = &[
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
    ];

    pub(crate) fn read(row: &RecordView<'_>) -> Self {
        Self {
            match_id: row.id("match_id"),
            home_xg: row.float("home_xg"),
            away_xg: row.float("away_xg"),
            home_possession: row.float("home_possession"),
            away_possession: row.float("away_possession"),
            home_passes_completed: row.int("home_passes_completed"),
            home_passes_attempted: row.int("home_passes_attempted"),
            away_passes_completed: row.int("away_passes_completed"),
            away_passes_attempted: row.int("away_passes_attempted"),
            home_tackles: row.int("home_tackles"),
            away_tackles: row.int("away_tackles"),
            home_interceptions: row.int("home_interceptions"),
            away_interceptions: row.int("away_interceptions"),
            home_clearances: row.int("home_clearances"),
            away_clearances: row.int("away_clearances"),
            home_saves: row.int("home_saves"),
            away_saves: row.int("away_saves"),
        }
    }

    pub(crate) fn cells(&self) -> Vec<String> {
        vec![
            fmt_opt(&self.match_id),
            fmt_opt(&self.home_xg),
            fmt_opt(&self.away_xg),
            fmt_opt(&self.home_possession),
            fmt_opt(&self.away_possession),
            fmt_opt(&self.home_passes_completed),
            fmt_opt(&self.home_passes_attempted),
            fmt_opt(&self.away_passes_completed),
            fmt_opt(&self.away_passes_attempted),
            fmt_opt(&self.home_tackles),
            fmt_opt(&self.away_tackles),
            fmt_opt(&self.home_interceptions),
            fmt_opt(&self.away_interceptions),
            fmt_opt(&self.home_clearances),
            fmt_opt(&self.away_clearances),
            fmt_opt(&self.home_saves),
            fmt_opt(&self.away_saves),
        ]
    }
}

impl TableRow for MatchStatsAdvanced {
    const TABLE: &'static str = "db_match_stats_advanced";
    const HEADER: &'static [&'static str] = MatchStatsAdvanced::COLUMNS;
    const REQUIRED: &'static [&'static str] = &["match_id"];

    fn from_record(row: &RecordView<'_>) -> Self {
        MatchStatsAdvanced::read(row)
    }

    fn to_record(&self) -> Vec<String> {
        self.cells()
    }
}

#[derive(Debug, Clone, Default)]
pub struct SplitMatches {
    pub base: Vec<MatchBase>,
    pub advanced: Vec<MatchStatsAdvanced>,
}

fn league_base(match_id: MatchId, m: &NormalizedLeagueMatch) -> MatchBase {
    let s = &m.source;
    MatchBase {
        match_id: Some(match_id),
        competition_name: s.competition_name.clone(),
        season: s.season.clone(),
        date: s.date.clone(),
        time: s.time.clone(),
        home_team_id: m.home_team_id,
        away_team_id: m.away_team_id,
        home_goals: s.home_goals,
        away_goals: s.away_goals,
        home_shots: s.home_shots,
        away_shots: s.away_shots,
        home_sot: s.home_sot,
        away_sot: s.away_sot,
        home_fouls: s.home_fouls,
        away_fouls: s.away_fouls,
        home_corners: s.home_corners,
        away_corners: s.away_corners,
        home_yellow: s.home_yellow,
        away_yellow: s.away_yellow,
        home_red: s.home_red,
        away_red: s.away_red,
        // League exports carry no venue.
        venue: None,
        referee: s.referee.clone(),
    }
}

fn world_cup_split(match_id: MatchId, m: &NormalizedWcMatch) -> (MatchBase, MatchStatsAdvanced) {
    let s = &m.source;
    let base = MatchBase {
        match_id: Some(match_id),
        competition_name: s.competition().to_string(),
        season: s.season.clone(),
        date: s.date.clone(),
        time: s.time.clone(),
        home_team_id: m.home_team_id,
        away_team_id: m.away_team_id,
        home_goals: s.home_goals,
        away_goals: s.away_goals,
        home_shots: s.home_shots,
        away_shots: s.away_shots,
        home_sot: s.home_sot,
        away_sot: s.away_sot,
        venue: s.venue.clone(),
        // Fouls, corners, cards and referee are not in the World-Cup export.
        ..MatchBase::default()
    };
    let advanced = MatchStatsAdvanced {
        match_id: Some(match_id),
        home_xg: s.home_xg,
        away_xg: s.away_xg,
        home_possession: s.home_possession,
        away_possession: s.away_possession,
        home_passes_completed: s.home_passes_completed,
        home_passes_attempted: s.home_passes_attempted,
        away_passes_completed: s.away_passes_completed,
        away_passes_attempted: s.away_passes_attempted,
        home_tackles: s.home_tackles,
        away_tackles: s.away_tackles,
        home_interceptions: s.home_interceptions,
        away_interceptions: s.away_interceptions,
        home_clearances: s.home_clearances,
        away_clearances: s.away_clearances,
        home_saves: s.home_saves,
        away_saves: s.away_saves,
    };
    (base, advanced)
}

/// Numbers matches 1.. across league rows then World-Cup rows, and emits one
/// base row per match plus one advanced row per World-Cup match.
pub fn split_matches(league: &[NormalizedLeagueMatch], world_cup: &[NormalizedWcMatch]) -> SplitMatches {
    let mut out = SplitMatches {
        base: Vec::with_capacity(league.len() + world_cup.len()),
        advanced: Vec::with_capacity(world_cup.len()),
    };
    let mut next_id: MatchId = 1;

    for m in league {
        out.base.push(league_base(next_id, m));
        next_id += 1;
    }
    for m in world_cup {
        let (base, advanced) = world_cup_split(next_id, m);
        out.base.push(base);
        out.advanced.push(advanced);
        next_id += 1;
    }

    tracing::info!(
        league = league.len(),
        world_cup = world_cup.len(),
        base = out.base.len(),
        advanced = out.advanced.len(),
        "split matches into base and advanced tables"
    );
    out
}

#[cfg(test)]
mod tests {
    use super::split_matches;
    use crate::model::{LeagueMatch, WcMatch};
    use crate::normalize::NormalizedMatch;

    #[test]
    fn league_first_then_world_cup() {
        let league = vec![
            NormalizedMatch {
                home_team_id: Some(1),
                away_team_id: Some(2),
                source: LeagueMatch {
                    referee: Some("M Oliver".to_string()),
                    home_yellow: Some(0),
                    ..LeagueMatch::default()
                },
            };
            2
        ];
        let wc = vec![NormalizedMatch {
            home_team_id: Some(3),
            away_team_id: Some(4),
            source: WcMatch {
                venue: Some("Lusail Stadium".to_string()),
                home_possession: Some(61.0),
                away_possession: Some(39.0),
                ..WcMatch::default()
            },
        }];

        let split = split_matches(&league, &wc);
        let ids: Vec<Option<u32>> = split.base.iter().map(|m| m.match_id).collect();
        assert_eq!(ids, vec![Some(1), Some(2), Some(3)]);
        assert_eq!(split.advanced.len(), 1);
        assert_eq!(split.advanced[0].match_id, Some(3));
        assert_eq!(split.advanced[0].home_possession, Some(61.0));

        assert_eq!(split.base[0].venue, None);
        assert_eq!(split.base[0].referee.as_deref(), Some("M Oliver"));
        // Observed zero survives; missing stays null.
        assert_eq!(split.base[0].home_yellow, Some(0));
        assert_eq!(split.base[0].away_yellow, None);
        assert_eq!(split.base[2].referee, None);
        assert_eq!(split.base[2].home_yellow, None);
        assert_eq!(split.base[2].venue.as_deref(), Some("Lusail Stadium"));
    }

    #[test]
    fn no_world_cup_rows_means_no_advanced_rows() {
        let split = split_matches(&[], &[]);
        assert!(split.base.is_empty());
        assert!(split.advanced.is_empty());
    }
}
