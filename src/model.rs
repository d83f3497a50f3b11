use crate::config::DEFAULT_WORLD_CUP_NAME;
use crate::tables::{RecordView, TableRow, fmt_opt};

pub type TeamId = u32;
pub type PlayerId = u32;
pub type MatchId = u32;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LeagueMatch {
    pub date: Option<String>,
    pub time: Option<String>,
    pub competition_name: String,
    pub season: Option<String>,
    pub home_team: String,
    pub away_team: String,
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
    pub referee: Option<String>,
}

impl TableRow for LeagueMatch {
    const TABLE: &'static str = "clean_league_matches";
    const HEADER: &'static [&'static str] = &[
        "date",
        "time",
        "competition_name",
        "season",
        "home_team",
        "away_team",
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
        "referee",
    ];
    const REQUIRED: &'static [&'static str] = &["home_team", "away_team"];

    fn from_record(row: &RecordView<'_>) -> Self {
        Self {
            date: row.text("date"),
            time: row.text("time"),
            competition_name: row.text("competition_name").unwrap_or_default(),
            season: row.text("season"),
            home_team: row.text("home_team").unwrap_or_default(),
            away_team: row.text("away_team").unwrap_or_default(),
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
            referee: row.text("referee"),
        }
    }

    fn to_record(&self) -> Vec<String> {
        vec![
            fmt_opt(&self.date),
            fmt_opt(&self.time),
            self.competition_name.clone(),
            fmt_opt(&self.season),
            self.home_team.clone(),
            self.away_team.clone(),
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
            fmt_opt(&self.referee),
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct WcMatch {
    pub date: Option<String>,
    pub time: Option<String>,
    pub competition_name: String,
    pub season: Option<String>,
    pub home_team: String,
    pub away_team: String,
    pub home_goals: Option<i64>,
    pub away_goals: Option<i64>,
    pub home_xg: Option<f64>,
    pub away_xg: Option<f64>,
    pub home_possession: Option<f64>,
    pub away_possession: Option<f64>,
    pub home_shots: Option<i64>,
    pub away_shots: Option<i64>,
    pub home_sot: Option<i64>,
    pub away_sot: Option<i64>,
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
    pub venue: Option<String>,
}

impl WcMatch {
    pub fn competition(&self) -> &str {
        let name = self.competition_name.trim();
        if name.is_empty() {
            DEFAULT_WORLD_CUP_NAME
        } else {
            name
        }
    }
}

impl TableRow for WcMatch {
    const TABLE: &'static str = "clean_wc_matches";
    const HEADER: &'static [&'static str] = &[
        "date",
        "time",
        "competition_name",
        "season",
        "home_team",
        "away_team",
        "home_goals",
        "away_goals",
        "home_xg",
        "away_xg",
        "home_possession",
        "away_possession",
        "home_shots",
        "away_shots",
        "home_sot",
        "away_sot",
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
        "venue",
    ];
    const REQUIRED: &'static [&'static str] = &["home_team", "away_team"];

    fn from_record(row: &RecordView<'_>) -> Self {
        Self {
            date: row.text("date"),
            time: row.text("time"),
            competition_name: row.text("competition_name").unwrap_or_default(),
            season: row.text("season"),
            home_team: row.text("home_team").unwrap_or_default(),
            away_team: row.text("away_team").unwrap_or_default(),
            home_goals: row.int("home_goals"),
            away_goals: row.int("away_goals"),
            home_xg: row.float("home_xg"),
            away_xg: row.float("away_xg"),
            home_possession: row.float("home_possession"),
            away_possession: row.float("away_possession"),
            home_shots: row.int("home_shots"),
            away_shots: row.int("away_shots"),
            home_sot: row.int("home_sot"),
            away_sot: row.int("away_sot"),
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
            venue: row.text("venue"),
        }
    }

    fn to_record(&self) -> Vec<String> {
        vec![
            fmt_opt(&self.date),
            fmt_opt(&self.time),
            self.competition_name.clone(),
            fmt_opt(&self.season),
            self.home_team.clone(),
            self.away_team.clone(),
            fmt_opt(&self.home_goals),
            fmt_opt(&self.away_goals),
            fmt_opt(&self.home_xg),
            fmt_opt(&self.away_xg),
            fmt_opt(&self.home_possession),
            fmt_opt(&self.away_possession),
            fmt_opt(&self.home_shots),
            fmt_opt(&self.away_shots),
            fmt_opt(&self.home_sot),
            fmt_opt(&self.away_sot),
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
            fmt_opt(&self.venue),
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Standing {
    pub group: String,
    pub rank: Option<i64>,
    pub team: String,
    pub played: Option<i64>,
    pub wins: Option<i64>,
    pub draws: Option<i64>,
    pub losses: Option<i64>,
    pub goals_for: Option<i64>,
    pub goals_against: Option<i64>,
    pub goal_difference: Option<i64>,
    pub points: Option<i64>,
}

impl Standing {
    pub(crate) const COLUMNS: &'static [&'static str] = &[
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
    ];

    pub(crate) fn read(row: &RecordView<'_>) -> Self {
        Self {
            group: row.text("group").unwrap_or_default(),
            rank: row.int("rank"),
            team: row.text("team").unwrap_or_default(),
            played: row.int("played"),
            wins: row.int("wins"),
            draws: row.int("draws"),
            losses: row.int("losses"),
            goals_for: row.int("goals_for"),
            goals_against: row.int("goals_against"),
            goal_difference: row.int("goal_difference"),
            points: row.int("points"),
        }
    }

    pub(crate) fn cells(&self) -> Vec<String> {
        vec![
            self.group.clone(),
            fmt_opt(&self.rank),
            self.team.clone(),
            fmt_opt(&self.played),
            fmt_opt(&self.wins),
            fmt_opt(&self.draws),
            fmt_opt(&self.losses),
            fmt_opt(&self.goals_for),
            fmt_opt(&self.goals_against),
            fmt_opt(&self.goal_difference),
            fmt_opt(&self.points),
        ]
    }
}

impl TableRow for Standing {
    const TABLE: &'static str = "clean_wc_standings";
    const HEADER: &'static [&'static str] = Standing::COLUMNS;
    const REQUIRED: &'static [&'static str] = &["group", "team"];

    fn from_record(row: &RecordView<'_>) -> Self {
        Standing::read(row)
    }

    fn to_record(&self) -> Vec<String> {
        self.cells()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlayerRecord {
    pub player: String,
    pub team: Option<String>,
    pub position: Option<String>,
    pub age: Option<i64>,
    pub minutes: Option<i64>,
    pub games: Option<i64>,
    pub goals: Option<i64>,
    pub assists: Option<i64>,
    pub shots: Option<i64>,
    pub shots_on_target: Option<i64>,
    pub passes_completed: Option<i64>,
    pub passes: Option<i64>,
    pub passes_pct: Option<f64>,
    pub tackles: Option<i64>,
    pub interceptions: Option<i64>,
    pub clearances: Option<i64>,
    pub touches: Option<i64>,
    pub dispossessed: Option<i64>,
    pub xg: Option<f64>,
    pub xg_assist: Option<f64>,
}

impl PlayerRecord {
    pub(crate) const COLUMNS: &'static [&'static str] = &[
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
    ];

    pub(crate) const STAT_COLUMNS: &'static [&'static str] = &[
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
    ];

    pub(crate) fn read(row: &RecordView<'_>) -> Self {
        let mut out = Self {
            player: row.text("player").unwrap_or_default(),
            team: row.text("team"),
            ..Self::default()
        };
        for col in Self::STAT_COLUMNS {
            out.set_field(col, row.raw(col));
        }
        out
    }

    /// Unknown column names are ignored.
    pub(crate) fn set_field(&mut self, column: &str, raw: Option<&str>) {
        use crate::tables::{parse_float, parse_int};
        let int = || raw.and_then(parse_int);
        let float = || raw.and_then(parse_float);
        match column {
            "position" => self.position = raw.map(str::to_string),
            "age" => self.age = int(),
            "minutes" => self.minutes = int(),
            "games" => self.games = int(),
            "goals" => self.goals = int(),
            "assists" => self.assists = int(),
            "shots" => self.shots = int(),
            "shots_on_target" => self.shots_on_target = int(),
            "passes_completed" => self.passes_completed = int(),
            "passes" => self.passes = int(),
            "passes_pct" => self.passes_pct = float(),
            "tackles" => self.tackles = int(),
            "interceptions" => self.interceptions = int(),
            "clearances" => self.clearances = int(),
            "touches" => self.touches = int(),
            "dispossessed" => self.dispossessed = int(),
            "xg" => self.xg = float(),
            "xg_assist" => self.xg_assist = float(),
            _ => {}
        }
    }

    pub(crate) fn cells(&self) -> Vec<String> {
        vec![
            self.player.clone(),
            fmt_opt(&self.team),
            fmt_opt(&self.position),
            fmt_opt(&self.age),
            fmt_opt(&self.minutes),
            fmt_opt(&self.games),
            fmt_opt(&self.goals),
            fmt_opt(&self.assists),
            fmt_opt(&self.shots),
            fmt_opt(&self.shots_on_target),
            fmt_opt(&self.passes_completed),
            fmt_opt(&self.passes),
            fmt_opt(&self.passes_pct),
            fmt_opt(&self.tackles),
            fmt_opt(&self.interceptions),
            fmt_opt(&self.clearances),
            fmt_opt(&self.touches),
            fmt_opt(&self.dispossessed),
            fmt_opt(&self.xg),
            fmt_opt(&self.xg_assist),
        ]
    }
}

impl TableRow for PlayerRecord {
    const TABLE: &'static str = "clean_wc_players";
    const HEADER: &'static [&'static str] = PlayerRecord::COLUMNS;
    const REQUIRED: &'static [&'static str] = &["player", "team"];

    fn from_record(row: &RecordView<'_>) -> Self {
        PlayerRecord::read(row)
    }

    fn to_record(&self) -> Vec<String> {
        self.cells()
    }
}
