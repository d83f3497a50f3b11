use std::collections::HashMap;

use crate::model::{LeagueMatch, PlayerId, PlayerRecord, TeamId, WcMatch};
use crate::reference::{Player, TeamIndex};
use crate::tables::{RecordView, TableRow, fmt_opt};

/// A cleaned match row that names its teams.
pub trait MatchSource: TableRow + Clone {
    fn home_team(&self) -> &str;
    fn away_team(&self) -> &str;
}

impl MatchSource for LeagueMatch {
    fn home_team(&self) -> &str {
        &self.home_team
    }

    fn away_team(&self) -> &str {
        &self.away_team
    }
}

impl MatchSource for WcMatch {
    fn home_team(&self) -> &str {
        &self.home_team
    }

    fn away_team(&self) -> &str {
        &self.away_team
    }
}

/// A cleaned match plus resolved team ids. Ids are `None` on a mapping miss.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedMatch<M> {
    pub home_team_id: Option<TeamId>,
    pub away_team_id: Option<TeamId>,
    pub source: M,
}

pub type NormalizedLeagueMatch = NormalizedMatch<LeagueMatch>;
pub type NormalizedWcMatch = NormalizedMatch<WcMatch>;

pub fn normalize_matches<M: MatchSource>(rows: &[M], teams: &TeamIndex) -> Vec<NormalizedMatch<M>> {
    let out: Vec<NormalizedMatch<M>> = rows
        .iter()
        .map(|row| NormalizedMatch {
            home_team_id: teams.get(row.home_team()),
            away_team_id: teams.get(row.away_team()),
            source: row.clone(),
        })
        .collect();

    let mapped = out
        .iter()
        .filter(|m| m.home_team_id.is_some() && m.away_team_id.is_some())
        .count();
    if mapped < out.len() {
        tracing::warn!(
            table = M::TABLE,
            unmapped = out.len() - mapped,
            "matches with unresolved team names"
        );
    }
    tracing::info!(table = M::TABLE, rows = out.len(), mapped, "normalized matches");
    out
}

// Ids first, then the two name columns, then the source's remaining columns.
fn ids_first_record<M: MatchSource>(m: &NormalizedMatch<M>) -> Vec<String> {
    let mut out = vec![
        fmt_opt(&m.home_team_id),
        fmt_opt(&m.away_team_id),
        m.source.home_team().to_string(),
        m.source.away_team().to_string(),
    ];
    out.extend(
        M::HEADER
            .iter()
            .zip(m.source.to_record())
            .filter(|(col, _)| !matches!(**col, "home_team" | "away_team"))
            .map(|(_, cell)| cell),
    );
    out
}

impl TableRow for NormalizedLeagueMatch {
    const TABLE: &'static str = "normalized_league_matches";
    const HEADER: &'static [&'static str] = &[
        "home_team_id",
        "away_team_id",
        "home_team",
        "away_team",
        "date",
        "time",
        "competition_name",
        "season",
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

    fn from_record(row: &RecordView<'_>) -> Self {
        Self {
            home_team_id: row.id("home_team_id"),
            away_team_id: row.id("away_team_id"),
            source: LeagueMatch::from_record(row),
        }
    }

    fn to_record(&self) -> Vec<String> {
        ids_first_record(self)
    }
}

impl TableRow for NormalizedWcMatch {
    const TABLE: &'static str = "normalized_wc_matches";
    const HEADER: &'static [&'static str] = &[
        "home_team_id",
        "away_team_id",
        "home_team",
        "away_team",
        "date",
        "time",
        "competition_name",
        "season",
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

    fn from_record(row: &RecordView<'_>) -> Self {
        Self {
            home_team_id: row.id("home_team_id"),
            away_team_id: row.id("away_team_id"),
            source: WcMatch::from_record(row),
        }
    }

    fn to_record(&self) -> Vec<String> {
        ids_first_record(self)
    }
}

/// Merged player stats keyed by surrogate ids.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedPlayer {
    pub player_id: Option<PlayerId>,
    pub team_id: Option<TeamId>,
    pub record: PlayerRecord,
}

impl NormalizedPlayer {
    pub(crate) const COLUMNS: &'static [&'static str] = &[
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
    ];

    pub(crate) fn read(row: &RecordView<'_>) -> Self {
        Self {
            player_id: row.id("player_id"),
            team_id: row.id("team_id"),
            record: PlayerRecord::read(row),
        }
    }

    pub(crate) fn cells(&self) -> Vec<String> {
        let mut out = vec![fmt_opt(&self.player_id), fmt_opt(&self.team_id)];
        out.extend(self.record.cells());
        out
    }
}

impl TableRow for NormalizedPlayer {
    const TABLE: &'static str = "normalized_wc_players";
    const HEADER: &'static [&'static str] = NormalizedPlayer::COLUMNS;
    const REQUIRED: &'static [&'static str] = &["player_id", "team_id"];

    fn from_record(row: &RecordView<'_>) -> Self {
        NormalizedPlayer::read(row)
    }

    fn to_record(&self) -> Vec<String> {
        self.cells()
    }
}

/// Attaches `player_id` by exact `(player, team)` match against the Players
/// table, then `team_id` through that player's row.
pub fn normalize_players(stats: &[PlayerRecord], players: &[Player]) -> Vec<NormalizedPlayer> {
    let by_key: HashMap<(&str, Option<&str>), PlayerId> = players
        .iter()
        .filter_map(|p| Some(((p.player_name.as_str(), p.team_name.as_deref()), p.player_id?)))
        .collect();
    let team_of: HashMap<PlayerId, Option<TeamId>> = players
        .iter()
        .filter_map(|p| Some((p.player_id?, p.team_id)))
        .collect();

    let out: Vec<NormalizedPlayer> = stats
        .iter()
        .map(|row| {
            let player_id = by_key
                .get(&(row.player.as_str(), row.team.as_deref()))
                .copied();
            let team_id = player_id.and_then(|id| team_of.get(&id).copied().flatten());
            NormalizedPlayer {
                player_id,
                team_id,
                record: row.clone(),
            }
        })
        .collect();

    let mapped = out.iter().filter(|p| p.player_id.is_some()).count();
    if mapped < out.len() {
        tracing::warn!(unmapped = out.len() - mapped, "player stats rows without player_id");
    }
    tracing::info!(rows = out.len(), mapped, "normalized player stats");
    out
}
