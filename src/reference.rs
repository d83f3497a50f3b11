use std::collections::HashMap;
use std::fmt;

use crate::model::{LeagueMatch, PlayerId, PlayerRecord, TeamId, WcMatch};
use crate::tables::{RecordView, TableRow, fmt_opt};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompetitionType {
    League,
    International,
}

impl CompetitionType {
    pub fn as_str(self) -> &'static str {
        match self {
            CompetitionType::League => "league",
            CompetitionType::International => "international",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "league" => Some(CompetitionType::League),
            "international" => Some(CompetitionType::International),
            _ => None,
        }
    }
}

impl fmt::Display for CompetitionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Team {
    pub team_id: Option<TeamId>,
    pub team_name: String,
    /// `None` only when a table read from disk carries an unknown label.
    pub competition_type: Option<CompetitionType>,
    pub country: Option<String>,
    pub primary_competition: String,
}

impl TableRow for Team {
    const TABLE: &'static str = "ref_teams";
    const HEADER: &'static [&'static str] = &[
        "team_id",
        "team_name",
        "competition_type",
        "country",
        "primary_competition",
    ];
    const REQUIRED: &'static [&'static str] = &[
        "team_id",
        "team_name",
        "competition_type",
        "primary_competition",
    ];

    fn from_record(row: &RecordView<'_>) -> Self {
        Self {
            team_id: row.id("team_id"),
            team_name: row.text("team_name").unwrap_or_default(),
            competition_type: row.raw("competition_type").and_then(CompetitionType::parse),
            country: row.text("country"),
            primary_competition: row.text("primary_competition").unwrap_or_default(),
        }
    }

    fn to_record(&self) -> Vec<String> {
        vec![
            fmt_opt(&self.team_id),
            self.team_name.clone(),
            fmt_opt(&self.competition_type),
            fmt_opt(&self.country),
            self.primary_competition.clone(),
        ]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    pub player_id: Option<PlayerId>,
    pub player_name: String,
    pub team_id: Option<TeamId>,
    pub team_name: Option<String>,
    pub position: Option<String>,
    pub age: Option<i64>,
}

impl TableRow for Player {
    const TABLE: &'static str = "ref_players";
    const HEADER: &'static [&'static str] = &[
        "player_id",
        "player_name",
        "team_id",
        "team_name",
        "position",
        "age",
    ];
    const REQUIRED: &'static [&'static str] = &["player_id", "player_name", "team_id"];

    fn from_record(row: &RecordView<'_>) -> Self {
        Self {
            player_id: row.id("player_id"),
            player_name: row.text("player_name").unwrap_or_default(),
            team_id: row.id("team_id"),
            team_name: row.text("team_name"),
            position: row.text("position"),
            age: row.int("age"),
        }
    }

    fn to_record(&self) -> Vec<String> {
        vec![
            fmt_opt(&self.player_id),
            self.player_name.clone(),
            fmt_opt(&self.team_id),
            fmt_opt(&self.team_name),
            fmt_opt(&self.position),
            fmt_opt(&self.age),
        ]
    }
}

/// Name → id lookup over a built Teams table. Names compare trimmed.
#[derive(Debug, Clone, Default)]
pub struct TeamIndex {
    by_name: HashMap<String, TeamId>,
}

impl TeamIndex {
    pub fn from_teams(teams: &[Team]) -> Self {
        let mut by_name = HashMap::with_capacity(teams.len());
        for team in teams {
            if let Some(id) = team.team_id {
                by_name.entry(team.team_name.trim().to_string()).or_insert(id);
            }
        }
        Self { by_name }
    }

    pub fn get(&self, name: &str) -> Option<TeamId> {
        self.by_name.get(name.trim()).copied()
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

/// Accumulator threaded through team discovery: the next free id, the names
/// already assigned, and the rows emitted so far.
#[derive(Debug)]
struct TeamFold {
    next_id: TeamId,
    seen: HashMap<String, TeamId>,
    teams: Vec<Team>,
}

impl TeamFold {
    fn new() -> Self {
        Self {
            next_id: 1,
            seen: HashMap::new(),
            teams: Vec::new(),
        }
    }

    fn observe(mut self, sighting: TeamSighting<'_>) -> Self {
        let name = sighting.name.trim();
        if name.is_empty() || self.seen.contains_key(name) {
            return self;
        }
        let team_id = self.next_id;
        self.next_id += 1;
        self.seen.insert(name.to_string(), team_id);
        self.teams.push(Team {
            team_id: Some(team_id),
            team_name: name.to_string(),
            competition_type: Some(sighting.kind),
            country: match sighting.kind {
                CompetitionType::League => None,
                // National sides are named after their country.
                CompetitionType::International => Some(name.to_string()),
            },
            primary_competition: sighting.competition.to_string(),
        });
        self
    }
}

struct TeamSighting<'a> {
    name: &'a str,
    kind: CompetitionType,
    competition: &'a str,
}

/// Assigns team ids in first-seen order: league matches row by row (home
/// before away), then World-Cup matches the same way. A name seen in both
/// sources keeps its league tag.
pub fn build_teams(league: &[LeagueMatch], world_cup: &[WcMatch]) -> Vec<Team> {
    let league_sightings = league.iter().flat_map(|m| {
        [&m.home_team, &m.away_team].map(|name| TeamSighting {
            name,
            kind: CompetitionType::League,
            competition: &m.competition_name,
        })
    });
    let wc_sightings = world_cup.iter().flat_map(|m| {
        [&m.home_team, &m.away_team].map(|name| TeamSighting {
            name,
            kind: CompetitionType::International,
            competition: m.competition(),
        })
    });

    let fold = league_sightings
        .chain(wc_sightings)
        .fold(TeamFold::new(), TeamFold::observe);

    let league_count = fold
        .teams
        .iter()
        .filter(|t| t.competition_type == Some(CompetitionType::League))
        .count();
    tracing::info!(
        teams = fold.teams.len(),
        league = league_count,
        international = fold.teams.len() - league_count,
        "built teams reference table"
    );
    fold.teams
}

/// One player per merged player row; `player_id` is the 1-based row index.
/// A team name with no Teams entry leaves `team_id` null.
pub fn build_players(players: &[PlayerRecord], teams: &[Team]) -> Vec<Player> {
    let index = TeamIndex::from_teams(teams);
    let out: Vec<Player> = players
        .iter()
        .enumerate()
        .map(|(idx, row)| Player {
            player_id: Some(idx as PlayerId + 1),
            player_name: row.player.clone(),
            team_id: row.team.as_deref().and_then(|name| index.get(name)),
            team_name: row.team.clone(),
            position: row.position.clone(),
            age: row.age,
        })
        .collect();

    let unmapped = out.iter().filter(|p| p.team_id.is_none()).count();
    if unmapped > 0 {
        tracing::warn!(unmapped, "players whose team has no team_id");
    }
    tracing::info!(players = out.len(), "built players reference table");
    out
}

#[cfg(test)]
mod tests {
    use super::{CompetitionType, TeamIndex, build_players, build_teams};
    use crate::model::{LeagueMatch, PlayerRecord, WcMatch};
    use crate::normalize::normalize_matches;

    fn league(home: &str, away: &str) -> LeagueMatch {
        LeagueMatch {
            competition_name: "Premier League".to_string(),
            home_team: home.to_string(),
            away_team: away.to_string(),
            ..LeagueMatch::default()
        }
    }

    fn wc(home: &str, away: &str) -> WcMatch {
        WcMatch {
            competition_name: "World Cup".to_string(),
            home_team: home.to_string(),
            away_team: away.to_string(),
            ..WcMatch::default()
        }
    }

    #[test]
    fn ids_follow_first_appearance() {
        let teams = build_teams(
            &[
                league("Team A", "Team B"),
                league("Team B", "Team A"),
                league("Team A", "Team C"),
            ],
            &[],
        );
        let names: Vec<(Option<u32>, &str)> = teams
            .iter()
            .map(|t| (t.team_id, t.team_name.as_str()))
            .collect();
        assert_eq!(
            names,
            vec![(Some(1), "Team A"), (Some(2), "Team B"), (Some(3), "Team C")]
        );
        assert!(teams.iter().all(|t| t.country.is_none()));
    }

    #[test]
    fn league_tag_wins_over_world_cup() {
        let teams = build_teams(
            &[league("Arsenal", "Chelsea")],
            &[wc("Qatar", "Ecuador"), wc("Chelsea", "Qatar")],
        );
        assert_eq!(teams.len(), 4);
        let chelsea = teams.iter().find(|t| t.team_name == "Chelsea").unwrap();
        assert_eq!(chelsea.team_id, Some(2));
        assert_eq!(chelsea.competition_type, Some(CompetitionType::League));
        let qatar = teams.iter().find(|t| t.team_name == "Qatar").unwrap();
        assert_eq!(qatar.team_id, Some(3));
        assert_eq!(qatar.country.as_deref(), Some("Qatar"));
        assert_eq!(qatar.primary_competition, "World Cup");
    }

    #[test]
    fn blank_names_are_not_assigned() {
        let teams = build_teams(&[league("", "Team B")], &[]);
        assert_eq!(teams.len(), 1);
        assert_eq!(teams[0].team_id, Some(1));
    }

    #[test]
    fn players_resolve_team_or_stay_null() {
        let teams = build_teams(&[], &[wc("Brazil", "Serbia")]);
        let players = build_players(
            &[
                PlayerRecord {
                    player: "Neymar".to_string(),
                    team: Some("Brazil".to_string()),
                    age: Some(30),
                    ..PlayerRecord::default()
                },
                PlayerRecord {
                    player: "Ghost".to_string(),
                    team: Some("Atlantis".to_string()),
                    ..PlayerRecord::default()
                },
            ],
            &teams,
        );
        assert_eq!(players[0].player_id, Some(1));
        assert_eq!(players[0].team_id, Some(1));
        assert_eq!(players[1].player_id, Some(2));
        assert_eq!(players[1].team_id, None);
        assert_eq!(players[1].team_name.as_deref(), Some("Atlantis"));
    }

    #[test]
    fn padded_names_resolve_to_the_trimmed_team() {
        let teams = build_teams(&[league(" Arsenal ", "Fulham")], &[]);
        assert_eq!(teams[0].team_name, "Arsenal");

        let index = TeamIndex::from_teams(&teams);
        assert_eq!(index.get("Arsenal"), Some(1));
        assert_eq!(index.get("  Arsenal"), Some(1));
        let rows = normalize_matches(&[league(" Arsenal ", "Fulham ")], &index);
        assert_eq!(rows[0].home_team_id, Some(1));
        assert_eq!(rows[0].away_team_id, Some(2));

        let players = build_players(
            &[PlayerRecord {
                player: "Saka".to_string(),
                team: Some("Arsenal  ".to_string()),
                ..PlayerRecord::default()
            }],
            &teams,
        );
        assert_eq!(players[0].team_id, Some(1));
    }
}
