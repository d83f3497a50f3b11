use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::path::Path;

use crate::error::{EtlError, Result};
use crate::model::PlayerRecord;
use crate::tables::Columns;

struct Extract {
    file: &'static str,
    columns: &'static [&'static str],
}

const EXTRACTS: [Extract; 6] = [
    Extract {
        file: "player_stats.csv",
        columns: &[
            "player",
            "position",
            "team",
            "age",
            "minutes_90s",
            "games",
            "goals",
            "assists",
        ],
    },
    Extract {
        file: "player_shooting.csv",
        columns: &["player", "team", "shots_total", "shots_on_target", "xg"],
    },
    Extract {
        file: "player_passing.csv",
        columns: &["player", "team", "passes_completed", "passes", "passes_pct"],
    },
    Extract {
        file: "player_defense.csv",
        columns: &["player", "team", "tackles", "interceptions", "clearances"],
    },
    Extract {
        file: "player_possession.csv",
        columns: &["player", "team", "touches", "dispossessed"],
    },
    Extract {
        file: "player_gca.csv",
        columns: &["player", "team", "xg_assist"],
    },
];

fn canonical(column: &str) -> &str {
    match column {
        "minutes_90s" => "minutes",
        "shots_total" => "shots",
        other => other,
    }
}

type PlayerKey = (String, Option<String>);

#[derive(Default)]
struct MergeState {
    rows: Vec<PlayerRecord>,
    by_key: HashMap<PlayerKey, usize>,
    by_player: HashMap<String, Vec<usize>>,
    owned: HashSet<&'static str>,
}

impl MergeState {
    fn insert(&mut self, player: String, team: Option<String>) -> usize {
        let idx = self.rows.len();
        self.rows.push(PlayerRecord {
            player: player.clone(),
            team: team.clone(),
            ..PlayerRecord::default()
        });
        self.by_player.entry(player.clone()).or_default().push(idx);
        self.by_key.insert((player, team), idx);
        idx
    }

    fn merge_file(&mut self, path: &Path, extract: &Extract) -> Result<bool> {
        let csv_err = |source| EtlError::Csv {
            path: path.to_path_buf(),
            source,
        };
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(path)
            .map_err(csv_err)?;
        let columns = Columns::from_headers(reader.headers().map_err(csv_err)?);

        if !columns.has("player") {
            tracing::warn!(file = extract.file, "extract has no player column, skipping");
            return Ok(false);
        }
        let keyed_by_team = columns.has("team");
        // Source column name paired with the output column it fills.
        let fills: Vec<(&'static str, &'static str)> = extract
            .columns
            .iter()
            .copied()
            .filter(|c| !matches!(*c, "player" | "team") && columns.has(c))
            .map(|c| (c, canonical(c)))
            .filter(|(_, out)| !self.owned.contains(out))
            .collect();

        let mut touched: HashSet<usize> = HashSet::new();
        let mut rows = 0usize;
        for record in reader.records() {
            let record = record.map_err(csv_err)?;
            let view = columns.view(&record);
            rows += 1;
            let Some(player) = view.text("player") else {
                continue;
            };
            let team = if keyed_by_team { view.text("team") } else { None };

            let targets: Vec<usize> = if keyed_by_team {
                match self.by_key.get(&(player.clone(), team.clone())) {
                    Some(idx) => vec![*idx],
                    None => vec![self.insert(player, team)],
                }
            } else {
                match self.by_player.get(&player) {
                    Some(found) => found.clone(),
                    None => vec![self.insert(player, None)],
                }
            };

            for idx in targets {
                // Duplicate keys within one extract: the first row wins.
                if !touched.insert(idx) {
                    continue;
                }
                let row = &mut self.rows[idx];
                for (source, out) in &fills {
                    row.set_field(out, view.raw(source));
                }
            }
        }

        self.owned.extend(fills.iter().map(|(_, out)| *out));
        tracing::info!(
            file = extract.file,
            rows,
            columns = fills.len(),
            merged = self.rows.len(),
            "merged player extract"
        );
        Ok(true)
    }
}

// Lexicographic on (player, team) with a missing team after any named one.
fn key_order(a: &PlayerRecord, b: &PlayerRecord) -> Ordering {
    a.player.cmp(&b.player).then_with(|| match (&a.team, &b.team) {
        (Some(x), Some(y)) => x.cmp(y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    })
}

// Extracts that are absent or carry none of their columns are skipped.
pub fn merge_player_extracts(dir: &Path) -> Result<Vec<PlayerRecord>> {
    let mut state = MergeState::default();
    let mut used = 0usize;

    for extract in &EXTRACTS {
        let path = dir.join(extract.file);
        if !path.exists() {
            tracing::warn!(file = extract.file, dir = %dir.display(), "player extract not found");
            continue;
        }
        if state.merge_file(&path, extract)? {
            used += 1;
        }
    }

    if used == 0 {
        return Err(EtlError::SourceMissing {
            path: dir.join(EXTRACTS[0].file),
        });
    }

    let mut rows = state.rows;
    rows.sort_by(key_order);
    tracing::info!(
        extracts = used,
        players = rows.len(),
        "merged player extracts"
    );
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::merge_player_extracts;
    use crate::error::EtlError;

    #[test]
    fn joins_on_player_and_team_and_renames() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("player_stats.csv"),
            "player,position,team,age,minutes_90s,games,goals,assists,extra\n\
             Messi ,FW,Argentina,35,7.0,7,7,3,x\n\
             Mbappe,FW,France,23,6.5,7,8,2,x\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("player_shooting.csv"),
            "player,team,shots_total,shots_on_target,xg,goals\n\
             Messi,Argentina,32,14,6.6,99\n\
             Giroud,France,17,7,3.2,4\n",
        )
        .unwrap();

        let rows = merge_player_extracts(dir.path()).unwrap();
        let names: Vec<&str> = rows.iter().map(|r| r.player.as_str()).collect();
        assert_eq!(names, vec!["Giroud", "Mbappe", "Messi"]);

        let messi = &rows[2];
        assert_eq!(messi.minutes, Some(7));
        assert_eq!(messi.shots, Some(32));
        assert_eq!(messi.xg, Some(6.6));
        // Goals are not among the shooting extract's columns.
        assert_eq!(messi.goals, Some(7));

        let giroud = &rows[0];
        assert_eq!(giroud.shots, Some(17));
        assert_eq!(giroud.goals, None);
        assert_eq!(giroud.position, None);
    }

    #[test]
    fn player_only_extract_fans_out_to_every_team() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("player_stats.csv"),
            "player,team,games\nSilva,Brazil,3\nSilva,Portugal,2\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("player_gca.csv"),
            "player,xg_assist\nSilva,0.4\nNobody,1.1\n",
        )
        .unwrap();

        let rows = merge_player_extracts(dir.path()).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1].team.as_deref(), Some("Brazil"));
        assert_eq!(rows[1].xg_assist, Some(0.4));
        assert_eq!(rows[2].team.as_deref(), Some("Portugal"));
        assert_eq!(rows[2].xg_assist, Some(0.4));
        assert_eq!(rows[0].player, "Nobody");
        assert_eq!(rows[0].team, None);
    }

    #[test]
    fn duplicate_keys_keep_first_and_blank_names_drop() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("player_stats.csv"),
            "player,team,goals\nKane,England,2\nKane,England,5\n,England,1\n",
        )
        .unwrap();
        let rows = merge_player_extracts(dir.path()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].goals, Some(2));
    }

    #[test]
    fn no_usable_extract_is_source_missing() {
        let dir = tempfile::tempdir().unwrap();
        let err = merge_player_extracts(dir.path()).unwrap_err();
        assert!(matches!(err, EtlError::SourceMissing { .. }));
    }
}
