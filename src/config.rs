use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

use crate::validate::ValidationMode;

pub const DEFAULT_INPUT_DIR: &str = "data/clean";
pub const DEFAULT_WORLD_CUP_NAME: &str = "World Cup";
const DEFAULT_DERIVE_PARALLELISM: usize = 4;

/// Inclusive row-count band for one output table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowBounds {
    pub min: usize,
    pub max: usize,
}

impl RowBounds {
    pub fn range(min: usize, max: usize) -> Self {
        Self { min, max }
    }

    pub fn exactly(n: usize) -> Self {
        Self { min: n, max: n }
    }

    pub fn contains(&self, n: usize) -> bool {
        n >= self.min && n <= self.max
    }

    pub fn describe(&self) -> String {
        if self.min == self.max {
            format!("exactly {}", self.min)
        } else {
            format!("{}-{}", self.min, self.max)
        }
    }
}

/// Regression guards on table sizes. `None` disables the guard for that table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardinalityBounds {
    #[serde(default)]
    pub teams: Option<RowBounds>,
    #[serde(default)]
    pub players: Option<RowBounds>,
    #[serde(default)]
    pub matches: Option<RowBounds>,
    #[serde(default)]
    pub advanced: Option<RowBounds>,
    #[serde(default)]
    pub player_stats: Option<RowBounds>,
    #[serde(default)]
    pub standings: Option<RowBounds>,
}

impl Default for CardinalityBounds {
    // Sized for the 2022 World Cup plus the five 2022-23 domestic leagues.
    fn default() -> Self {
        Self {
            teams: Some(RowBounds::range(100, 150)),
            players: Some(RowBounds::range(600, 800)),
            matches: Some(RowBounds::range(1800, 2000)),
            advanced: Some(RowBounds::exactly(64)),
            player_stats: Some(RowBounds::range(600, 800)),
            standings: Some(RowBounds::exactly(32)),
        }
    }
}

impl CardinalityBounds {
    pub fn unbounded() -> Self {
        Self {
            teams: None,
            players: None,
            matches: None,
            advanced: None,
            player_stats: None,
            standings: None,
        }
    }

    pub fn load_json(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("read bounds file {}", path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("parse bounds file {}", path.display()))
    }

    pub fn apply_env_overrides(&mut self) -> Result<()> {
        let slots: [(&str, &mut Option<RowBounds>); 6] = [
            ("ETL_BOUNDS_TEAMS", &mut self.teams),
            ("ETL_BOUNDS_PLAYERS", &mut self.players),
            ("ETL_BOUNDS_MATCHES", &mut self.matches),
            ("ETL_BOUNDS_ADVANCED", &mut self.advanced),
            ("ETL_BOUNDS_PLAYER_STATS", &mut self.player_stats),
            ("ETL_BOUNDS_STANDINGS", &mut self.standings),
        ];
        for (key, slot) in slots {
            let Some(raw) = opt_env(key) else {
                continue;
            };
            *slot = parse_bounds(&raw).with_context(|| format!("invalid {key}={raw}"))?;
        }
        Ok(())
    }
}

/// Accepts `min..max`, `min-max`, a single exact count, or `off`.
pub fn parse_bounds(raw: &str) -> Result<Option<RowBounds>> {
    let s = raw.trim();
    if s.eq_ignore_ascii_case("off") || s.eq_ignore_ascii_case("none") {
        return Ok(None);
    }
    let parse = |part: &str| -> Result<usize> {
        part.trim()
            .parse::<usize>()
            .map_err(|_| anyhow!("not a row count: {part:?}"))
    };
    let bounds = if let Some((lo, hi)) = s.split_once("..").or_else(|| s.split_once('-')) {
        RowBounds::range(parse(lo)?, parse(hi.trim_start_matches('='))?)
    } else {
        RowBounds::exactly(parse(s)?)
    };
    if bounds.min > bounds.max {
        return Err(anyhow!("empty range {}..{}", bounds.min, bounds.max));
    }
    Ok(Some(bounds))
}

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub player_extracts_dir: Option<PathBuf>,
    pub world_cup_name: String,
    pub bounds: CardinalityBounds,
    pub validation_mode: ValidationMode,
    pub derive_parallelism: usize,
}

impl PipelineConfig {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        Self {
            output_dir: dir.clone(),
            input_dir: dir,
            player_extracts_dir: None,
            world_cup_name: DEFAULT_WORLD_CUP_NAME.to_string(),
            bounds: CardinalityBounds::default(),
            validation_mode: ValidationMode::FailFast,
            derive_parallelism: DEFAULT_DERIVE_PARALLELISM,
        }
    }

    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::from_filename(".env.local");
        let _ = dotenvy::from_filename(".env");

        let input_dir = opt_env("ETL_INPUT_DIR").unwrap_or_else(|| DEFAULT_INPUT_DIR.to_string());
        let mut cfg = Self::new(input_dir);
        if let Some(out) = opt_env("ETL_OUTPUT_DIR") {
            cfg.output_dir = PathBuf::from(out);
        }
        cfg.player_extracts_dir = opt_env("ETL_PLAYER_EXTRACTS_DIR").map(PathBuf::from);
        if let Some(name) = opt_env("ETL_WORLD_CUP_NAME") {
            cfg.world_cup_name = name.trim().to_string();
        }
        cfg.derive_parallelism = env::var("ETL_DERIVE_PARALLELISM")
            .ok()
            .and_then(|val| val.trim().parse::<usize>().ok())
            .unwrap_or(DEFAULT_DERIVE_PARALLELISM)
            .clamp(1, 32);
        cfg.bounds.apply_env_overrides()?;
        Ok(cfg)
    }

    /// Applies `--input`, `--output`, `--player-extracts`, `--bounds` and
    /// `--collect-all` on top of whatever is already set.
    pub fn apply_args(&mut self, args: &[String]) -> Result<()> {
        if let Some(dir) = flag_value(args, "--input") {
            let dir = PathBuf::from(dir);
            if flag_value(args, "--output").is_none() && opt_env("ETL_OUTPUT_DIR").is_none() {
                self.output_dir = dir.clone();
            }
            self.input_dir = dir;
        }
        if let Some(dir) = flag_value(args, "--output") {
            self.output_dir = PathBuf::from(dir);
        }
        if let Some(dir) = flag_value(args, "--player-extracts") {
            self.player_extracts_dir = Some(PathBuf::from(dir));
        }
        if let Some(path) = flag_value(args, "--bounds") {
            self.bounds = CardinalityBounds::load_json(Path::new(&path))?;
        }
        if args.iter().any(|a| a == "--collect-all") {
            self.validation_mode = ValidationMode::CollectAll;
        }
        Ok(())
    }
}

/// Looks up `--name=value` or `--name value`; blank values are ignored.
pub fn flag_value(args: &[String], name: &str) -> Option<String> {
    let prefix = format!("{name}=");
    for (idx, arg) in args.iter().enumerate() {
        if let Some(raw) = arg.strip_prefix(&prefix) {
            let trimmed = raw.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
        if arg == name {
            let Some(next) = args.get(idx + 1) else {
                continue;
            };
            if !next.trim().is_empty() && !next.starts_with("--") {
                return Some(next.trim().to_string());
            }
        }
    }
    None
}

fn opt_env(key: &str) -> Option<String> {
    env::var(key).ok().and_then(|val| {
        if val.trim().is_empty() {
            None
        } else {
            Some(val)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::{CardinalityBounds, RowBounds, flag_value, parse_bounds};

    #[test]
    fn parse_bounds_forms() {
        assert_eq!(
            parse_bounds("100..150").unwrap(),
            Some(RowBounds::range(100, 150))
        );
        assert_eq!(parse_bounds("10-20").unwrap(), Some(RowBounds::range(10, 20)));
        assert_eq!(parse_bounds(" 64 ").unwrap(), Some(RowBounds::exactly(64)));
        assert_eq!(parse_bounds("off").unwrap(), None);
        assert!(parse_bounds("20..10").is_err());
        assert!(parse_bounds("many").is_err());
    }

    #[test]
    fn flag_value_supports_both_forms() {
        let args = vec![
            "--input=data/in".to_string(),
            "--output".to_string(),
            "out".to_string(),
            "--bounds".to_string(),
            "--collect-all".to_string(),
        ];
        assert_eq!(flag_value(&args, "--input").as_deref(), Some("data/in"));
        assert_eq!(flag_value(&args, "--output").as_deref(), Some("out"));
        assert_eq!(flag_value(&args, "--bounds"), None);
    }

    #[test]
    fn bounds_json_allows_partial_tables() {
        let parsed: CardinalityBounds =
            serde_json::from_str(r#"{"teams":{"min":1,"max":5}}"#).unwrap();
        assert_eq!(parsed.teams, Some(RowBounds::range(1, 5)));
        assert_eq!(parsed.advanced, None);
        assert!(RowBounds::exactly(64).contains(64));
        assert!(!RowBounds::range(98, 102).contains(97));
    }
}
