use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use tracing_subscriber::EnvFilter;

use wc22_etl::config::{PipelineConfig, flag_value};
use wc22_etl::error::EtlError;
use wc22_etl::manifest::Manifest;
use wc22_etl::pipeline;
use wc22_etl::validate::{ValidationRules, validate_all};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let mut cfg = PipelineConfig::from_env()?;
    cfg.apply_args(&args)?;
    // `--dir` names the directory to check; otherwise the configured output dir.
    let dir = flag_value(&args, "--dir")
        .map(PathBuf::from)
        .unwrap_or_else(|| cfg.output_dir.clone());

    let tables = pipeline::load_outputs(&dir)
        .with_context(|| format!("load outputs from {}", dir.display()))?;
    let rules = ValidationRules {
        bounds: cfg.bounds.clone(),
        world_cup_name: cfg.world_cup_name.clone(),
    };
    let report = match validate_all(&tables, &rules, cfg.validation_mode) {
        Ok(report) => report,
        Err(err) => {
            println!("validation failed ({} violations)", err.violations.len());
            for violation in err.violations.iter().take(20) {
                println!(" - {violation}");
            }
            return Err(EtlError::from(err).into());
        }
    };

    println!("all checks passed");
    println!("Dir: {}", dir.display());
    println!("Checks run: {}", report.checks_run);

    match Manifest::load(&dir) {
        Ok(manifest) => {
            let stale = manifest.stale_entries(&dir)?;
            if !stale.is_empty() {
                bail!("files changed since the manifest was written: {}", stale.join(", "));
            }
            println!("Manifest: {} tables match their digests", manifest.tables.len());
        }
        Err(err) => println!("Manifest: not checked ({err:#})"),
    }
    Ok(())
}
