use anyhow::Result;
use tracing_subscriber::EnvFilter;

use wc22_etl::config::PipelineConfig;
use wc22_etl::pipeline;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let mut cfg = PipelineConfig::from_env()?;
    cfg.apply_args(&args)?;

    let summary = pipeline::run_pipeline(&cfg)?;

    println!("all checks passed");
    println!("Output: {}", summary.output_dir.display());
    println!("Teams: {}", summary.teams);
    println!("Players: {}", summary.players);
    println!(
        "Matches: {} ({} with advanced stats)",
        summary.matches, summary.advanced
    );
    println!("Player stats: {}", summary.player_stats);
    println!("Standings: {}", summary.standings);
    println!("Checks run: {}", summary.report.checks_run);
    println!("Manifest:");
    for entry in &summary.manifest.tables {
        println!(" - {:<42} {:>6} rows  {}", entry.file, entry.rows, &entry.sha256[..12]);
    }
    Ok(())
}
