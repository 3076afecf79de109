use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use patrol_common::host;
use patrol_common::observability::{init_logging, LogConfig, LogFormat};
use patrol_config::PatrolConfigLoader;
use tracing::info;

mod scheduler;
mod wiring;

/// Keeps a browser-driven search workflow running unattended.
#[derive(Parser, Debug)]
#[command(name = "patrol", version)]
struct Cli {
    /// Settings file overlaid under the environment variables.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Run the browser without a visible window.
    #[arg(long)]
    headless: bool,

    /// Run one pass per configured worksheet instead of the single term.
    #[arg(long)]
    per_sheet: bool,
}

// One browser, driven one pass at a time; a current-thread runtime is all
// this process needs.
#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Err(e) = host::ensure_supported() {
        eprintln!("{e}");
        std::process::exit(1);
    }

    let mut loader = PatrolConfigLoader::new();
    if let Some(path) = &cli.config {
        loader = loader.with_file(path);
    }
    let cfg = loader.load().context("could not load configuration")?;

    let log_path = init_logging(LogConfig {
        format: cfg.log_format.parse::<LogFormat>()?,
        default_filter: cfg.log_level.clone(),
        ..LogConfig::default()
    })?;
    info!(path = %log_path.display(), "logging to daily file");

    wiring::run(cfg, cli.headless, cli.per_sheet).await
}
