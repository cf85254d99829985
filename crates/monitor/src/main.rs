//! Drowsiness Monitor - Main Entry Point

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use dms::Session;
use monitor::{init_logging, load_config, run_monitor, Notifier, Preset};
use tokio::io::BufReader;
use tokio::sync::mpsc;
use tracing::info;

#[derive(Parser)]
#[command(
    name = "drowsiness-monitor",
    about = "Detect eye closure, yawning, and head turns from facial landmark frames",
    version
)]
struct Cli {
    /// Landmark frames as JSON lines ("-" for stdin)
    #[arg(short, long, default_value = "-")]
    input: String,

    /// Configuration file (TOML, JSON, YAML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Threshold preset applied before the config file
    #[arg(long, value_enum, default_value_t = Preset::Default)]
    preset: Preset,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    info!("=== Drowsiness Monitor v{} ===", env!("CARGO_PKG_VERSION"));

    let config = load_config(cli.config.as_deref(), cli.preset)?;
    let session = Session::new(config)?;

    let (tx, rx) = mpsc::channel(16);
    let notifier = Notifier::spawn(rx);

    let stdout = tokio::io::stdout();
    let summary = if cli.input == "-" {
        let input = BufReader::new(tokio::io::stdin());
        run_monitor(input, stdout, session, tx).await?
    } else {
        let file = tokio::fs::File::open(&cli.input)
            .await
            .with_context(|| format!("opening {}", cli.input))?;
        run_monitor(BufReader::new(file), stdout, session, tx).await?
    };

    let report = notifier.await?;
    info!(
        "Processed {} frames ({} without face), alarm started {} times",
        summary.frames_processed, summary.frames_skipped, report.started
    );

    Ok(())
}
