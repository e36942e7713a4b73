//! Quoting core replay driver - Entry Point
//!
//! Replays a recorded connector event journal through the trader and
//! writes the order actions it requests.

use anyhow::Result;
use clap::Parser;
use tracing::info;

/// Two-instrument quoting and hedging core
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Configuration file path (can also be set via QUOTER_CONFIG env var)
    #[arg(short, long)]
    config: Option<String>,

    /// Event journal to replay (overrides replay.events_path)
    #[arg(short, long)]
    events: Option<String>,

    /// Output file for order actions (overrides replay.actions_path)
    #[arg(short, long)]
    actions: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    quoter_telemetry::init_logging()?;

    info!("Starting quoter v{}", env!("CARGO_PKG_VERSION"));

    let mut config = quoter_bot::AppConfig::load(args.config.as_deref())?;
    if let Some(events) = args.events {
        config.replay.events_path = events;
    }
    if let Some(actions) = args.actions {
        config.replay.actions_path = actions;
    }
    info!(
        position_limit = config.trader.position_limit,
        max_unhedged_lots = config.trader.max_unhedged_lots,
        "Configuration loaded"
    );

    let mut app = quoter_bot::Application::new(config)?;
    let summary = app.run().await?;
    info!(
        events = summary.events,
        actions = summary.actions,
        interrupted = summary.interrupted,
        "Shutdown complete"
    );

    Ok(())
}
