//! # Flow Controller
//!
//! Reads observed packets from stdin, one per line:
//!
//! ```text
//! <source-ip> <destination-ip> <tcp payload...>
//! 10.0.0.1 10.0.0.2 GET /add HTTP/1.1
//! 10.0.0.1 10.0.0.2 GET /data HTTP/1.1
//! ```
//!
//! and prints `FORWARD` or `DROP` for each. On EOF or Ctrl+C the chain is
//! audited and summarized.
//!
//! Pass `--debug` (or set `RUST_LOG`) for per-packet logging.

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use flow_controller::{Controller, ControllerConfig, ObservedPacket};

fn init_logging(debug: bool) -> Result<()> {
    let default_level = if debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

async fn run(controller: &Controller) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let line = tokio::select! {
            line = lines.next_line() => line.context("Failed to read stdin")?,
            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown signal received");
                break;
            }
        };
        let Some(line) = line else { break };
        if line.trim().is_empty() || line.starts_with('#') {
            continue;
        }

        match line.parse::<ObservedPacket>() {
            Ok(packet) => {
                let verdict = controller.handler.handle(&packet).await;
                println!("{verdict}");
            }
            Err(err) => warn!(%err, "Skipping input line"),
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let debug = std::env::args().any(|arg| arg == "--debug");
    init_logging(debug)?;

    let config = ControllerConfig::from_env().context("Invalid configuration")?;
    let controller = Controller::new(&config).context("Failed to start controller")?;

    info!("===========================================");
    info!("  Flow Controller v{}", env!("CARGO_PKG_VERSION"));
    info!("  Difficulty: {}", config.ledger.difficulty);
    info!("===========================================");

    run(&controller).await?;

    let service = &controller.service;
    match service.audit() {
        Ok(()) => info!(blocks = service.chain_len(), "Ledger audit passed"),
        Err(err) => error!(%err, "Ledger audit failed"),
    }
    let metrics = service.metrics();
    info!(
        queries = metrics.get_queries(),
        hit_rate = metrics.get_query_hit_rate(),
        admissions = metrics.get_admissions(),
        rejected = metrics.get_admissions_rejected(),
        avg_mining_ms = metrics.get_avg_mining_time(),
        "Session summary"
    );
    Ok(())
}
