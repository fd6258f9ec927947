//! netpulse
//!
//! Probes a fixed set of HTTP(S) endpoints on independent timers, classifies
//! every failure into a closed set of reason codes and exposes the results
//! for Prometheus to scrape.
//!
//! # Architecture Overview
//!
//! ```text
//!   ┌──────────────────────────────────────────────────────────────┐
//!   │                          NETPULSE                            │
//!   │                                                              │
//!   │  ┌───────────┐  tick  ┌─────────┐  slot  ┌──────────────┐    │
//!   │  │ target    │───────▶│ overlap │───────▶│ slot pool    │    │
//!   │  │ loop (xN) │        │ guard   │        │ (capacity C) │    │
//!   │  └───────────┘        └─────────┘        └──────┬───────┘    │
//!   │                                                 │            │     Target
//!   │                                                 ▼            │    endpoints
//!   │                                          ┌──────────────┐    │
//!   │                                          │ probe        │────┼──────▶
//!   │                                          │ executor     │◀───┼───────
//!   │                                          └──────┬───────┘    │
//!   │                                                 │ outcome    │
//!   │                                                 ▼            │
//!   │  ┌─────────────┐                         ┌──────────────┐    │
//!   │  │ /metrics    │◀────────────────────────│ metrics sink │    │
//!   │  │ exposition  │                         └──────────────┘    │
//!   │  └─────────────┘                                             │
//!   └──────────────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

use netpulse::config::loader::load_config;
use netpulse::config::NetpulseConfig;
use netpulse::lifecycle::startup;
use netpulse::observability::logging;

#[derive(Parser)]
#[command(name = "netpulse")]
#[command(about = "Latency and failure prober exposing Prometheus metrics", long_about = None)]
struct Cli {
    /// TOML configuration file; the built-in target list is used when absent.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the configured log level.
    #[arg(short, long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => NetpulseConfig::with_default_targets(),
    };
    if let Some(level) = cli.log_level {
        config.observability.log_level = level;
    }

    logging::init_logging(&config.observability.log_level);

    tracing::info!("netpulse v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        targets = config.targets.len(),
        interval_ms = config.prober.interval_ms,
        timeout_ms = config.prober.timeout_ms,
        max_concurrency = config.prober.max_concurrency,
        metrics_address = %config.observability.metrics_address,
        "Configuration loaded"
    );

    startup::run(config).await?;
    Ok(())
}
