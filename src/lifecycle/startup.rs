//! Startup orchestration.
//!
//! # Responsibilities
//! - Build the probe executor
//! - Install the metrics recorder and bind the exposition listener
//! - Start one loop per target
//! - Wait for a stop signal, then shut every task down in order
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal, and every fallible step runs
//!   before the first background task is spawned
//! - Metrics endpoint binds before probing starts, so no outcome goes unscraped
//! - Shutdown order: stop ticking and cancel probes, then stop the endpoint

use std::future::Future;
use std::sync::Arc;

use thiserror::Error;
use tokio::net::TcpListener;

use crate::config::NetpulseConfig;
use crate::lifecycle::{signals, Shutdown};
use crate::observability::{exposition, PrometheusSink};
use crate::probe::{ExecutorError, ProbeExecutor};
use crate::scheduler::{Scheduler, SlotPool};

/// Fatal failure while bringing the prober up.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to install metrics recorder: {0}")]
    Metrics(#[from] metrics_exporter_prometheus::BuildError),

    #[error("failed to bind metrics endpoint on {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to build probe executor: {0}")]
    Executor(#[from] ExecutorError),
}

/// Run until SIGINT/SIGTERM.
pub async fn run(config: NetpulseConfig) -> Result<(), StartupError> {
    let stop = async {
        if let Err(e) = signals::wait_for_signal().await {
            tracing::error!(error = %e, "Failed to listen for shutdown signals");
        }
    };
    run_until(config, stop).await
}

/// Run until `stop` resolves.
pub async fn run_until<F>(config: NetpulseConfig, stop: F) -> Result<(), StartupError>
where
    F: Future<Output = ()>,
{
    let executor = Arc::new(ProbeExecutor::new(&config.prober)?);

    let endpoint = if config.observability.metrics_enabled {
        let handle = exposition::install_recorder()?;
        let address = config.observability.metrics_address.clone();
        let listener = TcpListener::bind(&address)
            .await
            .map_err(|source| StartupError::Bind { address, source })?;
        Some((handle, listener))
    } else {
        tracing::info!("Metrics endpoint disabled");
        None
    };

    let shutdown = Shutdown::new();
    let mut background = Vec::new();

    if let Some((handle, listener)) = endpoint {
        background.push(tokio::spawn(exposition::run_upkeep(handle.clone(), shutdown.subscribe())));

        let path = config.observability.metrics_path.clone();
        let rx = shutdown.subscribe();
        background.push(tokio::spawn(async move {
            if let Err(e) = exposition::serve(listener, handle, &path, rx).await {
                tracing::error!(error = %e, "Metrics endpoint failed");
            }
        }));
    }

    let targets = config.targets();
    let pool = SlotPool::new(config.prober.max_concurrency);
    let scheduler = Scheduler::new(targets, pool, executor, Arc::new(PrometheusSink::new()));
    let loops = scheduler.spawn(&shutdown);

    stop.await;
    shutdown.trigger();

    for task in loops.into_iter().chain(background) {
        if let Err(e) = task.await {
            tracing::error!(error = %e, "Task ended abnormally");
        }
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
