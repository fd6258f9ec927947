//! Prometheus exposition endpoint.
//!
//! # Responsibilities
//! - Install the global recorder with the latency buckets
//! - Serve the rendered metrics on a fixed path
//! - Run recorder upkeep so histograms do not grow unbounded
//!
//! # Design Decisions
//! - Served with axum so the endpoint shares the tracing layer and shutdown signal
//! - Metrics are rendered on demand; nothing is cached between scrapes

use std::time::Duration;

use axum::{extract::State, http::header, response::IntoResponse, routing::get, Router};
use metrics_exporter_prometheus::{BuildError, Matcher, PrometheusBuilder, PrometheusHandle};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::trace::TraceLayer;

use crate::lifecycle::shutdown::{recv_shutdown, wait_for_shutdown};
use crate::observability::metrics::{LATENCY_BUCKETS, LATENCY_SECONDS};

const UPKEEP_INTERVAL: Duration = Duration::from_secs(5);

/// Builder with the latency histogram buckets applied.
pub fn builder() -> Result<PrometheusBuilder, BuildError> {
    PrometheusBuilder::new()
        .set_buckets_for_metric(Matcher::Full(LATENCY_SECONDS.to_string()), LATENCY_BUCKETS)
}

/// Install the global recorder and return a handle for rendering.
pub fn install_recorder() -> Result<PrometheusHandle, BuildError> {
    builder()?.install_recorder()
}

/// Router serving `handle` at `path`.
pub fn router(handle: PrometheusHandle, path: &str) -> Router {
    Router::new()
        .route(path, get(render))
        .with_state(handle)
        .layer(TraceLayer::new_for_http())
}

async fn render(State(handle): State<PrometheusHandle>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        handle.render(),
    )
}

/// Serve the metrics endpoint until shutdown.
pub async fn serve(
    listener: TcpListener,
    handle: PrometheusHandle,
    path: &str,
    shutdown: broadcast::Receiver<()>,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!(address = %addr, path = %path, "Metrics endpoint listening");

    axum::serve(listener, router(handle, path))
        .with_graceful_shutdown(wait_for_shutdown(shutdown))
        .await?;

    tracing::info!("Metrics endpoint stopped");
    Ok(())
}

/// Periodically drain histogram buffers until shutdown.
pub async fn run_upkeep(handle: PrometheusHandle, mut shutdown: broadcast::Receiver<()>) {
    let mut ticker = tokio::time::interval(UPKEEP_INTERVAL);
    loop {
        tokio::select! {
            _ = ticker.tick() => handle.run_upkeep(),
            _ = recv_shutdown(&mut shutdown) => break,
        }
    }
}
