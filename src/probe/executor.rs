//! Probe execution.
//!
//! # Responsibilities
//! - Issue exactly one GET per probe, bounded by the probe deadline
//! - Turn the response status or transport error into a [`ProbeOutcome`]
//! - Report the probe to the metrics sink and the diagnostic log
//!
//! # Design Decisions
//! - Never fails: every exit path yields an outcome
//! - The response body is never read; the response is dropped right after
//!   the status is extracted, releasing the connection
//! - Name resolution goes through [`SystemResolver`] so DNS failures stay typed
//! - TLS goes through [`client_config`] so certificate failures stay typed and
//!   a wrong hostname is reported before an untrusted chain

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use reqwest::dns::Resolve;
use rustls::RootCertStore;
use tokio::time;

use crate::config::ProberConfig;
use crate::observability::metrics::MetricsSink;
use crate::probe::dns::SystemResolver;
use crate::probe::error::{ExecutorError, ProbeError};
use crate::probe::outcome::ProbeOutcome;
use crate::probe::target::Target;
use crate::probe::tls::{client_config, default_roots};

/// Issues timed requests against targets.
#[derive(Debug, Clone)]
pub struct ProbeExecutor {
    client: reqwest::Client,
    timeout: Duration,
}

impl ProbeExecutor {
    /// Build an executor resolving names through the operating system.
    pub fn new(config: &ProberConfig) -> Result<Self, ExecutorError> {
        Self::with_resolver(config, Arc::new(SystemResolver::new(config.dns_timeout())))
    }

    /// Build an executor with a custom name resolver.
    pub fn with_resolver<R>(config: &ProberConfig, resolver: Arc<R>) -> Result<Self, ExecutorError>
    where
        R: Resolve + 'static,
    {
        Self::with_roots(config, resolver, default_roots())
    }

    /// Build an executor with a custom name resolver and trust store.
    pub fn with_roots<R>(
        config: &ProberConfig,
        resolver: Arc<R>,
        roots: RootCertStore,
    ) -> Result<Self, ExecutorError>
    where
        R: Resolve + 'static,
    {
        let mut builder = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .dns_resolver(resolver)
            .use_preconfigured_tls(client_config(roots)?)
            .no_proxy();
        if let Some(connect_timeout) = config.connect_timeout() {
            builder = builder.connect_timeout(connect_timeout);
        }
        let client = builder.build()?;

        Ok(Self {
            client,
            timeout: config.timeout(),
        })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Run one probe and return its outcome. Resolving `cancel` aborts the
    /// request and yields a `context_canceled` outcome.
    pub async fn probe<C>(&self, target: &Target, cancel: C) -> ProbeOutcome
    where
        C: Future<Output = ()>,
    {
        let start = Instant::now();
        let request = self.client.get(target.url().clone()).send();

        let result = tokio::select! {
            _ = cancel => Err(ProbeError::Canceled),
            res = time::timeout(self.timeout, request) => match res {
                Ok(Ok(response)) => Ok(response.status().as_u16()),
                Ok(Err(e)) => Err(ProbeError::Request(e)),
                Err(_) => Err(ProbeError::DeadlineExceeded(self.timeout)),
            },
        };
        let duration = start.elapsed();

        match result {
            Ok(status) => ProbeOutcome::from_response(target.label(), status, duration),
            Err(e) => ProbeOutcome::from_transport_error(target.label(), &e, duration),
        }
    }

    /// Run one probe wrapped in its metric updates and diagnostic line.
    ///
    /// The request counter moves before the outcome is known; the in-flight
    /// gauge brackets the probe on every path.
    pub async fn run<C>(&self, target: &Target, sink: &dyn MetricsSink, cancel: C) -> ProbeOutcome
    where
        C: Future<Output = ()>,
    {
        sink.inc_in_flight();
        sink.record_request(target);

        let outcome = self.probe(target, cancel).await;

        sink.observe(&outcome);
        sink.dec_in_flight();

        log_outcome(&outcome);
        outcome
    }
}

fn log_outcome(outcome: &ProbeOutcome) {
    let latency = (outcome.duration().as_secs_f64() * 1000.0).round() / 1000.0;
    match outcome.http_status() {
        Some(code) => tracing::info!(
            target_url = %outcome.target(),
            status = %outcome.status(),
            reason = %outcome.reason(),
            code,
            latency_secs = latency,
            "Probe completed"
        ),
        None => tracing::warn!(
            target_url = %outcome.target(),
            status = %outcome.status(),
            reason = %outcome.reason(),
            error = outcome.error().unwrap_or_default(),
            latency_secs = latency,
            "Probe failed"
        ),
    }
}
