//! Probe failure types.

use std::time::Duration;

use thiserror::Error;

use crate::probe::tls::TlsConfigError;

/// Transport-level failure of one probe.
///
/// HTTP error statuses are not errors here; they are classified from the
/// response status instead.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("probe canceled")]
    Canceled,

    #[error("probe deadline of {0:?} exceeded")]
    DeadlineExceeded(Duration),

    #[error("request failed")]
    Request(#[source] reqwest::Error),
}

/// Failure to build a [`ProbeExecutor`](crate::probe::ProbeExecutor).
#[derive(Debug, Error)]
pub enum ExecutorError {
    #[error(transparent)]
    Tls(#[from] TlsConfigError),

    #[error("failed to build http client: {0}")]
    Client(#[from] reqwest::Error),
}
