//! Probe destinations.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use url::Url;

/// Why a configured address cannot be probed.
#[derive(Debug, Error)]
pub enum TargetError {
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("unsupported scheme {0:?}, expected http or https")]
    Scheme(String),

    #[error("URL has no host")]
    NoHost,
}

/// A single endpoint probed on a fixed cadence.
///
/// The label is the address exactly as configured and is what appears in the
/// `target` metric label, so two spellings of the same URL stay distinct.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    label: Arc<str>,
    url: Url,
    interval: Duration,
}

impl Target {
    /// Parse an absolute http(s) address.
    pub fn parse(address: &str, interval: Duration) -> Result<Self, TargetError> {
        let url = Url::parse(address)?;
        match url.scheme() {
            "http" | "https" => {}
            other => return Err(TargetError::Scheme(other.to_string())),
        }
        if url.host_str().is_none() {
            return Err(TargetError::NoHost);
        }
        Ok(Self {
            label: Arc::from(address),
            url,
            interval,
        })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.label)
    }
}
