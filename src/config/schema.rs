//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the prober.
//! All types derive Serde traits for deserialization from config files.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::probe::Target;

/// Root configuration for netpulse.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct NetpulseConfig {
    /// Scheduler and executor settings.
    pub prober: ProberConfig,

    /// Endpoints to probe.
    pub targets: Vec<TargetConfig>,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl NetpulseConfig {
    /// Resolve the configured targets.
    ///
    /// Entries that do not parse are skipped with a warning; run
    /// [`validate_config`](crate::config::validation::validate_config) first
    /// to reject them instead.
    pub fn targets(&self) -> Vec<Target> {
        let default_interval = self.prober.interval();
        self.targets
            .iter()
            .filter_map(|t| {
                let interval = t.interval_ms.map(Duration::from_millis).unwrap_or(default_interval);
                match Target::parse(&t.url, interval) {
                    Ok(target) => Some(target),
                    Err(e) => {
                        tracing::warn!(url = %t.url, error = %e, "Skipping invalid target");
                        None
                    }
                }
            })
            .collect()
    }
}

/// Scheduler and executor configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProberConfig {
    /// Default probe interval in milliseconds.
    pub interval_ms: u64,

    /// Client-side deadline for a whole probe in milliseconds.
    pub timeout_ms: u64,

    /// Name resolution deadline in milliseconds.
    pub dns_timeout_ms: u64,

    /// Optional bound on TCP connect plus TLS handshake, in milliseconds.
    /// Unset, only the probe deadline applies.
    pub connect_timeout_ms: Option<u64>,

    /// System-wide bound on concurrently executing probes.
    pub max_concurrency: usize,

    /// User-Agent header sent with every probe.
    pub user_agent: String,
}

impl ProberConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn dns_timeout(&self) -> Duration {
        Duration::from_millis(self.dns_timeout_ms)
    }

    pub fn connect_timeout(&self) -> Option<Duration> {
        self.connect_timeout_ms.map(Duration::from_millis)
    }
}

impl Default for ProberConfig {
    fn default() -> Self {
        Self {
            interval_ms: 500,
            timeout_ms: 5_000,
            dns_timeout_ms: 2_000,
            connect_timeout_ms: None,
            max_concurrency: 10,
            user_agent: concat!("netpulse/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// A single probe destination.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TargetConfig {
    /// Absolute http(s) URL; also used verbatim as the `target` label.
    pub url: String,

    /// Per-target interval override in milliseconds.
    #[serde(default)]
    pub interval_ms: Option<u64>,
}

impl TargetConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            interval_ms: None,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,

    /// Path the metrics are served on.
    pub metrics_path: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: true,
            metrics_address: "0.0.0.0:8080".to_string(),
            metrics_path: "/metrics".to_string(),
        }
    }
}

/// Built-in target list used when no config file is given.
pub const DEFAULT_TARGETS: &[&str] = &[
    "https://www.google.com",
    "https://www.facebook.com",
    "https://www.github.com",
    "https://www.giub.com/",
    "https://localhost:8080",
    "https://tools-httpstatus.pickup-services.com/404",
    "https://tools-httpstatus.pickup-services.com/503",
    "https://tools-httpstatus.pickup-services.com/200?sleep=5000",
];

impl NetpulseConfig {
    /// Configuration with the built-in target list.
    pub fn with_default_targets() -> Self {
        Self {
            targets: DEFAULT_TARGETS.iter().map(|url| TargetConfig::new(*url)).collect(),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = NetpulseConfig::with_default_targets();
        assert_eq!(config.prober.interval(), Duration::from_millis(500));
        assert_eq!(config.prober.timeout(), Duration::from_secs(5));
        assert_eq!(config.prober.max_concurrency, 10);
        assert_eq!(config.targets.len(), DEFAULT_TARGETS.len());
        assert_eq!(config.targets().len(), DEFAULT_TARGETS.len());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: NetpulseConfig = toml::from_str(
            r#"
            [prober]
            max_concurrency = 4

            [[targets]]
            url = "http://127.0.0.1:9000/health"
            interval_ms = 250
            "#,
        )
        .unwrap();

        assert_eq!(config.prober.max_concurrency, 4);
        assert_eq!(config.prober.interval_ms, 500);
        assert_eq!(config.observability.metrics_path, "/metrics");

        let targets = config.targets();
        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0].interval(), Duration::from_millis(250));
        assert_eq!(targets[0].label(), "http://127.0.0.1:9000/health");
    }

    #[test]
    fn test_invalid_target_is_skipped() {
        let mut config = NetpulseConfig::default();
        config.targets.push(TargetConfig::new("not a url"));
        config.targets.push(TargetConfig::new("http://example.com"));
        assert_eq!(config.targets().len(), 1);
    }
}
