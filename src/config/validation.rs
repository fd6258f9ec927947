//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate target URLs and value ranges (intervals within (0, 24h],
//!   timeouts ordered, concurrency within what a semaphore can hold)
//! - Detect duplicate targets
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: NetpulseConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::net::SocketAddr;

use tokio::sync::Semaphore;

use crate::config::schema::NetpulseConfig;
use crate::probe::Target;

/// Longest accepted probe interval, one day.
pub const MAX_INTERVAL_MS: u64 = 24 * 60 * 60 * 1000;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    NoTargets,
    InvalidTarget { url: String, reason: String },
    DuplicateTarget(String),
    ZeroInterval(String),
    IntervalTooLong { scope: String, interval_ms: u64 },
    ZeroTimeout,
    ZeroConcurrency,
    ConcurrencyTooHigh(usize),
    DnsTimeoutTooLong { dns_timeout_ms: u64, timeout_ms: u64 },
    InvalidConnectTimeout { connect_timeout_ms: u64, timeout_ms: u64 },
    InvalidMetricsAddress(String),
    InvalidMetricsPath(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::NoTargets => write!(f, "at least one target is required"),
            ValidationError::InvalidTarget { url, reason } => {
                write!(f, "invalid target {:?}: {}", url, reason)
            }
            ValidationError::DuplicateTarget(url) => write!(f, "duplicate target {:?}", url),
            ValidationError::ZeroInterval(scope) => write!(f, "probe interval for {} must be > 0", scope),
            ValidationError::IntervalTooLong { scope, interval_ms } => write!(
                f,
                "probe interval for {} ({} ms) exceeds {} ms",
                scope, interval_ms, MAX_INTERVAL_MS
            ),
            ValidationError::ZeroTimeout => write!(f, "prober.timeout_ms must be > 0"),
            ValidationError::ZeroConcurrency => write!(f, "prober.max_concurrency must be > 0"),
            ValidationError::ConcurrencyTooHigh(n) => write!(
                f,
                "prober.max_concurrency ({}) exceeds {}",
                n,
                Semaphore::MAX_PERMITS
            ),
            ValidationError::DnsTimeoutTooLong { dns_timeout_ms, timeout_ms } => write!(
                f,
                "prober.dns_timeout_ms ({}) must be below prober.timeout_ms ({})",
                dns_timeout_ms, timeout_ms
            ),
            ValidationError::InvalidConnectTimeout { connect_timeout_ms, timeout_ms } => write!(
                f,
                "prober.connect_timeout_ms ({}) must be > 0 and below prober.timeout_ms ({})",
                connect_timeout_ms, timeout_ms
            ),
            ValidationError::InvalidMetricsAddress(addr) => {
                write!(f, "invalid metrics address {:?}", addr)
            }
            ValidationError::InvalidMetricsPath(path) => {
                write!(f, "metrics path {:?} must start with '/'", path)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Check every semantic rule and collect all violations.
pub fn validate_config(config: &NetpulseConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let prober = &config.prober;

    check_interval("prober", prober.interval_ms, &mut errors);
    if prober.timeout_ms == 0 {
        errors.push(ValidationError::ZeroTimeout);
    }
    if prober.max_concurrency == 0 {
        errors.push(ValidationError::ZeroConcurrency);
    } else if prober.max_concurrency > Semaphore::MAX_PERMITS {
        errors.push(ValidationError::ConcurrencyTooHigh(prober.max_concurrency));
    }
    if prober.timeout_ms > 0 && prober.dns_timeout_ms >= prober.timeout_ms {
        errors.push(ValidationError::DnsTimeoutTooLong {
            dns_timeout_ms: prober.dns_timeout_ms,
            timeout_ms: prober.timeout_ms,
        });
    }
    if let Some(connect_timeout_ms) = prober.connect_timeout_ms {
        if connect_timeout_ms == 0 || connect_timeout_ms >= prober.timeout_ms {
            errors.push(ValidationError::InvalidConnectTimeout {
                connect_timeout_ms,
                timeout_ms: prober.timeout_ms,
            });
        }
    }

    if config.targets.is_empty() {
        errors.push(ValidationError::NoTargets);
    }

    let mut seen = HashSet::new();
    for target in &config.targets {
        if let Err(e) = Target::parse(&target.url, prober.interval()) {
            errors.push(ValidationError::InvalidTarget {
                url: target.url.clone(),
                reason: e.to_string(),
            });
        }
        if !seen.insert(target.url.as_str()) {
            errors.push(ValidationError::DuplicateTarget(target.url.clone()));
        }
        if let Some(interval_ms) = target.interval_ms {
            check_interval(&target.url, interval_ms, &mut errors);
        }
    }

    let observability = &config.observability;
    if observability.metrics_enabled {
        if observability.metrics_address.parse::<SocketAddr>().is_err() {
            errors.push(ValidationError::InvalidMetricsAddress(
                observability.metrics_address.clone(),
            ));
        }
        if !observability.metrics_path.starts_with('/') {
            errors.push(ValidationError::InvalidMetricsPath(observability.metrics_path.clone()));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_interval(scope: &str, interval_ms: u64, errors: &mut Vec<ValidationError>) {
    if interval_ms == 0 {
        errors.push(ValidationError::ZeroInterval(scope.to_string()));
    } else if interval_ms > MAX_INTERVAL_MS {
        errors.push(ValidationError::IntervalTooLong {
            scope: scope.to_string(),
            interval_ms,
        });
    }
}
