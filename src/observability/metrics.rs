//! Metrics collection.
//!
//! # Responsibilities
//! - Define the probe metrics and their label sets
//! - Translate each probe into updates on the four aggregates
//!
//! # Metrics
//! - `netpulse_latency_seconds` (histogram): probe duration by target, status, error_reason
//! - `netpulse_requests_total` (counter): probes attempted, by target
//! - `probe_errors_total` (counter): failed probes, by error_reason
//! - `in_flight_gauge` (gauge): probes currently executing
//!
//! # Design Decisions
//! - The core records through the [`MetricsSink`] trait, never the recorder directly
//! - Updates are increments and observations only
//! - Histogram buckets tuned for probe latencies up to the default 5s deadline

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram, Unit};

use crate::probe::{ProbeOutcome, Target};

pub const LATENCY_SECONDS: &str = "netpulse_latency_seconds";
pub const REQUESTS_TOTAL: &str = "netpulse_requests_total";
pub const ERRORS_TOTAL: &str = "probe_errors_total";
pub const IN_FLIGHT: &str = "in_flight_gauge";

pub const LATENCY_BUCKETS: &[f64] = &[0.01, 0.05, 0.1, 0.2, 0.3, 0.4, 0.5, 1.0, 2.5, 5.0];

/// Recording contract between the probe pipeline and the metrics backend.
///
/// Implementations must be safe to call from many probe tasks at once.
pub trait MetricsSink: Send + Sync {
    /// A probe is about to execute.
    fn inc_in_flight(&self);

    /// A probe finished executing, whatever its outcome.
    fn dec_in_flight(&self);

    /// A probe was attempted against `target`.
    fn record_request(&self, target: &Target);

    /// Record latency, and count the failure when the probe did not succeed.
    fn observe(&self, outcome: &ProbeOutcome);
}

/// [`MetricsSink`] writing to the globally installed `metrics` recorder.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrometheusSink;

impl PrometheusSink {
    /// Register metric descriptions with the current recorder.
    pub fn new() -> Self {
        describe_histogram!(LATENCY_SECONDS, Unit::Seconds, "Probe round-trip latency");
        describe_counter!(REQUESTS_TOTAL, "Total number of pings sent");
        describe_counter!(ERRORS_TOTAL, "Total number of probe errors by error reason");
        describe_gauge!(IN_FLIGHT, "Gauge of currently running probes");
        Self
    }
}

impl MetricsSink for PrometheusSink {
    fn inc_in_flight(&self) {
        gauge!(IN_FLIGHT).increment(1.0);
    }

    fn dec_in_flight(&self) {
        gauge!(IN_FLIGHT).decrement(1.0);
    }

    fn record_request(&self, target: &Target) {
        counter!(REQUESTS_TOTAL, "target" => target.label().to_string()).increment(1);
    }

    fn observe(&self, outcome: &ProbeOutcome) {
        let reason = outcome.reason().as_str();
        histogram!(
            LATENCY_SECONDS,
            "target" => outcome.target().to_string(),
            "status" => outcome.status().as_str(),
            "error_reason" => reason
        )
        .record(outcome.duration().as_secs_f64());

        if !outcome.is_success() {
            counter!(ERRORS_TOTAL, "error_reason" => reason).increment(1);
        }
    }
}
