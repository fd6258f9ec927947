//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Probe executor produces:
//!     → metrics.rs (MetricsSink: counters, gauge, histogram)
//!     → logging.rs (one structured event per completed probe)
//!
//! Consumers:
//!     → exposition.rs (Prometheus scrape endpoint)
//!     → stdout
//! ```
//!
//! # Design Decisions
//! - Probe code depends on the MetricsSink trait, not on the recorder
//! - Metrics are cheap (atomic increments)

pub mod exposition;
pub mod logging;
pub mod metrics;

pub use self::metrics::{MetricsSink, PrometheusSink};
