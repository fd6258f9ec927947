//! Probing subsystem.
//!
//! # Data Flow
//! ```text
//! Scheduler tick admitted
//!     → executor.rs (one GET, bounded by the probe deadline)
//!         → dns.rs (typed lookup failures)
//!         → tls.rs (certificate checks, hostname first)
//!     → classifier.rs (transport error or status → reason code)
//!     → outcome.rs (ProbeOutcome)
//!     → MetricsSink + diagnostic log line
//! ```
//!
//! # Design Decisions
//! - Classification is a pure, total function with fixed precedence
//! - Outcomes are values; nothing is retained after they are recorded

pub mod classifier;
pub mod dns;
pub mod error;
pub mod executor;
pub mod outcome;
pub mod target;
pub mod tls;

pub use classifier::{classify_status, classify_transport};
pub use dns::{lookup_within, DnsError, DnsErrorKind, SystemResolver};
pub use error::{ExecutorError, ProbeError};
pub use executor::ProbeExecutor;
pub use outcome::{FailureReason, ProbeOutcome, ProbeStatus};
pub use target::{Target, TargetError};
pub use tls::{client_config, default_roots, NameFirstVerifier, TlsConfigError};
