//! netpulse: concurrent endpoint prober with Prometheus metrics.

pub mod config;
pub mod lifecycle;
pub mod observability;
pub mod probe;
pub mod scheduler;

pub use config::NetpulseConfig;
pub use lifecycle::Shutdown;
pub use probe::{FailureReason, ProbeExecutor, ProbeOutcome, ProbeStatus, Target};
pub use scheduler::{Scheduler, SlotPool};
