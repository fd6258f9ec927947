//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Install recorder → Bind metrics endpoint → Build executor → Start target loops
//!
//! Shutdown (shutdown.rs):
//!     Signal received → Stop ticking → Cancel in-flight probes → Stop endpoint → Exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//! ```

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
