//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML), or built-in defaults
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → NetpulseConfig (validated, immutable)
//!     → resolved into Targets and handed to the scheduler
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; the target set is fixed for the process lifetime
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use schema::NetpulseConfig;
pub use schema::ObservabilityConfig;
pub use schema::ProberConfig;
pub use schema::TargetConfig;
