//! Domain-driven configuration management for railbench
//!
//! Configuration is split by functional domain (benchmark, scoring, HTTP
//! client, logging, worker), each with defaults, validation and
//! environment variable overrides.

pub mod error;
pub mod loader;
pub mod validation;

// Domain-specific configuration modules
pub mod domains;

// Re-export main types
pub use error::{ConfigError, ConfigResult};
pub use loader::ConfigLoader;

// Re-export domain configurations
pub use domains::{
    benchmark::{BenchmarkConfig, CalendarConfig},
    http::HttpConfig,
    logging::LoggingConfig,
    scoring::ScoringConfig,
    worker::WorkerConfig,
    RailbenchConfig,
};

// Re-export utilities
pub use domains::utils::serde_duration;
