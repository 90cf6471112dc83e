//! Logging setup for railbench
//!
//! Every subscriber installed here writes to stderr. Standard output is
//! reserved for the machine-readable benchmark result.

pub mod init;

pub use init::{build_env_filter, init_logging_from_config, init_simple_tracing};
