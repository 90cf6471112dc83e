//! Resilience patterns for railbench
//!
//! The fixed-interval retry used when reporting results to the portal, and
//! the process signal handling that drives graceful shutdown.

pub mod retry;
pub mod shutdown;

pub use retry::{RetryError, RetryExecutor, RetryPolicy, Retryable};
pub use shutdown::{shutdown_signal, spawn_shutdown_listener};
