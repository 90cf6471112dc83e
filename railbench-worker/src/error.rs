//! Error types for the worker

use railbench_resilience::Retryable;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WorkerError {
    #[error("Portal request failed: {0}")]
    Transport(String),

    #[error("Portal returned status {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },

    #[error("Could not decode portal response: {0}")]
    Decode(String),

    #[error("No server with a global IP for team {team_id}")]
    NoTargetServer { team_id: u64 },

    #[error("Invalid URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("HTTP client error: {0}")]
    Client(String),
}

impl Retryable for WorkerError {
    fn is_retryable(&self) -> bool {
        matches!(
            self,
            WorkerError::Transport(_) | WorkerError::UnexpectedStatus { .. }
        )
    }
}

pub type WorkerResult<T> = Result<T, WorkerError>;
