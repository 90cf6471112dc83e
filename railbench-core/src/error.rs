//! Classified benchmark failures

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Severity class carried by every benchmark failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorKind {
    /// Disqualifying: double booking, cross-user cancellation and the like
    Critical,
    /// One incorrect response from the service
    Application,
    /// The service did not answer within its deadline
    Timeout,
    /// Transient network condition
    Temporary,
    /// Anything not explicitly classified; counted as critical
    Unknown,
}

impl ErrorKind {
    /// Timeouts and temporary errors are tolerated up to a threshold
    pub fn is_trivial(&self) -> bool {
        matches!(self, ErrorKind::Timeout | ErrorKind::Temporary)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self {
            ErrorKind::Critical => "critical",
            ErrorKind::Application => "application",
            ErrorKind::Timeout => "timeout",
            ErrorKind::Temporary => "temporary",
            ErrorKind::Unknown => "unknown",
        };
        f.write_str(kind)
    }
}

/// A classified failure observed while benchmarking.
///
/// `message` is shown to the team being graded; `detail` is internal
/// diagnostic text that only reaches logs and operator alerts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct BenchError {
    pub kind: ErrorKind,
    pub message: String,
    pub detail: Option<String>,
}

impl BenchError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            detail: None,
        }
    }

    pub fn critical(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Critical, message)
    }

    pub fn application(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Application, message)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Timeout, message)
    }

    pub fn temporary(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Temporary, message)
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unknown, message)
    }

    /// Attach internal diagnostic text
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Prefix the user message with the operation that failed
    pub fn context(mut self, operation: impl fmt::Display) -> Self {
        self.message = format!("{}: {}", operation, self.message);
        self
    }

    /// Message shown to the team, annotated with the severity
    pub fn user_message(&self) -> String {
        match self.kind {
            ErrorKind::Critical => format!("{} (critical error)", self.message),
            ErrorKind::Application => self.message.clone(),
            ErrorKind::Timeout => format!("{} (timed out)", self.message),
            ErrorKind::Temporary => format!("{} (temporary error)", self.message),
            ErrorKind::Unknown => format!("{} (please contact the organizers)", self.message),
        }
    }

    /// Text kept for logs and alerts
    pub fn internal_message(&self) -> String {
        match &self.detail {
            Some(detail) => format!("{}: {} ({})", self.kind, self.message, detail),
            None => self.to_string(),
        }
    }
}
