//! Portal job model

use serde::{Deserialize, Serialize, Serializer};

/// A benchmark request for one team
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    pub id: u64,
    pub team: Team,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub servers: Vec<Server>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Server {
    #[serde(default)]
    pub hostname: String,
    #[serde(default)]
    pub global_ip: String,
    #[serde(default)]
    pub private_ip: String,
}

impl Job {
    /// The first server with a global IP
    pub fn target_server(&self) -> Option<&Server> {
        self.team
            .servers
            .iter()
            .find(|server| !server.global_ip.trim().is_empty())
    }
}

/// How the benchmarker process ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    Succeeded,
    Failed,
    TimedOut,
}

impl JobStatus {
    /// Status string understood by the portal
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Succeeded => "done",
            JobStatus::Failed | JobStatus::TimedOut => "aborted",
        }
    }
}

impl Serialize for JobStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Outcome reported to the portal. Captured output stays local and is only
/// used for alerts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobResult {
    pub id: u64,
    pub status: JobStatus,
    pub passed: bool,
    pub score: i64,
    pub reason: String,
    #[serde(skip)]
    pub stdout: String,
    #[serde(skip)]
    pub stderr: String,
}

impl JobResult {
    /// A job that could not be benchmarked at all
    pub fn failed(id: u64, reason: impl Into<String>) -> Self {
        Self {
            id,
            status: JobStatus::Failed,
            passed: false,
            score: 0,
            reason: reason.into(),
            stdout: String::new(),
            stderr: String::new(),
        }
    }
}
