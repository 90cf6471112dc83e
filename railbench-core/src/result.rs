//! The benchmark result document

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// The one JSON line a benchmark run writes to stdout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BenchResult {
    pub pass: bool,
    pub score: i64,
    #[serde(default)]
    pub messages: Vec<String>,
    #[serde(default)]
    pub available_days: u32,
    #[serde(default)]
    pub language: String,
}

impl BenchResult {
    /// A failed run: `pass=false`, `score=0`
    pub fn failed(messages: Vec<String>, available_days: u32, language: impl Into<String>) -> Self {
        Self {
            pass: false,
            score: 0,
            messages,
            available_days,
            language: language.into(),
        }
    }

    /// Serialize to a single line
    pub fn to_json_line(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Parse the last non-empty line of a benchmarker's stdout
    pub fn from_output(stdout: &str) -> Option<serde_json::Result<Self>> {
        stdout
            .lines()
            .rev()
            .find(|line| !line.trim().is_empty())
            .map(|line| serde_json::from_str(line.trim()))
    }
}

/// Drop repeated messages, keeping first-occurrence order
pub fn unique_messages<I, S>(messages: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut seen = HashSet::new();
    messages
        .into_iter()
        .map(Into::into)
        .filter(|msg| seen.insert(msg.clone()))
        .collect()
}
