//! Endpoint success score

use parking_lot::Mutex;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

/// Service endpoints whose successful calls earn score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Endpoint {
    Initialize,
    Signup,
    Login,
    Logout,
    ListStations,
    SearchTrains,
    ListTrainSeats,
    Reserve,
    CommitReservation,
    CancelReservation,
    ListReservations,
}

impl Endpoint {
    pub const ALL: [Endpoint; 11] = [
        Endpoint::Initialize,
        Endpoint::Signup,
        Endpoint::Login,
        Endpoint::Logout,
        Endpoint::ListStations,
        Endpoint::SearchTrains,
        Endpoint::ListTrainSeats,
        Endpoint::Reserve,
        Endpoint::CommitReservation,
        Endpoint::CancelReservation,
        Endpoint::ListReservations,
    ];

    /// Method and path template, used in user messages
    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::Initialize => "POST /initialize",
            Endpoint::Signup => "POST /api/auth/signup",
            Endpoint::Login => "POST /api/auth/login",
            Endpoint::Logout => "POST /api/auth/logout",
            Endpoint::ListStations => "GET /api/stations",
            Endpoint::SearchTrains => "GET /api/train/search",
            Endpoint::ListTrainSeats => "GET /api/train/seats",
            Endpoint::Reserve => "POST /api/train/reserve",
            Endpoint::CommitReservation => "POST /api/train/reservation/commit",
            Endpoint::CancelReservation => "POST /api/user/reservations/:id/cancel",
            Endpoint::ListReservations => "GET /api/user/reservations",
        }
    }

    /// Score earned per successful call.
    ///
    /// Mutating and search endpoints are worth more than trivial reads.
    pub fn default_weight(&self) -> u64 {
        match self {
            Endpoint::Initialize => 0,
            Endpoint::Signup | Endpoint::Login | Endpoint::Logout => 1,
            Endpoint::ListStations | Endpoint::ListReservations => 1,
            Endpoint::SearchTrains => 5,
            Endpoint::ListTrainSeats => 3,
            Endpoint::Reserve => 10,
            Endpoint::CommitReservation => 20,
            Endpoint::CancelReservation => 5,
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Thread-safe success counter per endpoint
#[derive(Debug)]
pub struct EndpointCounter {
    weights: HashMap<Endpoint, u64>,
    counts: Mutex<HashMap<Endpoint, u64>>,
}

impl EndpointCounter {
    pub fn new() -> Self {
        let weights = Endpoint::ALL
            .iter()
            .map(|endpoint| (*endpoint, endpoint.default_weight()))
            .collect();
        Self::with_weights(weights)
    }

    pub fn with_weights(weights: HashMap<Endpoint, u64>) -> Self {
        Self {
            weights,
            counts: Mutex::new(HashMap::new()),
        }
    }

    pub fn increment(&self, endpoint: Endpoint) {
        *self.counts.lock().entry(endpoint).or_insert(0) += 1;
    }

    pub fn count(&self, endpoint: Endpoint) -> u64 {
        self.counts.lock().get(&endpoint).copied().unwrap_or(0)
    }

    /// Successful calls across all endpoints
    pub fn total_count(&self) -> u64 {
        self.counts.lock().values().sum()
    }

    /// Raw score: Σ count × weight
    pub fn score(&self) -> u64 {
        self.counts
            .lock()
            .iter()
            .map(|(endpoint, count)| count * self.weights.get(endpoint).copied().unwrap_or(0))
            .sum()
    }
}

impl Default for EndpointCounter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_is_weighted_sum() {
        let counter = EndpointCounter::new();
        counter.increment(Endpoint::Reserve);
        counter.increment(Endpoint::Reserve);
        counter.increment(Endpoint::Login);
        counter.increment(Endpoint::Initialize);

        assert_eq!(counter.count(Endpoint::Reserve), 2);
        assert_eq!(counter.total_count(), 4);
        assert_eq!(counter.score(), 2 * 10 + 1);
    }

    #[test]
    fn test_custom_weights() {
        let weights = HashMap::from([(Endpoint::SearchTrains, 7)]);
        let counter = EndpointCounter::with_weights(weights);
        counter.increment(Endpoint::SearchTrains);
        counter.increment(Endpoint::Logout);
        assert_eq!(counter.score(), 7);
    }
}
