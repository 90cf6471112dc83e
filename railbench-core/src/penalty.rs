//! Penalty and disqualification policy

use crate::phase::CounterSnapshot;
use railbench_config::ScoringConfig;

/// Constants of the penalty step function and the disqualification rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PenaltyPolicy {
    pub application_weight: u64,
    pub application_failure_threshold: u64,
    pub trivial_threshold: u64,
    pub trivial_weight: u64,
    pub trivial_per_count: u64,
}

impl Default for PenaltyPolicy {
    fn default() -> Self {
        PenaltyPolicy::from(&ScoringConfig::default())
    }
}

impl From<&ScoringConfig> for PenaltyPolicy {
    fn from(config: &ScoringConfig) -> Self {
        Self {
            application_weight: config.application_weight,
            application_failure_threshold: config.application_failure_threshold,
            trivial_threshold: config.trivial_threshold,
            trivial_weight: config.trivial_weight,
            // a zero divisor is rejected by config validation; clamp anyway
            trivial_per_count: config.trivial_per_count.max(1),
        }
    }
}

impl From<ScoringConfig> for PenaltyPolicy {
    fn from(config: ScoringConfig) -> Self {
        PenaltyPolicy::from(&config)
    }
}

impl PenaltyPolicy {
    /// Critical errors disqualify at once; application errors only in volume
    pub fn is_failure(&self, counters: &CounterSnapshot) -> bool {
        counters.critical > 0 || counters.application > self.application_failure_threshold
    }

    /// Penalty for a counter snapshot.
    ///
    /// The first `trivial_threshold` timeouts and temporary errors are free;
    /// beyond that the penalty grows one `trivial_weight` step per started
    /// block of `trivial_per_count` errors.
    pub fn penalty(&self, counters: &CounterSnapshot) -> u64 {
        let mut penalty = counters.application.saturating_mul(self.application_weight);

        let trivial = counters.trivial();
        if trivial > self.trivial_threshold {
            let excess = trivial - self.trivial_threshold;
            let steps = 1 + excess.div_ceil(self.trivial_per_count);
            penalty = penalty.saturating_add(self.trivial_weight.saturating_mul(steps));
        }

        penalty
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> PenaltyPolicy {
        PenaltyPolicy {
            application_weight: 10,
            application_failure_threshold: 1000,
            trivial_threshold: 200,
            trivial_weight: 500,
            trivial_per_count: 100,
        }
    }

    fn counters(application: u64, timeout: u64, temporary: u64) -> CounterSnapshot {
        CounterSnapshot {
            critical: 0,
            application,
            timeout,
            temporary,
        }
    }

    #[test]
    fn test_trivial_errors_free_up_to_threshold() {
        let policy = policy();
        assert_eq!(policy.penalty(&counters(0, 0, 0)), 0);
        assert_eq!(policy.penalty(&counters(0, 150, 50)), 0);
    }

    #[test]
    fn test_trivial_penalty_steps() {
        let policy = policy();
        // one over the threshold starts the first block
        assert_eq!(policy.penalty(&counters(0, 201, 0)), 500 * 2);
        assert_eq!(policy.penalty(&counters(0, 200, 100)), 500 * 2);
        assert_eq!(policy.penalty(&counters(0, 200, 101)), 500 * 3);
    }

    #[test]
    fn test_application_penalty_linear() {
        let policy = policy();
        assert_eq!(policy.penalty(&counters(7, 0, 0)), 70);
        assert_eq!(policy.penalty(&counters(7, 201, 0)), 70 + 1000);
    }

    #[test]
    fn test_penalty_monotonic() {
        let policy = policy();
        let mut previous = 0;
        for trivial in 0..1000 {
            let current = policy.penalty(&counters(3, trivial, 0));
            assert!(current >= previous, "penalty decreased at {}", trivial);
            previous = current;
        }

        let mut previous = 0;
        for application in 0..500 {
            let current = policy.penalty(&counters(application, 250, 0));
            assert!(current >= previous);
            previous = current;
        }
    }

    #[test]
    fn test_failure_rule() {
        let policy = policy();
        assert!(!policy.is_failure(&counters(1000, 0, 0)));
        assert!(policy.is_failure(&counters(1001, 0, 0)));

        let critical = CounterSnapshot {
            critical: 1,
            ..CounterSnapshot::default()
        };
        assert!(policy.is_failure(&critical));
    }

    #[test]
    fn test_from_scoring_config() {
        let config = ScoringConfig {
            trivial_per_count: 0,
            ..ScoringConfig::default()
        };
        let policy = PenaltyPolicy::from(&config);
        assert_eq!(policy.trivial_per_count, 1);
        assert_eq!(policy.application_weight, 10);
    }
}
