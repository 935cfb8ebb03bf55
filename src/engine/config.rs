//! Engine termination and search configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default solving time: 30 seconds.
pub const DEFAULT_TIME_LIMIT_SECS: u64 = 30;

/// Default late acceptance history size.
pub const DEFAULT_LATE_ACCEPTANCE_SIZE: usize = 400;

/// Solver configuration with termination criteria.
///
/// A job stops at whichever limit is hit first, or when terminated early.
/// With every limit unset the job runs until terminated.
///
/// # Example
/// ```
/// use std::time::Duration;
/// use u_timetable::engine::SolverConfig;
///
/// let config = SolverConfig::default()
///     .with_step_limit(5_000)
///     .with_time_limit(Duration::from_secs(5))
///     .with_seed(42);
/// assert_eq!(config.late_acceptance_size, 400);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Stop after this many local search steps.
    pub step_limit: Option<u64>,
    /// Stop after this much wall time.
    pub time_limit: Option<Duration>,
    /// Stop after this many consecutive steps without a new best.
    pub unimproved_step_limit: Option<u64>,
    /// Late acceptance history length.
    pub late_acceptance_size: usize,
    /// RNG seed. `None` seeds from the OS.
    pub seed: Option<u64>,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            step_limit: None,
            time_limit: Some(Duration::from_secs(DEFAULT_TIME_LIMIT_SECS)),
            unimproved_step_limit: None,
            late_acceptance_size: DEFAULT_LATE_ACCEPTANCE_SIZE,
            seed: None,
        }
    }
}

impl SolverConfig {
    pub fn with_step_limit(mut self, steps: u64) -> Self {
        self.step_limit = Some(steps);
        self
    }

    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = Some(limit);
        self
    }

    /// Removes the wall-time limit.
    pub fn without_time_limit(mut self) -> Self {
        self.time_limit = None;
        self
    }

    pub fn with_unimproved_step_limit(mut self, steps: u64) -> Self {
        self.unimproved_step_limit = Some(steps);
        self
    }

    pub fn with_late_acceptance_size(mut self, size: usize) -> Self {
        self.late_acceptance_size = size.max(1);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let c = SolverConfig::default();
        assert_eq!(c.time_limit, Some(Duration::from_secs(30)));
        assert!(c.step_limit.is_none());
        assert!(c.seed.is_none());
    }

    #[test]
    fn test_builder() {
        let c = SolverConfig::default()
            .without_time_limit()
            .with_unimproved_step_limit(100)
            .with_late_acceptance_size(0);
        assert!(c.time_limit.is_none());
        assert_eq!(c.unimproved_step_limit, Some(100));
        assert_eq!(c.late_acceptance_size, 1);
    }

    #[test]
    fn test_partial_json() {
        let c: SolverConfig = serde_json::from_str(r#"{"step_limit": 250, "seed": 7}"#).unwrap();
        assert_eq!(c.step_limit, Some(250));
        assert_eq!(c.seed, Some(7));
        assert_eq!(c.late_acceptance_size, DEFAULT_LATE_ACCEPTANCE_SIZE);
        assert_eq!(c.time_limit, Some(Duration::from_secs(30)));
    }
}
