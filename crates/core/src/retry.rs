//! Exponential-backoff policy for queue redelivery.
//!
//! Transient job failures are redelivered with a delay that grows per
//! attempt, clamped to an upper bound. Permanent failures never reach
//! this module; they dead-letter immediately.

use std::time::Duration;

/// Tunable parameters for the backoff curve.
#[derive(Debug, Clone)]
pub struct BackoffConfig {
    /// Delay before the first redelivery.
    pub initial_delay: Duration,
    /// Upper bound on the delay between redeliveries.
    pub max_delay: Duration,
    /// Factor by which the delay grows after each failed attempt.
    pub multiplier: f64,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(5),
            max_delay: Duration::from_secs(600),
            multiplier: 2.0,
        }
    }
}

/// Delay before redelivering a job that has already been attempted
/// `attempt` times (1-based: after the first failure, pass 1).
///
/// The result is clamped to [`BackoffConfig::max_delay`].
pub fn delay_for_attempt(attempt: u32, config: &BackoffConfig) -> Duration {
    let exponent = attempt.saturating_sub(1).min(31);
    let factor = config.multiplier.powi(exponent as i32);
    let ms = (config.initial_delay.as_millis() as f64 * factor) as u64;
    Duration::from_millis(ms).min(config.max_delay)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_retry_waits_initial_delay() {
        let config = BackoffConfig::default();
        assert_eq!(delay_for_attempt(1, &config), config.initial_delay);
    }

    #[test]
    fn delay_doubles_per_attempt() {
        let config = BackoffConfig::default();
        assert_eq!(delay_for_attempt(2, &config), Duration::from_secs(10));
        assert_eq!(delay_for_attempt(3, &config), Duration::from_secs(20));
    }

    #[test]
    fn delay_is_clamped_to_max() {
        let config = BackoffConfig::default();
        assert_eq!(delay_for_attempt(30, &config), config.max_delay);
    }

    #[test]
    fn zero_attempt_treated_as_first() {
        let config = BackoffConfig::default();
        assert_eq!(delay_for_attempt(0, &config), config.initial_delay);
    }
}
