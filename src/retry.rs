use std::time::Duration;

use rand::Rng;

/// An explicit retry policy applied uniformly to the catalog pagination call
/// and both model-invocation call sites: a fixed attempt ceiling plus an
/// exponential backoff schedule with random jitter.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_attempts: 5,
            base_delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// Backoff delay before the retry following `attempt` (zero-based):
    /// `base * 2^attempt` plus jitter drawn from [0, 1) seconds.
    pub fn delay(&self, attempt: u32) -> Duration {
        let backoff = self.base_delay.as_secs_f64() * f64::from(2u32.saturating_pow(attempt));
        let jitter: f64 = rand::rng().random_range(0.0..1.0);
        Duration::from_secs_f64(backoff + jitter)
    }

    pub fn attempts_left(&self, attempt: u32) -> bool {
        attempt + 1 < self.max_attempts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delay_grows_exponentially() {
        let policy = RetryPolicy::default();
        // Jitter is below one second, so consecutive delays cannot overlap
        // once the doubling dominates.
        let d0 = policy.delay(0);
        let d3 = policy.delay(3);
        assert!(d0 >= Duration::from_secs(1));
        assert!(d0 < Duration::from_secs(2));
        assert!(d3 >= Duration::from_secs(8));
        assert!(d3 < Duration::from_secs(9));
    }

    #[test]
    fn attempts_left_respects_ceiling() {
        let policy = RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
        };
        assert!(policy.attempts_left(0));
        assert!(policy.attempts_left(1));
        assert!(!policy.attempts_left(2));
    }
}
