//! Retry with exponential backoff
//!
//! Attempt `n` (1-based) that fails waits `base_delay * 2^(n-1)` before the
//! next attempt. The last failure is returned as-is.

use std::fmt::Display;
use std::time::Duration;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first
    pub retries: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            retries: 3,
            base_delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    pub fn new(retries: u32, base_delay: Duration) -> Self {
        Self {
            retries,
            base_delay,
        }
    }

    /// At least one attempt is always made
    pub fn max_attempts(&self) -> u32 {
        self.retries.max(1)
    }

    /// Delay after the given failed attempt (1-based)
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.base_delay.saturating_mul(factor)
    }
}

/// Run `op` until it succeeds or the policy's attempts are used up.
///
/// `op` is called afresh on every attempt, so whatever it reads is read
/// again each time.
pub fn retry_with_backoff<T, E, F>(policy: &RetryPolicy, label: &str, mut op: F) -> Result<T, E>
where
    E: Display,
    F: FnMut() -> Result<T, E>,
{
    let max_attempts = policy.max_attempts();
    let mut attempt = 0;
    loop {
        attempt += 1;
        match op() {
            Ok(value) => return Ok(value),
            Err(e) if attempt >= max_attempts => {
                warn!("{}: attempt {}/{} failed, giving up: {}", label, attempt, max_attempts, e);
                return Err(e);
            }
            Err(e) => {
                let delay = policy.delay_after(attempt);
                warn!(
                    "{}: attempt {}/{} failed, retrying in {:?}: {}",
                    label, attempt, max_attempts, delay, e
                );
                std::thread::sleep(delay);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    fn fast(retries: u32) -> RetryPolicy {
        RetryPolicy::new(retries, Duration::from_millis(20))
    }

    #[test]
    fn test_delays_double() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_after(1), Duration::from_secs(1));
        assert_eq!(policy.delay_after(2), Duration::from_secs(2));
        assert_eq!(policy.delay_after(3), Duration::from_secs(4));
    }

    #[test]
    fn test_succeeds_after_two_failures() {
        let mut calls = 0;
        let result: Result<&str, String> = retry_with_backoff(&fast(3), "test", || {
            calls += 1;
            if calls < 3 {
                Err(format!("failure {calls}"))
            } else {
                Ok("done")
            }
        });
        assert_eq!(result, Ok("done"));
        assert_eq!(calls, 3);
    }

    #[test]
    fn test_always_failing_returns_last_error() {
        let policy = fast(3);
        let mut calls = 0;
        let started = Instant::now();
        let result: Result<(), String> = retry_with_backoff(&policy, "test", || {
            calls += 1;
            Err(format!("failure {calls}"))
        });
        let elapsed = started.elapsed();

        assert_eq!(result, Err("failure 3".to_string()));
        assert_eq!(calls, 3);
        // 20ms + 40ms
        assert!(elapsed >= policy.base_delay * 3);
    }

    #[test]
    fn test_first_success_does_not_sleep() {
        let policy = RetryPolicy::new(3, Duration::from_secs(10));
        let started = Instant::now();
        let result: Result<u8, String> = retry_with_backoff(&policy, "test", || Ok(7));
        assert_eq!(result, Ok(7));
        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn test_zero_retries_means_one_attempt() {
        let mut calls = 0;
        let result: Result<(), &str> = retry_with_backoff(&fast(0), "test", || {
            calls += 1;
            Err("nope")
        });
        assert!(result.is_err());
        assert_eq!(calls, 1);
    }
}
