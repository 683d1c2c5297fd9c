//! Exponential backoff schedule and the sleep boundary.
//!
//! The delay computation is pure. Suspension goes through [`Sleeper`] so
//! tests can record delays instead of waiting.

use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Delay schedule doubling per retry, capped at `max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExponentialBackoff {
    pub base: Duration,
    pub max: Duration,
    /// Total attempts, including the first one.
    pub max_attempts: u32,
}

impl Default for ExponentialBackoff {
    fn default() -> Self {
        Self {
            base: Duration::from_millis(100),
            max: Duration::from_secs(5),
            max_attempts: 3,
        }
    }
}

impl ExponentialBackoff {
    pub fn new(base: Duration, max: Duration, max_attempts: u32) -> Self {
        Self {
            base,
            max,
            max_attempts,
        }
    }

    pub fn from_millis(base_ms: u64, max_ms: u64, max_attempts: u32) -> Self {
        Self::new(
            Duration::from_millis(base_ms),
            Duration::from_millis(max_ms),
            max_attempts,
        )
    }

    /// `min(base * 2^retry, max)`; `retry` counts from zero.
    pub fn delay(&self, retry: u32) -> Duration {
        2u32.checked_pow(retry)
            .and_then(|factor| self.base.checked_mul(factor))
            .map_or(self.max, |delay| delay.min(self.max))
    }

    /// Delays slept between consecutive attempts.
    pub fn schedule(&self) -> impl Iterator<Item = Duration> + '_ {
        (0..self.max_attempts.saturating_sub(1)).map(|retry| self.delay(retry))
    }
}

/// Suspends the current thread between retry attempts.
pub trait Sleeper: Send + Sync {
    fn sleep(&self, duration: Duration);
}

/// Sleeps on the OS thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Records requested sleeps without waiting.
#[derive(Debug, Default)]
pub struct RecordingSleeper {
    slept: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sleeps(&self) -> Vec<Duration> {
        self.slept
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn total(&self) -> Duration {
        self.sleeps().iter().sum()
    }
}

impl Sleeper for RecordingSleeper {
    fn sleep(&self, duration: Duration) {
        self.slept
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(duration);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_delay_doubles_until_cap() {
        let backoff = ExponentialBackoff::from_millis(100, 1_000, 6);
        let delays: Vec<u128> = (0..6).map(|r| backoff.delay(r).as_millis()).collect();
        assert_eq!(delays, vec![100, 200, 400, 800, 1_000, 1_000]);
    }

    #[test]
    fn test_huge_retry_saturates_at_max() {
        let backoff = ExponentialBackoff::default();
        assert_eq!(backoff.delay(64), backoff.max);
        assert_eq!(backoff.delay(u32::MAX), backoff.max);
    }

    #[test]
    fn test_schedule_has_one_delay_between_each_attempt() {
        let backoff = ExponentialBackoff::default();
        let schedule: Vec<Duration> = backoff.schedule().collect();
        assert_eq!(
            schedule,
            vec![Duration::from_millis(100), Duration::from_millis(200)]
        );
        assert_eq!(ExponentialBackoff::from_millis(1, 1, 0).schedule().count(), 0);
    }

    proptest! {
        #[test]
        fn delay_is_monotonic_and_capped(base in 1u64..10_000, max in 1u64..100_000, retry in 0u32..40) {
            let backoff = ExponentialBackoff::from_millis(base, max, 3);
            prop_assert!(backoff.delay(retry) <= backoff.max);
            prop_assert!(backoff.delay(retry) <= backoff.delay(retry + 1));
        }
    }
}
