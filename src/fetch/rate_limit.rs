//! Explicit rate limiter for collector invocations
//!
//! Holds the timestamp of the last completed call and pauses the caller
//! until the configured minimum interval has passed. The timestamp only
//! advances on completed calls, so a failed invocation does not reset the
//! window.

use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Minimum-interval rate limiter keyed on the last completed call
#[derive(Debug)]
pub struct RateLimiter {
    min_interval: Duration,
    last_call: Mutex<Option<Instant>>,
}

impl RateLimiter {
    /// Creates a limiter enforcing `min_interval` between calls
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_call: Mutex::new(None),
        }
    }

    /// Sleeps until the minimum interval since the last completed call has
    /// elapsed
    pub async fn throttle(&self) {
        let wait = {
            let last_call = self.last_call.lock().unwrap_or_else(|e| e.into_inner());
            match *last_call {
                Some(at) => self.min_interval.saturating_sub(at.elapsed()),
                None => Duration::ZERO,
            }
        };

        if !wait.is_zero() {
            tracing::debug!("Rate limiting: sleeping for {:.2}s", wait.as_secs_f64());
            tokio::time::sleep(wait).await;
        }
    }

    /// Marks the current instant as the last completed call
    pub fn stamp(&self) {
        let mut last_call = self.last_call.lock().unwrap_or_else(|e| e.into_inner());
        *last_call = Some(Instant::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_first_call_is_not_delayed() {
        let limiter = RateLimiter::new(Duration::from_secs(10));

        let start = Instant::now();
        limiter.throttle().await;
        assert!(start.elapsed() < Duration::from_millis(100));
    }

    #[tokio::test]
    async fn test_second_call_waits_for_interval() {
        let limiter = RateLimiter::new(Duration::from_millis(80));

        limiter.throttle().await;
        limiter.stamp();

        let start = Instant::now();
        limiter.throttle().await;
        assert!(
            start.elapsed() >= Duration::from_millis(70),
            "second call should wait out the interval, waited {:?}",
            start.elapsed()
        );
    }

    #[tokio::test]
    async fn test_no_wait_after_interval_passed() {
        let limiter = RateLimiter::new(Duration::from_millis(20));

        limiter.throttle().await;
        limiter.stamp();
        tokio::time::sleep(Duration::from_millis(40)).await;

        let start = Instant::now();
        limiter.throttle().await;
        assert!(start.elapsed() < Duration::from_millis(20));
    }

    #[tokio::test]
    async fn test_unstamped_failure_does_not_reset_window() {
        let limiter = RateLimiter::new(Duration::from_millis(500));

        // A call that never completed (no stamp) leaves the limiter open
        limiter.throttle().await;

        let start = Instant::now();
        limiter.throttle().await;
        assert!(start.elapsed() < Duration::from_millis(100));
    }
}
