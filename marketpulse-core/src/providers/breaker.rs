//! Circuit breaker shared by the provider clients.
//!
//! Public market APIs ban IPs that keep hammering after a 403 and throttle
//! hard after repeated 429s. Once tripped, the breaker refuses requests for
//! a cooldown period so the dashboard degrades to synthetic data instead of
//! making things worse.

use std::sync::Mutex;
use std::time::{Duration, Instant};

const FAILURE_THRESHOLD: u32 = 3;

#[derive(Debug, Clone, Copy)]
enum Gate {
    Closed,
    Open { since: Instant },
}

#[derive(Debug)]
struct Inner {
    gate: Gate,
    consecutive_failures: u32,
}

/// Trips after repeated failures (or immediately on a ban) and stays open
/// for the cooldown, then closes again.
#[derive(Debug)]
pub struct CircuitBreaker {
    inner: Mutex<Inner>,
    cooldown: Duration,
}

impl CircuitBreaker {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            inner: Mutex::new(Inner {
                gate: Gate::Closed,
                consecutive_failures: 0,
            }),
            cooldown,
        }
    }

    /// Standard provider breaker: 30-minute cooldown.
    pub fn default_provider() -> Self {
        Self::new(Duration::from_secs(30 * 60))
    }

    /// Whether a request may be issued right now. Re-closes the gate when
    /// the cooldown has elapsed.
    pub fn is_allowed(&self) -> bool {
        let mut inner = self.inner.lock().unwrap();
        match inner.gate {
            Gate::Closed => true,
            Gate::Open { since } => {
                if since.elapsed() >= self.cooldown {
                    inner.gate = Gate::Closed;
                    inner.consecutive_failures = 0;
                    true
                } else {
                    false
                }
            }
        }
    }

    pub fn record_success(&self) {
        self.inner.lock().unwrap().consecutive_failures = 0;
    }

    /// Count a failure; trips the gate once the threshold is reached.
    pub fn record_failure(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.consecutive_failures += 1;
        if inner.consecutive_failures >= FAILURE_THRESHOLD {
            inner.gate = Gate::Open {
                since: Instant::now(),
            };
        }
    }

    /// Trip immediately (HTTP 403 / ban).
    pub fn trip(&self) {
        self.inner.lock().unwrap().gate = Gate::Open {
            since: Instant::now(),
        };
    }

    /// Time until requests are allowed again (zero when closed).
    pub fn remaining_cooldown(&self) -> Duration {
        match self.inner.lock().unwrap().gate {
            Gate::Closed => Duration::ZERO,
            Gate::Open { since } => self.cooldown.saturating_sub(since.elapsed()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_closed() {
        let cb = CircuitBreaker::new(Duration::from_secs(60));
        assert!(cb.is_allowed());
        assert_eq!(cb.remaining_cooldown(), Duration::ZERO);
    }

    #[test]
    fn trips_at_the_failure_threshold() {
        let cb = CircuitBreaker::new(Duration::from_secs(60));
        cb.record_failure();
        cb.record_failure();
        assert!(cb.is_allowed());
        cb.record_failure();
        assert!(!cb.is_allowed());
    }

    #[test]
    fn success_resets_the_failure_count() {
        let cb = CircuitBreaker::new(Duration::from_secs(60));
        cb.record_failure();
        cb.record_failure();
        cb.record_success();
        cb.record_failure();
        assert!(cb.is_allowed());
    }

    #[test]
    fn immediate_trip_blocks_requests() {
        let cb = CircuitBreaker::new(Duration::from_secs(60));
        cb.trip();
        assert!(!cb.is_allowed());
        assert!(cb.remaining_cooldown() > Duration::ZERO);
    }

    #[test]
    fn recloses_after_cooldown() {
        let cb = CircuitBreaker::new(Duration::from_millis(10));
        cb.trip();
        assert!(!cb.is_allowed());
        std::thread::sleep(Duration::from_millis(15));
        assert!(cb.is_allowed());
    }
}
