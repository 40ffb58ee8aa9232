//! Login rate limiting primitives.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RateLimitDecision {
    Allowed,
    Limited,
}

pub trait RateLimiter: Send + Sync {
    /// Register an attempt for the given caller key and decide whether it may
    /// proceed. Callers without a resolvable key share one bucket.
    fn check(&self, key: Option<&str>) -> RateLimitDecision;
}

#[derive(Clone, Debug)]
pub struct NoopRateLimiter;

impl RateLimiter for NoopRateLimiter {
    fn check(&self, _key: Option<&str>) -> RateLimitDecision {
        RateLimitDecision::Allowed
    }
}

/// Fixed-window in-process limiter.
///
/// Good enough for a single-instance deployment with one administrator; a
/// multi-instance setup would need to move this into the database the way the
/// session marker already is.
#[derive(Debug)]
pub struct FixedWindowLimiter {
    max_attempts: u32,
    window: Duration,
    buckets: Mutex<HashMap<String, (Instant, u32)>>,
}

impl FixedWindowLimiter {
    #[must_use]
    pub fn new(max_attempts: u32, window: Duration) -> Self {
        Self {
            max_attempts,
            window,
            buckets: Mutex::new(HashMap::new()),
        }
    }
}

impl RateLimiter for FixedWindowLimiter {
    fn check(&self, key: Option<&str>) -> RateLimitDecision {
        let key = key.unwrap_or("unknown");
        let now = Instant::now();
        let mut buckets = match self.buckets.lock() {
            Ok(buckets) => buckets,
            // Poisoned lock: another check panicked. Treat the caller as limited.
            Err(_) => return RateLimitDecision::Limited,
        };
        buckets.retain(|_, (start, _)| now.duration_since(*start) < self.window);

        let entry = buckets.entry(key.to_string()).or_insert((now, 0));
        if now.duration_since(entry.0) >= self.window {
            *entry = (now, 0);
        }
        entry.1 += 1;
        if entry.1 > self.max_attempts {
            RateLimitDecision::Limited
        } else {
            RateLimitDecision::Allowed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noop_rate_limiter_allows() {
        let limiter = NoopRateLimiter;
        assert_eq!(limiter.check(None), RateLimitDecision::Allowed);
        assert_eq!(limiter.check(Some("1.2.3.4")), RateLimitDecision::Allowed);
    }

    #[test]
    fn fixed_window_limits_after_max_attempts() {
        let limiter = FixedWindowLimiter::new(3, Duration::from_secs(60));
        for _ in 0..3 {
            assert_eq!(
                limiter.check(Some("1.2.3.4")),
                RateLimitDecision::Allowed
            );
        }
        assert_eq!(limiter.check(Some("1.2.3.4")), RateLimitDecision::Limited);
        // A different caller still has its own budget.
        assert_eq!(limiter.check(Some("5.6.7.8")), RateLimitDecision::Allowed);
    }

    #[test]
    fn missing_key_shares_one_bucket() {
        let limiter = FixedWindowLimiter::new(1, Duration::from_secs(60));
        assert_eq!(limiter.check(None), RateLimitDecision::Allowed);
        assert_eq!(limiter.check(None), RateLimitDecision::Limited);
    }
}
