//! Per-client token bucket throttling.
//!
//! The limiter only decides; a denied request is answered by the
//! rate-limit-exceeded action so it flows through dispatch like any other.
//!
//! A bucket left alone for `burst / rps` seconds is full again and carries no
//! state a fresh bucket wouldn't, so idle buckets are swept out when new
//! clients arrive. The map holds at most the clients seen within one refill
//! window.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use crate::config::RateLimitConfig;

/// A simple token bucket rate limiter.
#[derive(Debug)]
struct TokenBucket {
    tokens: f64,
    last_update: Instant,
}

impl TokenBucket {
    fn new(capacity: f64, now: Instant) -> Self {
        Self {
            tokens: capacity,
            last_update: now,
        }
    }

    fn try_acquire(&mut self, capacity: f64, refill_rate: f64, now: Instant) -> bool {
        let elapsed = now.saturating_duration_since(self.last_update).as_secs_f64();

        self.tokens = (self.tokens + elapsed * refill_rate).min(capacity);
        self.last_update = now;

        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            true
        } else {
            false
        }
    }
}

#[derive(Debug)]
struct Buckets {
    clients: HashMap<String, TokenBucket>,
    last_sweep: Instant,
}

/// Token buckets keyed by client.
#[derive(Debug)]
pub struct RateLimiter {
    buckets: Mutex<Buckets>,
    rps: f64,
    burst: f64,
    idle_after: Duration,
}

impl RateLimiter {
    pub fn new(requests_per_second: u32, burst_size: u32) -> Self {
        let rps = f64::from(requests_per_second);
        let burst = f64::from(burst_size);
        let idle_after = if rps > 0.0 {
            Duration::try_from_secs_f64(burst / rps).unwrap_or(Duration::MAX)
        } else {
            Duration::MAX
        };

        Self {
            buckets: Mutex::new(Buckets {
                clients: HashMap::new(),
                last_sweep: Instant::now(),
            }),
            rps,
            burst,
            idle_after,
        }
    }

    /// Build a limiter when throttling is enabled.
    pub fn from_config(config: &RateLimitConfig) -> Option<Self> {
        config
            .enabled
            .then(|| Self::new(config.requests_per_second, config.burst_size))
    }

    /// Take one token for `key`; false when the client is over its budget.
    pub fn check(&self, key: &str) -> bool {
        self.check_at(key, Instant::now())
    }

    fn check_at(&self, key: &str, now: Instant) -> bool {
        let mut buckets = self.buckets.lock().unwrap_or_else(PoisonError::into_inner);

        if !buckets.clients.contains_key(key)
            && now.saturating_duration_since(buckets.last_sweep) >= self.idle_after
        {
            self.sweep(&mut buckets, now);
        }

        let bucket = buckets
            .clients
            .entry(key.to_string())
            .or_insert_with(|| TokenBucket::new(self.burst, now));

        bucket.try_acquire(self.burst, self.rps, now)
    }

    /// Drop buckets that have refilled completely.
    fn sweep(&self, buckets: &mut Buckets, now: Instant) {
        let before = buckets.clients.len();
        buckets
            .clients
            .retain(|_, bucket| now.saturating_duration_since(bucket.last_update) < self.idle_after);
        buckets.last_sweep = now;

        let removed = before - buckets.clients.len();
        if removed > 0 {
            tracing::debug!(removed, remaining = buckets.clients.len(), "Evicted idle rate limit buckets");
        }
    }

    /// Number of clients with a live bucket.
    pub fn tracked_clients(&self) -> usize {
        self.buckets
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clients
            .len()
    }
}
