//! Sliding-window request limiter.
//!
//! State lives in this process only. Behind several instances a caller can
//! exceed the nominal limit by spreading requests across them.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use dashmap::DashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    pub max_requests: usize,
    pub window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 10,
            window: Duration::from_secs(60),
        }
    }
}

/// Keeps the instants of accepted requests per key and admits a request only
/// while fewer than `max_requests` of them fall inside the window.
#[derive(Debug)]
pub struct RateLimiter {
    config: RateLimitConfig,
    hits: DashMap<String, VecDeque<Instant>>,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            hits: DashMap::new(),
        }
    }

    pub fn allow(&self, key: &str) -> bool {
        self.allow_at(key, Instant::now())
    }

    pub fn allow_at(&self, key: &str, now: Instant) -> bool {
        let mut entry = self.hits.entry(key.to_string()).or_default();
        let hits = entry.value_mut();

        Self::prune(hits, now, self.config.window);

        if hits.len() >= self.config.max_requests {
            tracing::debug!(key, hits = hits.len(), "rate limit reached");
            return false;
        }

        hits.push_back(now);
        true
    }

    /// Drop keys without any request inside the window.
    pub fn purge_stale(&self) {
        self.purge_stale_at(Instant::now());
    }

    pub fn purge_stale_at(&self, now: Instant) {
        let window = self.config.window;
        self.hits.retain(|_, hits| {
            Self::prune(hits, now, window);
            !hits.is_empty()
        });

        tracing::debug!(remaining = self.hits.len(), "rate limiter purge complete");
    }

    pub fn tracked_keys(&self) -> usize {
        self.hits.len()
    }

    fn prune(hits: &mut VecDeque<Instant>, now: Instant, window: Duration) {
        while let Some(oldest) = hits.front() {
            if now.saturating_duration_since(*oldest) >= window {
                hits.pop_front();
            } else {
                break;
            }
        }
    }
}
