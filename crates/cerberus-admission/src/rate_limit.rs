//! Sliding-window rate limiting.
//!
//! Admission control counts requests per client key in a rolling window that
//! is client-local: each key's window resets exactly `window` after that
//! key's own `window_start`, never on a global clock boundary.
//!
//! ## Algorithm
//!
//! On each admission check for a key:
//!
//! - no record: create one with count 1 and admit
//! - record in window, at the limit: reject without incrementing
//! - record in window, below the limit: increment and admit
//! - window elapsed: reset to count 1 at now and admit
//!
//! State lives in a sharded concurrent map; the check-and-increment is
//! atomic per key, and unrelated tenants' keys never serialize on a single
//! lock.

use cerberus_core::{Clock, SystemClock};
use dashmap::DashMap;
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Sliding-window rate limiter keyed by client identity.
///
/// # Example
///
/// ```
/// use cerberus_admission::{RateDecision, RateLimiter};
/// use std::time::Duration;
///
/// let limiter = RateLimiter::builder()
///     .max_requests(3)
///     .window(Duration::from_secs(60))
///     .build();
///
/// for _ in 0..3 {
///     assert!(matches!(limiter.check("u1:1.2.3.4"), RateDecision::Allowed { .. }));
/// }
/// assert!(matches!(limiter.check("u1:1.2.3.4"), RateDecision::Limited { .. }));
/// ```
#[derive(Debug)]
pub struct RateLimiter {
    max_requests: u32,
    window: Duration,
    clock: Arc<dyn Clock>,
    windows: DashMap<String, ClientWindow>,
}

/// Per-key window record.
#[derive(Debug, Clone)]
struct ClientWindow {
    /// Requests admitted in the current window. Never exceeds `max_requests`.
    count: u32,
    /// When this key's current window opened.
    window_start: Instant,
}

/// Result of a rate limit check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RateDecision {
    /// Request is admitted.
    Allowed {
        /// The configured per-window limit.
        limit: u32,
        /// Admissions left in this window.
        remaining: u32,
        /// Time until this key's window resets.
        reset_in: Duration,
    },
    /// Request is rejected.
    Limited {
        /// The configured per-window limit.
        limit: u32,
        /// Time until this key's window reopens.
        retry_after: Duration,
    },
}

/// Read-only view of one key's counter, for operational tooling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeySnapshot {
    /// The client key.
    pub key: String,
    /// Requests admitted in the key's current window.
    pub count: u32,
    /// Seconds until the key's window resets (0 when already elapsed).
    pub resets_in_seconds: u64,
}

/// Builder for [`RateLimiter`].
#[derive(Debug)]
pub struct RateLimiterBuilder {
    max_requests: u32,
    window: Duration,
    clock: Arc<dyn Clock>,
}

impl Default for RateLimiterBuilder {
    fn default() -> Self {
        Self {
            max_requests: 100,
            window: Duration::from_secs(3600),
            clock: Arc::new(SystemClock::new()),
        }
    }
}

impl RateLimiterBuilder {
    /// Creates a builder with the default limits (100 requests per hour).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum number of requests admitted per window.
    #[must_use]
    pub fn max_requests(mut self, max_requests: u32) -> Self {
        self.max_requests = max_requests;
        self
    }

    /// Sets the window duration.
    #[must_use]
    pub fn window(mut self, window: Duration) -> Self {
        self.window = window;
        self
    }

    /// Sets the window duration in seconds.
    #[must_use]
    pub fn window_secs(self, seconds: u64) -> Self {
        self.window(Duration::from_secs(seconds))
    }

    /// Injects a time source.
    ///
    /// Tests use a manual clock so windows elapse without sleeping.
    #[must_use]
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Builds the rate limiter.
    #[must_use]
    pub fn build(self) -> RateLimiter {
        RateLimiter {
            max_requests: self.max_requests,
            window: self.window,
            clock: self.clock,
            windows: DashMap::new(),
        }
    }
}

impl RateLimiter {
    /// Creates a rate limiter builder.
    #[must_use]
    pub fn builder() -> RateLimiterBuilder {
        RateLimiterBuilder::new()
    }

    /// Creates a rate limiter with the given limits and the system clock.
    #[must_use]
    pub fn new(max_requests: u32, window: Duration) -> Self {
        RateLimiterBuilder::new()
            .max_requests(max_requests)
            .window(window)
            .build()
    }

    /// Returns the configured per-window limit.
    #[must_use]
    pub const fn max_requests(&self) -> u32 {
        self.max_requests
    }

    /// Returns the configured window duration.
    #[must_use]
    pub const fn window(&self) -> Duration {
        self.window
    }

    /// Checks and updates the counter for a key.
    ///
    /// The entire check-and-increment holds the key's map entry, so
    /// concurrent callers on the same key serialize here and the count can
    /// never pass `max_requests` within one window.
    pub fn check(&self, key: &str) -> RateDecision {
        let now = self.clock.now();
        let mut entry = self
            .windows
            .entry(key.to_string())
            .or_insert_with(|| ClientWindow {
                count: 0,
                window_start: now,
            });
        let slot = entry.value_mut();

        let elapsed = now.saturating_duration_since(slot.window_start);
        if elapsed >= self.window {
            slot.count = 1;
            slot.window_start = now;
            return RateDecision::Allowed {
                limit: self.max_requests,
                remaining: self.max_requests.saturating_sub(1),
                reset_in: self.window,
            };
        }

        if slot.count >= self.max_requests {
            let retry_after = self.window - elapsed;
            tracing::debug!(key, retry_after_secs = retry_after.as_secs(), "rate limited");
            return RateDecision::Limited {
                limit: self.max_requests,
                retry_after,
            };
        }

        slot.count += 1;
        RateDecision::Allowed {
            limit: self.max_requests,
            remaining: self.max_requests - slot.count,
            reset_in: self.window - elapsed,
        }
    }

    /// Returns the time until the key's current window resets.
    ///
    /// `None` when the key has no record or its window already elapsed.
    #[must_use]
    pub fn retry_after(&self, key: &str) -> Option<Duration> {
        let slot = self.windows.get(key)?;
        let elapsed = self.clock.now().saturating_duration_since(slot.window_start);
        (elapsed < self.window).then(|| self.window - elapsed)
    }

    /// Returns the number of tracked keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.windows.len()
    }

    /// Returns whether no keys are tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    /// Returns a read-only snapshot of every tracked key.
    ///
    /// For operational tooling only; the snapshot is not required for
    /// correctness and may lag concurrent updates.
    #[must_use]
    pub fn snapshot(&self) -> Vec<KeySnapshot> {
        let now = self.clock.now();
        self.windows
            .iter()
            .map(|entry| {
                let elapsed = now.saturating_duration_since(entry.window_start);
                KeySnapshot {
                    key: entry.key().clone(),
                    count: entry.count,
                    resets_in_seconds: self.window.saturating_sub(elapsed).as_secs(),
                }
            })
            .collect()
    }

    /// Evicts keys whose window fully elapsed with no further activity.
    ///
    /// Semantically identical to the reset the next `check` would perform,
    /// so eviction can never admit traffic a live record would have
    /// rejected. Returns the number of keys removed.
    pub fn evict_stale(&self) -> usize {
        let now = self.clock.now();
        let before = self.windows.len();
        self.windows
            .retain(|_, slot| now.saturating_duration_since(slot.window_start) < self.window);
        let evicted = before - self.windows.len();
        if evicted > 0 {
            tracing::debug!(evicted, "evicted stale rate limit keys");
        }
        evicted
    }

    /// Spawns a background task sweeping stale keys on an interval.
    ///
    /// Without a sweeper (or periodic [`RateLimiter::evict_stale`] calls)
    /// the key map grows with the number of distinct clients ever seen.
    pub fn start_sweeper(self: Arc<Self>, every: Duration) -> tokio::task::JoinHandle<()> {
        let limiter = self;
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                limiter.evict_stale();
            }
        })
    }
}
