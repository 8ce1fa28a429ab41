//! AI usage accounting.
//!
//! The platform meters model usage per user: how many requests, how many
//! tokens in and out, and how much processing time each (user, model) pair
//! consumed. The meter is an optional sink callers feed after their AI
//! calls complete; the admission pipeline itself never writes to it.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::Serialize;
use std::collections::HashMap;
use std::time::Duration;

/// Accumulated usage for one (user, model) pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UsageStats {
    /// Number of recorded requests.
    pub requests: u64,
    /// Total input tokens consumed.
    pub input_tokens: u64,
    /// Total output tokens produced.
    pub output_tokens: u64,
    /// Total processing time in seconds.
    pub processing_seconds: f64,
    /// When the pair was last used.
    pub last_used: DateTime<Utc>,
}

/// Per-user, per-model usage meter.
///
/// # Example
///
/// ```
/// use cerberus_audit::UsageMeter;
/// use std::time::Duration;
///
/// let meter = UsageMeter::new();
/// meter.record("u1", "tutor-large", 120, 450, Duration::from_millis(900));
/// meter.record("u1", "tutor-large", 80, 300, Duration::from_millis(700));
///
/// let stats = meter.model_summary("u1", "tutor-large").unwrap();
/// assert_eq!(stats.requests, 2);
/// assert_eq!(stats.input_tokens, 200);
/// ```
#[derive(Debug, Default)]
pub struct UsageMeter {
    stats: DashMap<(String, String), UsageStats>,
}

impl UsageMeter {
    /// Creates an empty meter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one model invocation for a user.
    pub fn record(
        &self,
        user_id: &str,
        model: &str,
        input_tokens: u64,
        output_tokens: u64,
        processing_time: Duration,
    ) {
        let mut entry = self
            .stats
            .entry((user_id.to_string(), model.to_string()))
            .or_insert_with(|| UsageStats {
                requests: 0,
                input_tokens: 0,
                output_tokens: 0,
                processing_seconds: 0.0,
                last_used: Utc::now(),
            });
        let stats = entry.value_mut();
        stats.requests += 1;
        stats.input_tokens += input_tokens;
        stats.output_tokens += output_tokens;
        stats.processing_seconds += processing_time.as_secs_f64();
        stats.last_used = Utc::now();
    }

    /// Returns usage per model for one user.
    #[must_use]
    pub fn summary(&self, user_id: &str) -> HashMap<String, UsageStats> {
        self.stats
            .iter()
            .filter(|entry| entry.key().0 == user_id)
            .map(|entry| (entry.key().1.clone(), entry.value().clone()))
            .collect()
    }

    /// Returns usage for one (user, model) pair.
    #[must_use]
    pub fn model_summary(&self, user_id: &str, model: &str) -> Option<UsageStats> {
        self.stats
            .get(&(user_id.to_string(), model.to_string()))
            .map(|entry| entry.value().clone())
    }
}
