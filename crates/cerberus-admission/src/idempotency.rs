//! Idempotent replay protection.
//!
//! A client that retries a request with the same `Idempotency-Key` must see
//! the stored outcome of the first attempt, byte for byte, regardless of
//! what else changed in the retry. The store is therefore strictly
//! first-write-wins: a second `store` for an existing key is a no-op.
//!
//! Records live for the process lifetime. The upstream system never declared
//! a replay horizon, so no TTL is applied here; [`IdempotencyStore::len`]
//! exists so operators can watch growth instead of having the horizon
//! silently shortened. Long-running deployments should treat the unbounded
//! map as a known resource-growth risk.

use cerberus_core::AdmissionOutcome;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

/// First-write-wins replay cache keyed by the client idempotency key.
///
/// # Example
///
/// ```
/// use cerberus_admission::IdempotencyStore;
/// # use cerberus_core::{AdmissionContext, AdmissionOutcome, Principal};
///
/// # let mut ctx = AdmissionContext::new();
/// # ctx.set_tenant_id("org1");
/// # ctx.set_principal(Principal::new("u1", vec![]));
/// # ctx.set_locale("en-US");
/// # ctx.set_timezone("UTC");
/// # let outcome = AdmissionOutcome::accepted(ctx.request_context().unwrap());
/// let store = IdempotencyStore::new();
/// assert!(store.check("key-1").is_none());
///
/// store.store("key-1", outcome.clone());
/// assert_eq!(store.check("key-1"), Some(outcome));
/// ```
#[derive(Debug, Default)]
pub struct IdempotencyStore {
    entries: DashMap<String, AdmissionOutcome>,
}

impl IdempotencyStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the stored outcome for a key, if one exists.
    ///
    /// A hit short-circuits the rest of the pipeline: the stored outcome is
    /// returned verbatim whatever the current request's other attributes.
    #[must_use]
    pub fn check(&self, key: &str) -> Option<AdmissionOutcome> {
        self.entries.get(key).map(|entry| entry.value().clone())
    }

    /// Stores the outcome for a key, first-write-wins.
    ///
    /// Returns `true` when the outcome was stored, `false` when the key
    /// already had one (the existing outcome is kept, preserving replay
    /// determinism). Atomic per key.
    pub fn store(&self, key: impl Into<String>, outcome: AdmissionOutcome) -> bool {
        match self.entries.entry(key.into()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(vacant) => {
                vacant.insert(outcome);
                true
            }
        }
    }

    /// Returns whether a key has a stored outcome.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Returns the number of stored records.
    ///
    /// Operational introspection for the unbounded-growth risk documented
    /// on this type.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cerberus_core::{AdmissionContext, ErrorCategory, NormalizedError, Principal};
    use chrono::Utc;
    use uuid::Uuid;

    fn accepted_outcome(tenant: &str) -> AdmissionOutcome {
        let mut ctx = AdmissionContext::new();
        ctx.set_tenant_id(tenant);
        ctx.set_principal(Principal::new("u1", vec!["learner".to_string()]));
        ctx.set_locale("en-US");
        ctx.set_timezone("UTC");
        AdmissionOutcome::accepted(ctx.request_context().unwrap())
    }

    fn rejected_outcome() -> AdmissionOutcome {
        AdmissionOutcome::rejected(NormalizedError {
            error_id: Uuid::now_v7(),
            timestamp: Utc::now(),
            kind: "Unauthenticated".to_string(),
            category: ErrorCategory::Unauthenticated,
            message: "authentication required".to_string(),
            context: "request admission".to_string(),
            status_code: 401,
            details: serde_json::Value::Null,
        })
    }

    #[test]
    fn test_miss_returns_none() {
        let store = IdempotencyStore::new();
        assert!(store.check("absent").is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_store_then_check_round_trip() {
        let store = IdempotencyStore::new();
        let outcome = accepted_outcome("org1");

        assert!(store.store("key-1", outcome.clone()));
        assert_eq!(store.check("key-1"), Some(outcome));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_first_write_wins() {
        let store = IdempotencyStore::new();
        let first = accepted_outcome("org1");
        let second = accepted_outcome("org2");

        assert!(store.store("key-1", first.clone()));
        assert!(!store.store("key-1", second));
        assert_eq!(store.check("key-1"), Some(first));
    }

    #[test]
    fn test_failure_outcomes_replay_identically() {
        let store = IdempotencyStore::new();
        let failure = rejected_outcome();

        store.store("key-1", failure.clone());
        assert_eq!(store.check("key-1"), Some(failure));
    }

    #[test]
    fn test_concurrent_stores_keep_exactly_one_value() {
        let store = std::sync::Arc::new(IdempotencyStore::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = std::sync::Arc::clone(&store);
                std::thread::spawn(move || store.store("key", accepted_outcome(&format!("org{i}"))))
            })
            .collect();

        let wins: usize = handles
            .into_iter()
            .map(|h| usize::from(h.join().unwrap()))
            .sum();
        assert_eq!(wins, 1);
        assert_eq!(store.len(), 1);
    }
}
