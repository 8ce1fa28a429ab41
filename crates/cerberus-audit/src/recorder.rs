//! The append-only audit trail.
//!
//! Every completed pipeline run, admitted or rejected, appends exactly one
//! [`AuditEntry`]. Entries are never mutated or deleted by normal operation;
//! retention and rotation belong to the operator, not this type.
//!
//! Query results come back in arrival order (the append order). The log is a
//! single globally-ordered stream, so one writer lock *is* the
//! synchronization discipline; readers share.

use cerberus_core::{CorrelationId, ErrorCategory};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

/// One processed request, as recorded in the audit trail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    /// When the pipeline run completed.
    pub timestamp: DateTime<Utc>,
    /// Correlation identifier of the request.
    pub correlation_id: CorrelationId,
    /// Tenant the request resolved to, when resolution got that far.
    pub tenant_id: Option<String>,
    /// Authenticated user, when authentication got that far.
    pub user_id: Option<String>,
    /// Action label (`"METHOD endpoint"`).
    pub action: String,
    /// Status code of the outcome (200 on success).
    pub status_code: u16,
    /// Failure category; `None` for admitted requests.
    pub category: Option<ErrorCategory>,
    /// Client IP address.
    pub ip_address: String,
    /// Client user agent.
    pub user_agent: String,
    /// Serialized body size in bytes.
    pub request_size: usize,
}

/// Filter for [`AuditRecorder::query`]. Empty filters match everything.
#[derive(Debug, Clone, Default)]
pub struct AuditQuery {
    tenant_id: Option<String>,
    user_id: Option<String>,
    since: Option<DateTime<Utc>>,
}

impl AuditQuery {
    /// Creates a filter matching every entry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts matches to one tenant.
    #[must_use]
    pub fn tenant(mut self, tenant_id: impl Into<String>) -> Self {
        self.tenant_id = Some(tenant_id.into());
        self
    }

    /// Restricts matches to one user.
    #[must_use]
    pub fn user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    /// Restricts matches to entries at or after the given time.
    #[must_use]
    pub fn since(mut self, since: DateTime<Utc>) -> Self {
        self.since = Some(since);
        self
    }

    fn matches(&self, entry: &AuditEntry) -> bool {
        self.tenant_id
            .as_ref()
            .map_or(true, |t| entry.tenant_id.as_ref() == Some(t))
            && self
                .user_id
                .as_ref()
                .map_or(true, |u| entry.user_id.as_ref() == Some(u))
            && self.since.map_or(true, |since| entry.timestamp >= since)
    }
}

/// Append-only audit log with a filtered read path.
///
/// # Example
///
/// ```
/// use cerberus_audit::{AuditEntry, AuditQuery, AuditRecorder};
/// use cerberus_core::CorrelationId;
/// use chrono::Utc;
///
/// let recorder = AuditRecorder::new();
/// recorder.record(AuditEntry {
///     timestamp: Utc::now(),
///     correlation_id: CorrelationId::new(),
///     tenant_id: Some("org1".to_string()),
///     user_id: Some("u1".to_string()),
///     action: "GET /items".to_string(),
///     status_code: 200,
///     category: None,
///     ip_address: "1.2.3.4".to_string(),
///     user_agent: String::new(),
///     request_size: 0,
/// });
///
/// assert_eq!(recorder.query(&AuditQuery::new().tenant("org1")).len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct AuditRecorder {
    entries: RwLock<Vec<AuditEntry>>,
}

impl AuditRecorder {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an entry.
    pub fn record(&self, entry: AuditEntry) {
        tracing::debug!(
            correlation_id = %entry.correlation_id,
            action = %entry.action,
            status = entry.status_code,
            "audit entry recorded"
        );
        self.entries.write().push(entry);
    }

    /// Returns entries matching the filter, in arrival order.
    #[must_use]
    pub fn query(&self, query: &AuditQuery) -> Vec<AuditEntry> {
        self.entries
            .read()
            .iter()
            .filter(|entry| query.matches(entry))
            .cloned()
            .collect()
    }

    /// Returns the number of recorded entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns whether the trail is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn entry(tenant: Option<&str>, user: Option<&str>, action: &str) -> AuditEntry {
        AuditEntry {
            timestamp: Utc::now(),
            correlation_id: CorrelationId::new(),
            tenant_id: tenant.map(ToString::to_string),
            user_id: user.map(ToString::to_string),
            action: action.to_string(),
            status_code: 200,
            category: None,
            ip_address: "1.2.3.4".to_string(),
            user_agent: String::new(),
            request_size: 0,
        }
    }

    #[test]
    fn test_entries_keep_arrival_order() {
        let recorder = AuditRecorder::new();
        recorder.record(entry(Some("org1"), Some("u1"), "GET /a"));
        recorder.record(entry(Some("org1"), Some("u2"), "GET /b"));
        recorder.record(entry(Some("org2"), Some("u1"), "GET /c"));

        let all = recorder.query(&AuditQuery::new());
        let actions: Vec<_> = all.iter().map(|e| e.action.as_str()).collect();
        assert_eq!(actions, ["GET /a", "GET /b", "GET /c"]);
    }

    #[test]
    fn test_query_filters_by_tenant_and_user() {
        let recorder = AuditRecorder::new();
        recorder.record(entry(Some("org1"), Some("u1"), "GET /a"));
        recorder.record(entry(Some("org1"), Some("u2"), "GET /b"));
        recorder.record(entry(Some("org2"), Some("u1"), "GET /c"));
        recorder.record(entry(None, None, "GET /d"));

        assert_eq!(recorder.query(&AuditQuery::new().tenant("org1")).len(), 2);
        assert_eq!(recorder.query(&AuditQuery::new().user("u1")).len(), 2);
        assert_eq!(
            recorder
                .query(&AuditQuery::new().tenant("org1").user("u1"))
                .len(),
            1
        );
    }

    #[test]
    fn test_query_filters_by_since() {
        let recorder = AuditRecorder::new();
        let mut old = entry(Some("org1"), Some("u1"), "GET /old");
        old.timestamp = Utc::now() - Duration::days(31);
        recorder.record(old);
        recorder.record(entry(Some("org1"), Some("u1"), "GET /new"));

        let recent = recorder.query(&AuditQuery::new().since(Utc::now() - Duration::days(30)));
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].action, "GET /new");
    }

    #[test]
    fn test_failure_entries_keep_partial_context() {
        let recorder = AuditRecorder::new();
        let mut failed = entry(None, None, "POST /items");
        failed.status_code = 401;
        failed.category = Some(ErrorCategory::Unauthenticated);
        recorder.record(failed);

        let all = recorder.query(&AuditQuery::new());
        assert_eq!(all[0].category, Some(ErrorCategory::Unauthenticated));
        assert!(all[0].tenant_id.is_none());
    }

    #[test]
    fn test_concurrent_appends_all_land() {
        let recorder = std::sync::Arc::new(AuditRecorder::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let recorder = std::sync::Arc::clone(&recorder);
                std::thread::spawn(move || {
                    for _ in 0..50 {
                        recorder.record(entry(Some("org1"), Some("u1"), "GET /x"));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(recorder.len(), 400);
    }
}
