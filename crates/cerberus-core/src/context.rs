//! Request context types.
//!
//! [`AdmissionContext`] is the mutable state that flows through the pipeline
//! stages; each stage enriches it with what it resolved (tenant, principal,
//! locale). Once every stage has run it is frozen into a [`RequestContext`],
//! the immutable, serializable context handed back to the caller.

use crate::error::{GateError, GateResult};
use crate::identity::Principal;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use uuid::Uuid;

/// A unique identifier threading one logical request through all logs and
/// audit entries, using UUID v7.
///
/// UUID v7 is time-ordered, which makes correlation ids naturally sortable
/// in log storage.
///
/// # Example
///
/// ```
/// use cerberus_core::CorrelationId;
///
/// let id = CorrelationId::new();
/// println!("correlation: {id}");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CorrelationId(Uuid);

impl CorrelationId {
    /// Creates a new unique correlation ID using UUID v7.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Creates a `CorrelationId` from an existing UUID.
    ///
    /// Useful when an upstream service already assigned one.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Parses a correlation ID from a header value.
    ///
    /// Returns `None` when the value is not a UUID; callers fall back to a
    /// freshly generated id so uniqueness is never forfeited to arbitrary
    /// client strings.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        Uuid::parse_str(value).ok().map(Self)
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for CorrelationId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for CorrelationId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl From<CorrelationId> for Uuid {
    fn from(id: CorrelationId) -> Self {
        id.0
    }
}

/// Mutable per-request state enriched by the pipeline stages.
///
/// The context starts out with a fresh correlation id and nothing else; the
/// stages fill in the tenant, principal, locale, and timezone in their fixed
/// order. [`AdmissionContext::request_context`] freezes the result.
#[derive(Debug, Clone)]
pub struct AdmissionContext {
    /// Correlation identifier for this request.
    correlation_id: CorrelationId,

    /// Resolved tenant identifier, set by the tenant stage.
    tenant_id: Option<String>,

    /// Authenticated principal, set by the auth stage.
    principal: Option<Principal>,

    /// Negotiated locale, set by the locale stage.
    locale: Option<String>,

    /// Client timezone, set by the locale stage.
    timezone: Option<String>,

    /// Idempotency key, recorded when the idempotency stage saw one.
    idempotency_key: Option<String>,

    /// When the request started processing.
    started_at: Instant,
}

impl AdmissionContext {
    /// Creates a new context with a fresh correlation ID.
    #[must_use]
    pub fn new() -> Self {
        Self {
            correlation_id: CorrelationId::new(),
            tenant_id: None,
            principal: None,
            locale: None,
            timezone: None,
            idempotency_key: None,
            started_at: Instant::now(),
        }
    }

    /// Returns the correlation ID.
    #[must_use]
    pub const fn correlation_id(&self) -> CorrelationId {
        self.correlation_id
    }

    /// Sets the correlation ID.
    ///
    /// This should only be called by the correlation stage.
    pub fn set_correlation_id(&mut self, id: CorrelationId) {
        self.correlation_id = id;
    }

    /// Returns the resolved tenant ID, if any.
    #[must_use]
    pub fn tenant_id(&self) -> Option<&str> {
        self.tenant_id.as_deref()
    }

    /// Sets the resolved tenant ID.
    pub fn set_tenant_id(&mut self, tenant_id: impl Into<String>) {
        self.tenant_id = Some(tenant_id.into());
    }

    /// Returns the authenticated principal, if any.
    #[must_use]
    pub const fn principal(&self) -> Option<&Principal> {
        self.principal.as_ref()
    }

    /// Sets the authenticated principal.
    pub fn set_principal(&mut self, principal: Principal) {
        self.principal = Some(principal);
    }

    /// Returns the negotiated locale, if resolved.
    #[must_use]
    pub fn locale(&self) -> Option<&str> {
        self.locale.as_deref()
    }

    /// Sets the negotiated locale.
    pub fn set_locale(&mut self, locale: impl Into<String>) {
        self.locale = Some(locale.into());
    }

    /// Returns the client timezone, if resolved.
    #[must_use]
    pub fn timezone(&self) -> Option<&str> {
        self.timezone.as_deref()
    }

    /// Sets the client timezone.
    pub fn set_timezone(&mut self, timezone: impl Into<String>) {
        self.timezone = Some(timezone.into());
    }

    /// Returns the idempotency key, when the request carried one.
    #[must_use]
    pub fn idempotency_key(&self) -> Option<&str> {
        self.idempotency_key.as_deref()
    }

    /// Records the idempotency key for the orchestrator's store step.
    pub fn set_idempotency_key(&mut self, key: impl Into<String>) {
        self.idempotency_key = Some(key.into());
    }

    /// Returns the elapsed time since the request started.
    #[must_use]
    pub fn elapsed(&self) -> std::time::Duration {
        self.started_at.elapsed()
    }

    /// Freezes this context into the immutable [`RequestContext`].
    ///
    /// Fails with an internal error when a required field was never
    /// resolved; that means a stage was skipped, which the orchestrator
    /// does not do.
    pub fn request_context(&self) -> GateResult<RequestContext> {
        let tenant_id = self
            .tenant_id
            .clone()
            .ok_or_else(|| GateError::internal("tenant was never resolved"))?;
        let principal = self
            .principal
            .clone()
            .ok_or_else(|| GateError::internal("principal was never resolved"))?;
        let locale = self
            .locale
            .clone()
            .ok_or_else(|| GateError::internal("locale was never resolved"))?;
        let timezone = self
            .timezone
            .clone()
            .ok_or_else(|| GateError::internal("timezone was never resolved"))?;

        Ok(RequestContext {
            correlation_id: self.correlation_id,
            tenant_id,
            user_id: principal.user_id,
            roles: principal.roles,
            locale,
            timezone,
            authenticated: true,
        })
    }
}

impl Default for AdmissionContext {
    fn default() -> Self {
        Self::new()
    }
}

/// The immutable, serializable context of an admitted request.
///
/// Once returned to the caller this value never changes; it is the `context`
/// field of the success envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestContext {
    /// Correlation identifier for this request.
    pub correlation_id: CorrelationId,
    /// The tenant the request was admitted for.
    pub tenant_id: String,
    /// The authenticated user.
    pub user_id: String,
    /// The authenticated user's roles.
    pub roles: Vec<String>,
    /// Negotiated locale (e.g. `en-US`).
    pub locale: String,
    /// Client timezone (e.g. `UTC`).
    pub timezone: String,
    /// Always `true`: an admitted request is an authenticated request.
    pub authenticated: bool,
}
