//! Inbound request types.
//!
//! [`RawRequest`] is the immutable input to the admission pipeline: the
//! transport-independent shape of one inbound call. Headers use
//! [`http::HeaderMap`], which gives the case-insensitive lookup the pipeline
//! relies on without pulling in any transport.

use http::header::{HeaderMap, HeaderName, HeaderValue};
use serde_json::Value;

/// Header names recognized by the admission pipeline.
///
/// The tenant, idempotency, and correlation header names are defaults; each
/// can be overridden through `cerberus-config`.
pub mod headers {
    /// Primary tenant/organization identifier.
    pub const TENANT_PRIMARY: &str = "x-organization-id";
    /// Alias tenant identifier, consulted when the primary is absent.
    pub const TENANT_ALIAS: &str = "x-tenant-id";
    /// Bearer credential carrier.
    pub const AUTHORIZATION: &str = "authorization";
    /// Client-supplied replay-protection key.
    pub const IDEMPOTENCY_KEY: &str = "idempotency-key";
    /// Locale negotiation header.
    pub const ACCEPT_LANGUAGE: &str = "accept-language";
    /// Client timezone override.
    pub const TIMEZONE: &str = "x-timezone";
    /// Inbound correlation identifier, reused when it parses as a UUID.
    pub const CORRELATION_ID: &str = "x-correlation-id";
}

/// An immutable inbound request, as handed to the admission pipeline.
///
/// `RawRequest` deliberately knows nothing about the transport that produced
/// it: callers map their HTTP/gRPC/queue messages into this shape and hand it
/// to the [`RequestProcessor`](https://docs.rs/cerberus-pipeline).
///
/// # Example
///
/// ```
/// use cerberus_core::RawRequest;
///
/// let request = RawRequest::builder()
///     .method("POST")
///     .endpoint("/items")
///     .header("X-Organization-ID", "org1")
///     .ip_address("1.2.3.4")
///     .build();
///
/// assert_eq!(request.header("x-organization-id"), Some("org1"));
/// ```
#[derive(Debug, Clone)]
pub struct RawRequest {
    method: String,
    endpoint: String,
    headers: HeaderMap,
    body: Value,
    ip_address: String,
    user_agent: String,
}

impl RawRequest {
    /// Creates a new request builder.
    #[must_use]
    pub fn builder() -> RawRequestBuilder {
        RawRequestBuilder::new()
    }

    /// Returns the request method (e.g. `GET`, `POST`).
    #[must_use]
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Returns the request endpoint path.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Returns the request headers.
    #[must_use]
    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns a header value as a string, if present and valid UTF-8.
    ///
    /// Lookup is case-insensitive.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }

    /// Returns the structured request body.
    ///
    /// Requests without a body carry [`Value::Null`].
    #[must_use]
    pub const fn body(&self) -> &Value {
        &self.body
    }

    /// Returns the client IP address.
    #[must_use]
    pub fn ip_address(&self) -> &str {
        &self.ip_address
    }

    /// Returns the client user agent.
    #[must_use]
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// Returns the serialized size of the body in bytes.
    ///
    /// A missing body counts as zero.
    #[must_use]
    pub fn body_size(&self) -> usize {
        if self.body.is_null() {
            0
        } else {
            serde_json::to_string(&self.body).map_or(0, |s| s.len())
        }
    }

    /// Returns the audit action label for this request (`"METHOD endpoint"`).
    #[must_use]
    pub fn action(&self) -> String {
        format!("{} {}", self.method, self.endpoint)
    }
}

/// Builder for [`RawRequest`].
///
/// Unset fields default to `GET`, an empty endpoint, no headers, a null body,
/// and empty IP/user-agent strings, mirroring the lenient shape of the
/// upstream transports.
#[derive(Debug, Clone, Default)]
pub struct RawRequestBuilder {
    method: Option<String>,
    endpoint: Option<String>,
    headers: HeaderMap,
    body: Option<Value>,
    ip_address: Option<String>,
    user_agent: Option<String>,
}

impl RawRequestBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the request method.
    #[must_use]
    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    /// Sets the endpoint path.
    #[must_use]
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Adds a header.
    ///
    /// Names and values that are not valid HTTP header tokens are dropped;
    /// the pipeline never sees malformed header pairs.
    #[must_use]
    pub fn header(mut self, name: &str, value: &str) -> Self {
        if let (Ok(name), Ok(value)) = (
            HeaderName::try_from(name),
            HeaderValue::from_str(value),
        ) {
            self.headers.insert(name, value);
        }
        self
    }

    /// Sets the structured body.
    #[must_use]
    pub fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Sets the client IP address.
    #[must_use]
    pub fn ip_address(mut self, ip: impl Into<String>) -> Self {
        self.ip_address = Some(ip.into());
        self
    }

    /// Sets the client user agent.
    #[must_use]
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Builds the immutable request.
    #[must_use]
    pub fn build(self) -> RawRequest {
        RawRequest {
            method: self.method.unwrap_or_else(|| "GET".to_string()),
            endpoint: self.endpoint.unwrap_or_default(),
            headers: self.headers,
            body: self.body.unwrap_or(Value::Null),
            ip_address: self.ip_address.unwrap_or_default(),
            user_agent: self.user_agent.unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_builder_defaults() {
        let request = RawRequest::builder().build();
        assert_eq!(request.method(), "GET");
        assert_eq!(request.endpoint(), "");
        assert!(request.body().is_null());
        assert_eq!(request.body_size(), 0);
    }

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let request = RawRequest::builder()
            .header("X-Organization-ID", "org1")
            .build();

        assert_eq!(request.header("x-organization-id"), Some("org1"));
        assert_eq!(request.header("X-ORGANIZATION-ID"), Some("org1"));
        assert_eq!(request.header("x-tenant-id"), None);
    }

    #[test]
    fn test_invalid_header_pairs_are_dropped() {
        let request = RawRequest::builder()
            .header("not a header name", "value")
            .header("x-ok", "fine")
            .build();

        assert_eq!(request.headers().len(), 1);
        assert_eq!(request.header("x-ok"), Some("fine"));
    }

    #[test]
    fn test_body_size_counts_serialized_bytes() {
        let request = RawRequest::builder()
            .body(json!({"word": "bonjour"}))
            .build();

        assert_eq!(request.body_size(), r#"{"word":"bonjour"}"#.len());
    }

    #[test]
    fn test_action_label() {
        let request = RawRequest::builder()
            .method("POST")
            .endpoint("/items")
            .build();

        assert_eq!(request.action(), "POST /items");
    }
}
