//! The concrete admission stages.
//!
//! One module per stage, in pipeline order:
//!
//! 1. [`correlation`] - reuse or generate the correlation id
//! 2. [`tenant`] - resolve the organization
//! 3. [`auth`] - bearer authentication via the `AuthVerifier`
//! 4. [`rate_limit`] - sliding-window admission per client key
//! 5. [`idempotency`] - replay short-circuit
//! 6. [`locale`] - locale and timezone detection

pub mod auth;
pub mod correlation;
pub mod idempotency;
pub mod locale;
pub mod rate_limit;
pub mod tenant;

pub use auth::AuthStage;
pub use correlation::CorrelationStage;
pub use idempotency::IdempotencyStage;
pub use locale::LocaleStage;
pub use rate_limit::RateLimitStage;
pub use tenant::{TenantResolverFn, TenantStage};
