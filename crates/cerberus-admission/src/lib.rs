//! # Cerberus Admission
//!
//! Process-wide admission services shared by every concurrent request:
//!
//! - [`RateLimiter`] - sliding-window admission control keyed by client
//!   identity
//! - [`IdempotencyStore`] - first-write-wins replay cache keyed by the
//!   client-supplied idempotency key
//!
//! Both services own their state behind a concurrent keyed map; each logical
//! operation (check-and-increment, check-then-store) is atomic per key, and
//! unrelated keys never contend on one global lock.

#![doc(html_root_url = "https://docs.rs/cerberus-admission/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod idempotency;
mod rate_limit;

pub use idempotency::IdempotencyStore;
pub use rate_limit::{KeySnapshot, RateDecision, RateLimiter, RateLimiterBuilder};
