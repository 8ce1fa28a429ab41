//! # Cerberus Core
//!
//! Core types and traits for the Cerberus admission pipeline.
//!
//! This crate provides the foundational types used throughout Cerberus:
//!
//! - [`RawRequest`] - Immutable inbound request (method, endpoint, headers, body)
//! - [`CorrelationId`] - UUID v7 correlation identifier
//! - [`Principal`] - Authenticated caller identity (user id + roles + tenant claim)
//! - [`AdmissionContext`] / [`RequestContext`] - Mutable pipeline context and its
//!   immutable, serializable result
//! - [`GateError`] / [`NormalizedError`] - Typed failures and the uniform error
//!   envelope every caller receives
//! - [`AdmissionOutcome`] - The success/failure envelope returned by the pipeline
//! - [`AuthVerifier`] - The opaque token-verification collaborator
//! - [`Clock`] - Injectable time source for deterministic window arithmetic

#![doc(html_root_url = "https://docs.rs/cerberus-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod context;
mod error;
pub mod fixtures;
mod identity;
mod outcome;
pub mod request;
mod time;

pub use context::{AdmissionContext, CorrelationId, RequestContext};
pub use error::{ErrorCategory, GateError, GateResult, NormalizedError};
pub use identity::{AuthVerifier, BoxFuture, Principal};
pub use outcome::{AcceptedRequest, AdmissionOutcome, RejectedRequest};
pub use request::RawRequest;
pub use time::{Clock, ManualClock, SystemClock};
