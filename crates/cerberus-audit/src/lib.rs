//! # Cerberus Audit
//!
//! Process-wide accounting for the admission pipeline:
//!
//! - [`AuditRecorder`] - append-only log of every processed request,
//!   success or failure, with a filtered read path
//! - [`UsageMeter`] - per-user, per-model accounting of AI usage
//!
//! Both are optional sinks from the pipeline's point of view, but an
//! unaudited request is a correctness bug: the orchestrator appends exactly
//! one entry per completed run.

#![doc(html_root_url = "https://docs.rs/cerberus-audit/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod recorder;
mod usage;

pub use recorder::{AuditEntry, AuditQuery, AuditRecorder};
pub use usage::{UsageMeter, UsageStats};
