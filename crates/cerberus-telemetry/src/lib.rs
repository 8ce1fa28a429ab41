//! # Cerberus Telemetry
//!
//! Structured logging for the admission pipeline.
//!
//! Every Cerberus crate emits `tracing` events; this crate owns the
//! subscriber setup. Heavier observability (metrics pipelines, distributed
//! tracing exporters) is an external collaborator of the admission core and
//! lives with the host process, not here.

#![doc(html_root_url = "https://docs.rs/cerberus-telemetry/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
mod logging;

pub use error::TelemetryError;
pub use logging::{init_logging, LogConfig};

/// Result type alias using [`TelemetryError`].
pub type TelemetryResult<T> = Result<T, TelemetryError>;
