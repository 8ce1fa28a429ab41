//! # Cerberus Pipeline
//!
//! The fixed-order admission pipeline.
//!
//! Every inbound request flows through six stages, in an order that is a
//! visible property of the processor rather than an artifact of nested
//! wrappers:
//!
//! ```text
//! Request → Correlation → Tenant → Authentication → RateLimit → Idempotency → Locale
//!                                                       │             │
//!                                                    rejected       replay
//!                                                       ↓             ↓
//!                                                  normalize      stored outcome
//!                                                   + audit       (no new audit)
//! ```
//!
//! | Stage | Purpose | Failure |
//! |-------|---------|---------|
//! | 1 Correlation    | Reuse or generate the correlation id  | none |
//! | 2 Tenant         | Resolve the organization              | `MissingTenant` |
//! | 3 Authentication | Bearer token → principal              | `Unauthenticated` |
//! | 4 RateLimit      | Sliding-window admission per client   | `RateLimitExceeded` |
//! | 5 Idempotency    | Replay short-circuit                  | none |
//! | 6 Locale         | Locale/timezone detection             | none |
//!
//! Each stage returns a `Result`: failure propagation is a first-class
//! value the [`RequestProcessor`] matches on, not an unwinding mechanism.
//! Every failure is normalized into the uniform error envelope and audited;
//! every success is audited and, when an idempotency key was present,
//! stored for replay.
//!
//! ## Example
//!
//! ```
//! use cerberus_core::fixtures::{admitted_request, learner_verifier};
//! use cerberus_pipeline::RequestProcessor;
//! use std::sync::Arc;
//!
//! # tokio_test::block_on(async {
//! let processor = RequestProcessor::builder()
//!     .verifier(Arc::new(learner_verifier()))
//!     .build();
//!
//! let outcome = processor.process(&admitted_request()).await;
//! assert!(outcome.is_success());
//! assert_eq!(outcome.context().unwrap().tenant_id, "org1");
//! # });
//! ```

#![doc(html_root_url = "https://docs.rs/cerberus-pipeline/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod normalize;
mod processor;
mod stage;
pub mod stages;

pub use normalize::ErrorNormalizer;
pub use processor::{RequestProcessor, RequestProcessorBuilder};
pub use stage::{Stage, StageFlow, StageKind};
