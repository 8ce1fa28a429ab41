//! # Cerberus Authz
//!
//! Object-level authorization for admitted requests.
//!
//! The admission pipeline authenticates; it does not decide what an
//! authenticated principal may touch. That is this crate's
//! [`PermissionGate`]: a capability callers invoke after admission for the
//! endpoints that need an object-level check, delegating the actual decision
//! to an opaque [`PermissionChecker`].
//!
//! The vocabulary is typed end to end: [`PermissionAction`] and
//! [`ResourceKind`] are shared between the gate and its checker, so there is
//! no stringly-typed dispatch to drift out of sync.

#![doc(html_root_url = "https://docs.rs/cerberus-authz/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod action;
mod checker;
mod gate;

pub use action::{PermissionAction, ResourceKind};
pub use checker::{PermissionChecker, StaticPermissionChecker, StaticPermissionCheckerBuilder};
pub use gate::PermissionGate;
