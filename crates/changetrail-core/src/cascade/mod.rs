//! Cascade tracking.
//!
//! A single user action often triggers side-effect writes on related
//! documents. The tracker remembers, per request, which mutation came first
//! (the source) and how many followed it, so the hooks can decide whether a
//! side effect deserves its own audit record.
//!
//! The first mutation seen in a request is always treated as the source.
//! Any later mutation in the same request counts as cascading, even when it
//! is logically independent.

pub mod context;
pub mod tracker;

pub use context::{operation_tag, AuditContext, CascadeState};
pub use tracker::{CascadeTracker, RequestScope};
