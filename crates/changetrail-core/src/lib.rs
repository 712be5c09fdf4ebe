//! changetrail core - audit trail generation for document stores
//!
//! This crate decides what goes into an audit log when documents change:
//! - Identifier heuristics for relationship-shaped values
//! - A depth-bounded structural differ and the change formatter on top of it
//! - Request-scoped cascade tracking to suppress side-effect noise
//! - Hook layer wiring both to a pluggable audit sink
//!
//! The diff and cascade paths never fail; errors only arise from
//! configuration loading and sinks.

pub mod audit;
pub mod cascade;
pub mod config;
pub mod diff;
pub mod errors;
pub mod logging_facility;

// Re-export commonly used types
pub use audit::{
    AuditAction, AuditOutcome, AuditRecord, AuditSink, AuditTrail, MemoryAuditSink, MutationEvent,
};
pub use cascade::{AuditContext, CascadeState, CascadeTracker, RequestScope};
pub use config::{AuditConfig, CascadeConfig, ChangeFormatterConfig};
pub use diff::{format_changes, should_log_changes, ChangeSet, Delta, DocumentSnapshot};
pub use errors::{AuditError, ExError, ExErrorKind, Result};
pub use changetrail_core_types::RequestToken;
