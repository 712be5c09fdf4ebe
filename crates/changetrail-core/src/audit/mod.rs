//! Audit hook layer: turns document writes into persisted audit records.

pub mod hooks;
pub mod record;
pub mod sink;

pub use hooks::{AuditOutcome, AuditTrail};
pub use record::{AuditAction, AuditRecord, MutationEvent};
pub use sink::{AuditSink, MemoryAuditSink};
