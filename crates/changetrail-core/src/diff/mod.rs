//! Document change detection.
//!
//! Turns a before/after pair of document snapshots into the minimal set of
//! changes worth putting in an audit record.
//!
//! ## Entry point
//!
//! ```
//! use changetrail_core::config::ChangeFormatterConfig;
//! use changetrail_core::diff::format_changes;
//! use serde_json::json;
//!
//! let before = json!({"name": "John", "hash": "h1"}).as_object().cloned().unwrap();
//! let after = json!({"name": "Jane", "hash": "h2"}).as_object().cloned().unwrap();
//!
//! let config = ChangeFormatterConfig::excluding(["hash"]);
//! let changes = format_changes(&after, Some(&before), &config).unwrap();
//! assert_eq!(
//!     changes.to_value(),
//!     json!({"name": {"old": "John", "new": "Jane"}})
//! );
//! ```
//!
//! ## Guarantees
//!
//! - **Idempotence**: a document compared with itself yields no change set.
//! - **Exclusion**: excluded fields never appear, at any nesting level.
//! - **Relationship collapse**: a bare id versus the populated record with
//!   that id is not a change.
//! - **Depth cutoff**: changes below `max_depth` surface as one opaque
//!   replacement of the containing subtree.

pub mod equality;
pub mod formatter;
pub mod identifier;
pub mod model;
pub mod structural;

pub use formatter::{format_changes, should_log_changes, DEFAULT_MIN_CHANGES};
pub use model::{ChangeSet, Delta, DiffResult, DocumentSnapshot, FieldChange};
pub use structural::StructuralDiffer;
