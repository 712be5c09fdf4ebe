//! Logging for the audit pipeline.
//!
//! The host installs a subscriber once with [`init`]. The tracker logs its
//! decisions at `debug`; the hooks wrap each mutation in
//! `log_op_start!`/`log_op_end!` and report sink failures with
//! `log_op_error!`. Tests use [`init_test_capture`] instead of [`init`].
//!
//! ```rust
//! use changetrail_core::logging_facility::{init, Profile};
//!
//! init(Profile::Development);
//! ```

pub mod init;
pub mod macros;
pub mod test_capture;

pub use init::{init, Profile};
pub use test_capture::{init_test_capture, CapturedEvent, TestCapture};
