//! Operation logging macros.
//!
//! Every event carries `component` (the calling module), `op` and `event`
//! (`start`, `end` or `end_error`); extra `key = value` fields pass through
//! to `tracing` unchanged, including `%` and `?` sigils.

#[doc(hidden)]
#[macro_export]
macro_rules! __log_op_event {
    ($level:ident, $op:expr, $event:expr $(, $($field:tt)*)?) => {
        tracing::$level!(
            component = module_path!(),
            op = $op,
            event = $event,
            $($($field)*)?
        )
    };
}

/// Log the start of an operation.
///
/// ```
/// # use changetrail_core::log_op_start;
/// log_op_start!("record_mutation");
/// log_op_start!("record_mutation", collection = "contracts", document_id = "c1");
/// ```
#[macro_export]
macro_rules! log_op_start {
    ($op:expr $(, $($field:tt)*)?) => {
        $crate::__log_op_event!(
            info,
            $op,
            changetrail_core_types::schema::EVENT_START
            $(, $($field)*)?
        )
    };
}

/// Log the successful end of an operation; `duration_ms` is required.
///
/// ```
/// # use changetrail_core::log_op_end;
/// log_op_end!("record_mutation", duration_ms = 3, outcome = "recorded");
/// ```
#[macro_export]
macro_rules! log_op_end {
    ($op:expr, duration_ms = $duration:expr $(, $($field:tt)*)?) => {
        $crate::__log_op_event!(
            info,
            $op,
            changetrail_core_types::schema::EVENT_END,
            duration_ms = $duration
            $(, $($field)*)?
        )
    };
}

/// Log a failed operation.
///
/// `$err` is anything convertible into [`ExError`](crate::errors::ExError);
/// its kind and stable code are logged as `err.kind` and `err.code`.
///
/// ```
/// # use changetrail_core::{log_op_error, errors::AuditError};
/// let err = AuditError::Internal { message: "boom".to_string() };
/// log_op_error!("record_mutation", err, duration_ms = 10, document_id = "c1");
/// ```
#[macro_export]
macro_rules! log_op_error {
    ($op:expr, $err:expr, duration_ms = $duration:expr $(, $($field:tt)*)?) => {{
        let ex_err: $crate::errors::ExError = $err.into();
        $crate::__log_op_event!(
            error,
            $op,
            changetrail_core_types::schema::EVENT_END_ERROR,
            duration_ms = $duration,
            err.kind = ?ex_err.kind(),
            err.code = ex_err.code()
            $(, $($field)*)?
        )
    }};
}
