//! Log field keys and event names
//!
//! Shared by the logging macros, the test capture layer and the audit
//! hooks, so producers and assertions agree on spelling.

// Emitted by every operation event
pub const FIELD_COMPONENT: &str = "component";
pub const FIELD_OP: &str = "op";
pub const FIELD_EVENT: &str = "event";
pub const FIELD_DURATION_MS: &str = "duration_ms";

// Mutation context
pub const FIELD_REQUEST_TOKEN: &str = "request_token";
pub const FIELD_COLLECTION: &str = "collection";
pub const FIELD_DOCUMENT_ID: &str = "document_id";
pub const FIELD_OUTCOME: &str = "outcome";

// Error events
pub const FIELD_ERR_KIND: &str = "err.kind";
pub const FIELD_ERR_CODE: &str = "err.code";

pub const EVENT_START: &str = "start";
pub const EVENT_END: &str = "end";
pub const EVENT_END_ERROR: &str = "end_error";
