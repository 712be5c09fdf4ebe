//! Mutation hook entry points.
//!
//! [`AuditTrail`] ties the change formatter and the cascade tracker to a
//! sink. The host calls [`AuditTrail::begin_request`] once per logical
//! request and [`AuditTrail::record`] after every document write.

use crate::audit::record::{AuditAction, AuditRecord, MutationEvent};
use crate::audit::sink::AuditSink;
use crate::cascade::{CascadeTracker, RequestScope};
use crate::config::AuditConfig;
use crate::diff::{format_changes, should_log_changes};
use crate::errors::ExError;
use crate::{log_op_end, log_op_error, log_op_start};
use changetrail_core_types::RequestToken;
use chrono::Utc;
use serde_json::Value;
use std::time::Instant;

/// Result of handling one mutation.
#[derive(Debug, Clone)]
pub enum AuditOutcome {
    /// The record was built and persisted
    Recorded(AuditRecord),
    /// A side effect beyond the cascade budget
    SkippedCascade,
    /// An update with too few meaningful changes
    NoChanges,
    /// The sink failed; the document write is unaffected
    SinkFailed(ExError),
}

impl AuditOutcome {
    pub fn is_recorded(&self) -> bool {
        matches!(self, AuditOutcome::Recorded(_))
    }

    pub fn record(&self) -> Option<&AuditRecord> {
        match self {
            AuditOutcome::Recorded(record) => Some(record),
            _ => None,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            AuditOutcome::Recorded(_) => "recorded",
            AuditOutcome::SkippedCascade => "skipped_cascade",
            AuditOutcome::NoChanges => "no_changes",
            AuditOutcome::SinkFailed(_) => "sink_failed",
        }
    }
}

/// Audit hook layer for one host.
pub struct AuditTrail<S: AuditSink> {
    config: AuditConfig,
    tracker: CascadeTracker,
    sink: S,
}

impl<S: AuditSink> AuditTrail<S> {
    pub fn new(config: AuditConfig, sink: S) -> Self {
        Self {
            config,
            tracker: CascadeTracker::new(),
            sink,
        }
    }

    pub fn config(&self) -> &AuditConfig {
        &self.config
    }

    pub fn tracker(&self) -> &CascadeTracker {
        &self.tracker
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Start tracking a request; the context lives until the scope drops.
    pub fn begin_request(&self, token: RequestToken) -> RequestScope<'_> {
        self.tracker.scope(token)
    }

    /// Cascade decision for one mutation, updating the request's context.
    ///
    /// The first mutation of a request becomes its source. Every other
    /// document is judged against the depth reached *before* it, then
    /// pushed onto the stack, so a budget of `N` records `N` side effects.
    pub fn classify(&self, token: &RequestToken, collection: &str, id: &str) -> bool {
        let Some(ctx) = self.tracker.context(token) else {
            tracing::debug!(
                request_token = %token,
                collection,
                document_id = id,
                "no audit context for request, recording as direct"
            );
            return true;
        };

        if !ctx.has_source() {
            self.tracker.mark_direct(token, collection, id);
            return true;
        }
        if ctx.is_source(collection, id) {
            return true;
        }

        let decision = self
            .tracker
            .should_log(token, collection, id, &self.config.cascade);
        self.tracker.mark_cascading(token, collection, id);
        decision
    }

    /// Handle one document write.
    ///
    /// Never fails: a sink error is logged and returned as
    /// [`AuditOutcome::SinkFailed`].
    pub fn record(&self, event: &MutationEvent) -> AuditOutcome {
        log_op_start!(
            "record_mutation",
            collection = %event.collection,
            document_id = %event.document_id,
            action = event.action.as_str()
        );
        let start = Instant::now();

        let outcome = self.record_impl(event);

        match &outcome {
            AuditOutcome::SinkFailed(err) => {
                log_op_error!(
                    "record_mutation",
                    err.clone(),
                    duration_ms = start.elapsed().as_millis() as u64,
                    collection = %event.collection,
                    document_id = %event.document_id
                );
            }
            other => {
                log_op_end!(
                    "record_mutation",
                    duration_ms = start.elapsed().as_millis() as u64,
                    outcome = other.label()
                );
            }
        }

        outcome
    }

    fn record_impl(&self, event: &MutationEvent) -> AuditOutcome {
        if !self.classify(&event.request_token, &event.collection, &event.document_id) {
            return AuditOutcome::SkippedCascade;
        }

        let Some(changes) = self.changes_for(event) else {
            return AuditOutcome::NoChanges;
        };

        let record = AuditRecord {
            collection: event.collection.clone(),
            action: event.action,
            document_id: event.document_id.clone(),
            timestamp: Utc::now(),
            user: event.user.clone(),
            changes,
        };

        match self.sink.persist(&record) {
            Ok(()) => AuditOutcome::Recorded(record),
            Err(err) => AuditOutcome::SinkFailed(
                err.with_collection(&event.collection)
                    .with_document_id(&event.document_id)
                    .with_request_token(event.request_token.clone()),
            ),
        }
    }

    // `None` when an update carries nothing worth recording
    fn changes_for(&self, event: &MutationEvent) -> Option<Value> {
        match event.action {
            AuditAction::Create => {
                format_changes(&event.after, None, &self.config.formatter).map(|set| set.to_value())
            }
            AuditAction::Update => {
                let set = format_changes(
                    &event.after,
                    event.before.as_ref(),
                    &self.config.formatter,
                );
                if !should_log_changes(set.as_ref(), self.config.min_changes) {
                    return None;
                }
                set.map(|set| set.to_value())
            }
            AuditAction::Delete => Some(Value::Object(event.after.clone())),
        }
    }
}
