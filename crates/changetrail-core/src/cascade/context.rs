//! Per-request cascade bookkeeping.

use serde::{Deserialize, Serialize};

/// Where a request's context sits in the cascade state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CascadeState {
    /// Allocated at request start; no mutation seen yet
    Unsourced,
    /// The originating (direct) mutation has been recorded
    Sourced,
    /// `n` side-effect mutations observed after the source
    Cascading(usize),
}

/// Tracking context for one logical request.
///
/// The first mutation marked direct becomes the source; every mutation
/// marked cascading afterwards is pushed onto `operation_stack` as
/// `"collection:id"`, whose length is the cascade depth.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditContext {
    pub source_collection: Option<String>,
    pub source_document_id: Option<String>,
    pub is_direct_operation: bool,
    pub operation_stack: Vec<String>,
}

impl AuditContext {
    /// Context with no source yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Context whose source is `collection/id`.
    pub fn sourced(collection: &str, id: &str) -> Self {
        let mut ctx = Self::new();
        ctx.set_source(collection, id);
        ctx
    }

    pub fn set_source(&mut self, collection: &str, id: &str) {
        self.source_collection = Some(collection.to_string());
        self.source_document_id = Some(id.to_string());
        self.is_direct_operation = true;
    }

    pub fn push_cascade(&mut self, collection: &str, id: &str) {
        self.is_direct_operation = false;
        self.operation_stack.push(operation_tag(collection, id));
    }

    pub fn has_source(&self) -> bool {
        self.source_collection.is_some() && self.source_document_id.is_some()
    }

    /// True if `collection/id` is the recorded source mutation.
    pub fn is_source(&self, collection: &str, id: &str) -> bool {
        self.source_collection.as_deref() == Some(collection)
            && self.source_document_id.as_deref() == Some(id)
    }

    /// Number of cascading mutations observed so far.
    pub fn cascade_depth(&self) -> usize {
        self.operation_stack.len()
    }

    pub fn state(&self) -> CascadeState {
        if !self.has_source() {
            CascadeState::Unsourced
        } else if self.operation_stack.is_empty() {
            CascadeState::Sourced
        } else {
            CascadeState::Cascading(self.operation_stack.len())
        }
    }
}

/// Stack entry for one observed mutation.
pub fn operation_tag(collection: &str, id: &str) -> String {
    format!("{}:{}", collection, id)
}
