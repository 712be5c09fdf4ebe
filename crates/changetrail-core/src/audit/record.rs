//! Mutation events in, audit records out.

use crate::diff::DocumentSnapshot;
use changetrail_core_types::RequestToken;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Kind of document write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditAction {
    Create,
    Update,
    Delete,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::Create => "create",
            AuditAction::Update => "update",
            AuditAction::Delete => "delete",
        }
    }
}

impl std::fmt::Display for AuditAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One document write as seen by the host's mutation hook.
///
/// For deletes, `after` carries the removed document.
#[derive(Debug, Clone, PartialEq)]
pub struct MutationEvent {
    pub action: AuditAction,
    pub before: Option<DocumentSnapshot>,
    pub after: DocumentSnapshot,
    pub collection: String,
    pub document_id: String,
    pub request_token: RequestToken,
    pub user: Option<String>,
}

impl MutationEvent {
    pub fn create(
        token: RequestToken,
        collection: impl Into<String>,
        document_id: impl Into<String>,
        after: DocumentSnapshot,
    ) -> Self {
        Self {
            action: AuditAction::Create,
            before: None,
            after,
            collection: collection.into(),
            document_id: document_id.into(),
            request_token: token,
            user: None,
        }
    }

    pub fn update(
        token: RequestToken,
        collection: impl Into<String>,
        document_id: impl Into<String>,
        before: DocumentSnapshot,
        after: DocumentSnapshot,
    ) -> Self {
        Self {
            action: AuditAction::Update,
            before: Some(before),
            ..Self::create(token, collection, document_id, after)
        }
    }

    pub fn delete(
        token: RequestToken,
        collection: impl Into<String>,
        document_id: impl Into<String>,
        removed: DocumentSnapshot,
    ) -> Self {
        Self {
            action: AuditAction::Delete,
            ..Self::create(token, collection, document_id, removed)
        }
    }

    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }
}

/// Persisted audit entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditRecord {
    pub collection: String,
    pub action: AuditAction,
    pub document_id: String,
    pub timestamp: DateTime<Utc>,
    pub user: Option<String>,
    /// Raw snapshot for create/delete, the change set for update
    pub changes: Value,
}
