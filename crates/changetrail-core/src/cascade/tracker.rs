//! Request-scoped cascade registry.
//!
//! One [`AuditContext`] per in-flight request token. The tracker never
//! fails: a missing context or a poisoned lock degrades to "record it".

use crate::cascade::context::AuditContext;
use crate::config::CascadeConfig;
use changetrail_core_types::RequestToken;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Registry of tracking contexts keyed by request token.
///
/// Calls for the same token must be sequenced by the caller; calls for
/// different tokens are independent.
#[derive(Debug, Default)]
pub struct CascadeTracker {
    contexts: RwLock<HashMap<RequestToken, AuditContext>>,
}

impl CascadeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<RequestToken, AuditContext>> {
        self.contexts.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<RequestToken, AuditContext>> {
        self.contexts.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Allocate an unsourced context. An existing context is left as is.
    pub fn initialize_context(&self, token: &RequestToken) {
        self.write().entry(token.clone()).or_default();
        tracing::debug!(request_token = %token, "audit context initialized");
    }

    /// Record `collection/id` as the request's originating mutation.
    ///
    /// Creates the context if none exists yet.
    pub fn mark_direct(&self, token: &RequestToken, collection: &str, id: &str) {
        self.write()
            .entry(token.clone())
            .or_default()
            .set_source(collection, id);
        tracing::debug!(
            request_token = %token,
            collection,
            document_id = id,
            "marked direct mutation"
        );
    }

    /// Record `collection/id` as a side effect of the source mutation.
    ///
    /// Silently ignored when the token has no context.
    pub fn mark_cascading(&self, token: &RequestToken, collection: &str, id: &str) {
        let mut contexts = self.write();
        let Some(ctx) = contexts.get_mut(token) else {
            return;
        };
        ctx.push_cascade(collection, id);
        tracing::debug!(
            request_token = %token,
            collection,
            document_id = id,
            cascade_depth = ctx.cascade_depth(),
            "marked cascading mutation"
        );
    }

    /// Whether a mutation on `collection/id` should be recorded.
    ///
    /// 1. No context: `true` (fail open).
    /// 2. The recorded source: `true`, whatever the cascade settings.
    /// 3. Cascading disabled: `false`.
    /// 4. Otherwise `true` while the cascade depth is below the budget.
    pub fn should_log(
        &self,
        token: &RequestToken,
        collection: &str,
        id: &str,
        config: &CascadeConfig,
    ) -> bool {
        let contexts = self.read();
        let Some(ctx) = contexts.get(token) else {
            tracing::debug!(
                request_token = %token,
                collection,
                document_id = id,
                "no audit context for request, recording as direct"
            );
            return true;
        };

        if ctx.is_source(collection, id) {
            return true;
        }
        if !config.allow_cascading {
            tracing::debug!(
                request_token = %token,
                collection,
                document_id = id,
                "cascading mutation skipped"
            );
            return false;
        }

        let depth = ctx.cascade_depth();
        let decision = depth < config.max_depth();
        tracing::debug!(
            request_token = %token,
            collection,
            document_id = id,
            cascade_depth = depth,
            max_cascade_depth = config.max_depth(),
            decision,
            "cascade depth check"
        );
        decision
    }

    /// Drop the context for `token`. Idempotent.
    pub fn cleanup_context(&self, token: &RequestToken) {
        if self.write().remove(token).is_some() {
            tracing::debug!(request_token = %token, "audit context cleaned up");
        }
    }

    /// Snapshot of the context for `token`.
    pub fn context(&self, token: &RequestToken) -> Option<AuditContext> {
        self.read().get(token).cloned()
    }

    /// Number of live contexts.
    pub fn active_contexts(&self) -> usize {
        self.read().len()
    }

    /// Initialize the context and tie its cleanup to the returned guard.
    pub fn scope(&self, token: RequestToken) -> RequestScope<'_> {
        self.initialize_context(&token);
        RequestScope {
            tracker: self,
            token,
        }
    }
}

/// Guard owning one request's context; dropping it cleans the context up.
#[derive(Debug)]
#[must_use = "dropping the scope immediately removes the request's context"]
pub struct RequestScope<'a> {
    tracker: &'a CascadeTracker,
    token: RequestToken,
}

impl RequestScope<'_> {
    pub fn token(&self) -> &RequestToken {
        &self.token
    }
}

impl Drop for RequestScope<'_> {
    fn drop(&mut self) {
        self.tracker.cleanup_context(&self.token);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cascade::context::CascadeState;

    #[test]
    fn test_initialize_does_not_reset_existing_context() {
        let tracker = CascadeTracker::new();
        let token = RequestToken::from("req-1");

        tracker.mark_direct(&token, "contracts", "c1");
        tracker.initialize_context(&token);

        let ctx = tracker.context(&token).unwrap();
        assert_eq!(ctx.state(), CascadeState::Sourced);
    }

    #[test]
    fn test_mark_cascading_without_context_is_noop() {
        let tracker = CascadeTracker::new();
        let token = RequestToken::from("req-2");

        tracker.mark_cascading(&token, "clients", "cl1");

        assert!(tracker.context(&token).is_none());
        assert_eq!(tracker.active_contexts(), 0);
    }

    #[test]
    fn test_cleanup_is_idempotent() {
        let tracker = CascadeTracker::new();
        let token = RequestToken::from("req-3");

        tracker.initialize_context(&token);
        tracker.cleanup_context(&token);
        tracker.cleanup_context(&token);

        assert_eq!(tracker.active_contexts(), 0);
    }

    #[test]
    fn test_poisoned_lock_is_recovered() {
        let tracker = std::sync::Arc::new(CascadeTracker::new());
        let token = RequestToken::from("req-4");
        tracker.initialize_context(&token);

        let poisoner = std::sync::Arc::clone(&tracker);
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.contexts.write().unwrap();
            panic!("poison the registry");
        })
        .join();

        assert!(tracker.contexts.is_poisoned());
        tracker.mark_direct(&token, "contracts", "c1");
        assert!(tracker.should_log(&token, "contracts", "c1", &CascadeConfig::disabled()));
    }
}
