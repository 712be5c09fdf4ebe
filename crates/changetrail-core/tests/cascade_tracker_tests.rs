#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use changetrail_core::audit::{AuditTrail, MemoryAuditSink};
use changetrail_core::cascade::{CascadeState, CascadeTracker};
use changetrail_core::config::{AuditConfig, CascadeConfig};
use changetrail_core_types::RequestToken;
use common::{fresh_token, replay};
use std::sync::Arc;

const CONTRACT_FLOW: [(&str, &str); 4] = [
    ("contracts", "c1"),
    ("clients", "cl1"),
    ("users", "u1"),
    ("invoices", "i1"),
];

fn trail_with(cascade: CascadeConfig) -> AuditTrail<MemoryAuditSink> {
    AuditTrail::new(
        AuditConfig {
            cascade,
            ..AuditConfig::default()
        },
        MemoryAuditSink::new(),
    )
}

#[test]
fn test_scenario_c_cascading_disabled_logs_only_the_source() {
    let trail = trail_with(CascadeConfig::disabled());
    let token = fresh_token();
    let _scope = trail.begin_request(token.clone());

    let logged = replay(&CONTRACT_FLOW[..3], |collection, id| {
        trail.classify(&token, collection, id)
    });

    assert_eq!(logged, vec!["contracts/c1"]);
}

#[test]
fn test_scenario_d_budget_of_two_logs_two_side_effects() {
    let trail = trail_with(CascadeConfig::allowing(2));
    let token = fresh_token();
    let _scope = trail.begin_request(token.clone());

    let logged = replay(&CONTRACT_FLOW, |collection, id| {
        trail.classify(&token, collection, id)
    });

    // Source plus two cascades; the third cascade is over budget
    assert_eq!(logged, vec!["contracts/c1", "clients/cl1", "users/u1"]);
}

#[test]
fn test_depth_boundary_nth_logs_and_next_does_not() {
    for budget in 1..=4usize {
        let trail = trail_with(CascadeConfig::allowing(budget));
        let token = fresh_token();
        let _scope = trail.begin_request(token.clone());

        assert!(trail.classify(&token, "orders", "o1"));
        for n in 1..=budget {
            assert!(
                trail.classify(&token, "lines", &format!("l{}", n)),
                "cascade {} of {} should log",
                n,
                budget
            );
        }
        assert!(
            !trail.classify(&token, "lines", "overflow"),
            "cascade {} should not log with budget {}",
            budget + 1,
            budget
        );
    }
}

#[test]
fn test_unset_budget_defaults_to_one_cascade() {
    let trail = trail_with(CascadeConfig {
        allow_cascading: true,
        max_cascade_depth: None,
    });
    let token = fresh_token();
    let _scope = trail.begin_request(token.clone());

    let logged = replay(&CONTRACT_FLOW, |collection, id| {
        trail.classify(&token, collection, id)
    });

    assert_eq!(logged, vec!["contracts/c1", "clients/cl1"]);
}

#[test]
fn test_source_always_logs_regardless_of_settings() {
    for config in [
        CascadeConfig::disabled(),
        CascadeConfig::allowing(0),
        CascadeConfig::allowing(1),
    ] {
        let tracker = CascadeTracker::new();
        let token = fresh_token();

        tracker.initialize_context(&token);
        tracker.mark_direct(&token, "contracts", "c1");
        tracker.mark_cascading(&token, "clients", "cl1");
        tracker.mark_cascading(&token, "users", "u1");

        assert!(tracker.should_log(&token, "contracts", "c1", &config));
    }
}

#[test]
fn test_repeat_writes_to_the_source_do_not_grow_the_stack() {
    let trail = trail_with(CascadeConfig::allowing(1));
    let token = fresh_token();
    let _scope = trail.begin_request(token.clone());

    assert!(trail.classify(&token, "contracts", "c1"));
    assert!(trail.classify(&token, "contracts", "c1"));
    assert!(trail.classify(&token, "contracts", "c1"));

    let ctx = trail.tracker().context(&token).unwrap();
    assert_eq!(ctx.state(), CascadeState::Sourced);
}

#[test]
fn test_later_independent_mutation_counts_as_cascading() {
    // Only the first mutation is treated as user intent
    let trail = trail_with(CascadeConfig::disabled());
    let token = fresh_token();
    let _scope = trail.begin_request(token.clone());

    assert!(trail.classify(&token, "contracts", "c1"));
    assert!(!trail.classify(&token, "contracts", "c2"));

    let ctx = trail.tracker().context(&token).unwrap();
    assert_eq!(ctx.operation_stack, vec!["contracts:c2".to_string()]);
    assert!(!ctx.is_direct_operation);
}

#[test]
fn test_missing_context_fails_open() {
    let tracker = CascadeTracker::new();
    let token = RequestToken::from("never-initialized");

    assert!(tracker.should_log(&token, "clients", "cl1", &CascadeConfig::disabled()));
}

#[test]
fn test_mark_direct_creates_a_context() {
    let tracker = CascadeTracker::new();
    let token = fresh_token();

    tracker.mark_direct(&token, "contracts", "c1");

    let ctx = tracker.context(&token).unwrap();
    assert_eq!(ctx.state(), CascadeState::Sourced);
    assert_eq!(ctx.source_collection.as_deref(), Some("contracts"));
    assert_eq!(ctx.source_document_id.as_deref(), Some("c1"));
}

#[test]
fn test_state_machine_walk() {
    let tracker = CascadeTracker::new();
    let token = fresh_token();
    assert!(tracker.context(&token).is_none());

    tracker.initialize_context(&token);
    assert_eq!(tracker.context(&token).unwrap().state(), CascadeState::Unsourced);

    tracker.mark_direct(&token, "contracts", "c1");
    assert_eq!(tracker.context(&token).unwrap().state(), CascadeState::Sourced);

    tracker.mark_cascading(&token, "clients", "cl1");
    tracker.mark_cascading(&token, "users", "u1");
    let ctx = tracker.context(&token).unwrap();
    assert_eq!(ctx.state(), CascadeState::Cascading(2));
    assert_eq!(
        ctx.operation_stack,
        vec!["clients:cl1".to_string(), "users:u1".to_string()]
    );

    tracker.cleanup_context(&token);
    assert!(tracker.context(&token).is_none());
}

#[test]
fn test_request_scope_drop_removes_context() {
    let tracker = CascadeTracker::new();
    let token = fresh_token();

    {
        let scope = tracker.scope(token.clone());
        assert_eq!(scope.token(), &token);
        assert_eq!(tracker.active_contexts(), 1);
    }

    assert_eq!(tracker.active_contexts(), 0);
}

#[test]
fn test_request_scope_cleans_up_on_early_return() {
    fn reject_write() -> Result<(), String> {
        Err("write rejected".to_string())
    }

    fn handle(tracker: &CascadeTracker, token: RequestToken) -> Result<(), String> {
        let _scope = tracker.scope(token.clone());
        tracker.mark_direct(&token, "contracts", "c1");
        reject_write()?;
        Ok(())
    }

    let tracker = CascadeTracker::new();
    assert!(handle(&tracker, fresh_token()).is_err());
    assert_eq!(tracker.active_contexts(), 0);
}

#[test]
fn test_request_scope_cleans_up_on_panic() {
    let tracker = Arc::new(CascadeTracker::new());
    let worker = Arc::clone(&tracker);

    let result = std::thread::spawn(move || {
        let _scope = worker.scope(fresh_token());
        panic!("handler crashed");
    })
    .join();

    assert!(result.is_err());
    assert_eq!(tracker.active_contexts(), 0);
}

#[test]
fn test_contexts_for_different_tokens_are_independent() {
    let tracker = Arc::new(CascadeTracker::new());
    let config = CascadeConfig::allowing(1);

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let tracker = Arc::clone(&tracker);
            std::thread::spawn(move || {
                let token = RequestToken::from_string(format!("req-{}", i));
                let _scope = tracker.scope(token.clone());
                tracker.mark_direct(&token, "contracts", &format!("c{}", i));

                let first = tracker.should_log(&token, "clients", "cl", &config);
                tracker.mark_cascading(&token, "clients", "cl");
                let second = tracker.should_log(&token, "users", "u", &config);
                (first, second)
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), (true, false));
    }
    assert_eq!(tracker.active_contexts(), 0);
}
