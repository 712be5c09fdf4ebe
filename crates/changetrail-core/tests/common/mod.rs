use changetrail_core::DocumentSnapshot;
use changetrail_core_types::RequestToken;
use serde_json::Value;

/// Snapshot from a `json!` object literal
#[allow(dead_code)]
pub fn doc(value: Value) -> DocumentSnapshot {
    value
        .as_object()
        .cloned()
        .expect("test snapshot must be a JSON object")
}

/// Fresh request token, unique per call
#[allow(dead_code)]
pub fn fresh_token() -> RequestToken {
    RequestToken::new()
}

/// Replay `(collection, id)` mutations through `decide`, returning which
/// ones were recorded
#[allow(dead_code)]
pub fn replay<F>(mutations: &[(&str, &str)], mut decide: F) -> Vec<String>
where
    F: FnMut(&str, &str) -> bool,
{
    mutations
        .iter()
        .filter(|(collection, id)| decide(collection, id))
        .map(|(collection, id)| format!("{}/{}", collection, id))
        .collect()
}
