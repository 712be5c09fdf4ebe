//! Depth-capped structural equality.
//!
//! Sequences compare element-wise and keyed maps by key set and values.
//! Recursion stops at `max_depth`, past which the remaining subtrees are
//! compared with full `Value` equality. That gives the same answer as
//! comparing canonical serialized forms, since maps are key-sorted.
//!
//! This cap is independent of the differ's own `max_depth`. The differ calls
//! this at every level it visits, so the two budgets nest: the outer depth
//! decides where per-key diffing stops, the inner one only bounds this walk.

use serde_json::Value;

/// Structural equality of two present values, recursing at most `max_depth`
/// levels before falling back to full equality.
pub fn deep_equal(a: &Value, b: &Value, max_depth: usize) -> bool {
    equal_at(a, b, 0, max_depth)
}

/// Equality over possibly-absent values. Absent equals only absent; an
/// absent value never equals an explicit `null`.
pub fn values_equal(a: Option<&Value>, b: Option<&Value>, max_depth: usize) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => deep_equal(a, b, max_depth),
        _ => false,
    }
}

fn equal_at(a: &Value, b: &Value, depth: usize, max_depth: usize) -> bool {
    if depth > max_depth {
        return a == b;
    }
    match (a, b) {
        (Value::Array(xs), Value::Array(ys)) => {
            xs.len() == ys.len()
                && xs
                    .iter()
                    .zip(ys)
                    .all(|(x, y)| equal_at(x, y, depth + 1, max_depth))
        }
        (Value::Object(xs), Value::Object(ys)) => {
            xs.len() == ys.len()
                && xs.iter().all(|(key, x)| {
                    ys.get(key)
                        .is_some_and(|y| equal_at(x, y, depth + 1, max_depth))
                })
        }
        _ => a == b,
    }
}
