//! Recursive structural differ.
//!
//! Compares a new value against an old one and reduces the difference to a
//! [`Delta`], or `None` when nothing meaningful changed. Relationship-shaped
//! values are compared by identity, so a reference that was merely populated
//! (or re-ordered, for reference arrays) is not a change.
//!
//! ## Depth budgets
//!
//! - `max_depth`: at `depth > max_depth` the differ stops descending and
//!   reports any difference as an opaque replacement of that subtree.
//! - `equality_max_depth`: recursion cap of the equality pre-check run at
//!   every visited level (see [`crate::diff::equality`]).

use crate::config::ChangeFormatterConfig;
use crate::diff::equality::values_equal;
use crate::diff::identifier::{
    extract_identifier, is_populated_pair, is_single_reference, looks_like_reference,
};
use crate::diff::model::{Delta, DiffResult};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};

/// Differ bound to one set of exclusion and depth rules.
#[derive(Debug, Clone, Copy)]
pub struct StructuralDiffer<'a> {
    exclude_fields: &'a BTreeSet<String>,
    max_depth: usize,
    equality_max_depth: usize,
}

impl<'a> StructuralDiffer<'a> {
    pub fn new(
        exclude_fields: &'a BTreeSet<String>,
        max_depth: usize,
        equality_max_depth: usize,
    ) -> Self {
        Self {
            exclude_fields,
            max_depth,
            equality_max_depth,
        }
    }

    pub fn from_config(config: &'a ChangeFormatterConfig) -> Self {
        Self::new(
            &config.exclude_fields,
            config.max_depth,
            config.equality_max_depth,
        )
    }

    /// Diff `new` against `old` at nesting level `depth`.
    ///
    /// `None` on either side means the value is absent (a missing key),
    /// which is distinct from JSON `null`.
    pub fn diff(&self, new: Option<&Value>, old: Option<&Value>, depth: usize) -> DiffResult {
        // Past the depth budget: whole-subtree comparison only
        if depth > self.max_depth {
            return if new == old {
                None
            } else {
                Some(Delta::replacing(new))
            };
        }

        if values_equal(new, old, self.equality_max_depth) {
            return None;
        }

        // No partial diff across a null boundary
        let (new_value, old_value) = match (new, old) {
            (Some(n), Some(o)) if !n.is_null() && !o.is_null() => (n, o),
            _ => return Some(Delta::replacing(new)),
        };

        match (new_value, old_value) {
            (Value::Array(new_items), Value::Array(old_items)) => {
                self.diff_sequences(new_value, new_items, old_items, depth)
            }
            (Value::Array(_), _) | (_, Value::Array(_)) => {
                Some(Delta::Replaced(new_value.clone()))
            }
            (Value::Object(new_map), Value::Object(old_map)) => {
                self.diff_maps(new_map, old_map, depth)
            }
            _ => Some(Delta::Replaced(new_value.clone())),
        }
    }

    fn diff_sequences(
        &self,
        new_value: &Value,
        new_items: &[Value],
        old_items: &[Value],
        depth: usize,
    ) -> DiffResult {
        if new_items.len() != old_items.len() {
            return Some(Delta::Replaced(new_value.clone()));
        }

        // Relationship arrays: same set of ids means same relationships
        if !new_items.is_empty()
            && new_items.iter().all(is_single_reference)
            && old_items.iter().all(is_single_reference)
            && identifier_set(new_items) == identifier_set(old_items)
        {
            return None;
        }

        let any_changed = new_items
            .iter()
            .zip(old_items)
            .any(|(n, o)| self.diff(Some(n), Some(o), depth + 1).is_some());

        any_changed.then(|| Delta::Replaced(new_value.clone()))
    }

    fn diff_maps(
        &self,
        new_map: &Map<String, Value>,
        old_map: &Map<String, Value>,
        depth: usize,
    ) -> DiffResult {
        let keys: BTreeSet<&String> = new_map.keys().chain(old_map.keys()).collect();
        let mut changes: BTreeMap<String, Delta> = BTreeMap::new();

        for key in keys {
            if self.exclude_fields.contains(key.as_str()) {
                continue;
            }
            let new_value = new_map.get(key);
            let old_value = old_map.get(key);

            if let (Some(n), Some(o)) = (new_value, old_value) {
                if is_populated_pair(n, o) {
                    continue;
                }
                if let Some((new_id, old_id)) = reference_identifiers(key, n, o) {
                    if new_id != old_id {
                        changes.insert(
                            key.clone(),
                            Delta::Reference {
                                old: old_id,
                                new: new_id,
                            },
                        );
                    }
                    continue;
                }
            }

            if let Some(delta) = self.diff(new_value, old_value, depth + 1) {
                changes.insert(key.clone(), delta);
            }
        }

        (!changes.is_empty()).then_some(Delta::Nested(changes))
    }
}

/// `(new_id, old_id)` when `key` holds a single relationship on both sides.
///
/// Sequences are left to the sequence rules; a side with no extractable
/// identifier falls back to ordinary recursion.
fn reference_identifiers(key: &str, new: &Value, old: &Value) -> Option<(String, String)> {
    if new.is_array() || old.is_array() {
        return None;
    }
    if !looks_like_reference(key, new) && !looks_like_reference(key, old) {
        return None;
    }
    Some((extract_identifier(new)?, extract_identifier(old)?))
}

fn identifier_set(items: &[Value]) -> BTreeSet<String> {
    items.iter().filter_map(extract_identifier).collect()
}
