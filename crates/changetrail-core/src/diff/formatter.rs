//! Document-level change formatting.
//!
//! [`format_changes`] is the entry point the audit hooks call for every
//! mutation: it applies the exclusion list, diffs each top-level field and
//! assembles the [`ChangeSet`], or reports that nothing is worth recording.

use crate::config::ChangeFormatterConfig;
use crate::diff::equality::values_equal;
use crate::diff::identifier::is_populated_pair;
use crate::diff::model::{ChangeSet, Delta, DocumentSnapshot, FieldChange};
use crate::diff::structural::StructuralDiffer;
use std::collections::{BTreeMap, BTreeSet};

/// Default threshold for [`should_log_changes`].
pub const DEFAULT_MIN_CHANGES: usize = 1;

/// Reduce a before/after pair to the fields that meaningfully changed.
///
/// - No `before`: a creation, returned as [`ChangeSet::Created`] verbatim.
/// - Otherwise each top-level field outside `exclude_fields` is compared,
///   skipping populated-vs-bare relationship no-ops. The recorded `old` is
///   always the raw previous value.
///
/// Returns `None` when no field changed.
pub fn format_changes(
    after: &DocumentSnapshot,
    before: Option<&DocumentSnapshot>,
    config: &ChangeFormatterConfig,
) -> Option<ChangeSet> {
    let Some(before) = before else {
        return Some(ChangeSet::Created(after.clone()));
    };

    let differ = StructuralDiffer::from_config(config);
    let keys: BTreeSet<&String> = before.keys().chain(after.keys()).collect();
    let mut fields: BTreeMap<String, FieldChange> = BTreeMap::new();

    for key in keys {
        if config.exclude_fields.contains(key.as_str()) {
            continue;
        }
        let old = before.get(key);
        let new = after.get(key);

        if let (Some(o), Some(n)) = (old, new) {
            if is_populated_pair(o, n) {
                continue;
            }
        }

        let delta = if config.meaningful_changes_only {
            differ.diff(new, old, 0)
        } else if values_equal(new, old, config.equality_max_depth) {
            None
        } else {
            Some(Delta::replacing(new))
        };

        if let Some(delta) = delta {
            fields.insert(
                key.clone(),
                FieldChange {
                    old: old.cloned(),
                    new: delta,
                },
            );
        }
    }

    tracing::trace!(changed_fields = fields.len(), "formatted change set");

    (!fields.is_empty()).then_some(ChangeSet::Updated(fields))
}

/// True iff there is a change set with at least `min_changes` fields.
pub fn should_log_changes(change_set: Option<&ChangeSet>, min_changes: usize) -> bool {
    change_set.is_some_and(|set| set.field_count() >= min_changes)
}
