//! Change-set output types.
//!
//! All collections are `BTreeMap`s so serialized change sets are
//! deterministic. Every type serialises to the plain JSON shape stored in an
//! audit record's `changes` field.

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Field-name to value map for one record at one point in time.
pub type DocumentSnapshot = Map<String, Value>;

/// Outcome of comparing two values: `None` is "no change".
pub type DiffResult = Option<Delta>;

/// A non-empty difference between two values.
#[derive(Debug, Clone, PartialEq)]
pub enum Delta {
    /// The value was replaced wholesale; carries the new value
    Replaced(Value),
    /// The key no longer exists on the new side
    Removed,
    /// A relationship now points at a different record
    Reference { old: String, new: String },
    /// Per-key changes inside a keyed map
    Nested(BTreeMap<String, Delta>),
}

impl Delta {
    /// Replacement by a possibly-absent new value.
    pub fn replacing(new: Option<&Value>) -> Self {
        match new {
            Some(value) => Delta::Replaced(value.clone()),
            None => Delta::Removed,
        }
    }

    /// True for opaque replacements (including removal).
    pub fn is_replacement(&self) -> bool {
        matches!(self, Delta::Replaced(_) | Delta::Removed)
    }

    /// Nested per-key changes, if this delta descends into a map.
    pub fn nested(&self) -> Option<&BTreeMap<String, Delta>> {
        match self {
            Delta::Nested(changes) => Some(changes),
            _ => None,
        }
    }
}

impl Serialize for Delta {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Delta::Replaced(value) => value.serialize(serializer),
            Delta::Removed => serializer.serialize_none(),
            Delta::Reference { old, new } => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("old", old)?;
                map.serialize_entry("new", new)?;
                map.end()
            }
            Delta::Nested(changes) => changes.serialize(serializer),
        }
    }
}

/// Change record for one top-level field.
///
/// `old` is always the raw previous value (`None` if the field did not
/// exist); only `new` is reduced to a minimal delta.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldChange {
    pub old: Option<Value>,
    pub new: Delta,
}

/// What an audit record stores as its `changes`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ChangeSet {
    /// No previous state: the after-snapshot verbatim
    Created(DocumentSnapshot),
    /// Only the fields with a meaningful difference
    Updated(BTreeMap<String, FieldChange>),
}

impl ChangeSet {
    /// Number of top-level fields recorded.
    pub fn field_count(&self) -> usize {
        match self {
            ChangeSet::Created(snapshot) => snapshot.len(),
            ChangeSet::Updated(fields) => fields.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.field_count() == 0
    }

    /// Change record for `field`, for updates.
    pub fn field(&self, field: &str) -> Option<&FieldChange> {
        match self {
            ChangeSet::Updated(fields) => fields.get(field),
            ChangeSet::Created(_) => None,
        }
    }

    /// JSON form for persistence.
    pub fn to_value(&self) -> Value {
        match self {
            ChangeSet::Created(snapshot) => Value::Object(snapshot.clone()),
            ChangeSet::Updated(_) => serde_json::to_value(self).unwrap_or(Value::Null),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_delta_serialises_to_plain_json() {
        let mut nested = BTreeMap::new();
        nested.insert("city".to_string(), Delta::Replaced(json!("Oslo")));
        nested.insert("zip".to_string(), Delta::Removed);
        nested.insert(
            "owner".to_string(),
            Delta::Reference {
                old: "user-0001".to_string(),
                new: "user-0002".to_string(),
            },
        );

        let value = serde_json::to_value(Delta::Nested(nested)).unwrap();
        assert_eq!(
            value,
            json!({
                "city": "Oslo",
                "zip": null,
                "owner": {"old": "user-0001", "new": "user-0002"}
            })
        );
    }

    #[test]
    fn test_field_change_with_absent_old_serialises_null() {
        let change = FieldChange {
            old: None,
            new: Delta::Replaced(json!(3)),
        };
        assert_eq!(
            serde_json::to_value(change).unwrap(),
            json!({"old": null, "new": 3})
        );
    }

    #[test]
    fn test_created_change_set_is_the_snapshot() {
        let snapshot = json!({"title": "A", "n": 1})
            .as_object()
            .cloned()
            .unwrap();
        let set = ChangeSet::Created(snapshot);
        assert_eq!(set.field_count(), 2);
        assert_eq!(set.to_value(), json!({"title": "A", "n": 1}));
        assert!(set.field("title").is_none());
    }
}
