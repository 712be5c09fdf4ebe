//! Relationship-reference classification by value shape.
//!
//! A relationship field can be stored as a bare identifier (`"u1a2b3c4"`) or
//! as the populated record it points at (`{"id": "u1a2b3c4", "name": ..}`).
//! These helpers decide whether a value looks like such a reference, so that
//! the differ can compare identities instead of payloads.
//!
//! The generic token pattern (8+ chars of `[A-Za-z0-9_-]`) is deliberately
//! loose. Any long single-word string (a slug, a SKU, a hash) classifies as
//! an identifier. That is a known over-approximation, kept as-is.

use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

/// Field holding a populated record's identity.
pub const ID_FIELD: &str = "id";

fn identifier_patterns() -> &'static [Regex; 3] {
    static PATTERNS: OnceLock<[Regex; 3]> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            // Canonical 8-4-4-4-12 UUID
            Regex::new(
                r"^(?i)[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}$",
            )
            .expect("uuid pattern compiles"),
            // Legacy 24-hex object id
            Regex::new(r"^[0-9a-fA-F]{24}$").expect("object-id pattern compiles"),
            // Generic token
            Regex::new(r"^[A-Za-z0-9_-]{8,}$").expect("token pattern compiles"),
        ]
    })
}

/// True if `s` matches one of the identifier patterns.
pub fn is_identifier_str(s: &str) -> bool {
    identifier_patterns().iter().any(|re| re.is_match(s))
}

/// True if `value` is a string shaped like a record identifier.
pub fn looks_like_identifier(value: &Value) -> bool {
    value.as_str().is_some_and(is_identifier_str)
}

/// True if `value` is a keyed map carrying an `id` attribute.
pub fn has_id_attribute(value: &Value) -> bool {
    value
        .as_object()
        .is_some_and(|obj| obj.contains_key(ID_FIELD))
}

/// True if `value` is a single (non-sequence) reference: an identifier
/// string or a map with an `id`.
pub fn is_single_reference(value: &Value) -> bool {
    looks_like_identifier(value) || has_id_attribute(value)
}

/// True if `value` is a non-empty sequence of single references.
pub fn is_reference_array(value: &Value) -> bool {
    match value {
        Value::Array(items) => !items.is_empty() && items.iter().all(is_single_reference),
        _ => false,
    }
}

/// True if the value under `field_name` is shaped like a relationship.
///
/// A field literally named `id` is the record's own identity, not a link to
/// another record, and never classifies as a reference.
pub fn looks_like_reference(field_name: &str, value: &Value) -> bool {
    if field_name == ID_FIELD {
        return false;
    }
    is_single_reference(value) || is_reference_array(value)
}

/// Identifier carried by a single reference.
///
/// A string is its own identifier. A map yields its `id` attribute, with
/// numeric ids rendered in decimal. Anything else has no identifier.
pub fn extract_identifier(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Object(obj) => match obj.get(ID_FIELD)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        },
        _ => None,
    }
}

/// The populated/unpopulated no-op: one side is a bare identifier and the
/// other is a map whose `id` is that same identifier.
///
/// The bare side only has to equal the map's `id`; it is not held to the
/// identifier patterns, so short ids such as `"u1"` (and numeric ids)
/// collapse too.
pub fn is_populated_pair(a: &Value, b: &Value) -> bool {
    fn same(id: &Value, populated: &Value) -> bool {
        (id.is_string() || id.is_number())
            && populated
                .as_object()
                .and_then(|obj| obj.get(ID_FIELD))
                .is_some_and(|inner| inner == id)
    }
    same(a, b) || same(b, a)
}
