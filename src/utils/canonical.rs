// src/utils/canonical.rs
//! Deterministic JSON rendering for signing input.
//!
//! Signature suites hash documents before signing, so the byte form has to
//! be stable across serialization order. Object members are emitted in
//! lexicographic key order; arrays keep their order; scalars use their
//! standard JSON encoding.
//!
//! This is intentionally not a JSON-LD canonicalization. The mediator signs
//! documents it assembled itself, with a known vocabulary.

use serde_json::Value;

/// Renders a JSON value with all object keys sorted lexicographically.
///
/// # Arguments
/// * `value` - The document (or fragment) to render
///
/// # Returns
/// A canonical string form suitable for hashing.
pub fn canonical_json(value: &Value) -> String {
    let mut out = String::new();
    write_value(value, &mut out);
    out
}

fn write_value(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            out.push('{');
            for (i, key) in keys.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                // Keys are plain strings; reuse the scalar encoder.
                write_value(&Value::String((*key).clone()), out);
                out.push(':');
                write_value(&map[key.as_str()], out);
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_value(item, out);
            }
            out.push(']');
        }
        scalar => {
            // Scalars serialize identically regardless of surrounding order.
            out.push_str(&serde_json::to_string(scalar).expect("scalar serialization"));
        }
    }
}
