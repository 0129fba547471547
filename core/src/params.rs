//! Query parameter flattening and encoding.
//!
//! WooCommerce accepts nested filters in bracket form (`meta[key]=color`).
//! Callers hand over a JSON object; `flatten_params` expands one level of
//! nesting into bracketed keys and leaves anything deeper as an opaque value.

use serde_json::{Map, Value};

/// Ordered parameter map, as accepted by every client call.
pub type Params = Map<String, Value>;

/// Expand object-valued parameters one level deep into `key[subkey]` entries.
///
/// Scalars and arrays keep their original key. Objects nested below the first
/// level are not expanded: they stay objects under the bracketed key and are
/// later rendered as JSON text by [`query_pairs`].
pub fn flatten_params(params: &Params) -> Params {
    let mut flat = Params::new();
    for (key, value) in params {
        match value {
            Value::Object(nested) => {
                for (subkey, subvalue) in nested {
                    flat.insert(format!("{key}[{subkey}]"), subvalue.clone());
                }
            }
            other => {
                flat.insert(key.clone(), other.clone());
            }
        }
    }
    flat
}

/// Render a query mapping as ordered string pairs for the wire.
///
/// Strings are used verbatim, numbers and booleans through their JSON text,
/// `null` entries are skipped, array items repeat the key with a `[]` suffix,
/// and objects become JSON text.
pub fn query_pairs(query: &Params) -> Vec<(String, String)> {
    let mut pairs = Vec::with_capacity(query.len());
    for (key, value) in query {
        match value {
            Value::Array(items) => {
                let key = format!("{key}[]");
                pairs.extend(
                    items
                        .iter()
                        .filter_map(scalar_text)
                        .map(|text| (key.clone(), text)),
                );
            }
            other => {
                if let Some(text) = scalar_text(other) {
                    pairs.push((key.clone(), text));
                }
            }
        }
    }
    pairs
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        Value::Bool(_) | Value::Number(_) | Value::Array(_) | Value::Object(_) => {
            Some(value.to_string())
        }
    }
}
