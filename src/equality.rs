//! Deep structural equality.
//!
//! A mutation only costs interception and dispatch when it is proven to
//! change something, and this is the proof. Records compare field-wise
//! regardless of order, maps compare entry-wise by key, sets compare by
//! membership. Numbers compare by value, so `5` equals `5.0`.

use crate::types::Value;
use serde_json::Number;

/// Structural equality over the whole value tree.
pub fn deep_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::Number(x), Value::Number(y)) => numbers_equal(x, y),
        (Value::String(x), Value::String(y)) => x == y,
        (Value::Array(x), Value::Array(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(l, r)| deep_equal(l, r))
        }
        (Value::Object(x), Value::Object(y)) => {
            x.len() == y.len()
                && x
                    .iter()
                    .all(|(k, v)| y.get(k).is_some_and(|w| deep_equal(v, w)))
        }
        (Value::Map(x), Value::Map(y)) => {
            x.len() == y.len()
                && x.iter().all(|(k, v)| {
                    y.iter()
                        .any(|(k2, v2)| deep_equal(k, k2) && deep_equal(v, v2))
                })
        }
        // Elements are unique on both sides, so containment plus equal length
        // is equality.
        (Value::Set(x), Value::Set(y)) => {
            x.len() == y.len() && x.iter().all(|e| contains(y, e))
        }
        _ => false,
    }
}

/// Membership test by deep equality.
pub fn contains(items: &[Value], needle: &Value) -> bool {
    items.iter().any(|item| deep_equal(item, needle))
}

/// Position of the entry whose key deep-equals `key`.
pub fn entry_position(entries: &[(Value, Value)], key: &Value) -> Option<usize> {
    entries.iter().position(|(k, _)| deep_equal(k, key))
}

/// Integers compare exactly; a float on either side compares by `f64`.
fn numbers_equal(x: &Number, y: &Number) -> bool {
    if x.is_f64() || y.is_f64() {
        return match (x.as_f64(), y.as_f64()) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        };
    }
    match (x.as_i64(), y.as_i64()) {
        (Some(a), Some(b)) => a == b,
        // At least one side is above i64::MAX.
        _ => x.as_u64().is_some() && x.as_u64() == y.as_u64(),
    }
}
