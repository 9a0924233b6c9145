//! Snapshot extraction: live graph back to plain data.
//!
//! Extraction never touches the live graph and always allocates a fresh
//! structure, so two snapshots taken back to back are equal but share
//! nothing. Comparison against plain data (`matches`) walks the graph the
//! same way without building a snapshot.

use super::{Observed, ObservedArray, ObservedMap, ObservedObject, ObservedSet};
use crate::equality::deep_equal;
use crate::types::Value;

/// Plain copy of any live value.
pub fn unwrap(observed: &Observed) -> Value {
    observed.to_value()
}

impl Observed {
    /// Plain copy of this value.
    pub fn to_value(&self) -> Value {
        match self {
            Observed::Scalar(value) => value.clone(),
            Observed::Array(array) => array.to_value(),
            Observed::Object(object) => object.to_value(),
            Observed::Map(map) => map.to_value(),
            Observed::Set(set) => set.to_value(),
        }
    }

    /// Deep equality against plain data.
    pub(crate) fn matches(&self, other: &Value) -> bool {
        match self {
            Observed::Scalar(value) => deep_equal(value, other),
            Observed::Array(array) => array.matches(other),
            Observed::Object(object) => object.matches(other),
            Observed::Map(map) => map.matches(other),
            Observed::Set(set) => set.matches(other),
        }
    }
}

impl ObservedObject {
    pub fn to_value(&self) -> Value {
        Value::Object(
            self.node
                .borrow()
                .fields
                .iter()
                .map(|(k, child)| (k.clone(), child.to_value()))
                .collect(),
        )
    }

    fn matches(&self, other: &Value) -> bool {
        let Value::Object(fields) = other else {
            return false;
        };
        let node = self.node.borrow();
        node.fields.len() == fields.len()
            && node
                .fields
                .iter()
                .all(|(k, child)| fields.get(k).is_some_and(|v| child.matches(v)))
    }
}

impl ObservedArray {
    pub fn to_value(&self) -> Value {
        Value::Array(self.node.borrow().items.iter().map(Observed::to_value).collect())
    }

    fn matches(&self, other: &Value) -> bool {
        let Value::Array(items) = other else {
            return false;
        };
        let node = self.node.borrow();
        node.items.len() == items.len()
            && node.items.iter().zip(items).all(|(child, v)| child.matches(v))
    }
}

impl ObservedMap {
    pub fn to_value(&self) -> Value {
        Value::Map(
            self.node
                .borrow()
                .entries
                .iter()
                .map(|(k, child)| (k.clone(), child.to_value()))
                .collect(),
        )
    }

    fn matches(&self, other: &Value) -> bool {
        let Value::Map(entries) = other else {
            return false;
        };
        let node = self.node.borrow();
        node.entries.len() == entries.len()
            && node.entries.iter().all(|(k, child)| {
                entries
                    .iter()
                    .any(|(k2, v)| deep_equal(k, k2) && child.matches(v))
            })
    }
}

impl ObservedSet {
    pub fn to_value(&self) -> Value {
        Value::Set(self.node.borrow().items.iter().map(Observed::to_value).collect())
    }

    fn matches(&self, other: &Value) -> bool {
        let Value::Set(items) = other else {
            return false;
        };
        let node = self.node.borrow();
        node.items.len() == items.len()
            && node
                .items
                .iter()
                .all(|child| items.iter().any(|v| child.matches(v)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hub::Hub;
    use crate::observable::graph::wrap;
    use crate::store::Validation;
    use serde_json::json;
    use std::rc::Rc;

    fn mixed() -> Value {
        let mut fields = std::collections::BTreeMap::new();
        fields.insert("list".to_string(), Value::from(json!([1, {"a": [true, null]}])));
        fields.insert(
            "lookup".to_string(),
            Value::map([(Value::from("x"), Value::from(json!({"n": 1}))), (Value::from(2), Value::set([1, 2]))]),
        );
        fields.insert("tags".to_string(), Value::set(["a", "b"]));
        fields.insert("name".to_string(), Value::from("store"));
        Value::Object(fields)
    }

    #[test]
    fn test_roundtrip_mixed_structure() {
        let hub = Rc::new(Hub::new(Validation::Strict));
        let original = mixed();
        let live = wrap(original.clone(), "", &hub, None);
        assert_eq!(unwrap(&live), original);
        assert!(live.matches(&original));
    }

    #[test]
    fn test_snapshot_is_detached() {
        let hub = Rc::new(Hub::new(Validation::Strict));
        let live = wrap(mixed(), "", &hub, None);
        let before = live.to_value();

        live.as_object().unwrap().set("name", "changed");
        assert_eq!(before.get("name"), Some(&Value::from("store")));
        assert_eq!(live.to_value().get("name"), Some(&Value::from("changed")));
    }

    #[test]
    fn test_matches_detects_differences() {
        let hub = Rc::new(Hub::new(Validation::Strict));
        let live = wrap(mixed(), "", &hub, None);
        let mut other = mixed();
        if let Value::Object(fields) = &mut other {
            fields.insert("tags".to_string(), Value::set(["a"]));
        }
        assert!(!live.matches(&other));
        assert!(!live.matches(&Value::Null));
    }
}
