//! Observable graph builder: turns plain data into live wrappers.

use super::{Observed, ObservedArray, ObservedMap, ObservedObject, ObservedSet};
use crate::hub::Hub;
use crate::types::Value;
use std::rc::Rc;

/// Wrap `value` so that mutations inside it report `event`.
///
/// Scalars pass through. Arrays lock their path to `event`. Maps and sets
/// are bound to `event` and hydrated without dispatching. Records derive a
/// per-field event (see [`ObservedObject`]) unless `locked` is set, in which
/// case every field inherits the locked event.
pub(crate) fn wrap(value: Value, event: &str, hub: &Rc<Hub>, locked: Option<&str>) -> Observed {
    match value {
        Value::Array(items) => Observed::Array(ObservedArray::build(items, event, hub)),
        Value::Object(fields) => {
            Observed::Object(ObservedObject::build(fields, event, hub, locked))
        }
        Value::Map(entries) => {
            let map = ObservedMap::new(event, hub);
            for (key, value) in entries {
                map.set(key, value);
            }
            map.end();
            Observed::Map(map)
        }
        Value::Set(items) => {
            let set = ObservedSet::new(event, hub);
            for item in items {
                set.add(item);
            }
            set.end();
            Observed::Set(set)
        }
        scalar => Observed::Scalar(scalar),
    }
}
