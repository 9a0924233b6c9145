//! The live, observable store graph.
//!
//! Plain data is wrapped once at store construction into explicit wrapper
//! types whose mutating methods stand in for property traps: each write or
//! delete resolves its event path, skips itself when nothing would change,
//! and otherwise hands the pending change to the store's interceptors and
//! listeners.
//!
//! Event paths are derived per field and cached. Fields of the root record
//! use their own key; everything below a named field inherits that field's
//! event. Arrays, maps and sets lock their path so nothing inside them ever
//! reports a deeper, per-element event.

mod array;
mod collections;
pub(crate) mod graph;
mod object;
mod snapshot;

pub use array::ObservedArray;
pub use collections::{ObservedMap, ObservedSet};
pub use object::ObservedObject;
pub(crate) use object::WeakObject;
pub use snapshot::unwrap;

use crate::types::Value;
use std::fmt;

/// Any location in the live graph.
#[derive(Clone)]
pub enum Observed {
    Scalar(Value),
    Array(ObservedArray),
    Object(ObservedObject),
    Map(ObservedMap),
    Set(ObservedSet),
}

impl Observed {
    pub fn as_scalar(&self) -> Option<&Value> {
        match self {
            Observed::Scalar(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&ObservedArray> {
        match self {
            Observed::Array(array) => Some(array),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&ObservedObject> {
        match self {
            Observed::Object(object) => Some(object),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&ObservedMap> {
        match self {
            Observed::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_set(&self) -> Option<&ObservedSet> {
        match self {
            Observed::Set(set) => Some(set),
            _ => None,
        }
    }

    /// Child addressed by one path segment: a record field, an array index,
    /// or a map entry keyed by the segment as a string or integer.
    pub fn child(&self, segment: &str) -> Option<Observed> {
        match self {
            Observed::Object(object) => object.get(segment),
            Observed::Array(array) => segment.parse().ok().and_then(|i| array.get(i)),
            Observed::Map(map) => map.get(&Value::from(segment)).or_else(|| {
                segment
                    .parse::<i64>()
                    .ok()
                    .and_then(|n| map.get(&Value::from(n)))
            }),
            Observed::Scalar(_) | Observed::Set(_) => None,
        }
    }

    /// Descend through `segments`.
    pub fn resolve<S: AsRef<str>>(&self, segments: &[S]) -> Option<Observed> {
        let mut current = self.clone();
        for segment in segments {
            current = current.child(segment.as_ref())?;
        }
        Some(current)
    }
}

impl fmt::Debug for Observed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Observed::Scalar(value) => f.debug_tuple("Scalar").field(value).finish(),
            Observed::Array(array) => fmt::Debug::fmt(array, f),
            Observed::Object(object) => fmt::Debug::fmt(object, f),
            Observed::Map(map) => fmt::Debug::fmt(map, f),
            Observed::Set(set) => fmt::Debug::fmt(set, f),
        }
    }
}
