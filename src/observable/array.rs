//! Array wrapper. Arrays lock their event path: every change to the array
//! and to anything nested in it dispatches the array's own event.

use super::graph::wrap;
use super::Observed;
use crate::hub::Hub;
use crate::interception::{Change, KeyShape, MutationSite};
use crate::types::{Key, Operation, Value};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use tracing::{trace, warn};

pub(super) struct ArrayNode {
    pub(super) items: Vec<Observed>,
    event: String,
}

/// Live array in the store graph.
///
/// Writes address existing slots or the slot just past the end. An
/// interceptor that overrides the key of a write redirects it to the new
/// index; the element at the old index stays in place.
#[derive(Clone)]
pub struct ObservedArray {
    pub(super) node: Rc<RefCell<ArrayNode>>,
    hub: Rc<Hub>,
}

impl ObservedArray {
    pub(crate) fn build(items: Vec<Value>, event: &str, hub: &Rc<Hub>) -> Self {
        let items = items
            .into_iter()
            .map(|item| wrap(item, event, hub, Some(event)))
            .collect();
        Self {
            node: Rc::new(RefCell::new(ArrayNode {
                items,
                event: event.to_string(),
            })),
            hub: Rc::clone(hub),
        }
    }

    /// The locked event path.
    pub fn event(&self) -> String {
        self.node.borrow().event.clone()
    }

    pub fn get(&self, index: usize) -> Option<Observed> {
        self.node.borrow().items.get(index).cloned()
    }

    pub fn value(&self, index: usize) -> Option<Value> {
        self.node.borrow().items.get(index).map(Observed::to_value)
    }

    pub fn len(&self) -> usize {
        self.node.borrow().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.node.borrow().items.is_empty()
    }

    /// Write `value` at `index`; `index == len()` appends. Writes further
    /// past the end are ignored, as are deep-equal writes.
    pub fn set(&self, index: usize, value: impl Into<Value>) {
        let value = value.into();
        let len = self.len();
        if index > len {
            warn!(event = %self.event(), index, len, "array write past the end; ignored");
            return;
        }
        let unchanged = self
            .node
            .borrow()
            .items
            .get(index)
            .is_some_and(|current| current.matches(&value));
        if unchanged {
            trace!(index, "write equals current value; skipped");
            return;
        }
        let event = self.event();
        self.hub
            .mutate(&event, Change::set(Key::Index(index), value), self);
    }

    /// Append `value`.
    pub fn push(&self, value: impl Into<Value>) {
        let index = self.len();
        let event = self.event();
        self.hub
            .mutate(&event, Change::set(Key::Index(index), value.into()), self);
    }

    /// Request removal of the last element and return its snapshot.
    /// Returns `None` without dispatching when the array is empty.
    pub fn pop(&self) -> Option<Value> {
        let last = self.len().checked_sub(1)?;
        self.remove(last)
    }

    /// Request removal of the element at `index`, shifting later elements
    /// down, and return its snapshot. Out-of-range indices are a no-op.
    pub fn remove(&self, index: usize) -> Option<Value> {
        let removed = self.value(index)?;
        let event = self.event();
        self.hub
            .mutate(&event, Change::delete(Key::Index(index)), self);
        Some(removed)
    }

    /// Remove every element.
    pub fn clear(&self) {
        let event = self.event();
        self.hub.mutate(&event, Change::clear(), self);
    }
}

impl MutationSite for ObservedArray {
    fn prior_state(&self) -> Value {
        self.to_value()
    }

    fn key_shape(&self) -> KeyShape {
        KeyShape::Index
    }

    fn commit(&self, change: Change) {
        let event = self.event();
        if change.operation == Operation::Clear {
            self.node.borrow_mut().items.clear();
        } else {
            let Some(index) = change.key.as_ref().and_then(Key::to_index) else {
                warn!(event = %event, "array change without an index; ignored");
                return;
            };
            match change.value {
                Some(value) => {
                    let len = self.len();
                    if index > len {
                        warn!(event = %event, index, len, "array write past the end; ignored");
                        return;
                    }
                    let child = wrap(value, &event, &self.hub, Some(&event));
                    let mut node = self.node.borrow_mut();
                    if index < len {
                        node.items[index] = child;
                    } else {
                        node.items.push(child);
                    }
                }
                None => {
                    let mut node = self.node.borrow_mut();
                    if index < node.items.len() {
                        node.items.remove(index);
                    }
                }
            }
        }
        trace!(event = %event, operation = ?change.operation, "array change committed");
        self.hub.dispatch(&event);
    }
}

impl fmt::Debug for ObservedArray {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObservedArray")
            .field("event", &self.event())
            .field("value", &self.to_value())
            .finish()
    }
}
