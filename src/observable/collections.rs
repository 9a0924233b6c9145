//! Observable dictionary-like and set-like collections.
//!
//! Each collection is bound to one event for its whole lifetime: every
//! mutation inside it dispatches that event, never a per-entry path.
//! Collections are hydrated with dispatch suppressed and switched live by
//! [`ObservedMap::end`] / [`ObservedSet::end`].

use super::graph::wrap;
use super::Observed;
use crate::equality::deep_equal;
use crate::hub::Hub;
use crate::interception::{Change, KeyShape, MutationSite};
use crate::types::{Key, Operation, Value};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use tracing::{trace, warn};

pub(super) struct MapNode {
    pub(super) entries: Vec<(Value, Observed)>,
    event: String,
    initializing: bool,
}

impl MapNode {
    fn position(&self, key: &Value) -> Option<usize> {
        self.entries.iter().position(|(k, _)| deep_equal(k, key))
    }
}

/// Live dictionary-like collection in the store graph.
#[derive(Clone)]
pub struct ObservedMap {
    pub(super) node: Rc<RefCell<MapNode>>,
    hub: Rc<Hub>,
}

impl ObservedMap {
    /// Empty map in its initializing state.
    pub(crate) fn new(event: &str, hub: &Rc<Hub>) -> Self {
        Self {
            node: Rc::new(RefCell::new(MapNode {
                entries: Vec::new(),
                event: event.to_string(),
                initializing: true,
            })),
            hub: Rc::clone(hub),
        }
    }

    /// Finish hydration; later operations intercept and dispatch.
    pub(crate) fn end(&self) {
        self.node.borrow_mut().initializing = false;
    }

    pub fn event(&self) -> String {
        self.node.borrow().event.clone()
    }

    pub fn get(&self, key: &Value) -> Option<Observed> {
        let node = self.node.borrow();
        node.position(key).map(|i| node.entries[i].1.clone())
    }

    pub fn value(&self, key: &Value) -> Option<Value> {
        let node = self.node.borrow();
        node.position(key).map(|i| node.entries[i].1.to_value())
    }

    pub fn contains_key(&self, key: &Value) -> bool {
        self.node.borrow().position(key).is_some()
    }

    pub fn keys(&self) -> Vec<Value> {
        self.node.borrow().entries.iter().map(|(k, _)| k.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.node.borrow().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.node.borrow().entries.is_empty()
    }

    /// Associate `value` with `key`. Skipped when the key already holds a
    /// deep-equal value.
    pub fn set(&self, key: impl Into<Value>, value: impl Into<Value>) {
        let key = key.into();
        let value = value.into();
        if self.node.borrow().initializing {
            self.store(key, value, None);
            return;
        }
        let unchanged = {
            let node = self.node.borrow();
            node.position(&key)
                .is_some_and(|i| node.entries[i].1.matches(&value))
        };
        if unchanged {
            trace!(key = %key, "map entry equals current value; skipped");
            return;
        }
        let event = self.event();
        self.hub.mutate(&event, Change::set(Key::Entry(key), value), self);
    }

    /// Remove `key`. Dispatches even when the key is absent.
    pub fn delete(&self, key: impl Into<Value>) {
        let event = self.event();
        self.hub
            .mutate(&event, Change::delete(Key::Entry(key.into())), self);
    }

    /// Remove every entry.
    pub fn clear(&self) {
        let event = self.event();
        self.hub.mutate(&event, Change::clear(), self);
    }

    fn store(&self, key: Value, value: Value, moved_from: Option<&Value>) {
        let event = self.event();
        let child = wrap(value, &event, &self.hub, Some(&event));
        let mut node = self.node.borrow_mut();
        if let Some(from) = moved_from {
            node.entries.retain(|(k, _)| !deep_equal(k, from));
        }
        match node.position(&key) {
            Some(i) => node.entries[i].1 = child,
            None => node.entries.push((key, child)),
        }
    }
}

impl MutationSite for ObservedMap {
    fn prior_state(&self) -> Value {
        self.to_value()
    }

    fn key_shape(&self) -> KeyShape {
        KeyShape::Entry
    }

    fn commit(&self, change: Change) {
        let event = self.event();
        match (change.operation, change.key, change.value) {
            (Operation::Clear, _, _) => self.node.borrow_mut().entries.clear(),
            (_, Some(key), Some(value)) => {
                let from = change.moved_from.as_ref().map(Key::to_entry);
                self.store(key.to_entry(), value, from.as_ref());
            }
            (_, Some(key), None) => {
                let key = key.to_entry();
                self.node
                    .borrow_mut()
                    .entries
                    .retain(|(k, _)| !deep_equal(k, &key));
            }
            (operation, None, _) => {
                warn!(event = %event, ?operation, "map change without a key; ignored");
                return;
            }
        }
        trace!(event = %event, operation = ?change.operation, "map change committed");
        self.hub.dispatch(&event);
    }
}

impl fmt::Debug for ObservedMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObservedMap")
            .field("event", &self.event())
            .field("value", &self.to_value())
            .finish()
    }
}

pub(super) struct SetNode {
    pub(super) items: Vec<Observed>,
    event: String,
    initializing: bool,
}

impl SetNode {
    fn position(&self, element: &Value) -> Option<usize> {
        self.items.iter().position(|item| item.matches(element))
    }
}

/// Live set-like collection in the store graph.
#[derive(Clone)]
pub struct ObservedSet {
    pub(super) node: Rc<RefCell<SetNode>>,
    hub: Rc<Hub>,
}

impl ObservedSet {
    /// Empty set in its initializing state.
    pub(crate) fn new(event: &str, hub: &Rc<Hub>) -> Self {
        Self {
            node: Rc::new(RefCell::new(SetNode {
                items: Vec::new(),
                event: event.to_string(),
                initializing: true,
            })),
            hub: Rc::clone(hub),
        }
    }

    /// Finish hydration; later operations intercept and dispatch.
    pub(crate) fn end(&self) {
        self.node.borrow_mut().initializing = false;
    }

    pub fn event(&self) -> String {
        self.node.borrow().event.clone()
    }

    pub fn contains(&self, element: &Value) -> bool {
        self.node.borrow().position(element).is_some()
    }

    /// Plain snapshots of the elements in insertion order.
    pub fn values(&self) -> Vec<Value> {
        self.node.borrow().items.iter().map(Observed::to_value).collect()
    }

    pub fn len(&self) -> usize {
        self.node.borrow().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.node.borrow().items.is_empty()
    }

    /// Insert `element`. Skipped when an equal element is already a member.
    pub fn add(&self, element: impl Into<Value>) {
        let element = element.into();
        if self.contains(&element) {
            trace!(element = %element, "set already holds element; skipped");
            return;
        }
        if self.node.borrow().initializing {
            self.insert(element);
            return;
        }
        let event = self.event();
        self.hub.mutate(&event, Change::add(element), self);
    }

    /// Remove `element`. Dispatches even when it is not a member.
    pub fn delete(&self, element: impl Into<Value>) {
        let event = self.event();
        self.hub
            .mutate(&event, Change::remove_element(element.into()), self);
    }

    /// Remove every element.
    pub fn clear(&self) {
        let event = self.event();
        self.hub.mutate(&event, Change::clear(), self);
    }

    fn insert(&self, element: Value) {
        if self.contains(&element) {
            return;
        }
        let event = self.event();
        let child = wrap(element, &event, &self.hub, Some(&event));
        self.node.borrow_mut().items.push(child);
    }
}

impl MutationSite for ObservedSet {
    fn prior_state(&self) -> Value {
        self.to_value()
    }

    fn key_shape(&self) -> KeyShape {
        KeyShape::Unkeyed
    }

    fn commit(&self, change: Change) {
        let event = self.event();
        match (change.operation, change.value) {
            (Operation::Clear, _) => self.node.borrow_mut().items.clear(),
            (Operation::Delete, Some(element)) => {
                let mut node = self.node.borrow_mut();
                if let Some(i) = node.position(&element) {
                    node.items.remove(i);
                }
            }
            (_, Some(element)) => self.insert(element),
            (operation, None) => {
                warn!(event = %event, ?operation, "set change without an element; ignored");
                return;
            }
        }
        trace!(event = %event, operation = ?change.operation, "set change committed");
        self.hub.dispatch(&event);
    }
}

impl fmt::Debug for ObservedSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObservedSet")
            .field("event", &self.event())
            .field("value", &self.to_value())
            .finish()
    }
}
