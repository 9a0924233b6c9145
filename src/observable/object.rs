//! Record wrapper: field writes and deletes go through the store's hub.

use super::graph::wrap;
use super::Observed;
use crate::hub::Hub;
use crate::interception::{Change, KeyShape, MutationSite};
use crate::types::{Key, Value};
use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::rc::{Rc, Weak};
use tracing::{trace, warn};

pub(super) struct ObjectNode {
    pub(super) fields: BTreeMap<String, Observed>,
    /// Event path per field, derived once and reused on every write.
    events: HashMap<String, String>,
    event: String,
    locked: Option<String>,
}

/// Live record in the store graph.
#[derive(Clone)]
pub struct ObservedObject {
    pub(super) node: Rc<RefCell<ObjectNode>>,
    hub: Rc<Hub>,
}

impl ObservedObject {
    /// Wrap `fields`. Unless `locked`, a field's event is `event` when that is
    /// non-empty and the field name otherwise; a locked record hands its
    /// locked event to every field.
    pub(crate) fn build(
        fields: BTreeMap<String, Value>,
        event: &str,
        hub: &Rc<Hub>,
        locked: Option<&str>,
    ) -> Self {
        let mut events = HashMap::with_capacity(fields.len());
        let mut children = BTreeMap::new();
        for (key, value) in fields {
            let child_event = child_event(event, locked, &key);
            children.insert(key.clone(), wrap(value, &child_event, hub, locked));
            events.insert(key, child_event);
        }

        Self {
            node: Rc::new(RefCell::new(ObjectNode {
                fields: children,
                events,
                event: event.to_string(),
                locked: locked.map(str::to_string),
            })),
            hub: Rc::clone(hub),
        }
    }

    /// Event path this record was bound to.
    pub fn event(&self) -> String {
        self.node.borrow().event.clone()
    }

    /// Live child at `key`.
    pub fn get(&self, key: &str) -> Option<Observed> {
        self.node.borrow().fields.get(key).cloned()
    }

    /// Plain snapshot of the child at `key`.
    pub fn value(&self, key: &str) -> Option<Value> {
        self.node.borrow().fields.get(key).map(Observed::to_value)
    }

    pub fn keys(&self) -> Vec<String> {
        self.node.borrow().fields.keys().cloned().collect()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.node.borrow().fields.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.node.borrow().fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.node.borrow().fields.is_empty()
    }

    /// Write `value` at `key`.
    ///
    /// A value deep-equal to the current one is a no-op: no interceptor
    /// runs and nothing is dispatched.
    pub fn set(&self, key: impl Into<String>, value: impl Into<Value>) {
        let key = key.into();
        let value = value.into();
        let unchanged = self
            .node
            .borrow()
            .fields
            .get(&key)
            .is_some_and(|current| current.matches(&value));
        if unchanged {
            trace!(key = %key, "write equals current value; skipped");
            return;
        }
        let event = self.resolve_event(&key);
        self.hub.mutate(&event, Change::set(Key::Field(key), value), self);
    }

    /// Remove `key`. Always routed, even when the key is absent.
    pub fn delete(&self, key: &str) {
        let event = self.resolve_event(key);
        self.hub
            .mutate(&event, Change::delete(Key::Field(key.to_string())), self);
    }

    pub(crate) fn downgrade(&self) -> WeakObject {
        WeakObject {
            node: Rc::downgrade(&self.node),
            hub: Rc::downgrade(&self.hub),
        }
    }

    /// Cached event for `key`, deriving and caching it for keys added after
    /// construction.
    fn resolve_event(&self, key: &str) -> String {
        let mut node = self.node.borrow_mut();
        if let Some(event) = node.events.get(key) {
            return event.clone();
        }
        let event = child_event(&node.event, node.locked.as_deref(), key);
        node.events.insert(key.to_string(), event.clone());
        event
    }
}

fn child_event(event: &str, locked: Option<&str>, key: &str) -> String {
    match locked {
        Some(locked) => locked.to_string(),
        None if event.is_empty() => key.to_string(),
        None => event.to_string(),
    }
}

impl MutationSite for ObservedObject {
    fn prior_state(&self) -> Value {
        self.to_value()
    }

    fn key_shape(&self) -> KeyShape {
        KeyShape::Field
    }

    fn commit(&self, change: Change) {
        let Some(key) = change.key.as_ref().and_then(Key::to_field) else {
            warn!(event = %self.event(), "record change without a field name; ignored");
            return;
        };

        let mut events: Vec<String> = Vec::with_capacity(2);
        if change.value.is_some() {
            if let Some(from) = change.moved_from.as_ref().and_then(Key::to_field) {
                if from != key {
                    let from_event = self.resolve_event(&from);
                    self.node.borrow_mut().fields.remove(&from);
                    events.push(from_event);
                }
            }
        }

        let event = self.resolve_event(&key);
        match change.value {
            Some(value) => {
                let locked = self.node.borrow().locked.clone();
                let child = wrap(value, &event, &self.hub, locked.as_deref());
                self.node.borrow_mut().fields.insert(key, child);
            }
            None => {
                self.node.borrow_mut().fields.remove(&key);
            }
        }
        trace!(event = %event, operation = ?change.operation, "record change committed");

        if !events.contains(&event) {
            events.push(event);
        }
        for event in &events {
            self.hub.dispatch(event);
        }
    }
}

impl fmt::Debug for ObservedObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObservedObject")
            .field("event", &self.event())
            .field("value", &self.to_value())
            .finish()
    }
}

/// Non-owning handle used by callbacks that live inside the hub.
#[derive(Clone)]
pub(crate) struct WeakObject {
    node: Weak<RefCell<ObjectNode>>,
    hub: Weak<Hub>,
}

impl WeakObject {
    pub(crate) fn upgrade(&self) -> Option<ObservedObject> {
        Some(ObservedObject {
            node: self.node.upgrade()?,
            hub: self.hub.upgrade()?,
        })
    }
}
