//! Interception context handed to interceptors.

use crate::error::{Result, StoreError};
use crate::subscriptions::{Callback, CallbackId};
use crate::types::{Key, Operation, Value};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use tracing::warn;

/// A callback that decides whether and how a pending mutation commits.
#[derive(Clone)]
pub struct Interceptor {
    callback: Rc<dyn Fn(&Interception<'_>)>,
}

impl Interceptor {
    pub fn new(callback: impl Fn(&Interception<'_>) + 'static) -> Self {
        Self {
            callback: Rc::new(callback),
        }
    }

    pub fn id(&self) -> CallbackId {
        CallbackId::of(&self.callback)
    }

    pub(crate) fn invoke(&self, ctx: &Interception<'_>) {
        (self.callback)(ctx)
    }
}

impl Callback for Interceptor {
    fn id(&self) -> CallbackId {
        Interceptor::id(self)
    }
}

impl fmt::Debug for Interceptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Interceptor").field(&self.id()).finish()
    }
}

/// Read-only description of the pending mutation.
#[derive(Clone, Debug, PartialEq)]
pub struct Intercepted {
    /// Event path the mutation will dispatch on.
    pub event: String,
    pub operation: Operation,
    /// Key being written or removed. `None` for set-like adds/deletes and clears.
    pub key: Option<Key>,
    /// Incoming value. `None` for keyed deletes and clears; the element for
    /// set-like adds and deletes.
    pub value: Option<Value>,
    /// Plain snapshot of the container being mutated, before the change.
    pub state: Value,
}

/// A pending change as committed against its container.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Change {
    pub(crate) operation: Operation,
    pub(crate) key: Option<Key>,
    pub(crate) value: Option<Value>,
    /// Original key when an interceptor moved the write elsewhere.
    pub(crate) moved_from: Option<Key>,
}

impl Change {
    pub(crate) fn set(key: Key, value: Value) -> Self {
        Self {
            operation: Operation::Set,
            key: Some(key),
            value: Some(value),
            moved_from: None,
        }
    }

    pub(crate) fn delete(key: Key) -> Self {
        Self {
            operation: Operation::Delete,
            key: Some(key),
            value: None,
            moved_from: None,
        }
    }

    pub(crate) fn add(element: Value) -> Self {
        Self {
            operation: Operation::Add,
            key: None,
            value: Some(element),
            moved_from: None,
        }
    }

    pub(crate) fn remove_element(element: Value) -> Self {
        Self {
            operation: Operation::Delete,
            key: None,
            value: Some(element),
            moved_from: None,
        }
    }

    pub(crate) fn clear() -> Self {
        Self {
            operation: Operation::Clear,
            key: None,
            value: None,
            moved_from: None,
        }
    }
}

/// The decision an interceptor made.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Resolution {
    Allow,
    Reject,
    Value(Value),
    Key(Key),
    KeyAndValue(Key, Value),
}

impl Resolution {
    /// Rewrite `change` according to this decision. `Reject` is handled by
    /// the chain and never reaches here.
    pub(crate) fn apply(self, mut change: Change) -> Change {
        match self {
            Resolution::Allow | Resolution::Reject => change,
            Resolution::Value(value) => {
                with_value(&mut change, value);
                change
            }
            Resolution::Key(key) => {
                with_key(&mut change, key);
                change
            }
            Resolution::KeyAndValue(key, value) => {
                with_key(&mut change, key);
                with_value(&mut change, value);
                change
            }
        }
    }
}

fn with_value(change: &mut Change, value: Value) {
    // A keyed delete that receives a value becomes a write of that value.
    if change.operation == Operation::Delete && change.value.is_none() {
        change.operation = Operation::Set;
    }
    change.value = Some(value);
}

fn with_key(change: &mut Change, key: Key) {
    if change.key.as_ref() != Some(&key) {
        change.moved_from = change.key.take();
    }
    change.key = Some(key);
}

/// How keys address a mutation site.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum KeyShape {
    /// Set-likes: elements, not keys.
    Unkeyed,
    /// Records: string field names.
    Field,
    /// Arrays: positions.
    Index,
    /// Maps: any value.
    Entry,
}

impl KeyShape {
    pub(crate) fn accepts(self, key: &Key) -> bool {
        match self {
            KeyShape::Unkeyed => false,
            KeyShape::Field => key.to_field().is_some(),
            KeyShape::Index => key.to_index().is_some(),
            KeyShape::Entry => true,
        }
    }
}

/// Context passed to an interceptor for one pending mutation.
///
/// Exactly one resolving call is honored; later calls on the same context
/// are ignored. Returning without resolving abstains.
pub struct Interception<'a> {
    intercepted: &'a Intercepted,
    shape: KeyShape,
    strict: bool,
    resolution: RefCell<Option<Resolution>>,
}

impl<'a> Interception<'a> {
    pub(crate) fn new(intercepted: &'a Intercepted, shape: KeyShape, strict: bool) -> Self {
        Self {
            intercepted,
            shape,
            strict,
            resolution: RefCell::new(None),
        }
    }

    /// The pending mutation.
    pub fn intercepted(&self) -> &Intercepted {
        self.intercepted
    }

    /// Commit the original pending value as-is.
    pub fn allow_action(&self) {
        self.resolve(Resolution::Allow);
    }

    /// Discard the mutation: no commit, no dispatch.
    pub fn reject_action(&self) {
        self.resolve(Resolution::Reject);
    }

    /// Commit `value` instead of the pending value.
    pub fn override_value(&self, value: impl Into<Value>) {
        if self.intercepted.operation == Operation::Clear {
            warn!(
                event = %self.intercepted.event,
                "value override on a clear has nothing to replace; ignored"
            );
            return;
        }
        self.resolve(Resolution::Value(value.into()));
    }

    /// Commit the original value under `key` instead.
    pub fn override_key(&self, key: impl Into<Key>) -> Result<()> {
        let key = key.into();
        if !self.check_key("override_key", &key)? {
            return Ok(());
        }
        self.resolve(Resolution::Key(key));
        Ok(())
    }

    /// Commit `value` under `key` instead.
    pub fn override_key_and_value(&self, key: impl Into<Key>, value: impl Into<Value>) -> Result<()> {
        let key = key.into();
        if !self.check_key("override_key_and_value", &key)? {
            return Ok(());
        }
        self.resolve(Resolution::KeyAndValue(key, value.into()));
        Ok(())
    }

    /// Whether this context already holds a decision.
    pub fn is_resolved(&self) -> bool {
        self.resolution.borrow().is_some()
    }

    pub(crate) fn into_resolution(self) -> Option<Resolution> {
        self.resolution.into_inner()
    }

    /// Key overrides need a site addressed by keys of `key`'s kind. Strict
    /// mode reports misuse; otherwise the call is dropped.
    fn check_key(&self, operation: &'static str, key: &Key) -> Result<bool> {
        let keyed = self.shape != KeyShape::Unkeyed && self.intercepted.operation != Operation::Clear;
        if keyed && self.shape.accepts(key) {
            return Ok(true);
        }
        let message = if keyed {
            format!(
                "`{key}` cannot address a {:?} key at `{}`",
                self.shape, self.intercepted.event
            )
        } else {
            format!(
                "{:?} at `{}` has no addressable key",
                self.intercepted.operation, self.intercepted.event
            )
        };
        if self.strict {
            return Err(StoreError::override_use(operation, message));
        }
        warn!(event = %self.intercepted.event, operation, %message, "key override ignored");
        Ok(false)
    }

    fn resolve(&self, resolution: Resolution) {
        let mut slot = self.resolution.borrow_mut();
        if slot.is_some() {
            warn!(
                event = %self.intercepted.event,
                "interceptor resolved the same mutation twice; keeping the first decision"
            );
            return;
        }
        *slot = Some(resolution);
    }
}

impl fmt::Debug for Interception<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Interception")
            .field("intercepted", self.intercepted)
            .field("resolution", &self.resolution.borrow())
            .finish()
    }
}
