//! Tear-free external-store view for rendering layers.
//!
//! A rendering layer that polls for the current value between renders needs
//! the same reference back until the data actually changes, or it will
//! re-render forever. [`SnapshotSource`] caches the last snapshot behind an
//! `Rc` and only swaps it when a fresh read is no longer deep-equal.

use crate::hub::Hub;
use crate::observable::ObservedObject;
use crate::path::Selector;
use crate::store::{attach_listener, read};
use crate::subscriptions::{Listener, Unsubscribe};
use crate::types::Value;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// `(subscribe, get_snapshot)` pair over one path of a store.
pub struct SnapshotSource {
    hub: Rc<Hub>,
    root: ObservedObject,
    selector: Selector,
    current: RefCell<Rc<Value>>,
}

impl SnapshotSource {
    pub(crate) fn new(hub: Rc<Hub>, root: ObservedObject, selector: Selector) -> Self {
        let current = Rc::new(read(&root, &selector).unwrap_or_default());
        Self {
            hub,
            root,
            selector,
            current: RefCell::new(current),
        }
    }

    /// Call `callback` on every dispatch that reaches the path.
    pub fn subscribe(&self, callback: impl Fn() + 'static) -> Unsubscribe {
        attach_listener(&self.hub, self.selector.event_path(), Listener::new(callback))
    }

    /// Current value. Returns the same `Rc` as the previous call unless the
    /// value changed in between.
    pub fn get_snapshot(&self) -> Rc<Value> {
        let fresh = read(&self.root, &self.selector).unwrap_or_default();
        if **self.current.borrow() != fresh {
            self.current.replace(Rc::new(fresh));
        }
        Rc::clone(&self.current.borrow())
    }
}

impl fmt::Debug for SnapshotSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SnapshotSource")
            .field("selector", &self.selector)
            .field("current", &self.current.borrow())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use crate::{Store, StoreConfig, StoreDef, Validation, Value};
    use std::cell::Cell;
    use std::rc::Rc;

    fn store() -> Store {
        let def = StoreDef::new()
            .data("count", 0)
            .data("other", 0)
            .action("inc", |s, _| {
                let count = s.value("count").and_then(|v| v.as_i64()).unwrap_or(0);
                s.set("count", count + 1);
            })
            .action("touch", |s, _| {
                let other = s.value("other").and_then(|v| v.as_i64()).unwrap_or(0);
                s.set("other", other + 1);
            });
        let config = StoreConfig {
            validation: Validation::Strict,
            ..Default::default()
        };
        Store::with_config(def, config).unwrap()
    }

    #[test]
    fn test_snapshot_is_stable_until_change() {
        let store = store();
        let source = store.source("count").unwrap();

        let first = source.get_snapshot();
        let second = source.get_snapshot();
        assert!(Rc::ptr_eq(&first, &second));

        store.actions().call("touch", &[]).unwrap();
        assert!(Rc::ptr_eq(&first, &source.get_snapshot()));

        store.actions().call("inc", &[]).unwrap();
        let third = source.get_snapshot();
        assert!(!Rc::ptr_eq(&first, &third));
        assert_eq!(*third, Value::from(1));
    }

    #[test]
    fn test_subscribe_and_unsubscribe() {
        let store = store();
        let source = store.source("count").unwrap();
        let calls = Rc::new(Cell::new(0));
        let hits = Rc::clone(&calls);
        let handle = source.subscribe(move || hits.set(hits.get() + 1));

        store.actions().call("inc", &[]).unwrap();
        store.actions().call("touch", &[]).unwrap();
        assert_eq!(calls.get(), 1);

        handle.unsubscribe();
        store.actions().call("inc", &[]).unwrap();
        assert_eq!(calls.get(), 1);
    }
}
