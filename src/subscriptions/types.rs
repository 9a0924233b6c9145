//! Subscription types for live store updates.

use super::registry::{Callback, CallbackId};
use std::fmt;
use std::rc::Rc;

/// A zero-argument callback registered against an event path.
///
/// Cloning a listener keeps its identity: registering clones of the same
/// listener at several ancestor paths still invokes it once per dispatch.
#[derive(Clone)]
pub struct Listener {
    callback: Rc<dyn Fn()>,
}

impl Listener {
    pub fn new(callback: impl Fn() + 'static) -> Self {
        Self {
            callback: Rc::new(callback),
        }
    }

    /// Identity used for dedup and unsubscribe.
    pub fn id(&self) -> CallbackId {
        CallbackId::of(&self.callback)
    }

    pub(crate) fn notify(&self) {
        (self.callback)()
    }
}

impl Callback for Listener {
    fn id(&self) -> CallbackId {
        Listener::id(self)
    }
}

impl fmt::Debug for Listener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Listener").field(&self.id()).finish()
    }
}

/// Handle returned by every registration.
///
/// Calling [`unsubscribe`](Unsubscribe::unsubscribe) removes the callback
/// from every path segment it was registered under. Dropping the handle
/// without calling it leaves the registration in place.
pub struct Unsubscribe {
    id: CallbackId,
    detach: Option<Box<dyn FnOnce()>>,
}

impl Unsubscribe {
    pub(crate) fn new(id: CallbackId, detach: impl FnOnce() + 'static) -> Self {
        Self {
            id,
            detach: Some(Box::new(detach)),
        }
    }

    /// Identity of the registered callback.
    pub fn id(&self) -> CallbackId {
        self.id
    }

    /// Remove the registration. Safe to call from inside a dispatch; the
    /// in-progress walk is unaffected for segments it already visited.
    pub fn unsubscribe(mut self) {
        if let Some(detach) = self.detach.take() {
            detach();
        }
    }
}

impl fmt::Debug for Unsubscribe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Unsubscribe")
            .field("id", &self.id)
            .field("active", &self.detach.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_clone_keeps_identity() {
        let listener = Listener::new(|| {});
        let other = Listener::new(|| {});
        assert_eq!(listener.id(), listener.clone().id());
        assert_ne!(listener.id(), other.id());
    }

    #[test]
    fn test_unsubscribe_runs_once() {
        let count = Rc::new(Cell::new(0));
        let seen = count.clone();
        let listener = Listener::new(|| {});
        let handle = Unsubscribe::new(listener.id(), move || seen.set(seen.get() + 1));
        assert_eq!(handle.id(), listener.id());

        handle.unsubscribe();
        assert_eq!(count.get(), 1);
    }
}
