//! Subscription manager: path-indexed listeners and the leaf-to-root dispatch walk.

use super::registry::{CallbackId, PathRegistry};
use super::types::Listener;
use std::cell::RefCell;
use std::collections::HashSet;
use tracing::trace;

/// Holds every listener of one store and notifies them of committed mutations.
pub(crate) struct SubscriptionManager {
    registry: RefCell<PathRegistry<Listener>>,
}

impl SubscriptionManager {
    pub(crate) fn new() -> Self {
        Self {
            registry: RefCell::new(PathRegistry::new()),
        }
    }

    /// Register `listener` at `path` (or the wildcard set for `"*"`).
    pub(crate) fn subscribe(&self, path: &str, listener: Listener) {
        self.registry.borrow_mut().insert(path, listener);
    }

    /// Remove one registration of `id` at `path`.
    pub(crate) fn unsubscribe(&self, path: &str, id: CallbackId) {
        self.registry.borrow_mut().remove(path, id);
    }

    /// Number of distinct listeners registered.
    pub(crate) fn subscription_count(&self) -> usize {
        self.registry.borrow().distinct_count()
    }

    /// Notify listeners of a committed mutation at `event`.
    ///
    /// Wildcard listeners run first. Then each segment from the leaf up to
    /// the first is visited and its listeners run in registration order,
    /// skipping any listener already invoked in this round. The registry is
    /// re-read per segment, so listeners may subscribe or unsubscribe while
    /// the walk is in progress.
    pub(crate) fn dispatch(&self, event: &str) {
        trace!(event, "dispatching");
        let mut seen: HashSet<CallbackId> = HashSet::new();

        let wildcard = self.registry.borrow().wildcard();
        for listener in wildcard {
            if seen.insert(listener.id()) {
                listener.notify();
            }
        }

        if !self.registry.borrow().has_paths() {
            return;
        }

        for segment in crate::path::ancestors(event) {
            let listeners = self.registry.borrow().at(segment);
            let Some(listeners) = listeners else {
                continue;
            };
            for listener in listeners {
                if seen.insert(listener.id()) {
                    listener.notify();
                }
            }
        }
    }
}

impl Default for SubscriptionManager {
    fn default() -> Self {
        Self::new()
    }
}
