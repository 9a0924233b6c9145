//! Interception chain: the resolution walk that runs before dispatch.

use super::context::{Change, Intercepted, Interception, Interceptor, KeyShape, Resolution};
use crate::subscriptions::{CallbackId, PathRegistry};
use crate::types::Value;
use std::cell::RefCell;
use tracing::{debug, trace};

/// A container a pending change can be committed against.
pub(crate) trait MutationSite {
    /// Plain snapshot of the container before the change.
    fn prior_state(&self) -> Value;

    /// How mutations here are addressed.
    fn key_shape(&self) -> KeyShape;

    /// Store the change and dispatch.
    fn commit(&self, change: Change);
}

/// Path-indexed interceptors of one store.
pub(crate) struct InterceptionChain {
    registry: RefCell<PathRegistry<Interceptor>>,
}

impl InterceptionChain {
    pub(crate) fn new() -> Self {
        Self {
            registry: RefCell::new(PathRegistry::new()),
        }
    }

    pub(crate) fn register(&self, path: &str, interceptor: Interceptor) {
        self.registry.borrow_mut().insert(path, interceptor);
    }

    pub(crate) fn unregister(&self, path: &str, id: CallbackId) {
        self.registry.borrow_mut().remove(path, id);
    }

    pub(crate) fn interceptor_count(&self) -> usize {
        self.registry.borrow().distinct_count()
    }

    /// Route a pending change at `event` to its interceptors.
    ///
    /// With no interceptor on the path, its ancestors, or the wildcard set,
    /// the change commits straight away. Otherwise every distinct
    /// interceptor found (leaf-to-root, then wildcard) is invoked with its
    /// own context against the same pending value. Any rejection vetoes the
    /// change; failing that, the first interceptor that resolved decides what
    /// commits. If none resolved, the change is dropped.
    pub(crate) fn handle_mutation(
        &self,
        event: &str,
        change: Change,
        site: &dyn MutationSite,
        strict: bool,
    ) {
        let interceptors = {
            let registry = self.registry.borrow();
            if registry.is_empty() {
                Vec::new()
            } else {
                registry.collect(event)
            }
        };

        if interceptors.is_empty() {
            trace!(event, operation = ?change.operation, "committing without interception");
            site.commit(change);
            return;
        }

        let intercepted = Intercepted {
            event: event.to_string(),
            operation: change.operation,
            key: change.key.clone(),
            value: change.value.clone(),
            state: site.prior_state(),
        };

        let mut vetoed = false;
        let mut decision: Option<Resolution> = None;
        for interceptor in &interceptors {
            let ctx = Interception::new(&intercepted, site.key_shape(), strict);
            interceptor.invoke(&ctx);
            match ctx.into_resolution() {
                Some(Resolution::Reject) => vetoed = true,
                Some(resolution) => {
                    if decision.is_none() {
                        decision = Some(resolution);
                    }
                }
                None => {}
            }
        }

        if vetoed {
            debug!(event, interceptors = interceptors.len(), "mutation rejected");
            return;
        }

        match decision {
            Some(resolution) => {
                trace!(event, ?resolution, "committing intercepted mutation");
                site.commit(resolution.apply(change));
            }
            None => {
                debug!(event, interceptors = interceptors.len(), "no interceptor resolved; mutation dropped");
            }
        }
    }
}

impl Default for InterceptionChain {
    fn default() -> Self {
        Self::new()
    }
}
