//! Per-store engine state shared by every node of the live graph.
//!
//! Each store owns exactly one hub; wrappers hold an `Rc` to it so that a
//! write anywhere in the graph reaches the same interceptors and listeners.

use crate::interception::{Change, InterceptionChain, MutationSite};
use crate::store::Validation;
use crate::subscriptions::SubscriptionManager;

pub(crate) struct Hub {
    pub(crate) subscriptions: SubscriptionManager,
    pub(crate) interceptors: InterceptionChain,
    validation: Validation,
}

impl Hub {
    pub(crate) fn new(validation: Validation) -> Self {
        Self {
            subscriptions: SubscriptionManager::new(),
            interceptors: InterceptionChain::new(),
            validation,
        }
    }

    pub(crate) fn is_strict(&self) -> bool {
        self.validation == Validation::Strict
    }

    /// Send a pending change through interception; commit and dispatch
    /// happen in `site.commit`.
    pub(crate) fn mutate(&self, event: &str, change: Change, site: &dyn MutationSite) {
        self.interceptors
            .handle_mutation(event, change, site, self.is_strict());
    }

    pub(crate) fn dispatch(&self, event: &str) {
        self.subscriptions.dispatch(event);
    }
}
