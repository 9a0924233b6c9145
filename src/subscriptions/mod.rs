//! Subscription system for live store updates.
//!
//! Listeners are registered against an event path and are added to the set
//! of every ancestor segment of that path, so a listener on `"a"` hears
//! mutations dispatched at `"a.b.c"`. A dispatch walks leaf-to-root and
//! invokes each listener at most once per round.
//!
//! # Example
//!
//! ```ignore
//! let listener = Listener::new(|| println!("todos changed"));
//! let handle = store.subscribe("todos", &listener)?;
//!
//! store.actions().call("add_todo", &["write docs".into()])?;
//!
//! handle.unsubscribe();
//! ```

mod manager;
mod registry;
mod types;

pub(crate) use manager::SubscriptionManager;
pub(crate) use registry::{Callback, PathRegistry};
pub use registry::CallbackId;
pub use types::{Listener, Unsubscribe};
