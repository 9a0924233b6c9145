//! # Reactive Store
//!
//! A synchronous, single-threaded reactive data store: plain nested data plus
//! user actions become a live graph whose every mutation can be intercepted
//! before it commits and is announced to listeners scoped to the path that
//! changed.
//!
//! ## Core Concepts
//!
//! - **Live graph**: records, arrays, maps and sets wrapped so writes go
//!   through the store
//! - **Event paths**: dot-delimited addresses that listeners and
//!   interceptors register against
//! - **Interceptors**: allow, reject or rewrite a pending change
//! - **Listeners**: notified leaf-to-root, at most once per mutation
//! - **Snapshots**: detached plain copies for readers
//!
//! ## Example
//!
//! ```ignore
//! use reactive_store::{Store, StoreDef, Value};
//!
//! let store = Store::new(StoreDef::new().data("count", 0).action("inc", |s, args| {
//!     let by = args.first().and_then(Value::as_i64).unwrap_or(1);
//!     let count = s.value("count").and_then(|v| v.as_i64()).unwrap_or(0);
//!     s.set("count", count + by);
//! }))?;
//!
//! let _handle = store.listen("count", |v| println!("count is now {v}"))?;
//! store.actions().call("inc", &[5.into()])?.call("inc", &[5.into()])?;
//! assert_eq!(store.get("count")?, Some(Value::from(10)));
//! ```

pub mod actions;
pub mod equality;
pub mod error;
pub(crate) mod hub;
pub mod interception;
pub mod observable;
pub mod path;
pub mod source;
pub mod store;
pub mod subscriptions;
pub mod types;

// Re-exports
pub use actions::{detect_topology, ActionFn, ActionTable, Entry, StoreDef};
pub use equality::deep_equal;
pub use error::{Result, StoreError};
pub use interception::{Intercepted, Interception, Interceptor};
pub use observable::{unwrap, Observed, ObservedArray, ObservedMap, ObservedObject, ObservedSet};
pub use source::SnapshotSource;
pub use store::{Selection, Store, StoreConfig, Validation};
pub use subscriptions::{CallbackId, Listener, Unsubscribe};
pub use types::*;
