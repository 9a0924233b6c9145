//! Store definitions and action binding.
//!
//! A [`StoreDef`] mixes plain data with user actions. Binding separates the
//! two once: the data is wrapped into the live graph and each action is
//! rebound so it always receives the live record it belongs to.
//!
//! Two topologies are recognized:
//!
//! - **Slice**: the root holds data fields and actions side by side.
//! - **Group**: the root holds only named branches, each its own slice.
//!   Branch records are bound at an event path equal to the branch name.
//!
//! ## Example
//!
//! ```ignore
//! let def = StoreDef::new()
//!     .branch("todos", StoreDef::new()
//!         .data("items", Value::from(Vec::<Value>::new()))
//!         .action("add", |todos, args| { /* ... */ }))
//!     .branch("user", StoreDef::new().data("name", "ada"));
//!
//! let store = Store::new(def)?;
//! assert_eq!(store.topology(), Topology::Group);
//! store.actions().call("todos.add", &["write docs".into()])?;
//! ```

mod binder;
mod definition;
mod table;

pub(crate) use binder::{bind, Bound};
pub use binder::detect_topology;
pub use definition::{ActionFn, Entry, StoreDef};
pub use table::ActionTable;
