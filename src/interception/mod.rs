//! Mutation interception.
//!
//! Interceptors are registered like listeners (path-indexed, wildcard set)
//! but run before a change commits. Each one receives an [`Interception`]
//! and may allow, reject or rewrite the pending change.
//!
//! # Example
//!
//! ```ignore
//! store.intercept("count", |ctx| {
//!     match ctx.intercepted().value.as_ref().and_then(Value::as_i64) {
//!         Some(n) if n < 0 => ctx.override_value(0),
//!         _ => ctx.allow_action(),
//!     }
//! })?;
//! ```

mod chain;
mod context;

pub(crate) use chain::{InterceptionChain, MutationSite};
pub(crate) use context::{Change, KeyShape};
pub use context::{Intercepted, Interception, Interceptor};
