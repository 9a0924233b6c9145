//! Bound action tables.

use super::definition::ActionFn;
use crate::error::{Result, StoreError};
use crate::observable::ObservedObject;
use crate::types::Value;
use std::fmt;
use tracing::trace;

/// A user action rebound to the live record it mutates.
#[derive(Clone)]
pub(crate) struct BoundAction {
    action: ActionFn,
    target: ObservedObject,
}

impl BoundAction {
    pub(crate) fn new(action: ActionFn, target: ObservedObject) -> Self {
        Self { action, target }
    }

    fn invoke(&self, args: &[Value]) {
        (self.action)(&self.target, args);
    }
}

/// Named actions of one level, plus the tables of its branches.
///
/// Calling an action returns the table it was found in, so calls chain:
///
/// ```ignore
/// store.actions().call("inc", &[5.into()])?.call("inc", &[5.into()])?;
/// ```
#[derive(Clone, Default)]
pub struct ActionTable {
    actions: Vec<(String, BoundAction)>,
    branches: Vec<(String, ActionTable)>,
    strict: bool,
}

impl ActionTable {
    pub(crate) fn new(strict: bool) -> Self {
        Self {
            actions: Vec::new(),
            branches: Vec::new(),
            strict,
        }
    }

    pub(crate) fn insert_action(&mut self, name: String, action: BoundAction) {
        self.actions.push((name, action));
    }

    pub(crate) fn insert_branch(&mut self, name: String, table: ActionTable) {
        self.branches.push((name, table));
    }

    /// Invoke the action `name` with `args`.
    ///
    /// Dotted names reach into branches: `"todos.add"` calls `add` on the
    /// `todos` branch and returns that branch's table.
    pub fn call(&self, name: &str, args: &[Value]) -> Result<&ActionTable> {
        if let Some((branch, rest)) = name.split_once('.') {
            return match self.branch(branch) {
                Some(table) => table.call(rest, args),
                None => Err(StoreError::UnknownAction {
                    operation: "call",
                    name: name.to_string(),
                }),
            };
        }

        if let Some((_, action)) = self.actions.iter().find(|(n, _)| n == name) {
            trace!(action = %name, args = args.len(), "invoking action");
            action.invoke(args);
            return Ok(self);
        }

        if self.strict && self.branch(name).is_some() {
            return Err(StoreError::callback(
                "call",
                format!("`{name}` is a branch, not an action"),
            ));
        }
        Err(StoreError::UnknownAction {
            operation: "call",
            name: name.to_string(),
        })
    }

    /// Table of the branch `name` (group topologies).
    pub fn branch(&self, name: &str) -> Option<&ActionTable> {
        self.branches
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, table)| table)
    }

    /// Action names at this level, in definition order.
    pub fn names(&self) -> Vec<&str> {
        self.actions.iter().map(|(n, _)| n.as_str()).collect()
    }

    pub fn branch_names(&self) -> Vec<&str> {
        self.branches.iter().map(|(n, _)| n.as_str()).collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.actions.iter().any(|(n, _)| n == name)
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty() && self.branches.is_empty()
    }

    /// Descend through branch names.
    pub(crate) fn resolve<S: AsRef<str>>(&self, segments: &[S]) -> Option<&ActionTable> {
        segments
            .iter()
            .try_fold(self, |table, segment| table.branch(segment.as_ref()))
    }
}

impl fmt::Debug for ActionTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (name, _) in &self.actions {
            map.entry(name, &"<action>");
        }
        for (name, table) in &self.branches {
            map.entry(name, table);
        }
        map.finish()
    }
}
