//! Store definitions: user data plus user mutators.

use crate::observable::ObservedObject;
use crate::types::Value;
use std::fmt;
use std::rc::Rc;

/// A user mutator. Receives the live slice it is bound to and the caller's
/// arguments.
pub type ActionFn = Rc<dyn Fn(&ObservedObject, &[Value])>;

/// One named entry of a definition.
#[derive(Clone)]
pub enum Entry {
    Data(Value),
    Action(ActionFn),
    /// A nested definition; only meaningful at the root of a group.
    Branch(StoreDef),
}

impl Entry {
    pub(crate) fn is_action(&self) -> bool {
        matches!(self, Entry::Action(_))
    }

    /// Branches and plain records can both act as group members.
    pub(crate) fn is_branch_like(&self) -> bool {
        matches!(self, Entry::Branch(_) | Entry::Data(Value::Object(_)))
    }
}

impl fmt::Debug for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Entry::Data(value) => f.debug_tuple("Data").field(value).finish(),
            Entry::Action(_) => f.write_str("Action(..)"),
            Entry::Branch(def) => f.debug_tuple("Branch").field(def).finish(),
        }
    }
}

/// What a store is built from.
///
/// ```ignore
/// let def = StoreDef::new()
///     .data("count", 0)
///     .action("inc", |s, args| {
///         let by = args.first().and_then(Value::as_i64).unwrap_or(1);
///         let count = s.value("count").and_then(|v| v.as_i64()).unwrap_or(0);
///         s.set("count", count + by);
///     });
/// ```
#[derive(Clone, Debug, Default)]
pub struct StoreDef {
    entries: Vec<(String, Entry)>,
}

impl StoreDef {
    pub fn new() -> Self {
        Self::default()
    }

    /// Data-only definition from a plain record. Non-record values yield an
    /// empty definition; [`crate::Store::from_value`] reports those.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(fields) => fields
                .into_iter()
                .fold(Self::new(), |def, (k, v)| def.data(k, v)),
            _ => Self::new(),
        }
    }

    pub fn data(self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.entry(name, Entry::Data(value.into()))
    }

    pub fn action(
        self,
        name: impl Into<String>,
        action: impl Fn(&ObservedObject, &[Value]) + 'static,
    ) -> Self {
        self.entry(name, Entry::Action(Rc::new(action)))
    }

    pub fn branch(self, name: impl Into<String>, def: StoreDef) -> Self {
        self.entry(name, Entry::Branch(def))
    }

    /// Add or replace an entry.
    pub fn entry(mut self, name: impl Into<String>, entry: Entry) -> Self {
        let name = name.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = entry,
            None => self.entries.push((name, entry)),
        }
        self
    }

    pub fn entries(&self) -> &[(String, Entry)] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn into_entries(self) -> Vec<(String, Entry)> {
        self.entries
    }
}
