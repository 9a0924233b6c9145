//! Topology detection and action binding.

use super::definition::{ActionFn, Entry, StoreDef};
use super::table::{ActionTable, BoundAction};
use crate::error::{Result, StoreError};
use crate::hub::Hub;
use crate::observable::ObservedObject;
use crate::types::{Topology, Value};
use std::collections::BTreeMap;
use std::rc::Rc;
use tracing::{debug, warn};

/// Live graph and action table produced from one definition.
pub(crate) struct Bound {
    pub(crate) root: ObservedObject,
    pub(crate) actions: ActionTable,
    pub(crate) topology: Topology,
}

/// Classify a definition by its immediate entries.
///
/// Any action makes it a slice. Otherwise a non-empty root whose entries are
/// all branches or plain records is a group. Everything else is a slice.
pub fn detect_topology(def: &StoreDef) -> Topology {
    let entries = def.entries();
    if entries.iter().any(|(_, e)| e.is_action()) {
        return Topology::Slice;
    }
    if !entries.is_empty() && entries.iter().all(|(_, e)| e.is_branch_like()) {
        Topology::Group
    } else {
        Topology::Slice
    }
}

/// One level of a definition split into data, actions and nested branches.
/// Branch data is also present in `data` under the branch name.
struct Level {
    data: BTreeMap<String, Value>,
    actions: Vec<(String, ActionFn)>,
    branches: Vec<(String, Level)>,
}

pub(crate) fn bind(def: StoreDef, hub: &Rc<Hub>) -> Result<Bound> {
    let topology = detect_topology(&def);
    debug!(topology = ?topology, entries = def.entries().len(), "store topology detected");

    let strict = hub.is_strict();
    let level = match topology {
        Topology::Slice => split(def, strict, "slice root")?,
        Topology::Group => split_group(def, strict)?,
    };

    let root = ObservedObject::build(level.data.clone(), "", hub, None);
    let actions = bind_level(level, &root, strict);
    Ok(Bound {
        root,
        actions,
        topology,
    })
}

fn split_group(def: StoreDef, strict: bool) -> Result<Level> {
    let mut level = Level {
        data: BTreeMap::new(),
        actions: Vec::new(),
        branches: Vec::new(),
    };
    for (name, entry) in def.into_entries() {
        let branch = match entry {
            Entry::Branch(def) => split(def, strict, &name)?,
            Entry::Data(Value::Object(fields)) => Level {
                data: fields,
                actions: Vec::new(),
                branches: Vec::new(),
            },
            // detect_topology only yields Group for branch-like entries
            other => {
                return Err(StoreError::shape(
                    "bind",
                    format!("group branch `{name}` is not a record: {other:?}"),
                ))
            }
        };
        level
            .data
            .insert(name.clone(), Value::Object(branch.data.clone()));
        level.branches.push((name, branch));
    }
    Ok(level)
}

/// Split a flat data+actions level. Nested branches are a shape error when
/// validating; otherwise they are kept as nested records with their own table.
fn split(def: StoreDef, strict: bool, label: &str) -> Result<Level> {
    let mut level = Level {
        data: BTreeMap::new(),
        actions: Vec::new(),
        branches: Vec::new(),
    };
    let has_actions = def.entries().iter().any(|(_, e)| e.is_action());

    for (name, entry) in def.into_entries() {
        match entry {
            Entry::Data(value) => {
                level.data.insert(name, value);
            }
            Entry::Action(action) => level.actions.push((name, action)),
            Entry::Branch(nested) => {
                if strict {
                    let message = if has_actions {
                        format!("{label} mixes actions with branch `{name}`")
                    } else {
                        format!("{label} holds branch `{name}` next to a non-record field")
                    };
                    return Err(StoreError::shape("bind", message));
                }
                warn!(branch = %name, level = %label, "branch outside a group root; kept as a nested record");
                let nested = split(nested, strict, &name)?;
                level
                    .data
                    .insert(name.clone(), Value::Object(nested.data.clone()));
                level.branches.push((name, nested));
            }
        }
    }
    Ok(level)
}

fn bind_level(level: Level, target: &ObservedObject, strict: bool) -> ActionTable {
    let mut table = ActionTable::new(strict);
    for (name, action) in level.actions {
        table.insert_action(name, BoundAction::new(action, target.clone()));
    }
    for (name, branch) in level.branches {
        let Some(child) = target.get(&name).and_then(|o| o.as_object().cloned()) else {
            warn!(branch = %name, "branch record missing from the live graph; actions not bound");
            continue;
        };
        table.insert_branch(name, bind_level(branch, &child, strict));
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Validation;
    use serde_json::json;
    use std::cell::Cell;

    fn hub(validation: Validation) -> Rc<Hub> {
        Rc::new(Hub::new(validation))
    }

    fn counter() -> StoreDef {
        StoreDef::new().data("count", 0).action("inc", |s, args| {
            let by = args.first().and_then(Value::as_i64).unwrap_or(1);
            let count = s.value("count").and_then(|v| v.as_i64()).unwrap_or(0);
            s.set("count", count + by);
        })
    }

    #[test]
    fn test_detect_topology() {
        assert_eq!(detect_topology(&counter()), Topology::Slice);
        assert_eq!(detect_topology(&StoreDef::new()), Topology::Slice);
        assert_eq!(
            detect_topology(&StoreDef::new().data("a", 1).data("b", json!({"c": 1}))),
            Topology::Slice
        );
        assert_eq!(
            detect_topology(&StoreDef::new().branch("c", counter()).data("meta", json!({}))),
            Topology::Group
        );
    }

    #[test]
    fn test_slice_actions_chain() {
        let bound = bind(counter(), &hub(Validation::Strict)).unwrap();
        assert_eq!(bound.topology, Topology::Slice);

        bound
            .actions
            .call("inc", &[Value::from(2)])
            .unwrap()
            .call("inc", &[Value::from(3)])
            .unwrap();
        assert_eq!(bound.root.value("count"), Some(Value::from(5)));
    }

    #[test]
    fn test_group_binds_branch_record() {
        let def = StoreDef::new()
            .branch("left", counter())
            .branch("right", counter());
        let bound = bind(def, &hub(Validation::Strict)).unwrap();
        assert_eq!(bound.topology, Topology::Group);

        bound.actions.call("left.inc", &[Value::from(4)]).unwrap();
        let right = bound.actions.branch("right").unwrap();
        right.call("inc", &[]).unwrap();

        assert_eq!(
            bound.root.to_value(),
            Value::from(json!({"left": {"count": 4}, "right": {"count": 1}}))
        );
        let left = bound.root.get("left").unwrap();
        assert_eq!(left.as_object().unwrap().event(), "left");
    }

    #[test]
    fn test_unknown_and_branch_names() {
        let def = StoreDef::new().branch("c", counter());
        let bound = bind(def, &hub(Validation::Strict)).unwrap();

        let err = bound.actions.call("missing", &[]).unwrap_err();
        assert!(matches!(err, StoreError::UnknownAction { .. }));

        let err = bound.actions.call("c", &[]).unwrap_err();
        assert!(matches!(err, StoreError::InvalidCallback { .. }));

        let err = bound.actions.call("c.missing", &[]).unwrap_err();
        assert!(matches!(err, StoreError::UnknownAction { .. }));
    }

    #[test]
    fn test_branch_in_slice() {
        let def = counter().branch("nested", counter());

        let err = bind(def.clone(), &hub(Validation::Strict)).err().unwrap();
        assert!(matches!(err, StoreError::InvalidStoreShape { .. }));

        let bound = bind(def, &hub(Validation::Off)).unwrap();
        bound.actions.call("nested.inc", &[]).unwrap();
        assert_eq!(
            bound.root.value("nested"),
            Some(Value::from(json!({"count": 1})))
        );
    }

    #[test]
    fn test_nested_branch_in_group() {
        let def = StoreDef::new().branch("g", StoreDef::new().branch("deep", counter()));
        let err = bind(def, &hub(Validation::Strict)).err().unwrap();
        assert!(matches!(err, StoreError::InvalidStoreShape { .. }));
    }

    #[test]
    fn test_action_receives_args() {
        let seen = Rc::new(Cell::new(0usize));
        let hits = Rc::clone(&seen);
        let def = StoreDef::new().action("arity", move |_, args| hits.set(args.len()));
        let bound = bind(def, &hub(Validation::Strict)).unwrap();

        bound
            .actions
            .call("arity", &[Value::from(1), Value::from("x")])
            .unwrap();
        assert_eq!(seen.get(), 2);
        assert_eq!(bound.actions.names(), vec!["arity"]);
    }
}
