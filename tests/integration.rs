//! Integration tests for the reactive store.

use reactive_store::{
    Listener, Observed, ObservedObject, Store, StoreConfig, StoreDef, Topology, Validation, Value,
};
use serde_json::json;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

fn strict() -> StoreConfig {
    StoreConfig {
        validation: Validation::Strict,
        ..Default::default()
    }
}

fn counter() -> StoreDef {
    StoreDef::new().data("count", 0).action("inc", |s, args| {
        let by = args.first().and_then(Value::as_i64).unwrap_or(1);
        let count = s.value("count").and_then(|v| v.as_i64()).unwrap_or(0);
        s.set("count", count + by);
    })
}

/// Live record at `path` below `root`.
fn record(root: &ObservedObject, path: &[&str]) -> ObservedObject {
    Observed::Object(root.clone())
        .resolve(path)
        .and_then(|o| o.as_object().cloned())
        .unwrap()
}

fn counting() -> (Rc<Cell<usize>>, Listener) {
    let calls = Rc::new(Cell::new(0));
    let hits = Rc::clone(&calls);
    (calls, Listener::new(move || hits.set(hits.get() + 1)))
}

// --- Scenarios ---

#[test]
fn test_counter_listen_values() {
    let store = Store::with_config(counter(), strict()).unwrap();
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    let _handle = store
        .listen("count", move |v| sink.borrow_mut().push(v.clone()))
        .unwrap();

    store.actions().call("inc", &[Value::from(5)]).unwrap();
    store.actions().call("inc", &[Value::from(5)]).unwrap();

    assert_eq!(store.get_snapshot(Some("count")).unwrap(), Some(Value::from(10)));
    assert_eq!(*seen.borrow(), vec![Value::from(5), Value::from(10)]);
}

#[test]
fn test_nested_path_listeners_fire_once() {
    let def = StoreDef::new()
        .data("a", json!({"b": {"c": 1}}))
        .action("set_c", |s, args| {
            let value = args.first().cloned().unwrap_or_default();
            record(s, &["a", "b"]).set("c", value);
        });
    let store = Store::with_config(def, strict()).unwrap();

    let mut tallies = Vec::new();
    let mut handles = Vec::new();
    for path in ["a", "a.b", "a.b.c"] {
        let (calls, listener) = counting();
        handles.push(store.subscribe(path, &listener).unwrap());
        tallies.push(calls);
    }

    store.actions().call("set_c", &[Value::from(2)]).unwrap();

    for calls in &tallies {
        assert_eq!(calls.get(), 1);
    }
    assert_eq!(store.get("a.b.c").unwrap(), Some(Value::from(2)));
}

#[test]
fn test_listener_at_two_ancestors_fires_once() {
    let def = StoreDef::new()
        .data("a", json!({"b": {"c": 1}}))
        .action("bump", |s, _| {
            let b = record(s, &["a", "b"]);
            let c = b.value("c").and_then(|v| v.as_i64()).unwrap_or(0);
            b.set("c", c + 1);
        });
    let store = Store::with_config(def, strict()).unwrap();
    let (calls, listener) = counting();
    let outer = store.subscribe("a", &listener).unwrap();
    let _inner = store.subscribe("a.b", &listener).unwrap();

    store.actions().call("bump", &[]).unwrap();
    assert_eq!(calls.get(), 1);

    // The other registration keeps it reachable.
    outer.unsubscribe();
    store.actions().call("bump", &[]).unwrap();
    assert_eq!(calls.get(), 2);
}

#[test]
fn test_wildcard_listener_sees_everything() {
    let def = counter()
        .data("user", json!({"name": "ada"}))
        .action("rename", |s, args| {
            let name = args.first().cloned().unwrap_or_default();
            record(s, &["user"]).set("name", name);
        });
    let store = Store::with_config(def, strict()).unwrap();
    let (calls, listener) = counting();
    let _handle = store.subscribe("*", &listener).unwrap();

    store
        .actions()
        .call("inc", &[])
        .unwrap()
        .call("rename", &[Value::from("grace")])
        .unwrap();
    assert_eq!(calls.get(), 2);
}

#[test]
fn test_equal_write_is_silent() {
    let def = StoreDef::new()
        .data("profile", json!({"tags": ["a", "b"], "age": 3}))
        .action("reset", |s, _| {
            s.set("profile", Value::from(json!({"age": 3.0, "tags": ["a", "b"]})));
        });
    let store = Store::with_config(def, strict()).unwrap();
    let (calls, listener) = counting();
    let _listening = store.subscribe("*", &listener).unwrap();
    let intercepted = Rc::new(Cell::new(0));
    let hits = Rc::clone(&intercepted);
    let _intercepting = store
        .intercept("*", move |ctx| {
            hits.set(hits.get() + 1);
            ctx.allow_action();
        })
        .unwrap();

    store.actions().call("reset", &[]).unwrap();
    assert_eq!(calls.get(), 0);
    assert_eq!(intercepted.get(), 0);
}

#[test]
fn test_set_additions_stay_at_collection_path() {
    let def = StoreDef::new()
        .data("g", Value::object([("s", Value::set(Vec::<i64>::new()))]))
        .action("add", |s, args| {
            let set = Observed::Object(s.clone())
                .resolve(&["g", "s"])
                .and_then(|o| o.as_set().cloned())
                .unwrap();
            for arg in args {
                set.add(arg.clone());
            }
        });
    let store = Store::with_config(def, strict()).unwrap();

    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&events);
    let _intercepting = store
        .intercept("*", move |ctx| {
            sink.borrow_mut().push(ctx.intercepted().event.clone());
            ctx.allow_action();
        })
        .unwrap();
    let (calls, listener) = counting();
    let _listening = store.subscribe("g.s", &listener).unwrap();

    store
        .actions()
        .call("add", &[Value::from(1), Value::from(2), Value::from(3)])
        .unwrap();

    assert_eq!(calls.get(), 3);
    assert_eq!(*events.borrow(), vec!["g", "g", "g"]);
    assert_eq!(store.get("g.s").unwrap(), Some(Value::set([1, 2, 3])));
}

#[test]
fn test_map_entries_dispatch_map_path() {
    let def = StoreDef::new()
        .data("prices", Value::map([("tea", 3)]))
        .action("price", |s, args| {
            let map = s.get("prices").and_then(|o| o.as_map().cloned()).unwrap();
            map.set(args[0].clone(), args[1].clone());
        });
    let store = Store::with_config(def, strict()).unwrap();
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    let _handle = store
        .listen("prices", move |v| sink.borrow_mut().push(v.clone()))
        .unwrap();

    store
        .actions()
        .call("price", &[Value::from("tea"), Value::from(3)])
        .unwrap()
        .call("price", &[Value::from("coffee"), Value::from(4)])
        .unwrap();

    assert_eq!(
        *seen.borrow(),
        vec![Value::map([("tea", 3), ("coffee", 4)])]
    );
}

#[test]
fn test_array_push_notifies_owner() {
    let def = StoreDef::new()
        .data("todos", json!({"items": []}))
        .action("add", |s, args| {
            let items = Observed::Object(s.clone())
                .resolve(&["todos", "items"])
                .and_then(|o| o.as_array().cloned())
                .unwrap();
            items.push(args[0].clone());
        });
    let store = Store::with_config(def, strict()).unwrap();
    let (calls, listener) = counting();
    let _handle = store.subscribe("todos", &listener).unwrap();

    store
        .actions()
        .call("add", &[Value::from(json!({"title": "docs", "done": false}))])
        .unwrap();

    assert_eq!(calls.get(), 1);
    assert_eq!(
        store.get("todos.items.0.title").unwrap(),
        Some(Value::from("docs"))
    );
}

#[test]
fn test_large_integer_change_notifies() {
    let def = StoreDef::new()
        .data("id", 9_007_199_254_740_992_i64)
        .action("set_id", |s, args| s.set("id", args[0].clone()));
    let store = Store::with_config(def, strict()).unwrap();
    let (calls, listener) = counting();
    let _handle = store.subscribe("id", &listener).unwrap();

    store
        .actions()
        .call("set_id", &[Value::from(9_007_199_254_740_993_i64)])
        .unwrap();

    assert_eq!(calls.get(), 1);
    assert_eq!(
        store.get("id").unwrap(),
        Some(Value::from(9_007_199_254_740_993_i64))
    );
}

#[test]
fn test_array_write_past_end_leaves_state() {
    let def = StoreDef::new()
        .data("list", json!([1, 2]))
        .action("put_at", |s, args| {
            let list = s.get("list").and_then(|o| o.as_array().cloned()).unwrap();
            let index = args[0].as_i64().map_or(usize::MAX, |i| i as usize);
            list.set(index, args[1].clone());
        });
    let store = Store::with_config(def, strict()).unwrap();
    let (calls, listener) = counting();
    let _handle = store.subscribe("list", &listener).unwrap();

    store
        .actions()
        .call("put_at", &[Value::Null, Value::from(1)])
        .unwrap()
        .call("put_at", &[Value::from(5), Value::from(1)])
        .unwrap();
    assert_eq!(calls.get(), 0);
    assert_eq!(store.get("list").unwrap(), Some(Value::from(json!([1, 2]))));

    store
        .actions()
        .call("put_at", &[Value::from(2), Value::from(3)])
        .unwrap();
    assert_eq!(calls.get(), 1);
    assert_eq!(store.get("list").unwrap(), Some(Value::from(json!([1, 2, 3]))));
}

// --- Groups ---

#[test]
fn test_group_branches_are_isolated() {
    let todos = StoreDef::new()
        .data("items", Value::from(Vec::<Value>::new()))
        .action("add", |todos, args| {
            let items = todos.get("items").and_then(|o| o.as_array().cloned()).unwrap();
            items.push(args[0].clone());
        });
    let user = StoreDef::new().data("name", "ada").action("rename", |user, args| {
        user.set("name", args[0].clone());
    });
    let store = Store::with_config(StoreDef::new().branch("todos", todos).branch("user", user), strict())
        .unwrap();
    assert_eq!(store.topology(), Topology::Group);

    let (todo_calls, todo_listener) = counting();
    let _t = store.subscribe("todos", &todo_listener).unwrap();
    let (user_calls, user_listener) = counting();
    let _u = store.subscribe("user.name", &user_listener).unwrap();

    store.actions().call("todos.add", &[Value::from("write")]).unwrap();
    store
        .actions()
        .branch("user")
        .unwrap()
        .call("rename", &[Value::from("grace")])
        .unwrap();

    assert_eq!(todo_calls.get(), 1);
    assert_eq!(user_calls.get(), 1);
    assert_eq!(
        store.snapshot(),
        Value::from(json!({"todos": {"items": ["write"]}, "user": {"name": "grace"}}))
    );
    assert!(store.actions().branch("user").unwrap().contains("rename"));
}

#[test]
fn test_plain_records_form_a_group() {
    let store =
        Store::from_value_with_config(json!({"a": {"x": 1}, "b": {"y": 2}}), strict()).unwrap();
    assert_eq!(store.topology(), Topology::Group);
    assert_eq!(store.get("b.y").unwrap(), Some(Value::from(2)));
    assert!(store.actions().branch("a").unwrap().names().is_empty());
}

// --- Snapshots ---

#[test]
fn test_snapshots_are_detached() {
    let store = Store::with_config(counter().data("meta", json!({"v": 1})), strict()).unwrap();

    let first = store.get_snapshot(None).unwrap().unwrap();
    let second = store.get_snapshot(None).unwrap().unwrap();
    assert_eq!(first, second);

    store.actions().call("inc", &[]).unwrap();
    let third = store.snapshot();
    assert_ne!(first, third);
    assert_eq!(third.get("count"), Some(&Value::from(1)));
    assert_eq!(third.get("meta"), first.get("meta"));
    assert_eq!(first.get("count"), Some(&Value::from(0)));
}

// --- Re-entrancy ---

#[test]
fn test_listener_may_trigger_actions() {
    let def = counter().data("mirror", 0).action("sync", |s, _| {
        let count = s.value("count").unwrap_or_default();
        s.set("mirror", count);
    });
    let store = Rc::new(Store::with_config(def, strict()).unwrap());

    let weak = Rc::downgrade(&store);
    let _handle = store
        .listen("count", move |_| {
            if let Some(store) = weak.upgrade() {
                store.actions().call("sync", &[]).unwrap();
            }
        })
        .unwrap();
    let (mirror_calls, listener) = counting();
    let _mirror = store.subscribe("mirror", &listener).unwrap();

    store.actions().call("inc", &[Value::from(7)]).unwrap();

    assert_eq!(store.get("mirror").unwrap(), Some(Value::from(7)));
    assert_eq!(mirror_calls.get(), 1);
}

#[test]
fn test_unsubscribe_during_dispatch() {
    let store = Store::with_config(counter(), strict()).unwrap();
    let handle: Rc<RefCell<Option<reactive_store::Unsubscribe>>> = Rc::new(RefCell::new(None));
    let slot = Rc::clone(&handle);
    let calls = Rc::new(Cell::new(0));
    let hits = Rc::clone(&calls);
    let once = Listener::new(move || {
        hits.set(hits.get() + 1);
        if let Some(handle) = slot.borrow_mut().take() {
            handle.unsubscribe();
        }
    });
    *handle.borrow_mut() = Some(store.subscribe("count", &once).unwrap());

    store.actions().call("inc", &[]).unwrap().call("inc", &[]).unwrap();
    assert_eq!(calls.get(), 1);
    assert_eq!(store.listener_count(), 0);
}
