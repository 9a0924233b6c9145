//! Path-indexed callback sets shared by listeners and interceptors.

use crate::path::{ancestors, WILDCARD};
use std::collections::HashMap;
use std::rc::Rc;

/// Identity of a registered callback.
///
/// Two registrations share an identity when they hold the same allocation,
/// which is what dedup-per-dispatch keys on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CallbackId(usize);

impl CallbackId {
    pub(crate) fn of<T: ?Sized>(rc: &Rc<T>) -> Self {
        CallbackId(Rc::as_ptr(rc) as *const () as usize)
    }
}

/// Something that can live in a [`PathRegistry`].
pub(crate) trait Callback: Clone {
    fn id(&self) -> CallbackId;
}

/// A callback plus the number of registrations that reached this set.
///
/// The same callback registered under `"a.b"` and `"a.c"` lands in the `"a"`
/// set once; the count keeps it there until both are unsubscribed.
struct Registered<C> {
    callback: C,
    refs: usize,
}

/// Callbacks indexed by every ancestor segment of the path they were
/// registered under, plus a wildcard set.
pub(crate) struct PathRegistry<C> {
    wildcard: Vec<Registered<C>>,
    paths: HashMap<String, Vec<Registered<C>>>,
}

impl<C: Callback> PathRegistry<C> {
    pub(crate) fn new() -> Self {
        Self {
            wildcard: Vec::new(),
            paths: HashMap::new(),
        }
    }

    /// Register under `path` and each of its ancestors.
    pub(crate) fn insert(&mut self, path: &str, callback: C) {
        if path == WILDCARD {
            add(&mut self.wildcard, callback);
            return;
        }
        for segment in ancestors(path) {
            add(
                self.paths.entry(segment.to_string()).or_default(),
                callback.clone(),
            );
        }
    }

    /// Undo one [`insert`](Self::insert) of the same path.
    pub(crate) fn remove(&mut self, path: &str, id: CallbackId) {
        if path == WILDCARD {
            release(&mut self.wildcard, id);
            return;
        }
        for segment in ancestors(path) {
            if let Some(set) = self.paths.get_mut(segment) {
                release(set, id);
                if set.is_empty() {
                    self.paths.remove(segment);
                }
            }
        }
    }

    /// Wildcard callbacks in registration order.
    pub(crate) fn wildcard(&self) -> Vec<C> {
        self.wildcard.iter().map(|r| r.callback.clone()).collect()
    }

    /// Callbacks registered at exactly this segment, in registration order.
    pub(crate) fn at(&self, segment: &str) -> Option<Vec<C>> {
        self.paths
            .get(segment)
            .map(|set| set.iter().map(|r| r.callback.clone()).collect())
    }

    pub(crate) fn has_paths(&self) -> bool {
        !self.paths.is_empty()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.wildcard.is_empty() && self.paths.is_empty()
    }

    /// Distinct callbacks found walking `path` leaf-to-root, then the
    /// wildcard set.
    pub(crate) fn collect(&self, path: &str) -> Vec<C> {
        let mut found: Vec<C> = Vec::new();
        if self.has_paths() {
            for segment in ancestors(path) {
                if let Some(set) = self.paths.get(segment) {
                    for r in set {
                        if !found.iter().any(|c| c.id() == r.callback.id()) {
                            found.push(r.callback.clone());
                        }
                    }
                }
            }
        }
        for r in &self.wildcard {
            if !found.iter().any(|c| c.id() == r.callback.id()) {
                found.push(r.callback.clone());
            }
        }
        found
    }

    /// Number of distinct callbacks registered anywhere.
    pub(crate) fn distinct_count(&self) -> usize {
        let mut ids: Vec<CallbackId> = self.wildcard.iter().map(|r| r.callback.id()).collect();
        for set in self.paths.values() {
            for r in set {
                let id = r.callback.id();
                if !ids.contains(&id) {
                    ids.push(id);
                }
            }
        }
        ids.len()
    }
}

fn add<C: Callback>(set: &mut Vec<Registered<C>>, callback: C) {
    let id = callback.id();
    match set.iter_mut().find(|r| r.callback.id() == id) {
        Some(existing) => existing.refs += 1,
        None => set.push(Registered { callback, refs: 1 }),
    }
}

fn release<C: Callback>(set: &mut Vec<Registered<C>>, id: CallbackId) {
    if let Some(pos) = set.iter().position(|r| r.callback.id() == id) {
        set[pos].refs -= 1;
        if set[pos].refs == 0 {
            set.remove(pos);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone)]
    struct Tagged(Rc<&'static str>);

    impl Callback for Tagged {
        fn id(&self) -> CallbackId {
            CallbackId::of(&self.0)
        }
    }

    fn names(set: Option<Vec<Tagged>>) -> Vec<&'static str> {
        set.unwrap_or_default().iter().map(|p| *p.0).collect()
    }

    #[test]
    fn test_insert_registers_ancestors() {
        let mut registry = PathRegistry::new();
        registry.insert("a.b.c", Tagged(Rc::new("x")));

        assert_eq!(names(registry.at("a.b.c")), vec!["x"]);
        assert_eq!(names(registry.at("a.b")), vec!["x"]);
        assert_eq!(names(registry.at("a")), vec!["x"]);
        assert!(registry.at("b").is_none());
    }

    #[test]
    fn test_shared_ancestor_refcount() {
        let mut registry = PathRegistry::new();
        let tagged = Tagged(Rc::new("x"));
        registry.insert("a.b", tagged.clone());
        registry.insert("a.c", tagged.clone());
        assert_eq!(names(registry.at("a")), vec!["x"]);

        registry.remove("a.b", tagged.id());
        assert!(registry.at("a.b").is_none());
        assert_eq!(names(registry.at("a")), vec!["x"]);

        registry.remove("a.c", tagged.id());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_collect_dedups_and_orders() {
        let mut registry = PathRegistry::new();
        let leaf = Tagged(Rc::new("leaf"));
        let root = Tagged(Rc::new("root"));
        let any = Tagged(Rc::new("any"));
        registry.insert("a", root.clone());
        registry.insert("a.b", leaf.clone());
        registry.insert("a.b", root.clone());
        registry.insert(WILDCARD, any.clone());
        registry.insert(WILDCARD, root.clone());

        let found: Vec<&str> = registry.collect("a.b").iter().map(|p| *p.0).collect();
        assert_eq!(found, vec!["leaf", "root", "any"]);
        assert_eq!(registry.distinct_count(), 3);
    }

    #[test]
    fn test_wildcard_only() {
        let mut registry = PathRegistry::new();
        let any = Tagged(Rc::new("any"));
        registry.insert(WILDCARD, any.clone());
        assert!(!registry.has_paths());
        assert_eq!(registry.wildcard().len(), 1);

        registry.remove(WILDCARD, any.id());
        assert!(registry.is_empty());
    }
}
