//! Main Store struct tying all components together.

use crate::actions::{bind, ActionTable, Bound, StoreDef};
use crate::error::{Result, StoreError};
use crate::hub::Hub;
use crate::interception::{Interception, Interceptor};
use crate::observable::{Observed, ObservedObject};
use crate::path::{self, Selector};
use crate::source::SnapshotSource;
use crate::subscriptions::{Listener, Unsubscribe};
use crate::types::{Topology, Value};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use tracing::{debug, warn};

/// Whether input checks run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Validation {
    /// Violations return a descriptive [`StoreError`].
    Strict,
    /// Checks are skipped; malformed input degrades to a no-op.
    Off,
}

impl Default for Validation {
    fn default() -> Self {
        if cfg!(debug_assertions) {
            Validation::Strict
        } else {
            Validation::Off
        }
    }
}

/// Store configuration.
#[derive(Clone, Debug, Default)]
pub struct StoreConfig {
    /// Validation mode for every operation of the store.
    pub validation: Validation,

    /// Label attached to the store's log lines.
    pub name: Option<String>,
}

/// Result of [`Store::select`].
#[derive(Debug)]
pub enum Selection<'a> {
    /// Plain data at the path, if anything is there.
    Value(Option<Value>),
    /// Action table selected with a trailing `_A` segment.
    Actions(Option<&'a ActionTable>),
}

/// A reactive store.
///
/// Provides a unified interface for:
/// - Reading plain snapshots of the whole store or any path
/// - Invoking bound actions, the only sanctioned way to mutate
/// - Listening to changes below a path
/// - Intercepting mutations before they commit
pub struct Store {
    /// Store configuration.
    config: StoreConfig,

    /// Registries shared with every wrapper of the live graph.
    hub: Rc<Hub>,

    /// Live root record.
    root: ObservedObject,

    /// Bound actions.
    actions: ActionTable,

    topology: Topology,
}

impl Store {
    /// Build a store with the default configuration.
    pub fn new(def: StoreDef) -> Result<Self> {
        Self::with_config(def, StoreConfig::default())
    }

    /// Build a store.
    pub fn with_config(def: StoreDef, config: StoreConfig) -> Result<Self> {
        let hub = Rc::new(Hub::new(config.validation));
        let Bound {
            root,
            actions,
            topology,
        } = bind(def, &hub)?;

        debug!(
            store = config.name.as_deref().unwrap_or("store"),
            topology = ?topology,
            fields = root.len(),
            "store created"
        );

        Ok(Self {
            config,
            hub,
            root,
            actions,
            topology,
        })
    }

    /// Data-only store from a plain record.
    pub fn from_value(value: impl Into<Value>) -> Result<Self> {
        Self::from_value_with_config(value, StoreConfig::default())
    }

    pub fn from_value_with_config(value: impl Into<Value>, config: StoreConfig) -> Result<Self> {
        let value = value.into();
        if !matches!(value, Value::Object(_)) {
            if config.validation == Validation::Strict {
                return Err(StoreError::shape(
                    "create",
                    format!("initial data must be a record, got {}", value.kind()),
                ));
            }
            warn!(kind = value.kind(), "initial data is not a record; store starts empty");
        }
        Self::with_config(StoreDef::from_value(value), config)
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn topology(&self) -> Topology {
        self.topology
    }

    /// Bound actions; serves as the store's dispatcher.
    pub fn actions(&self) -> &ActionTable {
        &self.actions
    }

    /// Plain snapshot of the whole store.
    pub fn snapshot(&self) -> Value {
        self.root.to_value()
    }

    /// Plain value at `path`.
    ///
    /// `""` and `"*"` select the whole store. A trailing `_D` segment selects
    /// the data at that level. `_A` selects action tables, which are not
    /// data; use [`Store::select`] for those.
    pub fn get(&self, path: &str) -> Result<Option<Value>> {
        match self.select(path)? {
            Selection::Value(value) => Ok(value),
            Selection::Actions(_) => {
                if self.is_strict() {
                    return Err(StoreError::path(
                        "get",
                        format!("`{path}` selects an action table; use select"),
                    ));
                }
                Ok(None)
            }
        }
    }

    /// Data or action table at `path`.
    pub fn select(&self, path: &str) -> Result<Selection<'_>> {
        if self.is_strict() && !path.is_empty() && !path::is_well_formed(path) {
            return Err(StoreError::path("select", format!("malformed path `{path}`")));
        }
        Ok(match Selector::parse(path) {
            Selector::Actions(segments) => Selection::Actions(self.actions.resolve(&segments)),
            selector => Selection::Value(read(&self.root, &selector)),
        })
    }

    /// One-shot snapshot: the whole store, or the value at `path`.
    pub fn get_snapshot(&self, path: Option<&str>) -> Result<Option<Value>> {
        match path {
            None => Ok(Some(self.snapshot())),
            Some(path) => self.get(path),
        }
    }

    /// Register a raw listener at `path`. It fires on every dispatch that
    /// reaches the path, whether or not the value there changed.
    pub fn subscribe(&self, path: &str, listener: &Listener) -> Result<Unsubscribe> {
        let selector = self.validate_target("subscribe", path)?;
        Ok(attach_listener(
            &self.hub,
            selector.event_path(),
            listener.clone(),
        ))
    }

    /// Call `callback` with the new value at `path` whenever it changes.
    ///
    /// Dispatches that leave the value at `path` deep-equal to the last one
    /// seen are swallowed.
    pub fn listen(&self, path: &str, callback: impl Fn(&Value) + 'static) -> Result<Unsubscribe> {
        let selector = self.validate_target("listen", path)?;
        let event = selector.event_path();
        let last = RefCell::new(read(&self.root, &selector).unwrap_or_default());
        let root = self.root.downgrade();

        let listener = Listener::new(move || {
            let Some(root) = root.upgrade() else {
                return;
            };
            let current = read(&root, &selector).unwrap_or_default();
            if current == *last.borrow() {
                return;
            }
            last.replace(current.clone());
            callback(&current);
        });
        Ok(attach_listener(&self.hub, event, listener))
    }

    /// Register an interceptor at `path`.
    pub fn intercept(
        &self,
        path: &str,
        callback: impl Fn(&Interception<'_>) + 'static,
    ) -> Result<Unsubscribe> {
        self.intercept_with(path, &Interceptor::new(callback))
    }

    /// Register an existing interceptor at `path`. Registering the same
    /// interceptor at several ancestors still invokes it once per mutation.
    pub fn intercept_with(&self, path: &str, interceptor: &Interceptor) -> Result<Unsubscribe> {
        let selector = self.validate_target("intercept", path)?;
        let event = selector.event_path();
        let id = interceptor.id();
        self.hub.interceptors.register(&event, interceptor.clone());

        let hub = Rc::downgrade(&self.hub);
        Ok(Unsubscribe::new(id, move || {
            if let Some(hub) = hub.upgrade() {
                hub.interceptors.unregister(&event, id);
            }
        }))
    }

    /// External-store view of `path` for a rendering layer.
    pub fn source(&self, path: &str) -> Result<SnapshotSource> {
        let selector = self.validate_target("source", path)?;
        Ok(SnapshotSource::new(
            Rc::clone(&self.hub),
            self.root.clone(),
            selector,
        ))
    }

    /// Number of distinct listeners registered.
    pub fn listener_count(&self) -> usize {
        self.hub.subscriptions.subscription_count()
    }

    /// Number of distinct interceptors registered.
    pub fn interceptor_count(&self) -> usize {
        self.hub.interceptors.interceptor_count()
    }

    fn is_strict(&self) -> bool {
        self.hub.is_strict()
    }

    /// Parse `path` for a registration, checking it when validating.
    fn validate_target(&self, operation: &'static str, path: &str) -> Result<Selector> {
        let selector = Selector::parse(path);
        if !self.is_strict() {
            return Ok(selector);
        }
        if !path::is_well_formed(path) {
            return Err(StoreError::path(
                operation,
                format!("`{path}` is not a usable path"),
            ));
        }
        let exists = match &selector {
            Selector::All => true,
            Selector::Data(segments) => Observed::Object(self.root.clone())
                .resolve(segments)
                .is_some(),
            Selector::Actions(segments) => self.actions.resolve(segments).is_some(),
        };
        if !exists {
            return Err(StoreError::listen_target(
                operation,
                format!("nothing at `{path}`"),
            ));
        }
        Ok(selector)
    }
}

impl fmt::Debug for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("config", &self.config)
            .field("topology", &self.topology)
            .field("data", &self.snapshot())
            .field("actions", &self.actions)
            .finish()
    }
}

/// Plain value selected by `selector`. Action selectors read as nothing.
pub(crate) fn read(root: &ObservedObject, selector: &Selector) -> Option<Value> {
    match selector {
        Selector::All => Some(root.to_value()),
        Selector::Data(segments) => Observed::Object(root.clone())
            .resolve(segments)
            .map(|found| found.to_value()),
        Selector::Actions(_) => None,
    }
}

/// Register `listener` at `event`, returning a handle that removes it again.
pub(crate) fn attach_listener(hub: &Rc<Hub>, event: String, listener: Listener) -> Unsubscribe {
    let id = listener.id();
    hub.subscriptions.subscribe(&event, listener);

    let hub = Rc::downgrade(hub);
    Unsubscribe::new(id, move || {
        if let Some(hub) = hub.upgrade() {
            hub.subscriptions.unsubscribe(&event, id);
        }
    })
}
