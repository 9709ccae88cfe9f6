#![forbid(unsafe_code)]

//! The seam between the engine and the host-owned element tree.
//!
//! The host application owns the container and may destroy and recreate
//! it (or any child) at any moment. The engine therefore never holds a
//! long-lived handle to an element: every operation on [`NavContainer`]
//! takes an id and resolves it fresh inside the call. A `false` return
//! from a setter means "that id is not here right now", which is an
//! expected outcome, not an error.

#[cfg(any(test, feature = "test-helpers"))]
use std::collections::BTreeMap;

/// Stable identity of a navigable entry, unique within one container
/// snapshot. May refer to an element that no longer exists.
pub type ItemId = String;

/// Opaque identity of a container instance.
///
/// The host may replace the container wholesale during single-page
/// navigation; when it does, the new instance must report a different
/// `ContainerId` so the runtime can detach stale watchers.
pub type ContainerId = u64;

/// Naming convention that marks an element as a managed item.
///
/// Hosts tag items with ids following a fixed convention, either a
/// prefix (`"sb_"` style) or a substring anywhere in the id. An empty
/// convention matches every id-bearing element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdConvention {
    /// Required id prefix, if any.
    pub prefix: Option<String>,
    /// Required substring, if any. Checked only when `prefix` misses.
    pub contains: Option<String>,
}

impl IdConvention {
    /// Convention matching ids that start with `prefix`.
    pub fn prefixed(prefix: impl Into<String>) -> Self {
        Self {
            prefix: Some(prefix.into()),
            contains: None,
        }
    }

    /// Whether a raw element id names a managed item.
    pub fn matches(&self, raw: &str) -> bool {
        if raw.is_empty() {
            return false;
        }
        match (&self.prefix, &self.contains) {
            (Some(p), _) if raw.starts_with(p.as_str()) => true,
            (_, Some(s)) => raw.contains(s.as_str()),
            (Some(_), None) => false,
            (None, None) => true,
        }
    }
}

/// A live view onto the host's item container.
///
/// Implementations resolve ids at call time; nothing returned from one
/// call is valid input to a later one except the ids themselves.
pub trait NavContainer {
    /// Identity of this container instance. Changes when the host swaps
    /// the container out from under us.
    fn identity(&self) -> ContainerId;

    /// Ids of items currently present, in current visual order.
    fn item_ids(&self) -> Vec<ItemId>;

    /// Whether the item's row is still a direct child of this container.
    fn is_attached(&self, id: &str) -> bool;

    /// Assign the numeric ordering key controlling visual position.
    /// Returns `false` if no live element carries this id.
    fn set_order_key(&mut self, id: &str, key: i64) -> bool;

    /// Force the item visible or not. Returns `false` if the id is gone.
    fn set_hidden(&mut self, id: &str, hidden: bool) -> bool;
}

/// In-memory fake container for tests.
///
/// Records every order key and visibility change so tests can assert the
/// exact arrangement an apply pass produced. Items can be detached
/// (present but no longer a direct child) to model the host tearing rows
/// out mid-render.
#[cfg(any(test, feature = "test-helpers"))]
#[derive(Debug, Clone)]
pub struct ScriptedContainer {
    identity: ContainerId,
    items: Vec<ItemId>,
    detached: std::collections::BTreeSet<ItemId>,
    order_keys: BTreeMap<ItemId, i64>,
    hidden: BTreeMap<ItemId, bool>,
}

#[cfg(any(test, feature = "test-helpers"))]
impl ScriptedContainer {
    pub fn new(identity: ContainerId, items: &[&str]) -> Self {
        Self {
            identity,
            items: items.iter().map(|s| (*s).to_string()).collect(),
            detached: Default::default(),
            order_keys: BTreeMap::new(),
            hidden: BTreeMap::new(),
        }
    }

    /// Model the host removing an item between passes.
    pub fn remove(&mut self, id: &str) {
        self.items.retain(|i| i != id);
        self.order_keys.remove(id);
        self.hidden.remove(id);
    }

    /// Model an item whose element exists but whose row left the
    /// container (e.g. mid-teardown).
    pub fn detach(&mut self, id: &str) {
        self.detached.insert(id.to_string());
    }

    pub fn order_key(&self, id: &str) -> Option<i64> {
        self.order_keys.get(id).copied()
    }

    pub fn is_hidden(&self, id: &str) -> bool {
        self.hidden.get(id).copied().unwrap_or(false)
    }

    /// Snapshot of all assigned keys and visibility, for idempotence
    /// comparisons.
    pub fn arrangement(&self) -> (BTreeMap<ItemId, i64>, BTreeMap<ItemId, bool>) {
        (self.order_keys.clone(), self.hidden.clone())
    }

    /// Item ids sorted by assigned order key, original order breaking
    /// ties (mirrors a stable flex-order sort in the host).
    pub fn visual_order(&self) -> Vec<ItemId> {
        let mut indexed: Vec<(i64, usize, ItemId)> = self
            .items
            .iter()
            .enumerate()
            .map(|(pos, id)| (self.order_key(id).unwrap_or(i64::MAX), pos, id.clone()))
            .collect();
        indexed.sort();
        indexed.into_iter().map(|(_, _, id)| id).collect()
    }
}

#[cfg(any(test, feature = "test-helpers"))]
impl NavContainer for ScriptedContainer {
    fn identity(&self) -> ContainerId {
        self.identity
    }

    fn item_ids(&self) -> Vec<ItemId> {
        self.items.clone()
    }

    fn is_attached(&self, id: &str) -> bool {
        self.items.iter().any(|i| i == id) && !self.detached.contains(id)
    }

    fn set_order_key(&mut self, id: &str, key: i64) -> bool {
        if !self.items.iter().any(|i| i == id) {
            return false;
        }
        self.order_keys.insert(id.to_string(), key);
        true
    }

    fn set_hidden(&mut self, id: &str, hidden: bool) -> bool {
        if !self.items.iter().any(|i| i == id) {
            return false;
        }
        self.hidden.insert(id.to_string(), hidden);
        true
    }
}
