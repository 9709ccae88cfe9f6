#![forbid(unsafe_code)]

//! The single source of truth for desired order and visibility.
//!
//! [`LayoutState`] lives for the whole page session, owned by the runtime
//! session context. It is populated twice at startup (synchronously from
//! the local cache, then authoritatively from the remote store) and
//! mutated afterwards only through [`LayoutState::merge_partial`].
//!
//! # Partial views
//!
//! The host renders a different subset of items on each of its pages, so
//! an editor save only ever covers the items visible right now. Merging
//! such a partial edit must not erase customizations belonging to items
//! rendered elsewhere. `merge_partial` is the only append path into
//! `order` and enforces the no-duplicates invariant at that single site.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::container::ItemId;

/// Desired arrangement of managed items.
///
/// `order` may reference ids not currently present (future or stale
/// items) and may omit ids that are present (never-customized items).
/// `hidden` is independent of `order`: an id can be hidden without ever
/// having been reordered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutState {
    /// Explicitly ordered ids, first-to-last. No duplicates.
    #[serde(default)]
    pub order: Vec<ItemId>,
    /// Ids that must not be visible.
    #[serde(default)]
    pub hidden: BTreeSet<ItemId>,
    /// Whether this state has been populated from cache or remote.
    /// Reconciliation never runs against an unloaded state, so a default
    /// layout is never flashed over a customized one.
    #[serde(skip)]
    pub loaded: bool,
}

impl LayoutState {
    /// An empty, unloaded state. Reconciliation ignores it.
    pub fn unloaded() -> Self {
        Self::default()
    }

    /// An empty but loaded state: "this tenant has no customization".
    pub fn empty_loaded() -> Self {
        Self {
            loaded: true,
            ..Self::default()
        }
    }

    /// A loaded state from persisted order/hidden pairs. Duplicate ids in
    /// `order` are dropped after their first occurrence.
    pub fn from_parts(order: Vec<ItemId>, hidden: BTreeSet<ItemId>) -> Self {
        let mut seen = BTreeSet::new();
        let order = order.into_iter().filter(|id| seen.insert(id.clone())).collect();
        Self {
            order,
            hidden,
            loaded: true,
        }
    }

    /// Fold an edit made over a partial view into this global state.
    ///
    /// `partial_order` lists, in desired sequence, the items that were
    /// visible and editable when the user saved; `partial_hidden` the
    /// subset of those the user wants hidden.
    ///
    /// - Ids in `partial_order` are pulled out of the existing order and
    ///   re-appended in their new sequence at the end.
    /// - Ids in `partial_order` get their hidden membership replaced by
    ///   membership in `partial_hidden`; ids outside the partial view
    ///   keep whatever hidden status they had.
    /// - Ids in `partial_hidden` that are not in `partial_order` are
    ///   still added to the hidden set (an explicit edit).
    ///
    /// Saving on a page that only renders items A1..A5 therefore never
    /// erases the saved order or hidden status of items from other pages.
    pub fn merge_partial(&mut self, partial_order: &[ItemId], partial_hidden: &BTreeSet<ItemId>) {
        let incoming: BTreeSet<&ItemId> = partial_order.iter().collect();

        // Re-appended ids leave their old slot first; this is what keeps
        // `order` duplicate-free.
        self.order.retain(|id| !incoming.contains(id));
        let mut appended = BTreeSet::new();
        for id in partial_order {
            if appended.insert(id.clone()) {
                self.order.push(id.clone());
            }
        }

        for id in partial_order {
            if partial_hidden.contains(id) {
                self.hidden.insert(id.clone());
            } else {
                self.hidden.remove(id);
            }
        }
        for id in partial_hidden {
            self.hidden.insert(id.clone());
        }

        self.loaded = true;
        tracing::debug!(
            order_len = self.order.len(),
            hidden_len = self.hidden.len(),
            partial_len = partial_order.len(),
            "merged partial edit"
        );
    }
}
