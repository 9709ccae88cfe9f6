#![forbid(unsafe_code)]

//! Three-pass reconciliation of a [`LayoutState`] onto a container.
//!
//! The container belongs to the host application, which re-renders it on
//! its own schedule. The engine therefore never moves elements around in
//! the tree; it assigns numeric ordering keys and toggles visibility,
//! which survive (and compose with) the host's own renders far better
//! than re-parenting would.
//!
//! Absence is expected, not exceptional: ids in the state that have no
//! live element this pass are skipped silently, and the pass always runs
//! to completion.

use crate::container::NavContainer;
use crate::state::LayoutState;

/// What one apply pass touched. Useful for logging and tests; callers
/// are free to ignore it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplyStats {
    /// Items present in the container at pass time.
    pub present: usize,
    /// Ids from `state.order` that resolved to an attached element.
    pub ordered: usize,
    /// Ids from `state.hidden` that resolved to a live element.
    pub hidden: usize,
}

/// Deterministic, idempotent applier of layout state.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReconciliationEngine;

impl ReconciliationEngine {
    /// Force the container's visual order and visibility to match
    /// `state`. Safe to call arbitrarily often; a second call with the
    /// same inputs assigns the identical keys and visibility.
    ///
    /// Does nothing while `state.loaded` is false, so a default layout
    /// is never flashed before the saved one arrives.
    ///
    /// Passes, each over the container's *current* children:
    ///
    /// 1. reset: every present item gets a neutral key one past the last
    ///    explicit index and is made visible. Items unknown to `order`
    ///    keep their original relative order (stable tie-break) and sort
    ///    after every explicitly ordered item.
    /// 2. order: each id of `state.order` still attached to the
    ///    container gets its index as key.
    /// 3. hidden: each resolvable id of `state.hidden` is forced
    ///    non-visible, independent of its key.
    pub fn apply(state: &LayoutState, container: &mut dyn NavContainer) -> ApplyStats {
        if !state.loaded {
            tracing::trace!("skipping apply: state not loaded");
            return ApplyStats::default();
        }

        let mut stats = ApplyStats::default();
        let neutral = state.order.len() as i64;

        let present = container.item_ids();
        stats.present = present.len();
        for id in &present {
            container.set_order_key(id, neutral);
            container.set_hidden(id, false);
        }

        for (idx, id) in state.order.iter().enumerate() {
            if !container.is_attached(id) {
                continue;
            }
            if container.set_order_key(id, idx as i64) {
                stats.ordered += 1;
            }
        }

        for id in &state.hidden {
            if container.set_hidden(id, true) {
                stats.hidden += 1;
            }
        }

        tracing::debug!(
            container = container.identity(),
            present = stats.present,
            ordered = stats.ordered,
            hidden = stats.hidden,
            "applied layout state"
        );
        stats
    }
}
