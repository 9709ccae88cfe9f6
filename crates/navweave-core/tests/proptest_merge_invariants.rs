//! Property tests for the merge policy and reconciliation invariants.

use std::collections::BTreeSet;

use navweave_core::{LayoutState, NavContainer, ReconciliationEngine, ScriptedContainer};
use proptest::prelude::*;

fn item_id() -> impl Strategy<Value = String> {
    // Small alphabet so merges actually collide.
    prop::sample::select(vec![
        "sb_home", "sb_contacts", "sb_calendar", "sb_tasks", "sb_billing", "sb_reports",
        "sb_settings", "sb_automation",
    ])
    .prop_map(str::to_string)
}

fn partial_edit() -> impl Strategy<Value = (Vec<String>, BTreeSet<String>)> {
    (
        prop::collection::vec(item_id(), 0..6),
        prop::collection::btree_set(item_id(), 0..4),
    )
}

proptest! {
    /// For all sequences of merges, `order` contains each id at most once.
    #[test]
    fn merge_never_duplicates(edits in prop::collection::vec(partial_edit(), 1..12)) {
        let mut state = LayoutState::empty_loaded();
        for (order, hidden) in &edits {
            state.merge_partial(order, hidden);
            let unique: BTreeSet<&String> = state.order.iter().collect();
            prop_assert_eq!(unique.len(), state.order.len());
        }
    }

    /// Ids outside the partial view keep both their relative order and
    /// their hidden status.
    #[test]
    fn merge_preserves_out_of_view_ids(
        (order, hidden) in partial_edit(),
        global in prop::collection::vec(item_id(), 0..8),
        global_hidden in prop::collection::btree_set(item_id(), 0..4),
    ) {
        let mut state = LayoutState::from_parts(global, global_hidden);
        let before_order = state.order.clone();
        let before_hidden = state.hidden.clone();
        let in_view: BTreeSet<&String> = order.iter().collect();

        state.merge_partial(&order, &hidden);

        let untouched_before: Vec<&String> =
            before_order.iter().filter(|id| !in_view.contains(id)).collect();
        let untouched_after: Vec<&String> =
            state.order.iter().filter(|id| !in_view.contains(id)).collect();
        prop_assert_eq!(untouched_before, untouched_after);

        for id in before_hidden.iter().filter(|id| !in_view.contains(id)) {
            // Out-of-view hidden membership survives unless the edit
            // explicitly re-hides it (a superset, still hidden).
            prop_assert!(state.hidden.contains(id));
        }
    }

    /// Applying the same state twice leaves the container arrangement
    /// byte-identical.
    #[test]
    fn apply_is_idempotent(
        present in prop::collection::vec(item_id(), 0..8),
        (order, hidden) in partial_edit(),
    ) {
        let present_refs: Vec<&str> = present.iter().map(String::as_str).collect();
        let mut container = ScriptedContainer::new(7, &present_refs);
        let state = LayoutState::from_parts(order, hidden);

        ReconciliationEngine::apply(&state, &mut container);
        let first = container.arrangement();
        ReconciliationEngine::apply(&state, &mut container);
        prop_assert_eq!(container.arrangement(), first);
    }

    /// States referencing absent ids never panic and never displace the
    /// present ids from their designated slots.
    #[test]
    fn apply_tolerates_missing_ids(
        present in prop::collection::vec(item_id(), 1..5),
        absent_count in 0usize..4,
    ) {
        // Ids are unique within a container snapshot.
        let mut seen = BTreeSet::new();
        let present: Vec<String> = present.into_iter().filter(|id| seen.insert(id.clone())).collect();
        let present_refs: Vec<&str> = present.iter().map(String::as_str).collect();
        let mut container = ScriptedContainer::new(9, &present_refs);

        let mut order: Vec<String> = present.clone();
        for i in 0..absent_count {
            order.insert(i % (order.len() + 1), format!("ghost_{i}"));
        }
        let state = LayoutState::from_parts(order.clone(), BTreeSet::new());
        ReconciliationEngine::apply(&state, &mut container);

        let expected: Vec<String> = state
            .order
            .iter()
            .filter(|id| container.is_attached(id.as_str()))
            .cloned()
            .collect();
        let visual: Vec<String> = container
            .visual_order()
            .into_iter()
            .filter(|id| expected.contains(id))
            .collect();
        prop_assert_eq!(visual, expected);
    }
}
