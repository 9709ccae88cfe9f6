#![forbid(unsafe_code)]

//! Normalization of every response shape the backend has ever produced.
//!
//! Older deployments returned the order/hidden pair at the top level;
//! later ones wrapped it one level down under a container key, and the
//! key itself changed across releases. The adapter stays compatible with
//! all of them at once: probe a fixed priority list of candidate objects
//! and take the first one that carries an `order` array.

use std::collections::BTreeSet;

use navweave_core::{ItemId, LayoutState};
use serde_json::Value;

/// Candidate wrapper keys, probed in order after the top level itself.
const ENVELOPE_KEYS: [&str; 4] = ["data", "settings", "sideMenu", "menu"];

/// Extract a [`LayoutState`] from a remote payload.
///
/// Probes the payload itself, then each of the known wrapper keys, for
/// the first object whose `order` member is an array. `hidden` is taken
/// from the same object (absent means empty). Non-string entries are
/// skipped. No candidate matching at all normalizes to the empty loaded
/// state rather than an error.
pub fn normalize_envelope(payload: &Value) -> LayoutState {
    let candidates = std::iter::once(payload)
        .chain(ENVELOPE_KEYS.iter().filter_map(|key| payload.get(key)));

    for candidate in candidates {
        let Some(order) = candidate.get("order").and_then(Value::as_array) else {
            continue;
        };
        let order: Vec<ItemId> = order
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect();
        let hidden: BTreeSet<ItemId> = candidate
            .get("hidden")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();
        return LayoutState::from_parts(order, hidden);
    }

    tracing::debug!("no recognizable envelope in payload, treating as empty state");
    LayoutState::empty_loaded()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn top_level_shape() {
        let s = normalize_envelope(&json!({"order": ["a", "b"], "hidden": ["b"]}));
        assert_eq!(s.order, vec!["a", "b"]);
        assert!(s.hidden.contains("b"));
        assert!(s.loaded);
    }

    #[test]
    fn nested_under_each_known_key() {
        for key in ["data", "settings", "sideMenu", "menu"] {
            let s = normalize_envelope(&json!({key: {"order": ["x"], "hidden": []}}));
            assert_eq!(s.order, vec!["x"], "key {key}");
        }
    }

    #[test]
    fn top_level_wins_over_nested() {
        let payload = json!({
            "order": ["top"],
            "data": {"order": ["nested"]}
        });
        assert_eq!(normalize_envelope(&payload).order, vec!["top"]);
    }

    #[test]
    fn probe_order_is_fixed() {
        // `data` outranks `menu` regardless of json object layout.
        let payload = json!({
            "menu": {"order": ["from_menu"]},
            "data": {"order": ["from_data"]}
        });
        assert_eq!(normalize_envelope(&payload).order, vec!["from_data"]);
    }

    #[test]
    fn candidate_without_order_array_is_skipped() {
        let payload = json!({
            "data": {"order": "not-an-array"},
            "menu": {"order": ["m"]}
        });
        assert_eq!(normalize_envelope(&payload).order, vec!["m"]);
    }

    #[test]
    fn missing_hidden_means_empty() {
        let s = normalize_envelope(&json!({"order": ["a"]}));
        assert!(s.hidden.is_empty());
    }

    #[test]
    fn non_string_entries_are_skipped() {
        let s = normalize_envelope(&json!({"order": ["a", 1, null, "b"], "hidden": [2, "a"]}));
        assert_eq!(s.order, vec!["a", "b"]);
        assert!(s.hidden.contains("a"));
        assert_eq!(s.hidden.len(), 1);
    }

    #[test]
    fn unrecognized_payload_is_empty_loaded() {
        for payload in [json!({}), json!(null), json!({"unrelated": true}), json!([1, 2])] {
            let s = normalize_envelope(&payload);
            assert!(s.order.is_empty());
            assert!(s.hidden.is_empty());
            assert!(s.loaded);
        }
    }

    #[test]
    fn duplicate_order_entries_collapse() {
        let s = normalize_envelope(&json!({"order": ["a", "b", "a"]}));
        assert_eq!(s.order, vec!["a", "b"]);
    }
}
