#![forbid(unsafe_code)]

//! Tenant-scoped remote persistence.
//!
//! Three operations against the side-menu resource:
//!
//! - `GET /side-menu/{id}` — fetch, where 404 means "no customization
//!   yet" and normalizes to an empty loaded state
//! - `POST /side-menu/save/{id}` — fire-and-forget save
//! - `DELETE /side-menu/{id}` — user-confirmed reset
//!
//! The HTTP client sits behind the [`Transport`] trait so tests can run
//! against an in-memory store that echoes any of the historical envelope
//! shapes.

use std::collections::BTreeSet;

use navweave_core::{EngineError, ItemId, LayoutState, Result};
use serde_json::{Value, json};

use crate::envelope::normalize_envelope;

/// Status and body of one transport round trip.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: u16,
    /// Parsed body; `Value::Null` when the server sent none.
    pub body: Value,
}

impl TransportResponse {
    pub fn ok(body: Value) -> Self {
        Self { status: 200, body }
    }

    pub fn not_found() -> Self {
        Self {
            status: 404,
            body: Value::Null,
        }
    }

    fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Network boundary. Paths are relative to the store's base resource.
pub trait Transport {
    fn get(&self, path: &str) -> Result<TransportResponse>;
    fn post_json(&self, path: &str, body: &Value) -> Result<TransportResponse>;
    fn delete(&self, path: &str) -> Result<TransportResponse>;
}

/// Blocking HTTP transport carrying the bearer token supplied by the
/// hosting environment.
pub struct HttpTransport {
    client: reqwest::blocking::Client,
    base_url: String,
    auth_token: String,
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>, auth_token: impl Into<String>) -> Self {
        Self {
            client: reqwest::blocking::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            auth_token: auth_token.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn run(&self, req: reqwest::blocking::RequestBuilder) -> Result<TransportResponse> {
        let resp = req
            .bearer_auth(&self.auth_token)
            .send()
            .map_err(|e| EngineError::Network(e.to_string()))?;
        let status = resp.status().as_u16();
        let body = resp.json::<Value>().unwrap_or(Value::Null);
        Ok(TransportResponse { status, body })
    }
}

impl Transport for HttpTransport {
    fn get(&self, path: &str) -> Result<TransportResponse> {
        self.run(self.client.get(self.url(path)))
    }

    fn post_json(&self, path: &str, body: &Value) -> Result<TransportResponse> {
        self.run(self.client.post(self.url(path)).json(body))
    }

    fn delete(&self, path: &str) -> Result<TransportResponse> {
        self.run(self.client.delete(self.url(path)))
    }
}

/// Load/save/reset of layout state for a tenant.
pub struct RemoteStore<T: Transport> {
    transport: T,
}

impl<T: Transport> RemoteStore<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    /// Fetch the persisted state for a tenant.
    ///
    /// Returns `None` only when the round trip failed outright (network
    /// error or unexpected status); the caller keeps whatever state it
    /// already has. A 404 is a real answer and comes back as the empty
    /// loaded state.
    pub fn fetch_state(&self, tenant: &str) -> Option<LayoutState> {
        match self.transport.get(&format!("side-menu/{tenant}")) {
            Ok(resp) if resp.status == 404 => {
                tracing::debug!(tenant, "no remote customization yet");
                Some(LayoutState::empty_loaded())
            }
            Ok(resp) if resp.is_success() => Some(normalize_envelope(&resp.body)),
            Ok(resp) => {
                tracing::warn!(tenant, status = resp.status, "fetch rejected, keeping cached state");
                None
            }
            Err(err) => {
                tracing::warn!(tenant, %err, "fetch failed, keeping cached state");
                None
            }
        }
    }

    /// Persist order and hidden set. Fire-and-forget: the caller has
    /// already updated its in-memory state, so failures are only logged.
    pub fn save_state(&self, tenant: &str, order: &[ItemId], hidden: &BTreeSet<ItemId>) {
        let body = json!({
            "order": order,
            "hidden": hidden,
        });
        match self.transport.post_json(&format!("side-menu/save/{tenant}"), &body) {
            Ok(resp) if resp.is_success() => {
                tracing::debug!(tenant, items = order.len(), "saved layout state");
            }
            Ok(resp) => tracing::warn!(tenant, status = resp.status, "save rejected"),
            Err(err) => tracing::warn!(tenant, %err, "save failed"),
        }
    }

    /// Clear the tenant's persisted customization. This is the one
    /// operation whose failure surfaces: the user explicitly asked for
    /// it and the UI layer reports the outcome.
    pub fn reset_state(&self, tenant: &str) -> Result<()> {
        let resp = self.transport.delete(&format!("side-menu/{tenant}"))?;
        // A 404 reset is already done.
        if resp.is_success() || resp.status == 404 {
            tracing::debug!(tenant, "reset remote state");
            Ok(())
        } else {
            Err(EngineError::Http(resp.status))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::HashMap;

    use super::*;

    /// In-memory store echoing saves back in a configurable envelope
    /// shape, mimicking each backend deployment we have to stay
    /// compatible with.
    struct MemoryTransport {
        wrap_key: Option<&'static str>,
        records: RefCell<HashMap<String, Value>>,
        fail: bool,
    }

    impl MemoryTransport {
        fn new(wrap_key: Option<&'static str>) -> Self {
            Self {
                wrap_key,
                records: RefCell::new(HashMap::new()),
                fail: false,
            }
        }

        fn failing() -> Self {
            Self {
                wrap_key: None,
                records: RefCell::new(HashMap::new()),
                fail: true,
            }
        }
    }

    impl Transport for MemoryTransport {
        fn get(&self, path: &str) -> Result<TransportResponse> {
            if self.fail {
                return Err(EngineError::Network("connection refused".into()));
            }
            let tenant = path.rsplit('/').next().unwrap_or_default();
            match self.records.borrow().get(tenant) {
                Some(record) => {
                    let body = match self.wrap_key {
                        Some(key) => json!({ key: record }),
                        None => record.clone(),
                    };
                    Ok(TransportResponse::ok(body))
                }
                None => Ok(TransportResponse::not_found()),
            }
        }

        fn post_json(&self, path: &str, body: &Value) -> Result<TransportResponse> {
            if self.fail {
                return Err(EngineError::Network("connection refused".into()));
            }
            let tenant = path.rsplit('/').next().unwrap_or_default();
            self.records
                .borrow_mut()
                .insert(tenant.to_string(), body.clone());
            Ok(TransportResponse::ok(json!({"saved": true})))
        }

        fn delete(&self, path: &str) -> Result<TransportResponse> {
            if self.fail {
                return Err(EngineError::Network("connection refused".into()));
            }
            let tenant = path.rsplit('/').next().unwrap_or_default();
            match self.records.borrow_mut().remove(tenant) {
                Some(_) => Ok(TransportResponse::ok(Value::Null)),
                None => Ok(TransportResponse::not_found()),
            }
        }
    }

    fn ids(v: &[&str]) -> Vec<ItemId> {
        v.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn not_found_is_empty_loaded() {
        let store = RemoteStore::new(MemoryTransport::new(None));
        let state = store.fetch_state("t").unwrap();
        assert!(state.order.is_empty());
        assert!(state.loaded);
    }

    #[test]
    fn network_failure_yields_none() {
        let store = RemoteStore::new(MemoryTransport::failing());
        assert!(store.fetch_state("t").is_none());
    }

    #[test]
    fn save_then_fetch_roundtrips_in_every_envelope_shape() {
        for wrap in [None, Some("data"), Some("settings"), Some("sideMenu"), Some("menu")] {
            let store = RemoteStore::new(MemoryTransport::new(wrap));
            let order = ids(&["sb_home", "sb_tasks"]);
            let hidden: BTreeSet<ItemId> = ids(&["sb_tasks"]).into_iter().collect();

            store.save_state("t", &order, &hidden);
            let state = store.fetch_state("t").unwrap();
            assert_eq!(state.order, order, "wrap {wrap:?}");
            assert_eq!(state.hidden, hidden, "wrap {wrap:?}");
        }
    }

    #[test]
    fn save_failure_is_swallowed() {
        let store = RemoteStore::new(MemoryTransport::failing());
        // Must not panic or surface anything.
        store.save_state("t", &ids(&["a"]), &BTreeSet::new());
    }

    #[test]
    fn reset_clears_and_tolerates_absent_record() {
        let store = RemoteStore::new(MemoryTransport::new(None));
        store.save_state("t", &ids(&["a"]), &BTreeSet::new());
        assert!(store.reset_state("t").is_ok());
        // Gone now; fetch normalizes to empty.
        assert!(store.fetch_state("t").unwrap().order.is_empty());
        // Resetting an already-empty tenant (404) is still success.
        assert!(store.reset_state("t").is_ok());
    }

    #[test]
    fn reset_failure_surfaces() {
        let store = RemoteStore::new(MemoryTransport::failing());
        assert!(matches!(
            store.reset_state("t"),
            Err(EngineError::Network(_))
        ));
    }

    #[test]
    fn tenants_are_isolated() {
        let store = RemoteStore::new(MemoryTransport::new(Some("data")));
        store.save_state("a", &ids(&["one"]), &BTreeSet::new());
        store.save_state("b", &ids(&["two"]), &BTreeSet::new());
        assert_eq!(store.fetch_state("a").unwrap().order, ids(&["one"]));
        assert_eq!(store.fetch_state("b").unwrap().order, ids(&["two"]));
    }
}
