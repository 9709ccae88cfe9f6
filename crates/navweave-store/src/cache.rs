#![forbid(unsafe_code)]

//! Per-tenant local cache of the last-known layout state.
//!
//! The cache exists to close the gap between page load and the first
//! authoritative remote response: the state read here is applied
//! immediately and silently replaced once the remote answers. Reads are
//! synchronous and best-effort; a missing or corrupt record yields an
//! empty, unloaded state, never an error. Writes log their failures and
//! report nothing to the caller.

use std::collections::BTreeSet;
use std::fs;
use std::path::PathBuf;

use navweave_core::{ItemId, LayoutState};
use serde::{Deserialize, Serialize};

/// On-disk twin of [`LayoutState`]. No versioning field, matching the
/// persisted layout the engine has always used.
#[derive(Debug, Serialize, Deserialize)]
struct CacheRecord {
    order: Vec<ItemId>,
    hidden: BTreeSet<ItemId>,
}

/// Durable key-value persistence of the last-known layout state, one
/// JSON file per tenant.
#[derive(Debug, Clone)]
pub struct LocalCache {
    dir: PathBuf,
}

impl LocalCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn record_path(&self, tenant: &str) -> PathBuf {
        self.dir.join(format!("{}.json", sanitize_tenant(tenant)))
    }

    /// Read the cached state for a tenant. A hit is a *loaded* state,
    /// suitable for immediate provisional reconciliation; a miss (or a
    /// record that no longer parses) is empty and unloaded.
    pub fn load(&self, tenant: &str) -> LayoutState {
        let path = self.record_path(tenant);
        let Ok(bytes) = fs::read(&path) else {
            return LayoutState::unloaded();
        };
        match serde_json::from_slice::<CacheRecord>(&bytes) {
            Ok(record) => LayoutState::from_parts(record.order, record.hidden),
            Err(err) => {
                tracing::warn!(tenant, path = %path.display(), %err, "ignoring corrupt cache record");
                LayoutState::unloaded()
            }
        }
    }

    /// Persist the state for a tenant. Always succeeds from the caller's
    /// perspective; IO failures are logged and dropped.
    pub fn save(&self, tenant: &str, state: &LayoutState) {
        let record = CacheRecord {
            order: state.order.clone(),
            hidden: state.hidden.clone(),
        };
        if let Err(err) = self.write_record(tenant, &record) {
            tracing::warn!(tenant, %err, "cache write failed");
        }
    }

    /// Drop the cached record for a tenant (user-confirmed reset path).
    pub fn clear(&self, tenant: &str) {
        let path = self.record_path(tenant);
        if let Err(err) = fs::remove_file(&path) {
            if err.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(tenant, %err, "cache clear failed");
            }
        }
    }

    fn write_record(&self, tenant: &str, record: &CacheRecord) -> std::io::Result<()> {
        fs::create_dir_all(&self.dir)?;
        let json = serde_json::to_vec(record)?;
        fs::write(self.record_path(tenant), json)
    }
}

/// Tenant identifiers come from the hosting environment and may contain
/// characters unfit for file names.
fn sanitize_tenant(tenant: &str) -> String {
    let cleaned: String = tenant
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    if cleaned.is_empty() { "_".to_string() } else { cleaned }
}
