#![forbid(unsafe_code)]

//! navweave store
//!
//! Persistence edges for [`LayoutState`](navweave_core::LayoutState):
//!
//! - [`LocalCache`] - synchronous, best-effort per-tenant cache that
//!   eliminates the visible delay before the first remote response
//! - [`RemoteStore`] - tenant-scoped load/save/reset over a [`Transport`]
//! - envelope normalization across every response shape the backend has
//!   ever used
//!
//! Failure policy follows the engine-wide rule: a remote "not found" is a
//! valid empty state, anything else logs and leaves the caller on its
//! best known state. Only an explicit user reset reports failure upward.

pub mod cache;
pub mod envelope;
pub mod remote;

pub use cache::LocalCache;
pub use envelope::normalize_envelope;
pub use remote::{HttpTransport, RemoteStore, Transport, TransportResponse};
