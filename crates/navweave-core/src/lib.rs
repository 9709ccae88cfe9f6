#![forbid(unsafe_code)]

//! navweave core
//!
//! Data model and deterministic algorithms for reconciling a foreign,
//! asynchronously re-rendering item container against a single source of
//! truth for desired order and visibility.
//!
//! # Key Components
//!
//! - [`LayoutState`] - the owned record of desired order + hidden set
//! - [`LayoutState::merge_partial`] - folds an edit made over a partial
//!   view into the global state without clobbering out-of-view edits
//! - [`ReconciliationEngine`] - idempotent three-pass apply of a
//!   [`LayoutState`] onto a [`NavContainer`]
//! - [`NavContainer`] - the seam to the host-owned element tree; elements
//!   are always re-resolved by id at the moment of use
//!
//! # Role in navweave
//! `navweave-core` is pure logic: no IO, no clocks, no network. The store
//! crate persists [`LayoutState`]; the runtime crate decides *when* to
//! call [`ReconciliationEngine::apply`].

pub mod container;
pub mod error;
pub mod reconcile;
pub mod state;

pub use container::{ContainerId, IdConvention, ItemId, NavContainer};
#[cfg(any(test, feature = "test-helpers"))]
pub use container::ScriptedContainer;
pub use error::{EngineError, Result};
pub use reconcile::{ApplyStats, ReconciliationEngine};
pub use state::LayoutState;
