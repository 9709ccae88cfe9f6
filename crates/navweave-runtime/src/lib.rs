#![forbid(unsafe_code)]

//! navweave runtime
//!
//! The orchestrator: owns the session context (layout state, drift
//! guard, tracked container identity) and decides *when* reconciliation
//! runs. Two event sources feed a single serialized pump:
//!
//! - a fixed-interval tick that re-locates the active container and
//!   re-establishes the change watch when the host swaps it out
//! - change notifications from the host, guarded against the engine
//!   re-triggering on its own writes
//!
//! Everything is single-threaded and cooperative. The only suspension
//! points are the network round trips inside the store and the tick
//! interval itself; one event is always processed to completion before
//! the next.
//!
//! # Key Components
//!
//! - [`Session`] - the per-page context object threaded through every call
//! - [`EngineEvent`] - the pump's message type
//! - [`DriftGuard`] - deadline-based re-entrancy guard with a depth-1
//!   coalesced backlog
//! - [`Host`] - seam to container location and change notification
//! - [`run_session`] - recv-with-timeout loop synthesizing ticks

pub mod guard;
pub mod scheduler;
pub mod session;
pub mod watcher;

pub use guard::DriftGuard;
pub use scheduler::{LocatorChain, locate_container, run_session};
pub use session::{EngineEvent, Host, Session, SessionConfig, editor_items};
pub use watcher::{ChangeWatcher, WatchToken};
