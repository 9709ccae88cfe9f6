#![forbid(unsafe_code)]

//! Subscription to the host's structural change notifications.
//!
//! The host delivers notifications on its own schedule; the engine
//! controls neither timing nor batching. The watcher only tracks which
//! container the session is subscribed to, so that a wholesale container
//! swap during single-page navigation detaches the stale subscription
//! before attaching to the replacement.

use navweave_core::ContainerId;

/// Handle to one active change subscription, issued by the host.
pub type WatchToken = u64;

/// Tracks the single active subscription for a session.
#[derive(Debug, Default)]
pub struct ChangeWatcher {
    active: Option<(ContainerId, WatchToken)>,
}

impl ChangeWatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// The container currently watched, if any.
    pub fn watched(&self) -> Option<ContainerId> {
        self.active.map(|(id, _)| id)
    }

    /// Take the stale token so the caller can hand it back to the host
    /// for detachment before attaching to `next`.
    pub fn begin_reattach(&mut self) -> Option<WatchToken> {
        self.active.take().map(|(_, token)| token)
    }

    /// Record the subscription the host just issued.
    pub fn attached(&mut self, container: ContainerId, token: WatchToken) {
        tracing::debug!(container, token, "watching container");
        self.active = Some((container, token));
    }
}
