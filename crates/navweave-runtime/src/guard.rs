#![forbid(unsafe_code)]

//! Re-entrancy guard between the engine's writes and its own change
//! detection.
//!
//! The host's change-notification subsystem reports asynchronously, so
//! an apply pass would otherwise immediately re-trigger itself through
//! the watcher. The guard is engaged before every engine-initiated
//! container mutation and considered held until a short delay after it,
//! long enough for the host to flush the notifications our own writes
//! produced.
//!
//! Suppressed notifications are coalesced, not queued: the first one
//! while held becomes a single pending re-application drained on a later
//! tick; the rest are dropped and counted. A burst of N notifications
//! can therefore never build an unbounded call chain. User-initiated
//! work (save, reset) bypasses the guard entirely.

use web_time::{Duration, Instant};

/// Default hold time after an engine write. Long enough for the host to
/// deliver the notifications caused by that write, short enough not to
/// mask a real foreign mutation for long.
pub const DEFAULT_RELEASE_DELAY: Duration = Duration::from_millis(250);

#[derive(Debug)]
pub struct DriftGuard {
    release_delay: Duration,
    held_until: Option<Instant>,
    pending: bool,
    dropped: u64,
}

impl DriftGuard {
    pub fn new(release_delay: Duration) -> Self {
        Self {
            release_delay,
            held_until: None,
            pending: false,
            dropped: 0,
        }
    }

    /// Mark that the engine is about to mutate the container. The guard
    /// stays held until `now + release_delay`.
    pub fn engage(&mut self, now: Instant) {
        self.held_until = Some(now + self.release_delay);
    }

    /// Whether watcher-triggered applies are currently suppressed.
    pub fn is_held(&self, now: Instant) -> bool {
        self.held_until.is_some_and(|until| now < until)
    }

    /// Record a change notification that arrived while held. Returns
    /// `true` if it became the (single) pending backlog, `false` if it
    /// was dropped on the floor.
    pub fn suppress(&mut self, now: Instant) -> bool {
        debug_assert!(self.is_held(now));
        if self.pending {
            self.dropped += 1;
            tracing::trace!(dropped = self.dropped, "dropping change notification while held");
            false
        } else {
            self.pending = true;
            true
        }
    }

    /// Drain the coalesced backlog: `true` exactly once after a
    /// suppression, and only once the hold has expired.
    pub fn take_pending(&mut self, now: Instant) -> bool {
        if self.pending && !self.is_held(now) {
            self.pending = false;
            true
        } else {
            false
        }
    }

    /// Notifications dropped beyond the single backlog slot.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }
}

impl Default for DriftGuard {
    fn default() -> Self {
        Self::new(DEFAULT_RELEASE_DELAY)
    }
}
