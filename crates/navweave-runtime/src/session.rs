#![forbid(unsafe_code)]

//! The per-page session context.
//!
//! One [`Session`] is constructed per page load and threaded through
//! every call; there is no global mutable state. It owns the layout
//! state, the drift guard, and the watch bookkeeping, and borrows the
//! host's container fresh on every use. Events from both sources (tick
//! timer and change notifications) funnel through [`Session::pump`],
//! which processes exactly one event to completion at a time.
//!
//! Startup sequence: the local cache populates the state synchronously
//! (provisional, applied immediately so the user never sees the default
//! layout), then the remote store answers asynchronously and silently
//! replaces it. Afterwards, last write wins: the state always reflects
//! the most recent completed fetch or user save.

use std::collections::BTreeSet;

use navweave_core::{
    ContainerId, ItemId, LayoutState, NavContainer, ReconciliationEngine, Result,
};
use navweave_store::{LocalCache, RemoteStore, Transport};
use web_time::{Duration, Instant};

use crate::guard::{DEFAULT_RELEASE_DELAY, DriftGuard};
use crate::scheduler::{LocatorChain, locate_container};
use crate::watcher::{ChangeWatcher, WatchToken};

/// Default tick interval for container polling.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(300);

/// One unit of work for the session pump.
#[derive(Debug, Clone)]
pub enum EngineEvent {
    /// Fixed-interval poll: re-locate the container, reattach the watch
    /// if its identity changed, drain any coalesced backlog.
    Tick,
    /// The host reported that the container's descendants changed.
    ContainerChanged,
    /// User saved an edit covering the currently visible items.
    Save {
        order: Vec<ItemId>,
        hidden: BTreeSet<ItemId>,
    },
    /// User confirmed a full reset of their customization.
    Reset,
}

/// Seam to the host application.
///
/// Selectors come from the session's [`LocatorChain`]; the scheduler
/// walks them from most precise to broadest (see
/// [`locate_container`](crate::scheduler::locate_container)) and the
/// host only answers for one selector at a time. The borrow `resolve`
/// returns must never be stored. Watch attachment delivers
/// [`EngineEvent::ContainerChanged`] through whatever channel the host
/// adapter was constructed with.
pub trait Host {
    /// Whether any container matches `selector` right now.
    fn matches(&self, selector: &str) -> bool;

    /// Resolve the first container matching `selector`.
    fn resolve(&mut self, selector: &str) -> Option<&mut dyn NavContainer>;

    fn attach_watch(&mut self, container: ContainerId) -> WatchToken;

    fn detach_watch(&mut self, token: WatchToken);
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Tenant the state is persisted under.
    pub tenant: String,
    /// Tick interval for [`run_session`](crate::run_session).
    pub poll_interval: Duration,
    /// How long the drift guard stays held after an engine write.
    pub guard_release: Duration,
    /// Container locators, precise to broad.
    pub locators: LocatorChain,
}

impl SessionConfig {
    pub fn new(tenant: impl Into<String>) -> Self {
        Self {
            tenant: tenant.into(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            guard_release: DEFAULT_RELEASE_DELAY,
            locators: LocatorChain::default(),
        }
    }
}

/// The engine's context object: layout state plus everything needed to
/// keep a foreign container matching it.
pub struct Session<T: Transport> {
    config: SessionConfig,
    state: LayoutState,
    cache: LocalCache,
    remote: RemoteStore<T>,
    guard: DriftGuard,
    watcher: ChangeWatcher,
    on_editor_refresh: Option<Box<dyn FnMut(Vec<ItemId>)>>,
}

impl<T: Transport> Session<T> {
    /// Build a session, reading the cached state synchronously so the
    /// first apply can happen before any network round trip.
    pub fn new(config: SessionConfig, cache: LocalCache, remote: RemoteStore<T>) -> Self {
        let state = cache.load(&config.tenant);
        let guard = DriftGuard::new(config.guard_release);
        Self {
            config,
            state,
            cache,
            remote,
            guard,
            watcher: ChangeWatcher::new(),
            on_editor_refresh: None,
        }
    }

    /// Current source of truth.
    pub fn state(&self) -> &LayoutState {
        &self.state
    }

    pub fn poll_interval(&self) -> Duration {
        self.config.poll_interval
    }

    /// Called with the live item list (merged with current ordering)
    /// whenever the tracked container changes identity, so an open
    /// editor can refresh what it shows.
    pub fn set_editor_refresh(&mut self, callback: impl FnMut(Vec<ItemId>) + 'static) {
        self.on_editor_refresh = Some(Box::new(callback));
    }

    /// Apply the provisional cached state, then fetch the authoritative
    /// remote state and silently replace it. A fetch failure leaves the
    /// cached state in force.
    pub fn bootstrap(&mut self, host: &mut dyn Host, now: Instant) {
        if self.state.loaded {
            self.apply_to_located(host, now);
        }
        if let Some(fresh) = self.remote.fetch_state(&self.config.tenant) {
            self.state = fresh;
            self.cache.save(&self.config.tenant, &self.state);
            self.apply_to_located(host, now);
        }
    }

    /// Process one event to completion. Only [`EngineEvent::Reset`] can
    /// fail; every other path degrades internally.
    pub fn pump(&mut self, host: &mut dyn Host, event: EngineEvent, now: Instant) -> Result<()> {
        match event {
            EngineEvent::Tick => {
                self.handle_tick(host, now);
                Ok(())
            }
            EngineEvent::ContainerChanged => {
                self.handle_changed(host, now);
                Ok(())
            }
            EngineEvent::Save { order, hidden } => {
                self.handle_save(host, &order, &hidden, now);
                Ok(())
            }
            EngineEvent::Reset => self.handle_reset(host, now),
        }
    }

    fn handle_tick(&mut self, host: &mut dyn Host, now: Instant) {
        let identity = match locate_container(host, &self.config.locators) {
            Some(container) => container.identity(),
            None => {
                tracing::trace!("no container located this tick");
                return;
            }
        };

        if self.watcher.watched() == Some(identity) {
            // Same container; the watcher handles drift. Just drain a
            // backlog the guard may have coalesced.
            if self.guard.take_pending(now) {
                self.apply_to_located(host, now);
            }
            return;
        }

        tracing::debug!(container = identity, "container replaced, reattaching watch");
        if let Some(stale) = self.watcher.begin_reattach() {
            host.detach_watch(stale);
        }
        self.apply_to_located(host, now);
        let token = host.attach_watch(identity);
        self.watcher.attached(identity, token);
        self.refresh_editor(host);
    }

    fn handle_changed(&mut self, host: &mut dyn Host, now: Instant) {
        if self.guard.is_held(now) {
            // Almost certainly our own write echoing back.
            self.guard.suppress(now);
            return;
        }
        self.apply_to_located(host, now);
    }

    fn handle_save(
        &mut self,
        host: &mut dyn Host,
        order: &[ItemId],
        hidden: &BTreeSet<ItemId>,
        now: Instant,
    ) {
        // Optimistic: local state, cache, and container all reflect the
        // edit before the network call is even made.
        self.state.merge_partial(order, hidden);
        self.cache.save(&self.config.tenant, &self.state);
        self.apply_to_located(host, now);
        self.remote
            .save_state(&self.config.tenant, &self.state.order, &self.state.hidden);
    }

    fn handle_reset(&mut self, host: &mut dyn Host, now: Instant) -> Result<()> {
        self.remote.reset_state(&self.config.tenant)?;
        self.cache.clear(&self.config.tenant);
        self.state = LayoutState::empty_loaded();
        self.apply_to_located(host, now);
        Ok(())
    }

    /// Locate the container fresh and apply the current state, engaging
    /// the guard first so the resulting notifications are recognized as
    /// our own. A missing container is fine; the next tick retries.
    fn apply_to_located(&mut self, host: &mut dyn Host, now: Instant) {
        let Some(container) = locate_container(host, &self.config.locators) else {
            tracing::trace!("apply skipped, container missing");
            return;
        };
        self.guard.engage(now);
        ReconciliationEngine::apply(&self.state, container);
    }

    fn refresh_editor(&mut self, host: &mut dyn Host) {
        let Some(callback) = self.on_editor_refresh.as_mut() else {
            return;
        };
        let Some(container) = locate_container(host, &self.config.locators) else {
            return;
        };
        callback(editor_items(&self.state, container));
    }
}

/// The item list an editor should display: the container's live items,
/// explicitly ordered ones first in their saved sequence, the rest in
/// container order.
pub fn editor_items(state: &LayoutState, container: &dyn NavContainer) -> Vec<ItemId> {
    let present = container.item_ids();
    let mut items: Vec<ItemId> = state
        .order
        .iter()
        .filter(|id| present.contains(*id))
        .cloned()
        .collect();
    for id in present {
        if !state.order.contains(&id) {
            items.push(id);
        }
    }
    items
}
