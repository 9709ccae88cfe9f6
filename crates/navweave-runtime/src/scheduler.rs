#![forbid(unsafe_code)]

//! Container location and the serialized event loop.
//!
//! The host may replace the container wholesale during single-page
//! navigation, so every tick re-locates it through a prioritized chain
//! of selectors, falling back from precise to broad and terminating at a
//! catch-all rather than failing outright. The loop itself is a
//! recv-with-timeout pump: change notifications arrive over the channel,
//! and a timeout synthesizes the tick. One event at a time, always to
//! completion.

use std::sync::mpsc;

use navweave_core::NavContainer;
use navweave_store::Transport;
use web_time::Instant;

use crate::session::{EngineEvent, Host, Session};

/// Prioritized container locators, most precise first. The host adapter
/// interprets each selector; the final entry is expected to be a
/// catch-all so location degrades rather than fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatorChain {
    selectors: Vec<String>,
}

impl LocatorChain {
    /// An empty chain would never locate anything, so it is padded with
    /// the catch-all.
    pub fn new(selectors: Vec<String>) -> Self {
        let mut selectors = selectors;
        if selectors.is_empty() {
            selectors.push("*".to_string());
        }
        Self { selectors }
    }

    /// Selectors in probe order.
    pub fn selectors(&self) -> impl Iterator<Item = &str> {
        self.selectors.iter().map(String::as_str)
    }
}

impl Default for LocatorChain {
    fn default() -> Self {
        Self::new(vec![
            "#sidebar-v2 nav".to_string(),
            "#sidebar-v2".to_string(),
            "nav".to_string(),
            "*".to_string(),
        ])
    }
}

/// Walk the chain from most precise to broadest and resolve the first
/// selector the host answers for.
///
/// Location degrades rather than fails: the chain's tail is a catch-all,
/// so `None` only means the host has no candidate container at all this
/// tick, which the caller treats as "try again next tick".
pub fn locate_container<'h>(
    host: &'h mut dyn Host,
    chain: &LocatorChain,
) -> Option<&'h mut dyn NavContainer> {
    let selector = chain.selectors().find(|&s| host.matches(s))?;
    host.resolve(selector)
}

/// Drive a session until every event sender is gone.
///
/// Change notifications and user commands arrive on `events`; a receive
/// timeout stands in for the fixed-interval tick. Reset failures are
/// logged here; embedders that need to report them to the user should
/// call [`Session::pump`] with [`EngineEvent::Reset`] directly and keep
/// the returned error.
pub fn run_session<T: Transport>(
    session: &mut Session<T>,
    host: &mut dyn Host,
    events: mpsc::Receiver<EngineEvent>,
) {
    session.bootstrap(host, Instant::now());
    loop {
        let event = match events.recv_timeout(session.poll_interval()) {
            Ok(event) => event,
            Err(mpsc::RecvTimeoutError::Timeout) => EngineEvent::Tick,
            Err(mpsc::RecvTimeoutError::Disconnected) => {
                tracing::debug!("event senders gone, stopping session loop");
                break;
            }
        };
        if let Err(err) = session.pump(host, event, Instant::now()) {
            tracing::warn!(%err, "reset failed");
        }
    }
}
