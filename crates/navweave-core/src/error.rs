#![forbid(unsafe_code)]

//! Error taxonomy for the reconciliation engine and its persistence edges.
//!
//! Nothing here is fatal to the session: every variant degrades to "keep
//! using the best state already known". Two conditions deliberately have
//! no variant at all:
//!
//! - a remote "not found" is a valid answer ("no customization yet") and
//!   normalizes to an empty, loaded state;
//! - a tick that locates no container simply skips the tick.

use thiserror::Error;

/// Failures that can occur at the transport edge. Local cache failures
/// never surface at all; the cache logs and moves on.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The request could not complete at all (DNS, connect, timeout).
    #[error("request failed: {0}")]
    Network(String),

    /// The server answered with a non-success status other than 404.
    #[error("unexpected http status {0}")]
    Http(u16),

    /// The response body did not contain a recognizable payload.
    #[error("malformed response: {0}")]
    Malformed(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;
