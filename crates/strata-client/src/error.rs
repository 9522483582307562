//! Client-side error types.
//!
//! `Clone` because a single refresh outcome is fanned out to every
//! queued waiter.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// The server rejected the access token (expired or invalid).
    /// Recoverable once via a refresh round-trip.
    #[error("request was not authorized")]
    Unauthorized,

    /// The session cannot be refreshed; the user must sign in again.
    #[error("session has expired")]
    SessionExpired,

    /// Network or server failure unrelated to authentication.
    #[error("transport error: {0}")]
    Transport(String),

    /// The in-flight refresh was abandoned before producing a result.
    #[error("refresh was cancelled")]
    Cancelled,
}
