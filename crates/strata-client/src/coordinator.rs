//! Single-flight refresh coordination.
//!
//! Any number of concurrent calls may discover an expired access
//! token at once; exactly one rotation round-trip must happen. The
//! coordinator is an explicit per-process object — state lives in the
//! instance, never in module globals — with a two-state flight machine
//! and an ordered waiter queue.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::oneshot;
use tracing::{debug, warn};

use crate::error::ClientError;
use crate::session::{SessionStore, SessionTokens};

const DEFAULT_REFRESH_TIMEOUT: Duration = Duration::from_secs(10);

/// Performs the actual rotation round-trip against the server.
pub trait TokenRotator: Send + Sync {
    fn rotate(
        &self,
        refresh_token: &str,
    ) -> impl Future<Output = Result<SessionTokens, ClientError>> + Send;
}

type FlightResult = Result<SessionTokens, ClientError>;

/// Mutable flight state behind one short-held lock. The lock is never
/// held across an await point.
#[derive(Default)]
struct FlightState {
    refreshing: bool,
    waiters: Vec<oneshot::Sender<FlightResult>>,
}

/// Coordinates token refresh so that concurrent discoveries of an
/// expired token collapse into one rotation.
pub struct RefreshCoordinator<R: TokenRotator> {
    rotator: R,
    store: SessionStore,
    state: Arc<Mutex<FlightState>>,
    timeout: Duration,
}

impl<R: TokenRotator> RefreshCoordinator<R> {
    pub fn new(rotator: R, store: SessionStore) -> Self {
        Self::with_timeout(rotator, store, DEFAULT_REFRESH_TIMEOUT)
    }

    pub fn with_timeout(rotator: R, store: SessionStore, timeout: Duration) -> Self {
        Self {
            rotator,
            store,
            state: Arc::new(Mutex::new(FlightState::default())),
            timeout,
        }
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Obtain a fresh token pair, joining an in-flight rotation when
    /// one exists.
    ///
    /// The first caller while idle becomes the leader and performs
    /// exactly one rotation; every caller arriving while it is in
    /// flight waits for the leader's outcome. Waiters resolve in
    /// enqueue order. If the leader is dropped mid-flight, a guard
    /// fails all waiters with [`ClientError::Cancelled`] instead of
    /// leaving them hanging.
    pub async fn refresh(&self) -> FlightResult {
        let waiter = {
            let mut state = self.state.lock().expect("flight state lock poisoned");
            if state.refreshing {
                let (tx, rx) = oneshot::channel();
                state.waiters.push(tx);
                Some(rx)
            } else {
                state.refreshing = true;
                None
            }
        };

        if let Some(rx) = waiter {
            debug!("joining in-flight token refresh");
            return rx.await.unwrap_or(Err(ClientError::Cancelled));
        }

        let guard = FlightGuard {
            state: Arc::clone(&self.state),
        };
        let result = self.rotate_once().await;
        guard.complete(result.clone());
        result
    }

    /// Execute an authenticated call, refreshing and retrying at most
    /// once when the server rejects the access token.
    ///
    /// The retry budget is per call: a second rejection — stale grant,
    /// revoked session — propagates instead of looping.
    pub async fn execute<T, F, Fut>(&self, call: F) -> Result<T, ClientError>
    where
        F: Fn(String) -> Fut,
        Fut: Future<Output = Result<T, ClientError>>,
    {
        let tokens = self.store.get().ok_or(ClientError::Unauthorized)?;

        match call(tokens.access_token).await {
            Err(ClientError::Unauthorized) => {
                let refreshed = self.refresh().await?;
                call(refreshed.access_token).await
            }
            other => other,
        }
    }

    /// One bounded rotation round-trip. Failure is terminal for the
    /// session: the cached pair is cleared and the caller must
    /// re-authenticate.
    async fn rotate_once(&self) -> FlightResult {
        let Some(current) = self.store.get() else {
            return Err(ClientError::SessionExpired);
        };

        let outcome =
            tokio::time::timeout(self.timeout, self.rotator.rotate(&current.refresh_token)).await;

        match outcome {
            Ok(Ok(tokens)) => {
                self.store.set(tokens.clone());
                debug!("token refresh succeeded");
                Ok(tokens)
            }
            Ok(Err(e)) => {
                warn!(error = %e, "token refresh failed; clearing session");
                self.store.clear();
                Err(ClientError::SessionExpired)
            }
            Err(_) => {
                warn!("token refresh timed out; clearing session");
                self.store.clear();
                Err(ClientError::SessionExpired)
            }
        }
    }
}

/// Leader guard: releases the flight and resolves waiters exactly
/// once — with the real outcome via [`FlightGuard::complete`], or
/// with `Cancelled` from `Drop` when the leader future is abandoned.
struct FlightGuard {
    state: Arc<Mutex<FlightState>>,
}

impl FlightGuard {
    fn complete(self, result: FlightResult) {
        Self::finish(&self.state, &result);
        std::mem::forget(self);
    }

    fn finish(state: &Mutex<FlightState>, outcome: &FlightResult) {
        let mut state = state.lock().expect("flight state lock poisoned");
        state.refreshing = false;
        for tx in state.waiters.drain(..) {
            // A waiter that gave up just drops its receiver.
            let _ = tx.send(outcome.clone());
        }
    }
}

impl Drop for FlightGuard {
    fn drop(&mut self) {
        warn!("refresh leader dropped mid-flight; cancelling waiters");
        Self::finish(&self.state, &Err(ClientError::Cancelled));
    }
}
