//! Tests for single-flight refresh coordination.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use strata_client::{ClientError, RefreshCoordinator, SessionStore, SessionTokens, TokenRotator};

/// Scripted rotator: counts round-trips, optionally slow or failing.
struct MockRotator {
    calls: Arc<AtomicU64>,
    delay: Duration,
    fail: bool,
}

impl MockRotator {
    fn ok() -> Self {
        Self {
            calls: Arc::new(AtomicU64::new(0)),
            delay: Duration::from_millis(20),
            fail: false,
        }
    }

    fn failing() -> Self {
        Self {
            fail: true,
            ..Self::ok()
        }
    }

    fn slow(delay: Duration) -> Self {
        Self {
            delay,
            ..Self::ok()
        }
    }
}

impl TokenRotator for MockRotator {
    async fn rotate(&self, _refresh_token: &str) -> Result<SessionTokens, ClientError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        tokio::time::sleep(self.delay).await;
        if self.fail {
            return Err(ClientError::Transport("server said no".into()));
        }
        Ok(SessionTokens {
            access_token: format!("access-{n}"),
            refresh_token: format!("refresh-{n}"),
        })
    }
}

fn seeded_store() -> SessionStore {
    let store = SessionStore::new();
    store.set(SessionTokens {
        access_token: "access-0".into(),
        refresh_token: "refresh-0".into(),
    });
    store
}

#[tokio::test]
async fn concurrent_discoveries_collapse_into_one_rotation() {
    let rotator = MockRotator::ok();
    let calls = Arc::clone(&rotator.calls);
    let coordinator = Arc::new(RefreshCoordinator::new(rotator, seeded_store()));

    let mut handles = Vec::new();
    for _ in 0..50 {
        let coordinator = Arc::clone(&coordinator);
        handles.push(tokio::spawn(async move { coordinator.refresh().await }));
    }

    let mut tokens = Vec::new();
    for handle in handles {
        tokens.push(handle.await.unwrap().unwrap());
    }

    // Exactly one round-trip, and every caller got its result.
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(tokens.iter().all(|t| t == &tokens[0]));
    assert_eq!(
        coordinator.store().get().unwrap().access_token,
        tokens[0].access_token
    );
}

#[tokio::test]
async fn sequential_refreshes_each_rotate() {
    let rotator = MockRotator::ok();
    let calls = Arc::clone(&rotator.calls);
    let coordinator = RefreshCoordinator::new(rotator, seeded_store());

    let first = coordinator.refresh().await.unwrap();
    let second = coordinator.refresh().await.unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_ne!(first, second);
}

#[tokio::test]
async fn rotation_failure_expires_the_session_for_everyone() {
    let rotator = MockRotator::failing();
    let calls = Arc::clone(&rotator.calls);
    let coordinator = Arc::new(RefreshCoordinator::new(rotator, seeded_store()));

    let mut handles = Vec::new();
    for _ in 0..10 {
        let coordinator = Arc::clone(&coordinator);
        handles.push(tokio::spawn(async move { coordinator.refresh().await }));
    }

    for handle in handles {
        assert_eq!(handle.await.unwrap(), Err(ClientError::SessionExpired));
    }
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(coordinator.store().get().is_none());
}

#[tokio::test]
async fn refresh_without_a_session_expires_immediately() {
    let rotator = MockRotator::ok();
    let calls = Arc::clone(&rotator.calls);
    let coordinator = RefreshCoordinator::new(rotator, SessionStore::new());

    assert_eq!(
        coordinator.refresh().await,
        Err(ClientError::SessionExpired)
    );
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn slow_rotation_times_out_and_expires_the_session() {
    let rotator = MockRotator::slow(Duration::from_secs(5));
    let coordinator =
        RefreshCoordinator::with_timeout(rotator, seeded_store(), Duration::from_millis(50));

    assert_eq!(
        coordinator.refresh().await,
        Err(ClientError::SessionExpired)
    );
    assert!(coordinator.store().get().is_none());
}

#[tokio::test]
async fn dropped_leader_cancels_waiters_without_hanging() {
    let rotator = MockRotator::slow(Duration::from_secs(5));
    let coordinator = Arc::new(RefreshCoordinator::new(rotator, seeded_store()));

    let leader = {
        let coordinator = Arc::clone(&coordinator);
        tokio::spawn(async move { coordinator.refresh().await })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;

    let waiter = {
        let coordinator = Arc::clone(&coordinator);
        tokio::spawn(async move { coordinator.refresh().await })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;

    leader.abort();

    assert_eq!(waiter.await.unwrap(), Err(ClientError::Cancelled));
}

#[tokio::test]
async fn execute_retries_once_after_a_refresh() {
    let rotator = MockRotator::ok();
    let rotations = Arc::clone(&rotator.calls);
    let coordinator = RefreshCoordinator::new(rotator, seeded_store());
    let attempts = Arc::new(AtomicU64::new(0));

    let result = coordinator
        .execute(|access_token| {
            let attempts = Arc::clone(&attempts);
            async move {
                attempts.fetch_add(1, Ordering::SeqCst);
                // The seeded token is stale; the refreshed one works.
                if access_token == "access-0" {
                    Err(ClientError::Unauthorized)
                } else {
                    Ok("payload")
                }
            }
        })
        .await;

    assert_eq!(result, Ok("payload"));
    assert_eq!(attempts.load(Ordering::SeqCst), 2);
    assert_eq!(rotations.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn execute_propagates_a_second_rejection() {
    let rotator = MockRotator::ok();
    let rotations = Arc::clone(&rotator.calls);
    let coordinator = RefreshCoordinator::new(rotator, seeded_store());
    let attempts = Arc::new(AtomicU64::new(0));

    let result: Result<(), _> = coordinator
        .execute(|_access_token| {
            let attempts = Arc::clone(&attempts);
            async move {
                attempts.fetch_add(1, Ordering::SeqCst);
                Err(ClientError::Unauthorized)
            }
        })
        .await;

    // One retry, then the rejection stands — no refresh loop.
    assert_eq!(result, Err(ClientError::Unauthorized));
    assert_eq!(attempts.load(Ordering::SeqCst), 2);
    assert_eq!(rotations.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn execute_without_a_session_is_unauthorized() {
    let coordinator = RefreshCoordinator::new(MockRotator::ok(), SessionStore::new());

    let result: Result<(), _> = coordinator.execute(|_| async { Ok(()) }).await;
    assert_eq!(result, Err(ClientError::Unauthorized));
}

#[tokio::test]
async fn non_auth_errors_do_not_trigger_refresh() {
    let rotator = MockRotator::ok();
    let rotations = Arc::clone(&rotator.calls);
    let coordinator = RefreshCoordinator::new(rotator, seeded_store());

    let result: Result<(), _> = coordinator
        .execute(|_| async { Err(ClientError::Transport("boom".into())) })
        .await;

    assert_eq!(result, Err(ClientError::Transport("boom".into())));
    assert_eq!(rotations.load(Ordering::SeqCst), 0);
}
