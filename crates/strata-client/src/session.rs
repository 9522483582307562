//! Client-side session token storage.

use std::sync::{Arc, RwLock};

/// The token pair a signed-in client holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionTokens {
    pub access_token: String,
    pub refresh_token: String,
}

/// Shared cell holding the current session tokens.
///
/// Clones share the same cell, so the coordinator and every caller
/// observe the same pair.
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    inner: Arc<RwLock<Option<SessionTokens>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, tokens: SessionTokens) {
        *self.inner.write().expect("session store lock poisoned") = Some(tokens);
    }

    pub fn get(&self) -> Option<SessionTokens> {
        self.inner
            .read()
            .expect("session store lock poisoned")
            .clone()
    }

    /// Drop the session (sign-out, or an unrecoverable refresh
    /// failure).
    pub fn clear(&self) {
        *self.inner.write().expect("session store lock poisoned") = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_get_clear() {
        let store = SessionStore::new();
        assert!(store.get().is_none());

        store.set(SessionTokens {
            access_token: "a".into(),
            refresh_token: "r".into(),
        });
        assert_eq!(store.get().unwrap().access_token, "a");

        store.clear();
        assert!(store.get().is_none());
    }

    #[test]
    fn clones_share_the_cell() {
        let store = SessionStore::new();
        let other = store.clone();
        store.set(SessionTokens {
            access_token: "a".into(),
            refresh_token: "r".into(),
        });
        assert!(other.get().is_some());
    }
}
