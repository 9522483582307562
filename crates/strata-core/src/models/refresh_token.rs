//! Refresh token domain model.
//!
//! Raw tokens are opaque high-entropy secrets returned to the client
//! once; only the SHA-256 hash is persisted. A token is single-use:
//! rotation marks it `Used` atomically while the replacement is
//! created.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RefreshTokenStatus {
    Active,
    /// Consumed by a rotation. Presenting a `Used` token again is the
    /// reuse signal that forces re-authentication.
    Used,
    /// Explicitly revoked (logout, logout-everywhere, reuse response).
    Revoked,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshToken {
    pub id: Uuid,
    pub user_id: Uuid,
    /// SHA-256 hex hash of the raw token.
    pub token_hash: String,
    pub status: RefreshTokenStatus,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub used_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRefreshToken {
    pub user_id: Uuid,
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
}
