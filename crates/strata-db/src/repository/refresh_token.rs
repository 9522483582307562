//! SurrealDB implementation of [`RefreshTokenRepository`].
//!
//! Rotation and creation run as single SurrealDB transactions so the
//! "at most one active token per user" and "a token is consumed at
//! most once" invariants hold under concurrent callers.

use chrono::{DateTime, Utc};
use strata_core::error::{StrataError, StrataResult};
use strata_core::models::refresh_token::{CreateRefreshToken, RefreshToken, RefreshTokenStatus};
use strata_core::repository::RefreshTokenRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;
use crate::repository::{parse_uuid, token_status_from_str};

/// Sentinel thrown inside the rotation transaction when the
/// compare-and-set on the old token misses.
const ROTATION_CAS_MISS: &str = "refresh_token_not_active";

#[derive(Debug, SurrealValue)]
struct RefreshTokenRowWithId {
    record_id: String,
    user_id: String,
    token_hash: String,
    status: String,
    expires_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
    used_at: Option<DateTime<Utc>>,
}

impl RefreshTokenRowWithId {
    fn try_into_refresh_token(self) -> Result<RefreshToken, DbError> {
        let id = parse_uuid("refresh_token", &self.record_id)?;
        Ok(RefreshToken {
            id,
            user_id: parse_uuid("user", &self.user_id)?,
            token_hash: self.token_hash,
            status: token_status_from_str(&self.status)?,
            expires_at: self.expires_at,
            created_at: self.created_at,
            used_at: self.used_at,
        })
    }
}

/// SurrealDB implementation of the RefreshToken repository.
#[derive(Clone)]
pub struct SurrealRefreshTokenRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealRefreshTokenRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> RefreshTokenRepository for SurrealRefreshTokenRepository<C> {
    async fn create(&self, input: CreateRefreshToken) -> StrataResult<RefreshToken> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();
        let created_at = Utc::now();

        let result = self
            .db
            .query(
                "BEGIN TRANSACTION; \
                 UPDATE refresh_token SET status = 'Revoked' \
                     WHERE user_id = $user_id AND status = 'Active'; \
                 CREATE type::record('refresh_token', $id) SET \
                     user_id = $user_id, \
                     token_hash = $token_hash, \
                     status = 'Active', \
                     expires_at = $expires_at, \
                     created_at = $created_at; \
                 COMMIT TRANSACTION;",
            )
            .bind(("id", id_str))
            .bind(("user_id", input.user_id.to_string()))
            .bind(("token_hash", input.token_hash.clone()))
            .bind(("expires_at", input.expires_at))
            .bind(("created_at", created_at))
            .await
            .map_err(DbError::from)?;

        result.check().map_err(|e| DbError::Query(e.to_string()))?;

        Ok(RefreshToken {
            id,
            user_id: input.user_id,
            token_hash: input.token_hash,
            status: RefreshTokenStatus::Active,
            expires_at: input.expires_at,
            created_at,
            used_at: None,
        })
    }

    async fn get_by_hash(&self, token_hash: &str) -> StrataResult<Option<RefreshToken>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM refresh_token \
                 WHERE token_hash = $token_hash",
            )
            .bind(("token_hash", token_hash.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<RefreshTokenRowWithId> = result.take(0).map_err(DbError::from)?;

        rows.into_iter()
            .next()
            .map(|row| row.try_into_refresh_token())
            .transpose()
            .map_err(Into::into)
    }

    async fn consume_and_replace(
        &self,
        old_hash: &str,
        replacement: CreateRefreshToken,
    ) -> StrataResult<RefreshToken> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();
        let created_at = Utc::now();

        // The UPDATE only matches while the old token is still Active;
        // the THROW aborts the whole transaction when it missed, so a
        // losing concurrent rotation leaves no replacement behind.
        let result = self
            .db
            .query(format!(
                "BEGIN TRANSACTION; \
                 LET $consumed = (UPDATE refresh_token SET \
                         status = 'Used', used_at = time::now() \
                     WHERE token_hash = $old_hash AND status = 'Active' \
                     RETURN AFTER); \
                 IF array::len($consumed) == 0 {{ \
                     THROW '{ROTATION_CAS_MISS}'; \
                 }}; \
                 CREATE type::record('refresh_token', $id) SET \
                     user_id = $user_id, \
                     token_hash = $token_hash, \
                     status = 'Active', \
                     expires_at = $expires_at, \
                     created_at = $created_at; \
                 COMMIT TRANSACTION;",
            ))
            .bind(("old_hash", old_hash.to_string()))
            .bind(("id", id_str))
            .bind(("user_id", replacement.user_id.to_string()))
            .bind(("token_hash", replacement.token_hash.clone()))
            .bind(("expires_at", replacement.expires_at))
            .bind(("created_at", created_at))
            .await
            .map_err(DbError::from)?;

        if let Err(e) = result.check() {
            let message = e.to_string();
            if message.contains(ROTATION_CAS_MISS) {
                return Err(StrataError::TokenInvalid(
                    "refresh token is no longer active".into(),
                ));
            }
            return Err(DbError::Query(message).into());
        }

        Ok(RefreshToken {
            id,
            user_id: replacement.user_id,
            token_hash: replacement.token_hash,
            status: RefreshTokenStatus::Active,
            expires_at: replacement.expires_at,
            created_at,
            used_at: None,
        })
    }

    async fn revoke_by_hash(&self, token_hash: &str) -> StrataResult<bool> {
        let mut result = self
            .db
            .query(
                "UPDATE refresh_token SET status = 'Revoked' \
                 WHERE token_hash = $token_hash AND status = 'Active' \
                 RETURN VALUE meta::id(id)",
            )
            .bind(("token_hash", token_hash.to_string()))
            .await
            .map_err(DbError::from)?;

        let revoked: Vec<String> = result.take(0).map_err(DbError::from)?;

        Ok(!revoked.is_empty())
    }

    async fn revoke_all_for_user(&self, user_id: Uuid) -> StrataResult<u64> {
        let mut result = self
            .db
            .query(
                "UPDATE refresh_token SET status = 'Revoked' \
                 WHERE user_id = $user_id AND status = 'Active' \
                 RETURN VALUE meta::id(id)",
            )
            .bind(("user_id", user_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let revoked: Vec<String> = result.take(0).map_err(DbError::from)?;

        Ok(revoked.len() as u64)
    }

    async fn cleanup_expired(&self) -> StrataResult<u64> {
        let mut result = self
            .db
            .query(
                "DELETE refresh_token WHERE expires_at < time::now() \
                 RETURN VALUE meta::id($before.id)",
            )
            .await
            .map_err(DbError::from)?;

        let deleted: Vec<String> = result.take(0).map_err(DbError::from)?;

        Ok(deleted.len() as u64)
    }
}
