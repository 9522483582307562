//! SurrealDB implementation of [`MembershipRepository`].

use chrono::{DateTime, Utc};
use strata_core::error::StrataResult;
use strata_core::models::membership::{CreateMembership, Membership};
use strata_core::repository::MembershipRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;
use crate::repository::parse_uuid;

#[derive(Debug, SurrealValue)]
struct MembershipRow {
    user_id: String,
    tenant_id: String,
    role: String,
    permissions: Vec<String>,
    is_default: bool,
    is_deleted: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl MembershipRow {
    fn into_membership(self, id: Uuid) -> Result<Membership, DbError> {
        Ok(Membership {
            id,
            user_id: parse_uuid("user", &self.user_id)?,
            tenant_id: parse_uuid("tenant", &self.tenant_id)?,
            role: self.role,
            permissions: self.permissions,
            is_default: self.is_default,
            is_deleted: self.is_deleted,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, SurrealValue)]
struct MembershipRowWithId {
    record_id: String,
    user_id: String,
    tenant_id: String,
    role: String,
    permissions: Vec<String>,
    is_default: bool,
    is_deleted: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl MembershipRowWithId {
    fn try_into_membership(self) -> Result<Membership, DbError> {
        let id = parse_uuid("membership", &self.record_id)?;
        Ok(Membership {
            id,
            user_id: parse_uuid("user", &self.user_id)?,
            tenant_id: parse_uuid("tenant", &self.tenant_id)?,
            role: self.role,
            permissions: self.permissions,
            is_default: self.is_default,
            is_deleted: self.is_deleted,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// SurrealDB implementation of the Membership repository.
#[derive(Clone)]
pub struct SurrealMembershipRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealMembershipRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> MembershipRepository for SurrealMembershipRepository<C> {
    async fn create(&self, input: CreateMembership) -> StrataResult<Membership> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('membership', $id) SET \
                 user_id = $user_id, \
                 tenant_id = $tenant_id, \
                 role = $role, \
                 permissions = $permissions, \
                 is_default = $is_default",
            )
            .bind(("id", id_str.clone()))
            .bind(("user_id", input.user_id.to_string()))
            .bind(("tenant_id", input.tenant_id.to_string()))
            .bind(("role", input.role))
            .bind(("permissions", input.permissions))
            .bind(("is_default", input.is_default))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<MembershipRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "membership".into(),
            id: id_str,
        })?;

        Ok(row.into_membership(id)?)
    }

    async fn get(&self, user_id: Uuid, tenant_id: Uuid) -> StrataResult<Membership> {
        let user_id_str = user_id.to_string();
        let tenant_id_str = tenant_id.to_string();

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM membership \
                 WHERE user_id = $user_id AND tenant_id = $tenant_id \
                 AND is_deleted = false",
            )
            .bind(("user_id", user_id_str.clone()))
            .bind(("tenant_id", tenant_id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<MembershipRowWithId> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "membership".into(),
            id: format!("user={user_id_str},tenant={tenant_id_str}"),
        })?;

        Ok(row.try_into_membership()?)
    }

    async fn list_for_user(&self, user_id: Uuid) -> StrataResult<Vec<Membership>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM membership \
                 WHERE user_id = $user_id AND is_deleted = false \
                 ORDER BY created_at ASC",
            )
            .bind(("user_id", user_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<MembershipRowWithId> = result.take(0).map_err(DbError::from)?;

        Ok(rows
            .into_iter()
            .map(|row| row.try_into_membership())
            .collect::<Result<Vec<_>, DbError>>()?)
    }

    async fn soft_delete(&self, user_id: Uuid, tenant_id: Uuid) -> StrataResult<()> {
        self.db
            .query(
                "UPDATE membership SET \
                 is_deleted = true, updated_at = time::now() \
                 WHERE user_id = $user_id AND tenant_id = $tenant_id",
            )
            .bind(("user_id", user_id.to_string()))
            .bind(("tenant_id", tenant_id.to_string()))
            .await
            .map_err(DbError::from)?;

        Ok(())
    }
}
