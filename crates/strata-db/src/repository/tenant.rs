//! SurrealDB implementation of [`TenantRepository`].

use chrono::{DateTime, Utc};
use strata_core::error::StrataResult;
use strata_core::models::tenant::{CreateTenant, Tenant, UpdateTenant};
use strata_core::repository::TenantRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;
use crate::repository::{
    parse_uuid, plan_from_str, plan_to_str, tenant_status_from_str, tenant_status_to_str,
};

/// DB-side row struct for queries where the UUID is already known.
#[derive(Debug, SurrealValue)]
struct TenantRow {
    name: String,
    slug: String,
    subdomain: Option<String>,
    schema: String,
    plan: String,
    status: String,
    api_request_limit_per_day: i64,
    storage_limit_mb: i64,
    settings: serde_json::Value,
    is_deleted: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TenantRow {
    fn into_tenant(self, id: Uuid) -> Result<Tenant, DbError> {
        Ok(Tenant {
            id,
            name: self.name,
            slug: self.slug,
            subdomain: self.subdomain,
            schema: self.schema,
            plan: plan_from_str(&self.plan)?,
            status: tenant_status_from_str(&self.status)?,
            api_request_limit_per_day: self.api_request_limit_per_day,
            storage_limit_mb: self.storage_limit_mb,
            settings: self.settings,
            is_deleted: self.is_deleted,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct TenantRowWithId {
    record_id: String,
    name: String,
    slug: String,
    subdomain: Option<String>,
    schema: String,
    plan: String,
    status: String,
    api_request_limit_per_day: i64,
    storage_limit_mb: i64,
    settings: serde_json::Value,
    is_deleted: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TenantRowWithId {
    fn try_into_tenant(self) -> Result<Tenant, DbError> {
        let id = parse_uuid("tenant", &self.record_id)?;
        Ok(Tenant {
            id,
            name: self.name,
            slug: self.slug,
            subdomain: self.subdomain,
            schema: self.schema,
            plan: plan_from_str(&self.plan)?,
            status: tenant_status_from_str(&self.status)?,
            api_request_limit_per_day: self.api_request_limit_per_day,
            storage_limit_mb: self.storage_limit_mb,
            settings: self.settings,
            is_deleted: self.is_deleted,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// SurrealDB implementation of the Tenant repository.
#[derive(Clone)]
pub struct SurrealTenantRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealTenantRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> TenantRepository for SurrealTenantRepository<C> {
    async fn create(&self, input: CreateTenant) -> StrataResult<Tenant> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();
        let settings = input
            .settings
            .unwrap_or(serde_json::Value::Object(Default::default()));

        let result = self
            .db
            .query(
                "CREATE type::record('tenant', $id) SET \
                 name = $name, \
                 slug = $slug, \
                 subdomain = $subdomain, \
                 schema = $schema, \
                 plan = $plan, \
                 status = 'Active', \
                 api_request_limit_per_day = $api_limit, \
                 storage_limit_mb = $storage_limit, \
                 settings = $settings",
            )
            .bind(("id", id_str.clone()))
            .bind(("name", input.name))
            .bind(("slug", input.slug))
            .bind(("subdomain", input.subdomain))
            .bind(("schema", input.schema))
            .bind(("plan", plan_to_str(input.plan)))
            .bind(("api_limit", input.api_request_limit_per_day))
            .bind(("storage_limit", input.storage_limit_mb))
            .bind(("settings", settings))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<TenantRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "tenant".into(),
            id: id_str,
        })?;

        Ok(row.into_tenant(id)?)
    }

    async fn get_by_id(&self, id: Uuid) -> StrataResult<Tenant> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query(
                "SELECT * FROM type::record('tenant', $id) \
                 WHERE is_deleted = false",
            )
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<TenantRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "tenant".into(),
            id: id_str,
        })?;

        Ok(row.into_tenant(id)?)
    }

    async fn get_by_slug(&self, slug: &str) -> StrataResult<Tenant> {
        let slug_owned = slug.to_string();

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM tenant \
                 WHERE slug = $slug AND is_deleted = false",
            )
            .bind(("slug", slug_owned.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<TenantRowWithId> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "tenant".into(),
            id: format!("slug={slug_owned}"),
        })?;

        Ok(row.try_into_tenant()?)
    }

    async fn get_by_subdomain(&self, subdomain: &str) -> StrataResult<Tenant> {
        let subdomain_owned = subdomain.to_string();

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM tenant \
                 WHERE subdomain = $subdomain AND is_deleted = false",
            )
            .bind(("subdomain", subdomain_owned.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<TenantRowWithId> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "tenant".into(),
            id: format!("subdomain={subdomain_owned}"),
        })?;

        Ok(row.try_into_tenant()?)
    }

    async fn update(&self, id: Uuid, input: UpdateTenant) -> StrataResult<Tenant> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.name.is_some() {
            sets.push("name = $name");
        }
        if input.subdomain.is_some() {
            sets.push("subdomain = $subdomain");
        }
        if input.plan.is_some() {
            sets.push("plan = $plan");
        }
        if input.status.is_some() {
            sets.push("status = $status");
        }
        if input.api_request_limit_per_day.is_some() {
            sets.push("api_request_limit_per_day = $api_limit");
        }
        if input.storage_limit_mb.is_some() {
            sets.push("storage_limit_mb = $storage_limit");
        }
        if input.settings.is_some() {
            sets.push("settings = $settings");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('tenant', $id) SET {} \
             WHERE is_deleted = false",
            sets.join(", "),
        );

        let mut builder = self.db.query(&query).bind(("id", id_str.clone()));

        if let Some(name) = input.name {
            builder = builder.bind(("name", name));
        }
        if let Some(subdomain) = input.subdomain {
            builder = builder.bind(("subdomain", subdomain));
        }
        if let Some(plan) = input.plan {
            builder = builder.bind(("plan", plan_to_str(plan)));
        }
        if let Some(status) = input.status {
            builder = builder.bind(("status", tenant_status_to_str(status)));
        }
        if let Some(api_limit) = input.api_request_limit_per_day {
            builder = builder.bind(("api_limit", api_limit));
        }
        if let Some(storage_limit) = input.storage_limit_mb {
            builder = builder.bind(("storage_limit", storage_limit));
        }
        if let Some(settings) = input.settings {
            builder = builder.bind(("settings", settings));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result.check().map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<TenantRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "tenant".into(),
            id: id_str,
        })?;

        Ok(row.into_tenant(id)?)
    }

    async fn soft_delete(&self, id: Uuid) -> StrataResult<()> {
        self.db
            .query(
                "UPDATE type::record('tenant', $id) SET \
                 is_deleted = true, updated_at = time::now()",
            )
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?;

        Ok(())
    }

    async fn list_active(&self) -> StrataResult<Vec<Tenant>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM tenant \
                 WHERE is_deleted = false \
                 ORDER BY created_at ASC",
            )
            .await
            .map_err(DbError::from)?;

        let rows: Vec<TenantRowWithId> = result.take(0).map_err(DbError::from)?;

        Ok(rows
            .into_iter()
            .map(|row| row.try_into_tenant())
            .collect::<Result<Vec<_>, DbError>>()?)
    }
}
